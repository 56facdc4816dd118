//! Node-level metadata for expressions.
//!
//! ExpressionData holds everything the analyzer learns about an expression
//! node: its static type, the method binding of a call, the constructor of
//! a `new`, and what a name or field access refers to.

use rustc_hash::FxHashMap;

use crate::frontend::NodeId;
use crate::sema::Type;
use crate::sema::resolution::MethodBinding;
use crate::sema::types::{ClassId, FieldId, MethodId};

/// What an identifier or field access refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRef {
    /// Local variable or parameter
    Local,
    /// Field; instance fields named without a receiver are read from `this`
    Field(FieldId),
    /// Class name used as the target of a static member access
    Class(ClassId),
}

#[derive(Debug, Default, Clone)]
pub struct ExpressionData {
    types: FxHashMap<NodeId, Type>,
    methods: FxHashMap<NodeId, MethodBinding>,
    constructors: FxHashMap<NodeId, MethodId>,
    names: FxHashMap<NodeId, NameRef>,
}

impl ExpressionData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the type of an expression by its NodeId
    pub fn get_type(&self, node: NodeId) -> Option<Type> {
        self.types.get(&node).copied()
    }

    pub fn set_type(&mut self, node: NodeId, ty: Type) {
        self.types.insert(node, ty);
    }

    /// Binding of a method call node
    pub fn get_method(&self, node: NodeId) -> Option<&MethodBinding> {
        self.methods.get(&node)
    }

    /// Record the binding of a call node. A call site is bound once.
    pub fn set_method(&mut self, node: NodeId, binding: MethodBinding) {
        let previous = self.methods.insert(node, binding);
        debug_assert!(
            previous.is_none_or(|p| p == binding),
            "INTERNAL: call site {} bound twice",
            node
        );
    }

    /// Constructor selected for a `new` node
    pub fn get_constructor(&self, node: NodeId) -> Option<MethodId> {
        self.constructors.get(&node).copied()
    }

    pub fn set_constructor(&mut self, node: NodeId, ctor: MethodId) {
        self.constructors.insert(node, ctor);
    }

    pub fn get_name(&self, node: NodeId) -> Option<NameRef> {
        self.names.get(&node).copied()
    }

    pub fn set_name(&mut self, node: NodeId, name: NameRef) {
        self.names.insert(node, name);
    }

    pub fn methods(&self) -> &FxHashMap<NodeId, MethodBinding> {
        &self.methods
    }
}
