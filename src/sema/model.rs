// src/sema/model.rs
//
// The type model: every class, interface, field and method of one
// compilation, plus the subtype relation. Built once by registration; the
// only later mutation is dispatch-table construction.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::frontend::{Span, Symbol};
use crate::sema::dispatch::DispatchTable;
use crate::sema::types::{ClassId, FieldId, InterfaceId, MethodId, Type};

/// Location of a member declaration inside `Program::declarations`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberRef {
    pub decl: usize,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    Class(ClassId),
    Interface(InterfaceId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodBody {
    /// Interface signature
    Abstract,
    /// Synthesized zero-argument constructor
    Implicit,
    /// A method declaration (`MemberRef::index` into `methods`)
    Method(MemberRef),
    /// A constructor declaration (`MemberRef::index` into `constructors`)
    Constructor(MemberRef),
}

#[derive(Debug, Clone)]
pub struct ParamInfo {
    pub name: Symbol,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub struct Method {
    pub owner: Owner,
    pub symbol: Symbol,
    pub name: String,
    pub is_static: bool,
    pub is_constructor: bool,
    pub params: Vec<ParamInfo>,
    pub return_type: Type,
    pub body: MethodBody,
    /// Dispatch slot: primary-table index for class instance methods,
    /// declaration index for interface signatures. `None` for statics and
    /// constructors.
    pub slot: Option<u32>,
    pub span: Span,
}

impl Method {
    pub fn param_types(&self) -> SmallVec<[Type; 4]> {
        self.params.iter().map(|p| p.ty).collect()
    }

    /// Same parameter list (types and arity)
    pub fn same_params(&self, other: &Method) -> bool {
        self.params.len() == other.params.len()
            && self
                .params
                .iter()
                .zip(&other.params)
                .all(|(a, b)| a.ty == b.ty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLayout {
    /// Index among the instance's field words, inherited fields first
    Instance(u32),
    /// Index into the static storage area
    Static(u32),
}

#[derive(Debug, Clone)]
pub struct Field {
    pub owner: ClassId,
    pub symbol: Symbol,
    pub name: String,
    pub ty: Type,
    pub layout: FieldLayout,
    /// Static initializer expression
    pub init: Option<MemberRef>,
    pub span: Span,
}

impl Field {
    pub fn is_static(&self) -> bool {
        matches!(self.layout, FieldLayout::Static(_))
    }
}

#[derive(Debug, Clone)]
pub struct ClassType {
    pub symbol: Symbol,
    pub name: String,
    pub superclass: Option<ClassId>,
    /// Directly implemented interfaces, in declaration order
    pub interfaces: Vec<InterfaceId>,
    pub fields: Vec<FieldId>,
    pub methods: Vec<MethodId>,
    pub constructors: Vec<MethodId>,
    /// Number of instance field words, inherited fields included
    pub instance_field_count: u32,
    pub decl_index: usize,
    pub span: Span,
    pub(crate) dispatch: Option<DispatchTable>,
}

impl ClassType {
    /// The built dispatch table. Tables are built for every class before
    /// any resolution happens.
    pub fn dispatch(&self) -> &DispatchTable {
        self.dispatch.as_ref().unwrap_or_else(|| {
            panic!("INTERNAL: dispatch table for '{}' requested before it was built", self.name)
        })
    }
}

#[derive(Debug, Clone)]
pub struct InterfaceType {
    pub symbol: Symbol,
    pub name: String,
    /// Signatures in declaration order
    pub methods: Vec<MethodId>,
    pub decl_index: usize,
    pub span: Span,
}

/// All entities of one compilation unit
#[derive(Debug, Default, Clone)]
pub struct TypeModel {
    classes: Vec<ClassType>,
    interfaces: Vec<InterfaceType>,
    methods: Vec<Method>,
    fields: Vec<Field>,
    types_by_name: FxHashMap<Symbol, Type>,
    /// Superclass-first order, ties broken by declaration order
    class_order: Vec<ClassId>,
    static_count: u32,
}

impl TypeModel {
    pub fn new() -> Self {
        Self::default()
    }

    // Registration

    pub fn add_class(&mut self, class: ClassType) -> ClassId {
        let id = ClassId::new(self.classes.len());
        self.types_by_name.insert(class.symbol, Type::Class(id));
        self.classes.push(class);
        id
    }

    pub fn add_interface(&mut self, interface: InterfaceType) -> InterfaceId {
        let id = InterfaceId::new(self.interfaces.len());
        self.types_by_name
            .insert(interface.symbol, Type::Interface(id));
        self.interfaces.push(interface);
        id
    }

    pub fn add_method(&mut self, method: Method) -> MethodId {
        let id = MethodId::new(self.methods.len());
        self.methods.push(method);
        id
    }

    pub fn add_field(&mut self, field: Field) -> FieldId {
        let id = FieldId::new(self.fields.len());
        self.fields.push(field);
        id
    }

    /// Reserve the next static storage index
    pub fn next_static_index(&mut self) -> u32 {
        let index = self.static_count;
        self.static_count += 1;
        index
    }

    pub fn set_class_order(&mut self, order: Vec<ClassId>) {
        self.class_order = order;
    }

    // Access

    pub fn class(&self, id: ClassId) -> &ClassType {
        &self.classes[id.index()]
    }

    pub fn class_mut(&mut self, id: ClassId) -> &mut ClassType {
        &mut self.classes[id.index()]
    }

    pub fn interface(&self, id: InterfaceId) -> &InterfaceType {
        &self.interfaces[id.index()]
    }

    pub fn interface_mut(&mut self, id: InterfaceId) -> &mut InterfaceType {
        &mut self.interfaces[id.index()]
    }

    pub fn method(&self, id: MethodId) -> &Method {
        &self.methods[id.index()]
    }

    pub fn method_mut(&mut self, id: MethodId) -> &mut Method {
        &mut self.methods[id.index()]
    }

    pub fn field(&self, id: FieldId) -> &Field {
        &self.fields[id.index()]
    }

    pub fn class_ids(&self) -> impl Iterator<Item = ClassId> + '_ {
        (0..self.classes.len()).map(ClassId::new)
    }

    pub fn interface_ids(&self) -> impl Iterator<Item = InterfaceId> + '_ {
        (0..self.interfaces.len()).map(InterfaceId::new)
    }

    pub fn method_ids(&self) -> impl Iterator<Item = MethodId> + '_ {
        (0..self.methods.len()).map(MethodId::new)
    }

    pub fn class_order(&self) -> &[ClassId] {
        &self.class_order
    }

    pub fn static_count(&self) -> u32 {
        self.static_count
    }

    /// Static fields in initialization order: class order, then declaration order
    pub fn static_fields(&self) -> Vec<FieldId> {
        self.class_order
            .iter()
            .flat_map(|&c| self.class(c).fields.iter().copied())
            .filter(|&f| self.field(f).is_static())
            .collect()
    }

    pub fn lookup_type(&self, name: Symbol) -> Option<Type> {
        self.types_by_name.get(&name).copied()
    }

    pub fn find_class(&self, name: Symbol) -> Option<ClassId> {
        match self.lookup_type(name) {
            Some(Type::Class(id)) => Some(id),
            _ => None,
        }
    }

    pub fn find_class_by_name(&self, name: &str) -> Option<ClassId> {
        self.class_ids().find(|&c| self.class(c).name == name)
    }

    /// The class itself followed by its superclass chain
    pub fn ancestors(&self, class: ClassId) -> Ancestors<'_> {
        Ancestors {
            model: self,
            next: Some(class),
        }
    }

    /// Nearest field named `name` on the class or an ancestor
    pub fn lookup_field(&self, class: ClassId, name: Symbol) -> Option<FieldId> {
        self.ancestors(class).find_map(|c| {
            self.class(c)
                .fields
                .iter()
                .copied()
                .find(|&f| self.field(f).symbol == name)
        })
    }

    /// Every interface the class implements, directly or through an ancestor,
    /// in order of first appearance walking from the root class down.
    pub fn all_interfaces(&self, class: ClassId) -> Vec<InterfaceId> {
        let chain: SmallVec<[ClassId; 8]> = self.ancestors(class).collect();
        let mut result = Vec::new();
        for &c in chain.iter().rev() {
            for &i in &self.class(c).interfaces {
                if !result.contains(&i) {
                    result.push(i);
                }
            }
        }
        result
    }

    pub fn is_subclass(&self, class: ClassId, ancestor: ClassId) -> bool {
        self.ancestors(class).any(|c| c == ancestor)
    }

    pub fn implements(&self, class: ClassId, interface: InterfaceId) -> bool {
        self.ancestors(class)
            .any(|c| self.class(c).interfaces.contains(&interface))
    }

    /// Classes implementing the interface whose superclass does not
    pub fn root_implementors(&self, interface: InterfaceId) -> Vec<ClassId> {
        self.class_order
            .iter()
            .copied()
            .filter(|&c| {
                self.class(c).interfaces.contains(&interface)
                    && self
                        .class(c)
                        .superclass
                        .is_none_or(|s| !self.implements(s, interface))
            })
            .collect()
    }

    /// The subtype relation used for assignment, argument passing and returns
    pub fn assignable(&self, from: Type, to: Type) -> bool {
        match (from, to) {
            (Type::Int, Type::Int) | (Type::Boolean, Type::Boolean) => true,
            (Type::Null, Type::Class(_) | Type::Interface(_)) => true,
            (Type::Class(a), Type::Class(b)) => self.is_subclass(a, b),
            (Type::Class(a), Type::Interface(i)) => self.implements(a, i),
            (Type::Interface(a), Type::Interface(b)) => a == b,
            _ => false,
        }
    }

    // Display

    pub fn type_name(&self, ty: Type) -> String {
        match ty {
            Type::Int => "int".to_string(),
            Type::Boolean => "boolean".to_string(),
            Type::Void => "void".to_string(),
            Type::Null => "null".to_string(),
            Type::Class(id) => self.class(id).name.clone(),
            Type::Interface(id) => self.interface(id).name.clone(),
        }
    }

    pub fn type_list(&self, types: &[Type]) -> String {
        types
            .iter()
            .map(|&t| self.type_name(t))
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn owner_name(&self, owner: Owner) -> &str {
        match owner {
            Owner::Class(c) => &self.class(c).name,
            Owner::Interface(i) => &self.interface(i).name,
        }
    }

    /// `name(int,boolean)`
    pub fn signature(&self, id: MethodId) -> String {
        let method = self.method(id);
        let name = if method.is_constructor {
            self.owner_name(method.owner)
        } else {
            &method.name
        };
        format!("{}({})", name, self.type_list(&method.param_types()))
    }

    /// Entry symbol of a method body: `Owner.name(int,boolean)`,
    /// constructors use `Owner.<init>(...)`.
    pub fn entry_symbol(&self, id: MethodId) -> String {
        let method = self.method(id);
        let name = if method.is_constructor {
            "<init>"
        } else {
            &method.name
        };
        format!(
            "{}.{}({})",
            self.owner_name(method.owner),
            name,
            self.type_list(&method.param_types())
        )
    }
}

pub struct Ancestors<'a> {
    model: &'a TypeModel,
    next: Option<ClassId>,
}

impl Iterator for Ancestors<'_> {
    type Item = ClassId;

    fn next(&mut self) -> Option<ClassId> {
        let current = self.next?;
        self.next = self.model.class(current).superclass;
        Some(current)
    }
}
