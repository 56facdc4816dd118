// src/codegen/types.rs
//
// Value representation and the shared state of one compilation.

use cranelift::prelude::{AbiParam, Signature, types};
use cranelift_jit::JITModule;
use cranelift_module::{DataId, FuncId, Module};
use rustc_hash::FxHashMap;

use super::runtime_registry::RuntimeKey;
use crate::sema::{Analysis, ClassId, InterfaceId, MethodId, Owner, Type, TypeModel};

/// Bytes per instance word: the table reference and every field
pub(crate) const WORD_BYTES: i32 = 8;

/// Offset of the primary-table reference inside an instance
pub(crate) const VTABLE_OFFSET: i32 = 0;

/// Symbol of the routine running static initializers
pub const STATIC_INIT_SYMBOL: &str = "__static_init";

/// Symbol of the program entry (static init, then main)
pub const ENTRY_SYMBOL: &str = "__entry";

/// Byte offset of instance field `slot`
pub(crate) fn field_offset(slot: u32) -> i32 {
    WORD_BYTES + slot as i32 * WORD_BYTES
}

/// Byte offset of static field `index` in the static storage area
pub(crate) fn static_offset(index: u32) -> i32 {
    index as i32 * WORD_BYTES
}

/// Words allocated for an instance: table reference plus fields
pub(crate) fn instance_words(model: &TypeModel, class: ClassId) -> u32 {
    1 + model.class(class).instance_field_count
}

pub(crate) fn vtable_symbol(model: &TypeModel, class: ClassId) -> String {
    format!("vtable.{}", model.class(class).name)
}

pub(crate) fn itable_symbol(model: &TypeModel, interface: InterfaceId, class: ClassId) -> String {
    format!(
        "itable.{}.{}",
        model.interface(interface).name,
        model.class(class).name
    )
}

/// A compiled expression and its static type
#[derive(Debug, Clone, Copy)]
pub struct CompiledValue {
    pub value: cranelift::prelude::Value,
    pub ty: Type,
}

/// Cranelift type of a value of static type `ty`; `None` for void.
pub(crate) fn type_to_cranelift(ty: Type, pointer_type: types::Type) -> Option<types::Type> {
    match ty {
        Type::Int => Some(types::I32),
        Type::Boolean => Some(types::I8),
        Type::Void => None,
        Type::Null | Type::Class(_) | Type::Interface(_) => Some(pointer_type),
    }
}

/// ABI signature of a method body: receiver first for instance methods
/// and constructors, then the declared parameters.
pub(crate) fn method_signature(module: &JITModule, model: &TypeModel, method: MethodId) -> Signature {
    let pointer_type = module.target_config().pointer_type();
    let info = model.method(method);
    let mut sig = module.make_signature();
    if !info.is_static {
        sig.params.push(AbiParam::new(pointer_type));
    }
    for param in &info.params {
        if let Some(ty) = type_to_cranelift(param.ty, pointer_type) {
            sig.params.push(AbiParam::new(ty));
        }
    }
    if let Some(ret) = type_to_cranelift(info.return_type, pointer_type) {
        sig.returns.push(AbiParam::new(ret));
    }
    sig
}

/// Module-level symbols of one compilation
#[derive(Debug, Default)]
pub(crate) struct Symbols {
    /// Entry of every class-owned method and constructor
    pub methods: FxHashMap<MethodId, FuncId>,
    pub vtables: FxHashMap<ClassId, DataId>,
    /// Call-site secondary table of each interface with a unique root
    /// implementor
    pub itables: FxHashMap<InterfaceId, DataId>,
    pub statics: Option<DataId>,
    pub static_init: Option<FuncId>,
    pub runtime: FxHashMap<RuntimeKey, FuncId>,
}

impl Symbols {
    pub fn method(&self, model: &TypeModel, method: MethodId) -> FuncId {
        match self.methods.get(&method) {
            Some(&id) => id,
            None => panic!(
                "INTERNAL: no entry declared for {}",
                model.entry_symbol(method)
            ),
        }
    }

    pub fn vtable(&self, model: &TypeModel, class: ClassId) -> DataId {
        match self.vtables.get(&class) {
            Some(&id) => id,
            None => panic!("INTERNAL: no table for class {}", model.class(class).name),
        }
    }

    pub fn runtime(&self, key: RuntimeKey) -> FuncId {
        match self.runtime.get(&key) {
            Some(&id) => id,
            None => panic!("INTERNAL: runtime function {} not imported", key.c_name()),
        }
    }
}

/// Shared state threaded through every function of one compilation
pub(crate) struct CompileCtx<'a> {
    pub analysis: &'a Analysis,
    pub module: &'a mut JITModule,
    pub symbols: &'a Symbols,
    pub pointer_type: types::Type,
}

impl<'a> CompileCtx<'a> {
    pub fn model(&self) -> &'a TypeModel {
        &self.analysis.model
    }
}

/// Classes owning a body-carrying entry
pub(crate) fn method_owner(model: &TypeModel, method: MethodId) -> Option<ClassId> {
    match model.method(method).owner {
        Owner::Class(class) => Some(class),
        Owner::Interface(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_offsets() {
        assert_eq!(VTABLE_OFFSET, 0);
        assert_eq!(field_offset(0), 8);
        assert_eq!(field_offset(2), 24);
        assert_eq!(static_offset(3), 24);
    }

    #[test]
    fn value_types() {
        let ptr = types::I64;
        assert_eq!(type_to_cranelift(Type::Int, ptr), Some(types::I32));
        assert_eq!(type_to_cranelift(Type::Boolean, ptr), Some(types::I8));
        assert_eq!(type_to_cranelift(Type::Void, ptr), None);
        assert_eq!(type_to_cranelift(Type::Null, ptr), Some(ptr));
    }
}
