// src/codegen/context.rs
//
// Per-function codegen context. Methods are implemented across multiple
// files using split impl blocks:
// - expr.rs: expr(), receiver(), field access
// - stmt.rs: block(), stmt()
// - calls.rs: call(), new_object(), super constructor chaining

use cranelift::codegen::ir::{FuncRef, GlobalValue};
use cranelift::prelude::*;
use cranelift_module::{DataId, FuncId, Module};
use rustc_hash::FxHashMap;

use super::runtime_registry::RuntimeKey;
use super::types::{CompileCtx, CompiledValue, type_to_cranelift};
use crate::frontend::Symbol;
use crate::sema::{MethodId, Type};

pub(crate) struct Cg<'a, 'b, 'ctx> {
    pub builder: &'a mut FunctionBuilder<'b>,
    pub ctx: &'a mut CompileCtx<'ctx>,
    /// Innermost scope last
    scopes: Vec<FxHashMap<Symbol, (Variable, Type)>>,
    /// Receiver of the function being compiled
    this: Option<Value>,
    /// Functions and data objects already imported into this function
    func_refs: FxHashMap<FuncId, FuncRef>,
    globals: FxHashMap<DataId, GlobalValue>,
}

impl<'a, 'b, 'ctx> Cg<'a, 'b, 'ctx> {
    pub fn new(builder: &'a mut FunctionBuilder<'b>, ctx: &'a mut CompileCtx<'ctx>) -> Self {
        Self {
            builder,
            ctx,
            scopes: vec![FxHashMap::default()],
            this: None,
            func_refs: FxHashMap::default(),
            globals: FxHashMap::default(),
        }
    }

    pub fn set_this(&mut self, this: Value) {
        self.this = Some(this);
    }

    pub fn this(&self) -> Value {
        match self.this {
            Some(this) => this,
            None => panic!("INTERNAL: 'this' used in a static function"),
        }
    }

    pub fn pointer_type(&self) -> types::Type {
        self.ctx.pointer_type
    }

    pub fn cranelift_type(&self, ty: Type) -> types::Type {
        match type_to_cranelift(ty, self.ctx.pointer_type) {
            Some(cty) => cty,
            None => panic!("INTERNAL: void has no value representation"),
        }
    }

    // Locals

    pub fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Declare a local in the innermost scope and give it `value`
    pub fn define_local(&mut self, name: Symbol, ty: Type, value: Value) {
        let cty = self.cranelift_type(ty);
        let var = self.builder.declare_var(cty);
        self.builder.def_var(var, value);
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, (var, ty));
        }
    }

    pub fn local(&self, name: Symbol) -> (Variable, Type) {
        for scope in self.scopes.iter().rev() {
            if let Some(&entry) = scope.get(&name) {
                return entry;
            }
        }
        panic!("INTERNAL: local {:?} has no variable", name);
    }

    // Values

    /// Zero value of a type: 0, false or null
    pub fn zero(&mut self, ty: Type) -> Value {
        let cty = self.cranelift_type(ty);
        self.builder.ins().iconst(cty, 0)
    }

    pub fn int_const(&mut self, value: i32) -> CompiledValue {
        CompiledValue {
            value: self.builder.ins().iconst(types::I32, value as i64),
            ty: Type::Int,
        }
    }

    pub fn bool_const(&mut self, value: bool) -> CompiledValue {
        CompiledValue {
            value: self.builder.ins().iconst(types::I8, value as i64),
            ty: Type::Boolean,
        }
    }

    // Module references

    pub fn func_ref(&mut self, func_id: FuncId) -> FuncRef {
        if let Some(&func_ref) = self.func_refs.get(&func_id) {
            return func_ref;
        }
        let func_ref = self.ctx.module.declare_func_in_func(func_id, self.builder.func);
        self.func_refs.insert(func_id, func_ref);
        func_ref
    }

    /// Address of a module data object
    pub fn data_addr(&mut self, data_id: DataId) -> Value {
        let gv = match self.globals.get(&data_id) {
            Some(&gv) => gv,
            None => {
                let gv = self.ctx.module.declare_data_in_func(data_id, self.builder.func);
                self.globals.insert(data_id, gv);
                gv
            }
        };
        let ptr = self.pointer_type();
        self.builder.ins().global_value(ptr, gv)
    }

    pub fn call_runtime(&mut self, key: RuntimeKey, args: &[Value]) -> Option<Value> {
        let func_id = self.ctx.symbols.runtime(key);
        let func_ref = self.func_ref(func_id);
        let inst = self.builder.ins().call(func_ref, args);
        self.builder.inst_results(inst).first().copied()
    }

    /// Direct call of a method's entry
    pub fn call_direct(&mut self, method: MethodId, args: &[Value]) -> Option<Value> {
        let func_id = self.ctx.symbols.method(self.ctx.model(), method);
        let func_ref = self.func_ref(func_id);
        let inst = self.builder.ins().call(func_ref, args);
        self.builder.inst_results(inst).first().copied()
    }

    // Control flow

    /// Continue in a fresh block no edge reaches, after a terminator
    pub fn start_unreachable_block(&mut self) {
        let block = self.builder.create_block();
        self.builder.switch_to_block(block);
    }

    /// Branch to a cold block reporting a null receiver when `value` is
    /// null. The halt routine never returns.
    pub fn null_guard(&mut self, value: Value, line: u32) {
        let is_null = self.builder.ins().icmp_imm(IntCC::Equal, value, 0);
        let null_block = self.builder.create_block();
        let ok_block = self.builder.create_block();
        self.builder.set_cold_block(null_block);
        self.builder.ins().brif(is_null, null_block, &[], ok_block, &[]);

        self.builder.switch_to_block(null_block);
        self.builder.seal_block(null_block);
        let line = self.builder.ins().iconst(types::I32, line as i64);
        self.call_runtime(RuntimeKey::NullReceiver, &[line]);
        self.builder.ins().trap(TrapCode::unwrap_user(1));

        self.builder.switch_to_block(ok_block);
        self.builder.seal_block(ok_block);
    }

    /// Terminate the current block the way falling off the end of a
    /// function does: a bare return for void functions, a trap otherwise
    /// (the checker guarantees such an end is unreachable).
    pub fn finish_function(&mut self, returns_value: bool) {
        if returns_value {
            self.builder.ins().trap(TrapCode::unwrap_user(2));
        } else {
            self.builder.ins().return_(&[]);
        }
        self.builder.seal_all_blocks();
    }
}
