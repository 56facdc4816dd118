// src/codegen/calls.rs
//
// Invocation sequences. Every call site is compiled from the binding the
// checker recorded for it; nothing is resolved here.

use cranelift::prelude::*;
use smallvec::SmallVec;

use super::context::Cg;
use super::runtime_registry::RuntimeKey;
use super::types::{CompiledValue, VTABLE_OFFSET, instance_words, method_signature};
use crate::errors::{CodegenError, CodegenResult};
use crate::frontend::ast::{Expr, ExprKind};
use crate::sema::{ClassId, DispatchKind, InterfaceId, MethodBinding, MethodId, Owner, Type, TypeModel};

type ArgValues = SmallVec<[Value; 6]>;

impl Cg<'_, '_, '_> {
    /// Compile a bound call site. The receiver of an instance binding is
    /// compiled (and null-guarded) before any argument.
    pub fn call(&mut self, expr: &Expr) -> CodegenResult<CompiledValue> {
        let ExprKind::MethodCall(call) = &expr.kind else {
            unreachable!("INTERNAL: method call expected");
        };
        let model = self.ctx.model();
        let Some(binding) = self.ctx.analysis.data.get_method(expr.id).copied() else {
            panic!("INTERNAL: call site {} was never bound", expr.id);
        };
        let return_type = model.method(binding.method).return_type;
        assert_slot_in_range(model, binding);

        let mut args = ArgValues::new();
        let receiver = match binding.dispatch {
            // the receiver expression of a static call is never compiled
            DispatchKind::Static => None,
            DispatchKind::Virtual { .. } | DispatchKind::Interface { .. } => {
                let Some(receiver_expr) = call.receiver.as_ref() else {
                    panic!("INTERNAL: instance call {} has no receiver", expr.id);
                };
                let receiver = self.receiver(receiver_expr)?.value;
                args.push(receiver);
                Some(receiver)
            }
        };
        for arg in &call.args {
            args.push(self.expr(arg)?.value);
        }

        let result = match (binding.dispatch, receiver) {
            (DispatchKind::Static, _) => self.call_direct(binding.method, &args),
            (DispatchKind::Virtual { slot }, Some(receiver)) => {
                let vtable = self.load_vtable(receiver);
                self.call_through_table(vtable, slot, binding.method, &args)
            }
            (DispatchKind::Interface { interface, slot }, Some(_)) => {
                match self.interface_table(interface) {
                    Ok(Some(itable)) => self.call_through_table(itable, slot, binding.method, &args),
                    Ok(None) => {
                        // no class implements the interface: only null reaches here
                        self.builder.ins().trap(TrapCode::unwrap_user(3));
                        self.start_unreachable_block();
                        return Ok(self.placeholder(return_type));
                    }
                    Err(e) => return Err(e.with_span(expr.span)),
                }
            }
            (_, None) => unreachable!("INTERNAL: dynamic dispatch without a receiver"),
        };

        Ok(match result {
            Some(value) => CompiledValue {
                value,
                ty: return_type,
            },
            None => self.placeholder(Type::Void),
        })
    }

    /// Value standing in for a call without a result. Void results are
    /// never read; the checker rejects them everywhere but statement position.
    fn placeholder(&mut self, ty: Type) -> CompiledValue {
        let value = match ty {
            Type::Void => self.builder.ins().iconst(types::I8, 0),
            other => self.zero(other),
        };
        CompiledValue { value, ty }
    }

    /// Call primary slot `slot` of the receiver in `args[0]`. `root` is the
    /// class whose primary table the slot was taken from.
    pub fn redispatch(&mut self, root: ClassId, slot: u32, method: MethodId, args: &[Value]) -> Option<Value> {
        let Some(&receiver) = args.first() else {
            panic!("INTERNAL: re-dispatch without a receiver");
        };
        let class = self.ctx.model().class(root);
        check_slot(slot, class.dispatch().len(), &class.name);
        let vtable = self.load_vtable(receiver);
        self.call_through_table(vtable, slot, method, args)
    }

    fn load_vtable(&mut self, object: Value) -> Value {
        let ptr = self.pointer_type();
        self.builder
            .ins()
            .load(ptr, MemFlags::trusted(), object, VTABLE_OFFSET)
    }

    /// Load the function at `slot` of a materialized table and call it.
    /// `method` supplies the signature; every entry that can occupy the
    /// slot shares it.
    fn call_through_table(&mut self, table: Value, slot: u32, method: MethodId, args: &[Value]) -> Option<Value> {
        let ptr = self.pointer_type();
        let offset = slot as i32 * ptr.bytes() as i32;
        let func_ptr = self
            .builder
            .ins()
            .load(ptr, MemFlags::trusted(), table, offset);
        let sig = method_signature(self.ctx.module, self.ctx.model(), method);
        let sig_ref = self.builder.import_signature(sig);
        let inst = self.builder.ins().call_indirect(sig_ref, func_ptr, args);
        self.builder.inst_results(inst).first().copied()
    }

    /// The secondary table used by a compiled call through `interface`:
    /// the one of its unique root implementor. `None` when nothing
    /// implements the interface.
    fn interface_table(&mut self, interface: InterfaceId) -> CodegenResult<Option<Value>> {
        let model = self.ctx.model();
        if let Some(&itable) = self.ctx.symbols.itables.get(&interface) {
            return Ok(Some(self.data_addr(itable)));
        }
        let roots = model.root_implementors(interface);
        if roots.is_empty() {
            return Ok(None);
        }
        let names: Vec<&str> = roots.iter().map(|&c| model.class(c).name.as_str()).collect();
        Err(CodegenError::unsupported_with_context(
            "interface call with several root implementors",
            format!(
                "{} is implemented independently by {}",
                model.interface(interface).name,
                names.join(", ")
            ),
        ))
    }

    /// `new C(args)`: arguments, allocation, table reference, constructor
    pub fn new_object(&mut self, expr: &Expr, args: &[Expr]) -> CodegenResult<CompiledValue> {
        let model = self.ctx.model();
        let Some(ctor) = self.ctx.analysis.data.get_constructor(expr.id) else {
            panic!("INTERNAL: constructor of {} was never selected", expr.id);
        };
        let Owner::Class(class) = model.method(ctor).owner else {
            unreachable!("INTERNAL: constructor owned by an interface");
        };

        let mut values = ArgValues::new();
        for arg in args {
            values.push(self.expr(arg)?.value);
        }

        let object = self.allocate(class);
        values.insert(0, object);
        self.call_direct(ctor, &values);
        Ok(CompiledValue {
            value: object,
            ty: Type::Class(class),
        })
    }

    /// Zeroed instance storage with its primary-table reference set
    fn allocate(&mut self, class: ClassId) -> Value {
        let model = self.ctx.model();
        let words = self
            .builder
            .ins()
            .iconst(types::I32, instance_words(model, class) as i64);
        let Some(object) = self.call_runtime(RuntimeKey::NewObject, &[words]) else {
            unreachable!("INTERNAL: allocator returned nothing");
        };
        let vtable_id = self.ctx.symbols.vtable(model, class);
        let vtable = self.data_addr(vtable_id);
        self.builder
            .ins()
            .store(MemFlags::trusted(), vtable, object, VTABLE_OFFSET);
        object
    }

    /// Constructors of subclasses first run the superclass's
    /// zero-argument constructor on the same receiver.
    pub fn chain_super_constructor(&mut self, class: ClassId) {
        let model = self.ctx.model();
        let Some(superclass) = model.class(class).superclass else {
            return;
        };
        let Some(super_ctor) = model
            .class(superclass)
            .constructors
            .iter()
            .copied()
            .find(|&c| model.method(c).params.is_empty())
        else {
            panic!(
                "INTERNAL: {} has no zero-argument constructor",
                model.class(superclass).name
            );
        };
        let this = self.this();
        self.call_direct(super_ctor, &[this]);
    }
}

/// Abort when a recorded slot lies outside the table the call indexes.
/// Bindings only carry slots the table builder assigned.
pub(super) fn assert_slot_in_range(model: &TypeModel, binding: MethodBinding) {
    match binding.dispatch {
        DispatchKind::Static => {}
        DispatchKind::Virtual { slot } => {
            let Owner::Class(owner) = model.method(binding.method).owner else {
                panic!(
                    "INTERNAL: virtual binding of interface signature {}",
                    model.signature(binding.method)
                );
            };
            let class = model.class(owner);
            check_slot(slot, class.dispatch().len(), &class.name);
        }
        DispatchKind::Interface { interface, slot } => {
            let interface = model.interface(interface);
            check_slot(slot, interface.methods.len(), &interface.name);
        }
    }
}

fn check_slot(slot: u32, len: usize, table: &str) {
    if slot as usize >= len {
        panic!(
            "INTERNAL: slot {} out of range for {} table of length {}",
            slot, table, len
        );
    }
}
