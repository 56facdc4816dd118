// src/interp/calls.rs

use std::cell::RefCell;
use std::rc::Rc;

use super::eval::Flow;
use super::{Frame, Interpreter, Object, ObjectRef, Value};
use crate::errors::RuntimeError;
use crate::frontend::ast::{Expr, ExprKind};
use crate::sema::{ClassId, DispatchKind, FieldLayout, MethodBody, MethodId, Owner};

impl<'a> Interpreter<'a> {
    /// Evaluate a bound call site. The receiver (if the binding needs one)
    /// is evaluated and null-checked before any argument.
    pub(super) fn eval_call(&mut self, expr: &'a Expr, frame: &mut Frame) -> Result<Value, RuntimeError> {
        let ExprKind::MethodCall(call) = &expr.kind else {
            unreachable!("INTERNAL: method call expected");
        };
        let analysis = self.analysis;
        let Some(binding) = analysis.data.get_method(expr.id).copied() else {
            panic!("INTERNAL: call site {} was never bound", expr.id);
        };
        let method = analysis.model.method(binding.method);

        let receiver = match binding.dispatch {
            // the receiver expression of a static call is never evaluated
            DispatchKind::Static => None,
            DispatchKind::Virtual { .. } | DispatchKind::Interface { .. } => {
                let Some(receiver_expr) = call.receiver.as_ref() else {
                    panic!("INTERNAL: instance call {} has no receiver", expr.id);
                };
                match self.eval_receiver(receiver_expr, &method.name, frame)? {
                    Value::Object(obj) => Some(obj),
                    other => panic!("INTERNAL: receiver evaluated to {other}"),
                }
            }
        };

        let args = self.eval_args(&call.args, frame)?;

        let target = match (binding.dispatch, &receiver) {
            (DispatchKind::Static, _) => binding.method,
            (DispatchKind::Virtual { slot }, Some(obj)) => {
                analysis.model.class(obj.class).dispatch().method_at(slot)
            }
            (DispatchKind::Interface { interface, slot }, Some(obj)) => {
                let class = analysis.model.class(obj.class);
                let Some(table) = class.dispatch().secondary_for(interface) else {
                    panic!(
                        "INTERNAL: class {} has no table for interface {}",
                        class.name,
                        analysis.model.interface(interface).name
                    );
                };
                match table.entries.get(slot as usize) {
                    Some(&m) => m,
                    None => panic!("INTERNAL: interface slot {} out of range", slot),
                }
            }
            (_, None) => unreachable!("INTERNAL: dynamic dispatch without a receiver"),
        };

        tracing::trace!(
            bound = %analysis.model.entry_symbol(binding.method),
            target = %analysis.model.entry_symbol(target),
            dispatch = binding.dispatch.name(),
            "call"
        );
        Ok(self.invoke(target, receiver, args)?.unwrap_or(Value::Null))
    }

    /// `new C(args)`: allocate with default field values, then run the
    /// selected constructor (which chains to its superclasses first).
    pub(super) fn eval_new(&mut self, expr: &'a Expr, args: &'a [Expr], frame: &mut Frame) -> Result<Value, RuntimeError> {
        let analysis = self.analysis;
        let Some(ctor) = analysis.data.get_constructor(expr.id) else {
            panic!("INTERNAL: constructor of {} was never selected", expr.id);
        };
        let Owner::Class(class) = analysis.model.method(ctor).owner else {
            unreachable!("INTERNAL: constructor owned by an interface");
        };

        let args = self.eval_args(args, frame)?;
        let obj = Rc::new(Object {
            class,
            fields: RefCell::new(self.field_defaults(class)),
        });
        self.invoke(ctor, Some(obj.clone()), args)?;
        Ok(Value::Object(obj))
    }

    fn eval_args(&mut self, args: &'a [Expr], frame: &mut Frame) -> Result<Vec<Value>, RuntimeError> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_expr(arg, frame)?);
        }
        Ok(values)
    }

    /// Initial instance field values, inherited fields included
    fn field_defaults(&self, class: ClassId) -> Vec<Value> {
        let model = &self.analysis.model;
        let mut values = vec![Value::Null; model.class(class).instance_field_count as usize];
        for c in model.ancestors(class) {
            for &field in &model.class(c).fields {
                let info = model.field(field);
                if let FieldLayout::Instance(slot) = info.layout {
                    values[slot as usize] = Value::default_for(info.ty);
                }
            }
        }
        values
    }

    /// Run one method activation
    pub(super) fn invoke(
        &mut self,
        method: MethodId,
        this: Option<ObjectRef>,
        args: Vec<Value>,
    ) -> Result<Option<Value>, RuntimeError> {
        if self.depth >= self.options.max_call_depth {
            return Err(RuntimeError::StackOverflow {
                limit: self.options.max_call_depth,
            });
        }
        self.depth += 1;
        let result = self.invoke_body(method, this, args);
        self.depth -= 1;
        result
    }

    fn invoke_body(
        &mut self,
        method: MethodId,
        this: Option<ObjectRef>,
        args: Vec<Value>,
    ) -> Result<Option<Value>, RuntimeError> {
        let analysis = self.analysis;
        let info = analysis.model.method(method);

        if info.is_constructor {
            self.chain_super_constructor(info.owner, &this)?;
        }

        let Some(body) = analysis.body_of(method) else {
            return match info.body {
                MethodBody::Implicit => Ok(None),
                _ => panic!(
                    "INTERNAL: {} has no body to invoke",
                    analysis.model.entry_symbol(method)
                ),
            };
        };

        let mut frame = Frame::new(this);
        for (param, value) in info.params.iter().zip(args) {
            frame.define(param.name, value);
        }
        match self.exec_block(body, &mut frame)? {
            Flow::Return(value) => Ok(value),
            Flow::Next => Ok(None),
        }
    }

    /// Constructors first run the superclass's zero-argument constructor
    fn chain_super_constructor(&mut self, owner: Owner, this: &Option<ObjectRef>) -> Result<(), RuntimeError> {
        let model = &self.analysis.model;
        let Owner::Class(class) = owner else {
            return Ok(());
        };
        let Some(superclass) = model.class(class).superclass else {
            return Ok(());
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
        self.invoke(super_ctor, this.clone(), Vec::new())?;
        Ok(())
    }
}
