// src/sema/analyzer/calls.rs
//
// Invocation checker: resolves every call site once and prepares its
// receiver for the backends.

use super::expr::Target;
use super::*;
use crate::frontend::ast::{Expr, ExprKind};
use crate::sema::resolve::{ResolveError, resolve_method};

impl Analyzer<'_> {
    /// Check `receiver.method(args)` or `method(args)`.
    ///
    /// Instance bindings with an explicit receiver get the receiver wrapped
    /// in a null guard; unqualified instance calls get a synthesized `this`.
    /// Static bindings leave the receiver alone and backends never evaluate
    /// it.
    pub(super) fn check_method_call(&mut self, expr: &mut Expr) -> Result<Type, SemanticError> {
        let id = expr.id;
        let ExprKind::MethodCall(call) = &mut expr.kind else {
            unreachable!("INTERNAL: method call expected");
        };

        let target = match call.receiver.as_mut() {
            Some(receiver) => Some(self.check_target(receiver)?),
            None => None,
        };
        let arg_types = self.check_args(&mut call.args)?;

        let receiver_ty = match target {
            None => Type::Class(self.context().class),
            Some(Target::Class(class)) => Type::Class(class),
            Some(Target::Value(ty)) if ty.is_class() || ty.is_interface() => ty,
            Some(Target::Value(ty)) => {
                let span = call.receiver.as_ref().map_or(call.method_span, |r| r.span);
                return Err(SemanticError::NotAnObject {
                    found: self.type_name(ty),
                    span: span.into(),
                });
            }
        };

        let method_name = self.resolve_name(call.method).to_string();
        let binding = match resolve_method(&self.model, receiver_ty, call.method, &arg_types) {
            Ok(binding) => binding,
            Err(ResolveError::NotFound) => {
                return Err(SemanticError::MethodNotFound {
                    receiver: self.type_name(receiver_ty),
                    method: method_name,
                    args: self.model.type_list(&arg_types),
                    span: call.method_span.into(),
                });
            }
            Err(ResolveError::Ambiguous(candidates)) => {
                return Err(SemanticError::AmbiguousCall {
                    receiver: self.type_name(receiver_ty),
                    method: method_name,
                    candidates: self.candidate_list(&candidates),
                    span: call.method_span.into(),
                });
            }
        };

        if !binding.is_static() {
            match target {
                None => {
                    if self.context().is_static {
                        return Err(SemanticError::InstanceMemberInStaticContext {
                            name: method_name,
                            span: call.method_span.into(),
                        });
                    }
                    let this_id = self.fresh_node_id();
                    self.data.set_type(this_id, receiver_ty);
                    call.receiver = Some(Expr {
                        id: this_id,
                        kind: ExprKind::This,
                        span: call.method_span,
                    });
                }
                Some(Target::Class(_)) => {
                    return Err(SemanticError::InstanceMemberInStaticContext {
                        name: method_name,
                        span: call.method_span.into(),
                    });
                }
                Some(Target::Value(_)) => {
                    if let Some(receiver) = call.receiver.as_mut() {
                        self.wrap_null_check(receiver);
                    }
                }
            }
        }

        tracing::trace!(
            call = %id,
            method = %self.model.entry_symbol(binding.method),
            dispatch = binding.dispatch.name(),
            "bound call site"
        );
        self.data.set_method(id, binding);
        Ok(self.model.method(binding.method).return_type)
    }
}
