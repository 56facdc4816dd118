// src/sema/analyzer/expr.rs

use super::*;
use crate::frontend::ast::{BinaryExpr, BinaryOp, Expr, ExprKind, FieldAccessExpr, NewExpr, UnaryExpr, UnaryOp};
use crate::sema::expression_data::NameRef;
use crate::sema::resolve::{ResolveError, resolve_constructor};
use crate::sema::types::FieldId;

/// What the object of a member access denotes
#[derive(Debug, Clone, Copy)]
pub(super) enum Target {
    /// A class name: only static members are reachable
    Class(ClassId),
    /// A value of the given static type
    Value(Type),
}

impl Analyzer<'_> {
    /// Check an expression and record its type.
    pub(super) fn check_expr(&mut self, expr: &mut Expr) -> Result<Type, SemanticError> {
        let ty = self.check_expr_kind(expr)?;
        self.data.set_type(expr.id, ty);
        Ok(ty)
    }

    fn check_expr_kind(&mut self, expr: &mut Expr) -> Result<Type, SemanticError> {
        match expr.kind {
            ExprKind::FieldAccess(_) => return self.check_field_access(expr),
            ExprKind::MethodCall(_) => return self.check_method_call(expr),
            _ => {}
        }

        let span = expr.span;
        let id = expr.id;
        match &mut expr.kind {
            ExprKind::IntLiteral(_) => Ok(Type::Int),
            ExprKind::BoolLiteral(_) => Ok(Type::Boolean),
            ExprKind::Null => Ok(Type::Null),
            ExprKind::This => {
                let ctx = self.context();
                if ctx.is_static {
                    return Err(SemanticError::ThisInStaticContext { span: span.into() });
                }
                Ok(Type::Class(ctx.class))
            }
            ExprKind::Identifier(sym) => {
                let sym = *sym;
                self.check_identifier(id, sym, span)
            }
            ExprKind::Binary(binary) => self.check_binary(binary),
            ExprKind::Unary(unary) => self.check_unary(unary),
            ExprKind::FieldAccess(_) | ExprKind::MethodCall(_) => {
                unreachable!("INTERNAL: member expressions are checked above")
            }
            ExprKind::New(new_expr) => self.check_new(id, new_expr, span),
            ExprKind::NullCheck(inner) => self.check_expr(inner),
        }
    }

    /// Locals shadow fields; a name that is neither is only meaningful as
    /// the object of a static member access.
    fn check_identifier(&mut self, id: NodeId, sym: Symbol, span: Span) -> Result<Type, SemanticError> {
        if let Some(ty) = self.scope.get(sym) {
            self.data.set_name(id, NameRef::Local);
            return Ok(ty);
        }
        if let Some(field) = self.field_in_context(sym) {
            let info = self.model.field(field);
            if !info.is_static() && self.context().is_static {
                return Err(SemanticError::InstanceMemberInStaticContext {
                    name: info.name.clone(),
                    span: span.into(),
                });
            }
            let ty = info.ty;
            self.data.set_name(id, NameRef::Field(field));
            return Ok(ty);
        }
        Err(SemanticError::UndefinedVariable {
            name: self.resolve_name(sym).to_string(),
            span: span.into(),
        })
    }

    fn field_in_context(&self, sym: Symbol) -> Option<FieldId> {
        self.model.lookup_field(self.context().class, sym)
    }

    /// Check the object of a field access or the receiver of a call.
    pub(super) fn check_target(&mut self, expr: &mut Expr) -> Result<Target, SemanticError> {
        if let ExprKind::Identifier(sym) = expr.kind
            && self.scope.get(sym).is_none()
            && self.field_in_context(sym).is_none()
            && let Some(class) = self.model.find_class(sym)
        {
            self.data.set_name(expr.id, NameRef::Class(class));
            return Ok(Target::Class(class));
        }
        Ok(Target::Value(self.check_expr(expr)?))
    }

    /// Replace `slot` with `NullCheck(slot)`, giving the guard a fresh node
    /// carrying the operand's type.
    pub(super) fn wrap_null_check(&mut self, slot: &mut Expr) {
        let guard_id = self.fresh_node_id();
        let placeholder = Expr {
            id: guard_id,
            kind: ExprKind::Null,
            span: slot.span,
        };
        let operand = std::mem::replace(slot, placeholder);
        if let Some(ty) = self.data.get_type(operand.id) {
            self.data.set_type(guard_id, ty);
        }
        slot.kind = ExprKind::NullCheck(Box::new(operand));
    }

    fn check_binary(&mut self, binary: &mut BinaryExpr) -> Result<Type, SemanticError> {
        let left = self.check_expr(&mut binary.left)?;
        let right = self.check_expr(&mut binary.right)?;
        match binary.op {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul => {
                self.expect_exact(left, Type::Int, binary.left.span)?;
                self.expect_exact(right, Type::Int, binary.right.span)?;
                Ok(Type::Int)
            }
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => {
                self.expect_exact(left, Type::Int, binary.left.span)?;
                self.expect_exact(right, Type::Int, binary.right.span)?;
                Ok(Type::Boolean)
            }
            BinaryOp::And | BinaryOp::Or => {
                self.expect_exact(left, Type::Boolean, binary.left.span)?;
                self.expect_exact(right, Type::Boolean, binary.right.span)?;
                Ok(Type::Boolean)
            }
            BinaryOp::Eq | BinaryOp::Ne => {
                let comparable = if left.is_primitive() || right.is_primitive() {
                    left == right && left != Type::Void
                } else {
                    (left == Type::Null && right == Type::Null)
                        || self.model.assignable(left, right)
                        || self.model.assignable(right, left)
                };
                if !comparable {
                    return Err(SemanticError::TypeMismatch {
                        expected: self.type_name(left),
                        found: self.type_name(right),
                        span: binary.right.span.into(),
                    });
                }
                Ok(Type::Boolean)
            }
        }
    }

    fn check_unary(&mut self, unary: &mut UnaryExpr) -> Result<Type, SemanticError> {
        let operand = self.check_expr(&mut unary.operand)?;
        let expected = match unary.op {
            UnaryOp::Neg => Type::Int,
            UnaryOp::Not => Type::Boolean,
        };
        self.expect_exact(operand, expected, unary.operand.span)?;
        Ok(expected)
    }

    fn check_field_access(&mut self, expr: &mut Expr) -> Result<Type, SemanticError> {
        let id = expr.id;
        let ExprKind::FieldAccess(access) = &mut expr.kind else {
            unreachable!("INTERNAL: field access expected");
        };
        let access: &mut FieldAccessExpr = access;

        let target = self.check_target(&mut access.object)?;
        let class = match target {
            Target::Class(class) => class,
            Target::Value(Type::Class(class)) => class,
            Target::Value(Type::Interface(interface)) => {
                return Err(SemanticError::UndefinedField {
                    ty: self.model.interface(interface).name.clone(),
                    field: self.resolve_name(access.field).to_string(),
                    span: access.field_span.into(),
                });
            }
            Target::Value(other) => {
                return Err(SemanticError::NotAnObject {
                    found: self.type_name(other),
                    span: access.object.span.into(),
                });
            }
        };

        let Some(field) = self.model.lookup_field(class, access.field) else {
            return Err(SemanticError::UndefinedField {
                ty: self.model.class(class).name.clone(),
                field: self.resolve_name(access.field).to_string(),
                span: access.field_span.into(),
            });
        };

        let info = self.model.field(field);
        let ty = info.ty;
        let is_static = info.is_static();
        match target {
            Target::Class(_) if !is_static => {
                return Err(SemanticError::InstanceMemberInStaticContext {
                    name: self.model.field(field).name.clone(),
                    span: access.field_span.into(),
                });
            }
            Target::Value(_) if !is_static => self.wrap_null_check(&mut access.object),
            // static field named through a class or a value: the object is not evaluated
            _ => {}
        }

        self.data.set_name(id, NameRef::Field(field));
        Ok(ty)
    }

    fn check_new(&mut self, id: NodeId, new_expr: &mut NewExpr, span: Span) -> Result<Type, SemanticError> {
        let class_name = self.resolve_name(new_expr.class).to_string();
        let class = match self.model.lookup_type(new_expr.class) {
            Some(Type::Class(class)) => class,
            Some(_) => {
                return Err(SemanticError::InstantiateInterface {
                    name: class_name,
                    span: new_expr.class_span.into(),
                });
            }
            None => {
                return Err(SemanticError::UnknownType {
                    name: class_name,
                    span: new_expr.class_span.into(),
                });
            }
        };

        let arg_types = self.check_args(&mut new_expr.args)?;
        match resolve_constructor(&self.model, class, &arg_types) {
            Ok(ctor) => {
                self.data.set_constructor(id, ctor);
                Ok(Type::Class(class))
            }
            Err(ResolveError::NotFound) => Err(SemanticError::ConstructorNotFound {
                class: class_name,
                args: self.model.type_list(&arg_types),
                span: span.into(),
            }),
            Err(ResolveError::Ambiguous(candidates)) => Err(SemanticError::AmbiguousConstructor {
                class: class_name,
                candidates: self.candidate_list(&candidates),
                span: span.into(),
            }),
        }
    }

    pub(super) fn check_args(&mut self, args: &mut [Expr]) -> Result<Vec<Type>, SemanticError> {
        let mut types = Vec::with_capacity(args.len());
        for arg in args {
            types.push(self.check_expr(arg)?);
        }
        Ok(types)
    }

    pub(super) fn candidate_list(&self, candidates: &[MethodId]) -> String {
        candidates
            .iter()
            .map(|&m| self.model.signature(m))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn expect_exact(&self, found: Type, expected: Type, span: Span) -> Result<(), SemanticError> {
        if found == expected {
            Ok(())
        } else {
            Err(SemanticError::TypeMismatch {
                expected: self.type_name(expected),
                found: self.type_name(found),
                span: span.into(),
            })
        }
    }
}
