// src/interp/eval.rs

use super::{Frame, Interpreter, Value, line_of};
use crate::errors::RuntimeError;
use crate::frontend::ast::{BinaryExpr, BinaryOp, Block, Expr, ExprKind, Stmt, TypeExprKind, UnaryOp, VarDecl};
use crate::runtime::{print_bool, print_int};
use crate::sema::{FieldId, FieldLayout, NameRef};

/// How control leaves a statement
pub(super) enum Flow {
    Next,
    Return(Option<Value>),
}

impl<'a> Interpreter<'a> {
    pub(super) fn exec_block(&mut self, block: &'a Block, frame: &mut Frame) -> Result<Flow, RuntimeError> {
        frame.push_scope();
        let result = self.exec_stmts(&block.stmts, frame);
        frame.pop_scope();
        result
    }

    fn exec_stmts(&mut self, stmts: &'a [Stmt], frame: &mut Frame) -> Result<Flow, RuntimeError> {
        for stmt in stmts {
            if let Flow::Return(value) = self.exec_stmt(stmt, frame)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Next)
    }

    fn exec_scoped(&mut self, stmt: &'a Stmt, frame: &mut Frame) -> Result<Flow, RuntimeError> {
        frame.push_scope();
        let result = self.exec_stmt(stmt, frame);
        frame.pop_scope();
        result
    }

    fn exec_stmt(&mut self, stmt: &'a Stmt, frame: &mut Frame) -> Result<Flow, RuntimeError> {
        match stmt {
            Stmt::Block(block) => self.exec_block(block, frame),
            Stmt::VarDecl(decl) => {
                let value = match &decl.init {
                    Some(init) => self.eval_expr(init, frame)?,
                    None => local_default(decl),
                };
                frame.define(decl.name, value);
                Ok(Flow::Next)
            }
            Stmt::Assign(assign) => {
                self.exec_assign(&assign.target, &assign.value, frame)?;
                Ok(Flow::Next)
            }
            Stmt::If(if_stmt) => {
                if self.eval_expr(&if_stmt.condition, frame)?.as_bool() {
                    self.exec_scoped(&if_stmt.then_branch, frame)
                } else if let Some(else_branch) = &if_stmt.else_branch {
                    self.exec_scoped(else_branch, frame)
                } else {
                    Ok(Flow::Next)
                }
            }
            Stmt::While(while_stmt) => {
                while self.eval_expr(&while_stmt.condition, frame)?.as_bool() {
                    if let Flow::Return(value) = self.exec_scoped(&while_stmt.body, frame)? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Next)
            }
            Stmt::Return(ret) => {
                let value = match &ret.value {
                    Some(value) => Some(self.eval_expr(value, frame)?),
                    None => None,
                };
                Ok(Flow::Return(value))
            }
            Stmt::Print(print) => {
                match self.eval_expr(&print.value, frame)? {
                    Value::Int(v) => print_int(v),
                    Value::Bool(v) => print_bool(v),
                    other => panic!("INTERNAL: println of {other}"),
                }
                Ok(Flow::Next)
            }
            Stmt::Expr(expr_stmt) => {
                self.eval_expr(&expr_stmt.expr, frame)?;
                Ok(Flow::Next)
            }
        }
    }

    fn exec_assign(&mut self, target: &'a Expr, value: &'a Expr, frame: &mut Frame) -> Result<(), RuntimeError> {
        match &target.kind {
            ExprKind::Identifier(name) => match self.name_ref(target) {
                NameRef::Local => {
                    let value = self.eval_expr(value, frame)?;
                    frame.assign(*name, value);
                }
                NameRef::Field(field) => {
                    let value = self.eval_expr(value, frame)?;
                    self.store_field(field, None, value, frame);
                }
                NameRef::Class(_) => unreachable!("INTERNAL: assignment to a class name"),
            },
            ExprKind::FieldAccess(access) => {
                let field = self.field_ref(target);
                let analysis = self.analysis;
                let info = analysis.model.field(field);
                let object = match info.layout {
                    FieldLayout::Static(_) => None,
                    FieldLayout::Instance(_) => Some(self.eval_receiver(&access.object, &info.name, frame)?),
                };
                let value = self.eval_expr(value, frame)?;
                self.store_field(field, object, value, frame);
            }
            other => unreachable!("INTERNAL: invalid assignment target {other:?}"),
        }
        Ok(())
    }

    pub(super) fn eval_expr(&mut self, expr: &'a Expr, frame: &mut Frame) -> Result<Value, RuntimeError> {
        match &expr.kind {
            ExprKind::IntLiteral(v) => Ok(Value::Int(*v)),
            ExprKind::BoolLiteral(v) => Ok(Value::Bool(*v)),
            ExprKind::Null => Ok(Value::Null),
            ExprKind::This => Ok(Value::Object(frame.this().clone())),
            ExprKind::Identifier(name) => match self.name_ref(expr) {
                NameRef::Local => Ok(frame.get(*name)),
                NameRef::Field(field) => Ok(self.load_field(field, None, frame)),
                NameRef::Class(_) => unreachable!("INTERNAL: class name evaluated as a value"),
            },
            ExprKind::Binary(binary) => self.eval_binary(binary, frame),
            ExprKind::Unary(unary) => {
                let operand = self.eval_expr(&unary.operand, frame)?;
                Ok(match unary.op {
                    UnaryOp::Neg => Value::Int(operand.as_int().wrapping_neg()),
                    UnaryOp::Not => Value::Bool(!operand.as_bool()),
                })
            }
            ExprKind::FieldAccess(access) => {
                let field = self.field_ref(expr);
                let analysis = self.analysis;
                let info = analysis.model.field(field);
                let object = match info.layout {
                    // static fields never evaluate the object expression
                    FieldLayout::Static(_) => None,
                    FieldLayout::Instance(_) => Some(self.eval_receiver(&access.object, &info.name, frame)?),
                };
                Ok(self.load_field(field, object, frame))
            }
            ExprKind::MethodCall(_) => self.eval_call(expr, frame),
            ExprKind::New(new_expr) => self.eval_new(expr, &new_expr.args, frame),
            ExprKind::NullCheck(_) => self.eval_receiver(expr, "value", frame),
        }
    }

    /// Evaluate the object of a member access. A null guard fails here,
    /// before anything about the member is evaluated.
    pub(super) fn eval_receiver(&mut self, expr: &'a Expr, member: &str, frame: &mut Frame) -> Result<Value, RuntimeError> {
        match &expr.kind {
            ExprKind::NullCheck(inner) => {
                let value = self.eval_expr(inner, frame)?;
                if value.is_null() {
                    tracing::debug!(member, line = line_of(expr), "null receiver");
                    return Err(RuntimeError::NullReceiver {
                        member: member.to_string(),
                        line: line_of(expr),
                    });
                }
                Ok(value)
            }
            _ => self.eval_expr(expr, frame),
        }
    }

    fn eval_binary(&mut self, binary: &'a BinaryExpr, frame: &mut Frame) -> Result<Value, RuntimeError> {
        let left = self.eval_expr(&binary.left, frame)?;
        match binary.op {
            BinaryOp::And if !left.as_bool() => return Ok(Value::Bool(false)),
            BinaryOp::Or if left.as_bool() => return Ok(Value::Bool(true)),
            _ => {}
        }
        let right = self.eval_expr(&binary.right, frame)?;
        let value = match binary.op {
            BinaryOp::Add => Value::Int(left.as_int().wrapping_add(right.as_int())),
            BinaryOp::Sub => Value::Int(left.as_int().wrapping_sub(right.as_int())),
            BinaryOp::Mul => Value::Int(left.as_int().wrapping_mul(right.as_int())),
            BinaryOp::Lt => Value::Bool(left.as_int() < right.as_int()),
            BinaryOp::Gt => Value::Bool(left.as_int() > right.as_int()),
            BinaryOp::Le => Value::Bool(left.as_int() <= right.as_int()),
            BinaryOp::Ge => Value::Bool(left.as_int() >= right.as_int()),
            BinaryOp::Eq => Value::Bool(left.same(&right)),
            BinaryOp::Ne => Value::Bool(!left.same(&right)),
            BinaryOp::And | BinaryOp::Or => right,
        };
        Ok(value)
    }

    fn name_ref(&self, expr: &Expr) -> NameRef {
        match self.analysis.data.get_name(expr.id) {
            Some(name) => name,
            None => panic!("INTERNAL: unresolved name at {}", expr.id),
        }
    }

    fn field_ref(&self, expr: &Expr) -> FieldId {
        match self.name_ref(expr) {
            NameRef::Field(field) => field,
            other => panic!("INTERNAL: field access {} resolved to {other:?}", expr.id),
        }
    }

    /// Read a field. Instance fields come from `object`, or from `this`
    /// when the field was named without a receiver.
    fn load_field(&self, field: FieldId, object: Option<Value>, frame: &Frame) -> Value {
        match self.analysis.model.field(field).layout {
            FieldLayout::Static(index) => self.statics[index as usize].clone(),
            FieldLayout::Instance(slot) => {
                let fields = |obj: &super::ObjectRef| obj.fields.borrow()[slot as usize].clone();
                match object {
                    Some(Value::Object(obj)) => fields(&obj),
                    Some(other) => panic!("INTERNAL: field read on {other}"),
                    None => fields(frame.this()),
                }
            }
        }
    }

    fn store_field(&mut self, field: FieldId, object: Option<Value>, value: Value, frame: &Frame) {
        match self.analysis.model.field(field).layout {
            FieldLayout::Static(index) => self.statics[index as usize] = value,
            FieldLayout::Instance(slot) => match object {
                Some(Value::Object(obj)) => obj.fields.borrow_mut()[slot as usize] = value,
                Some(other) => panic!("INTERNAL: field write on {other}"),
                None => frame.this().fields.borrow_mut()[slot as usize] = value,
            },
        }
    }
}

/// Locals declared without an initializer start at their type's default
fn local_default(decl: &VarDecl) -> Value {
    match decl.ty.kind {
        TypeExprKind::Int => Value::Int(0),
        TypeExprKind::Boolean => Value::Bool(false),
        TypeExprKind::Named(_) | TypeExprKind::Void => Value::Null,
    }
}
