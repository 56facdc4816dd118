// src/codegen/expr.rs

use cranelift::codegen::ir::BlockArg;
use cranelift::prelude::*;

use super::context::Cg;
use super::types::{CompiledValue, field_offset, static_offset};
use crate::errors::CodegenResult;
use crate::frontend::ast::{BinaryExpr, BinaryOp, Expr, ExprKind, UnaryOp};
use crate::sema::{FieldId, FieldLayout, NameRef, Type};

impl Cg<'_, '_, '_> {
    pub fn expr(&mut self, expr: &Expr) -> CodegenResult<CompiledValue> {
        match &expr.kind {
            ExprKind::IntLiteral(v) => Ok(self.int_const(*v)),
            ExprKind::BoolLiteral(v) => Ok(self.bool_const(*v)),
            ExprKind::Null => Ok(CompiledValue {
                value: self.zero(Type::Null),
                ty: Type::Null,
            }),
            ExprKind::This => Ok(CompiledValue {
                value: self.this(),
                ty: self.expr_type(expr),
            }),
            ExprKind::Identifier(name) => match self.name_ref(expr) {
                NameRef::Local => {
                    let (var, ty) = self.local(*name);
                    Ok(CompiledValue {
                        value: self.builder.use_var(var),
                        ty,
                    })
                }
                NameRef::Field(field) => {
                    let object = self.implicit_object(field);
                    Ok(self.load_field(field, object))
                }
                NameRef::Class(_) => unreachable!("INTERNAL: class name compiled as a value"),
            },
            ExprKind::Binary(binary) => self.binary(binary),
            ExprKind::Unary(unary) => {
                let operand = self.expr(&unary.operand)?;
                let value = match unary.op {
                    UnaryOp::Neg => self.builder.ins().ineg(operand.value),
                    UnaryOp::Not => self.builder.ins().icmp_imm(IntCC::Equal, operand.value, 0),
                };
                Ok(CompiledValue {
                    value,
                    ty: operand.ty,
                })
            }
            ExprKind::FieldAccess(access) => {
                let field = self.field_ref(expr);
                let object = if self.ctx.model().field(field).is_static() {
                    None
                } else {
                    Some(self.receiver(&access.object)?)
                };
                Ok(self.load_field(field, object))
            }
            ExprKind::MethodCall(_) => self.call(expr),
            ExprKind::New(new_expr) => self.new_object(expr, &new_expr.args),
            ExprKind::NullCheck(_) => self.receiver(expr),
        }
    }

    /// Compile the object of a member access. A null guard branches to the
    /// halt routine before anything about the member is compiled.
    pub fn receiver(&mut self, expr: &Expr) -> CodegenResult<CompiledValue> {
        match &expr.kind {
            ExprKind::NullCheck(inner) => {
                let value = self.expr(inner)?;
                self.null_guard(value.value, expr.span.line);
                Ok(value)
            }
            _ => self.expr(expr),
        }
    }

    fn binary(&mut self, binary: &BinaryExpr) -> CodegenResult<CompiledValue> {
        if matches!(binary.op, BinaryOp::And | BinaryOp::Or) {
            return self.short_circuit(binary);
        }
        let left = self.expr(&binary.left)?;
        let right = self.expr(&binary.right)?;
        let (l, r) = (left.value, right.value);
        let ins = self.builder.ins();
        let (value, ty) = match binary.op {
            BinaryOp::Add => (ins.iadd(l, r), Type::Int),
            BinaryOp::Sub => (ins.isub(l, r), Type::Int),
            BinaryOp::Mul => (ins.imul(l, r), Type::Int),
            BinaryOp::Lt => (ins.icmp(IntCC::SignedLessThan, l, r), Type::Boolean),
            BinaryOp::Gt => (ins.icmp(IntCC::SignedGreaterThan, l, r), Type::Boolean),
            BinaryOp::Le => (ins.icmp(IntCC::SignedLessThanOrEqual, l, r), Type::Boolean),
            BinaryOp::Ge => (ins.icmp(IntCC::SignedGreaterThanOrEqual, l, r), Type::Boolean),
            BinaryOp::Eq => (ins.icmp(IntCC::Equal, l, r), Type::Boolean),
            BinaryOp::Ne => (ins.icmp(IntCC::NotEqual, l, r), Type::Boolean),
            BinaryOp::And | BinaryOp::Or => unreachable!(),
        };
        Ok(CompiledValue { value, ty })
    }

    /// `&&` and `||`: the right operand runs only when the left one does
    /// not decide the result.
    fn short_circuit(&mut self, binary: &BinaryExpr) -> CodegenResult<CompiledValue> {
        let left = self.expr(&binary.left)?;

        let rhs_block = self.builder.create_block();
        let merge_block = self.builder.create_block();
        self.builder.append_block_param(merge_block, types::I8);

        let decided = [BlockArg::from(left.value)];
        if binary.op == BinaryOp::And {
            self.builder
                .ins()
                .brif(left.value, rhs_block, &[], merge_block, &decided);
        } else {
            self.builder
                .ins()
                .brif(left.value, merge_block, &decided, rhs_block, &[]);
        }

        self.builder.switch_to_block(rhs_block);
        self.builder.seal_block(rhs_block);
        let right = self.expr(&binary.right)?;
        self.builder
            .ins()
            .jump(merge_block, &[BlockArg::from(right.value)]);

        self.builder.switch_to_block(merge_block);
        self.builder.seal_block(merge_block);
        Ok(CompiledValue {
            value: self.builder.block_params(merge_block)[0],
            ty: Type::Boolean,
        })
    }

    // Fields

    /// Instance fields named without a receiver belong to `this`
    fn implicit_object(&self, field: FieldId) -> Option<CompiledValue> {
        if self.ctx.model().field(field).is_static() {
            return None;
        }
        let owner = self.ctx.model().field(field).owner;
        Some(CompiledValue {
            value: self.this(),
            ty: Type::Class(owner),
        })
    }

    pub fn load_field(&mut self, field: FieldId, object: Option<CompiledValue>) -> CompiledValue {
        let info = self.ctx.model().field(field);
        let (ty, layout) = (info.ty, info.layout);
        let cty = self.cranelift_type(ty);
        let value = match (layout, object) {
            (FieldLayout::Static(index), _) => {
                let base = self.statics_addr();
                self.builder
                    .ins()
                    .load(cty, MemFlags::trusted(), base, static_offset(index))
            }
            (FieldLayout::Instance(slot), Some(object)) => {
                self.builder
                    .ins()
                    .load(cty, MemFlags::trusted(), object.value, field_offset(slot))
            }
            (FieldLayout::Instance(_), None) => {
                panic!("INTERNAL: instance field {} read without an object", info.name)
            }
        };
        CompiledValue { value, ty }
    }

    pub fn store_field(&mut self, field: FieldId, object: Option<CompiledValue>, value: CompiledValue) {
        let info = self.ctx.model().field(field);
        let layout = info.layout;
        match (layout, object) {
            (FieldLayout::Static(index), _) => {
                let base = self.statics_addr();
                self.builder
                    .ins()
                    .store(MemFlags::trusted(), value.value, base, static_offset(index));
            }
            (FieldLayout::Instance(slot), Some(object)) => {
                self.builder
                    .ins()
                    .store(MemFlags::trusted(), value.value, object.value, field_offset(slot));
            }
            (FieldLayout::Instance(_), None) => {
                panic!("INTERNAL: instance field {} written without an object", info.name)
            }
        }
    }

    /// Store to a field named by an identifier or a field access
    pub fn assign_field(&mut self, target: &Expr, value: &Expr) -> CodegenResult<()> {
        let field = self.field_ref(target);
        let object = match &target.kind {
            ExprKind::Identifier(_) => self.implicit_object(field),
            ExprKind::FieldAccess(access) if !self.ctx.model().field(field).is_static() => {
                Some(self.receiver(&access.object)?)
            }
            ExprKind::FieldAccess(_) => None,
            other => unreachable!("INTERNAL: invalid field target {other:?}"),
        };
        let value = self.expr(value)?;
        self.store_field(field, object, value);
        Ok(())
    }

    fn statics_addr(&mut self) -> Value {
        let Some(statics) = self.ctx.symbols.statics else {
            panic!("INTERNAL: static storage was never declared");
        };
        self.data_addr(statics)
    }

    // Side tables

    pub fn expr_type(&self, expr: &Expr) -> Type {
        match self.ctx.analysis.data.get_type(expr.id) {
            Some(ty) => ty,
            None => panic!("INTERNAL: expression {} has no type", expr.id),
        }
    }

    pub fn name_ref(&self, expr: &Expr) -> NameRef {
        match self.ctx.analysis.data.get_name(expr.id) {
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
}
