// src/codegen/stmt.rs

use cranelift::prelude::*;

use super::context::Cg;
use super::runtime_registry::RuntimeKey;
use crate::errors::CodegenResult;
use crate::frontend::ast::{Block, ExprKind, IfStmt, Stmt, TypeExprKind, VarDecl, WhileStmt};
use crate::sema::{NameRef, Type};

impl Cg<'_, '_, '_> {
    pub fn block(&mut self, block: &Block) -> CodegenResult<()> {
        self.push_scope();
        let result = self.stmts(&block.stmts);
        self.pop_scope();
        result
    }

    fn stmts(&mut self, stmts: &[Stmt]) -> CodegenResult<()> {
        for stmt in stmts {
            self.stmt(stmt)?;
        }
        Ok(())
    }

    /// A branch body gets its own scope even when it is a single statement
    fn scoped(&mut self, stmt: &Stmt) -> CodegenResult<()> {
        self.push_scope();
        let result = self.stmt(stmt);
        self.pop_scope();
        result
    }

    fn stmt(&mut self, stmt: &Stmt) -> CodegenResult<()> {
        match stmt {
            Stmt::Block(block) => self.block(block),
            Stmt::VarDecl(decl) => self.var_decl(decl),
            Stmt::Assign(assign) => match &assign.target.kind {
                ExprKind::Identifier(name) if self.name_ref(&assign.target) == NameRef::Local => {
                    let value = self.expr(&assign.value)?;
                    let (var, _) = self.local(*name);
                    self.builder.def_var(var, value.value);
                    Ok(())
                }
                _ => self.assign_field(&assign.target, &assign.value),
            },
            Stmt::If(if_stmt) => self.if_stmt(if_stmt),
            Stmt::While(while_stmt) => self.while_stmt(while_stmt),
            Stmt::Return(ret) => {
                match &ret.value {
                    Some(value) => {
                        let value = self.expr(value)?;
                        self.builder.ins().return_(&[value.value]);
                    }
                    None => {
                        self.builder.ins().return_(&[]);
                    }
                }
                self.start_unreachable_block();
                Ok(())
            }
            Stmt::Print(print) => {
                let value = self.expr(&print.value)?;
                match value.ty {
                    Type::Int => {
                        self.call_runtime(RuntimeKey::PrintlnInt, &[value.value]);
                    }
                    Type::Boolean => {
                        let widened = self.builder.ins().uextend(types::I32, value.value);
                        self.call_runtime(RuntimeKey::PrintlnBool, &[widened]);
                    }
                    other => panic!("INTERNAL: println of {other:?}"),
                }
                Ok(())
            }
            Stmt::Expr(expr_stmt) => {
                self.expr(&expr_stmt.expr)?;
                Ok(())
            }
        }
    }

    fn var_decl(&mut self, decl: &VarDecl) -> CodegenResult<()> {
        let value = match &decl.init {
            Some(init) => self.expr(init)?.value,
            None => {
                let ty = self.local_type(decl);
                self.zero(ty)
            }
        };
        let ty = self.local_type(decl);
        self.define_local(decl.name, ty, value);
        Ok(())
    }

    /// Declared type of a local; only its value representation matters
    fn local_type(&self, decl: &VarDecl) -> Type {
        match decl.ty.kind {
            TypeExprKind::Int => Type::Int,
            TypeExprKind::Boolean => Type::Boolean,
            TypeExprKind::Named(name) => match self.ctx.model().lookup_type(name) {
                Some(ty) => ty,
                None => panic!("INTERNAL: unknown local type {:?}", name),
            },
            TypeExprKind::Void => panic!("INTERNAL: void local"),
        }
    }

    fn if_stmt(&mut self, if_stmt: &IfStmt) -> CodegenResult<()> {
        let condition = self.expr(&if_stmt.condition)?;

        let then_block = self.builder.create_block();
        let else_block = self.builder.create_block();
        let merge_block = self.builder.create_block();
        self.builder
            .ins()
            .brif(condition.value, then_block, &[], else_block, &[]);

        self.builder.switch_to_block(then_block);
        self.builder.seal_block(then_block);
        self.scoped(&if_stmt.then_branch)?;
        self.builder.ins().jump(merge_block, &[]);

        self.builder.switch_to_block(else_block);
        self.builder.seal_block(else_block);
        if let Some(else_branch) = &if_stmt.else_branch {
            self.scoped(else_branch)?;
        }
        self.builder.ins().jump(merge_block, &[]);

        self.builder.switch_to_block(merge_block);
        self.builder.seal_block(merge_block);
        Ok(())
    }

    fn while_stmt(&mut self, while_stmt: &WhileStmt) -> CodegenResult<()> {
        let header_block = self.builder.create_block();
        let body_block = self.builder.create_block();
        let exit_block = self.builder.create_block();

        self.builder.ins().jump(header_block, &[]);

        // the header is sealed once the back edge exists
        self.builder.switch_to_block(header_block);
        let condition = self.expr(&while_stmt.condition)?;
        self.builder
            .ins()
            .brif(condition.value, body_block, &[], exit_block, &[]);

        self.builder.switch_to_block(body_block);
        self.builder.seal_block(body_block);
        self.scoped(&while_stmt.body)?;
        self.builder.ins().jump(header_block, &[]);
        self.builder.seal_block(header_block);

        self.builder.switch_to_block(exit_block);
        self.builder.seal_block(exit_block);
        Ok(())
    }
}
