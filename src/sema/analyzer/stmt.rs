// src/sema/analyzer/stmt.rs

use super::*;
use crate::frontend::ast::{AssignStmt, ExprKind, IfStmt, ReturnStmt, Stmt, VarDecl, WhileStmt};
use crate::sema::expression_data::NameRef;

impl Analyzer<'_> {
    /// Check a block in a nested scope. Returns whether every path through
    /// the block ends in a `return`.
    pub(super) fn check_block(&mut self, block: &mut Block) -> Result<bool, SemanticError> {
        let outer = std::mem::take(&mut self.scope);
        self.scope = Scope::with_parent(outer);

        let result = self.check_stmts(&mut block.stmts);

        let inner = std::mem::take(&mut self.scope);
        self.scope = inner.into_parent().unwrap_or_default();
        result
    }

    fn check_stmts(&mut self, stmts: &mut [Stmt]) -> Result<bool, SemanticError> {
        let mut returns = false;
        for stmt in stmts {
            // statements after a return are still checked
            returns |= self.check_stmt(stmt)?;
        }
        Ok(returns)
    }

    fn check_stmt(&mut self, stmt: &mut Stmt) -> Result<bool, SemanticError> {
        match stmt {
            Stmt::Block(block) => self.check_block(block),
            Stmt::VarDecl(decl) => {
                self.check_var_decl(decl)?;
                Ok(false)
            }
            Stmt::Assign(assign) => {
                self.check_assign(assign)?;
                Ok(false)
            }
            Stmt::If(if_stmt) => self.check_if(if_stmt),
            Stmt::While(while_stmt) => {
                self.check_while(while_stmt)?;
                Ok(false)
            }
            Stmt::Return(ret) => {
                self.check_return(ret)?;
                Ok(true)
            }
            Stmt::Print(print) => {
                let ty = self.check_expr(&mut print.value)?;
                if !matches!(ty, Type::Int | Type::Boolean) {
                    return Err(SemanticError::TypeMismatch {
                        expected: "int or boolean".to_string(),
                        found: self.type_name(ty),
                        span: print.value.span.into(),
                    });
                }
                Ok(false)
            }
            Stmt::Expr(expr_stmt) => {
                self.check_expr(&mut expr_stmt.expr)?;
                Ok(false)
            }
        }
    }

    fn check_var_decl(&mut self, decl: &mut VarDecl) -> Result<(), SemanticError> {
        if self.scope.is_declared(decl.name) {
            return Err(SemanticError::DuplicateVariable {
                name: self.resolve_name(decl.name).to_string(),
                span: decl.span.into(),
            });
        }
        let ty = self.resolve_type(&decl.ty)?;
        if ty == Type::Void {
            return Err(SemanticError::TypeMismatch {
                expected: "a variable type".to_string(),
                found: "void".to_string(),
                span: decl.ty.span.into(),
            });
        }
        if let Some(init) = decl.init.as_mut() {
            let init_ty = self.check_expr(init)?;
            self.expect_assignable(init_ty, ty, init.span)?;
        }
        self.scope.define(decl.name, ty);
        Ok(())
    }

    fn check_assign(&mut self, assign: &mut AssignStmt) -> Result<(), SemanticError> {
        let target_ty = self.check_expr(&mut assign.target)?;
        debug_assert!(matches!(
            assign.target.kind,
            ExprKind::Identifier(_) | ExprKind::FieldAccess(_)
        ));
        debug_assert!(!matches!(
            self.data.get_name(assign.target.id),
            Some(NameRef::Class(_))
        ));
        let value_ty = self.check_expr(&mut assign.value)?;
        self.expect_assignable(value_ty, target_ty, assign.value.span)
    }

    fn check_if(&mut self, if_stmt: &mut IfStmt) -> Result<bool, SemanticError> {
        self.check_condition(&mut if_stmt.condition)?;
        let then_returns = self.check_branch(&mut if_stmt.then_branch)?;
        let else_returns = match if_stmt.else_branch.as_mut() {
            Some(else_branch) => self.check_branch(else_branch)?,
            None => false,
        };
        Ok(then_returns && else_returns)
    }

    fn check_while(&mut self, while_stmt: &mut WhileStmt) -> Result<(), SemanticError> {
        self.check_condition(&mut while_stmt.condition)?;
        self.check_branch(&mut while_stmt.body)?;
        Ok(())
    }

    /// A branch body gets its own scope even when it is a single statement.
    fn check_branch(&mut self, stmt: &mut Stmt) -> Result<bool, SemanticError> {
        let outer = std::mem::take(&mut self.scope);
        self.scope = Scope::with_parent(outer);
        let result = self.check_stmt(stmt);
        let inner = std::mem::take(&mut self.scope);
        self.scope = inner.into_parent().unwrap_or_default();
        result
    }

    fn check_condition(&mut self, condition: &mut crate::frontend::ast::Expr) -> Result<(), SemanticError> {
        let ty = self.check_expr(condition)?;
        if ty != Type::Boolean {
            return Err(SemanticError::ConditionNotBool {
                found: self.type_name(ty),
                span: condition.span.into(),
            });
        }
        Ok(())
    }

    fn check_return(&mut self, ret: &mut ReturnStmt) -> Result<(), SemanticError> {
        let expected = self.context().return_type;
        match ret.value.as_mut() {
            Some(value) => {
                let found = self.check_expr(value)?;
                if expected == Type::Void || !self.model.assignable(found, expected) {
                    return Err(SemanticError::ReturnTypeMismatch {
                        expected: self.type_name(expected),
                        found: self.type_name(found),
                        span: value.span.into(),
                    });
                }
            }
            None if expected != Type::Void => {
                return Err(SemanticError::ReturnTypeMismatch {
                    expected: self.type_name(expected),
                    found: "void".to_string(),
                    span: ret.span.into(),
                });
            }
            None => {}
        }
        Ok(())
    }
}
