// src/frontend/parse_stmt.rs
//
// Statement parsing: blocks, declarations, assignments and control flow.

use super::ast::*;
use super::parser::{ParseError, Parser};
use super::token::TokenType;
use crate::errors::ParserError;

impl<'src> Parser<'src> {
    pub(super) fn block(&mut self) -> Result<Block, ParseError> {
        let start_span = self.current.span;
        self.consume(TokenType::LBrace, "{")?;

        let mut stmts = Vec::new();
        while !self.check(TokenType::RBrace) && !self.check(TokenType::Eof) {
            stmts.push(self.statement()?);
        }

        self.consume(TokenType::RBrace, "}")?;
        let span = start_span.merge(self.previous.span);

        Ok(Block { stmts, span })
    }

    /// Parse a statement
    fn statement(&mut self) -> Result<Stmt, ParseError> {
        match self.current.ty {
            TokenType::LBrace => Ok(Stmt::Block(self.block()?)),
            TokenType::KwIf => self.if_stmt(),
            TokenType::KwWhile => self.while_stmt(),
            TokenType::KwReturn => self.return_stmt(),
            TokenType::KwInt | TokenType::KwBoolean => {
                let ty = self.parse_type(false)?;
                self.var_decl(ty)
            }
            _ => self.expr_or_decl_stmt(),
        }
    }

    /// `Type name (= init)? ;` once the type has been parsed
    fn var_decl(&mut self, ty: TypeExpr) -> Result<Stmt, ParseError> {
        let (name, _) = self.identifier()?;
        let init = if self.match_token(TokenType::Eq) {
            Some(self.expression(0)?)
        } else {
            None
        };
        self.consume(TokenType::Semicolon, ";")?;
        Ok(Stmt::VarDecl(VarDecl {
            name,
            ty,
            init,
            span: ty.span.merge(self.previous.span),
        }))
    }

    fn if_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start_span = self.current.span;
        self.advance(); // consume 'if'
        self.consume(TokenType::LParen, "(")?;
        let condition = self.expression(0)?;
        self.consume(TokenType::RParen, ")")?;
        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.match_token(TokenType::KwElse) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(Stmt::If(IfStmt {
            condition,
            then_branch,
            else_branch,
            span: start_span.merge(self.previous.span),
        }))
    }

    fn while_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start_span = self.current.span;
        self.advance(); // consume 'while'
        self.consume(TokenType::LParen, "(")?;
        let condition = self.expression(0)?;
        self.consume(TokenType::RParen, ")")?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::While(WhileStmt {
            condition,
            body,
            span: start_span.merge(self.previous.span),
        }))
    }

    fn return_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start_span = self.current.span;
        self.advance(); // consume 'return'
        let value = if self.check(TokenType::Semicolon) {
            None
        } else {
            Some(self.expression(0)?)
        };
        self.consume(TokenType::Semicolon, ";")?;
        Ok(Stmt::Return(ReturnStmt {
            value,
            span: start_span.merge(self.previous.span),
        }))
    }

    /// Expression statement, assignment, print, or a declaration whose type
    /// is a class or interface name.
    fn expr_or_decl_stmt(&mut self) -> Result<Stmt, ParseError> {
        let expr = self.expression(0)?;

        // `Shape s ...` parses as the identifier `Shape` followed by another identifier
        if let ExprKind::Identifier(sym) = expr.kind
            && self.check(TokenType::Identifier)
        {
            let ty = TypeExpr {
                kind: TypeExprKind::Named(sym),
                span: expr.span,
            };
            return self.var_decl(ty);
        }

        if self.match_token(TokenType::Eq) {
            if !matches!(
                expr.kind,
                ExprKind::Identifier(_) | ExprKind::FieldAccess(_)
            ) {
                return Err(ParseError::new(
                    ParserError::InvalidAssignmentTarget {
                        span: expr.span.into(),
                    },
                    expr.span,
                ));
            }
            let value = self.expression(0)?;
            self.consume(TokenType::Semicolon, ";")?;
            return Ok(Stmt::Assign(AssignStmt {
                span: expr.span.merge(self.previous.span),
                target: expr,
                value,
            }));
        }

        self.consume(TokenType::Semicolon, ";")?;
        let span = expr.span.merge(self.previous.span);

        if self.is_println_call(&expr) {
            let ExprKind::MethodCall(call) = expr.kind else {
                unreachable!("INTERNAL: println shape already checked");
            };
            let call = *call;
            let mut args = call.args;
            if args.len() != 1 {
                return Err(ParseError::new(
                    ParserError::InvalidPrint {
                        span: expr.span.into(),
                    },
                    expr.span,
                ));
            }
            let value = args.remove(0);
            return Ok(Stmt::Print(PrintStmt { value, span }));
        }

        Ok(Stmt::Expr(ExprStmt { expr, span }))
    }

    /// Matches `System.out.println(...)`
    fn is_println_call(&self, expr: &Expr) -> bool {
        let ExprKind::MethodCall(call) = &expr.kind else {
            return false;
        };
        if self.interner.resolve(call.method) != "println" {
            return false;
        }
        let Some(receiver) = &call.receiver else {
            return false;
        };
        let ExprKind::FieldAccess(access) = &receiver.kind else {
            return false;
        };
        if self.interner.resolve(access.field) != "out" {
            return false;
        }
        matches!(access.object.kind, ExprKind::Identifier(sym) if self.interner.resolve(sym) == "System")
    }
}
