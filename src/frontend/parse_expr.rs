// src/frontend/parse_expr.rs
//
// Expression parsing using Pratt parsing, including binary and unary
// operators, member access, calls and object creation.

use super::ast::*;
use super::parser::{ParseError, Parser};
use super::token::TokenType;
use crate::errors::ParserError;

impl<'src> Parser<'src> {
    /// Parse an expression with Pratt parsing
    pub(super) fn expression(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let mut left = self.unary()?;

        while self.current.ty.precedence() > min_prec {
            let op_token = self.current.clone();
            let op = match op_token.ty {
                TokenType::Plus => BinaryOp::Add,
                TokenType::Minus => BinaryOp::Sub,
                TokenType::Star => BinaryOp::Mul,
                TokenType::EqEq => BinaryOp::Eq,
                TokenType::BangEq => BinaryOp::Ne,
                TokenType::Lt => BinaryOp::Lt,
                TokenType::Gt => BinaryOp::Gt,
                TokenType::LtEq => BinaryOp::Le,
                TokenType::GtEq => BinaryOp::Ge,
                TokenType::AmpAmp => BinaryOp::And,
                TokenType::PipePipe => BinaryOp::Or,
                _ => break,
            };

            let prec = op_token.ty.precedence();
            self.advance();
            let right = self.expression(prec)?;
            let span = left.span.merge(right.span);

            left = Expr {
                id: self.next_id(),
                kind: ExprKind::Binary(Box::new(BinaryExpr { left, op, right })),
                span,
            };
        }

        Ok(left)
    }

    /// Parse a unary expression (- or !)
    fn unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.current.ty {
            TokenType::Minus => UnaryOp::Neg,
            TokenType::Bang => UnaryOp::Not,
            _ => return self.postfix(),
        };
        let start_span = self.current.span;
        self.advance();
        let operand = self.unary()?;
        let span = start_span.merge(operand.span);
        Ok(Expr {
            id: self.next_id(),
            kind: ExprKind::Unary(Box::new(UnaryExpr { op, operand })),
            span,
        })
    }

    /// Parse member accesses and method calls after a primary expression
    fn postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.primary()?;

        while self.match_token(TokenType::Dot) {
            let (name, name_span) = self.identifier()?;
            if self.check(TokenType::LParen) {
                let args = self.arguments()?;
                let span = expr.span.merge(self.previous.span);
                expr = Expr {
                    id: self.next_id(),
                    kind: ExprKind::MethodCall(Box::new(MethodCallExpr {
                        receiver: Some(expr),
                        method: name,
                        args,
                        method_span: name_span,
                    })),
                    span,
                };
            } else {
                let span = expr.span.merge(name_span);
                expr = Expr {
                    id: self.next_id(),
                    kind: ExprKind::FieldAccess(Box::new(FieldAccessExpr {
                        object: expr,
                        field: name,
                        field_span: name_span,
                    })),
                    span,
                };
            }
        }

        Ok(expr)
    }

    /// Parse a parenthesized, comma-separated argument list
    fn arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.consume(TokenType::LParen, "(")?;
        let mut args = Vec::new();
        if !self.check(TokenType::RParen) {
            loop {
                args.push(self.expression(0)?);
                if !self.match_token(TokenType::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenType::RParen, ")")?;
        Ok(args)
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.current.clone();
        let kind = match token.ty {
            TokenType::IntLiteral => {
                let value = token.lexeme.parse::<i32>().map_err(|_| {
                    ParseError::new(
                        ParserError::ExpectedExpression {
                            found: token.lexeme.clone(),
                            span: token.span.into(),
                        },
                        token.span,
                    )
                })?;
                self.advance();
                ExprKind::IntLiteral(value)
            }
            TokenType::KwTrue => {
                self.advance();
                ExprKind::BoolLiteral(true)
            }
            TokenType::KwFalse => {
                self.advance();
                ExprKind::BoolLiteral(false)
            }
            TokenType::KwNull => {
                self.advance();
                ExprKind::Null
            }
            TokenType::KwThis => {
                self.advance();
                ExprKind::This
            }
            TokenType::KwNew => return self.new_expr(),
            TokenType::LParen => {
                self.advance();
                let inner = self.expression(0)?;
                self.consume(TokenType::RParen, ")")?;
                return Ok(inner);
            }
            TokenType::Identifier => {
                let sym = self.interner.intern(&token.lexeme);
                self.advance();
                if self.check(TokenType::LParen) {
                    let args = self.arguments()?;
                    let span = token.span.merge(self.previous.span);
                    return Ok(Expr {
                        id: self.next_id(),
                        kind: ExprKind::MethodCall(Box::new(MethodCallExpr {
                            receiver: None,
                            method: sym,
                            args,
                            method_span: token.span,
                        })),
                        span,
                    });
                }
                ExprKind::Identifier(sym)
            }
            _ => {
                return Err(ParseError::new(
                    ParserError::ExpectedExpression {
                        found: token.ty.as_str().to_string(),
                        span: token.span.into(),
                    },
                    token.span,
                ));
            }
        };

        Ok(Expr {
            id: self.next_id(),
            kind,
            span: token.span,
        })
    }

    /// `new ClassName(args)`
    fn new_expr(&mut self) -> Result<Expr, ParseError> {
        let start_span = self.current.span;
        self.advance(); // consume 'new'
        let (class, class_span) = self.identifier()?;
        let args = self.arguments()?;
        let span = start_span.merge(self.previous.span);
        Ok(Expr {
            id: self.next_id(),
            kind: ExprKind::New(Box::new(NewExpr {
                class,
                class_span,
                args,
            })),
            span,
        })
    }
}
