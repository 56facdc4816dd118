// src/frontend/parse_decl.rs
//
// Class and interface declarations, members and types.

use super::ast::*;
use super::parser::{ParseError, Parser};
use super::token::TokenType;
use crate::errors::ParserError;

impl<'src> Parser<'src> {
    /// Parse a top-level declaration
    pub(super) fn declaration(&mut self) -> Result<Decl, ParseError> {
        match self.current.ty {
            TokenType::KwClass => Ok(Decl::Class(self.class_decl()?)),
            TokenType::KwInterface => Ok(Decl::Interface(self.interface_decl()?)),
            _ => Err(ParseError::new(
                ParserError::ExpectedDeclaration {
                    span: self.current.span.into(),
                },
                self.current.span,
            )),
        }
    }

    fn class_decl(&mut self) -> Result<ClassDecl, ParseError> {
        let start_span = self.current.span;
        self.advance(); // consume 'class'

        let (name, _) = self.identifier()?;

        let superclass = if self.match_token(TokenType::KwExtends) {
            let (sym, span) = self.identifier()?;
            Some(TypeName { name: sym, span })
        } else {
            None
        };

        let mut interfaces = Vec::new();
        if self.match_token(TokenType::KwImplements) {
            loop {
                let (sym, span) = self.identifier()?;
                interfaces.push(TypeName { name: sym, span });
                if !self.match_token(TokenType::Comma) {
                    break;
                }
            }
        }

        self.consume(TokenType::LBrace, "{")?;

        let mut class = ClassDecl {
            name,
            superclass,
            interfaces,
            fields: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            span: start_span,
        };

        while !self.check(TokenType::RBrace) && !self.check(TokenType::Eof) {
            self.class_member(&mut class)?;
        }

        self.consume(TokenType::RBrace, "}")?;
        class.span = start_span.merge(self.previous.span);
        Ok(class)
    }

    /// Parse one field, method or constructor into `class`
    fn class_member(&mut self, class: &mut ClassDecl) -> Result<(), ParseError> {
        let start_span = self.current.span;
        self.match_token(TokenType::KwPublic);
        let static_span = self.current.span;
        let is_static = self.match_token(TokenType::KwStatic);

        let ty = self.parse_type(true)?;

        // `Name(` is a constructor
        if self.check(TokenType::LParen) {
            let TypeExprKind::Named(sym) = ty.kind else {
                return Err(self.unexpected_token_error());
            };
            if sym != class.name {
                let class_name = self.interner.resolve(class.name).to_string();
                return Err(ParseError::new(
                    ParserError::ConstructorNameMismatch {
                        class: class_name,
                        span: ty.span.into(),
                    },
                    ty.span,
                ));
            }
            if is_static {
                return Err(ParseError::new(
                    ParserError::StaticConstructor {
                        span: static_span.into(),
                    },
                    static_span,
                ));
            }
            let params = self.params()?;
            let body = self.block()?;
            let span = start_span.merge(body.span);
            class.constructors.push(ConstructorDecl { params, body, span });
            return Ok(());
        }

        let (name, _) = self.identifier()?;

        if self.check(TokenType::LParen) {
            let params = self.params()?;
            let body = self.block()?;
            let span = start_span.merge(body.span);
            class.methods.push(MethodDecl {
                name,
                is_static,
                params,
                return_type: ty,
                body,
                span,
            });
            return Ok(());
        }

        if ty.kind == TypeExprKind::Void {
            return Err(ParseError::new(
                ParserError::VoidField {
                    span: ty.span.into(),
                },
                ty.span,
            ));
        }

        let init = if self.match_token(TokenType::Eq) {
            Some(self.expression(0)?)
        } else {
            None
        };
        self.consume(TokenType::Semicolon, ";")?;
        let span = start_span.merge(self.previous.span);
        class.fields.push(FieldDecl {
            name,
            ty,
            is_static,
            init,
            span,
        });
        Ok(())
    }

    fn interface_decl(&mut self) -> Result<InterfaceDecl, ParseError> {
        let start_span = self.current.span;
        self.advance(); // consume 'interface'

        let (name, _) = self.identifier()?;
        self.consume(TokenType::LBrace, "{")?;

        let mut methods = Vec::new();
        while !self.check(TokenType::RBrace) && !self.check(TokenType::Eof) {
            let sig_start = self.current.span;
            self.match_token(TokenType::KwPublic);
            let return_type = self.parse_type(true)?;
            let (method_name, _) = self.identifier()?;
            let params = self.params()?;
            self.consume(TokenType::Semicolon, ";")?;
            methods.push(MethodSig {
                name: method_name,
                params,
                return_type,
                span: sig_start.merge(self.previous.span),
            });
        }

        self.consume(TokenType::RBrace, "}")?;
        Ok(InterfaceDecl {
            name,
            methods,
            span: start_span.merge(self.previous.span),
        })
    }

    /// Parse a parenthesized parameter list
    fn params(&mut self) -> Result<Vec<Param>, ParseError> {
        self.consume(TokenType::LParen, "(")?;
        let mut params = Vec::new();
        if !self.check(TokenType::RParen) {
            loop {
                let ty = self.parse_type(false)?;
                let (name, name_span) = self.identifier()?;
                params.push(Param {
                    name,
                    ty,
                    span: ty.span.merge(name_span),
                });
                if !self.match_token(TokenType::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenType::RParen, ")")?;
        Ok(params)
    }

    /// Parse a type. `void` is only accepted when `allow_void` is set.
    pub(super) fn parse_type(&mut self, allow_void: bool) -> Result<TypeExpr, ParseError> {
        let span = self.current.span;
        let kind = match self.current.ty {
            TokenType::KwInt => TypeExprKind::Int,
            TokenType::KwBoolean => TypeExprKind::Boolean,
            TokenType::KwVoid if allow_void => TypeExprKind::Void,
            TokenType::Identifier => {
                TypeExprKind::Named(self.interner.intern(&self.current.lexeme))
            }
            _ => {
                return Err(ParseError::new(
                    ParserError::ExpectedType { span: span.into() },
                    span,
                ));
            }
        };
        self.advance();
        Ok(TypeExpr { kind, span })
    }
}
