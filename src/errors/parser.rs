// src/errors/parser.rs
//! Parser errors (E1xxx).

#![allow(unused_assignments)] // False positives from thiserror derive

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum ParserError {
    #[error("expected expression, found '{found}'")]
    #[diagnostic(code(E1001))]
    ExpectedExpression {
        found: String,
        #[label("expected expression")]
        span: SourceSpan,
    },

    #[error("expected '{expected}', found '{found}'")]
    #[diagnostic(code(E1002))]
    ExpectedToken {
        expected: String,
        found: String,
        #[label("unexpected token")]
        span: SourceSpan,
    },

    #[error("unexpected token '{token}'")]
    #[diagnostic(code(E1003))]
    UnexpectedToken {
        token: String,
        #[label("unexpected")]
        span: SourceSpan,
    },

    #[error("expected type")]
    #[diagnostic(code(E1004), help("types are 'int', 'boolean' or a class or interface name"))]
    ExpectedType {
        #[label("expected type")]
        span: SourceSpan,
    },

    #[error("expected declaration")]
    #[diagnostic(code(E1005), help("top-level declarations start with 'class' or 'interface'"))]
    ExpectedDeclaration {
        #[label("expected 'class' or 'interface'")]
        span: SourceSpan,
    },

    #[error("expected identifier")]
    #[diagnostic(code(E1006))]
    ExpectedIdentifier {
        #[label("expected identifier")]
        span: SourceSpan,
    },

    #[error("invalid assignment target")]
    #[diagnostic(code(E1007), help("only variables and fields can be assigned"))]
    InvalidAssignmentTarget {
        #[label("cannot assign to this")]
        span: SourceSpan,
    },

    #[error("constructor name must match class '{class}'")]
    #[diagnostic(code(E1008))]
    ConstructorNameMismatch {
        class: String,
        #[label("expected '{class}'")]
        span: SourceSpan,
    },

    #[error("constructors cannot be static")]
    #[diagnostic(code(E1009))]
    StaticConstructor {
        #[label("static constructor")]
        span: SourceSpan,
    },

    #[error("fields cannot have type void")]
    #[diagnostic(code(E1010))]
    VoidField {
        #[label("void field")]
        span: SourceSpan,
    },

    #[error("System.out.println takes exactly one argument")]
    #[diagnostic(code(E1011))]
    InvalidPrint {
        #[label("expected one argument")]
        span: SourceSpan,
    },
}
