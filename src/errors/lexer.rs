// src/errors/lexer.rs
//! Lexer errors (E0xxx).

#![allow(unused_assignments)] // False positives from thiserror derive

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum LexerError {
    #[error("unexpected character '{ch}'")]
    #[diagnostic(code(E0001))]
    UnexpectedCharacter {
        ch: char,
        #[label("unexpected character")]
        span: SourceSpan,
    },

    #[error("unterminated block comment")]
    #[diagnostic(code(E0002), help("close the comment with '*/'"))]
    UnterminatedComment {
        #[label("comment starts here")]
        span: SourceSpan,
    },

    #[error("invalid number literal")]
    #[diagnostic(code(E0005), help("integer literals must fit in 32 bits"))]
    InvalidNumber {
        #[label("invalid number")]
        span: SourceSpan,
    },
}
