// src/errors/mod.rs
//! Structured error reporting for mjc.
//!
//! Error code ranges:
//! - E0xxx: Lexer errors
//! - E1xxx: Parser errors
//! - E2xxx: Semantic errors
//! - E3xxx: Codegen errors
//! - E4xxx: Runtime errors

pub mod codegen;
pub mod lexer;
pub mod parser;
pub mod report;
pub mod runtime;
pub mod sema;

pub use codegen::{CodegenError, CodegenErrorKind, CodegenResult};
pub use lexer::LexerError;
pub use parser::ParserError;
pub use report::{
    get_color_mode, render_to_stderr, render_to_string, render_to_writer,
    render_to_writer_terminal, set_color_mode,
};
pub use runtime::RuntimeError;
pub use sema::SemanticError;
