// src/errors/runtime.rs
//! Runtime errors (E4xxx) raised while executing a checked program.

#![allow(unused_assignments)] // False positives from thiserror derive

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// A method call or field access was attempted on `null`.
    #[error("null receiver: cannot access '{member}' on null (line {line})")]
    #[diagnostic(code(E4001))]
    NullReceiver { member: String, line: u32 },

    #[error("stack overflow (recursion deeper than {limit} calls)")]
    #[diagnostic(code(E4002))]
    StackOverflow { limit: usize },
}

impl RuntimeError {
    /// Source line the error was raised on, if known.
    pub fn line(&self) -> Option<u32> {
        match self {
            RuntimeError::NullReceiver { line, .. } => Some(*line),
            RuntimeError::StackOverflow { .. } => None,
        }
    }
}
