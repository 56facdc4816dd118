// src/lib.rs
//! Front end and two execution backends (tree-walking evaluator and
//! Cranelift JIT) for a small class-based language with single
//! inheritance, interfaces and static members.

pub mod cli;
pub mod codegen;
pub mod commands;
pub mod errors;
pub mod frontend;
pub mod interp;
pub mod runtime;
pub mod sema;
