// src/codegen/mod.rs
//
// Compiled backend: lowers a checked program to Cranelift IR in a JIT
// module, with materialized dispatch tables and runtime services linked in.

mod calls;
mod compiler;
mod context;
mod expr;
pub mod jit;
pub mod runtime_registry;
mod stmt;
mod tables;
mod types;

#[cfg(test)]
mod tests;

use std::path::Path;

pub use compiler::{CompiledProgram, Compiler};
pub use jit::{JitContext, JitOptions};
pub use types::{ENTRY_SYMBOL, STATIC_INIT_SYMBOL};

use crate::errors::{CodegenError, CodegenResult};
use crate::sema::{Analysis, MethodId};

/// Compile and verify every function of the program.
pub fn compile_program(analysis: &Analysis, entry: MethodId, options: JitOptions) -> CodegenResult<CompiledProgram> {
    Compiler::new(analysis, options).compile(entry)
}

/// Compile, then run the entry routine on the current thread.
pub fn run_compiled(analysis: &Analysis, entry: MethodId, options: JitOptions) -> CodegenResult<()> {
    compile_program(analysis, entry, options)?.run()
}

/// Compile, then write the listing to `path`. Nothing is written unless
/// every function passed verification.
pub fn build_artifact(
    analysis: &Analysis,
    entry: MethodId,
    path: &Path,
    options: JitOptions,
) -> CodegenResult<CompiledProgram> {
    let program = compile_program(analysis, entry, options)?;
    std::fs::write(path, program.listing()).map_err(CodegenError::io)?;
    tracing::info!(path = %path.display(), "wrote artifact");
    Ok(program)
}
