// src/commands/run.rs

use std::io;
use std::path::Path;
use std::process::ExitCode;

use super::common::{PipelineError, load_and_analyze, render_pipeline_error};
use crate::cli::{Backend, ColorMode};
use crate::codegen::{JitOptions, run_compiled};
use crate::interp::{EvalOptions, run_program};
use crate::runtime::flush_stdout;
use crate::sema::{Analysis, MethodId};

/// Stack for the evaluator thread; deep recursion in the program is deep
/// recursion in the evaluator.
const EVAL_STACK_BYTES: usize = 256 * 1024 * 1024;

/// Run a source file under the chosen backend
pub fn run_file(path: &Path, backend: Backend, main: Option<&str>, color_mode: ColorMode) -> ExitCode {
    let Ok((file, analysis)) = load_and_analyze(path, color_mode) else {
        return ExitCode::FAILURE;
    };
    match execute(&analysis, backend, main) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            render_pipeline_error(&e, &file, &mut io::stderr(), color_mode);
            ExitCode::FAILURE
        }
    }
}

fn execute(analysis: &Analysis, backend: Backend, main: Option<&str>) -> Result<(), PipelineError> {
    let entry = analysis.entry_point(main)?;
    tracing::info!(entry = %analysis.model.entry_symbol(entry), ?backend, "running");
    match backend {
        Backend::Eval => evaluate(analysis, entry),
        Backend::Jit => {
            run_compiled(analysis, entry, JitOptions::default())?;
            Ok(())
        }
    }
}

fn evaluate(analysis: &Analysis, entry: MethodId) -> Result<(), PipelineError> {
    std::thread::scope(|scope| {
        let handle = std::thread::Builder::new()
            .name("mjc-eval".to_string())
            .stack_size(EVAL_STACK_BYTES)
            .spawn_scoped(scope, || {
                let result = run_program(analysis, entry, EvalOptions::default());
                flush_stdout();
                result
            })
            .map_err(PipelineError::Io)?;
        match handle.join() {
            Ok(result) => result.map_err(PipelineError::from),
            Err(panic) => std::panic::resume_unwind(panic),
        }
    })
}

/// Used by tests: analyze `source` and run it under `backend`.
#[cfg(test)]
pub(crate) fn run_source(source: &str, backend: Backend) -> Result<(), PipelineError> {
    let analysis = super::common::compile_source(source)?;
    execute(&analysis, backend, None)
}
