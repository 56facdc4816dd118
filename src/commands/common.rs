// src/commands/common.rs
//! Shared pipeline for CLI commands: read, parse, analyze, render errors.

use std::io::{self, Write};
use std::path::Path;

use miette::NamedSource;

use crate::cli::ColorMode;
use crate::errors::{
    CodegenError, LexerError, RuntimeError, SemanticError, render_to_writer_terminal,
};
use crate::frontend::{ParseError, Parser};
use crate::sema::{Analysis, analyze_program};

/// Errors from any phase of the compilation pipeline.
///
/// Each variant carries the structured error of the failed phase so callers
/// can inspect it or render it via [`render_pipeline_error`].
#[derive(Debug)]
pub enum PipelineError {
    /// Lexer encountered invalid tokens
    Lex(Vec<LexerError>),
    /// Parser encountered a syntax error
    Parse(ParseError),
    /// Checking failed (the first failure of the unit)
    Sema(SemanticError),
    /// Code generation or verification failed
    Codegen(CodegenError),
    /// The program raised a runtime error under the evaluator
    Runtime(RuntimeError),
    /// I/O error (file not found, permission denied, ...)
    Io(io::Error),
}

impl From<SemanticError> for PipelineError {
    fn from(e: SemanticError) -> Self {
        PipelineError::Sema(e)
    }
}

impl From<CodegenError> for PipelineError {
    fn from(e: CodegenError) -> Self {
        PipelineError::Codegen(e)
    }
}

impl From<RuntimeError> for PipelineError {
    fn from(e: RuntimeError) -> Self {
        PipelineError::Runtime(e)
    }
}

/// A file's text together with the name diagnostics refer to it by
pub struct SourceFile {
    pub path: String,
    pub text: String,
}

pub fn read_source(path: &Path) -> Result<SourceFile, PipelineError> {
    let text = std::fs::read_to_string(path).map_err(PipelineError::Io)?;
    Ok(SourceFile {
        path: path.to_string_lossy().into_owned(),
        text,
    })
}

fn render_diagnostic<D>(err: D, file: &SourceFile, w: &mut dyn Write, color_mode: ColorMode)
where
    D: miette::Diagnostic + Send + Sync + 'static,
{
    let report = miette::Report::new(err)
        .with_source_code(NamedSource::new(&file.path, file.text.clone()));
    let _ = render_to_writer_terminal(report.as_ref(), w, color_mode);
}

/// Render a pipeline error to a writer with source context.
///
/// Codegen errors without a span (Cranelift or IO failures) have no source
/// location and fall back to a plain message.
pub fn render_pipeline_error(
    err: &PipelineError,
    file: &SourceFile,
    w: &mut dyn Write,
    color_mode: ColorMode,
) {
    match err {
        PipelineError::Lex(errors) => {
            for e in errors {
                render_diagnostic(e.clone(), file, w, color_mode);
            }
        }
        PipelineError::Parse(e) => render_diagnostic(e.error.clone(), file, w, color_mode),
        PipelineError::Sema(e) => render_diagnostic(e.clone(), file, w, color_mode),
        PipelineError::Codegen(e) => {
            if e.span.is_some() {
                render_diagnostic(e.clone(), file, w, color_mode);
            } else {
                let _ = writeln!(w, "compilation error: {}", e);
            }
        }
        PipelineError::Runtime(e) => {
            let _ = writeln!(w, "error: {}", e);
        }
        PipelineError::Io(e) => {
            let _ = writeln!(w, "error: could not read '{}': {}", file.path, e);
        }
    }
}

/// Parse and analyze source text.
///
/// Lexer errors take precedence over the parse error they usually cause.
pub fn compile_source(source: &str) -> Result<Analysis, PipelineError> {
    let (program, interner) = {
        let _span = tracing::info_span!("parse").entered();
        let mut parser = Parser::new(source);
        let parsed = parser.parse_program();
        let lexer_errors = parser.take_lexer_errors();
        if !lexer_errors.is_empty() {
            return Err(PipelineError::Lex(lexer_errors));
        }
        let program = parsed.map_err(PipelineError::Parse)?;
        tracing::debug!(declarations = program.declarations.len(), "parsed");
        (program, parser.into_interner())
    };

    let _span = tracing::info_span!("analyze").entered();
    let analysis = analyze_program(program, interner)?;
    tracing::debug!(
        classes = analysis.model.class_order().len(),
        "checking complete"
    );
    Ok(analysis)
}

/// Read, parse and analyze `path`, rendering any error to stderr.
/// `Err(())` means diagnostics were already printed.
pub fn load_and_analyze(path: &Path, color_mode: ColorMode) -> Result<(SourceFile, Analysis), ()> {
    let file = match read_source(path) {
        Ok(file) => file,
        Err(e) => {
            let placeholder = SourceFile {
                path: path.to_string_lossy().into_owned(),
                text: String::new(),
            };
            render_pipeline_error(&e, &placeholder, &mut io::stderr(), color_mode);
            return Err(());
        }
    };
    match compile_source(&file.text) {
        Ok(analysis) => Ok((file, analysis)),
        Err(e) => {
            render_pipeline_error(&e, &file, &mut io::stderr(), color_mode);
            Err(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(err: &PipelineError, text: &str) -> String {
        let file = SourceFile {
            path: "test.mj".to_string(),
            text: text.to_string(),
        };
        let mut out = Vec::new();
        render_pipeline_error(err, &file, &mut out, ColorMode::Never);
        String::from_utf8(out).expect("utf8")
    }

    #[test]
    fn lexer_errors_win_over_parse_errors() {
        let err = compile_source("class A { int x @ }").unwrap_err();
        assert!(matches!(err, PipelineError::Lex(_)));
    }

    #[test]
    fn parse_error_is_rendered_with_code() {
        let source = "class A { int }";
        let err = compile_source(source).unwrap_err();
        assert!(matches!(err, PipelineError::Parse(_)));
        let text = render(&err, source);
        assert!(text.contains("E1"), "{text}");
        assert!(text.contains("test.mj"), "{text}");
    }

    #[test]
    fn checking_failure_names_method() {
        let source = "class A { }
class Main { static void main() { A a = new A(); a.missing(); } }";
        let err = compile_source(source).unwrap_err();
        assert!(matches!(err, PipelineError::Sema(_)));
        let text = render(&err, source);
        assert!(text.contains("missing"), "{text}");
    }

    #[test]
    fn codegen_error_without_span_is_plain() {
        let err = PipelineError::Codegen(CodegenError::cranelift("boom"));
        assert_eq!(render(&err, ""), "compilation error: internal error: cranelift error (boom)\n");
    }

    #[test]
    fn runtime_error_reports_line() {
        let err = PipelineError::Runtime(RuntimeError::NullReceiver {
            member: "f".to_string(),
            line: 4,
        });
        let text = render(&err, "");
        assert!(text.starts_with("error: null receiver"));
        assert!(text.contains("line 4"));
    }

    #[test]
    fn valid_source_analyzes() {
        let analysis = compile_source("class Main { static void main() { System.out.println(1); } }")
            .expect("analyzes");
        assert!(analysis.entry_point(None).is_ok());
    }
}
