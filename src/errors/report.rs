// src/errors/report.rs
//! Rendering utilities for miette diagnostics.

use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme, ThemeCharacters, ThemeStyles};
use std::io::{IsTerminal, Write as IoWrite};
use std::sync::atomic::{AtomicU8, Ordering};

use crate::cli::ColorMode;

static COLOR_MODE: AtomicU8 = AtomicU8::new(0);

/// Set the process-wide color mode used by [`render_to_stderr`].
pub fn set_color_mode(mode: ColorMode) {
    let raw = match mode {
        ColorMode::Auto => 0,
        ColorMode::Always => 1,
        ColorMode::Never => 2,
    };
    COLOR_MODE.store(raw, Ordering::Relaxed);
}

pub fn get_color_mode() -> ColorMode {
    match COLOR_MODE.load(Ordering::Relaxed) {
        1 => ColorMode::Always,
        2 => ColorMode::Never,
        _ => ColorMode::Auto,
    }
}

/// Create a handler for terminal output (unicode + colors).
pub fn terminal_handler() -> GraphicalReportHandler {
    let theme = GraphicalTheme {
        characters: ThemeCharacters::unicode(),
        styles: ThemeStyles::ansi(),
    };
    GraphicalReportHandler::new_themed(theme)
}

/// Create a handler for snapshot testing (ascii + no colors).
pub fn snapshot_handler() -> GraphicalReportHandler {
    let theme = GraphicalTheme {
        characters: ThemeCharacters::ascii(),
        styles: ThemeStyles::none(),
    };
    GraphicalReportHandler::new_themed(theme)
}

fn use_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal()
        }
    }
}

/// Render to stderr, honoring the process-wide color mode.
pub fn render_to_stderr(report: &dyn Diagnostic) {
    let _ = render_to_writer_terminal(report, &mut std::io::stderr(), get_color_mode());
}

/// Render to a buffer without colors (for snapshots/testing).
pub fn render_to_string(report: &dyn Diagnostic) -> String {
    let mut output = String::new();
    let handler = snapshot_handler();
    let _ = handler.render_report(&mut output, report);
    output
}

/// Render to any Write impl without colors.
pub fn render_to_writer<W: IoWrite>(report: &dyn Diagnostic, mut writer: W) -> std::io::Result<()> {
    let output = render_to_string(report);
    writer.write_all(output.as_bytes())
}

/// Render for a terminal: unicode and ANSI styles when color is enabled,
/// the snapshot theme otherwise.
pub fn render_to_writer_terminal(
    report: &dyn Diagnostic,
    writer: &mut dyn IoWrite,
    mode: ColorMode,
) -> std::io::Result<()> {
    let handler = if use_color(mode) {
        terminal_handler()
    } else {
        snapshot_handler()
    };
    let mut output = String::new();
    if handler.render_report(&mut output, report).is_ok() {
        writer.write_all(output.as_bytes())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{LexerError, SemanticError};
    use miette::NamedSource;

    #[test]
    fn render_lexer_error_to_string() {
        let err = LexerError::UnexpectedCharacter {
            ch: '@',
            span: (0, 1).into(),
        };
        let report = miette::Report::new(err)
            .with_source_code(NamedSource::new("test.mj", "@".to_string()));

        let output = render_to_string(report.as_ref());
        assert!(output.contains("E0001"), "should contain error code");
        assert!(
            output.contains("unexpected character"),
            "should contain message"
        );
        assert!(output.contains("@"), "should contain the character");
    }

    #[test]
    fn render_with_help() {
        let err = LexerError::UnterminatedComment {
            span: (0, 2).into(),
        };
        let report = miette::Report::new(err)
            .with_source_code(NamedSource::new("test.mj", "/* x".to_string()));

        let output = render_to_string(report.as_ref());
        assert!(output.contains("E0002"), "should contain error code");
        assert!(output.contains("help"), "should contain help text");
    }

    #[test]
    fn never_mode_has_no_escape_codes() {
        let err = SemanticError::UndefinedVariable {
            name: "x".to_string(),
            span: (0, 1).into(),
        };
        let report = miette::Report::new(err)
            .with_source_code(NamedSource::new("test.mj", "x".to_string()));
        let mut out = Vec::new();
        render_to_writer_terminal(report.as_ref(), &mut out, ColorMode::Never).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("undefined variable 'x'"));
        assert!(!text.contains('\x1b'));
    }
}
