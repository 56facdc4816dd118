// src/errors/codegen.rs
//! Code generation errors (E3xxx).
//!
//! These are not user type errors: the analyzer has already accepted the
//! program. They report unsupported constructs and Cranelift failures.

use miette::{Diagnostic, LabeledSpan};
use std::fmt;
use thiserror::Error;

use crate::frontend::Span;

/// The kind of code generation error.
#[derive(Debug, Clone)]
pub enum CodegenErrorKind {
    /// Construct the compiled backend cannot express
    UnsupportedFeature {
        feature: &'static str,
        context: Option<String>,
    },

    /// Function IR rejected by the Cranelift verifier
    Verifier { function: String, errors: String },

    /// Internal invariant violation or Cranelift module failure
    InternalError {
        message: &'static str,
        context: Option<String>,
    },
}

/// Code generation error with optional source span for diagnostics.
#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct CodegenError {
    pub kind: CodegenErrorKind,
    pub span: Option<Span>,
}

pub type CodegenResult<T> = Result<T, CodegenError>;

impl CodegenError {
    /// Create an unsupported feature error with context
    pub fn unsupported_with_context(feature: &'static str, context: impl Into<String>) -> Self {
        CodegenErrorKind::UnsupportedFeature {
            feature,
            context: Some(context.into()),
        }
        .into()
    }

    pub fn verifier(function: impl Into<String>, errors: impl fmt::Display) -> Self {
        CodegenErrorKind::Verifier {
            function: function.into(),
            errors: errors.to_string(),
        }
        .into()
    }

    /// Create an internal error with context
    pub fn internal_with_context(message: &'static str, context: impl Into<String>) -> Self {
        CodegenErrorKind::InternalError {
            message,
            context: Some(context.into()),
        }
        .into()
    }

    /// Wrap a Cranelift module error
    pub fn cranelift(e: impl fmt::Display) -> Self {
        CodegenErrorKind::InternalError {
            message: "cranelift error",
            context: Some(e.to_string()),
        }
        .into()
    }

    /// Wrap an IO error
    pub fn io(e: impl fmt::Display) -> Self {
        CodegenErrorKind::InternalError {
            message: "io error",
            context: Some(e.to_string()),
        }
        .into()
    }

    /// Attach a source span to this error for diagnostics.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

impl From<CodegenErrorKind> for CodegenError {
    fn from(kind: CodegenErrorKind) -> Self {
        CodegenError { kind, span: None }
    }
}

impl Diagnostic for CodegenError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code: &'static str = match &self.kind {
            CodegenErrorKind::UnsupportedFeature { .. } => "E3001",
            CodegenErrorKind::Verifier { .. } => "E3002",
            CodegenErrorKind::InternalError { .. } => "E3005",
        };
        Some(Box::new(code))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.span?;
        let len = span.end.saturating_sub(span.start);
        let label = match &self.kind {
            CodegenErrorKind::UnsupportedFeature { feature, .. } => {
                format!("{} is not supported", feature)
            }
            CodegenErrorKind::Verifier { function, .. } => {
                format!("invalid IR for {}", function)
            }
            CodegenErrorKind::InternalError { message, .. } => message.to_string(),
        };
        let labeled = LabeledSpan::new(Some(label), span.start, len);
        Some(Box::new(std::iter::once(labeled)))
    }
}

impl fmt::Display for CodegenErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodegenErrorKind::UnsupportedFeature { feature, context } => {
                write!(f, "unsupported feature: {}", feature)?;
                if let Some(ctx) = context {
                    write!(f, " ({})", ctx)?;
                }
                Ok(())
            }
            CodegenErrorKind::Verifier { function, errors } => {
                write!(f, "verifier rejected '{}': {}", function, errors)
            }
            CodegenErrorKind::InternalError { message, context } => {
                write!(f, "internal error: {}", message)?;
                if let Some(ctx) = context {
                    write!(f, " ({})", ctx)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_display_includes_context() {
        let err = CodegenError::unsupported_with_context(
            "interface call",
            "Shape has 2 root implementors",
        );
        assert_eq!(
            err.to_string(),
            "unsupported feature: interface call (Shape has 2 root implementors)"
        );
    }

    #[test]
    fn codes_follow_kind() {
        let err = CodegenError::cranelift("boom");
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("E3005"));
        assert!(err.labels().is_none());

        let err = err.with_span(Span::new(4, 8, 1, 5));
        assert_eq!(err.labels().map(|l| l.count()), Some(1));
    }
}
