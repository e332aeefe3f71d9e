//! Diagnostics shared between frontends and the checker.
//!
//! Checking never aborts on the first problem: every rule violation is
//! appended to a [`DiagnosticSink`] and the walk continues, so one pass
//! surfaces as many errors as possible. For terminal rendering a diagnostic
//! can be enriched with source text, which lets miette print a highlighted
//! snippet.

use miette::{NamedSource, SourceSpan};
use thiserror::Error;

use crate::span::Span;

/// Severity of a reported diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A single diagnostic produced while checking a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub span: Span,
    pub message: String,
}

impl Diagnostic {
    /// Attach source context so miette can render a highlighted snippet.
    pub fn render(&self, source: &str, filename: &str) -> RenderedDiagnostic {
        RenderedDiagnostic {
            src: NamedSource::new(filename, source.to_owned()),
            message: self.message.clone(),
            span: Some(SourceSpan::new(
                self.span.start.into(),
                self.span.end.saturating_sub(self.span.start),
            )),
        }
    }
}

/// Accumulates diagnostics across a whole checking pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, span: Span, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity: Severity::Error,
            span,
            message: message.into(),
        });
    }

    pub fn warning(&mut self, span: Span, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            span,
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| diagnostic.severity == Severity::Error)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }
}

/// A diagnostic enriched with source text for pretty terminal rendering.
#[derive(Debug, Error, miette::Diagnostic)]
#[error("{message}")]
pub struct RenderedDiagnostic {
    #[source_code]
    src: NamedSource<String>,
    message: String,
    #[label("here")]
    span: Option<SourceSpan>,
}
