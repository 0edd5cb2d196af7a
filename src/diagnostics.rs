//! Diagnostics for the evaluation core.
//!
//! Every failure in this crate is a [`Diagnostic`]: a stable machine-readable
//! code (`hcl2::<subsystem>::<kind>`), a human message, zero or more labeled
//! source spans, optional help, contextual notes accumulated while an error
//! propagates outward, and an optional cause chain. Rendering (snippets,
//! color, layout) is the caller's concern; this module only constructs the
//! records and exposes them through `miette::Diagnostic` so any miette
//! reporter can display them.

use std::fmt;
use std::sync::Arc;

use miette::{LabeledSpan, NamedSource};
use thiserror::Error;

use crate::span::Span;

/// How severe a diagnostic is. Everything the evaluator produces is an
/// [`Severity::Error`]; the other levels exist for host tooling built on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Advice,
    Warning,
    Error,
}

/// A source span with an explanatory label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub span: Span,
    pub text: String,
}

/// The single failure record used across the evaluation core.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct Diagnostic {
    pub severity: Severity,
    /// Stable code of the form `hcl2::<subsystem>::<kind>`.
    pub code: String,
    pub message: String,
    pub labels: Vec<Label>,
    pub help: Option<String>,
    /// Context accumulated while the error propagates, innermost first.
    pub notes: Vec<String>,
    #[source]
    pub cause: Option<Box<Diagnostic>>,
    source_code: Option<Arc<NamedSource<String>>>,
}

impl Diagnostic {
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code: code.into(),
            message: message.into(),
            labels: Vec::new(),
            help: None,
            notes: Vec::new(),
            cause: None,
            source_code: None,
        }
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(code, message)
        }
    }

    pub fn with_label(mut self, span: Span, text: impl Into<String>) -> Self {
        self.labels.push(Label {
            span,
            text: text.into(),
        });
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Appends a contextual note, e.g. `"while evaluating element 2"`.
    pub fn with_context(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Chains a nested diagnostic as this one's cause. Surfaced through
    /// `std::error::Error::source`, which miette renders as a cause chain.
    pub fn caused_by(mut self, cause: Diagnostic) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Attaches the source text the spans point into, so a reporter can
    /// render code snippets. The core never reads it back.
    pub fn with_source_code(
        mut self,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        self.source_code = Some(Arc::new(NamedSource::new(name.into(), content.into())));
        self
    }
}

impl miette::Diagnostic for Diagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(&self.code))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(match self.severity {
            Severity::Advice => miette::Severity::Advice,
            Severity::Warning => miette::Severity::Warning,
            Severity::Error => miette::Severity::Error,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match (&self.help, self.notes.is_empty()) {
            (Some(help), true) => Some(Box::new(help.clone())),
            (Some(help), false) => Some(Box::new(format!(
                "{help}\n{notes}",
                notes = self.notes.join("\n")
            ))),
            (None, false) => Some(Box::new(self.notes.join("\n"))),
            (None, true) => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        if self.labels.is_empty() {
            return None;
        }
        Some(Box::new(self.labels.iter().map(|label| {
            LabeledSpan::new_with_span(Some(label.text.clone()), label.span)
        })))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.source_code
            .as_deref()
            .map(|source| source as &dyn miette::SourceCode)
    }
}

/// The canonical result type for any operation in the evaluation core.
pub type Result<T> = std::result::Result<T, Diagnostic>;
