//! Core diagnostic types.
//!
//! Defines [`Diagnostic`] and [`Severity`], the values every processing phase
//! uses to report problems.

use std::fmt;

use tessel_ir::{QualifiedName, SourceLocation};

use crate::ErrorCode;

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A single problem report.
///
/// `subject` names the offending declaration; `location` is the host's
/// source position for it when one is known.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: ErrorCode,
    pub message: String,
    pub subject: Option<QualifiedName>,
    pub location: Option<SourceLocation>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    /// Create an error diagnostic with an empty message.
    pub fn error(code: ErrorCode) -> Self {
        Self::with_severity(Severity::Error, code)
    }

    pub fn warning(code: ErrorCode) -> Self {
        Self::with_severity(Severity::Warning, code)
    }

    fn with_severity(severity: Severity, code: ErrorCode) -> Self {
        Diagnostic {
            severity,
            code,
            message: String::new(),
            subject: None,
            location: None,
            notes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attribute the diagnostic to a declaration.
    #[must_use]
    pub fn with_subject(mut self, subject: QualifiedName) -> Self {
        self.subject = Some(subject);
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: Option<SourceLocation>) -> Self {
        self.location = location;
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)?;
        match (&self.location, &self.subject) {
            (Some(location), Some(subject)) => write!(f, "\n  --> {location} ({subject})")?,
            (Some(location), None) => write!(f, "\n  --> {location}")?,
            (None, Some(subject)) => write!(f, "\n  --> {subject}")?,
            (None, None) => {}
        }
        for note in &self.notes {
            write!(f, "\n  = note: {note}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
