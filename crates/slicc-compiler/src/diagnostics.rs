use slicc_ast::Location;

use crate::decls::DeclError;

/// Diagnostic severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

/// A diagnostic message
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub location: Location,
    pub code: Option<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, location: Location) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            location,
            code: None,
        }
    }

    pub fn warning(message: impl Into<String>, location: Location) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            location,
            code: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Error diagnostic for a declaration that failed to compile.
    /// Falls back to the declaration's location when the error has none,
    /// or only the empty default one.
    pub fn from_error(err: &DeclError, decl_location: &Location) -> Self {
        let location = err
            .error
            .location()
            .filter(|location| **location != Location::default())
            .unwrap_or(decl_location)
            .clone();
        Diagnostic::error(err.to_string(), location).with_code(err.error.code())
    }
}
