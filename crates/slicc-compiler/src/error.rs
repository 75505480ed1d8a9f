//! Errors raised while compiling declarations.

use std::fmt;

use slicc_ast::Location;

use crate::symbols::SymbolKind;

/// Error raised while compiling a declaration.
///
/// Everything except [`CompileError::ScopeDiscipline`] is scoped to the
/// declaration being compiled: the session records it and moves on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// No open frame holds a symbol with this name and kind
    UnresolvedSymbol {
        name: String,
        kind: SymbolKind,
        location: Location,
    },
    /// A return or parameter type name does not resolve to a type
    UndefinedType { name: String, location: Location },
    /// Name and kind already bound in the same frame
    DuplicateSymbol {
        name: String,
        kind: SymbolKind,
        location: Location,
    },
    /// Frame stack out of balance; the session cannot continue
    ScopeDiscipline { depth: usize },
    /// Output unit already owed by another declaration
    DuplicateOutput { file: String, location: Location },
    /// Operand, argument or return value of the wrong type
    TypeMismatch {
        expected: String,
        found: String,
        location: Location,
    },
    /// Call with the wrong number of arguments
    ArgumentCount {
        func: String,
        expected: usize,
        found: usize,
        location: Location,
    },
    /// Assignment to something other than a variable
    InvalidAssignment { location: Location },
    /// State machine declared inside another state machine
    NestedMachine { ident: String, location: Location },
}

impl CompileError {
    /// Whether the error invalidates the whole session rather than one declaration
    pub fn is_fatal(&self) -> bool {
        matches!(self, CompileError::ScopeDiscipline { .. })
    }

    /// Stable diagnostic code
    pub fn code(&self) -> &'static str {
        match self {
            CompileError::UnresolvedSymbol { .. } => "E0101",
            CompileError::UndefinedType { .. } => "E0102",
            CompileError::DuplicateSymbol { .. } => "E0103",
            CompileError::ScopeDiscipline { .. } => "E0104",
            CompileError::DuplicateOutput { .. } => "E0105",
            CompileError::TypeMismatch { .. } => "E0201",
            CompileError::ArgumentCount { .. } => "E0202",
            CompileError::InvalidAssignment { .. } => "E0203",
            CompileError::NestedMachine { .. } => "E0301",
        }
    }

    pub fn location(&self) -> Option<&Location> {
        match self {
            CompileError::UnresolvedSymbol { location, .. }
            | CompileError::UndefinedType { location, .. }
            | CompileError::DuplicateSymbol { location, .. }
            | CompileError::TypeMismatch { location, .. }
            | CompileError::DuplicateOutput { location, .. }
            | CompileError::ArgumentCount { location, .. }
            | CompileError::InvalidAssignment { location }
            | CompileError::NestedMachine { location, .. } => Some(location),
            CompileError::ScopeDiscipline { .. } => None,
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::UnresolvedSymbol { name, kind, .. } => {
                write!(f, "unresolved {kind} `{name}`")
            }
            CompileError::UndefinedType { name, .. } => write!(f, "undefined type `{name}`"),
            CompileError::DuplicateSymbol { name, kind, .. } => {
                write!(f, "duplicate {kind} `{name}` in the same scope")
            }
            CompileError::ScopeDiscipline { depth } => {
                write!(f, "scope stack out of balance at depth {depth}")
            }
            CompileError::DuplicateOutput { file, .. } => {
                write!(f, "output file `{file}` is already generated by another declaration")
            }
            CompileError::TypeMismatch {
                expected, found, ..
            } => write!(f, "type mismatch: expected `{expected}`, found `{found}`"),
            CompileError::ArgumentCount {
                func,
                expected,
                found,
                ..
            } => write!(
                f,
                "`{func}` takes {expected} argument(s) but {found} were supplied"
            ),
            CompileError::InvalidAssignment { .. } => {
                write!(f, "left-hand side of an assignment must be a variable")
            }
            CompileError::NestedMachine { ident, .. } => {
                write!(f, "state machine `{ident}` cannot be declared inside another machine")
            }
        }
    }
}

impl std::error::Error for CompileError {}
