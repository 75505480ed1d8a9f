//! Declarations and their two-operation contract.
//!
//! Every declaration can report the output units it owes without being
//! compiled ([`Decl::output_files`]) and can be compiled exactly once
//! ([`Decl::compile`]), optionally in the context of a state machine.

mod func;
mod machine;
mod type_decl;

use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use slicc_ast::ast;
use slicc_ast::Location;

use crate::error::CompileError;
use crate::func::Func;
use crate::machine::StateMachine;
use crate::scope::SymbolTable;
use crate::types::TypeHandle;

pub use func::FuncDecl;
pub use machine::{CompiledMachine, MachineDecl};
pub use type_decl::TypeDecl;

/// A declaration awaiting compilation
#[derive(Debug, Clone)]
pub enum Decl {
    Func(FuncDecl),
    Type(TypeDecl),
    Machine(MachineDecl),
}

impl From<ast::Decl> for Decl {
    fn from(ast: ast::Decl) -> Self {
        match ast {
            ast::Decl::Func(f) => Decl::Func(f.into()),
            ast::Decl::Type(t) => Decl::Type(t.into()),
            ast::Decl::Machine(m) => Decl::Machine(m.into()),
        }
    }
}

/// What a declaration compiled into
#[derive(Debug)]
pub enum Compiled {
    Func(Rc<Func>),
    Type(TypeHandle),
    Machine(CompiledMachine),
}

/// A per-declaration error, tagged with the declaration it aborted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclError {
    pub decl: String,
    pub error: CompileError,
}

impl fmt::Display for DeclError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "in `{}`: {}", self.decl, self.error)
    }
}

/// Reserve `files` for one declaration, failing if another declaration
/// already owes any of them. Nothing is reserved on failure.
pub(crate) fn claim_outputs(
    claimed: &mut BTreeSet<String>,
    files: BTreeSet<String>,
    location: &Location,
) -> Result<(), CompileError> {
    if let Some(file) = files.iter().find(|file| claimed.contains(*file)) {
        return Err(CompileError::DuplicateOutput {
            file: file.clone(),
            location: location.clone(),
        });
    }
    claimed.extend(files);
    Ok(())
}

impl Decl {
    pub fn ident(&self) -> &str {
        match self {
            Decl::Func(d) => &d.ident,
            Decl::Type(d) => &d.ident,
            Decl::Machine(d) => &d.ident,
        }
    }

    pub fn location(&self) -> &Location {
        match self {
            Decl::Func(d) => &d.location,
            Decl::Type(d) => &d.location,
            Decl::Machine(d) => &d.location,
        }
    }

    /// Output units this declaration owes; `parent` prefixes their names
    pub fn output_files(&self, parent: Option<&str>) -> BTreeSet<String> {
        match self {
            Decl::Func(d) => d.output_files(parent),
            Decl::Type(d) => d.output_files(parent),
            Decl::Machine(d) => d.output_files(parent),
        }
    }

    /// Make type declarations visible in the current frame ahead of
    /// compilation. Other declarations are untouched.
    pub(crate) fn predeclare(&mut self, symtab: &mut SymbolTable, machine: Option<&str>) {
        if let Decl::Type(d) = self {
            d.predeclare(symtab, machine);
        }
    }

    pub fn compile(
        self,
        symtab: &mut SymbolTable,
        machine: Option<&mut StateMachine>,
    ) -> Result<Compiled, CompileError> {
        match self {
            Decl::Func(d) => d.compile(symtab, machine).map(Compiled::Func),
            Decl::Type(d) => d.compile(symtab, machine).map(Compiled::Type),
            Decl::Machine(d) => d.compile(symtab, machine).map(Compiled::Machine),
        }
    }
}
