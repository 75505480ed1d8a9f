use std::fmt;
use std::rc::Rc;

use slicc_ast::Location;

use crate::func::Func;
use crate::types::TypeHandle;

/// Symbol kinds. Lookups are always qualified by kind, so a type and a
/// function may share a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Type,
    Func,
    Var,
    Machine,
}

impl SymbolKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SymbolKind::Type => "type",
            SymbolKind::Func => "function",
            SymbolKind::Var => "variable",
            SymbolKind::Machine => "state machine",
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A variable visible inside a function body (parameter or local)
#[derive(Debug)]
pub struct Var {
    pub ident: String,
    pub location: Location,
    pub ty: TypeHandle,
    /// Expression used for the variable in generated code
    pub code: String,
}

impl Var {
    pub fn new(ident: impl Into<String>, location: Location, ty: TypeHandle) -> Self {
        let ident = ident.into();
        Self {
            code: ident.clone(),
            ident,
            location,
            ty,
        }
    }
}

/// A symbol in the symbol table
#[derive(Debug, Clone)]
pub enum Symbol {
    Type(TypeHandle),
    Func(Rc<Func>),
    Var(Rc<Var>),
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Type(ty) => &ty.ident,
            Symbol::Func(func) => &func.ident,
            Symbol::Var(var) => &var.ident,
        }
    }

    pub fn kind(&self) -> SymbolKind {
        match self {
            Symbol::Type(_) => SymbolKind::Type,
            Symbol::Func(_) => SymbolKind::Func,
            Symbol::Var(_) => SymbolKind::Var,
        }
    }

    pub fn location(&self) -> &Location {
        match self {
            Symbol::Type(ty) => &ty.location,
            Symbol::Func(func) => &func.location,
            Symbol::Var(var) => &var.location,
        }
    }
}
