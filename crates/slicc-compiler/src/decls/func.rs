use std::collections::BTreeSet;
use std::rc::Rc;

use slicc_ast::ast::{FormalParam, FuncDeclAst, Stmt, TypeAst};
use slicc_ast::Location;

use crate::attributes::Attributes;
use crate::codegen::{BodyGenerator, CodeFormatter};
use crate::error::CompileError;
use crate::func::{Func, FuncBody};
use crate::machine::StateMachine;
use crate::resolver::TypeResolver;
use crate::scope::SymbolTable;
use crate::symbols::{Symbol, Var};

/// Function declaration awaiting compilation
#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub return_type: TypeAst,
    pub ident: String,
    pub formals: Vec<FormalParam>,
    pub attributes: Attributes,
    pub location: Location,
    statements: Option<Vec<Stmt>>,
}

impl From<FuncDeclAst> for FuncDecl {
    fn from(ast: FuncDeclAst) -> Self {
        Self {
            return_type: ast.return_type,
            ident: ast.ident,
            formals: ast.formals,
            attributes: Attributes::from_pairs(&ast.pairs),
            location: ast.location,
            statements: ast.statements,
        }
    }
}

impl FuncDecl {
    /// Body statements, if any were supplied
    pub fn statements(&self) -> Option<&[Stmt]> {
        self.statements
            .as_deref()
            .filter(|statements| !statements.is_empty())
    }

    /// Nothing is generated locally for this function
    pub fn is_external(&self) -> bool {
        self.attributes.external || self.statements().is_none()
    }

    /// Units this declaration owes, computed without compiling it
    pub fn output_files(&self, parent: Option<&str>) -> BTreeSet<String> {
        if self.is_external() {
            return BTreeSet::new();
        }
        let ident = match parent {
            Some(parent) => format!("{parent}_{}", self.ident),
            None => self.ident.clone(),
        };
        BTreeSet::from([format!("{ident}.cc")])
    }

    /// Compile into a [`Func`] and register it on `machine`, or in the
    /// table's current frame when there is no machine.
    ///
    /// On error nothing is registered and the parameter frame is closed.
    pub fn compile(
        mut self,
        symtab: &mut SymbolTable,
        machine: Option<&mut StateMachine>,
    ) -> Result<Rc<Func>, CompileError> {
        let return_type = symtab.resolve_type(&self.return_type.ident, &self.return_type.location)?;

        let (param_types, param_names, body) = {
            let mut frame = symtab.frame();
            let mut param_types = Vec::with_capacity(self.formals.len());
            let mut param_names = Vec::with_capacity(self.formals.len());

            for formal in &self.formals {
                let ty = frame.resolve_type(&formal.ty.ident, &formal.ty.location)?;
                let var = Var::new(&formal.ident, formal.location.clone(), Rc::clone(&ty));
                frame.new_symbol(Symbol::Var(Rc::new(var)))?;
                param_types.push(ty);
                param_names.push(formal.ident.clone());
            }

            let statements = self.statements.take().filter(|s| !s.is_empty());
            let body = match statements {
                None => {
                    self.attributes.mark_external();
                    FuncBody::External
                }
                Some(statements) => {
                    let mut out = CodeFormatter::new();
                    out.indent();
                    BodyGenerator::new(&mut frame, machine.as_deref(), &return_type)
                        .generate(&mut out, &statements)?;
                    FuncBody::Generated(out.finish())
                }
            };

            (param_types, param_names, body)
        };

        let func = Rc::new(Func::new(
            self.ident,
            self.location,
            return_type,
            param_types,
            param_names,
            body,
            self.attributes,
            machine.as_ref().map(|m| m.ident.clone()),
        ));

        match machine {
            Some(machine) => machine.add_func(Rc::clone(&func))?,
            None => symtab.new_symbol(Symbol::Func(Rc::clone(&func)))?,
        }

        tracing::debug!(func = %func.c_ident(), external = func.is_external(), "compiled function");
        Ok(func)
    }
}
