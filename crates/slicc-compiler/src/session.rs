//! Compilation sessions.
//!
//! A session owns the symbol table for one compilation run. Opening it
//! registers `void` and the configured builtin types in the global frame;
//! dropping it tears that state down again.

use std::collections::BTreeSet;
use std::rc::Rc;

use crate::config::CompilerConfig;
use crate::decls::{claim_outputs, Compiled, Decl, DeclError};
use crate::diagnostics::{Diagnostic, Severity};
use crate::error::CompileError;
use crate::func::{Func, FuncBody};
use crate::machine::{MachineRegistry, StateMachine};
use crate::scope::SymbolTable;
use crate::symbols::Symbol;
use crate::types::{Type, TypeHandle};

/// Everything produced by [`Session::compile`]
#[derive(Debug, Default)]
pub struct CompileOutput {
    /// Free-standing functions, in source order
    pub functions: Vec<Rc<Func>>,
    /// Top-level types, in source order. Machine types live on their machine.
    pub types: Vec<TypeHandle>,
    pub machines: Vec<Rc<StateMachine>>,
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Warn about a body that is type-checked but never emitted
    fn check_unused_body(&mut self, func: &Func) {
        if !func.attributes.external || !matches!(func.body, FuncBody::Generated(_)) {
            return;
        }
        tracing::warn!(func = %func.ident, "external function has a body");
        self.diagnostics.push(
            Diagnostic::warning(
                format!("`{}` is external; its body is checked but not emitted", func.ident),
                func.location.clone(),
            )
            .with_code("W0001"),
        );
    }

    fn record(&mut self, err: &DeclError, location: &slicc_ast::Location) {
        tracing::warn!(decl = %err.decl, code = err.error.code(), "{}", err.error);
        self.diagnostics.push(Diagnostic::from_error(err, location));
    }
}

/// One compilation run
#[derive(Debug)]
pub struct Session {
    symtab: SymbolTable,
    machines: MachineRegistry,
}

impl Session {
    pub fn new(config: &CompilerConfig) -> Result<Self, CompileError> {
        let mut symtab = SymbolTable::new();
        for builtin in &config.types {
            let ty = Type::builtin(&builtin.ident, builtin.c_ident.clone());
            symtab.new_symbol(Symbol::Type(Rc::new(ty)))?;
        }
        tracing::debug!(builtins = config.types.len(), "session opened");
        Ok(Self {
            symtab,
            machines: MachineRegistry::new(),
        })
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symtab
    }

    pub fn machines(&self) -> &MachineRegistry {
        &self.machines
    }

    /// Names of every unit the declarations owe, without compiling them
    pub fn output_files(decls: &[Decl]) -> BTreeSet<String> {
        decls.iter().flat_map(|decl| decl.output_files(None)).collect()
    }

    /// Compile declarations in source order.
    ///
    /// Per-declaration errors become diagnostics and compilation moves on to
    /// the next declaration. Only an unbalanced frame stack aborts the run.
    pub fn compile(&mut self, mut decls: Vec<Decl>) -> Result<CompileOutput, CompileError> {
        for decl in &mut decls {
            decl.predeclare(&mut self.symtab, None);
        }

        let mut output = CompileOutput::default();
        let mut claimed = BTreeSet::new();
        for decl in decls {
            let ident = decl.ident().to_string();
            let location = decl.location().clone();
            let unique = match &decl {
                Decl::Machine(_) => self.machines.check_unique(&ident, &location),
                _ => Ok(()),
            };
            let result = unique
                .and_then(|()| claim_outputs(&mut claimed, decl.output_files(None), &location))
                .and_then(|()| decl.compile(&mut self.symtab, None));

            if self.symtab.depth() != 1 {
                return Err(CompileError::ScopeDiscipline {
                    depth: self.symtab.depth(),
                });
            }

            match result {
                Ok(Compiled::Func(func)) => {
                    output.check_unused_body(&func);
                    output.functions.push(func);
                }
                Ok(Compiled::Type(ty)) => output.types.push(ty),
                Ok(Compiled::Machine(compiled)) => {
                    for err in &compiled.errors {
                        output.record(err, &location);
                    }
                    for func in compiled.machine.functions() {
                        output.check_unused_body(func);
                    }
                    match self.machines.register(compiled.machine) {
                        Ok(machine) => output.machines.push(machine),
                        Err(error) => output.record(&DeclError { decl: ident, error }, &location),
                    }
                }
                Err(err) if err.is_fatal() => return Err(err),
                Err(error) => output.record(&DeclError { decl: ident, error }, &location),
            }
        }

        tracing::info!(
            functions = output.functions.len(),
            types = output.types.len(),
            machines = output.machines.len(),
            diagnostics = output.diagnostics.len(),
            "compilation finished"
        );
        Ok(output)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        tracing::debug!(machines = self.machines.len(), "session closed");
    }
}
