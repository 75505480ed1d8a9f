use std::collections::BTreeSet;

use slicc_ast::ast::MachineDeclAst;
use slicc_ast::Location;

use crate::attributes::Attributes;
use crate::decls::{claim_outputs, Decl, DeclError};
use crate::error::CompileError;
use crate::machine::StateMachine;
use crate::scope::SymbolTable;

/// State machine declaration and its member declarations
#[derive(Debug, Clone)]
pub struct MachineDecl {
    pub ident: String,
    pub attributes: Attributes,
    pub location: Location,
    pub decls: Vec<Decl>,
}

impl From<MachineDeclAst> for MachineDecl {
    fn from(ast: MachineDeclAst) -> Self {
        Self {
            ident: ast.ident,
            attributes: Attributes::from_pairs(&ast.pairs),
            location: ast.location,
            decls: ast.decls.into_iter().map(Decl::from).collect(),
        }
    }
}

/// A compiled machine along with the members that failed to compile
#[derive(Debug)]
pub struct CompiledMachine {
    pub machine: StateMachine,
    pub errors: Vec<DeclError>,
}

impl MachineDecl {
    /// The controller header plus every member's units, prefixed with the
    /// machine name
    pub fn output_files(&self, _parent: Option<&str>) -> BTreeSet<String> {
        let mut files = BTreeSet::from([format!("{}_Controller.hh", self.ident)]);
        for decl in &self.decls {
            files.extend(decl.output_files(Some(self.ident.as_str())));
        }
        files
    }

    /// Compile every member with this machine as context.
    ///
    /// Member types live in a frame of their own, so they are visible to the
    /// other members but not outside the machine. Member errors are
    /// collected, not propagated; only fatal errors abort.
    pub fn compile(
        self,
        symtab: &mut SymbolTable,
        machine: Option<&mut StateMachine>,
    ) -> Result<CompiledMachine, CompileError> {
        if machine.is_some() {
            return Err(CompileError::NestedMachine {
                ident: self.ident,
                location: self.location,
            });
        }

        let mut state_machine = StateMachine::new(self.ident, self.location, self.attributes);
        let mut errors = Vec::new();
        let mut decls = self.decls;

        let mut frame = symtab.frame();
        for decl in &mut decls {
            decl.predeclare(&mut frame, Some(state_machine.ident.as_str()));
        }

        let mut claimed = BTreeSet::from([state_machine.controller_ident() + ".hh"]);
        for decl in decls {
            let ident = decl.ident().to_string();
            let files = decl.output_files(Some(state_machine.ident.as_str()));
            let result = claim_outputs(&mut claimed, files, decl.location())
                .and_then(|()| decl.compile(&mut frame, Some(&mut state_machine)));
            match result {
                Ok(_) => {}
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    tracing::warn!(machine = %state_machine.ident, decl = %ident, "{err}");
                    errors.push(DeclError { decl: ident, error: err });
                }
            }
        }
        drop(frame);

        tracing::debug!(
            machine = %state_machine.ident,
            functions = state_machine.functions().len(),
            types = state_machine.types().len(),
            "compiled state machine"
        );
        Ok(CompiledMachine {
            machine: state_machine,
            errors,
        })
    }
}
