use std::collections::BTreeSet;
use std::rc::Rc;

use slicc_ast::ast::{TypeBody, TypeDeclAst};
use slicc_ast::Location;

use crate::attributes::Attributes;
use crate::error::CompileError;
use crate::machine::StateMachine;
use crate::resolver::TypeResolver;
use crate::scope::SymbolTable;
use crate::symbols::{Symbol, Var};
use crate::types::{Field, Type, TypeHandle, TypeKind};

/// Progress of a type through predeclaration
#[derive(Debug, Clone)]
enum Declaration {
    Pending,
    Declared(TypeHandle),
    /// Registration failed; reported when the declaration is compiled
    Rejected(CompileError),
}

/// Type declaration awaiting compilation
#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub ident: String,
    pub body: TypeBody,
    pub attributes: Attributes,
    pub location: Location,
    declaration: Declaration,
}

impl From<TypeDeclAst> for TypeDecl {
    fn from(ast: TypeDeclAst) -> Self {
        Self {
            ident: ast.ident,
            body: ast.body,
            attributes: Attributes::from_pairs(&ast.pairs),
            location: ast.location,
            declaration: Declaration::Pending,
        }
    }
}

impl TypeDecl {
    pub fn output_files(&self, parent: Option<&str>) -> BTreeSet<String> {
        if self.attributes.external {
            return BTreeSet::new();
        }
        let ident = match parent {
            Some(parent) => format!("{parent}_{}", self.ident),
            None => self.ident.clone(),
        };
        let mut files = BTreeSet::from([format!("{ident}.hh")]);
        if matches!(self.body, TypeBody::Enumeration(_)) {
            files.insert(format!("{ident}.cc"));
        }
        files
    }

    /// Register the type symbol in the current frame so declarations
    /// anywhere in the same scope can name it.
    pub(crate) fn predeclare(&mut self, symtab: &mut SymbolTable, machine: Option<&str>) {
        if !matches!(self.declaration, Declaration::Pending) {
            return;
        }

        let kind = match &self.body {
            TypeBody::Primitive => TypeKind::Primitive,
            TypeBody::Structure(fields) => TypeKind::Structure(
                fields
                    .iter()
                    .map(|field| {
                        Field::new(&field.ident, &field.ty.ident, field.location.clone())
                    })
                    .collect(),
            ),
            TypeBody::Enumeration(values) => TypeKind::Enumeration(values.clone()),
        };

        let ty = Rc::new(Type::new(
            self.ident.clone(),
            self.location.clone(),
            kind,
            self.attributes.clone(),
            machine.map(str::to_string),
        ));

        self.declaration = match symtab.new_symbol(Symbol::Type(Rc::clone(&ty))) {
            Ok(()) => Declaration::Declared(ty),
            Err(err) => Declaration::Rejected(err),
        };
    }

    /// Check that every field type resolves and that field and enumerator
    /// names are unique.
    pub fn compile(
        mut self,
        symtab: &mut SymbolTable,
        machine: Option<&mut StateMachine>,
    ) -> Result<TypeHandle, CompileError> {
        self.predeclare(symtab, machine.as_ref().map(|m| m.ident.as_str()));
        let ty = match self.declaration {
            Declaration::Declared(ty) => ty,
            Declaration::Rejected(err) => return Err(err),
            Declaration::Pending => unreachable!("predeclare always settles the declaration"),
        };

        {
            let mut frame = symtab.frame();
            match &ty.kind {
                TypeKind::Structure(fields) => {
                    for field in fields {
                        let field_type = frame.resolve_type(&field.type_name, &field.location)?;
                        field.resolve(&field_type);
                        let var = Var::new(&field.ident, field.location.clone(), field_type);
                        frame.new_symbol(Symbol::Var(Rc::new(var)))?;
                    }
                }
                TypeKind::Enumeration(values) => {
                    for value in values {
                        let var = Var::new(value, ty.location.clone(), Rc::clone(&ty));
                        frame.new_symbol(Symbol::Var(Rc::new(var)))?;
                    }
                }
                TypeKind::Primitive | TypeKind::Void => {}
            }
        }

        if let Some(machine) = machine {
            machine.add_type(Rc::clone(&ty));
        }
        tracing::debug!(ty = %ty.c_ident(), "compiled type");
        Ok(ty)
    }
}
