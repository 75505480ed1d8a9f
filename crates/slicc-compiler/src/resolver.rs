//! Type name resolution.

use slicc_ast::Location;

use crate::error::CompileError;
use crate::scope::SymbolTable;
use crate::types::TypeHandle;

/// Resolves type names to their canonical [`TypeHandle`].
pub trait TypeResolver {
    /// Find the type named `name` in any open frame
    fn resolve_type(&self, name: &str, location: &Location) -> Result<TypeHandle, CompileError>;
}

impl TypeResolver for SymbolTable {
    fn resolve_type(&self, name: &str, location: &Location) -> Result<TypeHandle, CompileError> {
        self.find_type(name)
            .ok_or_else(|| CompileError::UndefinedType {
                name: name.to_string(),
                location: location.clone(),
            })
    }
}
