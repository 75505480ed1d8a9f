//! Type symbols.
//!
//! Every distinct type name in a session maps to exactly one [`Type`],
//! shared through [`TypeHandle`]. Type equality is identity of the handle,
//! never structural comparison.

use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

use slicc_ast::Location;

use crate::attributes::Attributes;

/// Name of the builtin type every session registers
pub const VOID: &str = "void";

/// Shared, canonical reference to a type symbol
pub type TypeHandle = Rc<Type>;

/// Shape of a type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Void,
    Primitive,
    Structure(Vec<Field>),
    Enumeration(Vec<String>),
}

/// Field of a structure type. The type is kept by name and checked when the
/// declaring type is compiled, so fields may refer to types declared later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub ident: String,
    pub type_name: String,
    pub location: Location,
    resolved: OnceCell<ResolvedField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedField {
    c_type: String,
    header: Option<String>,
}

impl Field {
    pub fn new(ident: impl Into<String>, type_name: impl Into<String>, location: Location) -> Self {
        Self {
            ident: ident.into(),
            type_name: type_name.into(),
            location,
            resolved: OnceCell::new(),
        }
    }

    /// Spelling of the field type in generated code. Falls back to the
    /// declared name until the field has been resolved.
    pub fn c_type(&self) -> &str {
        self.resolved
            .get()
            .map_or(self.type_name.as_str(), |r| r.c_type.as_str())
    }

    /// Generated header declaring the field type, once resolved
    pub fn header(&self) -> Option<&str> {
        self.resolved.get().and_then(|r| r.header.as_deref())
    }

    pub(crate) fn resolve(&self, ty: &Type) {
        let resolved = self
            .resolved
            .set(ResolvedField {
                c_type: ty.c_ident().to_string(),
                header: ty.header(),
            })
            .is_ok();
        debug_assert!(resolved, "field `{}` resolved twice", self.ident);
    }
}

/// A named type
#[derive(Debug)]
pub struct Type {
    pub ident: String,
    c_ident: String,
    pub location: Location,
    pub kind: TypeKind,
    pub attributes: Attributes,
    /// State machine the type was declared in, if any
    pub machine: Option<String>,
}

impl Type {
    pub fn new(
        ident: impl Into<String>,
        location: Location,
        kind: TypeKind,
        attributes: Attributes,
        machine: Option<String>,
    ) -> Self {
        let ident = ident.into();
        let c_ident = match &machine {
            Some(machine) => format!("{machine}_{ident}"),
            None => ident.clone(),
        };
        Self {
            ident,
            c_ident,
            location,
            kind,
            attributes,
            machine,
        }
    }

    pub fn void() -> Self {
        Self::new(
            VOID,
            Location::builtin(),
            TypeKind::Void,
            Attributes::default(),
            None,
        )
    }

    /// Builtin primitive spelled `c_ident` in generated code
    pub fn builtin(ident: impl Into<String>, c_ident: Option<String>) -> Self {
        let mut ty = Self::new(
            ident,
            Location::builtin(),
            TypeKind::Primitive,
            Attributes {
                external: true,
                ..Attributes::default()
            },
            None,
        );
        if let Some(c_ident) = c_ident {
            ty.c_ident = c_ident;
        }
        ty
    }

    /// Name used for this type in generated code
    pub fn c_ident(&self) -> &str {
        &self.c_ident
    }

    pub fn is_void(&self) -> bool {
        matches!(self.kind, TypeKind::Void)
    }

    pub fn is_external(&self) -> bool {
        self.attributes.external
    }

    /// Generated header declaring this type; builtin and external types
    /// have none
    pub fn header(&self) -> Option<String> {
        (!self.is_external() && !self.is_void()).then(|| format!("{}.hh", self.c_ident))
    }

    pub fn is_enumeration(&self) -> bool {
        matches!(self.kind, TypeKind::Enumeration(_))
    }

    pub fn fields(&self) -> &[Field] {
        match &self.kind {
            TypeKind::Structure(fields) => fields,
            _ => &[],
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ident)
    }
}

/// Identity comparison of two type handles
pub fn same_type(a: &TypeHandle, b: &TypeHandle) -> bool {
    Rc::ptr_eq(a, b)
}
