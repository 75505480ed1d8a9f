//! Compiled function symbols.

use slicc_ast::Location;

use crate::attributes::{Attributes, ReturnMode};
use crate::types::TypeHandle;

/// Body of a compiled function
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FuncBody {
    /// Implementation lives outside the protocol source; nothing is generated
    External,
    /// Generated statements, already indented for a definition block
    Generated(String),
}

/// A compiled function declaration.
///
/// `param_types` and `param_names` are index-aligned and always the same
/// length.
#[derive(Debug)]
pub struct Func {
    pub ident: String,
    pub location: Location,
    pub return_type: TypeHandle,
    pub param_types: Vec<TypeHandle>,
    pub param_names: Vec<String>,
    pub body: FuncBody,
    pub attributes: Attributes,
    /// Owning state machine, if the function was declared inside one
    pub machine: Option<String>,
}

impl Func {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ident: impl Into<String>,
        location: Location,
        return_type: TypeHandle,
        param_types: Vec<TypeHandle>,
        param_names: Vec<String>,
        body: FuncBody,
        attributes: Attributes,
        machine: Option<String>,
    ) -> Self {
        assert_eq!(
            param_types.len(),
            param_names.len(),
            "parameter types and names must be index-aligned"
        );
        Self {
            ident: ident.into(),
            location,
            return_type,
            param_types,
            param_names,
            body,
            attributes,
            machine,
        }
    }

    /// No definition is generated for this function
    pub fn is_external(&self) -> bool {
        self.attributes.external || matches!(self.body, FuncBody::External)
    }

    /// Unique name across machines: `Machine_ident` or `ident`
    pub fn c_ident(&self) -> String {
        match &self.machine {
            Some(machine) => format!("{machine}_{}", self.ident),
            None => self.ident.clone(),
        }
    }

    /// Translation unit holding the definition, if one is generated
    pub fn output_file(&self) -> Option<String> {
        (!self.is_external()).then(|| format!("{}.cc", self.c_ident()))
    }

    /// (type, name) pairs in declaration order
    pub fn params(&self) -> impl Iterator<Item = (&TypeHandle, &str)> {
        self.param_types
            .iter()
            .zip(self.param_names.iter().map(String::as_str))
    }

    fn return_c_type(&self) -> String {
        let base = self.return_type.c_ident();
        if self.return_type.is_void() {
            return base.to_string();
        }
        match self.attributes.return_mode {
            ReturnMode::Value => base.to_string(),
            ReturnMode::Ref => format!("{base}&"),
            ReturnMode::Pointer => format!("{base}*"),
        }
    }

    fn param_list(&self) -> String {
        self.params()
            .map(|(ty, name)| format!("{} {}", ty.c_ident(), name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Declaration line, as it appears in a header or class body
    pub fn prototype(&self) -> String {
        format!(
            "{} {}({});",
            self.return_c_type(),
            self.ident,
            self.param_list()
        )
    }

    /// Full definition text, or `None` for external functions
    pub fn definition(&self) -> Option<String> {
        let FuncBody::Generated(body) = &self.body else {
            return None;
        };
        if self.attributes.external {
            return None;
        }

        let qualifier = self
            .machine
            .as_ref()
            .map(|machine| format!("{machine}_Controller::"))
            .unwrap_or_default();

        let mut text = String::new();
        if let Some(desc) = &self.attributes.desc {
            text.push_str(&format!("// {desc}\n"));
        }
        text.push_str(&format!(
            "{}\n{}{}({})\n{{\n{}}}\n",
            self.return_c_type(),
            qualifier,
            self.ident,
            self.param_list(),
            body
        ));
        Some(text)
    }
}
