//! State machines and the functions bound to them.

use std::collections::HashMap;
use std::rc::Rc;

use slicc_ast::Location;

use crate::attributes::Attributes;
use crate::error::CompileError;
use crate::func::Func;
use crate::symbols::SymbolKind;
use crate::types::TypeHandle;

/// A coherence controller being compiled. Functions declared inside it are
/// registered here instead of in the global frame.
#[derive(Debug)]
pub struct StateMachine {
    pub ident: String,
    pub location: Location,
    pub attributes: Attributes,
    functions: Vec<Rc<Func>>,
    func_index: HashMap<String, usize>,
    types: Vec<TypeHandle>,
}

impl StateMachine {
    pub fn new(ident: impl Into<String>, location: Location, attributes: Attributes) -> Self {
        Self {
            ident: ident.into(),
            location,
            attributes,
            functions: Vec::new(),
            func_index: HashMap::new(),
            types: Vec::new(),
        }
    }

    /// Bind a function to this machine
    pub fn add_func(&mut self, func: Rc<Func>) -> Result<(), CompileError> {
        if self.func_index.contains_key(&func.ident) {
            return Err(CompileError::DuplicateSymbol {
                name: func.ident.clone(),
                kind: SymbolKind::Func,
                location: func.location.clone(),
            });
        }
        self.func_index
            .insert(func.ident.clone(), self.functions.len());
        self.functions.push(func);
        Ok(())
    }

    pub fn find_func(&self, ident: &str) -> Option<&Rc<Func>> {
        self.func_index.get(ident).map(|&i| &self.functions[i])
    }

    /// Bound functions in declaration order
    pub fn functions(&self) -> &[Rc<Func>] {
        &self.functions
    }

    pub fn add_type(&mut self, ty: TypeHandle) {
        self.types.push(ty);
    }

    /// Types declared inside this machine, in declaration order
    pub fn types(&self) -> &[TypeHandle] {
        &self.types
    }

    /// Name of the generated controller class
    pub fn controller_ident(&self) -> String {
        format!("{}_Controller", self.ident)
    }
}

/// Every state machine compiled in a session
#[derive(Debug, Default)]
pub struct MachineRegistry {
    machines: Vec<Rc<StateMachine>>,
    index: HashMap<String, usize>,
}

impl MachineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail if a machine named `ident` is already registered
    pub fn check_unique(&self, ident: &str, location: &Location) -> Result<(), CompileError> {
        if self.index.contains_key(ident) {
            return Err(CompileError::DuplicateSymbol {
                name: ident.to_string(),
                kind: SymbolKind::Machine,
                location: location.clone(),
            });
        }
        Ok(())
    }

    pub fn register(&mut self, machine: StateMachine) -> Result<Rc<StateMachine>, CompileError> {
        self.check_unique(&machine.ident, &machine.location)?;
        let machine = Rc::new(machine);
        self.index
            .insert(machine.ident.clone(), self.machines.len());
        self.machines.push(Rc::clone(&machine));
        Ok(machine)
    }

    pub fn get(&self, ident: &str) -> Option<&Rc<StateMachine>> {
        self.index.get(ident).map(|&i| &self.machines[i])
    }

    pub fn len(&self) -> usize {
        self.machines.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::func::FuncBody;
    use crate::types::Type;

    fn func(ident: &str) -> Rc<Func> {
        Rc::new(Func::new(
            ident,
            Location::default(),
            Rc::new(Type::void()),
            Vec::new(),
            Vec::new(),
            FuncBody::External,
            Attributes::default(),
            Some("L1Cache".to_string()),
        ))
    }

    fn machine(ident: &str) -> StateMachine {
        StateMachine::new(ident, Location::default(), Attributes::default())
    }

    #[test]
    fn test_add_and_find_func() {
        let mut m = machine("L1Cache");
        m.add_func(func("getState")).expect("should succeed");
        m.add_func(func("setState")).expect("should succeed");

        assert!(m.find_func("getState").is_some());
        assert!(m.find_func("missing").is_none());
        let names: Vec<_> = m.functions().iter().map(|f| f.ident.as_str()).collect();
        assert_eq!(names, vec!["getState", "setState"]);
    }

    #[test]
    fn test_duplicate_func_rejected() {
        let mut m = machine("L1Cache");
        m.add_func(func("getState")).expect("should succeed");
        assert!(matches!(
            m.add_func(func("getState")),
            Err(CompileError::DuplicateSymbol {
                kind: SymbolKind::Func,
                ..
            })
        ));
        assert_eq!(m.functions().len(), 1);
    }

    #[test]
    fn test_controller_ident() {
        assert_eq!(machine("Directory").controller_ident(), "Directory_Controller");
    }

    #[test]
    fn test_registry_rejects_duplicate_machine() {
        let mut registry = MachineRegistry::new();
        registry.register(machine("L1Cache")).expect("should succeed");
        registry.register(machine("L2Cache")).expect("should succeed");
        assert!(matches!(
            registry.register(machine("L1Cache")),
            Err(CompileError::DuplicateSymbol {
                kind: SymbolKind::Machine,
                ..
            })
        ));
        assert_eq!(registry.len(), 2);
        assert!(registry.get("L2Cache").is_some());
    }
}
