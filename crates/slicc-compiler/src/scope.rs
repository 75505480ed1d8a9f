//! Scope management for declaration compilation.
//!
//! The symbol table is a stack of frames. The bottom (global) frame is
//! opened when the table is created and holds builtin types, declared types
//! and free-standing functions; every function body and nested block pushes
//! another frame on top of it.

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use slicc_ast::Location;

use crate::error::CompileError;
use crate::func::Func;
use crate::symbols::{Symbol, SymbolKind, Var};
use crate::types::{Type, TypeHandle};

/// One lexical frame: (name, kind) -> symbol
#[derive(Debug, Default)]
struct Frame {
    symbols: HashMap<(String, SymbolKind), Symbol>,
}

/// Stack of lexical frames
#[derive(Debug)]
pub struct SymbolTable {
    frames: Vec<Frame>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// Create a table with an open global frame holding `void`
    pub fn new() -> Self {
        let mut global = Frame::default();
        global.symbols.insert(
            (crate::types::VOID.to_string(), SymbolKind::Type),
            Symbol::Type(Rc::new(Type::void())),
        );
        Self {
            frames: vec![global],
        }
    }

    /// Number of open frames (1 = only the global frame)
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Open a new innermost frame
    pub fn push_frame(&mut self) {
        self.frames.push(Frame::default());
        tracing::trace!(depth = self.frames.len(), "push frame");
    }

    /// Close the innermost frame, discarding every symbol registered in it.
    /// The global frame cannot be closed.
    pub fn pop_frame(&mut self) -> Result<(), CompileError> {
        if self.frames.len() <= 1 {
            return Err(CompileError::ScopeDiscipline {
                depth: self.frames.len(),
            });
        }
        self.frames.pop();
        tracing::trace!(depth = self.frames.len(), "pop frame");
        Ok(())
    }

    /// Open a frame that is closed again when the guard goes out of scope
    pub fn frame(&mut self) -> FrameGuard<'_> {
        self.push_frame();
        FrameGuard { table: self }
    }

    /// Register a symbol in the innermost frame
    pub fn new_symbol(&mut self, symbol: Symbol) -> Result<(), CompileError> {
        let key = (symbol.name().to_string(), symbol.kind());
        let frame = self
            .frames
            .last_mut()
            .ok_or(CompileError::ScopeDiscipline { depth: 0 })?;

        if frame.symbols.contains_key(&key) {
            return Err(CompileError::DuplicateSymbol {
                name: key.0,
                kind: key.1,
                location: symbol.location().clone(),
            });
        }

        frame.symbols.insert(key, symbol);
        Ok(())
    }

    /// Look up a symbol by name and kind, innermost frame first
    pub fn lookup(&self, name: &str, kind: SymbolKind) -> Option<&Symbol> {
        let key = (name.to_string(), kind);
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.symbols.get(&key))
    }

    /// Like [`SymbolTable::lookup`], failing with `UnresolvedSymbol`
    pub fn find(
        &self,
        name: &str,
        kind: SymbolKind,
        location: &Location,
    ) -> Result<&Symbol, CompileError> {
        self.lookup(name, kind)
            .ok_or_else(|| CompileError::UnresolvedSymbol {
                name: name.to_string(),
                kind,
                location: location.clone(),
            })
    }

    pub fn find_func(&self, name: &str, location: &Location) -> Result<Rc<Func>, CompileError> {
        match self.find(name, SymbolKind::Func, location)? {
            Symbol::Func(func) => Ok(Rc::clone(func)),
            other => unreachable!("function key bound to {:?}", other.kind()),
        }
    }

    pub fn find_var(&self, name: &str, location: &Location) -> Result<Rc<Var>, CompileError> {
        match self.find(name, SymbolKind::Var, location)? {
            Symbol::Var(var) => Ok(Rc::clone(var)),
            other => unreachable!("variable key bound to {:?}", other.kind()),
        }
    }

    pub(crate) fn find_type(&self, name: &str) -> Option<TypeHandle> {
        match self.lookup(name, SymbolKind::Type)? {
            Symbol::Type(ty) => Some(Rc::clone(ty)),
            _ => None,
        }
    }
}

/// Frame opened by [`SymbolTable::frame`]; pops it on drop, including on
/// early return through `?`.
#[derive(Debug)]
pub struct FrameGuard<'a> {
    table: &'a mut SymbolTable,
}

impl Deref for FrameGuard<'_> {
    type Target = SymbolTable;

    fn deref(&self) -> &SymbolTable {
        self.table
    }
}

impl DerefMut for FrameGuard<'_> {
    fn deref_mut(&mut self) -> &mut SymbolTable {
        self.table
    }
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.table.pop_frame() {
            tracing::error!("failed to release frame: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Attributes;
    use crate::func::FuncBody;
    use crate::types::TypeKind;

    fn ty(name: &str) -> TypeHandle {
        Rc::new(Type::new(
            name,
            Location::default(),
            TypeKind::Primitive,
            Attributes::default(),
            None,
        ))
    }

    fn func(name: &str, table: &SymbolTable) -> Symbol {
        let void = table.find_type("void").expect("void registered");
        Symbol::Func(Rc::new(Func::new(
            name,
            Location::default(),
            void,
            Vec::new(),
            Vec::new(),
            FuncBody::External,
            Attributes::default(),
            None,
        )))
    }

    fn type_of(symbol: &Symbol) -> TypeHandle {
        match symbol {
            Symbol::Type(ty) => Rc::clone(ty),
            other => panic!("expected type, got {other:?}"),
        }
    }

    #[test]
    fn test_new_table_has_void() {
        let table = SymbolTable::new();
        assert_eq!(table.depth(), 1);
        let void = table.lookup("void", SymbolKind::Type).expect("void");
        assert!(type_of(void).is_void());
    }

    #[test]
    fn test_cannot_pop_global() {
        let mut table = SymbolTable::new();
        assert!(matches!(
            table.pop_frame(),
            Err(CompileError::ScopeDiscipline { depth: 1 })
        ));
        assert_eq!(table.depth(), 1);
    }

    #[test]
    fn test_symbol_gone_after_pop() {
        let mut table = SymbolTable::new();
        table.push_frame();
        table
            .new_symbol(Symbol::Type(ty("Local")))
            .expect("should succeed");
        assert!(table.lookup("Local", SymbolKind::Type).is_some());

        table.pop_frame().expect("frame open");
        assert!(table.lookup("Local", SymbolKind::Type).is_none());
    }

    #[test]
    fn test_pop_keeps_outer_symbols() {
        let mut table = SymbolTable::new();
        table
            .new_symbol(Symbol::Type(ty("Outer")))
            .expect("should succeed");
        table.push_frame();
        table.push_frame();
        table.pop_frame().expect("frame open");
        table.pop_frame().expect("frame open");
        assert!(table.lookup("Outer", SymbolKind::Type).is_some());
    }

    #[test]
    fn test_shadowing() {
        let mut table = SymbolTable::new();
        let outer = ty("Foo");
        let inner = ty("Foo");
        table
            .new_symbol(Symbol::Type(Rc::clone(&outer)))
            .expect("should succeed");

        table.push_frame();
        table
            .new_symbol(Symbol::Type(Rc::clone(&inner)))
            .expect("shadowing across frames is allowed");
        let found = type_of(table.lookup("Foo", SymbolKind::Type).expect("found"));
        assert!(Rc::ptr_eq(&found, &inner));

        table.pop_frame().expect("frame open");
        let found = type_of(table.lookup("Foo", SymbolKind::Type).expect("found"));
        assert!(Rc::ptr_eq(&found, &outer));
    }

    #[test]
    fn test_duplicate_in_same_frame() {
        let mut table = SymbolTable::new();
        let first = func("compute", &table);
        let second = func("compute", &table);
        table.new_symbol(first).expect("first should succeed");

        let result = table.new_symbol(second);
        assert!(matches!(
            result,
            Err(CompileError::DuplicateSymbol {
                kind: SymbolKind::Func,
                ..
            })
        ));
    }

    #[test]
    fn test_duplicate_in_different_frames() {
        let mut table = SymbolTable::new();
        let first = func("compute", &table);
        let second = func("compute", &table);
        table.new_symbol(first).expect("first should succeed");
        table.push_frame();
        assert!(table.new_symbol(second).is_ok());
    }

    #[test]
    fn test_kinds_do_not_collide() {
        let mut table = SymbolTable::new();
        let f = func("State", &table);
        table
            .new_symbol(Symbol::Type(ty("State")))
            .expect("should succeed");
        table.new_symbol(f).expect("different kind, same name");
        assert!(table.lookup("State", SymbolKind::Var).is_none());
    }

    #[test]
    fn test_find_unresolved() {
        let table = SymbolTable::new();
        let location = Location::new("MI.sm", 3, 1);
        let err = table
            .find("missing", SymbolKind::Var, &location)
            .expect_err("should fail");
        assert_eq!(
            err,
            CompileError::UnresolvedSymbol {
                name: "missing".to_string(),
                kind: SymbolKind::Var,
                location,
            }
        );
    }

    #[test]
    fn test_outer_frames_visible() {
        let mut table = SymbolTable::new();
        table
            .new_symbol(Symbol::Type(ty("Outer")))
            .expect("should succeed");
        table.push_frame();
        assert!(table.lookup("Outer", SymbolKind::Type).is_some());
        assert!(table.lookup("Outer", SymbolKind::Var).is_none());
        table.pop_frame().expect("inner frame");
    }

    #[test]
    fn test_guard_pops_on_drop() {
        let mut table = SymbolTable::new();
        {
            let mut frame = table.frame();
            frame
                .new_symbol(Symbol::Type(ty("Scoped")))
                .expect("should succeed");
            assert_eq!(frame.depth(), 2);
        }
        assert_eq!(table.depth(), 1);
        assert!(table.lookup("Scoped", SymbolKind::Type).is_none());
    }

    #[test]
    fn test_guard_pops_on_error_path() {
        fn fails(table: &mut SymbolTable) -> Result<(), CompileError> {
            let frame = table.frame();
            frame.find("nope", SymbolKind::Type, &Location::default())?;
            Ok(())
        }

        let mut table = SymbolTable::new();
        assert!(fails(&mut table).is_err());
        assert_eq!(table.depth(), 1);
    }
}
