//! Parsed declaration trees for SLICC protocol specifications.
//!
//! Trees are produced by an external parser and handed to the compiler as
//! JSON. This crate only defines their shape and how to load them.

pub mod ast;

pub use ast::{Decl, Location, Pairs};

/// Load a list of top-level declarations from a JSON document
pub fn from_json(source: &str) -> Result<Vec<Decl>, serde_json::Error> {
    serde_json::from_str(source)
}

/// Load a list of top-level declarations from a JSON file
pub fn from_file(path: &std::path::Path) -> Result<Vec<Decl>, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    Ok(from_json(&content)?)
}

/// Count every declaration in the tree, including those nested in machines
pub fn count_decls(decls: &[Decl]) -> usize {
    decls
        .iter()
        .map(|decl| match decl {
            Decl::Machine(machine) => 1 + count_decls(&machine.decls),
            _ => 1,
        })
        .sum()
}
