//! Declaration attributes.
//!
//! Declarations carry free-form `key = "value"` pairs. The keys the compiler
//! acts on are pulled out into typed fields when the declaration is built;
//! everything else is kept verbatim for later code generation stages.

use std::collections::BTreeMap;

use slicc_ast::Pairs;

const EXTERNAL: &str = "external";
const RETURN_BY_REF: &str = "return_by_ref";
const RETURN_BY_POINTER: &str = "return_by_pointer";
const DESC: &str = "desc";

/// How a function hands back its return value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReturnMode {
    #[default]
    Value,
    Ref,
    Pointer,
}

/// Attributes resolved from a declaration's pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    /// Implementation is supplied outside the protocol source
    pub external: bool,
    pub return_mode: ReturnMode,
    /// Human-readable description
    pub desc: Option<String>,
    /// Pairs the compiler does not interpret
    pub other: BTreeMap<String, String>,
}

impl Attributes {
    pub fn from_pairs(pairs: &Pairs) -> Self {
        let mut attributes = Attributes::default();

        for (key, value) in pairs {
            match key.as_str() {
                EXTERNAL => attributes.external = true,
                RETURN_BY_REF => attributes.return_mode = ReturnMode::Ref,
                RETURN_BY_POINTER => attributes.return_mode = ReturnMode::Pointer,
                DESC => attributes.desc = Some(value.clone()),
                _ => {
                    attributes.other.insert(key.clone(), value.clone());
                }
            }
        }

        attributes
    }

    pub fn mark_external(&mut self) {
        self.external = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(entries: &[(&str, &str)]) -> Pairs {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_recognized_keys() {
        let attrs = Attributes::from_pairs(&pairs(&[
            ("external", "yes"),
            ("return_by_ref", "yes"),
            ("desc", "current cycle"),
        ]));
        assert!(attrs.external);
        assert_eq!(attrs.return_mode, ReturnMode::Ref);
        assert_eq!(attrs.desc.as_deref(), Some("current cycle"));
        assert!(attrs.other.is_empty());
    }

    #[test]
    fn test_external_presence_is_enough() {
        let attrs = Attributes::from_pairs(&pairs(&[("external", "")]));
        assert!(attrs.external);
    }

    #[test]
    fn test_unknown_keys_kept() {
        let attrs = Attributes::from_pairs(&pairs(&[("abstract", "yes")]));
        assert!(!attrs.external);
        assert_eq!(attrs.other.get("abstract").map(String::as_str), Some("yes"));
    }

    #[test]
    fn test_mark_external_idempotent() {
        let mut attrs = Attributes::default();
        attrs.mark_external();
        attrs.mark_external();
        assert!(attrs.external);
        assert!(attrs.other.is_empty());
    }

    #[test]
    fn test_return_by_pointer() {
        let attrs = Attributes::from_pairs(&pairs(&[("return_by_pointer", "yes"), ("x", "1")]));
        assert_eq!(attrs.return_mode, ReturnMode::Pointer);
        assert_eq!(attrs.other.len(), 1);
    }
}
