use serde::Deserialize;

/// Builtin types every session starts with, loaded from TOML
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompilerConfig {
    #[serde(default)]
    pub types: Vec<BuiltinType>,
}

/// A primitive type supplied by the surrounding simulator
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BuiltinType {
    pub ident: String,
    /// Spelling in generated code, when it differs from `ident`
    #[serde(default)]
    pub c_ident: Option<String>,
}

// Embedded at compile time so the compiler works without a config file
const PRELUDE_TOML: &str = include_str!("../../../definitions/prelude.toml");

impl CompilerConfig {
    /// Load a configuration from a TOML file
    pub fn load_from_file(path: &std::path::Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: CompilerConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load a configuration from a TOML string
    pub fn load_from_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// The default builtin types
    pub fn prelude() -> Result<Self, toml::de::Error> {
        Self::load_from_str(PRELUDE_TOML)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude() {
        let config = CompilerConfig::prelude().expect("prelude should parse");
        let names: Vec<_> = config.types.iter().map(|ty| ty.ident.as_str()).collect();
        assert_eq!(names, vec!["int", "bool", "string", "Addr", "Cycles"]);

        let string = config
            .types
            .iter()
            .find(|ty| ty.ident == "string")
            .expect("string is in the prelude");
        assert_eq!(string.c_ident.as_deref(), Some("std::string"));
    }

    #[test]
    fn test_load_from_str_empty() {
        let config = CompilerConfig::load_from_str("").expect("should parse empty");
        assert!(config.types.is_empty());
    }

    #[test]
    fn test_load_from_str_minimal() {
        let toml = r#"
            [[types]]
            ident = "MachineID"
            c_ident = "MachineID"
        "#;
        let config = CompilerConfig::load_from_str(toml).expect("should parse");
        assert_eq!(
            config.types,
            vec![BuiltinType {
                ident: "MachineID".to_string(),
                c_ident: Some("MachineID".to_string()),
            }]
        );
    }

    #[test]
    fn test_missing_ident_rejected() {
        assert!(CompilerConfig::load_from_str("[[types]]\nc_ident = \"int\"").is_err());
    }

    #[test]
    fn test_load_from_missing_file() {
        assert!(CompilerConfig::load_from_file(std::path::Path::new("/nonexistent/prelude.toml")).is_err());
    }
}
