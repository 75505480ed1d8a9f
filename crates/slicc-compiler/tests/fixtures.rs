//! Integration tests for the declaration compiler using fixture trees.
//!
//! This module tests that:
//! - Valid fixtures compile without diagnostics
//! - The units emitted for a valid fixture are exactly the ones the dry run
//!   promised
//! - Invalid fixtures produce expected errors with specific codes and messages
//!
//! Expected errors for `name.json` live next to it in `name.expected`, one
//! per line:
//! ```text
//! @error E0102 "undefined type `MachineID`"
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use slicc_compiler::diagnostics::Severity;
use slicc_compiler::{emit, CompileOutput, CompilerConfig, Decl, Diagnostic, Session, SymbolKind};

/// Get the fixtures directory path.
fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("parent")
        .parent()
        .expect("parent")
        .join("tests/fixtures")
}

fn load_decls(path: &Path) -> Vec<Decl> {
    slicc_ast::from_file(path)
        .expect("Failed to load fixture")
        .into_iter()
        .map(Decl::from)
        .collect()
}

fn open_session() -> Session {
    let config = CompilerConfig::prelude().expect("prelude should parse");
    Session::new(&config).expect("prelude types are distinct")
}

fn compile_file(path: &Path) -> CompileOutput {
    open_session()
        .compile(load_decls(path))
        .expect("no fatal errors")
}

/// Expected diagnostic parsed from an `.expected` file.
#[derive(Debug, Clone)]
struct ExpectedDiagnostic {
    severity: Severity,
    code: String,
    message_substring: String,
}

fn parse_expected_diagnostics(content: &str) -> Vec<ExpectedDiagnostic> {
    let mut expected = Vec::new();

    for line in content.lines() {
        let Some(annotation) = line.trim().strip_prefix('@') else {
            continue;
        };
        let parts: Vec<&str> = annotation.splitn(3, ' ').collect();
        if parts.len() < 3 {
            continue;
        }
        let severity = match parts[0] {
            "error" => Severity::Error,
            "warning" => Severity::Warning,
            _ => continue,
        };
        if let Some(msg) = parts[2].strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
            expected.push(ExpectedDiagnostic {
                severity,
                code: parts[1].to_string(),
                message_substring: msg.to_string(),
            });
        }
    }

    expected
}

fn matches(d: &Diagnostic, e: &ExpectedDiagnostic) -> bool {
    d.severity == e.severity
        && d.code.as_deref() == Some(e.code.as_str())
        && d.message.contains(&e.message_substring)
}

fn assert_diagnostics_match(actual: &[Diagnostic], expected: &[ExpectedDiagnostic], file_name: &str) {
    let missing: Vec<_> = expected
        .iter()
        .filter(|e| !actual.iter().any(|d| matches(d, e)))
        .collect();
    let unexpected: Vec<_> = actual
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .filter(|d| !expected.iter().any(|e| matches(d, e)))
        .collect();

    if missing.is_empty() && unexpected.is_empty() {
        return;
    }

    let actual_str = actual
        .iter()
        .map(|d| {
            format!(
                "  {} {} at {}: {}",
                d.severity.as_str(),
                d.code.as_deref().unwrap_or("?"),
                d.location,
                d.message
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    panic!(
        "\n{file_name}\n\nExpected diagnostics not found: {missing:#?}\n\nUnexpected errors: {}\n\nActual diagnostics:\n{actual_str}",
        unexpected.len()
    );
}

// =============================================================================
// Valid Fixture Tests
// =============================================================================

#[test]
fn test_valid_fixtures_compile_cleanly() {
    let valid_dir = fixtures_dir().join("valid");
    let mut seen = 0;

    for entry in fs::read_dir(&valid_dir).expect("Failed to read valid fixtures directory") {
        let path = entry.expect("dir entry").path();
        if path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        let output = compile_file(&path);
        assert_diagnostics_match(&output.diagnostics, &[], &path.display().to_string());
        seen += 1;
    }

    assert!(seen > 0, "no valid fixtures found");
}

#[test]
fn test_emitted_units_match_dry_run() {
    let path = fixtures_dir().join("valid/l1cache.json");
    let decls = load_decls(&path);
    let promised = Session::output_files(&decls);

    let output = open_session().compile(decls).expect("no fatal errors");
    let emitted: BTreeSet<String> = emit(&output).into_iter().map(|u| u.name).collect();

    assert_eq!(emitted, promised);
    let expected: BTreeSet<String> = [
        "CacheEntry.hh",
        "L1Cache_Controller.hh",
        "L1Cache_TBE.hh",
        "L1Cache_isReady.cc",
        "State.cc",
        "State.hh",
        "compute.cc",
    ]
    .into_iter()
    .map(String::from)
    .collect();
    assert_eq!(emitted, expected);
}

#[test]
fn test_machine_binding() {
    let path = fixtures_dir().join("valid/l1cache.json");
    let mut session = open_session();
    let output = session.compile(load_decls(&path)).expect("no fatal errors");

    let names: Vec<_> = output.functions.iter().map(|f| f.ident.as_str()).collect();
    assert_eq!(names, vec!["compute", "curCycle"]);
    assert!(output.functions.iter().all(|f| f.machine.is_none()));

    let machine = session.machines().get("L1Cache").expect("registered");
    let is_ready = machine.find_func("isReady").expect("bound to machine");
    assert_eq!(is_ready.machine.as_deref(), Some("L1Cache"));
    assert_eq!(is_ready.param_names, vec!["state", "pending"]);
    assert!(session.symbols().lookup("isReady", SymbolKind::Func).is_none());
    assert!(session.symbols().lookup("compute", SymbolKind::Func).is_some());
    assert!(session.symbols().lookup("TBE", SymbolKind::Type).is_none());
}

#[test]
fn test_generated_function_body() {
    let path = fixtures_dir().join("valid/l1cache.json");
    let output = compile_file(&path);
    let unit = emit(&output)
        .into_iter()
        .find(|u| u.name == "L1Cache_isReady.cc")
        .expect("isReady is emitted");

    assert!(unit.contents.contains("#include \"L1Cache_Controller.hh\""));
    assert!(unit
        .contents
        .contains("bool\nL1Cache_Controller::isReady(State state, int pending)\n{\n"));
    assert!(unit.contents.contains("    int total = compute(pending, 1);\n"));
    assert!(unit.contents.contains("    return (total > 0);\n"));
}

#[test]
fn test_external_function_has_no_unit() {
    let path = fixtures_dir().join("valid/l1cache.json");
    let output = compile_file(&path);
    let cur_cycle = output
        .functions
        .iter()
        .find(|f| f.ident == "curCycle")
        .expect("compiled");
    assert!(cur_cycle.is_external());
    assert!(cur_cycle.output_file().is_none());
}

// =============================================================================
// Invalid Fixture Tests
// =============================================================================

#[test]
fn test_invalid_fixtures_report_expected_errors() {
    let invalid_dir = fixtures_dir().join("invalid");
    let mut seen = 0;

    for entry in fs::read_dir(&invalid_dir).expect("Failed to read invalid fixtures directory") {
        let path = entry.expect("dir entry").path();
        if path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        let expected_path = path.with_extension("expected");
        let content = fs::read_to_string(&expected_path).expect("Failed to read expectations");
        let expected = parse_expected_diagnostics(&content);
        assert!(!expected.is_empty(), "{} declares no errors", expected_path.display());

        let output = compile_file(&path);
        assert!(output.has_errors());
        assert_diagnostics_match(&output.diagnostics, &expected, &path.display().to_string());
        seen += 1;
    }

    assert!(seen > 0, "no invalid fixtures found");
}

#[test]
fn test_failed_declarations_are_not_registered() {
    let path = fixtures_dir().join("invalid/undefined_type.json");
    let mut session = open_session();
    let output = session.compile(load_decls(&path)).expect("no fatal errors");

    assert_eq!(output.diagnostics.len(), 2);
    let symbols = session.symbols();
    assert!(symbols.lookup("mapAddressToMachine", SymbolKind::Func).is_none());
    assert!(symbols.lookup("latency", SymbolKind::Func).is_none());
    assert!(symbols.lookup("curCycle", SymbolKind::Func).is_some());
    assert!(symbols.lookup("start", SymbolKind::Var).is_none());
    assert_eq!(symbols.depth(), 1);
}

#[test]
fn test_diagnostics_carry_locations() {
    let path = fixtures_dir().join("invalid/undefined_type.json");
    let output = compile_file(&path);
    let d = &output.diagnostics[0];
    assert_eq!(d.location.file, "Directory.sm");
    assert_eq!(d.location.line, 4);
}

#[test]
fn test_colliding_declarations_emit_unique_units() {
    let path = fixtures_dir().join("invalid/output_collision.json");
    let output = compile_file(&path);

    let names: Vec<String> = emit(&output).into_iter().map(|u| u.name).collect();
    let unique: BTreeSet<&String> = names.iter().collect();
    assert_eq!(unique.len(), names.len(), "duplicate units in {names:?}");
    assert!(names.contains(&"L1Cache_isReady.cc".to_string()));

    let lines: Vec<u32> = output.diagnostics.iter().map(|d| d.location.line).collect();
    assert_eq!(lines, vec![4, 14]);
}
