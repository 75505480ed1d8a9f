//! Materializes compiled declarations into output units.

use std::collections::BTreeSet;

use slicc_ast::Location;

use crate::codegen::CodeFormatter;
use crate::func::Func;
use crate::machine::StateMachine;
use crate::session::CompileOutput;
use crate::types::{Field, Type, TypeKind};

/// One generated source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputUnit {
    pub name: String,
    pub contents: String,
}

/// Generate every unit owed by `output`, sorted by name
pub fn emit(output: &CompileOutput) -> Vec<OutputUnit> {
    let mut units = Vec::new();

    for func in &output.functions {
        units.extend(function_unit(func, None));
    }
    for ty in &output.types {
        units.extend(type_units(ty));
    }
    for machine in &output.machines {
        let machine: &StateMachine = machine;
        units.push(controller_unit(machine));
        for ty in machine.types() {
            units.extend(type_units(ty));
        }
        for func in machine.functions() {
            units.extend(function_unit(func, Some(machine)));
        }
    }

    units.sort_by(|a, b| a.name.cmp(&b.name));
    tracing::debug!(units = units.len(), "emitted output units");
    units
}

fn include_guard(ident: &str, suffix: &str) -> String {
    format!("__{}_{}__", ident.to_uppercase(), suffix)
}

/// Headers declaring the types a function signature mentions
fn signature_headers(func: &Func) -> BTreeSet<String> {
    std::iter::once(&func.return_type)
        .chain(&func.param_types)
        .filter_map(|ty| ty.header())
        .collect()
}

fn function_unit(func: &Func, machine: Option<&StateMachine>) -> Option<OutputUnit> {
    let name = func.output_file()?;
    let definition = func.definition()?;

    let mut out = CodeFormatter::new();
    if func.location != Location::default() {
        out.line(format!("// Generated from {}", func.location));
    }
    if let Some(machine) = machine {
        out.line(format!("#include \"{}.hh\"", machine.controller_ident()));
    }
    for header in signature_headers(func) {
        out.line(format!("#include \"{header}\""));
    }
    if !out.is_empty() {
        out.line("");
    }

    let mut contents = out.finish();
    contents.push_str(&definition);
    Some(OutputUnit { name, contents })
}

fn type_units(ty: &Type) -> Vec<OutputUnit> {
    if ty.is_external() {
        return Vec::new();
    }
    let ident = ty.c_ident();
    let guard = include_guard(ident, "HH");

    let mut out = CodeFormatter::new();
    out.line(format!("#ifndef {guard}"));
    out.line(format!("#define {guard}"));
    out.line("");
    if let Some(desc) = &ty.attributes.desc {
        out.line(format!("// {desc}"));
    }

    let mut units = Vec::new();
    match &ty.kind {
        TypeKind::Enumeration(values) => {
            out.line("#include <string>");
            out.line("");
            out.line(format!("enum class {ident} {{"));
            out.indent();
            for value in values {
                out.line(format!("{value},"));
            }
            out.line("NUM");
            out.dedent();
            out.line("};");
            out.line("");
            out.line(format!("std::string {ident}_to_string(const {ident}& obj);"));
            units.push(enumeration_source(ident, values));
        }
        TypeKind::Structure(_) | TypeKind::Primitive | TypeKind::Void => {
            let headers: BTreeSet<&str> = ty
                .fields()
                .iter()
                .filter_map(Field::header)
                .filter(|header| *header != format!("{ident}.hh"))
                .collect();
            if !headers.is_empty() {
                for header in headers {
                    out.line(format!("#include \"{header}\""));
                }
                out.line("");
            }
            out.line(format!("struct {ident}"));
            out.line("{");
            out.indent();
            for field in ty.fields() {
                out.line(format!("{} m_{};", field.c_type(), field.ident));
            }
            out.dedent();
            out.line("};");
        }
    }
    out.line("");
    out.line(format!("#endif // {guard}"));

    units.push(OutputUnit {
        name: format!("{ident}.hh"),
        contents: out.finish(),
    });
    units
}

fn enumeration_source(ident: &str, values: &[String]) -> OutputUnit {
    let mut out = CodeFormatter::new();
    out.line(format!("#include \"{ident}.hh\""));
    out.line("");
    out.line("std::string");
    out.line(format!("{ident}_to_string(const {ident}& obj)"));
    out.line("{");
    out.indent();
    out.line("switch (obj) {");
    for value in values {
        out.line(format!("case {ident}::{value}:"));
        out.indent();
        out.line(format!("return \"{value}\";"));
        out.dedent();
    }
    out.line("default:");
    out.indent();
    out.line("return \"<invalid>\";");
    out.dedent();
    out.line("}");
    out.dedent();
    out.line("}");

    OutputUnit {
        name: format!("{ident}.cc"),
        contents: out.finish(),
    }
}

fn controller_unit(machine: &StateMachine) -> OutputUnit {
    let class = machine.controller_ident();
    let guard = include_guard(&class, "HH");

    let mut out = CodeFormatter::new();
    out.line(format!("#ifndef {guard}"));
    out.line(format!("#define {guard}"));
    out.line("");
    let headers: BTreeSet<String> = machine
        .types()
        .iter()
        .filter_map(|ty| ty.header())
        .chain(machine.functions().iter().flat_map(|func| signature_headers(func)))
        .collect();
    for header in headers {
        out.line(format!("#include \"{header}\""));
    }
    out.line("");
    if let Some(desc) = &machine.attributes.desc {
        out.line(format!("// {desc}"));
    }
    out.line(format!("class {class}"));
    out.line("{");
    out.line("  public:");
    out.indent();
    for func in machine.functions() {
        out.line(func.prototype());
    }
    out.dedent();
    out.line("};");
    out.line("");
    out.line(format!("#endif // {guard}"));

    OutputUnit {
        name: format!("{class}.hh"),
        contents: out.finish(),
    }
}
