use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use slicc_compiler::diagnostics::Severity;
use slicc_compiler::{emit, CompileOutput, CompilerConfig, Decl, Session};

#[derive(Parser, Debug)]
#[command(author, version, about = "SLICC declaration compiler")]
struct Args {
    /// Parsed declaration tree (JSON)
    input: PathBuf,

    /// Builtin type definitions (TOML); the embedded prelude is used otherwise
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory generated files are written to
    #[arg(short, long, default_value = "generated")]
    out_dir: PathBuf,

    /// List the files that would be generated without compiling
    #[arg(long)]
    dry_run: bool,
}

fn load_config(path: Option<&Path>) -> Result<CompilerConfig, String> {
    match path {
        Some(path) => CompilerConfig::load_from_file(path)
            .map_err(|e| format!("Error loading config '{}': {e}", path.display())),
        None => CompilerConfig::prelude().map_err(|e| format!("Error loading prelude: {e}")),
    }
}

/// Print diagnostics; returns true if any of them is an error
fn report(output: &CompileOutput) -> bool {
    let mut has_errors = false;
    for d in &output.diagnostics {
        if d.severity == Severity::Error {
            has_errors = true;
        }
        let code = d.code.as_deref().unwrap_or("?");
        println!(
            "{}: {} [{}]: {}",
            d.location,
            d.severity.as_str(),
            code,
            d.message
        );
    }
    has_errors
}

fn write_units(output: &CompileOutput, out_dir: &Path) -> Result<usize, std::io::Error> {
    fs::create_dir_all(out_dir)?;
    let units = emit(output);
    for unit in &units {
        fs::write(out_dir.join(&unit.name), &unit.contents)?;
        tracing::debug!(file = %unit.name, "wrote output unit");
    }
    Ok(units.len())
}

fn run(args: &Args) -> ExitCode {
    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let decls: Vec<Decl> = match slicc_ast::from_file(&args.input) {
        Ok(decls) => {
            tracing::info!(
                input = %args.input.display(),
                decls = slicc_ast::count_decls(&decls),
                "loaded declaration tree"
            );
            decls.into_iter().map(Decl::from).collect()
        }
        Err(e) => {
            eprintln!("Error reading '{}': {e}", args.input.display());
            return ExitCode::FAILURE;
        }
    };

    if args.dry_run {
        for file in Session::output_files(&decls) {
            println!("{file}");
        }
        return ExitCode::SUCCESS;
    }

    let mut session = match Session::new(&config) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error registering builtin types: {e}");
            return ExitCode::FAILURE;
        }
    };

    let output = match session.compile(decls) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("Internal compiler error [{}]: {e}", e.code());
            return ExitCode::FAILURE;
        }
    };

    if report(&output) {
        return ExitCode::FAILURE;
    }

    match write_units(&output, &args.out_dir) {
        Ok(count) => {
            tracing::info!(count, dir = %args.out_dir.display(), "generated files");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error writing to '{}': {e}", args.out_dir.display());
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    run(&args)
}
