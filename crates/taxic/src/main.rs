//! The Taxi compiler CLI.
//!
//! - `taxic build <path>` - Compile a file, a directory of sources or a
//!   project with a `taxi.toml`
//! - `taxic check <files...>` - Compile the given files together and report
//!
//! Options:
//! - `--json` - Output diagnostics as JSON (one object per line)
//! - `--no-color` - Disable colorized output
//! - `--emit <file>` - Write the compiled document summary as JSON
//! - `-v` - More logging (`RUST_LOG` takes precedence)

mod discovery;
mod manifest;

use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use taxi_compiler::diagnostics::{render_all, DiagnosticOptions};
use taxi_compiler::{Compiler, Severity};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "taxic", version, about = "The Taxi compiler")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a file, a directory or a project
    Build {
        /// A .taxi file, a directory of sources, or a directory with taxi.toml
        path: PathBuf,

        /// Output diagnostics as JSON (one object per line) instead of human-readable format
        #[arg(long)]
        json: bool,

        /// Disable colorized output
        #[arg(long = "no-color")]
        no_color: bool,

        /// Write the compiled document summary as JSON to this file
        #[arg(long)]
        emit: Option<PathBuf>,
    },
    /// Compile the given files together and report diagnostics
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[arg(long)]
        json: bool,

        #[arg(long = "no-color")]
        no_color: bool,
    },
}

fn init_tracing(verbose: u8) {
    let directive = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive)))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let (result, json) = match cli.command {
        Commands::Build {
            path,
            json,
            no_color,
            emit,
        } => {
            let opts = DiagnosticOptions {
                color: !no_color && !json,
                json,
            };
            (build(&path, emit.as_deref(), &opts), json)
        }
        Commands::Check { files, json, no_color } => {
            let opts = DiagnosticOptions {
                color: !no_color && !json,
                json,
            };
            (compile_files(&files, false, None, &opts), json)
        }
    };

    if let Err(e) = result {
        if json {
            let msg = serde_json::json!({
                "code": "C0001",
                "severity": "error",
                "message": e,
            });
            eprintln!("{}", msg);
        } else {
            eprintln!("error: {}", e);
        }
        process::exit(1);
    }
}

fn build(path: &Path, emit: Option<&Path>, opts: &DiagnosticOptions) -> Result<(), String> {
    let inputs = discovery::resolve_inputs(path).map_err(|e| e.to_string())?;
    debug!(files = inputs.files.len(), "resolved build inputs");
    compile_files(&inputs.files, inputs.warnings_as_errors, emit, opts)
}

/// Compile `files` as one set, print their diagnostics and optionally write
/// the document summary.
fn compile_files(
    files: &[PathBuf],
    warnings_as_errors: bool,
    emit: Option<&Path>,
    opts: &DiagnosticOptions,
) -> Result<(), String> {
    let mut sources = Vec::with_capacity(files.len());
    for file in files {
        let text = std::fs::read_to_string(file)
            .map_err(|e| format!("Failed to read '{}': {}", file.display(), e))?;
        sources.push((file.display().to_string(), text));
    }

    let mut compiler = Compiler::new();
    for (name, text) in &sources {
        compiler.add_source(name.as_str(), text.as_str());
    }
    let (diagnostics, document) = compiler.compile_with_messages();

    let rendered = render_all(
        &diagnostics,
        |name| {
            sources
                .iter()
                .find(|(source, _)| source == name)
                .map(|(_, text)| text.as_str())
        },
        opts,
    );
    for rendered in rendered {
        if opts.json {
            eprintln!("{}", rendered);
        } else {
            eprint!("{}", rendered);
            if !rendered.ends_with('\n') {
                eprintln!();
            }
        }
    }

    let failing = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error || (warnings_as_errors && d.severity == Severity::Warning))
        .count();
    if failing > 0 {
        return Err(format!("Compilation failed with {} error(s)", failing));
    }

    if let Some(emit) = emit {
        let summary = serde_json::to_string_pretty(&document.summary())
            .map_err(|e| format!("Failed to serialize document: {}", e))?;
        std::fs::write(emit, summary).map_err(|e| format!("Failed to write '{}': {}", emit.display(), e))?;
        info!(path = %emit.display(), "wrote document summary");
    }

    eprintln!(
        "  Compiled {} type(s) and {} service(s) from {} file(s)",
        document.types().count(),
        document.services().len(),
        files.len()
    );
    Ok(())
}
