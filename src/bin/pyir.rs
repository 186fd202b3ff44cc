//! pyir - Lower a Python project to its shape-analysis IR
//!
//! Collects the bundled stub library and the project around the entry script,
//! lowers every module, and optionally dumps the IR.
//!
//! Exit codes: 0 clean, 1 some files were skipped, 2 fatal error,
//! 3 configuration error.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use frontend::{AnalyzerOptions, Frontend, FrontendError, LogLevel};

#[derive(Parser)]
#[command(name = "pyir")]
#[command(about = "Lower a Python project to its shape-analysis IR")]
#[command(version)]
struct Args {
    /// Entry Python script of the project
    entry: Option<PathBuf>,

    /// Root of the bundled stdlib/Torch stub library
    #[arg(short, long)]
    lib_path: Option<PathBuf>,

    /// JSON config file; CLI flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Virtual-environment directory to skip while collecting
    #[arg(long)]
    venv: Option<PathBuf>,

    /// Log verbosity (none, result-only, reduced, full)
    #[arg(long)]
    log_level: Option<LogLevel>,

    /// Print the lowered IR of every module
    #[arg(long)]
    extract_ir: bool,

    /// Keep assert statements instead of lowering them to pass
    #[arg(long)]
    keep_assert: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let options = match build_options(&args) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(3);
        }
    };

    env_logger::Builder::new()
        .filter_level(options.log_level.to_filter())
        .init();

    let frontend = Frontend::new(options);
    let output = match frontend.run() {
        Ok(output) => output,
        Err(err @ FrontendError::Config(_)) => {
            eprintln!("{err}");
            return ExitCode::from(3);
        }
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    };

    if frontend.options().extract_ir {
        for (qual, stmt) in output.library.iter().chain(output.project.iter()) {
            println!("# module {qual}");
            print!("{stmt}");
        }
    }
    println!(
        "entry {} ({} library, {} project modules)",
        output.entry,
        output.library.len(),
        output.project.len()
    );

    if output.errors.is_empty() {
        ExitCode::SUCCESS
    } else {
        for (path, err) in &output.errors {
            log::error!("skipped {}: {err}", path.display());
        }
        ExitCode::from(1)
    }
}

fn build_options(args: &Args) -> Result<AnalyzerOptions, FrontendError> {
    let mut options = match &args.config {
        Some(path) => AnalyzerOptions::from_json_file(path)?,
        None => AnalyzerOptions::with_defaults(),
    };

    if let Some(entry) = &args.entry {
        options.entry_path = Some(entry.clone());
    }
    if let Some(lib) = &args.lib_path {
        options.lib_path = Some(lib.clone());
    }
    if let Some(venv) = &args.venv {
        options.venv_path = Some(venv.clone());
    }
    if let Some(level) = args.log_level {
        options.log_level = level;
    }
    if args.extract_ir {
        options.extract_ir = true;
    }
    if args.keep_assert {
        options.ignore_assert = false;
    }
    options.validate()?;
    Ok(options)
}
