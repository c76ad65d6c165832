//! smallsh CLI entry point.
//!
//! Usage:
//!   smallsh                    # Interactive REPL
//!   smallsh -c <line>          # Execute one line and exit
//!   smallsh script             # Run a file line by line

use std::env;
use std::fs::File;
use std::io::BufReader;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use smallsh_kernel::{Kernel, KernelConfig};
use smallsh_repl::{BufReadSource, Repl};

fn main() -> ExitCode {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let args: Vec<String> = env::args().collect();

    // Parse arguments
    match args.get(1).map(|s| s.as_str()) {
        None => {
            // No args: interactive REPL
            smallsh_repl::run()?;
            Ok(ExitCode::SUCCESS)
        }

        Some("--help" | "-h") => {
            print_help();
            Ok(ExitCode::SUCCESS)
        }

        Some("--version" | "-V") => {
            println!("smallsh {}", env!("CARGO_PKG_VERSION"));
            Ok(ExitCode::SUCCESS)
        }

        Some("-c") => {
            let line = args.get(2).context("-c requires a command argument")?;
            run_command(line)
        }

        Some(path) if !path.starts_with('-') => run_script(path),

        Some(unknown) => {
            eprintln!("Unknown option: {unknown}");
            eprintln!("Run 'smallsh --help' for usage.");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_help() {
    println!(
        r#"smallsh v{}

Usage:
  smallsh                      Interactive shell
  smallsh -c <line>            Execute one line and exit
  smallsh <script>             Run each line of a file

Options:
  -c <line>                    Execute a command line and exit
  -h, --help                   Show this help
  -V, --version                Show version

Built-ins:
{}
Syntax:
  cmd args ; cmd args          Run sequentially
  cmd args &                   Run in the background

Environment:
  RUST_LOG=smallsh_kernel=debug  Trace process control on stderr
"#,
        env!("CARGO_PKG_VERSION"),
        builtin_help(),
    );
}

/// One line per built-in, from the tool schemas.
fn builtin_help() -> String {
    let kernel = Kernel::new(KernelConfig::named("help"));
    kernel
        .tool_schemas()
        .iter()
        .map(|schema| format!("  {:<29}{}\n", schema.usage(), schema.description))
        .collect()
}

/// Exit code for a command status, clamped to what a process can return.
fn exit_code(code: i64) -> ExitCode {
    ExitCode::from(code.clamp(0, 255) as u8)
}

/// Execute one line and exit with its status.
fn run_command(line: &str) -> Result<ExitCode> {
    let mut repl = Repl::with_config(KernelConfig::default())?;
    repl.install_signal_relay()?;

    let code = repl.run_line(line);
    for notice in repl.poll() {
        print!("{notice}");
    }
    Ok(exit_code(code))
}

/// Run a file line by line, without prompts.
fn run_script(path: &str) -> Result<ExitCode> {
    let file = File::open(path).with_context(|| format!("Failed to read script: {path}"))?;

    let mut repl = Repl::with_config(KernelConfig::named("script"))?;
    repl.install_signal_relay()?;

    let mut source = BufReadSource::new(BufReader::new(file), false);
    let code = repl.run_loop(&mut source)?;
    Ok(exit_code(code))
}
