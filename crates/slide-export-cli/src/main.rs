//! Slide Export CLI - batch export tool for tiled microscopy images.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{Cli, Commands, ExitCode};

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let exit_code = match cli.command {
        Commands::Export(ref args) => match commands::export::run(args) {
            Ok(result) => result.exit_code,
            Err(e) => {
                eprintln!("error: {e:#}");
                ExitCode::Error
            }
        },
        Commands::Scan(ref args) => match commands::scan::run(args) {
            Ok(()) => ExitCode::Success,
            Err(e) => {
                eprintln!("error: {e:#}");
                ExitCode::Error
            }
        },
    };

    exit_code.into()
}
