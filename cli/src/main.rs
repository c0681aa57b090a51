#![deny(missing_docs)]

//! # OAVK CLI
//!
//! Command Line Interface for the OpenAPI validation kit.
//!
//! Supported Commands:
//! - `compile`: Contract -> schema set document.
//! - `validate`: Checks one payload against one operation field.

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod compile;
mod error;
mod validate;

#[derive(Parser, Debug)]
#[clap(author, version, about = "OpenAPI validation kit CLI")]
struct Cli {
    /// Log filter, e.g. `info` or `oavk_core=debug`.
    #[clap(long, global = true, env = "OAVK_LOG", default_value = "warn")]
    log_level: String,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a contract into per-operation schema bundles.
    Compile(compile::CompileArgs),
    /// Validate a JSON payload against one operation field.
    Validate(validate::ValidateArgs),
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let result = match &cli.command {
        Commands::Compile(args) => compile::execute(args),
        Commands::Validate(args) => validate::execute(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
