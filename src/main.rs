mod cli;
mod init;
mod kb;
mod pack;
mod settings;
mod stats;
mod tree;

use clap::Parser;
use cli::{Cli, Commands};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    // stderr follows RUST_LOG when set, else WARN (DEBUG under -v)
    let stderr_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    let file_level = if verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(Arc::new(file))
                .with_filter(file_level);
            Some(layer)
        }
        None => None,
    };

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_filter(stderr_filter))
        .with(file_layer)
        .try_init();
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.log_file.as_deref()) {
        eprintln!("Error: cannot open log file: {}", e);
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Pack(args) => pack::run(args),
        Commands::Tree(args) => tree::run(args),
        Commands::Stats(args) => stats::run(args),
        Commands::Kb(args) => kb::run(args),
        Commands::Init(args) => init::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
