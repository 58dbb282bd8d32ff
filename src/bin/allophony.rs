//! allophony - phonetic normalization, nearest-phone remapping and phone
//! error rates
//!
//! Logging is controlled through `RUST_LOG` (e.g. `RUST_LOG=debug`).

use clap::Parser;
use colored::Colorize;
use std::process;

use allophony::cli::commands;
use allophony::cli::{resolve_config, Cli};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = resolve_config(cli.config.as_deref(), cli.data_dir, cli.model)
        .and_then(|config| commands::execute(cli.command, &config));

    if let Err(e) = result {
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        process::exit(1);
    }
}
