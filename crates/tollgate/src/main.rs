// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tollgate - transparent API cost tracking proxy.
//!
//! This is the binary entry point for the Tollgate proxy.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use tollgate_config::{ConfigError, TollgateConfig};

mod serve;

/// Tollgate - transparent API cost tracking proxy.
#[derive(Parser, Debug)]
#[command(name = "tollgate", version, about, long_about = None)]
struct Cli {
    /// Path to a config file (bypasses the XDG hierarchy).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Tollgate proxy server.
    Serve,
    /// Validate and print the effective configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup; config errors are
    // fatal and rendered in full.
    let config = match load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            tollgate_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Config) => match toml::to_string_pretty(&config) {
            Ok(rendered) => println!("{rendered}"),
            Err(e) => {
                eprintln!("error: failed to render config: {e}");
                std::process::exit(1);
            }
        },
        Some(Commands::Serve) | None => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
    }
}

/// Load config from an explicit path or the XDG hierarchy, validated
/// either way.
fn load(path: Option<&Path>) -> Result<TollgateConfig, Vec<ConfigError>> {
    match path {
        Some(path) => match tollgate_config::load_config_from_path(path) {
            Ok(config) => {
                tollgate_config::validation::validate_config(&config)?;
                Ok(config)
            }
            Err(err) => {
                let sources = std::fs::read_to_string(path)
                    .map(|content| vec![(path.display().to_string(), content)])
                    .unwrap_or_default();
                Err(tollgate_config::diagnostic::figment_to_config_errors(
                    err, &sources,
                ))
            }
        },
        None => tollgate_config::load_and_validate(),
    }
}
