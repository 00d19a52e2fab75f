// SPDX-FileCopyrightText: 2026 Belay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Belay - inbound email moderation with Discord human approval.
//!
//! This is the binary entry point for the Belay service.

use clap::{Parser, Subcommand};

mod serve;

/// Belay - inbound email moderation with Discord human approval.
#[derive(Parser, Debug)]
#[command(name = "belay", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Belay moderation server.
    Serve,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup
    let config = match belay_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            belay_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        None => {
            println!("belay: use --help for available commands");
        }
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn binary_loads_config_defaults() {
        // Verify config loads with defaults (no config file needed)
        let config = belay_config::load_and_validate().expect("default config should be valid");
        assert_eq!(config.service.name, "belay-moderation");
    }
}
