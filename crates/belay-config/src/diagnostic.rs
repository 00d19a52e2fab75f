// SPDX-FileCopyrightText: 2026 Belay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration error diagnostics rendered through miette.

use miette::Diagnostic;
use thiserror::Error;

/// A configuration error with diagnostic information.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// Figment failed to deserialize the layered configuration.
    #[error("invalid configuration: {message}")]
    #[diagnostic(
        code(belay::config::parse),
        help("check belay.toml and BELAY_* environment variables")
    )]
    Parse {
        /// Figment's rendered error message.
        message: String,
    },

    /// A semantic constraint on a configuration value failed.
    #[error("{message}")]
    #[diagnostic(code(belay::config::validation))]
    Validation {
        /// Description of the failed constraint.
        message: String,
    },
}

/// Render collected configuration errors to stderr.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        let diagnostic: &dyn Diagnostic = error;
        if handler.render_report(&mut buf, diagnostic).is_ok() {
            eprint!("{buf}");
        } else {
            eprintln!("Error: {error}");
        }
    }
}
