//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Planning grid - sales planning reconciler for the data dashboard.
#[derive(Parser, Debug)]
#[command(name = "planning")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true, env = "PLANNING_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Username to open the session with.
    #[arg(short, long, global = true, env = "PLANNING_USERNAME")]
    pub username: Option<String>,

    /// Password to open the session with.
    #[arg(short, long, global = true, env = "PLANNING_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new planning configuration.
    Init {
        /// Directory to initialize (defaults to current directory).
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Force overwrite existing files.
        #[arg(short, long)]
        force: bool,
    },

    /// Validate the configuration.
    Validate {
        /// Show all warnings, not just errors.
        #[arg(short, long)]
        warnings: bool,
    },

    /// Show the grid column schema built from the calendar.
    Schema,

    /// Show the planning rows.
    Rows {
        /// Only show this week's metrics.
        #[arg(short, long)]
        week: Option<String>,
    },

    /// Edit the sales units of one row and week.
    Edit {
        /// Store id.
        #[arg(long)]
        store: String,

        /// SKU id.
        #[arg(long)]
        sku: String,

        /// Week identifier.
        #[arg(short, long)]
        week: String,

        /// New sales units; repeat to apply successive edits.
        #[arg(long, required = true, num_args = 1)]
        units: Vec<String>,
    },

    /// Classify a GM % value into its color band.
    Classify {
        /// GM % value.
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// List the SKU catalog.
    Skus,

    /// List the store catalog.
    Stores,

    /// Show the weekly GM trend.
    Trend,
}

impl Commands {
    /// Returns true if the command reads dashboard data and needs a session.
    #[must_use]
    pub const fn requires_session(&self) -> bool {
        !matches!(
            self,
            Self::Init { .. } | Self::Validate { .. } | Self::Classify { .. }
        )
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

impl Cli {
    /// Username and password, if both were given.
    ///
    /// Flags take precedence over `PLANNING_USERNAME` and
    /// `PLANNING_PASSWORD`, which are read when the arguments are parsed.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        Some((self.username.as_deref()?, self.password.as_deref()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_edit() {
        let cli = Cli::try_parse_from([
            "planning", "edit", "--store", "S1", "--sku", "SK9", "--week", "W3", "--units", "10",
            "--units", "20",
        ])
        .unwrap();

        let Commands::Edit { store, units, .. } = cli.command else {
            panic!("expected edit");
        };
        assert_eq!(store, "S1");
        assert_eq!(units, ["10", "20"]);
        assert!(Commands::Skus.requires_session());
    }

    #[test]
    fn test_parse_classify_negative() {
        let cli = Cli::try_parse_from(["planning", "--output", "json", "classify", "-3"]).unwrap();
        assert_eq!(cli.output, OutputFormat::Json);
        assert!(!cli.command.requires_session());
        assert!(matches!(cli.command, Commands::Classify { ref value } if value == "-3"));
    }

    #[test]
    fn test_credentials_need_both_values() {
        let cli = Cli::try_parse_from([
            "planning", "--username", "admin", "--password", "secret", "skus",
        ])
        .unwrap();
        assert_eq!(cli.credentials(), Some(("admin", "secret")));

        let cli = Cli::try_parse_from(["planning", "--username", "admin", "skus"]).unwrap();
        if cli.password.is_none() {
            assert_eq!(cli.credentials(), None);
        }
    }

    #[test]
    fn test_local_commands_skip_session() {
        for args in [
            &["planning", "init"][..],
            &["planning", "validate", "--warnings"],
            &["planning", "classify", "12%"],
        ] {
            assert!(!Cli::try_parse_from(args).unwrap().command.requires_session());
        }
        for args in [&["planning", "rows"][..], &["planning", "trend"], &["planning", "schema"]] {
            assert!(Cli::try_parse_from(args).unwrap().command.requires_session());
        }
    }

    #[test]
    fn test_edit_requires_units() {
        assert!(
            Cli::try_parse_from(["planning", "edit", "--store", "S1", "--sku", "SK9", "--week", "W3"])
                .is_err()
        );
    }
}
