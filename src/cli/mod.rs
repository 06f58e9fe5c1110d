//! CLI module for the planning grid.
//!
//! This module provides the command-line interface for inspecting the
//! planning grid and editing sales units.

mod commands;
mod output;

pub use commands::{Cli, Commands, OutputFormat};
pub use output::OutputFormatter;
