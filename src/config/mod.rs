//! Configuration module for the planning grid.
//!
//! This module handles all configuration-related functionality:
//! - Parsing and deserializing `planning.yaml`
//! - Environment overrides and `.env` loading
//! - Validation of feed locations and credentials

mod spec;
mod parser;
mod validator;

pub use spec::{AuthConfig, DashboardConfig, FeedsConfig, SheetConfig};
pub use parser::{ConfigParser, DEFAULT_CONFIG_FILES, LoadedConfig, find_config_file};
pub use validator::{ConfigValidator, ValidationResult};
