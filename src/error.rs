//! Error types for the planning grid.
//!
//! This module provides the error hierarchy for every stage of the planning
//! view lifecycle: configuration, login, feed access, price lookups and
//! in-place edits.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the planning grid.
#[derive(Debug, Error)]
pub enum PlanningError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Login/session errors.
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Feed access and feed shape errors.
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    /// SKU price/cost lookup errors.
    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    /// Edit input errors.
    #[error("Edit error: {0}")]
    Edit(#[from] EditError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found.
    #[error("Configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Validation failed.
    #[error("Configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },

    /// Environment variable is missing.
    #[error("Missing environment variable: {name}")]
    MissingEnvVar {
        /// Name of the missing variable.
        name: String,
    },
}

/// Login/session errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Username or password did not match the configured credentials.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No credentials were supplied for a command that needs a session.
    #[error("Missing credentials: provide --username and --password (or PLANNING_USERNAME / PLANNING_PASSWORD)")]
    MissingCredentials,
}

/// Feed access and feed shape errors.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The calendar feed is not an array, or an entry lacks a required field.
    #[error("Malformed feed '{feed}': {message}")]
    MalformedFeed {
        /// Feed name.
        feed: String,
        /// Description of the shape problem.
        message: String,
    },

    /// The spreadsheet header lacks one of the required columns.
    #[error("Required column '{column}' not found in spreadsheet data")]
    RequiredColumnMissing {
        /// Label of the missing column.
        column: String,
    },

    /// Transport-level failure.
    #[error("Network error fetching {url}: {message}")]
    Network {
        /// Requested URL.
        url: String,
        /// Description of the network error.
        message: String,
    },

    /// Non-success HTTP status.
    #[error("HTTP error fetching {url}: status {status}")]
    HttpStatus {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The response body could not be decoded.
    #[error("Invalid response from {url}: {message}")]
    InvalidResponse {
        /// Requested URL.
        url: String,
        /// Description of the decode error.
        message: String,
    },
}

/// SKU price/cost lookup errors.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The reference feed could not be fetched or decoded.
    #[error("Failed to load SKU reference data: {0}")]
    Feed(#[from] FeedError),

    /// No SKU with the given id exists in the reference data.
    #[error("SKU not found: {id}")]
    SkuNotFound {
        /// Requested SKU id.
        id: String,
    },

    /// The SKU exists but carries no usable value for the field.
    #[error("SKU {id} has no {field} value")]
    MissingField {
        /// SKU id.
        id: String,
        /// Field name (price or cost).
        field: String,
    },
}

/// Edit input errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// The edited text is not a number.
    #[error("Not a number: '{input}'")]
    ParseFailure {
        /// Rejected input text.
        input: String,
    },

    /// The edited row is not part of the current dataset.
    #[error("No planning row for {key}")]
    UnknownRow {
        /// Composite row key.
        key: String,
    },
}

/// Result type alias for planning grid operations.
pub type Result<T> = std::result::Result<T, PlanningError>;

impl PlanningError {
    /// Returns true if the error only degrades the planning view to an
    /// empty or zeroed state instead of failing the command.
    #[must_use]
    pub const fn is_degradable(&self) -> bool {
        matches!(
            self,
            Self::Feed(_) | Self::Lookup(_) | Self::Edit(EditError::ParseFailure { .. })
        )
    }
}

impl ConfigError {
    /// Creates a validation error for a specific field.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

impl FeedError {
    /// Creates a malformed feed error.
    #[must_use]
    pub fn malformed(feed: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedFeed {
            feed: feed.into(),
            message: message.into(),
        }
    }

    /// Creates a network error.
    #[must_use]
    pub fn network(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid response error.
    #[must_use]
    pub fn invalid_response(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            url: url.into(),
            message: message.into(),
        }
    }
}
