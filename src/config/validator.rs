//! Configuration validation for the planning grid.
//!
//! This module checks feed locations, sheet identifiers and credentials
//! before any feed is fetched.

use crate::error::{ConfigError, PlanningError, Result};
use reqwest::Url;
use tracing::debug;

use super::spec::{AuthConfig, DashboardConfig, FeedsConfig, SheetConfig};

/// Timeouts above this many seconds produce a warning.
const LONG_TIMEOUT_SECS: u64 = 120;

/// Validator for dashboard configurations.
#[derive(Debug, Default)]
pub struct ConfigValidator;

/// Validation result containing all errors found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

/// A single validation error.
#[derive(Debug)]
pub struct ValidationError {
    /// The field path that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

impl ConfigValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a dashboard configuration.
    ///
    /// # Errors
    ///
    /// Returns the first validation error if any check fails.
    pub fn validate(&self, config: &DashboardConfig) -> Result<ValidationResult> {
        let mut result = ValidationResult::default();

        Self::validate_feeds(&config.feeds, &mut result);
        Self::validate_sheet(&config.sheet, &mut result);
        Self::validate_auth(&config.auth, &mut result);

        if result.errors.is_empty() {
            debug!("Configuration validation passed");
            Ok(result)
        } else {
            let first_error = &result.errors[0];
            Err(PlanningError::Config(ConfigError::validation(
                first_error.message.clone(),
                first_error.field.clone(),
            )))
        }
    }

    /// Validates the static feed section.
    fn validate_feeds(feeds: &FeedsConfig, result: &mut ValidationResult) {
        match Url::parse(&feeds.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                if url.scheme() == "http"
                    && !matches!(url.host_str(), Some("localhost" | "127.0.0.1"))
                {
                    result.warnings.push(format!(
                        "feeds.base_url: '{}' is served over plain http",
                        feeds.base_url
                    ));
                }
            }
            Ok(url) => result.errors.push(ValidationError {
                field: String::from("feeds.base_url"),
                message: format!("Unsupported URL scheme '{}'", url.scheme()),
            }),
            Err(e) => result.errors.push(ValidationError {
                field: String::from("feeds.base_url"),
                message: format!("Invalid base URL '{}': {e}", feeds.base_url),
            }),
        }

        for (field, path) in [
            ("feeds.calendar_path", &feeds.calendar_path),
            ("feeds.sku_path", &feeds.sku_path),
            ("feeds.store_path", &feeds.store_path),
        ] {
            if path.trim().is_empty() {
                result.errors.push(ValidationError {
                    field: String::from(field),
                    message: String::from("Feed path cannot be empty"),
                });
            }
        }

        if feeds.timeout_secs == 0 {
            result.errors.push(ValidationError {
                field: String::from("feeds.timeout_secs"),
                message: String::from("Request timeout must be at least 1 second"),
            });
        } else if feeds.timeout_secs > LONG_TIMEOUT_SECS {
            result.warnings.push(format!(
                "feeds.timeout_secs: {}s is unusually long",
                feeds.timeout_secs
            ));
        }
    }

    /// Validates the spreadsheet section.
    fn validate_sheet(sheet: &SheetConfig, result: &mut ValidationResult) {
        if Url::parse(&sheet.endpoint).is_err() {
            result.errors.push(ValidationError {
                field: String::from("sheet.endpoint"),
                message: format!("Invalid sheet endpoint '{}'", sheet.endpoint),
            });
        }

        if sheet.id.trim().is_empty() {
            result.errors.push(ValidationError {
                field: String::from("sheet.id"),
                message: String::from("Spreadsheet id cannot be empty"),
            });
        }

        for (field, gid) in [
            ("sheet.planning_gid", &sheet.planning_gid),
            ("sheet.trend_gid", &sheet.trend_gid),
        ] {
            if gid.is_empty() {
                result.errors.push(ValidationError {
                    field: String::from(field),
                    message: String::from("Sheet tab id cannot be empty"),
                });
            } else if !gid.chars().all(|c| c.is_ascii_digit()) {
                result
                    .warnings
                    .push(format!("{field}: tab id '{gid}' is not numeric"));
            }
        }
    }

    /// Validates the credential section.
    fn validate_auth(auth: &AuthConfig, result: &mut ValidationResult) {
        if auth.username.trim().is_empty() {
            result.errors.push(ValidationError {
                field: String::from("auth.username"),
                message: String::from("Username cannot be empty"),
            });
        }

        if !is_sha256_hex(&auth.password_sha256) {
            result.errors.push(ValidationError {
                field: String::from("auth.password_sha256"),
                message: String::from("Password digest must be 64 hexadecimal characters"),
            });
        }
    }
}

/// Returns true if the value looks like a hex-encoded SHA-256 digest.
fn is_sha256_hex(value: &str) -> bool {
    value.len() == 64 && value.chars().all(|c| c.is_ascii_hexdigit())
}

impl ValidationResult {
    /// Returns true if validation passed (no errors).
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of warnings.
    #[must_use]
    pub const fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> DashboardConfig {
        DashboardConfig {
            feeds: FeedsConfig::default(),
            sheet: SheetConfig::default(),
            auth: AuthConfig {
                username: String::from("admin"),
                password_sha256: String::from(
                    "ef92b778bafe771e89245b89ecbc08a44a4e166c06659911881f383d4473e94f",
                ),
            },
        }
    }

    #[test]
    fn test_valid_config() {
        let result = ConfigValidator::new().validate(&valid_config()).unwrap();
        assert!(result.is_valid());
        assert_eq!(result.warning_count(), 0);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = valid_config();
        config.feeds.timeout_secs = 0;

        let err = ConfigValidator::new().validate(&config).unwrap_err();
        assert!(matches!(
            err,
            PlanningError::Config(ConfigError::ValidationError { field: Some(ref f), .. })
                if f == "feeds.timeout_secs"
        ));
    }

    #[test]
    fn test_bad_base_url_rejected() {
        let mut config = valid_config();
        config.feeds.base_url = String::from("ftp://dash.local");
        assert!(ConfigValidator::new().validate(&config).is_err());

        config.feeds.base_url = String::from("not a url");
        assert!(ConfigValidator::new().validate(&config).is_err());
    }

    #[test]
    fn test_bad_digest_rejected() {
        let mut config = valid_config();
        config.auth.password_sha256 = String::from("password123");
        assert!(ConfigValidator::new().validate(&config).is_err());
    }

    #[test]
    fn test_plain_http_remote_warns() {
        let mut config = valid_config();
        config.feeds.base_url = String::from("http://dash.example.com");

        let result = ConfigValidator::new().validate(&config).unwrap();
        assert_eq!(result.warning_count(), 1);
    }

    #[test]
    fn test_sha256_hex() {
        assert!(is_sha256_hex(
            "ef92b778bafe771e89245b89ecbc08a44a4e166c06659911881f383d4473e94f"
        ));
        assert!(!is_sha256_hex("ef92"));
        assert!(!is_sha256_hex(&"z".repeat(64)));
    }
}
