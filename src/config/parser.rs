//! Configuration loading.
//!
//! A dashboard configuration comes from `planning.yaml`, an optional `.env`
//! file next to it, and `PLANNING_*` environment overrides, applied in that
//! order.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{ConfigError, PlanningError, Result};

use super::spec::DashboardConfig;

/// Configuration file names, in lookup order.
pub const DEFAULT_CONFIG_FILES: &[&str] = &["planning.yaml", "planning.yml"];

/// Overrides `feeds.base_url`.
pub const ENV_FEEDS_BASE_URL: &str = "PLANNING_FEEDS_BASE_URL";
/// Overrides `feeds.timeout_secs`.
pub const ENV_FEEDS_TIMEOUT_SECS: &str = "PLANNING_FEEDS_TIMEOUT_SECS";
/// Overrides `sheet.endpoint`.
pub const ENV_SHEET_ENDPOINT: &str = "PLANNING_SHEET_ENDPOINT";
/// Overrides `sheet.id`.
pub const ENV_SHEET_ID: &str = "PLANNING_SHEET_ID";

/// A configuration together with where its values came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resulting configuration.
    pub config: DashboardConfig,
    /// YAML file the configuration was read from.
    pub source: PathBuf,
    /// `.env` file loaded before overrides, if one was present.
    pub env_file: Option<PathBuf>,
    /// Environment variables that overrode file values.
    pub overrides: Vec<&'static str>,
}

/// Loader for the configuration file of one directory.
#[derive(Debug, Clone)]
pub struct ConfigParser {
    /// Directory holding the configuration and `.env` files.
    config_dir: PathBuf,
}

impl ConfigParser {
    /// Creates a loader for the directory containing `config_file`.
    #[must_use]
    pub fn for_file(config_file: &Path) -> Self {
        let config_dir = config_file
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Self { config_dir }
    }

    /// Loads `.env`, the YAML file and environment overrides.
    ///
    /// # Errors
    ///
    /// Returns `FileNotFound` if the file is missing, `ParseError` if it or
    /// the `.env` file cannot be read or parsed, and `ValidationError` for an
    /// unusable override value.
    pub fn load(&self, config_file: &Path) -> Result<LoadedConfig> {
        let env_file = self.load_dotenv()?;
        let content = read_config(config_file)?;
        let mut config = Self::parse_yaml(&content, Some(config_file))?;
        let overrides = apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;

        info!(
            "Loaded configuration from {} ({} environment overrides)",
            config_file.display(),
            overrides.len()
        );

        Ok(LoadedConfig {
            config,
            source: config_file.to_path_buf(),
            env_file,
            overrides,
        })
    }

    /// Parses a dashboard configuration document.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` for an empty document or invalid YAML.
    pub fn parse_yaml(content: &str, source: Option<&Path>) -> Result<DashboardConfig> {
        let location = source.map(|p| p.display().to_string());

        if content.trim().is_empty() {
            return Err(PlanningError::Config(ConfigError::ParseError {
                message: String::from("configuration is empty; an auth section is required"),
                location,
            }));
        }

        serde_yaml::from_str(content).map_err(|e| {
            PlanningError::Config(ConfigError::ParseError {
                message: format!("YAML parse error: {e}"),
                location,
            })
        })
    }

    /// Loads `.env` from the configuration directory into the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the file exists but cannot be read or parsed.
    fn load_dotenv(&self) -> Result<Option<PathBuf>> {
        let env_path = self.config_dir.join(".env");
        if !env_path.is_file() {
            debug!("No .env file at {}", env_path.display());
            return Ok(None);
        }

        dotenvy::from_path(&env_path).map_err(|e| {
            PlanningError::Config(ConfigError::ParseError {
                message: format!("Unreadable .env file: {e}"),
                location: Some(env_path.display().to_string()),
            })
        })?;
        info!("Loaded credentials environment from {}", env_path.display());

        Ok(Some(env_path))
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            PlanningError::Config(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            })
        } else {
            PlanningError::Config(ConfigError::ParseError {
                message: format!("Failed to read file: {e}"),
                location: Some(path.display().to_string()),
            })
        }
    })
}

/// Applies `PLANNING_*` overrides read through `var`.
///
/// Returns the names of the variables that were applied.
fn apply_env_overrides<F>(config: &mut DashboardConfig, var: F) -> Result<Vec<&'static str>>
where
    F: Fn(&str) -> Option<String>,
{
    let mut applied = Vec::new();

    if let Some(base_url) = var(ENV_FEEDS_BASE_URL) {
        config.feeds.base_url = base_url;
        applied.push(ENV_FEEDS_BASE_URL);
    }

    if let Some(timeout) = var(ENV_FEEDS_TIMEOUT_SECS) {
        config.feeds.timeout_secs = timeout.trim().parse().map_err(|_| {
            ConfigError::validation(
                format!("{ENV_FEEDS_TIMEOUT_SECS} must be a whole number of seconds, got '{timeout}'"),
                "feeds.timeout_secs",
            )
        })?;
        applied.push(ENV_FEEDS_TIMEOUT_SECS);
    }

    if let Some(endpoint) = var(ENV_SHEET_ENDPOINT) {
        config.sheet.endpoint = endpoint;
        applied.push(ENV_SHEET_ENDPOINT);
    }

    if let Some(id) = var(ENV_SHEET_ID) {
        config.sheet.id = id;
        applied.push(ENV_SHEET_ID);
    }

    for name in &applied {
        debug!("Configuration value overridden by {name}");
    }
    Ok(applied)
}

/// Finds the configuration file in `start_dir` or the nearest ancestor.
///
/// # Errors
///
/// Returns `FileNotFound` naming the first candidate in `start_dir`.
pub fn find_config_file(start_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let start = start_dir.as_ref();

    start
        .ancestors()
        .flat_map(|dir| DEFAULT_CONFIG_FILES.iter().map(move |name| dir.join(name)))
        .find(|candidate| candidate.is_file())
        .inspect(|found| debug!("Found configuration file: {}", found.display()))
        .ok_or_else(|| {
            PlanningError::Config(ConfigError::FileNotFound {
                path: start.join(DEFAULT_CONFIG_FILES[0]),
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    const MINIMAL: &str = r"
auth:
  username: admin
  password_sha256: ef92b778bafe771e89245b89ecbc08a44a4e166c06659911881f383d4473e94f
";

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = ConfigParser::parse_yaml(MINIMAL, None).unwrap();

        assert_eq!(config.auth.username, "admin");
        assert_eq!(config.feeds.calendar_path, "/calendar.json");
        assert_eq!(config.feeds.timeout_secs, 30);
        assert_eq!(config.sheet.planning_gid, "1026939898");
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
feeds:
  base_url: https://dash.example.com
  calendar_path: /data/calendar.json
  timeout_secs: 10
sheet:
  id: "abc123"
  planning_gid: "42"
auth:
  username: planner
  password_sha256: ef92b778bafe771e89245b89ecbc08a44a4e166c06659911881f383d4473e94f
"#;
        let config = ConfigParser::parse_yaml(yaml, None).unwrap();

        assert_eq!(
            config.feeds.calendar_url(),
            "https://dash.example.com/data/calendar.json"
        );
        assert_eq!(config.feeds.timeout_secs, 10);
        assert_eq!(config.sheet.id, "abc123");
        assert_eq!(config.sheet.trend_gid, "262792430");
    }

    #[test]
    fn test_missing_auth_section() {
        let result = ConfigParser::parse_yaml("feeds:\n  timeout_secs: 5\n", None);
        assert!(matches!(
            result,
            Err(PlanningError::Config(ConfigError::ParseError { .. }))
        ));
    }

    #[test]
    fn test_empty_document() {
        let err = ConfigParser::parse_yaml("  \n", Some(Path::new("planning.yaml"))).unwrap_err();
        assert!(err.to_string().contains("auth section is required"));
    }

    #[test]
    fn test_env_overrides_reported() {
        let mut config = ConfigParser::parse_yaml(MINIMAL, None).unwrap();
        let applied = apply_env_overrides(
            &mut config,
            env(&[
                (ENV_FEEDS_BASE_URL, "https://feeds.example.com"),
                (ENV_FEEDS_TIMEOUT_SECS, " 12 "),
                (ENV_SHEET_ID, "sheet-9"),
            ]),
        )
        .unwrap();

        assert_eq!(
            applied,
            [ENV_FEEDS_BASE_URL, ENV_FEEDS_TIMEOUT_SECS, ENV_SHEET_ID]
        );
        assert_eq!(config.feeds.base_url, "https://feeds.example.com");
        assert_eq!(config.feeds.timeout_secs, 12);
        assert_eq!(config.sheet.id, "sheet-9");
        assert_eq!(config.sheet.endpoint, "https://docs.google.com/spreadsheets/d");
    }

    #[test]
    fn test_bad_timeout_override_rejected() {
        let mut config = ConfigParser::parse_yaml(MINIMAL, None).unwrap();
        let result = apply_env_overrides(&mut config, env(&[(ENV_FEEDS_TIMEOUT_SECS, "soon")]));
        assert!(matches!(
            result,
            Err(PlanningError::Config(ConfigError::ValidationError { .. }))
        ));
        assert_eq!(config.feeds.timeout_secs, 30);
    }

    #[test]
    fn test_load_reports_source() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let path = temp.path().join("planning.yaml");
        std::fs::write(&path, MINIMAL).unwrap();

        let loaded = ConfigParser::for_file(&path).load(&path).unwrap();
        assert_eq!(loaded.source, path);
        assert!(loaded.env_file.is_none());
        assert_eq!(loaded.config.auth.username, "admin");
    }

    #[test]
    fn test_unreadable_dotenv_rejected() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let path = temp.path().join("planning.yaml");
        std::fs::write(&path, MINIMAL).unwrap();
        std::fs::write(temp.path().join(".env"), "PLANNING_USERNAME='unterminated\n").unwrap();

        let result = ConfigParser::for_file(&path).load(&path);
        assert!(matches!(
            result,
            Err(PlanningError::Config(ConfigError::ParseError { location: Some(_), .. }))
        ));
    }

    #[test]
    fn test_find_config_in_parent() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(temp.path().join("planning.yml"), MINIMAL).unwrap();
        let nested = temp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let found = find_config_file(&nested).unwrap();
        assert_eq!(found, temp.path().join("planning.yml"));
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let path = temp.path().join("nope.yaml");
        let result = ConfigParser::for_file(&path).load(&path);
        assert!(matches!(
            result,
            Err(PlanningError::Config(ConfigError::FileNotFound { .. }))
        ));
    }
}
