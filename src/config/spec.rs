//! Configuration specification types for the planning grid.
//!
//! This module defines the structs that map to the `planning.yaml` file:
//! where the calendar, spreadsheet and reference feeds live, and which
//! credentials open a session.

use serde::{Deserialize, Serialize};

/// Default base URL serving the static JSON feeds.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5173";

/// Default published-sheet endpoint.
pub const DEFAULT_SHEET_ENDPOINT: &str = "https://docs.google.com/spreadsheets/d";

/// The root configuration structure for the planning grid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Static JSON feeds (calendar, SKU, store).
    #[serde(default)]
    pub feeds: FeedsConfig,
    /// Published spreadsheet feeding the planning rows and the GM trend.
    #[serde(default)]
    pub sheet: SheetConfig,
    /// Login credentials.
    pub auth: AuthConfig,
}

/// Static JSON feed locations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedsConfig {
    /// Base URL the feed paths are resolved against.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path of the calendar taxonomy.
    #[serde(default = "default_calendar_path")]
    pub calendar_path: String,
    /// Path of the SKU reference data.
    #[serde(default = "default_sku_path")]
    pub sku_path: String,
    /// Path of the store reference data.
    #[serde(default = "default_store_path")]
    pub store_path: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Published spreadsheet location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SheetConfig {
    /// Endpoint prefix of the published sheet.
    #[serde(default = "default_sheet_endpoint")]
    pub endpoint: String,
    /// Spreadsheet document id.
    #[serde(default = "default_sheet_id")]
    pub id: String,
    /// Tab id of the planning export.
    #[serde(default = "default_planning_gid")]
    pub planning_gid: String,
    /// Tab id of the GM trend export.
    #[serde(default = "default_trend_gid")]
    pub trend_gid: String,
}

/// Login credentials.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthConfig {
    /// Accepted username.
    pub username: String,
    /// Hex-encoded SHA-256 digest of the accepted password.
    pub password_sha256: String,
}

fn default_base_url() -> String {
    String::from(DEFAULT_BASE_URL)
}

fn default_calendar_path() -> String {
    String::from("/calendar.json")
}

fn default_sku_path() -> String {
    String::from("/sku.json")
}

fn default_store_path() -> String {
    String::from("/store.json")
}

const fn default_timeout_secs() -> u64 {
    30
}

fn default_sheet_endpoint() -> String {
    String::from(DEFAULT_SHEET_ENDPOINT)
}

fn default_sheet_id() -> String {
    String::from("1EgMU8-gBeUs5j898IZAHI4WOdXe-ewRw")
}

fn default_planning_gid() -> String {
    String::from("1026939898")
}

fn default_trend_gid() -> String {
    String::from("262792430")
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            calendar_path: default_calendar_path(),
            sku_path: default_sku_path(),
            store_path: default_store_path(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            endpoint: default_sheet_endpoint(),
            id: default_sheet_id(),
            planning_gid: default_planning_gid(),
            trend_gid: default_trend_gid(),
        }
    }
}

impl FeedsConfig {
    /// Resolves a feed path against the base URL.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Returns the calendar feed URL.
    #[must_use]
    pub fn calendar_url(&self) -> String {
        self.url(&self.calendar_path)
    }

    /// Returns the SKU feed URL.
    #[must_use]
    pub fn sku_url(&self) -> String {
        self.url(&self.sku_path)
    }

    /// Returns the store feed URL.
    #[must_use]
    pub fn store_url(&self) -> String {
        self.url(&self.store_path)
    }
}

impl SheetConfig {
    /// Returns the JSON export URL for a sheet tab.
    #[must_use]
    pub fn gviz_url(&self, gid: &str) -> String {
        format!(
            "{}/{}/gviz/tq?tqx=out:json&gid={gid}",
            self.endpoint.trim_end_matches('/'),
            self.id
        )
    }
}
