//! HTTP client for the dashboard feeds.
//!
//! Every call issues exactly one request: failures are reported to the
//! caller, which decides how to degrade.

use reqwest::{Client, header};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, trace};

use crate::config::{FeedsConfig, SheetConfig};
use crate::error::{FeedError, PlanningError, Result};

use super::gviz::strip_wrapper;
use super::types::{SheetResponse, SkuRecord, StoreRecord};

/// Feed client.
#[derive(Debug, Clone)]
pub struct FeedClient {
    /// HTTP client.
    client: Client,
    /// Static feed locations.
    feeds: FeedsConfig,
    /// Published sheet location.
    sheet: SheetConfig,
}

impl FeedClient {
    /// Creates a new feed client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(feeds: &FeedsConfig, sheet: &SheetConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(feeds.timeout_secs))
            .build()
            .map_err(|e| {
                PlanningError::Feed(FeedError::network(
                    feeds.base_url.clone(),
                    format!("Failed to create HTTP client: {e}"),
                ))
            })?;

        Ok(Self {
            client,
            feeds: feeds.clone(),
            sheet: sheet.clone(),
        })
    }

    /// Fetches a URL and returns its body text.
    async fn get_text(&self, url: &str) -> std::result::Result<String, FeedError> {
        trace!("GET {url}");

        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json, text/plain, */*")
            .send()
            .await
            .map_err(|e| FeedError::network(url, format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| FeedError::invalid_response(url, format!("Failed to read body: {e}")))
    }

    /// Fetches a URL and decodes its body as JSON.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> std::result::Result<T, FeedError> {
        let body = self.get_text(url).await?;
        serde_json::from_str(&body)
            .map_err(|e| FeedError::invalid_response(url, format!("Failed to parse JSON: {e}")))
    }

    /// Fetches the calendar feed as raw JSON; its shape is checked by the
    /// schema builder.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not JSON.
    pub async fn fetch_calendar(&self) -> std::result::Result<Value, FeedError> {
        let url = self.feeds.calendar_url();
        let payload: Value = self.get_json(&url).await?;
        debug!("Fetched calendar feed from {url}");
        Ok(payload)
    }

    /// Fetches a sheet tab and strips its callback envelope.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload cannot be decoded.
    pub async fn fetch_sheet(&self, gid: &str) -> std::result::Result<SheetResponse, FeedError> {
        let url = self.sheet.gviz_url(gid);
        let body = self.get_text(&url).await?;
        let payload = strip_wrapper(&body)?;

        let response: SheetResponse = serde_json::from_str(payload).map_err(|e| {
            FeedError::invalid_response(&url, format!("Failed to parse sheet payload: {e}"))
        })?;

        debug!(
            "Fetched sheet tab {gid} ({} rows)",
            response
                .table
                .as_ref()
                .and_then(|t| t.rows.as_ref())
                .map_or(0, Vec::len)
        );
        Ok(response)
    }

    /// Fetches the planning export tab.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload cannot be decoded.
    pub async fn fetch_planning_sheet(&self) -> std::result::Result<SheetResponse, FeedError> {
        self.fetch_sheet(&self.sheet.planning_gid).await
    }

    /// Fetches the GM trend tab.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload cannot be decoded.
    pub async fn fetch_trend_sheet(&self) -> std::result::Result<SheetResponse, FeedError> {
        self.fetch_sheet(&self.sheet.trend_gid).await
    }

    /// Fetches the SKU reference data.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a SKU list.
    pub async fn fetch_skus(&self) -> std::result::Result<Vec<SkuRecord>, FeedError> {
        self.get_json(&self.feeds.sku_url()).await
    }

    /// Fetches the store reference data.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a store list.
    pub async fn fetch_stores(&self) -> std::result::Result<Vec<StoreRecord>, FeedError> {
        self.get_json(&self.feeds.store_url()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> FeedClient {
        let feeds = FeedsConfig {
            base_url: server.uri(),
            timeout_secs: 5,
            ..FeedsConfig::default()
        };
        let sheet = SheetConfig {
            endpoint: format!("{}/spreadsheets/d", server.uri()),
            id: String::from("doc"),
            planning_gid: String::from("11"),
            trend_gid: String::from("22"),
        };
        FeedClient::new(&feeds, &sheet).expect("client")
    }

    #[tokio::test]
    async fn test_fetch_calendar() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendar.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[{"month_label":"Feb","week_label":"Week 1","week":"W1"}]"#,
            ))
            .mount(&server)
            .await;

        let payload = client_for(&server).fetch_calendar().await.unwrap();
        assert_eq!(payload[0]["week"], "W1");
    }

    #[tokio::test]
    async fn test_fetch_planning_sheet_strips_envelope() {
        let server = MockServer::start().await;
        let body = "/*O_o*/\ngoogle.visualization.Query.setResponse({\"table\":{\"cols\":[{\"label\":\"Store\"}],\"rows\":[{\"c\":[{\"v\":\"S1\"}]}]}});";
        Mock::given(method("GET"))
            .and(path("/spreadsheets/d/doc/gviz/tq"))
            .and(query_param("tqx", "out:json"))
            .and(query_param("gid", "11"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let response = client_for(&server).fetch_planning_sheet().await.unwrap();
        let (cols, rows) = response.sections().unwrap();
        assert_eq!(cols[0].label(), "Store");
        assert_eq!(rows[0].text(0).as_deref(), Some("S1"));
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sku.json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_skus().await.unwrap_err();
        assert!(matches!(err, FeedError::HttpStatus { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_invalid_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/store.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_stores().await.unwrap_err();
        assert!(matches!(err, FeedError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_fetch_skus() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sku.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[{"id":"SK9","label":"Widget","price":5,"cost":3}]"#,
            ))
            .mount(&server)
            .await;

        let skus = client_for(&server).fetch_skus().await.unwrap();
        assert_eq!(skus.len(), 1);
        assert_eq!(skus[0].price, Some(5.0));
    }
}
