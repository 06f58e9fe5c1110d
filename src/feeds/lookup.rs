//! SKU price and cost lookups.

use async_trait::async_trait;
use tracing::debug;

use crate::error::LookupError;

use super::client::FeedClient;
use super::types::SkuRecord;

/// Priced SKU attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkuField {
    /// Unit selling price.
    Price,
    /// Unit cost.
    Cost,
}

impl SkuField {
    /// Returns the attribute's field name in the reference feed.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::Cost => "cost",
        }
    }

    /// Reads this attribute from a record.
    #[must_use]
    pub const fn read(self, record: &SkuRecord) -> Option<f64> {
        match self {
            Self::Price => record.price,
            Self::Cost => record.cost,
        }
    }
}

impl std::fmt::Display for SkuField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves a SKU attribute by SKU id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceLookup: Send + Sync {
    /// Returns the requested attribute of the SKU with the given id.
    async fn value_by_id(&self, id: &str, field: SkuField) -> Result<f64, LookupError>;
}

/// Lookup that fetches the SKU feed on every call and scans it.
#[derive(Debug, Clone)]
pub struct HttpSkuLookup {
    /// Feed client.
    client: FeedClient,
}

impl HttpSkuLookup {
    /// Creates a lookup over the configured SKU feed.
    #[must_use]
    pub const fn new(client: FeedClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PriceLookup for HttpSkuLookup {
    async fn value_by_id(&self, id: &str, field: SkuField) -> Result<f64, LookupError> {
        let records = self.client.fetch_skus().await?;
        debug!("Scanning {} SKU records for {id}", records.len());
        find_value(&records, id, field)
    }
}

/// Lookup over an already loaded SKU catalog.
#[derive(Debug, Clone, Default)]
pub struct CatalogLookup {
    /// Reference records.
    records: Vec<SkuRecord>,
}

impl CatalogLookup {
    /// Creates a lookup over the given records.
    #[must_use]
    pub const fn new(records: Vec<SkuRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl PriceLookup for CatalogLookup {
    async fn value_by_id(&self, id: &str, field: SkuField) -> Result<f64, LookupError> {
        find_value(&self.records, id, field)
    }
}

/// Finds an attribute by SKU id with a linear scan.
fn find_value(records: &[SkuRecord], id: &str, field: SkuField) -> Result<f64, LookupError> {
    let record = records
        .iter()
        .find(|r| r.id == id)
        .ok_or_else(|| LookupError::SkuNotFound { id: id.to_string() })?;

    field.read(record).ok_or_else(|| LookupError::MissingField {
        id: id.to_string(),
        field: field.to_string(),
    })
}
