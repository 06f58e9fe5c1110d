//! Feed access module.
//!
//! This module fetches and decodes the calendar taxonomy, the published
//! spreadsheet export and the SKU/store reference data, and resolves SKU
//! prices and costs.

mod client;
mod gviz;
mod lookup;
mod types;

pub use client::FeedClient;
pub use gviz::strip_wrapper;
pub use lookup::{CatalogLookup, HttpSkuLookup, PriceLookup, SkuField};
#[cfg(test)]
pub use lookup::MockPriceLookup;
pub use types::{
    CalendarEntry, CellValue, SheetCell, SheetColumn, SheetResponse, SheetRow, SheetTable,
    SkuRecord, StoreRecord, number_text,
};
