// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Planning Grid
//!
//! The planning reconciler of a retail data dashboard: it turns a calendar
//! taxonomy and a published spreadsheet export into an editable sales
//! planning grid.
//!
//! ## Overview
//!
//! - Builds a two-level month/week column schema from the calendar feed
//! - Builds one row per store and SKU from the spreadsheet export
//! - Applies sales-units edits and recomputes sales dollars, GM dollars and
//!   GM % from the SKU's price and cost
//! - Classifies GM % values into color bands
//!
//! ## Architecture
//!
//! 1. **Feeds**: calendar, spreadsheet and SKU/store reference data over HTTP
//! 2. **Planning**: pure schema, dataset and edit transformations
//! 3. **Reconciler**: owns the grid and serializes edits per row
//!
//! ## Modules
//!
//! - [`config`]: Configuration parsing and validation
//! - [`feeds`]: Feed client, sheet decoding and price lookups
//! - [`planning`]: Column schema, row dataset, edits and GM bands
//! - [`reconciler`]: Grid state and edit ordering
//! - [`session`]: Operator sessions
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```yaml
//! feeds:
//!   base_url: http://localhost:5173
//!
//! sheet:
//!   id: 1EgMU8-gBeUs5j898IZAHI4WOdXe-ewRw
//!   planning_gid: "1026939898"
//!
//! auth:
//!   username: admin
//!   password_sha256: ef92b778bafe771e89245b89ecbc08a44a4e166c06659911881f383d4473e94f
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod config;
pub mod error;
pub mod feeds;
pub mod planning;
pub mod reconciler;
pub mod session;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, Commands, OutputFormatter};
pub use config::{ConfigParser, ConfigValidator, DashboardConfig};
pub use error::{PlanningError, Result};
pub use feeds::{CatalogLookup, FeedClient, HttpSkuLookup, PriceLookup};
pub use planning::{
    ColumnSchema, GmBand, PlanningRow, RowKey, RowSet, apply_units_edit, build_column_schema,
    build_row_dataset, classify_gm_percent,
};
pub use reconciler::{EditOutcome, MountReport, PlanningReconciler};
pub use session::Session;
