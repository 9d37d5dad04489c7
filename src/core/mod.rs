//! Core business logic - framework-agnostic inventory reconciliation.
//!
//! Functions here take a database connection (or an open transaction) and return
//! domain types from [`crate::models`]. Operations that touch more than one table
//! run inside a single transaction, so a failure leaves nothing half-applied.

/// Dish catalog lookups and management
pub mod catalog;
/// Ingredient store primitives: consume, restore, upsert
pub mod inventory;
/// Weekly menu: placing and removing dishes
pub mod menu;
/// Named weekly templates and whole-week replacement
pub mod predefined;
/// Purchase ledger
pub mod purchase;
/// Shopping list generation and editing
pub mod shopping;
/// Weekly snapshot export and import
pub mod snapshot;
/// Week keys and Monday normalization
pub mod week;

/// Quantities closer than this are treated as equal, so float sums never report
/// phantom shortages or phantom shopping items.
pub const QUANTITY_EPSILON: f64 = 1e-9;
