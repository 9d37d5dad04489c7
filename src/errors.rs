//! Unified error type for the meal planner.
//!
//! Shortages are not errors: they travel as warnings on menu entries. Everything
//! here is a failure the caller has to surface or retry.

use sea_orm::DbErr;
use thiserror::Error;

/// Every failure an engine operation can report.
#[derive(Debug, Error)]
pub enum Error {
    /// The backing store failed (I/O, constraint, connection).
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Settings file could not be read or parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// A dish id did not resolve in the catalog.
    #[error("Dish not found: {id}")]
    DishNotFound {
        /// The unresolved dish id
        id: String,
    },

    /// An ingredient id did not resolve in the store.
    #[error("Ingredient not found: {id}")]
    IngredientNotFound {
        /// The unresolved ingredient id
        id: String,
    },

    /// A predefined menu id did not resolve.
    #[error("Predefined menu not found: {id}")]
    PredefinedMenuNotFound {
        /// The unresolved template id
        id: String,
    },

    /// The week has no shopping list yet.
    #[error("No shopping list for week {week}")]
    ShoppingListNotFound {
        /// Week key (`YYYY-MM-DD`)
        week: String,
    },

    /// A shopping list index was out of range.
    #[error("Shopping list has no item at index {index}")]
    ShoppingItemNotFound {
        /// The requested position
        index: usize,
    },

    /// Quantity was zero, negative, or not finite.
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity {
        /// The rejected quantity
        quantity: f64,
    },

    /// Price was negative or not finite.
    #[error("Invalid price: {price}")]
    InvalidPrice {
        /// The rejected price
        price: f64,
    },

    /// Any other rejected input (empty names, zero servings).
    #[error("Validation error: {message}")]
    Validation {
        /// What was rejected
        message: String,
    },

    /// Day label is not one of the seven canonical days.
    #[error("Unknown day: {label}")]
    InvalidDay {
        /// The rejected label
        label: String,
    },

    /// Meal label is not a known meal category.
    #[error("Unknown meal category: {label}")]
    InvalidMealCategory {
        /// The rejected label
        label: String,
    },

    /// Week string is not a `YYYY-MM-DD` date.
    #[error("Invalid week: {value}")]
    InvalidWeek {
        /// The rejected input
        value: String,
    },

    /// JSON encoding or decoding failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
