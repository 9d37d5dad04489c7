//! Ingredient entity - One stock-keeping unit in the household inventory.
//!
//! Quantities are stored in the ingredient's own `unit`. The engine never lets
//! `quantity` go below zero.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ingredient database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ingredients")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Stable identifier (e.g. `"arroz-001"`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Display name
    pub name: String,
    /// Quantity on hand, in `unit`
    pub quantity: f64,
    /// Unit of measure (e.g. `"kg"`, `"paquete"`)
    pub unit: String,
    /// Price of one `unit`
    pub price_per_unit: f64,
    /// Pantry category (e.g. `"cereales"`, `"lacteos"`)
    pub category: String,
    /// Whether the item is bought and tracked per package
    #[serde(default)]
    pub is_package: bool,
    /// Price of the whole package, for package items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_total: Option<f64>,
}

/// Ingredients are referenced by id only; recipes may name ids the store lacks.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
