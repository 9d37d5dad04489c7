//! Purchase item entity - One bought line of a purchase.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Purchase item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_items")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning purchase
    pub purchase_id: String,
    /// Zero-based position in the purchase
    pub position: i32,
    /// Ingredient bought
    pub ingredient_id: String,
    /// Display name
    pub name: String,
    /// Quantity bought
    pub quantity: f64,
    /// Unit of measure
    pub unit: String,
    /// Price of one unit
    pub price_per_unit: f64,
    /// `quantity * price_per_unit`
    pub total_price: f64,
}

/// Defines relationships between Purchase item and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each item belongs to one purchase
    #[sea_orm(
        belongs_to = "super::purchase::Entity",
        from = "Column::PurchaseId",
        to = "super::purchase::Column::Id"
    )]
    Purchase,
}

impl Related<super::purchase::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purchase.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
