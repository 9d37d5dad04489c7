//! Shopping item entity - One line of a shopping list.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Shopping item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shopping_items")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning list
    pub list_id: String,
    /// Zero-based position in the list
    pub position: i32,
    /// Ingredient to buy
    pub ingredient_id: String,
    /// Display name
    pub name: String,
    /// Quantity to buy
    pub quantity: f64,
    /// Unit of measure
    pub unit: String,
    /// Price of one unit
    pub price_per_unit: f64,
    /// Whether the item has been bought
    pub purchased: bool,
}

/// Defines relationships between Shopping item and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each item belongs to one list
    #[sea_orm(
        belongs_to = "super::shopping_list::Entity",
        from = "Column::ListId",
        to = "super::shopping_list::Column::Id"
    )]
    ShoppingList,
}

impl Related<super::shopping_list::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShoppingList.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
