//! Dish ingredient entity - One recipe line: how much of an ingredient a single
//! placement of the dish consumes.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Recipe line database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dish_ingredients")]
pub struct Model {
    /// Unique identifier for the line
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Dish this line belongs to
    pub dish_id: String,
    /// Ingredient consumed (may not exist in the store yet)
    pub ingredient_id: String,
    /// Quantity consumed per placement
    pub quantity: f64,
    /// Order of the line within the recipe
    pub position: i32,
}

/// Defines relationships between recipe lines and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line belongs to one dish
    #[sea_orm(
        belongs_to = "super::dish::Entity",
        from = "Column::DishId",
        to = "super::dish::Column::Id"
    )]
    Dish,
}

impl Related<super::dish::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Dish.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
