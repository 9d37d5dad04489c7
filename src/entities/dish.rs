//! Dish entity - A recipe in the catalog.
//!
//! The recipe lines live in `dish_ingredients`; see [`super::dish_ingredient`].

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Dish database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dishes")]
pub struct Model {
    /// Stable identifier (e.g. `"dish-001"`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Display name
    pub name: String,
    /// Meal category label: `"desayuno"`, `"merienda"`, `"almuerzo"`, `"cafe"` or `"cena"`
    pub category: String,
    /// Servings the recipe yields
    pub servings: i32,
}

/// Defines relationships between Dish and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One dish has many recipe lines
    #[sea_orm(has_many = "super::dish_ingredient::Entity")]
    Ingredients,
}

impl Related<super::dish_ingredient::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ingredients.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
