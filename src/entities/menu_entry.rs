//! Menu entry entity - A dish placed on a (day, meal) slot of a weekly menu.
//!
//! The entry keeps a copy of the dish as it was when placed (`dish_name`,
//! `servings`, `recipe`) plus the lines that were actually taken out of stock
//! (`consumed`), so removing it gives back exactly what placing it took.
//! `missing_ingredients` is the shortage warning recorded at placement time:
//! `None` means nothing was short.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Menu entry database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "menu_entries")]
pub struct Model {
    /// Unique identifier; insertion order doubles as display order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning menu (`menu-YYYY-MM-DD`)
    pub menu_id: String,
    /// Canonical day label (`"lunes"` .. `"domingo"`)
    pub day: String,
    /// Meal slot label
    pub meal: String,
    /// Catalog id of the placed dish
    pub dish_id: String,
    /// Dish name at placement time
    pub dish_name: String,
    /// Dish servings at placement time
    pub servings: i32,
    /// JSON array of recipe lines at placement time
    pub recipe: String,
    /// JSON array of the recipe lines that were deducted from stock
    pub consumed: String,
    /// JSON array of ingredient names that were short, if any
    pub missing_ingredients: Option<String>,
}

/// Defines relationships between Menu entry and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each entry belongs to one weekly menu
    #[sea_orm(
        belongs_to = "super::weekly_menu::Entity",
        from = "Column::MenuId",
        to = "super::weekly_menu::Column::Id"
    )]
    WeeklyMenu,
}

impl Related<super::weekly_menu::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WeeklyMenu.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
