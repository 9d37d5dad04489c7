//! Predefined menu entry entity - One (day, meal, dish) slot of a template.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Template slot database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "predefined_menu_entries")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning template
    pub menu_id: String,
    /// Canonical day label
    pub day: String,
    /// Meal slot label
    pub meal: String,
    /// Catalog id of the dish
    pub dish_id: String,
}

/// Defines relationships between template slots and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each slot belongs to one template
    #[sea_orm(
        belongs_to = "super::predefined_menu::Entity",
        from = "Column::MenuId",
        to = "super::predefined_menu::Column::Id"
    )]
    PredefinedMenu,
}

impl Related<super::predefined_menu::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PredefinedMenu.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
