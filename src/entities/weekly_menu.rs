//! Weekly menu entity - One row per calendar week, keyed `menu-<monday>`.
//!
//! The planned dishes are rows of [`super::menu_entry`].

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Weekly menu database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "weekly_menus")]
pub struct Model {
    /// `menu-YYYY-MM-DD`
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Monday of the week
    pub week: Date,
    /// When the menu was first materialized
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Weekly menu and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One menu has many planned dishes
    #[sea_orm(has_many = "super::menu_entry::Entity")]
    Entries,
}

impl Related<super::menu_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
