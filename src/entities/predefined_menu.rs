//! Predefined menu entity - A named weekly template that can be copied onto any week.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Predefined menu database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "predefined_menus")]
pub struct Model {
    /// Generated identifier (`template-<uuid>`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Display name
    pub name: String,
    /// When the template was created
    pub created_at: DateTimeUtc,
    /// When the template was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Predefined menu and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One template has many slots
    #[sea_orm(has_many = "super::predefined_menu_entry::Entity")]
    Entries,
}

impl Related<super::predefined_menu_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
