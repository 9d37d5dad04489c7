//! Shopping list entity - The deficit list for one week, keyed `shopping-<monday>`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Shopping list database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shopping_lists")]
pub struct Model {
    /// `shopping-YYYY-MM-DD`
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Monday of the week the list was generated for
    pub week: Date,
    /// Sum of quantity x price over all items
    pub total_cost: f64,
    /// True when every item is marked purchased
    pub completed: bool,
    /// When the list was generated
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Shopping list and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One list has many items
    #[sea_orm(has_many = "super::shopping_item::Entity")]
    Items,
}

impl Related<super::shopping_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
