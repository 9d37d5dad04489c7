//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod dish;
pub mod dish_ingredient;
pub mod ingredient;
pub mod menu_entry;
pub mod predefined_menu;
pub mod predefined_menu_entry;
pub mod purchase;
pub mod purchase_item;
pub mod shopping_item;
pub mod shopping_list;
pub mod weekly_menu;

// Re-export specific types to avoid conflicts
pub use dish::{Column as DishColumn, Entity as Dish, Model as DishModel};
pub use dish_ingredient::{
    Column as DishIngredientColumn, Entity as DishIngredient, Model as DishIngredientModel,
};
pub use ingredient::{Column as IngredientColumn, Entity as Ingredient, Model as IngredientModel};
pub use menu_entry::{Column as MenuEntryColumn, Entity as MenuEntry, Model as MenuEntryModel};
pub use predefined_menu::{
    Column as PredefinedMenuColumn, Entity as PredefinedMenu, Model as PredefinedMenuModel,
};
pub use predefined_menu_entry::{
    Column as PredefinedMenuEntryColumn, Entity as PredefinedMenuEntry,
    Model as PredefinedMenuEntryModel,
};
pub use purchase::{Column as PurchaseColumn, Entity as Purchase, Model as PurchaseModel};
pub use purchase_item::{
    Column as PurchaseItemColumn, Entity as PurchaseItem, Model as PurchaseItemModel,
};
pub use shopping_item::{
    Column as ShoppingItemColumn, Entity as ShoppingItem, Model as ShoppingItemModel,
};
pub use shopping_list::{
    Column as ShoppingListColumn, Entity as ShoppingList, Model as ShoppingListModel,
};
pub use weekly_menu::{Column as WeeklyMenuColumn, Entity as WeeklyMenu, Model as WeeklyMenuModel};
