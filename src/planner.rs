//! The planner service: one database connection plus the loaded settings, with
//! every engine operation exposed as a method.
//!
//! Built once at startup and shared by reference (or behind an `Arc`) with
//! whatever front end drives it.

use crate::{
    config::settings::Settings,
    core::{
        catalog, inventory, menu, predefined,
        predefined::{MenuTemplate, TemplateDays},
        purchase, shopping,
        snapshot::{self, ImportSummary, WeeklySnapshot},
    },
    errors::Result,
    models::{
        AddDishOutcome, Day, Dish, Ingredient, MealCategory, Purchase, RecipeLine,
        RemoveDishOutcome, ShoppingItem, ShoppingList, StockRequest, WeeklyMenu,
    },
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Shared handle to the meal planner.
#[derive(Debug, Clone)]
pub struct Planner {
    database: DatabaseConnection,
    settings: Arc<Settings>,
}

impl Planner {
    /// Wraps an initialized database (tables already created).
    #[must_use]
    pub fn new(database: DatabaseConnection, settings: Settings) -> Self {
        Self {
            database,
            settings: Arc::new(settings),
        }
    }

    /// The underlying connection.
    #[must_use]
    pub const fn database(&self) -> &DatabaseConnection {
        &self.database
    }

    /// The settings the planner was started with.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // Ingredient store

    /// Every pantry record, by name.
    pub async fn ingredients(&self) -> Result<Vec<Ingredient>> {
        inventory::list_ingredients(&self.database).await
    }

    /// One pantry record.
    pub async fn ingredient(&self, id: &str) -> Result<Option<Ingredient>> {
        inventory::get_ingredient(&self.database, id).await
    }

    /// Pantry records of one category.
    pub async fn ingredients_by_category(&self, category: &str) -> Result<Vec<Ingredient>> {
        inventory::ingredients_by_category(&self.database, category).await
    }

    /// Inserts or replaces a pantry record.
    pub async fn save_ingredient(&self, ingredient: Ingredient) -> Result<Ingredient> {
        inventory::upsert_ingredient(&self.database, ingredient).await
    }

    /// Adds several pantry records with generated ids.
    pub async fn add_ingredients(
        &self,
        items: Vec<inventory::NewIngredient>,
    ) -> Result<Vec<Ingredient>> {
        inventory::batch_add_ingredients(&self.database, items, &self.settings.inventory).await
    }

    /// Deletes a pantry record.
    pub async fn remove_ingredient(&self, id: &str) -> Result<()> {
        inventory::remove_ingredient(&self.database, id).await
    }

    /// Takes recipe quantities out of stock; returns the ids that were short.
    pub async fn consume(&self, requests: &[RecipeLine]) -> Result<Vec<String>> {
        inventory::consume(&self.database, requests).await
    }

    /// Puts stock back; unknown ids are created from the configured defaults.
    pub async fn restore(&self, requests: &[StockRequest]) -> Result<()> {
        inventory::restore(&self.database, requests, &self.settings.inventory).await
    }

    // Dish catalog

    /// One dish with its recipe.
    pub async fn dish(&self, id: &str) -> Result<Option<Dish>> {
        catalog::get_dish(&self.database, id).await
    }

    /// Every dish, by name.
    pub async fn dishes(&self) -> Result<Vec<Dish>> {
        catalog::list_dishes(&self.database).await
    }

    /// Dishes of one meal category.
    pub async fn dishes_by_category(&self, category: MealCategory) -> Result<Vec<Dish>> {
        catalog::dishes_by_category(&self.database, category).await
    }

    /// Inserts or replaces a dish with its recipe.
    pub async fn save_dish(&self, dish: &Dish) -> Result<Dish> {
        catalog::save_dish(&self.database, dish).await
    }

    /// Deletes a dish from the catalog.
    pub async fn delete_dish(&self, id: &str) -> Result<()> {
        catalog::delete_dish(&self.database, id).await
    }

    // Weekly menu

    /// The menu of the week containing `week`, created empty on first use.
    pub async fn week_menu(&self, week: NaiveDate) -> Result<WeeklyMenu> {
        menu::load_week_menu(&self.database, week).await
    }

    /// Places a dish, consuming its recipe.
    pub async fn add_dish(
        &self,
        week: NaiveDate,
        day: Day,
        meal: MealCategory,
        dish_id: &str,
    ) -> Result<AddDishOutcome> {
        menu::add_dish_to_menu(&self.database, week, day, meal, dish_id).await
    }

    /// Removes a dish, giving its stock back.
    pub async fn remove_dish(
        &self,
        week: NaiveDate,
        day: Day,
        meal: MealCategory,
        dish_id: &str,
    ) -> Result<RemoveDishOutcome> {
        menu::remove_dish_from_menu(
            &self.database,
            week,
            day,
            meal,
            dish_id,
            &self.settings.inventory,
        )
        .await
    }

    /// Replaces every dish of a week.
    pub async fn replace_week_menu(&self, week: NaiveDate, days: &TemplateDays) -> Result<WeeklyMenu> {
        predefined::replace_week_menu(&self.database, week, days, &self.settings.inventory).await
    }

    // Predefined menus

    /// Saves a named template.
    pub async fn create_predefined_menu(&self, name: &str, days: TemplateDays) -> Result<MenuTemplate> {
        predefined::create_predefined_menu(&self.database, name, days).await
    }

    /// Every template, by name.
    pub async fn predefined_menus(&self) -> Result<Vec<MenuTemplate>> {
        predefined::list_predefined_menus(&self.database).await
    }

    /// One template.
    pub async fn predefined_menu(&self, id: &str) -> Result<MenuTemplate> {
        predefined::get_predefined_menu(&self.database, id).await
    }

    /// Deletes a template.
    pub async fn delete_predefined_menu(&self, id: &str) -> Result<()> {
        predefined::delete_predefined_menu(&self.database, id).await
    }

    /// Copies a template onto a week.
    pub async fn apply_predefined_menu(&self, id: &str, week: NaiveDate) -> Result<WeeklyMenu> {
        predefined::apply_predefined_menu(&self.database, id, week, &self.settings.inventory).await
    }

    // Shopping list

    /// Regenerates the week's shopping list.
    pub async fn generate_shopping_list(&self, week: NaiveDate) -> Result<ShoppingList> {
        shopping::generate_shopping_list(&self.database, week).await
    }

    /// The week's stored shopping list.
    pub async fn shopping_list(&self, week: NaiveDate) -> Result<Option<ShoppingList>> {
        shopping::get_shopping_list(&self.database, week).await
    }

    /// Flips an item's purchased flag.
    pub async fn toggle_item_purchased(&self, week: NaiveDate, index: usize) -> Result<ShoppingList> {
        shopping::toggle_item_purchased(&self.database, week, index).await
    }

    /// Appends a hand-entered item.
    pub async fn add_manual_item(&self, week: NaiveDate, item: ShoppingItem) -> Result<ShoppingList> {
        shopping::add_manual_item(&self.database, week, item).await
    }

    /// Removes an item.
    pub async fn remove_shopping_item(&self, week: NaiveDate, index: usize) -> Result<ShoppingList> {
        shopping::remove_item(&self.database, week, index).await
    }

    // Purchases

    /// Finalizes a completed shopping list.
    pub async fn complete_purchase(&self, week: NaiveDate) -> Result<Option<Purchase>> {
        purchase::complete_purchase(&self.database, week, &self.settings.inventory).await
    }

    /// The whole purchase ledger.
    pub async fn purchases(&self) -> Result<Vec<Purchase>> {
        purchase::list_purchases(&self.database).await
    }

    /// Purchases of one week.
    pub async fn purchases_for_week(&self, week: NaiveDate) -> Result<Vec<Purchase>> {
        purchase::purchases_for_week(&self.database, week).await
    }

    // Snapshots

    /// Exports the week's state, if it has a menu.
    pub async fn export_week(&self, week: NaiveDate) -> Result<Option<WeeklySnapshot>> {
        snapshot::export_week(&self.database, week).await
    }

    /// Imports a week's state.
    pub async fn import_week(&self, snapshot: &WeeklySnapshot) -> Result<ImportSummary> {
        snapshot::import_week(&self.database, snapshot).await
    }
}
