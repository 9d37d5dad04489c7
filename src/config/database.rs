//! Database configuration module for the meal planner.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the database schema always matches the Rust structs without hand-written SQL.
//! Creation is `IF NOT EXISTS`, which makes it safe to run on every startup.

use crate::entities::{
    Dish, DishIngredient, Ingredient, MenuEntry, PredefinedMenu, PredefinedMenuEntry, Purchase,
    PurchaseItem, ShoppingItem, ShoppingList, WeeklyMenu,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use std::path::Path;
use tracing::{debug, info};

/// Used when neither `DATABASE_URL` nor the settings file names a database.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/meal_planner.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable, then the
/// settings file value, then [`DEFAULT_DATABASE_URL`].
#[must_use]
pub fn get_database_url(configured: Option<&str>) -> String {
    std::env::var("DATABASE_URL")
        .ok()
        .or_else(|| configured.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
}

/// The file path of a `sqlite:` URL, or `None` for in-memory databases.
fn sqlite_file_path(database_url: &str) -> Option<&Path> {
    let rest = database_url.strip_prefix("sqlite:")?;
    let rest = rest.trim_start_matches("//");
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path.starts_with(":memory:") {
        None
    } else {
        Some(Path::new(path))
    }
}

/// Creates the directory that will hold a `SQLite` database file, if needed.
pub fn ensure_database_dir(database_url: &str) -> Result<()> {
    if let Some(parent) = sqlite_file_path(database_url)
        .and_then(Path::parent)
        .filter(|parent| !parent.as_os_str().is_empty())
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Establishes a connection to the database at `database_url`, creating the
/// directory of a `SQLite` file first.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    ensure_database_dir(database_url)?;
    debug!("Connecting to database at {database_url}");
    Database::connect(database_url).await.map_err(Into::into)
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all tables that do not exist yet. Parents are created before the
/// tables that reference them.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, Ingredient).await?;
    create_table(db, &schema, Dish).await?;
    create_table(db, &schema, DishIngredient).await?;
    create_table(db, &schema, WeeklyMenu).await?;
    create_table(db, &schema, MenuEntry).await?;
    create_table(db, &schema, ShoppingList).await?;
    create_table(db, &schema, ShoppingItem).await?;
    create_table(db, &schema, Purchase).await?;
    create_table(db, &schema, PurchaseItem).await?;
    create_table(db, &schema, PredefinedMenu).await?;
    create_table(db, &schema, PredefinedMenuEntry).await?;

    info!("Database schema is up to date");
    Ok(())
}
