//! Shared test utilities for the meal planner.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{catalog, inventory},
    entities,
    errors::Result,
    models::{Dish, MealCategory, RecipeLine},
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// The Monday used throughout the tests (2024-03-04).
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn test_week() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
}

/// Builds an ingredient model without saving it.
///
/// # Defaults
/// * `unit`: "kg"
/// * `price_per_unit`: 0.0
/// * `category`: "otros"
/// * `is_package`: false
#[must_use]
pub fn test_ingredient_model(id: &str, name: &str, quantity: f64) -> entities::ingredient::Model {
    entities::ingredient::Model {
        id: id.to_string(),
        name: name.to_string(),
        quantity,
        unit: "kg".to_string(),
        price_per_unit: 0.0,
        category: "otros".to_string(),
        is_package: false,
        price_total: None,
    }
}

/// Creates a test ingredient with sensible defaults (see [`test_ingredient_model`]).
pub async fn create_test_ingredient(
    db: &DatabaseConnection,
    id: &str,
    name: &str,
    quantity: f64,
) -> Result<entities::ingredient::Model> {
    inventory::upsert_ingredient(db, test_ingredient_model(id, name, quantity)).await
}

/// Creates a test ingredient with a custom unit and price.
pub async fn create_priced_ingredient(
    db: &DatabaseConnection,
    id: &str,
    name: &str,
    quantity: f64,
    unit: &str,
    price_per_unit: f64,
) -> Result<entities::ingredient::Model> {
    let mut ingredient = test_ingredient_model(id, name, quantity);
    ingredient.unit = unit.to_string();
    ingredient.price_per_unit = price_per_unit;
    inventory::upsert_ingredient(db, ingredient).await
}

/// Creates a catalog dish with `servings` = 2.
///
/// # Arguments
/// * `lines` - `(ingredient_id, quantity)` pairs
pub async fn create_test_dish(
    db: &DatabaseConnection,
    id: &str,
    name: &str,
    category: MealCategory,
    lines: &[(&str, f64)],
) -> Result<Dish> {
    let dish = Dish {
        id: id.to_string(),
        name: name.to_string(),
        category,
        servings: 2,
        ingredients: lines
            .iter()
            .map(|(ingredient_id, quantity)| RecipeLine::new(*ingredient_id, *quantity))
            .collect(),
    };
    catalog::save_dish(db, &dish).await
}

/// Sets up the pantry and catalog used by most engine tests:
///
/// * `huevos-001` Huevos: 2
/// * `arroz-001` Arroz: 1 kg
/// * `pollo-001` Pollo: 0.1 kg at 5.0
/// * `aceite-001` Aceite: 1 litro
/// * `dish-001` Huevos Revueltos (desayuno): huevos 3, aceite 0.01
/// * `dish-002` Arroz con Pollo (almuerzo): arroz 0.25, pollo 0.4, aceite 0.02
/// * `dish-004` Frijoles con Arroz (cena): frijoles 0.2, arroz 0.15
pub async fn setup_kitchen() -> Result<DatabaseConnection> {
    let db = setup_test_db().await?;

    create_test_ingredient(&db, "huevos-001", "Huevos", 2.0).await?;
    create_test_ingredient(&db, "arroz-001", "Arroz", 1.0).await?;
    create_priced_ingredient(&db, "pollo-001", "Pollo", 0.1, "kg", 5.0).await?;
    create_priced_ingredient(&db, "aceite-001", "Aceite", 1.0, "litro", 2.0).await?;

    create_test_dish(
        &db,
        "dish-001",
        "Huevos Revueltos",
        MealCategory::Desayuno,
        &[("huevos-001", 3.0), ("aceite-001", 0.01)],
    )
    .await?;
    create_test_dish(
        &db,
        "dish-002",
        "Arroz con Pollo",
        MealCategory::Almuerzo,
        &[("arroz-001", 0.25), ("pollo-001", 0.4), ("aceite-001", 0.02)],
    )
    .await?;
    create_test_dish(
        &db,
        "dish-004",
        "Frijoles con Arroz",
        MealCategory::Cena,
        &[("frijoles-001", 0.2), ("arroz-001", 0.15)],
    )
    .await?;

    Ok(db)
}

/// Asserts an ingredient's stock within a small float tolerance.
#[allow(clippy::panic)]
pub async fn assert_quantity(db: &DatabaseConnection, id: &str, expected: f64) -> Result<()> {
    let Some(ingredient) = inventory::get_ingredient(db, id).await? else {
        panic!("ingredient {id} does not exist");
    };
    assert!(
        (ingredient.quantity - expected).abs() < 1e-9,
        "ingredient {id}: expected {expected}, found {}",
        ingredient.quantity
    );
    Ok(())
}

/// Float comparison with the same tolerance as [`assert_quantity`].
#[must_use]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
