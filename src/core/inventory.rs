//! Ingredient store - Handles all inventory operations.
//!
//! The store is the single pantry shared by every week. Menu placement takes stock
//! out through [`consume`], removal and purchases put it back through [`restore`].
//! Neither ever drives a quantity below zero. All functions accept either a plain
//! connection or an open transaction, so the menu and shopping modules can run
//! them as one step of a larger atomic operation.

use crate::{
    config::settings::InventoryDefaults,
    core::QUANTITY_EPSILON,
    entities::{Ingredient, ingredient},
    errors::{Error, Result},
    models::{RecipeLine, StockRequest, fold_label},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Rejects zero, negative and non-finite quantities.
pub(crate) fn validate_quantity(quantity: f64) -> Result<()> {
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(Error::InvalidQuantity { quantity });
    }
    Ok(())
}

/// Rejects negative and non-finite prices.
pub(crate) fn validate_price(price: f64) -> Result<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(Error::InvalidPrice { price });
    }
    Ok(())
}

fn validate_ingredient(ingredient: &ingredient::Model) -> Result<()> {
    if ingredient.id.trim().is_empty() {
        return Err(Error::Validation {
            message: "Ingredient id cannot be empty".to_string(),
        });
    }
    if ingredient.name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Ingredient name cannot be empty".to_string(),
        });
    }
    // Stock may legitimately sit at zero
    if !ingredient.quantity.is_finite() || ingredient.quantity < 0.0 {
        return Err(Error::InvalidQuantity {
            quantity: ingredient.quantity,
        });
    }
    validate_price(ingredient.price_per_unit)?;
    if let Some(total) = ingredient.price_total {
        validate_price(total)?;
    }
    Ok(())
}

/// Retrieves the full inventory, ordered alphabetically by name.
pub async fn list_ingredients<C>(db: &C) -> Result<Vec<ingredient::Model>>
where
    C: ConnectionTrait,
{
    Ingredient::find()
        .order_by_asc(ingredient::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds an ingredient by id.
pub async fn get_ingredient<C>(db: &C, id: &str) -> Result<Option<ingredient::Model>>
where
    C: ConnectionTrait,
{
    Ingredient::find_by_id(id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves every ingredient of a pantry category, ordered by name.
pub async fn ingredients_by_category<C>(db: &C, category: &str) -> Result<Vec<ingredient::Model>>
where
    C: ConnectionTrait,
{
    Ingredient::find()
        .filter(ingredient::Column::Category.eq(category))
        .order_by_asc(ingredient::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Inserts an ingredient, or replaces the record with the same id.
///
/// # Errors
/// Returns an error if:
/// - The id or name is empty
/// - The quantity is negative or not finite
/// - A price is negative or not finite
/// - The database write fails
pub async fn upsert_ingredient<C>(
    db: &C,
    ingredient: ingredient::Model,
) -> Result<ingredient::Model>
where
    C: ConnectionTrait,
{
    validate_ingredient(&ingredient)?;

    let exists = Ingredient::find_by_id(ingredient.id.clone())
        .one(db)
        .await?
        .is_some();

    let active = ingredient::ActiveModel {
        id: Set(ingredient.id),
        name: Set(ingredient.name.trim().to_string()),
        quantity: Set(ingredient.quantity),
        unit: Set(ingredient.unit),
        price_per_unit: Set(ingredient.price_per_unit),
        category: Set(ingredient.category),
        is_package: Set(ingredient.is_package),
        price_total: Set(ingredient.price_total),
    };

    let saved = if exists {
        active.update(db).await?
    } else {
        active.insert(db).await?
    };
    debug!("Saved ingredient {} ({})", saved.id, saved.name);
    Ok(saved)
}

/// Deletes an ingredient.
///
/// # Errors
/// Returns [`Error::IngredientNotFound`] if no record has that id.
pub async fn remove_ingredient<C>(db: &C, id: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = Ingredient::delete_by_id(id.to_string()).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::IngredientNotFound { id: id.to_string() });
    }
    info!("Removed ingredient {id}");
    Ok(())
}

/// What a [`consume_lines`] call actually did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Consumption {
    /// Requests that were deducted in full
    pub consumed: Vec<RecipeLine>,
    /// Ingredient ids that were short or unknown, in request order
    pub missing: Vec<String>,
}

/// Takes each requested quantity out of stock and returns the ids that could not
/// be covered.
///
/// Requests are independent: an ingredient that is short (or unknown) is reported
/// and left untouched, while the others are still deducted. Nothing is rolled back
/// because of a shortage.
///
/// # Errors
/// Returns an error if any requested quantity is not positive (checked before any
/// stock moves) or if the database fails.
pub async fn consume<C>(db: &C, requests: &[RecipeLine]) -> Result<Vec<String>>
where
    C: ConnectionTrait,
{
    Ok(consume_lines(db, requests).await?.missing)
}

/// Same as [`consume`], but also reports which lines were deducted.
pub async fn consume_lines<C>(db: &C, requests: &[RecipeLine]) -> Result<Consumption>
where
    C: ConnectionTrait,
{
    for request in requests {
        validate_quantity(request.quantity)?;
    }

    let mut outcome = Consumption::default();
    for request in requests {
        let available = Ingredient::find_by_id(request.ingredient_id.clone())
            .one(db)
            .await?;

        match available {
            Some(item) if item.quantity + QUANTITY_EPSILON >= request.quantity => {
                let remaining = (item.quantity - request.quantity).max(0.0);
                let mut active: ingredient::ActiveModel = item.into();
                active.quantity = Set(remaining);
                active.update(db).await?;
                debug!(
                    "Consumed {} of {}, {remaining} left",
                    request.quantity, request.ingredient_id
                );
                outcome.consumed.push(request.clone());
            }
            Some(item) => {
                warn!(
                    "Short on {}: need {}, have {}",
                    item.id, request.quantity, item.quantity
                );
                outcome.missing.push(request.ingredient_id.clone());
            }
            None => {
                warn!("Ingredient {} is not in the inventory", request.ingredient_id);
                outcome.missing.push(request.ingredient_id.clone());
            }
        }
    }

    Ok(outcome)
}

/// Puts stock back. Known ingredients are incremented; unknown ids become new
/// inventory records built from the request and `defaults`.
///
/// # Errors
/// Returns an error if any quantity is not positive or the database fails.
pub async fn restore<C>(
    db: &C,
    requests: &[StockRequest],
    defaults: &InventoryDefaults,
) -> Result<()>
where
    C: ConnectionTrait,
{
    for request in requests {
        validate_quantity(request.quantity)?;
    }

    for request in requests {
        match Ingredient::find_by_id(request.ingredient_id.clone())
            .one(db)
            .await?
        {
            Some(item) => {
                let restored = item.quantity + request.quantity;
                let mut active: ingredient::ActiveModel = item.into();
                active.quantity = Set(restored);
                active.update(db).await?;
                debug!("Restored {} to {}", request.quantity, request.ingredient_id);
            }
            None => {
                let created = ingredient::ActiveModel {
                    id: Set(request.ingredient_id.clone()),
                    name: Set(request
                        .name
                        .clone()
                        .unwrap_or_else(|| defaults.name.clone())),
                    quantity: Set(request.quantity),
                    unit: Set(request
                        .unit
                        .clone()
                        .unwrap_or_else(|| defaults.unit.clone())),
                    price_per_unit: Set(request.price_per_unit.unwrap_or(defaults.price_per_unit)),
                    category: Set(defaults.category.clone()),
                    is_package: Set(false),
                    price_total: Set(None),
                }
                .insert(db)
                .await?;
                info!("Created inventory record {} ({})", created.id, created.name);
            }
        }
    }

    Ok(())
}

/// An ingredient entered without an id, as typed into a bulk pantry form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIngredient {
    /// Display name; also seeds the generated id
    pub name: String,
    /// Unit of measure
    pub unit: String,
    /// Quantity on hand
    pub quantity: f64,
    /// Whether the item is tracked per package
    #[serde(default)]
    pub is_package: bool,
    /// Price per unit (ignored for packages)
    #[serde(default)]
    pub price_per_unit: Option<f64>,
    /// Price of the whole package
    #[serde(default)]
    pub price_total: Option<f64>,
    /// Pantry category
    #[serde(default)]
    pub category: Option<String>,
}

fn generated_ingredient_id(name: &str) -> String {
    let folded = fold_label(name);
    let slug = folded
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    let slug = if slug.is_empty() { "item" } else { slug.as_str() };
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{slug}-{}", &suffix[..8])
}

/// Adds several ingredients at once, generating an id for each.
///
/// Package items are priced by `price_total` and carry a zero `price_per_unit`;
/// everything else is priced per unit. Items without a category land in
/// `defaults.category`.
///
/// The batch is all or nothing: one invalid item leaves the store unchanged.
pub async fn batch_add_ingredients(
    db: &DatabaseConnection,
    items: Vec<NewIngredient>,
    defaults: &InventoryDefaults,
) -> Result<Vec<ingredient::Model>> {
    let txn = db.begin().await?;
    let mut created = Vec::with_capacity(items.len());
    for item in items {
        let (price_per_unit, price_total) = if item.is_package {
            (0.0, Some(item.price_total.unwrap_or(0.0)))
        } else {
            (item.price_per_unit.unwrap_or(0.0), None)
        };

        let ingredient = ingredient::Model {
            id: generated_ingredient_id(&item.name),
            name: item.name,
            quantity: item.quantity,
            unit: item.unit,
            price_per_unit,
            category: item.category.unwrap_or_else(|| defaults.category.clone()),
            is_package: item.is_package,
            price_total,
        };
        created.push(upsert_ingredient(&txn, ingredient).await?);
    }
    txn.commit().await?;
    info!("Added {} ingredients", created.len());
    Ok(created)
}
