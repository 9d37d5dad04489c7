//! Dish catalog - Recipe lookups and management.
//!
//! The reconciliation engine only reads from here. Menu entries keep their own
//! copy of a dish, so editing or deleting a recipe never changes what an already
//! planned dish gives back on removal.

use crate::{
    core::inventory::validate_quantity,
    entities::{dish, dish_ingredient},
    errors::{Error, Result},
    models::{Dish, MealCategory, RecipeLine},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::HashMap;
use tracing::info;

fn dish_from_models(
    model: dish::Model,
    mut lines: Vec<dish_ingredient::Model>,
) -> Result<Dish> {
    lines.sort_by_key(|line| line.position);
    let servings = u32::try_from(model.servings).map_err(|_| Error::Validation {
        message: format!("Dish {} has invalid servings {}", model.id, model.servings),
    })?;

    Ok(Dish {
        category: MealCategory::from_label(&model.category)?,
        id: model.id,
        name: model.name,
        servings,
        ingredients: lines
            .into_iter()
            .map(|line| RecipeLine::new(line.ingredient_id, line.quantity))
            .collect(),
    })
}

/// Checks a dish before it is stored.
pub(crate) fn validate_dish(dish: &Dish) -> Result<()> {
    if dish.id.trim().is_empty() {
        return Err(Error::Validation {
            message: "Dish id cannot be empty".to_string(),
        });
    }
    if dish.name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Dish name cannot be empty".to_string(),
        });
    }
    if dish.servings == 0 {
        return Err(Error::Validation {
            message: "Dish must serve at least one person".to_string(),
        });
    }
    for line in &dish.ingredients {
        if line.ingredient_id.trim().is_empty() {
            return Err(Error::Validation {
                message: "Recipe line must name an ingredient".to_string(),
            });
        }
        validate_quantity(line.quantity)?;
    }
    Ok(())
}

/// Finds a dish by id, with its recipe lines.
pub async fn get_dish<C>(db: &C, id: &str) -> Result<Option<Dish>>
where
    C: ConnectionTrait,
{
    let Some(model) = dish::Entity::find_by_id(id.to_string()).one(db).await? else {
        return Ok(None);
    };
    let lines = dish_ingredient::Entity::find()
        .filter(dish_ingredient::Column::DishId.eq(id))
        .order_by_asc(dish_ingredient::Column::Position)
        .all(db)
        .await?;
    dish_from_models(model, lines).map(Some)
}

/// Like [`get_dish`], but an unknown id is an error.
///
/// # Errors
/// Returns [`Error::DishNotFound`] if the catalog has no such dish.
pub async fn require_dish<C>(db: &C, id: &str) -> Result<Dish>
where
    C: ConnectionTrait,
{
    get_dish(db, id)
        .await?
        .ok_or_else(|| Error::DishNotFound { id: id.to_string() })
}

async fn with_recipes<C>(db: &C, models: Vec<dish::Model>) -> Result<Vec<Dish>>
where
    C: ConnectionTrait,
{
    let ids: Vec<String> = models.iter().map(|model| model.id.clone()).collect();
    let mut lines: HashMap<String, Vec<dish_ingredient::Model>> = HashMap::new();
    for line in dish_ingredient::Entity::find()
        .filter(dish_ingredient::Column::DishId.is_in(ids))
        .all(db)
        .await?
    {
        lines.entry(line.dish_id.clone()).or_default().push(line);
    }

    models
        .into_iter()
        .map(|model| {
            let recipe = lines.remove(&model.id).unwrap_or_default();
            dish_from_models(model, recipe)
        })
        .collect()
}

/// Retrieves every dish in the catalog, ordered by name.
pub async fn list_dishes<C>(db: &C) -> Result<Vec<Dish>>
where
    C: ConnectionTrait,
{
    let models = dish::Entity::find()
        .order_by_asc(dish::Column::Name)
        .all(db)
        .await?;
    with_recipes(db, models).await
}

/// Retrieves the dishes of one meal category, ordered by name.
pub async fn dishes_by_category<C>(db: &C, category: MealCategory) -> Result<Vec<Dish>>
where
    C: ConnectionTrait,
{
    let models = dish::Entity::find()
        .filter(dish::Column::Category.eq(category.as_str()))
        .order_by_asc(dish::Column::Name)
        .all(db)
        .await?;
    with_recipes(db, models).await
}

/// Inserts a dish, or replaces the dish with the same id together with its
/// whole recipe.
///
/// # Errors
/// Returns an error if:
/// - The id or name is empty, or servings is zero
/// - A recipe line has an empty ingredient id or a non-positive quantity
/// - The database write fails (nothing is saved in that case)
pub async fn save_dish(db: &DatabaseConnection, dish: &Dish) -> Result<Dish> {
    validate_dish(dish)?;
    let servings = i32::try_from(dish.servings).map_err(|_| Error::Validation {
        message: format!("Too many servings: {}", dish.servings),
    })?;

    let txn = db.begin().await?;

    let exists = dish::Entity::find_by_id(dish.id.clone())
        .one(&txn)
        .await?
        .is_some();
    let active = dish::ActiveModel {
        id: Set(dish.id.clone()),
        name: Set(dish.name.trim().to_string()),
        category: Set(dish.category.as_str().to_string()),
        servings: Set(servings),
    };
    if exists {
        active.update(&txn).await?;
    } else {
        active.insert(&txn).await?;
    }

    dish_ingredient::Entity::delete_many()
        .filter(dish_ingredient::Column::DishId.eq(dish.id.as_str()))
        .exec(&txn)
        .await?;
    for (position, line) in (0..).zip(&dish.ingredients) {
        dish_ingredient::ActiveModel {
            dish_id: Set(dish.id.clone()),
            ingredient_id: Set(line.ingredient_id.clone()),
            quantity: Set(line.quantity),
            position: Set(position),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    let saved = require_dish(&txn, &dish.id).await?;
    txn.commit().await?;

    info!("Saved dish {} ({})", saved.id, saved.name);
    Ok(saved)
}

/// Deletes a dish and its recipe. Menus that already hold the dish keep their copy.
///
/// # Errors
/// Returns [`Error::DishNotFound`] if the catalog has no such dish.
pub async fn delete_dish(db: &DatabaseConnection, id: &str) -> Result<()> {
    let txn = db.begin().await?;

    dish_ingredient::Entity::delete_many()
        .filter(dish_ingredient::Column::DishId.eq(id))
        .exec(&txn)
        .await?;
    let result = dish::Entity::delete_by_id(id.to_string()).exec(&txn).await?;
    if result.rows_affected == 0 {
        return Err(Error::DishNotFound { id: id.to_string() });
    }

    txn.commit().await?;
    info!("Deleted dish {id}");
    Ok(())
}
