//! Weekly menu - Placing and removing dishes, with the pantry kept in step.
//!
//! Every placement takes the dish's recipe out of the ingredient store and every
//! removal puts back what that placement took. A placement is never refused for
//! lack of stock: the short ingredients are recorded as a warning on the entry
//! and reported to the caller.

use crate::{
    config::settings::InventoryDefaults,
    core::{catalog, inventory, week},
    entities::{menu_entry, weekly_menu},
    errors::{Error, Result},
    models::{
        AddDishOutcome, Day, Dish, MealCategory, RecipeLine, RemoveDishOutcome, StockRequest,
        WeeklyMenu,
    },
};
use chrono::{NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Finds the menu record of a week, creating an empty one if needed.
pub(crate) async fn ensure_menu<C>(db: &C, week: NaiveDate) -> Result<weekly_menu::Model>
where
    C: ConnectionTrait,
{
    let id = week::menu_id(week);
    if let Some(existing) = weekly_menu::Entity::find_by_id(id.clone()).one(db).await? {
        return Ok(existing);
    }

    let created = weekly_menu::ActiveModel {
        id: Set(id),
        week: Set(week::week_start(week)),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await?;
    debug!("Created empty menu {}", created.id);
    Ok(created)
}

async fn menu_entries<C>(db: &C, menu_id: &str) -> Result<Vec<menu_entry::Model>>
where
    C: ConnectionTrait,
{
    Ok(menu_entry::Entity::find()
        .filter(menu_entry::Column::MenuId.eq(menu_id))
        .order_by_asc(menu_entry::Column::Id)
        .all(db)
        .await?)
}

fn dish_from_entry(entry: &menu_entry::Model, meal: MealCategory) -> Result<Dish> {
    let ingredients: Vec<RecipeLine> = serde_json::from_str(&entry.recipe)?;
    Ok(Dish {
        id: entry.dish_id.clone(),
        name: entry.dish_name.clone(),
        category: meal,
        servings: u32::try_from(entry.servings).unwrap_or_default(),
        ingredients,
    })
}

fn missing_from_entry(entry: &menu_entry::Model) -> Result<Option<Vec<String>>> {
    entry
        .missing_ingredients
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .map_err(Into::into)
}

/// Builds the domain menu from its record and entries.
pub(crate) async fn read_menu<C>(db: &C, model: weekly_menu::Model) -> Result<WeeklyMenu>
where
    C: ConnectionTrait,
{
    let mut menu = WeeklyMenu::empty(model.id, model.week);

    for entry in menu_entries(db, &menu.id).await? {
        let day = Day::from_label(&entry.day)?;
        let meal = MealCategory::from_label(&entry.meal)?;
        let dish = dish_from_entry(&entry, meal)?;
        let missing = missing_from_entry(&entry)?;

        menu.warnings
            .entry(day)
            .or_default()
            .entry(meal)
            .or_default()
            .insert(dish.id.clone(), missing);
        menu.days.entry(day).or_default().push(dish);
    }

    Ok(menu)
}

/// Returns the stored menu of a week without creating one.
pub async fn find_week_menu<C>(db: &C, week: NaiveDate) -> Result<Option<WeeklyMenu>>
where
    C: ConnectionTrait,
{
    match weekly_menu::Entity::find_by_id(week::menu_id(week))
        .one(db)
        .await?
    {
        Some(model) => read_menu(db, model).await.map(Some),
        None => Ok(None),
    }
}

/// Returns the menu of the week containing `week`, creating an empty one the
/// first time. Calling it again returns the same menu.
pub async fn load_week_menu<C>(db: &C, week: NaiveDate) -> Result<WeeklyMenu>
where
    C: ConnectionTrait,
{
    let model = ensure_menu(db, week).await?;
    read_menu(db, model).await
}

/// Display names of the given ingredient ids, falling back to the id itself.
/// Repeated ids are reported once.
async fn ingredient_names<C>(db: &C, ids: &[String]) -> Result<Vec<String>>
where
    C: ConnectionTrait,
{
    let mut names: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        let name = inventory::get_ingredient(db, id)
            .await?
            .map_or_else(|| id.clone(), |ingredient| ingredient.name);
        if !names.contains(&name) {
            names.push(name);
        }
    }
    Ok(names)
}

/// Consumes a dish's recipe and records it on the menu. Returns the names of the
/// ingredients that were short.
pub(crate) async fn place_dish<C>(
    db: &C,
    menu_id: &str,
    day: Day,
    meal: MealCategory,
    dish: &Dish,
) -> Result<Vec<String>>
where
    C: ConnectionTrait,
{
    let consumption = inventory::consume_lines(db, &dish.ingredients).await?;
    let missing = ingredient_names(db, &consumption.missing).await?;

    menu_entry::ActiveModel {
        menu_id: Set(menu_id.to_string()),
        day: Set(day.as_str().to_string()),
        meal: Set(meal.as_str().to_string()),
        dish_id: Set(dish.id.clone()),
        dish_name: Set(dish.name.clone()),
        servings: Set(i32::try_from(dish.servings).unwrap_or(i32::MAX)),
        recipe: Set(serde_json::to_string(&dish.ingredients)?),
        consumed: Set(serde_json::to_string(&consumption.consumed)?),
        missing_ingredients: Set(if missing.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&missing)?)
        }),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(missing)
}

/// Gives back what an entry's placement consumed and deletes the entry.
pub(crate) async fn take_back<C>(
    db: &C,
    entry: menu_entry::Model,
    defaults: &InventoryDefaults,
) -> Result<Dish>
where
    C: ConnectionTrait,
{
    let meal = MealCategory::from_label(&entry.meal)?;
    let dish = dish_from_entry(&entry, meal)?;
    let consumed: Vec<RecipeLine> = serde_json::from_str(&entry.consumed)?;
    let requests: Vec<StockRequest> = consumed.iter().map(StockRequest::from).collect();

    inventory::restore(db, &requests, defaults).await?;
    menu_entry::Entity::delete_by_id(entry.id).exec(db).await?;
    Ok(dish)
}

/// Takes every dish off a menu, giving all consumed stock back.
pub(crate) async fn clear_menu<C>(
    db: &C,
    menu_id: &str,
    defaults: &InventoryDefaults,
) -> Result<usize>
where
    C: ConnectionTrait,
{
    let entries = menu_entries(db, menu_id).await?;
    let count = entries.len();
    for entry in entries {
        take_back(db, entry, defaults).await?;
    }
    Ok(count)
}

/// Overwrites a menu with the given content without touching the pantry.
///
/// Used when restoring a snapshot, whose inventory already reflects the menu;
/// each entry is recorded as having consumed its whole recipe.
///
/// # Errors
/// Rejects the whole menu if a dish fails catalog validation (empty id or name,
/// zero servings, non-positive quantities) or appears twice on the same day.
pub(crate) async fn write_menu<C>(db: &C, menu: &WeeklyMenu) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut seen: HashSet<(Day, &str)> = HashSet::new();
    for (day, dish) in menu.planned_dishes() {
        catalog::validate_dish(dish)?;
        if !seen.insert((day, dish.id.as_str())) {
            return Err(Error::Validation {
                message: format!("Dish {} appears twice on {day}", dish.id),
            });
        }
    }

    let model = ensure_menu(db, menu.week).await?;
    menu_entry::Entity::delete_many()
        .filter(menu_entry::Column::MenuId.eq(model.id.as_str()))
        .exec(db)
        .await?;

    for (day, dish) in menu.planned_dishes() {
        let missing = menu
            .warning_for(day, dish.category, &dish.id)
            .flatten()
            .filter(|names| !names.is_empty())
            .map(serde_json::to_string)
            .transpose()?;
        let recipe = serde_json::to_string(&dish.ingredients)?;

        menu_entry::ActiveModel {
            menu_id: Set(model.id.clone()),
            day: Set(day.as_str().to_string()),
            meal: Set(dish.category.as_str().to_string()),
            dish_id: Set(dish.id.clone()),
            dish_name: Set(dish.name.clone()),
            servings: Set(i32::try_from(dish.servings).unwrap_or(i32::MAX)),
            consumed: Set(recipe.clone()),
            recipe: Set(recipe),
            missing_ingredients: Set(missing),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

/// Places a catalog dish on a day and meal of a week, consuming its recipe.
///
/// A dish already planned for that day is left as it is: nothing is consumed
/// again and the outcome has `added == false` with the warning recorded when
/// it was first placed.
///
/// # Errors
/// Returns [`crate::errors::Error::DishNotFound`] for an unknown dish id, or a
/// database error (in which case neither the menu nor the pantry changed).
pub async fn add_dish_to_menu(
    db: &DatabaseConnection,
    week: NaiveDate,
    day: Day,
    meal: MealCategory,
    dish_id: &str,
) -> Result<AddDishOutcome> {
    let txn = db.begin().await?;

    let dish = catalog::require_dish(&txn, dish_id).await?;
    let model = ensure_menu(&txn, week).await?;

    let existing = menu_entry::Entity::find()
        .filter(menu_entry::Column::MenuId.eq(model.id.as_str()))
        .filter(menu_entry::Column::Day.eq(day.as_str()))
        .filter(menu_entry::Column::DishId.eq(dish_id))
        .order_by_asc(menu_entry::Column::Id)
        .one(&txn)
        .await?;

    if let Some(entry) = existing {
        let missing = missing_from_entry(&entry)?.unwrap_or_default();
        let menu = read_menu(&txn, model).await?;
        txn.commit().await?;
        debug!("Dish {dish_id} is already planned for {day}");
        return Ok(AddDishOutcome {
            warning: !missing.is_empty(),
            missing_ingredients: missing,
            added: false,
            menu,
        });
    }

    let missing = place_dish(&txn, &model.id, day, meal, &dish).await?;
    let menu = read_menu(&txn, model).await?;
    txn.commit().await?;

    if missing.is_empty() {
        info!("Planned {} for {day} {meal}", dish.name);
    } else {
        warn!(
            "Planned {} for {day} {meal} with missing ingredients: {}",
            dish.name,
            missing.join(", ")
        );
    }

    Ok(AddDishOutcome {
        warning: !missing.is_empty(),
        missing_ingredients: missing,
        added: true,
        menu,
    })
}

/// Removes a dish from a day and meal, giving back the stock its placement took.
///
/// Every recipe line that was deducted when the dish was placed is credited in
/// full. Lines that were short at placement were never deducted, so they are not
/// credited; placing and removing a dish always leaves stock where it started.
///
/// Nothing matching is a no-op that returns `removed: None` and the unchanged menu.
pub async fn remove_dish_from_menu(
    db: &DatabaseConnection,
    week: NaiveDate,
    day: Day,
    meal: MealCategory,
    dish_id: &str,
    defaults: &InventoryDefaults,
) -> Result<RemoveDishOutcome> {
    let txn = db.begin().await?;

    let model = ensure_menu(&txn, week).await?;
    let entry = menu_entry::Entity::find()
        .filter(menu_entry::Column::MenuId.eq(model.id.as_str()))
        .filter(menu_entry::Column::Day.eq(day.as_str()))
        .filter(menu_entry::Column::Meal.eq(meal.as_str()))
        .filter(menu_entry::Column::DishId.eq(dish_id))
        .order_by_asc(menu_entry::Column::Id)
        .one(&txn)
        .await?;

    let removed = match entry {
        Some(entry) => Some(take_back(&txn, entry, defaults).await?),
        None => None,
    };
    let menu = read_menu(&txn, model).await?;
    txn.commit().await?;

    match &removed {
        Some(dish) => info!("Removed {} from {day} {meal}", dish.name),
        None => debug!("No {dish_id} planned for {day} {meal}"),
    }
    Ok(RemoveDishOutcome { removed, menu })
}
