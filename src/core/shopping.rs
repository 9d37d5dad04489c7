//! Shopping list - The deficit between a week's menu and the pantry.
//!
//! A list is generated on demand, edited by hand (toggle, add, remove) and
//! finally consumed by [`crate::core::purchase::complete_purchase`]. There is at
//! most one stored list per week.

use crate::{
    core::{QUANTITY_EPSILON, inventory, menu, week},
    entities::{shopping_item, shopping_list},
    errors::{Error, Result},
    models::{ShoppingItem, ShoppingList},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

/// Name used for a needed ingredient with no stock record.
pub const UNKNOWN_INGREDIENT_NAME: &str = "Unknown ingredient";
/// Unit used for a needed ingredient with no stock record.
pub const UNKNOWN_INGREDIENT_UNIT: &str = "unit";

fn item_from_model(model: shopping_item::Model) -> ShoppingItem {
    ShoppingItem {
        ingredient_id: model.ingredient_id,
        name: model.name,
        quantity: model.quantity,
        unit: model.unit,
        price_per_unit: model.price_per_unit,
        purchased: model.purchased,
    }
}

/// Rejects items that could not be bought: no ingredient id or name, a
/// non-positive quantity, or a negative price.
pub(crate) fn validate_item(item: &ShoppingItem) -> Result<()> {
    if item.ingredient_id.trim().is_empty() || item.name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Shopping item needs an ingredient id and a name".to_string(),
        });
    }
    inventory::validate_quantity(item.quantity)?;
    inventory::validate_price(item.price_per_unit)
}

/// Reads the stored list of a week, if any.
pub(crate) async fn load_list<C>(db: &C, week: NaiveDate) -> Result<Option<ShoppingList>>
where
    C: ConnectionTrait,
{
    let Some(model) = shopping_list::Entity::find_by_id(week::shopping_list_id(week))
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    let items = shopping_item::Entity::find()
        .filter(shopping_item::Column::ListId.eq(model.id.as_str()))
        .order_by_asc(shopping_item::Column::Position)
        .all(db)
        .await?
        .into_iter()
        .map(item_from_model)
        .collect();

    Ok(Some(ShoppingList {
        id: model.id,
        week_id: model.week,
        items,
        total_cost: model.total_cost,
        completed: model.completed,
        created_at: model.created_at,
    }))
}

/// Deletes a stored list and its items. Returns whether anything was deleted.
pub(crate) async fn delete_list<C>(db: &C, list_id: &str) -> Result<bool>
where
    C: ConnectionTrait,
{
    shopping_item::Entity::delete_many()
        .filter(shopping_item::Column::ListId.eq(list_id))
        .exec(db)
        .await?;
    let result = shopping_list::Entity::delete_by_id(list_id.to_string())
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Stores a list, replacing whatever was stored under the same id.
pub(crate) async fn save_list<C>(db: &C, list: &ShoppingList) -> Result<()>
where
    C: ConnectionTrait,
{
    delete_list(db, &list.id).await?;

    shopping_list::ActiveModel {
        id: Set(list.id.clone()),
        week: Set(list.week_id),
        total_cost: Set(list.total_cost),
        completed: Set(list.completed),
        created_at: Set(list.created_at),
    }
    .insert(db)
    .await?;

    for (position, item) in (0..).zip(&list.items) {
        shopping_item::ActiveModel {
            list_id: Set(list.id.clone()),
            position: Set(position),
            ingredient_id: Set(item.ingredient_id.clone()),
            name: Set(item.name.clone()),
            quantity: Set(item.quantity),
            unit: Set(item.unit.clone()),
            price_per_unit: Set(item.price_per_unit),
            purchased: Set(item.purchased),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

/// Builds the week's shopping list from its menu and the current stock, and
/// stores it in place of any previous list for that week.
///
/// Every recipe line of every planned dish is summed per ingredient (in the order
/// ingredients are first met). An item is emitted only where the total exceeds
/// what is in stock, for the difference. Ingredients without a stock record get
/// placeholder name, unit and price.
pub async fn generate_shopping_list(db: &DatabaseConnection, week: NaiveDate) -> Result<ShoppingList> {
    let txn = db.begin().await?;
    let menu = menu::load_week_menu(&txn, week).await?;

    let mut required: Vec<(String, f64)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for (_, dish) in menu.planned_dishes() {
        for line in &dish.ingredients {
            match index.get(&line.ingredient_id) {
                Some(&i) => required[i].1 += line.quantity,
                None => {
                    index.insert(line.ingredient_id.clone(), required.len());
                    required.push((line.ingredient_id.clone(), line.quantity));
                }
            }
        }
    }

    let mut items = Vec::new();
    for (ingredient_id, needed) in required {
        let stock = inventory::get_ingredient(&txn, &ingredient_id).await?;
        let available = stock.as_ref().map_or(0.0, |ingredient| ingredient.quantity);
        let deficit = needed - available;
        if deficit <= QUANTITY_EPSILON {
            continue;
        }

        debug!("Need {deficit} more of {ingredient_id}");
        items.push(match stock {
            Some(ingredient) => ShoppingItem {
                ingredient_id,
                name: ingredient.name,
                quantity: deficit,
                unit: ingredient.unit,
                price_per_unit: ingredient.price_per_unit,
                purchased: false,
            },
            None => ShoppingItem {
                ingredient_id,
                name: UNKNOWN_INGREDIENT_NAME.to_string(),
                quantity: deficit,
                unit: UNKNOWN_INGREDIENT_UNIT.to_string(),
                price_per_unit: 0.0,
                purchased: false,
            },
        });
    }

    let mut list = ShoppingList {
        id: week::shopping_list_id(week),
        week_id: week::week_start(week),
        items,
        total_cost: 0.0,
        completed: false,
        created_at: Utc::now(),
    };
    list.recompute();
    save_list(&txn, &list).await?;
    txn.commit().await?;

    info!(
        "Generated shopping list {} with {} items, total {:.2}",
        list.id,
        list.items.len(),
        list.total_cost
    );
    Ok(list)
}

/// Returns the stored shopping list of a week, if one has been generated.
pub async fn get_shopping_list<C>(db: &C, week: NaiveDate) -> Result<Option<ShoppingList>>
where
    C: ConnectionTrait,
{
    load_list(db, week).await
}

/// Loads the week's list, applies `edit`, recomputes the totals and stores it.
async fn edit_list<F>(db: &DatabaseConnection, week: NaiveDate, edit: F) -> Result<ShoppingList>
where
    F: FnOnce(&mut ShoppingList) -> Result<()>,
{
    let txn = db.begin().await?;
    let mut list = load_list(&txn, week)
        .await?
        .ok_or_else(|| Error::ShoppingListNotFound {
            week: week::week_key(week),
        })?;

    edit(&mut list)?;
    list.recompute();
    save_list(&txn, &list).await?;
    txn.commit().await?;
    Ok(list)
}

/// Flips the `purchased` flag of the item at `index`.
///
/// # Errors
/// Returns [`Error::ShoppingListNotFound`] when the week has no list and
/// [`Error::ShoppingItemNotFound`] when `index` is out of range.
pub async fn toggle_item_purchased(
    db: &DatabaseConnection,
    week: NaiveDate,
    index: usize,
) -> Result<ShoppingList> {
    let list = edit_list(db, week, |list| {
        let item = list
            .items
            .get_mut(index)
            .ok_or(Error::ShoppingItemNotFound { index })?;
        item.purchased = !item.purchased;
        Ok(())
    })
    .await?;

    debug!("Toggled item {index} of {}", list.id);
    Ok(list)
}

/// Appends a hand-entered item to the week's list. An empty `ingredient_id`
/// gets a generated `manual-` id, so buying it creates a new pantry record.
///
/// # Errors
/// Returns a validation error for an empty name, a non-positive quantity or a
/// negative price, and [`Error::ShoppingListNotFound`] when the week has no list.
pub async fn add_manual_item(
    db: &DatabaseConnection,
    week: NaiveDate,
    mut item: ShoppingItem,
) -> Result<ShoppingList> {
    if item.ingredient_id.trim().is_empty() {
        item.ingredient_id = format!("manual-{}", Uuid::new_v4().simple());
    }
    validate_item(&item)?;

    let name = item.name.clone();
    let list = edit_list(db, week, move |list| {
        list.items.push(item);
        Ok(())
    })
    .await?;

    info!("Added {name} to {}", list.id);
    Ok(list)
}

/// Removes the item at `index` from the week's list.
///
/// # Errors
/// Same as [`toggle_item_purchased`].
pub async fn remove_item(
    db: &DatabaseConnection,
    week: NaiveDate,
    index: usize,
) -> Result<ShoppingList> {
    let list = edit_list(db, week, |list| {
        if index >= list.items.len() {
            return Err(Error::ShoppingItemNotFound { index });
        }
        list.items.remove(index);
        Ok(())
    })
    .await?;

    info!("Removed item {index} from {}", list.id);
    Ok(list)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        config::settings::InventoryDefaults,
        models::{Day, MealCategory},
        test_utils::*,
    };

    fn manual_item(name: &str, quantity: f64, price: f64) -> ShoppingItem {
        ShoppingItem {
            ingredient_id: String::new(),
            name: name.to_string(),
            quantity,
            unit: "unidades".to_string(),
            price_per_unit: price,
            purchased: false,
        }
    }

    #[tokio::test]
    async fn test_generate_reports_deficit() -> Result<()> {
        let db = setup_kitchen().await?;
        menu::add_dish_to_menu(
            &db,
            test_week(),
            Day::Lunes,
            MealCategory::Almuerzo,
            "dish-002",
        )
        .await?;

        let list = generate_shopping_list(&db, test_week()).await?;

        // Arroz (0.75 left) and aceite cover the recipe; pollo does not
        assert_eq!(list.id, "shopping-2024-03-04");
        assert_eq!(list.items.len(), 1);
        let pollo = &list.items[0];
        assert_eq!(pollo.ingredient_id, "pollo-001");
        assert_eq!(pollo.name, "Pollo");
        assert_eq!(pollo.unit, "kg");
        assert!(approx_eq(pollo.quantity, 0.3));
        assert!(approx_eq(list.total_cost, 1.5));
        assert!(!list.completed);
        Ok(())
    }

    #[tokio::test]
    async fn test_generate_uses_placeholders_for_unknown_ingredients() -> Result<()> {
        let db = setup_kitchen().await?;
        menu::add_dish_to_menu(&db, test_week(), Day::Lunes, MealCategory::Cena, "dish-004").await?;

        let list = generate_shopping_list(&db, test_week()).await?;

        assert_eq!(list.items.len(), 1);
        let frijoles = &list.items[0];
        assert_eq!(frijoles.ingredient_id, "frijoles-001");
        assert_eq!(frijoles.name, UNKNOWN_INGREDIENT_NAME);
        assert_eq!(frijoles.unit, UNKNOWN_INGREDIENT_UNIT);
        assert!(approx_eq(frijoles.quantity, 0.2));
        assert!(approx_eq(list.total_cost, 0.0));
        Ok(())
    }

    #[tokio::test]
    async fn test_generate_sums_requirements_across_week() -> Result<()> {
        let db = setup_kitchen().await?;
        for day in [Day::Lunes, Day::Martes, Day::Miercoles, Day::Jueves] {
            menu::add_dish_to_menu(&db, test_week(), day, MealCategory::Almuerzo, "dish-002")
                .await?;
        }
        // Four placements took 1 kg of arroz; four need another 1 kg
        assert_quantity(&db, "arroz-001", 0.0).await?;

        let list = generate_shopping_list(&db, test_week()).await?;
        let ids: Vec<_> = list.items.iter().map(|i| i.ingredient_id.as_str()).collect();
        assert_eq!(ids, vec!["arroz-001", "pollo-001"]);
        assert!(approx_eq(list.items[0].quantity, 1.0));
        assert!(approx_eq(list.items[1].quantity, 1.5));
        Ok(())
    }

    #[tokio::test]
    async fn test_generate_empty_menu_gives_empty_list() -> Result<()> {
        let db = setup_kitchen().await?;
        let list = generate_shopping_list(&db, test_week()).await?;
        assert!(list.items.is_empty());
        assert!(!list.completed);
        let stored = get_shopping_list(&db, test_week()).await?.unwrap();
        assert_eq!(stored.id, list.id);
        assert!(stored.items.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_generate_replaces_previous_list() -> Result<()> {
        let db = setup_kitchen().await?;
        menu::add_dish_to_menu(
            &db,
            test_week(),
            Day::Lunes,
            MealCategory::Almuerzo,
            "dish-002",
        )
        .await?;
        generate_shopping_list(&db, test_week()).await?;
        toggle_item_purchased(&db, test_week(), 0).await?;

        menu::remove_dish_from_menu(
            &db,
            test_week(),
            Day::Lunes,
            MealCategory::Almuerzo,
            "dish-002",
            &InventoryDefaults::default(),
        )
        .await?;
        let list = generate_shopping_list(&db, test_week()).await?;

        assert!(list.items.is_empty());
        assert_eq!(shopping_item::Entity::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_toggle_recomputes_completed() -> Result<()> {
        let db = setup_kitchen().await?;
        menu::add_dish_to_menu(
            &db,
            test_week(),
            Day::Lunes,
            MealCategory::Almuerzo,
            "dish-002",
        )
        .await?;
        generate_shopping_list(&db, test_week()).await?;
        add_manual_item(&db, test_week(), manual_item("Servilletas", 1.0, 2.0)).await?;

        let list = toggle_item_purchased(&db, test_week(), 0).await?;
        assert!(list.items[0].purchased);
        assert!(!list.completed);

        let list = toggle_item_purchased(&db, test_week(), 1).await?;
        assert!(list.completed);

        let list = toggle_item_purchased(&db, test_week(), 1).await?;
        assert!(!list.completed);

        let stored = get_shopping_list(&db, test_week()).await?.unwrap();
        assert_eq!(stored.items, list.items);
        assert!(!stored.completed);
        Ok(())
    }

    #[tokio::test]
    async fn test_toggle_out_of_range() -> Result<()> {
        let db = setup_kitchen().await?;
        generate_shopping_list(&db, test_week()).await?;

        let result = toggle_item_purchased(&db, test_week(), 3).await;
        assert!(matches!(
            result,
            Err(Error::ShoppingItemNotFound { index: 3 })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_edit_without_list() -> Result<()> {
        let db = setup_kitchen().await?;

        let result = toggle_item_purchased(&db, test_week(), 0).await;
        assert!(matches!(result, Err(Error::ShoppingListNotFound { week: _ })));

        let result = add_manual_item(&db, test_week(), manual_item("Pan", 1.0, 1.0)).await;
        assert!(matches!(result, Err(Error::ShoppingListNotFound { week: _ })));
        Ok(())
    }

    #[tokio::test]
    async fn test_add_manual_item_updates_total() -> Result<()> {
        let db = setup_kitchen().await?;
        generate_shopping_list(&db, test_week()).await?;

        let list = add_manual_item(&db, test_week(), manual_item("Pan", 2.0, 1.25)).await?;

        assert_eq!(list.items.len(), 1);
        assert!(list.items[0].ingredient_id.starts_with("manual-"));
        assert!(approx_eq(list.total_cost, 2.5));
        Ok(())
    }

    #[tokio::test]
    async fn test_add_manual_item_validation() -> Result<()> {
        let db = setup_kitchen().await?;
        generate_shopping_list(&db, test_week()).await?;

        let result = add_manual_item(&db, test_week(), manual_item("Pan", 0.0, 1.0)).await;
        assert!(matches!(result, Err(Error::InvalidQuantity { quantity: _ })));

        let result = add_manual_item(&db, test_week(), manual_item("Pan", 1.0, -1.0)).await;
        assert!(matches!(result, Err(Error::InvalidPrice { price: _ })));

        let result = add_manual_item(&db, test_week(), manual_item(" ", 1.0, 1.0)).await;
        assert!(matches!(result, Err(Error::Validation { message: _ })));

        let list = get_shopping_list(&db, test_week()).await?.unwrap();
        assert!(list.items.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_remove_item() -> Result<()> {
        let db = setup_kitchen().await?;
        generate_shopping_list(&db, test_week()).await?;
        add_manual_item(&db, test_week(), manual_item("Pan", 1.0, 1.0)).await?;
        add_manual_item(&db, test_week(), manual_item("Leche", 2.0, 0.5)).await?;

        let list = remove_item(&db, test_week(), 0).await?;
        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].name, "Leche");
        assert!(approx_eq(list.total_cost, 1.0));

        let result = remove_item(&db, test_week(), 5).await;
        assert!(matches!(
            result,
            Err(Error::ShoppingItemNotFound { index: 5 })
        ));
        Ok(())
    }
}
