//! Purchase ledger - Completing a shopping list and the history of past trips.
//!
//! Completing a purchase folds the bought quantities back into the pantry,
//! appends an immutable ledger entry and clears the week's shopping list.

use crate::{
    config::settings::InventoryDefaults,
    core::{inventory, shopping, week},
    entities::{purchase, purchase_item},
    errors::Result,
    models::{Purchase, PurchaseItem, StockRequest},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

fn new_purchase_id() -> String {
    format!("purchase-{}", Uuid::new_v4().simple())
}

/// Appends a purchase and its items to the ledger.
pub(crate) async fn append_purchase<C>(db: &C, entry: &Purchase) -> Result<()>
where
    C: ConnectionTrait,
{
    purchase::ActiveModel {
        id: Set(entry.id.clone()),
        week: Set(entry.week_id),
        total_cost: Set(entry.total_cost),
        date: Set(entry.date),
    }
    .insert(db)
    .await?;

    for (position, item) in (0..).zip(&entry.items) {
        purchase_item::ActiveModel {
            purchase_id: Set(entry.id.clone()),
            position: Set(position),
            ingredient_id: Set(item.ingredient_id.clone()),
            name: Set(item.name.clone()),
            quantity: Set(item.quantity),
            unit: Set(item.unit.clone()),
            price_per_unit: Set(item.price_per_unit),
            total_price: Set(item.total_price),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

/// Whether the ledger already holds a purchase with this id.
pub(crate) async fn purchase_exists<C>(db: &C, id: &str) -> Result<bool>
where
    C: ConnectionTrait,
{
    Ok(purchase::Entity::find_by_id(id.to_string())
        .one(db)
        .await?
        .is_some())
}

async fn with_items<C>(db: &C, models: Vec<purchase::Model>) -> Result<Vec<Purchase>>
where
    C: ConnectionTrait,
{
    let ids: Vec<String> = models.iter().map(|model| model.id.clone()).collect();
    let mut items: HashMap<String, Vec<purchase_item::Model>> = HashMap::new();
    for item in purchase_item::Entity::find()
        .filter(purchase_item::Column::PurchaseId.is_in(ids))
        .order_by_asc(purchase_item::Column::Position)
        .all(db)
        .await?
    {
        items.entry(item.purchase_id.clone()).or_default().push(item);
    }

    Ok(models
        .into_iter()
        .map(|model| Purchase {
            items: items
                .remove(&model.id)
                .unwrap_or_default()
                .into_iter()
                .map(|item| PurchaseItem {
                    ingredient_id: item.ingredient_id,
                    name: item.name,
                    quantity: item.quantity,
                    unit: item.unit,
                    price_per_unit: item.price_per_unit,
                    total_price: item.total_price,
                })
                .collect(),
            id: model.id,
            week_id: model.week,
            total_cost: model.total_cost,
            date: model.date,
        })
        .collect())
}

/// Every purchase in the ledger, oldest first.
pub async fn list_purchases<C>(db: &C) -> Result<Vec<Purchase>>
where
    C: ConnectionTrait,
{
    let models = purchase::Entity::find()
        .order_by_asc(purchase::Column::Date)
        .all(db)
        .await?;
    with_items(db, models).await
}

/// The purchases made for one week, oldest first.
pub async fn purchases_for_week<C>(db: &C, week: NaiveDate) -> Result<Vec<Purchase>>
where
    C: ConnectionTrait,
{
    let models = purchase::Entity::find()
        .filter(purchase::Column::Week.eq(week::week_start(week)))
        .order_by_asc(purchase::Column::Date)
        .all(db)
        .await?;
    with_items(db, models).await
}

/// Finalizes the week's shopping list.
///
/// Returns `None` without changing anything unless the week has a list whose
/// items are all purchased. Otherwise, in one transaction:
/// - every purchased item is added to stock (unknown ingredient ids become new
///   pantry records, named and priced from the item)
/// - a purchase is appended to the ledger
/// - the shopping list is deleted, so the next generation starts fresh
pub async fn complete_purchase(
    db: &DatabaseConnection,
    week: NaiveDate,
    defaults: &InventoryDefaults,
) -> Result<Option<Purchase>> {
    let txn = db.begin().await?;

    let Some(list) = shopping::load_list(&txn, week).await? else {
        debug!("No shopping list for week {}", week::week_key(week));
        return Ok(None);
    };
    if !list.completed {
        debug!("Shopping list {} is not completed yet", list.id);
        return Ok(None);
    }

    let items: Vec<PurchaseItem> = list
        .items
        .iter()
        .filter(|item| item.purchased)
        .map(|item| PurchaseItem {
            ingredient_id: item.ingredient_id.clone(),
            name: item.name.clone(),
            quantity: item.quantity,
            unit: item.unit.clone(),
            price_per_unit: item.price_per_unit,
            total_price: item.quantity * item.price_per_unit,
        })
        .collect();

    let requests: Vec<StockRequest> = items
        .iter()
        .map(|item| StockRequest {
            ingredient_id: item.ingredient_id.clone(),
            name: Some(item.name.clone()),
            quantity: item.quantity,
            unit: Some(item.unit.clone()),
            price_per_unit: Some(item.price_per_unit),
        })
        .collect();
    inventory::restore(&txn, &requests, defaults).await?;

    let entry = Purchase {
        id: new_purchase_id(),
        week_id: list.week_id,
        total_cost: items.iter().map(|item| item.total_price).sum(),
        items,
        date: Utc::now(),
    };
    append_purchase(&txn, &entry).await?;
    shopping::delete_list(&txn, &list.id).await?;
    txn.commit().await?;

    info!(
        "Completed purchase {} for week {}: {} items, total {:.2}",
        entry.id,
        week::week_key(entry.week_id),
        entry.items.len(),
        entry.total_cost
    );
    Ok(Some(entry))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::menu,
        models::{Day, MealCategory, ShoppingItem},
        test_utils::*,
    };

    async fn plan_arroz_con_pollo(db: &DatabaseConnection) -> Result<()> {
        menu::add_dish_to_menu(
            db,
            test_week(),
            Day::Lunes,
            MealCategory::Almuerzo,
            "dish-002",
        )
        .await?;
        shopping::generate_shopping_list(db, test_week()).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_complete_purchase_folds_back_into_stock() -> Result<()> {
        let db = setup_kitchen().await?;
        let defaults = InventoryDefaults::default();
        plan_arroz_con_pollo(&db).await?;
        shopping::toggle_item_purchased(&db, test_week(), 0).await?;

        let entry = complete_purchase(&db, test_week(), &defaults)
            .await?
            .unwrap();

        assert!(entry.id.starts_with("purchase-"));
        assert_eq!(entry.week_id, test_week());
        assert_eq!(entry.items.len(), 1);
        assert!(approx_eq(entry.items[0].total_price, 1.5));
        assert!(approx_eq(entry.total_cost, 1.5));

        // 0.1 on hand + 0.3 bought
        assert_quantity(&db, "pollo-001", 0.4).await?;
        assert!(shopping::get_shopping_list(&db, test_week()).await?.is_none());

        let ledger = list_purchases(&db).await?;
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].items, entry.items);
        Ok(())
    }

    #[tokio::test]
    async fn test_complete_purchase_requires_completed_list() -> Result<()> {
        let db = setup_kitchen().await?;
        let defaults = InventoryDefaults::default();

        // No list at all
        assert!(complete_purchase(&db, test_week(), &defaults).await?.is_none());

        // List with an unpurchased item
        plan_arroz_con_pollo(&db).await?;
        assert!(complete_purchase(&db, test_week(), &defaults).await?.is_none());
        assert!(shopping::get_shopping_list(&db, test_week()).await?.is_some());
        assert_quantity(&db, "pollo-001", 0.1).await?;
        assert!(list_purchases(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_list_is_never_completed() -> Result<()> {
        let db = setup_kitchen().await?;
        shopping::generate_shopping_list(&db, test_week()).await?;

        let result = complete_purchase(&db, test_week(), &InventoryDefaults::default()).await?;
        assert!(result.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_manual_item_becomes_pantry_record() -> Result<()> {
        let db = setup_kitchen().await?;
        shopping::generate_shopping_list(&db, test_week()).await?;
        let list = shopping::add_manual_item(
            &db,
            test_week(),
            ShoppingItem {
                ingredient_id: "sal-001".to_string(),
                name: "Sal".to_string(),
                quantity: 1.0,
                unit: "paquete".to_string(),
                price_per_unit: 0.8,
                purchased: true,
            },
        )
        .await?;
        assert!(list.completed);

        complete_purchase(&db, test_week(), &InventoryDefaults::default()).await?;

        let sal = inventory::get_ingredient(&db, "sal-001").await?.unwrap();
        assert_eq!(sal.name, "Sal");
        assert_eq!(sal.unit, "paquete");
        assert!(approx_eq(sal.quantity, 1.0));
        assert!(approx_eq(sal.price_per_unit, 0.8));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_regenerates_after_purchase() -> Result<()> {
        let db = setup_kitchen().await?;
        plan_arroz_con_pollo(&db).await?;
        shopping::toggle_item_purchased(&db, test_week(), 0).await?;
        complete_purchase(&db, test_week(), &InventoryDefaults::default()).await?;

        // Pollo now covers the planned dish
        let list = shopping::generate_shopping_list(&db, test_week()).await?;
        assert!(list.items.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_purchases_for_week() -> Result<()> {
        let db = setup_kitchen().await?;
        let next_week = test_week() + chrono::Duration::days(7);

        for week in [test_week(), next_week] {
            append_purchase(
                &db,
                &Purchase {
                    id: new_purchase_id(),
                    week_id: week,
                    items: Vec::new(),
                    total_cost: 0.0,
                    date: Utc::now(),
                },
            )
            .await?;
        }

        // Any day of the week finds it
        let found = purchases_for_week(&db, next_week + chrono::Duration::days(2)).await?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].week_id, next_week);
        assert!(purchase_exists(&db, &found[0].id).await?);
        assert!(!purchase_exists(&db, "purchase-nope").await?);
        assert_eq!(list_purchases(&db).await?.len(), 2);
        Ok(())
    }
}
