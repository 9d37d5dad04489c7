//! Weekly snapshot - Export and import of one week's full state as JSON.
//!
//! A snapshot carries the week's menu, the whole pantry, the week's shopping
//! list and its purchases. Importing never overwrites pantry records or ledger
//! entries that already exist; only the menu of the week is replaced outright.

use crate::{
    core::{inventory, menu, purchase, shopping, week},
    entities::ingredient,
    errors::Result,
    models::{Purchase, ShoppingList, WeeklyMenu},
};
use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Everything known about one week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySnapshot {
    /// Monday of the week
    pub week: NaiveDate,
    /// The week's menu
    pub menu: WeeklyMenu,
    /// The whole pantry at export time
    #[serde(default)]
    pub inventory: Vec<ingredient::Model>,
    /// The week's shopping list; one with an empty id counts as absent
    #[serde(default)]
    pub shopping_list: Option<ShoppingList>,
    /// Purchases made for the week
    #[serde(default)]
    pub purchases: Vec<Purchase>,
}

/// What an import actually wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    /// Dishes on the imported menu
    pub dishes: usize,
    /// Pantry records that did not exist before
    pub ingredients_added: usize,
    /// Pantry records skipped because the id already existed
    pub ingredients_skipped: usize,
    /// Whether a shopping list was stored
    pub shopping_list_stored: bool,
    /// Ledger entries that did not exist before
    pub purchases_added: usize,
}

/// Collects the state of the week containing `week`.
///
/// Returns `None` when the week has never had a menu.
pub async fn export_week<C>(db: &C, week: NaiveDate) -> Result<Option<WeeklySnapshot>>
where
    C: ConnectionTrait,
{
    let Some(menu) = menu::find_week_menu(db, week).await? else {
        return Ok(None);
    };

    Ok(Some(WeeklySnapshot {
        week: menu.week,
        inventory: inventory::list_ingredients(db).await?,
        shopping_list: shopping::get_shopping_list(db, week).await?,
        purchases: purchase::purchases_for_week(db, week).await?,
        menu,
    }))
}

/// Applies a snapshot in one transaction:
/// - the week's menu is replaced (the pantry is not adjusted for it); dishes
///   must pass catalog validation and appear at most once per day
/// - shopping items must have an id, a name, a positive quantity and a
///   non-negative price
/// - pantry records are inserted only when their id is new
/// - a shopping list with a non-empty id replaces the week's list
/// - purchases are appended unless their id is already in the ledger
pub async fn import_week(db: &DatabaseConnection, snapshot: &WeeklySnapshot) -> Result<ImportSummary> {
    let monday = week::week_start(snapshot.week);
    let mut summary = ImportSummary::default();

    let txn = db.begin().await?;

    let mut imported_menu = snapshot.menu.clone();
    imported_menu.id = week::menu_id(monday);
    imported_menu.week = monday;
    menu::write_menu(&txn, &imported_menu).await?;
    summary.dishes = imported_menu.planned_dishes().count();

    for record in &snapshot.inventory {
        if inventory::get_ingredient(&txn, &record.id).await?.is_some() {
            summary.ingredients_skipped += 1;
        } else {
            inventory::upsert_ingredient(&txn, record.clone()).await?;
            summary.ingredients_added += 1;
        }
    }

    if let Some(list) = snapshot
        .shopping_list
        .as_ref()
        .filter(|list| !list.id.is_empty())
    {
        for item in &list.items {
            shopping::validate_item(item)?;
        }
        let mut list = list.clone();
        list.id = week::shopping_list_id(monday);
        list.week_id = monday;
        list.recompute();
        shopping::save_list(&txn, &list).await?;
        summary.shopping_list_stored = true;
    }

    for entry in &snapshot.purchases {
        if !purchase::purchase_exists(&txn, &entry.id).await? {
            purchase::append_purchase(&txn, entry).await?;
            summary.purchases_added += 1;
        }
    }

    txn.commit().await?;

    info!(
        "Imported week {}: {} dishes, {} new ingredients, {} new purchases",
        week::week_key(monday),
        summary.dishes,
        summary.ingredients_added,
        summary.purchases_added
    );
    Ok(summary)
}

/// Renders a snapshot as pretty-printed JSON.
pub fn to_json(snapshot: &WeeklySnapshot) -> Result<String> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

/// Parses a snapshot from JSON.
pub fn from_json(contents: &str) -> Result<WeeklySnapshot> {
    Ok(serde_json::from_str(contents)?)
}
