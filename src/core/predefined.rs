//! Predefined menus - Named weekly templates, and replacing a whole week with one.
//!
//! Applying a template is treated as "remove everything, then add everything":
//! every dish on the week gives its stock back first, then every template dish is
//! placed with the usual consumption and shortage warnings.

use crate::{
    config::settings::InventoryDefaults,
    core::{catalog, menu, week},
    entities::{predefined_menu, predefined_menu_entry},
    errors::{Error, Result},
    models::{Day, MealCategory, WeeklyMenu},
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{info, warn};
use uuid::Uuid;

/// One slot of a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDish {
    /// Catalog dish to place
    pub dish_id: String,
    /// Meal slot
    pub meal: MealCategory,
}

impl TemplateDish {
    /// Builds a template slot.
    pub fn new(dish_id: impl Into<String>, meal: MealCategory) -> Self {
        Self {
            dish_id: dish_id.into(),
            meal,
        }
    }
}

/// Dishes of a template, per day.
pub type TemplateDays = BTreeMap<Day, Vec<TemplateDish>>;

/// A named weekly template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuTemplate {
    /// `template-<uuid>`
    pub id: String,
    /// Display name
    pub name: String,
    /// Planned dishes per day
    pub days: TemplateDays,
    /// When the template was created
    pub created_at: DateTime<Utc>,
    /// When the template was last saved
    pub updated_at: DateTime<Utc>,
}

/// Maps free-form day labels ("Miércoles", "LUNES") onto days. Labels that fold
/// to the same day are merged in the order given.
///
/// # Errors
/// Returns [`Error::InvalidDay`] for a label that is not a day name.
pub fn days_from_labels<I, S>(labels: I) -> Result<TemplateDays>
where
    I: IntoIterator<Item = (S, Vec<TemplateDish>)>,
    S: AsRef<str>,
{
    let mut days = TemplateDays::new();
    for (label, dishes) in labels {
        let day = Day::from_label(label.as_ref())?;
        days.entry(day).or_default().extend(dishes);
    }
    Ok(days)
}

async fn template_entries<C>(
    db: &C,
    ids: Vec<String>,
) -> Result<HashMap<String, Vec<predefined_menu_entry::Model>>>
where
    C: ConnectionTrait,
{
    let mut entries: HashMap<String, Vec<predefined_menu_entry::Model>> = HashMap::new();
    for entry in predefined_menu_entry::Entity::find()
        .filter(predefined_menu_entry::Column::MenuId.is_in(ids))
        .order_by_asc(predefined_menu_entry::Column::Id)
        .all(db)
        .await?
    {
        entries.entry(entry.menu_id.clone()).or_default().push(entry);
    }
    Ok(entries)
}

fn template_from_models(
    model: predefined_menu::Model,
    entries: Vec<predefined_menu_entry::Model>,
) -> Result<MenuTemplate> {
    let mut days = TemplateDays::new();
    for entry in entries {
        let day = Day::from_label(&entry.day)?;
        let meal = MealCategory::from_label(&entry.meal)?;
        days.entry(day)
            .or_default()
            .push(TemplateDish::new(entry.dish_id, meal));
    }

    Ok(MenuTemplate {
        id: model.id,
        name: model.name,
        days,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

/// Saves a new named template.
///
/// # Errors
/// Returns a validation error for an empty name and
/// [`Error::DishNotFound`] if a slot names a dish the catalog does not have.
pub async fn create_predefined_menu(
    db: &DatabaseConnection,
    name: &str,
    days: TemplateDays,
) -> Result<MenuTemplate> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation {
            message: "Predefined menu name cannot be empty".to_string(),
        });
    }

    let txn = db.begin().await?;
    for dish in days.values().flatten() {
        catalog::require_dish(&txn, &dish.dish_id).await?;
    }

    let now = Utc::now();
    let model = predefined_menu::ActiveModel {
        id: Set(format!("template-{}", Uuid::new_v4())),
        name: Set(name.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    for (day, dishes) in &days {
        for dish in dishes {
            predefined_menu_entry::ActiveModel {
                menu_id: Set(model.id.clone()),
                day: Set(day.as_str().to_string()),
                meal: Set(dish.meal.as_str().to_string()),
                dish_id: Set(dish.dish_id.clone()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }
    }
    txn.commit().await?;

    info!("Created predefined menu {} ({})", model.name, model.id);
    Ok(MenuTemplate {
        id: model.id,
        name: model.name,
        days,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

/// Every template, ordered by name.
pub async fn list_predefined_menus<C>(db: &C) -> Result<Vec<MenuTemplate>>
where
    C: ConnectionTrait,
{
    let models = predefined_menu::Entity::find()
        .order_by_asc(predefined_menu::Column::Name)
        .all(db)
        .await?;
    let ids = models.iter().map(|model| model.id.clone()).collect();
    let mut entries = template_entries(db, ids).await?;

    models
        .into_iter()
        .map(|model| {
            let slots = entries.remove(&model.id).unwrap_or_default();
            template_from_models(model, slots)
        })
        .collect()
}

/// Finds a template by id.
///
/// # Errors
/// Returns [`Error::PredefinedMenuNotFound`] for an unknown id.
pub async fn get_predefined_menu<C>(db: &C, id: &str) -> Result<MenuTemplate>
where
    C: ConnectionTrait,
{
    let model = predefined_menu::Entity::find_by_id(id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| Error::PredefinedMenuNotFound { id: id.to_string() })?;
    let mut entries = template_entries(db, vec![model.id.clone()]).await?;
    let slots = entries.remove(&model.id).unwrap_or_default();
    template_from_models(model, slots)
}

/// Deletes a template. Weeks it was applied to keep their dishes.
///
/// # Errors
/// Returns [`Error::PredefinedMenuNotFound`] for an unknown id.
pub async fn delete_predefined_menu(db: &DatabaseConnection, id: &str) -> Result<()> {
    let txn = db.begin().await?;
    predefined_menu_entry::Entity::delete_many()
        .filter(predefined_menu_entry::Column::MenuId.eq(id))
        .exec(&txn)
        .await?;
    let result = predefined_menu::Entity::delete_by_id(id.to_string())
        .exec(&txn)
        .await?;
    if result.rows_affected == 0 {
        return Err(Error::PredefinedMenuNotFound { id: id.to_string() });
    }
    txn.commit().await?;

    info!("Deleted predefined menu {id}");
    Ok(())
}

/// Replaces every dish of a week with the given ones.
///
/// All current dishes give back what they consumed, then the new dishes are
/// placed in day order, each consuming its recipe and recording its own
/// shortage warning. A dish repeated on the same day is placed once. The whole
/// replacement is one transaction: an unknown dish id leaves the week untouched.
///
/// # Errors
/// Returns [`Error::DishNotFound`] if any slot names an unknown dish.
pub async fn replace_week_menu(
    db: &DatabaseConnection,
    week: NaiveDate,
    days: &TemplateDays,
    defaults: &InventoryDefaults,
) -> Result<WeeklyMenu> {
    let txn = db.begin().await?;

    let model = menu::ensure_menu(&txn, week).await?;
    let cleared = menu::clear_menu(&txn, &model.id, defaults).await?;

    let mut placed = 0_usize;
    let mut short = 0_usize;
    for (day, dishes) in days {
        let mut seen: Vec<&str> = Vec::new();
        for slot in dishes {
            if seen.contains(&slot.dish_id.as_str()) {
                continue;
            }
            seen.push(&slot.dish_id);

            let dish = catalog::require_dish(&txn, &slot.dish_id).await?;
            let missing = menu::place_dish(&txn, &model.id, *day, slot.meal, &dish).await?;
            if !missing.is_empty() {
                warn!(
                    "{} on {day} is missing: {}",
                    dish.name,
                    missing.join(", ")
                );
                short += 1;
            }
            placed += 1;
        }
    }

    let menu = menu::read_menu(&txn, model).await?;
    txn.commit().await?;

    info!(
        "Replaced menu for week {}: {cleared} dishes removed, {placed} placed, {short} with shortages",
        week::week_key(week)
    );
    Ok(menu)
}

/// Copies a template onto a week, replacing what the week had.
///
/// # Errors
/// Returns [`Error::PredefinedMenuNotFound`] for an unknown template and
/// [`Error::DishNotFound`] if the template names a dish that no longer exists.
pub async fn apply_predefined_menu(
    db: &DatabaseConnection,
    id: &str,
    week: NaiveDate,
    defaults: &InventoryDefaults,
) -> Result<WeeklyMenu> {
    let template = get_predefined_menu(db, id).await?;
    info!("Applying predefined menu {} to week {}", template.name, week::week_key(week));
    replace_week_menu(db, week, &template.days, defaults).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{core::inventory, test_utils::*};

    fn sample_days() -> TemplateDays {
        days_from_labels([
            (
                "Lunes",
                vec![
                    TemplateDish::new("dish-001", MealCategory::Desayuno),
                    TemplateDish::new("dish-002", MealCategory::Almuerzo),
                ],
            ),
            ("MIÉRCOLES", vec![TemplateDish::new("dish-004", MealCategory::Cena)]),
        ])
        .unwrap()
    }

    #[test]
    fn test_days_from_labels_folds_and_merges() {
        let days = days_from_labels([
            ("Sábado", vec![TemplateDish::new("dish-001", MealCategory::Desayuno)]),
            ("sabado", vec![TemplateDish::new("dish-002", MealCategory::Almuerzo)]),
        ])
        .unwrap();

        assert_eq!(days.len(), 1);
        assert_eq!(days[&Day::Sabado].len(), 2);
        assert_eq!(days[&Day::Sabado][1].dish_id, "dish-002");

        let result = days_from_labels([("someday", Vec::new())]);
        assert!(matches!(result, Err(Error::InvalidDay { label: _ })));
    }

    #[tokio::test]
    async fn test_create_get_list_delete() -> Result<()> {
        let db = setup_kitchen().await?;

        let created = create_predefined_menu(&db, " Semana ligera ", sample_days()).await?;
        assert!(created.id.starts_with("template-"));
        assert_eq!(created.name, "Semana ligera");

        let found = get_predefined_menu(&db, &created.id).await?;
        assert_eq!(found.days, created.days);
        assert_eq!(found.days[&Day::Lunes][1].dish_id, "dish-002");

        create_predefined_menu(&db, "Arroz diario", TemplateDays::new()).await?;
        let names: Vec<_> = list_predefined_menus(&db)
            .await?
            .into_iter()
            .map(|template| template.name)
            .collect();
        assert_eq!(names, vec!["Arroz diario", "Semana ligera"]);

        delete_predefined_menu(&db, &created.id).await?;
        let result = get_predefined_menu(&db, &created.id).await;
        assert!(matches!(result, Err(Error::PredefinedMenuNotFound { id: _ })));
        let result = delete_predefined_menu(&db, &created.id).await;
        assert!(matches!(result, Err(Error::PredefinedMenuNotFound { id: _ })));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_dish_and_empty_name() -> Result<()> {
        let db = setup_kitchen().await?;

        let mut days = TemplateDays::new();
        days.insert(Day::Lunes, vec![TemplateDish::new("dish-999", MealCategory::Cena)]);
        let result = create_predefined_menu(&db, "Rota", days).await;
        assert!(matches!(result, Err(Error::DishNotFound { id: _ })));

        let result = create_predefined_menu(&db, "  ", TemplateDays::new()).await;
        assert!(matches!(result, Err(Error::Validation { message: _ })));

        assert!(list_predefined_menus(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_replace_restores_old_then_consumes_new() -> Result<()> {
        let db = setup_kitchen().await?;
        let defaults = InventoryDefaults::default();
        menu::add_dish_to_menu(
            &db,
            test_week(),
            Day::Viernes,
            MealCategory::Almuerzo,
            "dish-002",
        )
        .await?;
        assert_quantity(&db, "arroz-001", 0.75).await?;

        let mut days = TemplateDays::new();
        days.insert(Day::Martes, vec![TemplateDish::new("dish-004", MealCategory::Cena)]);
        let menu = replace_week_menu(&db, test_week(), &days, &defaults).await?;

        // 0.25 back from the old dish, 0.15 out for the new one
        assert_quantity(&db, "arroz-001", 0.85).await?;
        assert_quantity(&db, "aceite-001", 1.0).await?;
        assert!(menu.days[&Day::Viernes].is_empty());
        assert_eq!(menu.days[&Day::Martes][0].id, "dish-004");
        assert_eq!(
            menu.warning_for(Day::Martes, MealCategory::Cena, "dish-004"),
            Some(Some(&["frijoles-001".to_string()][..]))
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_replace_with_unknown_dish_changes_nothing() -> Result<()> {
        let db = setup_kitchen().await?;
        menu::add_dish_to_menu(
            &db,
            test_week(),
            Day::Lunes,
            MealCategory::Almuerzo,
            "dish-002",
        )
        .await?;

        let mut days = TemplateDays::new();
        days.insert(Day::Lunes, vec![TemplateDish::new("dish-999", MealCategory::Cena)]);
        let result = replace_week_menu(&db, test_week(), &days, &InventoryDefaults::default()).await;

        assert!(matches!(result, Err(Error::DishNotFound { id: _ })));
        assert_quantity(&db, "arroz-001", 0.75).await?;
        let menu = menu::load_week_menu(&db, test_week()).await?;
        assert_eq!(menu.days[&Day::Lunes].len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_apply_predefined_menu_twice_is_stable() -> Result<()> {
        let db = setup_kitchen().await?;
        let defaults = InventoryDefaults::default();
        let template = create_predefined_menu(&db, "Semana", sample_days()).await?;

        let first = apply_predefined_menu(&db, &template.id, test_week(), &defaults).await?;
        let stock_after_first = inventory::list_ingredients(&db).await?;
        let second = apply_predefined_menu(&db, &template.id, test_week(), &defaults).await?;
        let stock_after_second = inventory::list_ingredients(&db).await?;

        assert_eq!(first, second);
        assert_eq!(first.planned_dishes().count(), 3);
        for (a, b) in stock_after_first.iter().zip(&stock_after_second) {
            assert!(approx_eq(a.quantity, b.quantity), "{} drifted", a.id);
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_apply_unknown_template() -> Result<()> {
        let db = setup_kitchen().await?;
        let result =
            apply_predefined_menu(&db, "template-nope", test_week(), &InventoryDefaults::default())
                .await;
        assert!(matches!(result, Err(Error::PredefinedMenuNotFound { id: _ })));
        Ok(())
    }
}
