//! Domain types shared by the engine, its callers, and the weekly snapshot format.
//!
//! These are plain serde structs. The entity layer stores them in normalized
//! tables; the engine hands them back to callers as the "new snapshot" after
//! every mutation. JSON field names follow the planner's external format
//! (`camelCase`, Spanish day and meal labels).

use crate::errors::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Inventory records are used as-is from the entity layer.
pub use crate::entities::ingredient::Model as Ingredient;

/// Lowercases a label and strips the Spanish diacritics, so `"Miércoles"`
/// and `"MIERCOLES"` compare equal.
pub(crate) fn fold_label(label: &str) -> String {
    label
        .trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            other => other,
        })
        .collect()
}

/// The seven canonical days of a weekly menu, Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Day {
    /// Monday
    Lunes,
    /// Tuesday
    Martes,
    /// Wednesday
    Miercoles,
    /// Thursday
    Jueves,
    /// Friday
    Viernes,
    /// Saturday
    Sabado,
    /// Sunday
    Domingo,
}

impl Day {
    /// All days in menu order.
    pub const ALL: [Self; 7] = [
        Self::Lunes,
        Self::Martes,
        Self::Miercoles,
        Self::Jueves,
        Self::Viernes,
        Self::Sabado,
        Self::Domingo,
    ];

    /// Canonical storage label (lowercase, no accents).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lunes => "lunes",
            Self::Martes => "martes",
            Self::Miercoles => "miercoles",
            Self::Jueves => "jueves",
            Self::Viernes => "viernes",
            Self::Sabado => "sabado",
            Self::Domingo => "domingo",
        }
    }

    /// Parses a day name regardless of case or accents.
    pub fn from_label(label: &str) -> Result<Self> {
        let folded = fold_label(label);
        Self::ALL
            .into_iter()
            .find(|day| day.as_str() == folded)
            .ok_or_else(|| Error::InvalidDay {
                label: label.to_string(),
            })
    }

    /// Maps a chrono weekday onto the menu day.
    #[must_use]
    pub const fn from_weekday(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => Self::Lunes,
            Weekday::Tue => Self::Martes,
            Weekday::Wed => Self::Miercoles,
            Weekday::Thu => Self::Jueves,
            Weekday::Fri => Self::Viernes,
            Weekday::Sat => Self::Sabado,
            Weekday::Sun => Self::Domingo,
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Day {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_label(s)
    }
}

/// Meal slots, in the order they happen during the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealCategory {
    /// Breakfast
    Desayuno,
    /// Mid-morning snack
    Merienda,
    /// Lunch
    Almuerzo,
    /// Afternoon coffee
    Cafe,
    /// Dinner
    Cena,
}

impl MealCategory {
    /// All meal categories in daily order.
    pub const ALL: [Self; 5] = [
        Self::Desayuno,
        Self::Merienda,
        Self::Almuerzo,
        Self::Cafe,
        Self::Cena,
    ];

    /// Canonical storage label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Desayuno => "desayuno",
            Self::Merienda => "merienda",
            Self::Almuerzo => "almuerzo",
            Self::Cafe => "cafe",
            Self::Cena => "cena",
        }
    }

    /// Parses a meal label regardless of case or accents (`"Café"` works).
    pub fn from_label(label: &str) -> Result<Self> {
        let folded = fold_label(label);
        Self::ALL
            .into_iter()
            .find(|meal| meal.as_str() == folded)
            .ok_or_else(|| Error::InvalidMealCategory {
                label: label.to_string(),
            })
    }
}

impl fmt::Display for MealCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_label(s)
    }
}

/// One line of a recipe: how much of an ingredient one placement consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeLine {
    /// Ingredient consumed
    pub ingredient_id: String,
    /// Quantity per placement (never scaled by servings)
    pub quantity: f64,
}

impl RecipeLine {
    /// Builds a recipe line.
    pub fn new(ingredient_id: impl Into<String>, quantity: f64) -> Self {
        Self {
            ingredient_id: ingredient_id.into(),
            quantity,
        }
    }
}

/// A recipe. Inside a [`WeeklyMenu`] this is a copy taken at placement time,
/// with `category` set to the meal slot it was placed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dish {
    /// Catalog identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Meal category (catalog) or meal slot (menu copy)
    pub category: MealCategory,
    /// Servings the recipe yields
    pub servings: u32,
    /// Recipe lines
    pub ingredients: Vec<RecipeLine>,
}

/// Shortage warnings of one day: meal -> dish id -> missing ingredient names
/// (`None` when nothing was short).
pub type DayWarnings = BTreeMap<MealCategory, BTreeMap<String, Option<Vec<String>>>>;

/// The dishes planned for one calendar week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyMenu {
    /// `menu-YYYY-MM-DD`
    pub id: String,
    /// Monday of the week
    pub week: NaiveDate,
    /// Always holds all seven days, possibly with empty lists
    pub days: BTreeMap<Day, Vec<Dish>>,
    /// Warnings recorded when dishes were placed
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub warnings: BTreeMap<Day, DayWarnings>,
}

impl WeeklyMenu {
    /// An empty menu for the given Monday, with every day present.
    #[must_use]
    pub fn empty(id: String, week: NaiveDate) -> Self {
        Self {
            id,
            week,
            days: Day::ALL.into_iter().map(|day| (day, Vec::new())).collect(),
            warnings: BTreeMap::new(),
        }
    }

    /// Every planned dish with the day it sits on, in day order.
    pub fn planned_dishes(&self) -> impl Iterator<Item = (Day, &Dish)> {
        self.days
            .iter()
            .flat_map(|(day, dishes)| dishes.iter().map(move |dish| (*day, dish)))
    }

    /// The recorded warning for a placed dish. Outer `None` means no warning
    /// entry exists; inner `None` means the dish was placed without shortage.
    #[must_use]
    pub fn warning_for(
        &self,
        day: Day,
        meal: MealCategory,
        dish_id: &str,
    ) -> Option<Option<&[String]>> {
        self.warnings
            .get(&day)?
            .get(&meal)?
            .get(dish_id)
            .map(Option::as_deref)
    }
}

/// A stock movement request for [`crate::core::inventory::restore`].
///
/// The optional fields are only used when the ingredient does not exist yet and
/// has to be created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRequest {
    /// Ingredient to credit
    pub ingredient_id: String,
    /// Name for a newly created ingredient
    #[serde(default)]
    pub name: Option<String>,
    /// Quantity to add
    pub quantity: f64,
    /// Unit for a newly created ingredient
    #[serde(default)]
    pub unit: Option<String>,
    /// Price for a newly created ingredient
    #[serde(default)]
    pub price_per_unit: Option<f64>,
}

impl From<&RecipeLine> for StockRequest {
    fn from(line: &RecipeLine) -> Self {
        Self {
            ingredient_id: line.ingredient_id.clone(),
            name: None,
            quantity: line.quantity,
            unit: None,
            price_per_unit: None,
        }
    }
}

/// One line of a shopping list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingItem {
    /// Ingredient to buy
    pub ingredient_id: String,
    /// Display name
    pub name: String,
    /// Quantity to buy
    pub quantity: f64,
    /// Unit of measure
    pub unit: String,
    /// Price of one unit
    pub price_per_unit: f64,
    /// Whether it has been bought
    #[serde(default)]
    pub purchased: bool,
}

/// The deficit between a week's menu and the pantry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingList {
    /// `shopping-YYYY-MM-DD`, or empty for "no list" in snapshots
    pub id: String,
    /// Monday of the week
    pub week_id: NaiveDate,
    /// Lines to buy
    pub items: Vec<ShoppingItem>,
    /// Sum of quantity x price over all items
    pub total_cost: f64,
    /// True when the list has items and all of them are purchased
    pub completed: bool,
    /// When the list was generated
    pub created_at: DateTime<Utc>,
}

impl ShoppingList {
    /// Recomputes `total_cost` and `completed` from the items.
    pub fn recompute(&mut self) {
        self.total_cost = self
            .items
            .iter()
            .map(|item| item.quantity * item.price_per_unit)
            .sum();
        self.completed = !self.items.is_empty() && self.items.iter().all(|item| item.purchased);
    }
}

/// One bought line of a purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseItem {
    /// Ingredient bought
    pub ingredient_id: String,
    /// Display name
    pub name: String,
    /// Quantity bought
    pub quantity: f64,
    /// Unit of measure
    pub unit: String,
    /// Price of one unit
    pub price_per_unit: f64,
    /// `quantity * price_per_unit`
    pub total_price: f64,
}

/// A finalized shopping trip. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    /// Generated identifier
    pub id: String,
    /// Monday of the week
    pub week_id: NaiveDate,
    /// Bought lines
    pub items: Vec<PurchaseItem>,
    /// Sum of the items' total prices
    pub total_cost: f64,
    /// When it was completed
    pub date: DateTime<Utc>,
}

/// Result of placing a dish on the menu. Shortages never block the placement;
/// they are reported here for the caller to show.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddDishOutcome {
    /// True when at least one ingredient was short
    pub warning: bool,
    /// Names of the short ingredients
    pub missing_ingredients: Vec<String>,
    /// False when the dish was already planned for that day (nothing changed)
    pub added: bool,
    /// The menu after the operation
    pub menu: WeeklyMenu,
}

/// Result of removing a dish from the menu.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveDishOutcome {
    /// The removed dish copy, or `None` if nothing matched
    pub removed: Option<Dish>,
    /// The menu after the operation
    pub menu: WeeklyMenu,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_day_from_label_ignores_case_and_accents() {
        assert_eq!(Day::from_label("Miércoles").unwrap(), Day::Miercoles);
        assert_eq!(Day::from_label("SÁBADO").unwrap(), Day::Sabado);
        assert_eq!(Day::from_label(" lunes ").unwrap(), Day::Lunes);
        assert!(matches!(
            Day::from_label("funday"),
            Err(Error::InvalidDay { .. })
        ));
    }

    #[test]
    fn test_meal_category_from_label() {
        assert_eq!(MealCategory::from_label("Café").unwrap(), MealCategory::Cafe);
        assert_eq!("cena".parse::<MealCategory>().unwrap(), MealCategory::Cena);
        assert!(matches!(
            MealCategory::from_label("brunch"),
            Err(Error::InvalidMealCategory { .. })
        ));
    }

    #[test]
    fn test_empty_menu_has_all_days() {
        let week = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let menu = WeeklyMenu::empty("menu-2024-03-04".to_string(), week);
        assert_eq!(menu.days.len(), 7);
        assert!(menu.days.values().all(Vec::is_empty));
        assert_eq!(menu.planned_dishes().count(), 0);
    }

    #[test]
    fn test_menu_serializes_with_spanish_labels() {
        let week = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let menu = WeeklyMenu::empty("menu-2024-03-04".to_string(), week);
        let json = serde_json::to_value(&menu).unwrap();
        assert_eq!(json["week"], "2024-03-04");
        assert!(json["days"]["miercoles"].is_array());
        assert!(json.get("warnings").is_none());

        let back: WeeklyMenu = serde_json::from_value(json).unwrap();
        assert_eq!(back, menu);
    }

    #[test]
    fn test_shopping_list_recompute() {
        let mut list = ShoppingList {
            id: "shopping-2024-03-04".to_string(),
            week_id: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            items: vec![
                ShoppingItem {
                    ingredient_id: "pollo-001".to_string(),
                    name: "Pollo".to_string(),
                    quantity: 2.0,
                    unit: "kg".to_string(),
                    price_per_unit: 3.5,
                    purchased: true,
                },
                ShoppingItem {
                    ingredient_id: "arroz-001".to_string(),
                    name: "Arroz".to_string(),
                    quantity: 1.0,
                    unit: "kg".to_string(),
                    price_per_unit: 1.0,
                    purchased: false,
                },
            ],
            total_cost: 0.0,
            completed: true,
            created_at: Utc::now(),
        };

        list.recompute();
        assert!((list.total_cost - 8.0).abs() < 1e-9);
        assert!(!list.completed);

        list.items[1].purchased = true;
        list.recompute();
        assert!(list.completed);

        list.items.clear();
        list.recompute();
        assert!(!list.completed);
    }
}
