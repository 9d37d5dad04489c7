use dotenvy::dotenv;
use meal_planner::{
    Planner,
    config::{database, settings},
    core::{shopping, week},
    errors::Result,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Load .env file (non-fatal, env vars can be set externally)
    let dotenv_loaded = dotenv().is_ok();

    // 2. Load settings; the log filter may come from them
    let settings = settings::load_default_settings()?;

    // 3. Initialize tracing
    let fallback_filter = settings.log_filter.clone().unwrap_or_else(|| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback_filter)),
        )
        .init();
    if !dotenv_loaded {
        info!("No .env file loaded, using the process environment");
    }

    // 4. Connect and make sure the schema exists
    let database_url = database::get_database_url(settings.database_url.as_deref());
    let db = database::create_connection(&database_url)
        .await
        .inspect(|_| info!("Connected to {database_url}"))
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {e}"))?;

    // 5. Build the planner and report on the current week
    let planner = Planner::new(db, settings);
    let this_week = week::current_week();
    let menu = planner.week_menu(this_week).await?;
    let ingredients = planner.ingredients().await?;
    let dishes = planner.dishes().await?;

    info!(
        "Week {}: {} dishes planned, {} dishes in catalog, {} ingredients in stock",
        week::week_key(this_week),
        menu.planned_dishes().count(),
        dishes.len(),
        ingredients.len()
    );

    let short: usize = menu
        .warnings
        .values()
        .flat_map(|meals| meals.values())
        .flat_map(|dishes| dishes.values())
        .filter(|missing| missing.as_ref().is_some_and(|names| !names.is_empty()))
        .count();
    if short > 0 {
        warn!("{short} planned dishes were placed with missing ingredients");
    }

    match shopping::get_shopping_list(planner.database(), this_week).await? {
        Some(list) => info!(
            "Shopping list {}: {} items, total {:.2}, completed: {}",
            list.id,
            list.items.len(),
            list.total_cost,
            list.completed
        ),
        None => info!("No shopping list generated for this week yet"),
    }

    Ok(())
}
