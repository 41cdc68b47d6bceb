//! Fitness Dashboard
//!
//! Opens the local week store and logs the dashboard's derived data.

use anyhow::Result;
use fitness_dashboard::analytics::{
    build_week_history_rows, build_weight_series, build_weight_summary, overview_cards,
};
use fitness_dashboard::config::{init_logging, Config};
use fitness_dashboard::weeks::{sample_weeks, Hydration, WeekStore};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let loaded = Config::search_default();
    init_logging(&loaded.config.logging);
    loaded.log_summary();
    let config = loaded.config;

    tracing::info!("Fitness Dashboard v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Data directory: {:?}", config.storage.data_path());

    let store = Arc::new(WeekStore::from_config(&config.storage, sample_weeks()));
    let save_handle = store.start_background_save();

    match store.hydrate().await {
        Hydration::Restored { weeks } => tracing::info!("Restored {} saved weeks", weeks),
        Hydration::KeptSeed => tracing::info!("No saved weeks, using sample data"),
    }

    let weeks = store.weeks().await;

    for card in overview_cards(&weeks) {
        tracing::info!(
            title = %card.title,
            value = %card.value,
            trend = ?card.trend,
            "{}",
            card.interval
        );
    }

    for row in build_week_history_rows(&weeks) {
        tracing::info!(
            week_of = %row.week_of,
            avg_weight_kg = ?row.avg_weight_kg,
            delta_kg = ?row.avg_weight_delta_kg,
            avg_calories = ?row.avg_calories,
            avg_protein_g = ?row.avg_protein_g,
            "Week summary"
        );
    }

    let series = build_weight_series(&weeks);
    let summary = build_weight_summary(&series.weights);
    tracing::info!(
        days = series.labels.len(),
        latest_kg = ?summary.latest_weight,
        change_percent = ?summary.change_percent,
        "Weight trend"
    );

    tracing::info!("Shutting down...");
    store.shutdown().await?;
    save_handle.await?;

    tracing::info!("Fitness Dashboard shutdown complete");
    Ok(())
}
