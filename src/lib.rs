//! # Fitness Dashboard
//!
//! Weekly fitness tracking: store week records locally and derive the
//! averages, deltas, trend series and exports a dashboard displays.
//!
//! ## Features
//!
//! - **Local persistence**: pluggable key-value storage with a debounced background saver
//! - **Aggregation**: per-week averages and week-over-week weight deltas
//! - **Charts**: metric histories, daily weight series and overview cards
//! - **Export**: versioned JSON document plus a CSV history table
//!
//! ## Modules
//!
//! - [`weeks`]: Week records, storage adapters and the week store
//! - [`analytics`]: Aggregation, metric histories, weight series, cards
//! - [`export`]: JSON/CSV export
//! - [`editor`]: Form input parsing and week validation
//! - [`config`]: TOML/env configuration and logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fitness_dashboard::analytics::build_week_history_rows;
//! use fitness_dashboard::config::StorageConfig;
//! use fitness_dashboard::weeks::{sample_weeks, WeekStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Open the file-backed store, seeded with sample weeks
//!     let store = Arc::new(WeekStore::from_config(&StorageConfig::default(), sample_weeks()));
//!     let saver = store.start_background_save();
//!
//!     // Replace the seed with whatever was saved last time
//!     store.hydrate().await;
//!
//!     for row in build_week_history_rows(&store.weeks().await) {
//!         println!("{} avg {:?} kg (delta {:?})", row.week_of, row.avg_weight_kg, row.avg_weight_delta_kg);
//!     }
//!
//!     store.shutdown().await?;
//!     saver.await?;
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod config;
pub mod editor;
pub mod export;
pub mod weeks;

pub use analytics::{build_week_history_rows, MetricKind, WeekHistoryRow};
pub use config::Config;
pub use editor::{EditorError, WeekDraft};
pub use export::{create_week_export_payload, ExportError, WeekExportPayload};
pub use weeks::{DayMetrics, FitnessWeek, StorageError, WeekStore, Weekday};
