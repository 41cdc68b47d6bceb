//! Week records and their persistence
//!
//! - **types**: Core entities (Weekday, DayMetrics, WeekDays, FitnessWeek)
//! - **storage**: Key-value adapters and the typed storage layer
//! - **store**: The week store with hydration and debounced saving
//! - **seed**: Sample weeks for a fresh install
//! - **error**: Error types
//!
//! # Architecture
//!
//! ```text
//! Startup:
//!   seed weeks → WeekStore → hydrate() → StorageLayer::load → adapter
//!
//! Mutation:
//!   add_week / update_week → pending snapshot → background save → adapter
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use fitness_dashboard::weeks::{DayMetrics, FitnessWeek, MemoryAdapter, StorageLayer, WeekStore, Weekday};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let storage = StorageLayer::new("fitnessWeeks", Arc::new(MemoryAdapter::new()));
//!     let store = Arc::new(WeekStore::new(Vec::new(), storage));
//!     store.hydrate().await;
//!     let saver = store.start_background_save();
//!
//!     store
//!         .add_week(
//!             FitnessWeek::new("2026-01-05", "2026-01-05")
//!                 .day(Weekday::Mon, DayMetrics::new().weight_kg(80.2)),
//!         )
//!         .await;
//!
//!     store.shutdown().await?;
//!     saver.await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod seed;
pub mod storage;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use error::{StorageError, StorageResult, StorageStage};
pub use seed::sample_weeks;
pub use storage::{ErrorHook, FileAdapter, MemoryAdapter, StorageAdapter, StorageLayer};
pub use store::{Hydration, WeekStore};
pub use types::{finite, DayMetrics, FitnessWeek, FitnessWeeksPayload, WeekDays, Weekday};
