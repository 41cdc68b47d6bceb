//! Week Record Store
//!
//! Holds the user's weeks in insertion order and keeps the persisted
//! snapshot in step with them:
//!
//! ```text
//! hydrate():  load snapshot ─┬─ array present → replace seed
//!                            └─ absent/invalid/error → keep seed
//!             mark hydrated (once) → schedule save
//!
//! mutation → replace pending snapshot → background task waits for the
//!            debounce window → persists the latest pending snapshot
//! ```
//!
//! Mutations before hydration completes stay in memory and are never
//! scheduled for saving. Only full snapshots are ever written, and a save
//! always takes the newest pending snapshot, so collapsing several
//! mutations into one write never loses state.

use crate::config::StorageConfig;
use crate::weeks::error::StorageResult;
use crate::weeks::storage::{FileAdapter, StorageLayer};
use crate::weeks::types::{FitnessWeek, FitnessWeeksPayload};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex, Notify, OnceCell, RwLock};

/// Outcome of the one-time hydration load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hydration {
    /// A persisted week list (possibly empty) replaced the seed
    Restored { weeks: usize },
    /// Nothing usable was stored; the seed was kept
    KeptSeed,
}

/// In-memory week collection with debounced persistence
pub struct WeekStore {
    /// Weeks in insertion order
    weeks: RwLock<Vec<FitnessWeek>>,
    /// Set exactly once, when hydration finishes
    hydrated: AtomicBool,
    /// Result of the first hydration attempt
    hydration: OnceCell<Hydration>,
    storage: StorageLayer<FitnessWeeksPayload>,
    /// Latest snapshot waiting to be written
    pending: watch::Sender<Option<Vec<FitnessWeek>>>,
    /// Serializes writes so snapshots land in the order they were taken
    save_lock: Mutex<()>,
    save_debounce: Duration,
    shutdown: Notify,
}

impl WeekStore {
    /// Create a store seeded with `initial_weeks`
    pub fn new(initial_weeks: Vec<FitnessWeek>, storage: StorageLayer<FitnessWeeksPayload>) -> Self {
        let (pending, _) = watch::channel(None);
        Self {
            weeks: RwLock::new(initial_weeks),
            hydrated: AtomicBool::new(false),
            hydration: OnceCell::new(),
            storage,
            pending,
            save_lock: Mutex::new(()),
            save_debounce: Duration::from_millis(StorageConfig::default().save_debounce_ms),
            shutdown: Notify::new(),
        }
    }

    /// Create a file-backed store from configuration
    pub fn from_config(config: &StorageConfig, initial_weeks: Vec<FitnessWeek>) -> Self {
        let adapter = Arc::new(FileAdapter::new(config.data_path()));
        let storage = StorageLayer::new(config.key.clone(), adapter)
            .suppress_errors(config.suppress_errors);
        Self::new(initial_weeks, storage)
            .with_save_debounce(Duration::from_millis(config.save_debounce_ms))
    }

    /// Builder: set the debounce window for background saves
    pub fn with_save_debounce(mut self, debounce: Duration) -> Self {
        self.save_debounce = debounce;
        self
    }

    /// Snapshot of the current weeks, in insertion order
    pub async fn weeks(&self) -> Vec<FitnessWeek> {
        self.weeks.read().await.clone()
    }

    /// Look up a week by id
    pub async fn get(&self, id: &str) -> Option<FitnessWeek> {
        self.weeks.read().await.iter().find(|w| w.id == id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.weeks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.weeks.read().await.is_empty()
    }

    /// Whether the hydration load has finished
    pub fn is_hydrated(&self) -> bool {
        self.hydrated.load(Ordering::Acquire)
    }

    /// Load the persisted snapshot, once
    ///
    /// Later calls return the first outcome without touching storage.
    pub async fn hydrate(&self) -> Hydration {
        *self
            .hydration
            .get_or_init(|| async {
                let restored = match self.storage.load().await {
                    Ok(Some(FitnessWeeksPayload {
                        weeks: Some(weeks), ..
                    })) => Some(weeks),
                    Ok(_) => None,
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to load persisted weeks, keeping seed");
                        None
                    }
                };

                let mut weeks = self.weeks.write().await;
                let outcome = match restored {
                    Some(loaded) => {
                        *weeks = loaded;
                        Hydration::Restored { weeks: weeks.len() }
                    }
                    None => Hydration::KeptSeed,
                };

                self.hydrated.store(true, Ordering::Release);
                self.pending.send_replace(Some(weeks.clone()));

                tracing::info!(?outcome, weeks = weeks.len(), key = %self.storage.key(), "Hydrated week store");
                outcome
            })
            .await
    }

    /// Append a week unconditionally
    pub async fn add_week(&self, week: FitnessWeek) {
        let mut weeks = self.weeks.write().await;
        tracing::debug!(id = %week.id, week_of = %week.week_of, "Adding week");
        weeks.push(week);
        self.schedule_save(&weeks);
    }

    /// Replace the week with the same id, or append it if none matches
    ///
    /// Returns `true` when an existing week was replaced.
    pub async fn update_week(&self, week: FitnessWeek) -> bool {
        let mut weeks = self.weeks.write().await;
        let replaced = match weeks.iter_mut().find(|w| w.id == week.id) {
            Some(existing) => {
                *existing = week;
                true
            }
            None => {
                weeks.push(week);
                false
            }
        };
        tracing::debug!(replaced, "Updated week");
        self.schedule_save(&weeks);
        replaced
    }

    /// Queue a snapshot for the background saver
    ///
    /// Called with the week list still locked so snapshots are queued in
    /// mutation order.
    fn schedule_save(&self, weeks: &[FitnessWeek]) {
        if !self.is_hydrated() {
            tracing::debug!("Store not hydrated yet, skipping save");
            return;
        }
        self.pending.send_replace(Some(weeks.to_vec()));
    }

    /// Take the pending snapshot without waking the background saver
    fn take_pending(&self) -> Option<Vec<FitnessWeek>> {
        let mut taken = None;
        self.pending.send_if_modified(|slot| {
            taken = slot.take();
            false
        });
        taken
    }

    /// Persist the pending snapshot, if any
    async fn save_pending(&self) -> StorageResult<()> {
        let _guard = self.save_lock.lock().await;
        let Some(weeks) = self.take_pending() else {
            return Ok(());
        };

        let count = weeks.len();
        self.storage.save(&FitnessWeeksPayload::new(weeks)).await?;
        tracing::debug!(weeks = count, key = %self.storage.key(), "Persisted week snapshot");
        Ok(())
    }

    /// Write any pending snapshot immediately
    pub async fn flush(&self) -> StorageResult<()> {
        self.save_pending().await
    }

    /// Start the debounced background saver
    pub fn start_background_save(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let store = Arc::clone(self);
        let mut changes = self.pending.subscribe();
        if changes.borrow().is_some() {
            // Snapshot queued before the saver started (e.g. by hydration)
            changes.mark_changed();
        }

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = changes.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    _ = store.shutdown.notified() => break,
                }

                // Let rapid successive mutations collapse into one write
                let stopping = tokio::select! {
                    _ = tokio::time::sleep(store.save_debounce) => false,
                    _ = store.shutdown.notified() => true,
                };
                if stopping {
                    break;
                }
                changes.borrow_and_update();

                if let Err(e) = store.save_pending().await {
                    tracing::error!("Background save failed: {}", e);
                }
            }

            if let Err(e) = store.save_pending().await {
                tracing::error!("Final save failed: {}", e);
            }
        })
    }

    /// Stop the background saver and write any pending snapshot
    pub async fn shutdown(&self) -> StorageResult<()> {
        self.shutdown.notify_one();
        self.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weeks::storage::{MemoryAdapter, StorageAdapter};
    use crate::weeks::types::{DayMetrics, Weekday};
    use std::sync::atomic::AtomicUsize;

    const KEY: &str = "fitnessWeeks";

    fn week(id: &str, week_of: &str) -> FitnessWeek {
        FitnessWeek::new(id, week_of).day(Weekday::Mon, DayMetrics::new().weight_kg(80.0))
    }

    fn store_with(adapter: Arc<MemoryAdapter>, seed: Vec<FitnessWeek>) -> WeekStore {
        WeekStore::new(seed, StorageLayer::new(KEY, adapter)).with_save_debounce(Duration::from_millis(20))
    }

    async fn stored_ids(adapter: &MemoryAdapter) -> Option<Vec<String>> {
        let raw = adapter.get_item(KEY).await.unwrap()?;
        let payload: FitnessWeeksPayload = serde_json::from_str(&raw).unwrap();
        Some(payload.weeks?.into_iter().map(|w| w.id).collect())
    }

    #[tokio::test]
    async fn test_hydrate_replaces_seed() {
        let stored = serde_json::to_string(&FitnessWeeksPayload::new(vec![week("stored", "2025-12-08")])).unwrap();
        let adapter = Arc::new(MemoryAdapter::with_items([(KEY, stored)]));
        let store = store_with(adapter, vec![week("seed", "2025-12-01")]);

        assert!(!store.is_hydrated());
        assert_eq!(store.hydrate().await, Hydration::Restored { weeks: 1 });
        assert!(store.is_hydrated());

        let ids: Vec<String> = store.weeks().await.into_iter().map(|w| w.id).collect();
        assert_eq!(ids, vec!["stored"]);
    }

    #[tokio::test]
    async fn test_hydrate_with_empty_snapshot() {
        let adapter = Arc::new(MemoryAdapter::with_items([(KEY, r#"{"weeks":[]}"#)]));
        let store = store_with(adapter, vec![week("seed", "2025-12-01")]);

        assert_eq!(store.hydrate().await, Hydration::Restored { weeks: 0 });
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_hydrate_keeps_seed_on_missing_or_invalid() {
        for stored in [None, Some("{not-json"), Some(r#"{"weeks":"nope"}"#), Some("{}")] {
            let adapter = Arc::new(match stored {
                Some(raw) => MemoryAdapter::with_items([(KEY, raw)]),
                None => MemoryAdapter::new(),
            });
            let store = store_with(adapter, vec![week("seed", "2025-12-01")]);

            assert_eq!(store.hydrate().await, Hydration::KeptSeed);
            assert!(store.is_hydrated());
            assert_eq!(store.len().await, 1);
        }
    }

    #[tokio::test]
    async fn test_hydrate_runs_once() {
        let adapter = Arc::new(MemoryAdapter::with_items([(KEY, r#"{"weeks":[]}"#)]));
        let store = store_with(adapter.clone(), vec![]);

        assert_eq!(store.hydrate().await, Hydration::Restored { weeks: 0 });
        store.add_week(week("a", "2025-12-01")).await;
        store.flush().await.unwrap();

        // A second call must not reload and clobber the in-memory week
        assert_eq!(store.hydrate().await, Hydration::Restored { weeks: 0 });
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_is_upsert() {
        let store = store_with(Arc::new(MemoryAdapter::new()), vec![week("a", "2025-12-01")]);

        let mut edited = week("a", "2025-12-01");
        edited.notes = Some("edited".to_string());
        assert!(store.update_week(edited).await);
        assert!(!store.update_week(week("b", "2025-12-08")).await);

        let weeks = store.weeks().await;
        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[0].notes.as_deref(), Some("edited"));
        assert_eq!(weeks[1].id, "b");
    }

    #[tokio::test]
    async fn test_add_keeps_insertion_order() {
        let store = store_with(Arc::new(MemoryAdapter::new()), vec![]);
        store.add_week(week("late", "2026-01-05")).await;
        store.add_week(week("early", "2025-12-01")).await;

        let ids: Vec<String> = store.weeks().await.into_iter().map(|w| w.id).collect();
        assert_eq!(ids, vec!["late", "early"]);
        assert_eq!(store.get("early").await.unwrap().week_of, "2025-12-01");
    }

    #[tokio::test]
    async fn test_mutations_before_hydration_are_not_saved() {
        let adapter = Arc::new(MemoryAdapter::new());
        let store = store_with(adapter.clone(), vec![]);

        store.add_week(week("early", "2025-12-01")).await;
        store.flush().await.unwrap();

        assert_eq!(stored_ids(&adapter).await, None);
    }

    #[tokio::test]
    async fn test_hydration_schedules_seed_save() {
        let adapter = Arc::new(MemoryAdapter::new());
        let store = store_with(adapter.clone(), vec![week("seed", "2025-12-01")]);

        store.hydrate().await;
        store.flush().await.unwrap();

        assert_eq!(stored_ids(&adapter).await, Some(vec!["seed".to_string()]));
    }

    #[tokio::test]
    async fn test_background_save_persists_latest_snapshot() {
        let adapter = Arc::new(MemoryAdapter::new());
        let store = Arc::new(store_with(adapter.clone(), vec![]));
        store.hydrate().await;
        let handle = store.start_background_save();

        store.add_week(week("a", "2025-12-01")).await;
        store.add_week(week("b", "2025-12-08")).await;
        store.update_week(week("c", "2025-12-15")).await;

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(
            stored_ids(&adapter).await,
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );

        store.shutdown().await.unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_hydrate_keeps_weeks_with_wrongly_typed_fields() {
        let stored = r#"{"weeks":[
            {"id":"user","weekOf":"2025-12-01","days":{"mon":{"weightKg":80},"tue":5},"notes":42},
            {"id":7,"weekOf":"2025-12-08"}
        ]}"#;
        let adapter = Arc::new(MemoryAdapter::with_items([(KEY, stored)]));
        let store = store_with(adapter.clone(), vec![week("seed", "2020-01-06")]);

        assert_eq!(store.hydrate().await, Hydration::Restored { weeks: 1 });
        store.flush().await.unwrap();

        assert_eq!(stored_ids(&adapter).await, Some(vec!["user".to_string()]));
        let kept = store.get("user").await.unwrap();
        assert_eq!(kept.days.get(Weekday::Mon).unwrap().weight_kg, Some(80.0));
        assert_eq!(kept.notes, None);
    }

    /// Counts writes reaching the adapter
    #[derive(Default)]
    struct CountingAdapter {
        inner: MemoryAdapter,
        writes: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl StorageAdapter for CountingAdapter {
        async fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
            self.inner.get_item(key).await
        }

        async fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.set_item(key, value).await
        }

        async fn remove_item(&self, key: &str) -> StorageResult<()> {
            self.inner.remove_item(key).await
        }
    }

    #[tokio::test]
    async fn test_rapid_mutations_collapse_into_one_write() {
        let adapter = Arc::new(CountingAdapter::default());
        let store = Arc::new(
            WeekStore::new(vec![], StorageLayer::new(KEY, adapter.clone()))
                .with_save_debounce(Duration::from_millis(50)),
        );
        let handle = store.start_background_save();
        store.hydrate().await;

        for i in 0..10 {
            store.add_week(week(&format!("w{}", i), "2025-12-01")).await;
        }

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(adapter.writes.load(Ordering::SeqCst), 1);

        store.shutdown().await.unwrap();
        handle.await.unwrap();
        assert_eq!(adapter.writes.load(Ordering::SeqCst), 1);

        let raw = adapter.inner.get_item(KEY).await.unwrap().unwrap();
        let payload: FitnessWeeksPayload = serde_json::from_str(&raw).unwrap();
        assert_eq!(payload.weeks.unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_saver_started_after_hydration_writes_snapshot() {
        let adapter = Arc::new(MemoryAdapter::new());
        let store = Arc::new(store_with(adapter.clone(), vec![week("seed", "2025-12-01")]));
        store.hydrate().await;
        let handle = store.start_background_save();

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(stored_ids(&adapter).await, Some(vec!["seed".to_string()]));

        store.shutdown().await.unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_flushes_pending() {
        let adapter = Arc::new(MemoryAdapter::new());
        let store = Arc::new(
            store_with(adapter.clone(), vec![]).with_save_debounce(Duration::from_secs(60)),
        );
        store.hydrate().await;
        let handle = store.start_background_save();

        store.add_week(week("a", "2025-12-01")).await;
        store.shutdown().await.unwrap();
        handle.await.unwrap();

        assert_eq!(stored_ids(&adapter).await, Some(vec!["a".to_string()]));
    }
}
