//! Key-value persistence boundary
//!
//! - `StorageAdapter`: async get/set/remove of raw strings under a key
//! - `MemoryAdapter`: in-process map, used by tests and ephemeral runs
//! - `FileAdapter`: one `<key>.json` file per key inside a directory
//! - `StorageLayer<T>`: typed load/save/clear of one value under one key
//!
//! By default the layer suppresses errors: they are reported through the
//! optional error hook and logged, and the operation resolves to a safe
//! default (`None` on load, no-op on save/clear). Disabling suppression
//! makes every failure propagate to the caller.

use crate::weeks::error::{StorageError, StorageResult, StorageStage};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Raw string storage keyed by name
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Read the value stored under `key`, `None` if absent
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key`; removing an absent key is not an error
    async fn remove_item(&self, key: &str) -> StorageResult<()>;
}

/// In-memory adapter
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an adapter pre-populated with `items`
    pub fn with_items<K, V>(items: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            items: RwLock::new(
                items
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl StorageAdapter for MemoryAdapter {
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.items
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.items.write().await.remove(key);
        Ok(())
    }
}

/// Directory-backed adapter storing each key in `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileAdapter {
    dir: PathBuf,
}

impl FileAdapter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        let valid = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(['/', '\\'])
            && !key.contains('\0');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl StorageAdapter for FileAdapter {
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        // Write to a sibling temp file, then rename into place
        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, value).await?;
        tokio::fs::rename(&tmp_path, &path).await?;
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Encodes a value to stored text
pub type SerializeFn<T> = Arc<dyn Fn(&T) -> StorageResult<String> + Send + Sync>;

/// Decodes stored text to a value
pub type DeserializeFn<T> = Arc<dyn Fn(&str) -> StorageResult<T> + Send + Sync>;

/// Called with every storage failure, suppressed or not
pub type ErrorHook = Arc<dyn Fn(&StorageError, StorageStage) + Send + Sync>;

/// Typed access to one value stored under one key
pub struct StorageLayer<T> {
    key: String,
    adapter: Arc<dyn StorageAdapter>,
    serialize: SerializeFn<T>,
    deserialize: DeserializeFn<T>,
    suppress_errors: bool,
    on_error: Option<ErrorHook>,
}

impl<T> StorageLayer<T>
where
    T: Serialize + DeserializeOwned + 'static,
{
    /// Create a JSON-backed layer with error suppression enabled
    pub fn new(key: impl Into<String>, adapter: Arc<dyn StorageAdapter>) -> Self {
        Self {
            key: key.into(),
            adapter,
            serialize: Arc::new(|value: &T| serde_json::to_string(value).map_err(StorageError::from)),
            deserialize: Arc::new(|raw: &str| serde_json::from_str::<T>(raw).map_err(StorageError::from)),
            suppress_errors: true,
            on_error: None,
        }
    }

    /// Builder: propagate errors instead of resolving to defaults
    pub fn suppress_errors(mut self, suppress: bool) -> Self {
        self.suppress_errors = suppress;
        self
    }

    /// Builder: observe every storage failure
    pub fn on_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&StorageError, StorageStage) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(hook));
        self
    }

    /// Builder: replace the JSON encoder
    pub fn serializer<F>(mut self, serialize: F) -> Self
    where
        F: Fn(&T) -> StorageResult<String> + Send + Sync + 'static,
    {
        self.serialize = Arc::new(serialize);
        self
    }

    /// Builder: replace the JSON decoder
    pub fn deserializer<F>(mut self, deserialize: F) -> Self
    where
        F: Fn(&str) -> StorageResult<T> + Send + Sync + 'static,
    {
        self.deserialize = Arc::new(deserialize);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the stored value
    ///
    /// Returns `Ok(None)` when the key is absent or a suppressed error occurred.
    pub async fn load(&self) -> StorageResult<Option<T>> {
        let raw = match self.adapter.get_item(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(None),
            Err(e) => {
                self.handle_error(e, StorageStage::Get)?;
                return Ok(None);
            }
        };

        match (self.deserialize)(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                self.handle_error(e, StorageStage::Deserialize)?;
                Ok(None)
            }
        }
    }

    /// Serialize and store `value`
    pub async fn save(&self, value: &T) -> StorageResult<()> {
        let raw = match (self.serialize)(value) {
            Ok(raw) => raw,
            Err(e) => return self.handle_error(e, StorageStage::Serialize),
        };

        match self.adapter.set_item(&self.key, &raw).await {
            Ok(()) => Ok(()),
            Err(e) => self.handle_error(e, StorageStage::Set),
        }
    }

    /// Remove the stored value
    pub async fn clear(&self) -> StorageResult<()> {
        match self.adapter.remove_item(&self.key).await {
            Ok(()) => Ok(()),
            Err(e) => self.handle_error(e, StorageStage::Remove),
        }
    }

    fn handle_error(&self, error: StorageError, stage: StorageStage) -> StorageResult<()> {
        if let Some(hook) = &self.on_error {
            hook(&error, stage);
        }
        if self.suppress_errors {
            tracing::warn!(key = %self.key, stage = %stage, error = %error, "Storage operation failed");
            Ok(())
        } else {
            Err(error)
        }
    }
}
