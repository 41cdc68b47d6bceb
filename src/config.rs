//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Week persistence configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Storage key; the file adapter stores it as `<data_dir>/<key>.json`
    #[serde(default = "default_storage_key")]
    pub key: String,

    #[serde(default = "default_save_debounce")]
    pub save_debounce_ms: u64,

    /// Log storage failures instead of returning them
    #[serde(default = "default_suppress_errors")]
    pub suppress_errors: bool,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("fitness-dashboard").to_string_lossy().to_string())
        .unwrap_or_else(|| "./fitness_dashboard_data".to_string())
}

fn default_storage_key() -> String {
    "fitnessWeeks".to_string()
}

fn default_save_debounce() -> u64 {
    250
}

fn default_suppress_errors() -> bool {
    true
}

impl StorageConfig {
    /// `data_dir` with a leading `~` expanded
    pub fn data_path(&self) -> PathBuf {
        expand_home(&self.data_dir)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            key: default_storage_key(),
            save_debounce_ms: default_save_debounce(),
            suppress_errors: default_suppress_errors(),
        }
    }
}

/// Export output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_export_dir")]
    pub output_dir: String,
}

fn default_export_dir() -> String {
    dirs::download_dir()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| ".".to_string())
}

impl ExportConfig {
    /// `output_dir` with a leading `~` expanded
    pub fn output_path(&self) -> PathBuf {
        expand_home(&self.output_dir)
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_export_dir(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let loaded = Self::search_default();
        loaded.log_summary();
        loaded.config
    }

    /// Search the default locations without logging
    ///
    /// Binaries call this before the subscriber exists, then report the
    /// outcome with [`LoadedConfig::log_summary`].
    pub fn search_default() -> LoadedConfig {
        let config_paths: Vec<PathBuf> = [
            dirs::config_dir().map(|p| p.join("fitness-dashboard").join("config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self::search(&config_paths)
    }

    fn search(paths: &[PathBuf]) -> LoadedConfig {
        let mut failures = Vec::new();

        for path in paths.iter().filter(|p| p.exists()) {
            match Self::load_with_env(path) {
                Ok(config) => {
                    return LoadedConfig {
                        config,
                        source: Some(path.clone()),
                        failures,
                    }
                }
                Err(e) => failures.push(e),
            }
        }

        LoadedConfig {
            config: Self::from_env(),
            source: None,
            failures,
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Storage overrides
        if let Some(data_dir) = var("FITDASH_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }
        if let Some(key) = var("FITDASH_STORAGE_KEY") {
            self.storage.key = key;
        }
        if let Some(debounce) = var("FITDASH_SAVE_DEBOUNCE_MS") {
            match debounce.parse() {
                Ok(ms) => self.storage.save_debounce_ms = ms,
                Err(_) => tracing::warn!(value = %debounce, "Ignoring invalid FITDASH_SAVE_DEBOUNCE_MS"),
            }
        }

        // Export overrides
        if let Some(dir) = var("FITDASH_EXPORT_DIR") {
            self.export.output_dir = dir;
        }

        // Logging overrides
        if let Some(level) = var("FITDASH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("FITDASH_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Result of searching the default config locations
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: Config,
    /// File the config came from, `None` for defaults plus environment
    pub source: Option<PathBuf>,
    /// Files that exist but could not be loaded
    pub failures: Vec<ConfigError>,
}

impl LoadedConfig {
    /// Log where the config came from and any files that were skipped
    pub fn log_summary(&self) {
        for e in &self.failures {
            tracing::warn!("{}", e);
        }
        match &self.source {
            Some(path) => tracing::info!("Loaded config from {:?}", path),
            None => tracing::info!("Using default config with environment overrides"),
        }
    }
}

/// Expand a leading `~` to the home directory
pub fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix('~'), dirs::home_dir()) {
        (Some(rest), Some(home)) if rest.is_empty() || rest.starts_with('/') => {
            home.join(rest.trim_start_matches('/'))
        }
        _ => PathBuf::from(path),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over the configured level. Does nothing if a
/// subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("fitness_dashboard={0},fitdash={0}", config.level)));

    let result = if config.format.eq_ignore_ascii_case("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    if let Err(e) = result {
        tracing::debug!("Tracing subscriber already installed: {}", e);
    }
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Fitness Dashboard Configuration
#
# Environment variables override these settings:
# - FITDASH_DATA_DIR
# - FITDASH_STORAGE_KEY
# - FITDASH_SAVE_DEBOUNCE_MS
# - FITDASH_EXPORT_DIR
# - FITDASH_LOG_LEVEL
# - FITDASH_LOG_FORMAT

[storage]
# Directory holding the saved weeks
data_dir = "~/.local/share/fitness-dashboard"

# Storage key (file name without .json)
key = "fitnessWeeks"

# Delay before a change is written to disk (ms)
save_debounce_ms = 250

# Log storage failures instead of failing the command
suppress_errors = true

[export]
# Directory for JSON/CSV exports
output_dir = "~/Downloads"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.storage.key, "fitnessWeeks");
        assert_eq!(config.storage.save_debounce_ms, 250);
        assert!(config.storage.suppress_errors);
        assert!(config.storage.data_dir.ends_with("fitness-dashboard")
            || config.storage.data_dir == "./fitness_dashboard_data");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[storage]\ndata_dir = \"/tmp/weeks\"\nsave_debounce_ms = 10\n\n[logging]\nformat = \"json\"\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.storage.data_dir, "/tmp/weeks");
        assert_eq!(config.storage.save_debounce_ms, 10);
        assert_eq!(config.storage.key, "fitnessWeeks");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = Config::load(&dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));

        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[storage\nkey = ").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_search_skips_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.toml");
        let good = dir.path().join("good.toml");
        std::fs::write(&broken, "[storage\n").unwrap();
        std::fs::write(&good, "[storage]\nkey = \"fromFile\"\n").unwrap();

        let loaded = Config::search(&[dir.path().join("missing.toml"), broken, good.clone()]);
        assert_eq!(loaded.source, Some(good));
        assert_eq!(loaded.failures.len(), 1);
        assert!(matches!(loaded.failures[0], ConfigError::Parse { .. }));

        let loaded = Config::search(&[dir.path().join("missing.toml")]);
        assert_eq!(loaded.source, None);
        assert!(loaded.failures.is_empty());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("FITDASH_DATA_DIR", "/data"),
            ("FITDASH_STORAGE_KEY", "weeksV2"),
            ("FITDASH_SAVE_DEBOUNCE_MS", "not-a-number"),
            ("FITDASH_EXPORT_DIR", "/exports"),
            ("FITDASH_LOG_LEVEL", "debug"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.storage.data_dir, "/data");
        assert_eq!(config.storage.key, "weeksV2");
        assert_eq!(config.storage.save_debounce_ms, 250);
        assert_eq!(config.export.output_dir, "/exports");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/var/data"), PathBuf::from("/var/data"));
        assert_eq!(expand_home("~user/data"), PathBuf::from("~user/data"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/Downloads"), home.join("Downloads"));
            assert_eq!(expand_home("~"), home);
        }
    }

    #[test]
    fn test_generated_config_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.storage.key, "fitnessWeeks");
        assert_eq!(config.storage.save_debounce_ms, 250);
        assert_eq!(config.export.output_dir, "~/Downloads");
    }
}
