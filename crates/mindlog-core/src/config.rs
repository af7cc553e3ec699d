//! Configuration module for MindLog.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, environment overrides, validation, defaults, and a builder
//! pattern for programmatic use.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Environment variable overriding `remote.url`
pub const ENV_REMOTE_URL: &str = "MINDLOG_REMOTE_URL";
/// Environment variable overriding `remote.anon_key`
pub const ENV_REMOTE_KEY: &str = "MINDLOG_REMOTE_KEY";
/// Environment variable overriding `offline_mode`
pub const ENV_OFFLINE_MODE: &str = "MINDLOG_OFFLINE_MODE";

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for MindLog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub remote: RemoteConfig,
    /// Local-only mode: never talk to the backend, even if configured.
    pub offline_mode: bool,
    pub sync: SyncConfig,
    pub storage: StorageConfig,
    pub backup: BackupConfig,
    pub logging: LoggingConfig,
}

/// Hosted backend endpoint and credential.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`. `None` means local-only.
    pub url: Option<String>,
    /// Public (anon) API key sent with every request.
    pub anon_key: Option<String>,
}

/// Automatic synchronization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Seconds between periodic sync passes.
    pub interval_secs: u64,
    /// Seconds after startup before the first pass.
    pub startup_delay_secs: u64,
    /// Seconds after startup before the catch-up pass.
    pub catchup_delay_secs: u64,
    /// Auto-sync flag used when the local store has none.
    pub enabled_by_default: bool,
}

/// Local storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database holding the local key-value namespace.
    pub database: PathBuf,
}

/// Backup/restore settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    /// Local keys that survive a restore untouched.
    pub preserved_keys: Vec<String>,
    /// Actor recorded in the backup metadata.
    pub creator: String,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/mindlog/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("mindlog")
            .join("config.yaml")
    }

    /// Apply `MINDLOG_*` overrides from the process environment.
    pub fn apply_env(self) -> Self {
        self.apply_env_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_env_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_REMOTE_URL) {
            self.remote.url = Some(url);
        }
        if let Some(key) = lookup(ENV_REMOTE_KEY) {
            self.remote.anon_key = Some(key);
        }
        if let Some(flag) = lookup(ENV_OFFLINE_MODE) {
            self.offline_mode = matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes"
            );
        }
        self
    }

    /// True when the backend may be used: not offline, URL and key both set.
    pub fn remote_enabled(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        !self.offline_mode && present(&self.remote.url) && present(&self.remote.anon_key)
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_secs: 300,
            startup_delay_secs: 3,
            catchup_delay_secs: 30,
            enabled_by_default: true,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("~/.local/share"))
                .join("mindlog")
                .join("mindlog.db"),
        }
    }
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            preserved_keys: vec![crate::ports::keys::ADMIN_SESSION.to_string()],
            creator: "admin".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"sync.interval_secs"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid. A missing remote
    /// section is valid: MindLog then runs local-only.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let mut push = |field: &str, message: &str| {
            errors.push(ValidationError {
                field: field.into(),
                message: message.into(),
            });
        };

        // --- remote ---
        match self.remote.url.as_deref() {
            Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                push("remote.url", "must start with http:// or https://");
            }
            _ => {}
        }
        if self.remote.url.is_some() && self.remote.anon_key.is_none() {
            push("remote.anon_key", "required when remote.url is set");
        }
        if self.remote.anon_key.is_some() && self.remote.url.is_none() {
            push("remote.url", "required when remote.anon_key is set");
        }

        // --- sync ---
        if self.sync.interval_secs == 0 {
            push("sync.interval_secs", "must be greater than 0");
        }

        // --- storage ---
        if self.storage.database.as_os_str().is_empty() {
            push("storage.database", "must not be empty");
        }

        // --- backup ---
        if self.backup.creator.trim().is_empty() {
            push("backup.creator", "must not be empty");
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            push(
                "logging.level",
                &format!("must be one of: {}", VALID_LOG_LEVELS.join(", ")),
            );
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default()`] and lets callers override individual
/// fields before calling [`ConfigBuilder::build`].
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with default values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- remote ---

    pub fn remote(mut self, url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        self.config.remote.url = Some(url.into());
        self.config.remote.anon_key = Some(anon_key.into());
        self
    }

    pub fn offline_mode(mut self, offline: bool) -> Self {
        self.config.offline_mode = offline;
        self
    }

    // --- sync ---

    pub fn sync_interval_secs(mut self, seconds: u64) -> Self {
        self.config.sync.interval_secs = seconds;
        self
    }

    pub fn sync_startup_delay_secs(mut self, seconds: u64) -> Self {
        self.config.sync.startup_delay_secs = seconds;
        self
    }

    pub fn sync_catchup_delay_secs(mut self, seconds: u64) -> Self {
        self.config.sync.catchup_delay_secs = seconds;
        self
    }

    pub fn sync_enabled_by_default(mut self, enabled: bool) -> Self {
        self.config.sync.enabled_by_default = enabled;
        self
    }

    // --- storage ---

    pub fn storage_database(mut self, path: PathBuf) -> Self {
        self.config.storage.database = path;
        self
    }

    // --- backup ---

    pub fn backup_preserved_keys(mut self, keys: Vec<String>) -> Self {
        self.config.backup.preserved_keys = keys;
        self
    }

    pub fn backup_creator(mut self, creator: impl Into<String>) -> Self {
        self.config.backup.creator = creator.into();
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
