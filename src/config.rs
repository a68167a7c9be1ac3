//! Settings storage for API credentials and completion endpoint selection.
//!
//! Four named settings are kept in a [`ConfigStore`]. The orchestrator reads
//! them once per run through [`ConfigStore::snapshot`].

use dashmap::DashMap;
use std::collections::BTreeMap;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_COMPLETION_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_COMPLETION_MODEL: &str = "deepseek-reasoner";
pub const DEFAULT_FIRECRAWL_BASE_URL: &str = "https://api.firecrawl.dev";

/// The fixed set of persisted settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    CrawlApiKey,
    CompletionApiKey,
    CompletionBaseUrl,
    CompletionModel,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 4] = [
        ConfigKey::CrawlApiKey,
        ConfigKey::CompletionApiKey,
        ConfigKey::CompletionBaseUrl,
        ConfigKey::CompletionModel,
    ];

    /// Logical key under which the value is persisted.
    pub fn storage_key(self) -> &'static str {
        match self {
            ConfigKey::CrawlApiKey => "firecrawl_api_key",
            ConfigKey::CompletionApiKey => "openai_api_key",
            ConfigKey::CompletionBaseUrl => "openai_api_url",
            ConfigKey::CompletionModel => "openai_model",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConfigKey::CrawlApiKey => "Firecrawl API key",
            ConfigKey::CompletionApiKey => "OpenAI API key",
            ConfigKey::CompletionBaseUrl => "OpenAI API URL",
            ConfigKey::CompletionModel => "OpenAI model",
        }
    }

    /// Fallback returned by [`ConfigStore::get`] when nothing is stored.
    /// Credentials have none.
    pub fn default_value(self) -> Option<&'static str> {
        match self {
            ConfigKey::CrawlApiKey | ConfigKey::CompletionApiKey => None,
            ConfigKey::CompletionBaseUrl => Some(DEFAULT_COMPLETION_BASE_URL),
            ConfigKey::CompletionModel => Some(DEFAULT_COMPLETION_MODEL),
        }
    }

    fn from_storage_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.storage_key() == key)
    }
}

/// Durable key-value storage for the four settings.
///
/// Implementors only provide raw access; defaults and empty-string handling
/// live in the provided methods.
pub trait ConfigStore: Send + Sync {
    /// Stored value, if any. Read failures report `None`.
    fn load(&self, key: ConfigKey) -> Option<String>;

    /// Persist `value` under `key`. Write failures are logged, not raised.
    fn set(&self, key: ConfigKey, value: &str);

    fn get(&self, key: ConfigKey) -> Option<String> {
        self.load(key)
            .filter(|v| !v.is_empty())
            .or_else(|| key.default_value().map(str::to_string))
    }

    fn is_set(&self, key: ConfigKey) -> bool {
        self.load(key).is_some_and(|v| !v.is_empty())
    }

    fn snapshot(&self) -> Settings {
        Settings {
            crawl_api_key: self.get(ConfigKey::CrawlApiKey),
            completion_api_key: self.get(ConfigKey::CompletionApiKey),
            completion_base_url: self
                .get(ConfigKey::CompletionBaseUrl)
                .unwrap_or_else(|| DEFAULT_COMPLETION_BASE_URL.to_string()),
            completion_model: self
                .get(ConfigKey::CompletionModel)
                .unwrap_or_else(|| DEFAULT_COMPLETION_MODEL.to_string()),
        }
    }
}

/// Values read from a [`ConfigStore`] at the start of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub crawl_api_key: Option<String>,
    pub completion_api_key: Option<String>,
    pub completion_base_url: String,
    pub completion_model: String,
}

impl Settings {
    /// Credential keys that are absent, in a stable order.
    pub fn missing_credentials(&self) -> Vec<ConfigKey> {
        let mut missing = Vec::new();
        if self.crawl_api_key.is_none() {
            missing.push(ConfigKey::CrawlApiKey);
        }
        if self.completion_api_key.is_none() {
            missing.push(ConfigKey::CompletionApiKey);
        }
        missing
    }
}

/// In-process store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    entries: DashMap<ConfigKey, String>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self, key: ConfigKey) -> Option<String> {
        self.entries.get(&key).map(|v| v.value().clone())
    }

    fn set(&self, key: ConfigKey, value: &str) {
        self.entries.insert(key, value.to_string());
    }
}

/// Store backed by a JSON document on disk, written through on every `set`.
#[derive(Debug)]
pub struct FileConfigStore {
    path: PathBuf,
    entries: DashMap<ConfigKey, String>,
    // Held across snapshot, write and rename so writers never interleave.
    write_lock: Mutex<()>,
}

impl FileConfigStore {
    /// Open the store at `path`. A missing or unreadable file yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = DashMap::new();
        for (key, value) in read_document(&path) {
            if let Some(key) = ConfigKey::from_storage_key(&key) {
                entries.insert(key, value);
            }
        }
        debug!("Loaded {} settings from {}", entries.len(), path.display());
        Self {
            path,
            entries,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> std::io::Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let document: BTreeMap<&str, String> = self
            .entries
            .iter()
            .map(|e| (e.key().storage_key(), e.value().clone()))
            .collect();
        let contents = serde_json::to_string_pretty(&document)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
        }

        fs::rename(&tmp, &self.path)
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self, key: ConfigKey) -> Option<String> {
        self.entries.get(&key).map(|v| v.value().clone())
    }

    fn set(&self, key: ConfigKey, value: &str) {
        self.entries.insert(key, value.to_string());
        match self.persist() {
            Ok(()) => debug!("Saved {} to {}", key.label(), self.path.display()),
            Err(e) => warn!(
                "Failed to persist {} to {}: {}",
                key.label(),
                self.path.display(),
                e
            ),
        }
    }
}

fn read_document(path: &Path) -> BTreeMap<String, String> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(_) => return BTreeMap::new(),
    };
    serde_json::from_str(&contents).unwrap_or_else(|e| {
        warn!("Ignoring unreadable settings file {}: {}", path.display(), e);
        BTreeMap::new()
    })
}

/// Process-level settings for the HTTP server, read from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub settings_path: PathBuf,
    pub firecrawl_base_url: String,
    pub firecrawl_poll_interval: Duration,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr = std::env::var("RESEARCH_BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid RESEARCH_BIND_ADDR: {}", e))?;

        let settings_path = match std::env::var("RESEARCH_SETTINGS_PATH") {
            Ok(path) => PathBuf::from(path),
            Err(_) => default_settings_path()?,
        };

        let firecrawl_base_url = std::env::var("FIRECRAWL_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_FIRECRAWL_BASE_URL.to_string());

        let poll_ms = match std::env::var("FIRECRAWL_POLL_INTERVAL_MS") {
            Ok(v) => v
                .parse::<u64>()
                .map_err(|e| anyhow::anyhow!("Invalid FIRECRAWL_POLL_INTERVAL_MS: {}", e))?,
            Err(_) => 2000,
        };

        Ok(Self {
            bind_addr,
            settings_path,
            firecrawl_base_url,
            firecrawl_poll_interval: Duration::from_millis(poll_ms),
        })
    }
}

fn default_settings_path() -> anyhow::Result<PathBuf> {
    dirs::config_dir()
        .map(|p| p.join("research-assistant").join("settings.json"))
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
}

/// Copy credentials from the environment into `store` where it has none yet.
pub fn seed_from_env(store: &dyn ConfigStore) {
    let seeds = [
        (ConfigKey::CrawlApiKey, "FIRECRAWL_API_KEY"),
        (ConfigKey::CompletionApiKey, "OPENAI_API_KEY"),
    ];
    for (key, var) in seeds {
        if store.is_set(key) {
            continue;
        }
        if let Ok(value) = std::env::var(var) {
            if !value.is_empty() {
                store.set(key, &value);
                debug!("Seeded {} from {}", key.label(), var);
            }
        }
    }
}
