use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub piigraph: PiiGraphConfig,
    pub backend: BackendConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// General settings
#[derive(Debug, Clone, Deserialize)]
pub struct PiiGraphConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for PiiGraphConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Where the explorer fetches relation text from
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    #[serde(default = "default_query_path")]
    pub query_path: String,
    #[serde(default = "default_entity_path")]
    pub entity_path: String,
    /// Request timeout. Absent means fetches may hang indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Search settings
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// Relation backend (`piigraph serve`) settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_relations_file")]
    pub relations_file: PathBuf,
    #[serde(default)]
    pub query_file: Option<PathBuf>,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
            relations_file: default_relations_file(),
            query_file: None,
            allowed_origins: Vec::new(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_query_path() -> String {
    "query".to_string()
}

fn default_entity_path() -> String {
    "entity".to_string()
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_server_port() -> u16 {
    4747
}

fn default_relations_file() -> PathBuf {
    PathBuf::from("relations.txt")
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in PIIGRAPH_CONFIG environment variable
    /// 2. ./config.toml in current directory
    pub fn load() -> Result<Self> {
        let _ = dotenv::dotenv();

        let config_path = std::env::var("PIIGRAPH_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        Self::from_file(&config_path)
    }

    /// Load and validate configuration from an explicit path
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let base = Url::parse(&self.backend.base_url).with_context(|| {
            format!(
                "backend.base_url is not an absolute URL: {}",
                self.backend.base_url
            )
        })?;

        if base.cannot_be_a_base() {
            anyhow::bail!("backend.base_url cannot be used as a base: {}", base);
        }

        if self.search.debounce_ms == 0 {
            anyhow::bail!("search.debounce_ms must be greater than 0");
        }

        if self.server.port == 0 {
            anyhow::bail!("server.port must be greater than 0");
        }

        Ok(())
    }

    /// Parsed backend base URL (validated at load time)
    pub fn backend_url(&self) -> Result<Url> {
        Url::parse(&self.backend.base_url).context("Invalid backend.base_url")
    }

    /// Optional client timeout for entity fetches
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.backend.timeout_secs.map(Duration::from_secs)
    }

    /// Search debounce interval
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.search.debounce_ms)
    }
}
