//! Configuration system (layered: code > env > config file > defaults).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::error::{LocalGenError, Result};

/// Base URL of a stock local Ollama install.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Upper bound for the installed-model listing call.
pub const DEFAULT_LIST_TIMEOUT: Duration = Duration::from_secs(3);

const ENV_BASE_URL: &str = "LOCALGEN_BASE_URL";
const ENV_OLLAMA_BASE_URL: &str = "OLLAMA_BASE_URL";
const ENV_OLLAMA_HOST: &str = "OLLAMA_HOST";
const ENV_LIST_TIMEOUT_MS: &str = "LOCALGEN_LIST_TIMEOUT_MS";
const ENV_REQUEST_TIMEOUT_MS: &str = "LOCALGEN_REQUEST_TIMEOUT_MS";
const ENV_CONFIG_PATH: &str = "LOCALGEN_CONFIG";

/// Where and how to talk to the local model service.
///
/// Resolution order:
/// 1. Explicit `with_*` calls
/// 2. Environment (`LOCALGEN_BASE_URL`, `OLLAMA_BASE_URL`, `OLLAMA_HOST`,
///    `LOCALGEN_LIST_TIMEOUT_MS`, `LOCALGEN_REQUEST_TIMEOUT_MS`)
/// 3. TOML file at `$LOCALGEN_CONFIG` or `~/.localgen/config.toml`
/// 4. Built-in defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalGenConfig {
    base_url: String,
    list_timeout: Duration,
    request_timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
}

/// On-disk shape of `config.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    base_url: Option<String>,
    list_timeout_ms: Option<u64>,
    request_timeout_ms: Option<u64>,
    connect_timeout_ms: Option<u64>,
}

impl Default for LocalGenConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalGenConfig {
    /// Built-in defaults only.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            list_timeout: DEFAULT_LIST_TIMEOUT,
            request_timeout: None,
            connect_timeout: None,
        }
    }

    pub fn with_base_url(mut self, url: impl AsRef<str>) -> Self {
        self.base_url = normalize_base_url(url.as_ref());
        self
    }

    pub fn with_list_timeout(mut self, timeout: Duration) -> Self {
        self.list_timeout = timeout;
        self
    }

    /// Whole-request timeout for generation calls. Unset by default: a long
    /// generation is not an error.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Load from environment variables on top of defaults.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let mut config = Self::new();
        config.apply_vars(|key| std::env::var(key).ok());
        config
    }

    /// Defaults overlaid with a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let file: ConfigFile = toml::from_str(&raw).map_err(|e| {
            LocalGenError::Configuration(format!("{}: {e}", path.display()))
        })?;
        let mut config = Self::new();
        config.apply_file(file);
        Ok(config)
    }

    /// Full layered load: config file (if present), then environment.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let path = std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_config_path());

        let mut config = match Self::from_file(&path) {
            Ok(config) => config,
            Err(LocalGenError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                Self::new()
            }
            Err(err) => return Err(err),
        };
        config.apply_vars(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn apply_file(&mut self, file: ConfigFile) {
        if let Some(url) = file.base_url {
            self.base_url = normalize_base_url(&url);
        }
        if let Some(ms) = file.list_timeout_ms {
            self.list_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = file.request_timeout_ms {
            self.request_timeout = Some(Duration::from_millis(ms));
        }
        if let Some(ms) = file.connect_timeout_ms {
            self.connect_timeout = Some(Duration::from_millis(ms));
        }
    }

    fn apply_vars(&mut self, get: impl Fn(&str) -> Option<String>) {
        let url = [ENV_BASE_URL, ENV_OLLAMA_BASE_URL, ENV_OLLAMA_HOST]
            .iter()
            .find_map(|key| get(key).filter(|v| !v.trim().is_empty()));
        if let Some(url) = url {
            self.base_url = normalize_base_url(&url);
        }

        if let Some(ms) = parse_millis(ENV_LIST_TIMEOUT_MS, get(ENV_LIST_TIMEOUT_MS)) {
            self.list_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_millis(ENV_REQUEST_TIMEOUT_MS, get(ENV_REQUEST_TIMEOUT_MS)) {
            self.request_timeout = Some(Duration::from_millis(ms));
        }
    }

    /// Reject base URLs that cannot possibly address an HTTP service.
    pub fn validate(&self) -> Result<()> {
        let rest = self
            .base_url
            .strip_prefix("http://")
            .or_else(|| self.base_url.strip_prefix("https://"))
            .ok_or_else(|| {
                LocalGenError::Configuration(format!(
                    "base URL must start with http:// or https://, got '{}'",
                    self.base_url
                ))
            })?;
        if rest.is_empty() {
            return Err(LocalGenError::Configuration(
                "base URL has no host".to_string(),
            ));
        }
        Ok(())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn list_timeout(&self) -> Duration {
        self.list_timeout
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }

    pub fn tags_url(&self) -> String {
        format!("{}/api/tags", self.base_url)
    }

    pub fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }

    pub fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }

    pub fn embeddings_url(&self) -> String {
        format!("{}/api/embeddings", self.base_url)
    }

    pub fn show_url(&self) -> String {
        format!("{}/api/show", self.base_url)
    }
}

/// Trim whitespace and trailing slashes; bare `host:port` gets `http://`.
fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let (scheme, rest) = trimmed.split_once("://").unwrap_or(("http", trimmed));
    format!("{scheme}://{}", rest.trim_end_matches('/'))
}

fn parse_millis(key: &str, value: Option<String>) -> Option<u64> {
    let value = value?;
    match value.trim().parse::<u64>() {
        Ok(ms) => Some(ms),
        Err(_) => {
            warn!(key, value = %value, "Ignoring non-numeric timeout");
            None
        }
    }
}

fn default_config_path() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".localgen"))
        .unwrap_or_else(|| PathBuf::from(".localgen"))
        .join("config.toml")
}
