//! Layered configuration for `sge`.
//!
//! Values are resolved from, in increasing order of precedence:
//! 1. Built-in defaults ([`Config::default`]).
//! 2. A configuration file: TOML, YAML or JSON, picked by extension.
//! 3. Environment variables prefixed with `SGE_`, with `__` separating
//!    sections from keys (`SGE_STEAM__API_KEY`, `SGE_RATE_LIMIT__REQUESTS`).
//!
//! Durations are whole seconds (`*_secs`) or milliseconds (`*_ms`).

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format as _, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use sge_export::Format;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

const APPLICATION: &str = "sge";
const ENV_PREFIX: &str = "SGE_";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cache: CacheConfig,
    pub steam: SteamConfig,
    pub rate_limit: RateLimitConfig,
    pub retry: RetryConfig,
    /// Concurrent title resolutions. Derived from the request timeout and
    /// the rate limiter's pace when unset.
    pub workers: Option<usize>,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// SQLite database file. Its parent directory is created on startup.
    pub path: PathBuf,
    pub staleness: StalenessConfig,
}
impl Default for CacheConfig {
    fn default() -> Self {
        let path = match ProjectDirs::from("", "", APPLICATION) {
            Some(dirs) => dirs.cache_dir().join("cache.sqlite3"),
            None => PathBuf::from("sge-cache.sqlite3"),
        };
        Self {
            path,
            staleness: StalenessConfig::default(),
        }
    }
}

/// Maximum age of cache entries, per availability. Unset means the entry
/// never goes stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StalenessConfig {
    pub accessible_secs: Option<u64>,
    pub not_accessible_secs: Option<u64>,
    pub unresolved_secs: Option<u64>,
}
impl Default for StalenessConfig {
    fn default() -> Self {
        Self {
            accessible_secs: None,
            not_accessible_secs: Some(30 * 24 * 60 * 60),
            unresolved_secs: Some(60 * 60),
        }
    }
}
impl StalenessConfig {
    pub fn accessible(&self) -> Option<Duration> {
        self.accessible_secs.map(Duration::from_secs)
    }

    pub fn not_accessible(&self) -> Option<Duration> {
        self.not_accessible_secs.map(Duration::from_secs)
    }

    pub fn unresolved(&self) -> Option<Duration> {
        self.unresolved_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteamConfig {
    /// Web API key, required for reading owned games.
    pub api_key: Option<String>,
    pub owned_games_url: String,
    pub store_url: String,
    /// Overrides the default `sge-steam/<version>` user agent.
    pub user_agent: Option<String>,
    pub timeout_secs: u64,
}
impl Default for SteamConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            owned_games_url: "https://api.steampowered.com/IPlayerService/GetOwnedGames/v0001/".to_string(),
            store_url: "https://store.steampowered.com/api/appdetails".to_string(),
            user_agent: None,
            timeout_secs: 15,
        }
    }
}
impl SteamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Store request pacing, shared by every worker of every export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub requests: u32,
    pub window_ms: u64,
    /// Pause applied to all callers after the store answers `429`.
    pub cool_off_secs: u64,
}
impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests: 1,
            window_ms: 1500,
            cool_off_secs: 60,
        }
    }
}
impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn cool_off(&self) -> Duration {
        Duration::from_secs(self.cool_off_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}
impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 1000,
            max_delay_ms: 30_000,
        }
    }
}
impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub format: Format,
}

impl Config {
    /// Where the configuration file is looked for when none is given.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", APPLICATION).map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Assemble the provider stack without extracting it.
    ///
    /// An explicit `path` must exist; the default path is skipped when
    /// missing.
    pub fn figment(path: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        let file = match path {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::NotFound(path.display().to_string())),
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path().filter(|path| path.is_file()),
        };
        if let Some(file) = file {
            debug!(path = %file.display(), "reading configuration file");
            figment = match file.extension().and_then(|ext| ext.to_str()) {
                Some("yaml" | "yml") => figment.merge(Yaml::file_exact(&file)),
                Some("json") => figment.merge(Json::file_exact(&file)),
                _ => figment.merge(Toml::file_exact(&file)),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Load and validate the configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config: Self = Self::figment(path)?.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no component can work with.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str| -> Result<()> { exn::bail!(ErrorKind::Invalid(message.to_string())) };
        if self.rate_limit.requests == 0 {
            return invalid("rate_limit.requests must be at least 1");
        }
        if self.rate_limit.window_ms == 0 {
            return invalid("rate_limit.window_ms must be at least 1");
        }
        if self.steam.timeout_secs == 0 {
            return invalid("steam.timeout_secs must be at least 1");
        }
        if self.retry.max_delay_ms < self.retry.base_delay_ms {
            return invalid("retry.max_delay_ms must not be less than retry.base_delay_ms");
        }
        if self.workers == Some(0) {
            return invalid("workers must be at least 1");
        }
        Ok(())
    }

    /// The API key, or an error naming where to set it.
    pub fn api_key(&self) -> Result<&str> {
        match self.steam.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => exn::bail!(ErrorKind::Invalid(format!(
                "steam.api_key is not set (use {ENV_PREFIX}STEAM__API_KEY or the configuration file)"
            ))),
        }
    }
}
