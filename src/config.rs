use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::{DEFAULT_API_URL, RetryPolicy};
use crate::error::{CleanerError, Result};

pub const DEFAULT_UI_URL: &str = "https://ui.honeycomb.io";
pub const DEFAULT_DAYS: u32 = 60;
pub const DEFAULT_COLUMN_DISPLAY_LIMIT: usize = 150;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

impl Config {
    /// Load configuration: an explicit file (argument or
    /// `HONEYCOMB_CLEANER_CONFIG`) or the global file, then environment
    /// overrides.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("HONEYCOMB_CLEANER_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(CleanerError::Config(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            if let Some(patch) = Self::load_patch(&path)? {
                config.merge_patch(patch);
            }
        } else if let Some(path) = global_config_path() {
            if let Some(patch) = Self::load_patch(&path)? {
                config.merge_patch(patch);
            }
        }

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse a TOML document on top of the defaults.
    pub fn from_toml(raw: &str) -> Result<Self> {
        let patch: ConfigPatch = toml::from_str(raw)
            .map_err(|err| CleanerError::Config(format!("parse config: {err}")))?;
        let mut config = Self::default();
        config.merge_patch(patch);
        Ok(config)
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| CleanerError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw).map_err(|err| {
            CleanerError::Config(format!("parse config {}: {err}", path.display()))
        })?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.api {
            self.api.merge(patch);
        }
        if let Some(patch) = patch.retry {
            self.retry.merge(patch);
        }
        if let Some(patch) = patch.defaults {
            self.defaults.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any variable source.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let string = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = string("HONEYCOMB_API_KEY") {
            self.api.key = Some(value);
        }
        if let Some(value) = string("HONEYCOMB_API_URL") {
            self.api.url = value;
        }
        if let Some(value) = string("HONEYCOMB_UI_URL") {
            self.api.ui_url = value;
        }
        if let Some(value) = parse_var::<u64>(
            "HONEYCOMB_CLEANER_TIMEOUT",
            string("HONEYCOMB_CLEANER_TIMEOUT"),
        )? {
            self.api.timeout = Duration::from_secs(value);
        }
        if let Some(value) = parse_var::<u32>(
            "HONEYCOMB_CLEANER_MAX_ATTEMPTS",
            string("HONEYCOMB_CLEANER_MAX_ATTEMPTS"),
        )? {
            self.retry.max_attempts = value;
        }
        if let Some(value) =
            parse_var::<u32>("HONEYCOMB_CLEANER_DAYS", string("HONEYCOMB_CLEANER_DAYS"))?
        {
            self.defaults.days = value;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default, skip_serializing)]
    pub key: Option<String>,
    #[serde(default = "default_api_url")]
    pub url: String,
    #[serde(default = "default_ui_url")]
    pub ui_url: String,
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: None,
            url: default_api_url(),
            ui_url: default_ui_url(),
            timeout: default_timeout(),
        }
    }
}

impl ApiConfig {
    fn merge(&mut self, patch: ApiPatch) {
        if let Some(value) = patch.key {
            self.key = Some(value);
        }
        if let Some(value) = patch.url {
            self.url = value;
        }
        if let Some(value) = patch.ui_url {
            self.ui_url = value;
        }
        if let Some(value) = patch.timeout {
            self.timeout = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    #[serde(with = "humantime_serde")]
    pub backoff: Duration,
    #[serde(with = "humantime_serde")]
    pub fallback_wait: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            backoff: policy.transport_backoff,
            fallback_wait: policy.fallback_wait,
        }
    }
}

impl RetryConfig {
    fn merge(&mut self, patch: RetryPatch) {
        if let Some(value) = patch.max_attempts {
            self.max_attempts = value;
        }
        if let Some(value) = patch.backoff {
            self.backoff = value;
        }
        if let Some(value) = patch.fallback_wait {
            self.fallback_wait = value;
        }
    }

    #[must_use]
    pub const fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            transport_backoff: self.backoff,
            fallback_wait: self.fallback_wait,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    pub days: u32,
    pub column_display_limit: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            days: DEFAULT_DAYS,
            column_display_limit: DEFAULT_COLUMN_DISPLAY_LIMIT,
        }
    }
}

impl DefaultsConfig {
    fn merge(&mut self, patch: DefaultsPatch) {
        if let Some(value) = patch.days {
            self.days = value;
        }
        if let Some(value) = patch.column_display_limit {
            self.column_display_limit = value;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub api: Option<ApiPatch>,
    pub retry: Option<RetryPatch>,
    pub defaults: Option<DefaultsPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ApiPatch {
    pub key: Option<String>,
    pub url: Option<String>,
    pub ui_url: Option<String>,
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RetryPatch {
    pub max_attempts: Option<u32>,
    #[serde(default, with = "humantime_serde")]
    pub backoff: Option<Duration>,
    #[serde(default, with = "humantime_serde")]
    pub fallback_wait: Option<Duration>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct DefaultsPatch {
    pub days: Option<u32>,
    pub column_display_limit: Option<usize>,
}

/// `~/.config/honeycomb-cleaner/config.toml` (platform equivalent).
#[must_use]
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("honeycomb-cleaner/config.toml"))
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_ui_url() -> String {
    DEFAULT_UI_URL.to_string()
}

const fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn parse_var<T>(key: &str, value: Option<String>) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|err| {
                CleanerError::Config(format!("invalid {key} value {raw}: {err}"))
            })
        })
        .transpose()
}
