//! Application configuration.
//!
//! Configuration is stored in `<config dir>/atrium/config.yaml` and includes:
//! - The API base URL (GraphQL lives at `<api_url>/graphql`, login at `<api_url>/login`)
//! - View defaults: page size, keyword quiet period and the post-delete page policy
//! - HTTP timeouts handed to the transport
//!
//! `ATRIUM_CONFIG` points at an alternative file and `ATRIUM_API_URL`
//! overrides the stored base URL.

use std::env;
use std::fmt;
use std::fs;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AtriumError, Result};
use crate::view::{PageClampPolicy, ViewOptions};

pub const CONFIG_ENV: &str = "ATRIUM_CONFIG";
pub const API_URL_ENV: &str = "ATRIUM_API_URL";

const DEFAULT_API_URL: &str = "http://localhost:4000";

/// Keys accepted by `config set`.
pub const KEYS: &[&str] = &[
    "api_url",
    "page_size",
    "debounce_ms",
    "clamp_policy",
    "request_timeout_secs",
    "connect_timeout_secs",
];

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the ERP API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Rows per page (default: 10)
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Quiet period before a typed keyword is searched, in milliseconds (default: 500)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// What happens to the current page when a delete empties it
    #[serde(default)]
    pub clamp_policy: PageClampPolicy,

    /// Whole-request timeout in seconds (default: 60)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Connect timeout in seconds (default: 30)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_page_size() -> u32 {
    10
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_request_timeout() -> u64 {
    60
}

fn default_connect_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            page_size: default_page_size(),
            debounce_ms: default_debounce_ms(),
            clamp_policy: PageClampPolicy::default(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "api_url: {}", self.api_url)?;
        writeln!(f, "page_size: {}", self.page_size)?;
        writeln!(f, "debounce_ms: {}", self.debounce_ms)?;
        writeln!(f, "clamp_policy: {}", self.clamp_policy)?;
        writeln!(f, "request_timeout_secs: {}", self.request_timeout_secs)?;
        write!(f, "connect_timeout_secs: {}", self.connect_timeout_secs)
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = env::var(CONFIG_ENV)
            && !path.is_empty()
        {
            return Ok(PathBuf::from(path));
        }
        ProjectDirs::from("", "", "atrium")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
            .ok_or_else(|| AtriumError::Config("no home directory to store config in".into()))
    }

    /// Load configuration with `ATRIUM_API_URL` applied on top of the file.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        if let Ok(url) = env::var(API_URL_ENV)
            && !url.is_empty()
        {
            config.api_url = url;
        }
        config.validate()?;
        Ok(config)
    }

    /// Load the file alone, or return default if not found.
    pub fn load_file() -> Result<Self> {
        let path = Self::config_path()?;
        let config = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                AtriumError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to read config at {}: {}", path.display(), e),
                ))
            })?;
            serde_yaml_ng::from_str(&content)?
        } else {
            Config::default()
        };
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<PathBuf> {
        self.validate()?;
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AtriumError::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create directory for config at {}: {}",
                        parent.display(),
                        e
                    ),
                ))
            })?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(&path, content).map_err(|e| {
            AtriumError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write config at {}: {}", path.display(), e),
            ))
        })?;

        Ok(path)
    }

    /// Reject values no view or client could work with.
    pub fn validate(&self) -> Result<()> {
        self.api_base()?;
        if self.page_size == 0 {
            return Err(AtriumError::Config("page_size must be at least 1".into()));
        }
        if self.request_timeout_secs == 0 || self.connect_timeout_secs == 0 {
            return Err(AtriumError::Config("timeouts must be at least 1 second".into()));
        }
        Ok(())
    }

    /// Update one key from its string form, as typed on the command line.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "api_url" => {
                Url::parse(value)
                    .map_err(|e| AtriumError::Config(format!("invalid api_url '{value}': {e}")))?;
                self.api_url = value.to_string();
            }
            "page_size" => self.page_size = parse_number(key, value)?,
            "debounce_ms" => self.debounce_ms = parse_number(key, value)?,
            "clamp_policy" => self.clamp_policy = value.parse()?,
            "request_timeout_secs" => self.request_timeout_secs = parse_number(key, value)?,
            "connect_timeout_secs" => self.connect_timeout_secs = parse_number(key, value)?,
            other => {
                return Err(AtriumError::Config(format!(
                    "unknown key '{other}' (expected one of: {})",
                    KEYS.join(", ")
                )));
            }
        }
        self.validate()
    }

    /// API base URL, always ending in a slash so relative joins append.
    pub fn api_base(&self) -> Result<Url> {
        let mut url = Url::parse(self.api_url.trim())
            .map_err(|e| AtriumError::Config(format!("invalid api_url '{}': {e}", self.api_url)))?;
        if url.cannot_be_a_base() {
            return Err(AtriumError::Config(format!(
                "api_url '{}' cannot be used as a base URL",
                self.api_url
            )));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    pub fn graphql_url(&self) -> Result<Url> {
        Ok(self.api_base()?.join("graphql")?)
    }

    /// HTTP client with the configured timeouts.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.request_timeout_secs))
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .user_agent(concat!("atrium/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(client)
    }

    pub fn view_options(&self) -> Result<ViewOptions> {
        let page_size = NonZeroU32::new(self.page_size)
            .ok_or_else(|| AtriumError::Config("page_size must be at least 1".into()))?;
        Ok(ViewOptions {
            page_size,
            quiet_period: Duration::from_millis(self.debounce_ms),
            clamp_policy: self.clamp_policy,
            ..ViewOptions::default()
        })
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| AtriumError::Config(format!("{key} must be a non-negative integer, got '{value}'")))
}
