use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, error};

const DEFAULT_CONFIG_NAME: &str = "ci-notify.toml";

pub const WEBHOOK_URL_ENV: &str = "CUSTOM_WEBHOOK_URL";
pub const API_KEY_ENV: &str = "CUSTOM_API_KEY";

/// Ceiling for the single outbound request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolved settings handed to the notifier. Never read from ambient state after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub webhook_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

/// On-disk shape of `ci-notify.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub webhook_url: Option<String>,
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            webhook_url: None,
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Config {
    pub fn new(webhook_url: Option<String>, api_key: Option<String>) -> Self {
        Self {
            webhook_url: non_empty(webhook_url),
            api_key: non_empty(api_key),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolve configuration from the process environment, falling back to a config file.
    ///
    /// An explicit `path_override` must exist and parse. Otherwise `ci-notify.toml` is
    /// searched upward from the current directory; a missing or broken discovered file
    /// is skipped, the latter with an error log.
    pub fn load(path_override: Option<PathBuf>) -> Result<Self> {
        let file = match path_override {
            Some(p) => FileConfig::read(&p)?,
            None => FileConfig::discover(std::env::current_dir().ok()),
        };
        Ok(Self::resolve(
            file,
            std::env::var(WEBHOOK_URL_ENV).ok(),
            std::env::var(API_KEY_ENV).ok(),
        ))
    }

    /// Merge file values with environment values. Non-empty environment values win.
    pub fn resolve(file: FileConfig, env_url: Option<String>, env_key: Option<String>) -> Self {
        Self::new(
            non_empty(env_url).or(file.webhook_url),
            non_empty(env_key).or(file.api_key),
        )
    }

    pub fn webhook_url(&self) -> Option<&str> {
        self.webhook_url.as_deref()
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}

impl FileConfig {
    /// Search upward from `start` for `ci-notify.toml`. Never fails.
    pub fn discover(start: Option<PathBuf>) -> Self {
        let Some(path) = start.and_then(|dir| find_upwards(dir, DEFAULT_CONFIG_NAME)) else {
            return Self::default();
        };
        match Self::read(&path) {
            Ok(cfg) => {
                debug!("Loaded config from {}", path.display());
                cfg
            }
            Err(e) => {
                error!("Ignoring config file: {e:#}");
                Self::default()
            }
        }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Reading config file {}", path.display()))?;
        let cfg: FileConfig = toml::from_str(&contents)
            .with_context(|| format!("Parsing TOML config {}", path.display()))?;
        Ok(cfg)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn find_upwards(mut dir: PathBuf, file_name: &str) -> Option<PathBuf> {
    loop {
        let candidate = dir.join(file_name);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}
