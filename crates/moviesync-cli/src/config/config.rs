//! `AppConfig` struct and TOML loading.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::TimeDelta;
use moviesync_api::omdb::PlotLength;
use serde::Deserialize;
use url::Url;

/// Environment variable that overrides `omdb.api_key`.
pub const API_KEY_ENV: &str = "OMDB_API_KEY";

/// Config file name inside the config directory.
const CONFIG_FILE: &str = "config.toml";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// OMDb client settings.
    #[serde(default)]
    pub omdb: OmdbConfig,
    /// Search throttle settings.
    #[serde(default)]
    pub search: SearchConfig,
}

/// OMDb client configuration.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OmdbConfig {
    /// API key. `OMDB_API_KEY` takes precedence when set.
    pub api_key: Option<String>,
    /// Plot length requested by title lookups.
    pub plot: PlotLength,
    /// Minimum interval between requests in milliseconds.
    pub min_interval_ms: u64,
    /// Endpoint override (e.g. a local mock server).
    pub base_url: Option<String>,
}

impl Default for OmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            plot: PlotLength::Short,
            min_interval_ms: 100,
            base_url: None,
        }
    }
}

impl OmdbConfig {
    /// Returns the minimum request interval.
    #[must_use]
    pub const fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    /// Parses `base_url`, if set.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid URL.
    pub fn base_url(&self) -> Result<Option<Url>> {
        self.base_url
            .as_deref()
            .map(|raw| Url::parse(raw).with_context(|| format!("invalid omdb.base_url '{raw}'")))
            .transpose()
    }

    /// Returns the API key from `env_key` if set and non-blank, otherwise
    /// the configured one.
    #[must_use]
    pub fn resolve_api_key(&self, env_key: Option<String>) -> Option<String> {
        env_key
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.api_key.clone())
    }
}

/// Search throttle configuration.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SearchConfig {
    /// Hours before the same normalized term may be searched again.
    pub cooldown_hours: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { cooldown_hours: 24 }
    }
}

impl SearchConfig {
    /// Returns the cooldown as a [`TimeDelta`].
    #[must_use]
    pub fn cooldown(&self) -> TimeDelta {
        TimeDelta::hours(i64::from(self.cooldown_hours))
    }
}

impl AppConfig {
    /// Loads `config.toml` from `dir`, or from `~/.config/moviesync` when
    /// `dir` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if `HOME` is unset (without `dir`) or the file
    /// exists but cannot be read or parsed.
    pub fn load_for_dir(dir: Option<&PathBuf>) -> Result<Self> {
        let path = config_path(dir.map(PathBuf::as_path))?;
        Self::load(&path)
    }

    /// Loads config from a TOML file. Returns default if file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }
}

/// Returns the config file path for `dir`.
fn config_path(dir: Option<&Path>) -> Result<PathBuf> {
    let base = match dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::var_os("HOME")
            .map(PathBuf::from)
            .context("HOME is not set; pass --dir")?
            .join(".config")
            .join("moviesync"),
    };
    Ok(base.join(CONFIG_FILE))
}
