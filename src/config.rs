//! Settings
//!
//! Read from `<config dir>/rendimentos/config.toml` when present, then
//! overridden by `RENDIMENTOS_*` environment variables. Every field has a
//! default, so a missing file is not an error.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::projection::{DEFAULT_HORIZON_MONTHS, DEFAULT_MAX_MONTHS};
use crate::rates::bcb::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
use crate::rates::provider::DEFAULT_TTL_SECS;
use crate::rates::refresh::DEFAULT_REFRESH_INTERVAL;

const CONFIG_FILENAME: &str = "config.toml";

/// Longest accepted cache TTL or refresh interval (30 days)
pub const MAX_INTERVAL_SECS: u64 = 30 * 24 * 60 * 60;

/// Largest accepted month ceiling (1000 years)
pub const MAX_MONTHS_LIMIT: u32 = 12_000;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub bcb_base_url: String,
    pub user_agent: String,
    pub cache_ttl_secs: u64,
    pub refresh_interval_secs: u64,
    pub horizon_months: u32,
    pub max_months: u32,
    /// Skip the network entirely and use fallback rates
    pub offline: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bcb_base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cache_ttl_secs: DEFAULT_TTL_SECS as u64,
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL.as_secs(),
            horizon_months: DEFAULT_HORIZON_MONTHS,
            max_months: DEFAULT_MAX_MONTHS,
            offline: false,
        }
    }
}

impl Settings {
    /// Load from the default location and apply environment overrides
    pub fn load() -> Result<Self> {
        let path = config_dir()?.join("rendimentos").join(CONFIG_FILENAME);
        let mut settings = Self::load_from(&path)?;
        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Load a specific file; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        for (name, secs) in [
            ("cache_ttl_secs", self.cache_ttl_secs),
            ("refresh_interval_secs", self.refresh_interval_secs),
        ] {
            if secs == 0 {
                return Err(anyhow!("{} must be greater than zero", name));
            }
            if secs > MAX_INTERVAL_SECS {
                return Err(anyhow!(
                    "{} must be at most {} (got {})",
                    name,
                    MAX_INTERVAL_SECS,
                    secs
                ));
            }
        }
        if self.max_months == 0 || self.max_months > MAX_MONTHS_LIMIT {
            return Err(anyhow!(
                "max_months must be between 1 and {} (got {})",
                MAX_MONTHS_LIMIT,
                self.max_months
            ));
        }
        if self.horizon_months == 0 || self.horizon_months > self.max_months {
            return Err(anyhow!(
                "horizon_months must be between 1 and max_months ({}), got {}",
                self.max_months,
                self.horizon_months
            ));
        }
        Ok(())
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("RENDIMENTOS_OFFLINE") {
            self.offline = v != "0" && !v.eq_ignore_ascii_case("false");
        }
        if let Some(url) = lookup("RENDIMENTOS_BCB_URL") {
            if !url.trim().is_empty() {
                self.bcb_base_url = url;
            }
        }
    }

    /// Saturates instead of overflowing for values `validate` would reject
    pub fn cache_ttl(&self) -> chrono::Duration {
        i64::try_from(self.cache_ttl_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

fn config_dir() -> Result<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(dir_spec::config_home)
        .ok_or_else(|| anyhow!("Could not determine config directory"))
}
