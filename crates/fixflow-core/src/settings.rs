//! Host settings: TOML file plus `FIXFLOW_*` environment overrides.
//!
//! ```toml
//! fallback_strategy = "with_fallback"
//! probe_interval_secs = 300
//!
//! [split]
//! chunk_size = 400
//! line_overlap = 40
//! ```

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::catalog::WITH_FALLBACK;
use crate::splitter::{SplitConfig, SplitError};

/// Errors produced while building settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value {value:?} for {var}")]
    InvalidOverride { var: String, value: String },

    #[error("invalid split config: {0}")]
    InvalidSplit(#[from] SplitError),

    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Result type for settings operations.
pub type SettingsResult<T> = std::result::Result<T, SettingsError>;

/// Everything a host needs to wire the fix orchestration core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixflowSettings {
    pub split: SplitConfig,
    /// Fallback chain used to resolve backends.
    pub fallback_strategy: String,
    /// Seconds between availability refreshes.
    pub probe_interval_secs: u64,
    /// Size of the splitter's long-lived worker pool.
    pub pool_workers: usize,
    /// Emit JSON log lines.
    pub log_json: bool,
    /// Default verbosity when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for FixflowSettings {
    fn default() -> Self {
        Self {
            split: SplitConfig::default(),
            fallback_strategy: WITH_FALLBACK.to_string(),
            probe_interval_secs: 300,
            pool_workers: 4,
            log_json: false,
            log_level: "info".to_string(),
        }
    }
}

impl FixflowSettings {
    /// Defaults with process environment overrides applied.
    pub fn from_env() -> SettingsResult<Self> {
        let mut settings = Self::default();
        settings.apply_env_overrides()?;
        Ok(settings)
    }

    pub fn from_toml_str(text: &str) -> SettingsResult<Self> {
        let settings: Self = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load a settings file and apply environment overrides on top.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        let mut settings = Self::from_toml_str(&text)
            .with_context(|| format!("failed to load settings from {}", path.display()))?;
        settings
            .apply_env_overrides()
            .context("failed to apply FIXFLOW_* overrides")?;
        Ok(settings)
    }

    pub fn apply_env_overrides(&mut self) -> SettingsResult<()> {
        self.apply_overrides_from(|var| std::env::var(var).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> SettingsResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parsed(&lookup, "FIXFLOW_CHUNK_SIZE")? {
            self.split.chunk_size = v;
        }
        if let Some(v) = parsed(&lookup, "FIXFLOW_LINE_OVERLAP")? {
            self.split.line_overlap = v;
        }
        if let Some(v) = parsed(&lookup, "FIXFLOW_MAX_PARALLEL_WORKERS")? {
            self.split.max_parallel_workers = v;
        }
        if let Some(v) = parsed(&lookup, "FIXFLOW_CHUNK_TIMEOUT_SECS")? {
            self.split.chunk_timeout_seconds = v;
        }
        if let Some(v) = lookup("FIXFLOW_ENABLE_PARALLEL") {
            self.split.enable_parallel = parse_bool("FIXFLOW_ENABLE_PARALLEL", &v)?;
        }
        if let Some(v) = lookup("FIXFLOW_FALLBACK_STRATEGY") {
            let v = v.trim();
            if !v.is_empty() {
                self.fallback_strategy = v.to_string();
            }
        }
        if let Some(v) = lookup("FIXFLOW_LOG_FORMAT") {
            self.log_json = v.trim().eq_ignore_ascii_case("json");
        }
        if let Some(v) = lookup("FIXFLOW_LOG_LEVEL") {
            if crate::telemetry::parse_level(&v).is_none() {
                return Err(SettingsError::InvalidOverride {
                    var: "FIXFLOW_LOG_LEVEL".to_string(),
                    value: v,
                });
            }
            self.log_level = v.trim().to_ascii_lowercase();
        }
        self.validate()
    }

    pub fn validate(&self) -> SettingsResult<()> {
        self.split.validate()?;
        if self.pool_workers == 0 {
            return Err(SettingsError::Invalid("pool_workers must be > 0".to_string()));
        }
        if self.probe_interval_secs == 0 {
            return Err(SettingsError::Invalid(
                "probe_interval_secs must be > 0".to_string(),
            ));
        }
        if self.fallback_strategy.trim().is_empty() {
            return Err(SettingsError::Invalid(
                "fallback_strategy must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn probe_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.probe_interval_secs)
    }
}

fn parsed<F, T>(lookup: &F, var: &str) -> SettingsResult<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| SettingsError::InvalidOverride {
                var: var.to_string(),
                value: raw,
            }),
    }
}

fn parse_bool(var: &str, raw: &str) -> SettingsResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(SettingsError::InvalidOverride {
            var: var.to_string(),
            value: raw.to_string(),
        }),
    }
}
