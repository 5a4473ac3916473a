/*!
 * Configuration
 *
 * Engine tuning knobs and environment-driven settings for the binary
 */

use super::limits::{DEFAULT_STATUS_INTERVAL, DEFAULT_STEP_INTERVAL, DEFAULT_STEP_MB, TOUCH_PAGE_SIZE};
use std::time::Duration;
use thiserror::Error;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InflationConfig {
    /// Pause between steps
    pub step_interval: Duration,
    /// Stride for page touches
    pub page_size: usize,
    /// Query introspection after each step
    pub report_progress: bool,
}

impl Default for InflationConfig {
    fn default() -> Self {
        Self {
            step_interval: DEFAULT_STEP_INTERVAL,
            page_size: TOUCH_PAGE_SIZE,
            report_progress: true,
        }
    }
}

impl InflationConfig {
    pub fn with_step_interval(mut self, interval: Duration) -> Self {
        self.step_interval = interval;
        self
    }

    /// Zero is treated as the default page size
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = if page_size == 0 { TOUCH_PAGE_SIZE } else { page_size };
        self
    }

    pub fn with_progress_reports(mut self, enabled: bool) -> Self {
        self.report_progress = enabled;
        self
    }
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Environment variable {var} has invalid value {value:?}: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

pub const ENV_TARGET_MB: &str = "INFLATOR_TARGET_MB";
pub const ENV_STEP_MB: &str = "INFLATOR_STEP_MB";
pub const ENV_STEP_INTERVAL_MS: &str = "INFLATOR_STEP_INTERVAL_MS";
pub const ENV_STATUS_INTERVAL_SECS: &str = "INFLATOR_STATUS_INTERVAL_SECS";
pub const ENV_TRACE_JSON: &str = "INFLATOR_TRACE_JSON";

/// Settings for the `inflator` binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Inflate by this much on startup; idle when unset. Kept signed so a
    /// negative value reaches request validation and is rejected there.
    pub target_mb: Option<i64>,
    pub step_mb: i64,
    pub status_interval: Duration,
    pub trace_json: bool,
    pub engine: InflationConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            target_mb: None,
            step_mb: DEFAULT_STEP_MB as i64,
            status_interval: DEFAULT_STATUS_INTERVAL,
            trace_json: false,
            engine: InflationConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load using an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_TARGET_MB) {
            config.target_mb = Some(parse_var(ENV_TARGET_MB, &raw)?);
        }
        if let Some(raw) = lookup(ENV_STEP_MB) {
            config.step_mb = parse_var(ENV_STEP_MB, &raw)?;
        }
        if let Some(raw) = lookup(ENV_STEP_INTERVAL_MS) {
            let ms: u64 = parse_var(ENV_STEP_INTERVAL_MS, &raw)?;
            config.engine = config.engine.with_step_interval(Duration::from_millis(ms));
        }
        if let Some(raw) = lookup(ENV_STATUS_INTERVAL_SECS) {
            let secs: u64 = parse_var(ENV_STATUS_INTERVAL_SECS, &raw)?;
            config.status_interval = Duration::from_secs(secs.max(1));
        }
        if let Some(raw) = lookup(ENV_TRACE_JSON) {
            config.trace_json = raw == "1" || raw.eq_ignore_ascii_case("true");
        }

        Ok(config)
    }
}

fn parse_var<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        var,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}
