// =============================================================================
// Runtime Configuration — service settings with atomic save
// =============================================================================
//
// Everything the snapshot service needs to reach its data providers and bind
// its HTTP surface.  The file is plain JSON; every field carries a serde
// default so an older or partial file always loads.
//
// Precedence: built-in defaults < `snapshot_config.json` < environment
// (`SNAPSHOT_BIND_ADDR`, `SNAPSHOT_EXCHANGE_SUFFIX`, `SNAPSHOT_HISTORY_RANGE`).
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.
// =============================================================================

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Default on-disk location, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "snapshot_config.json";

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_true() -> bool {
    true
}

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_yahoo_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_exchange_suffix() -> String {
    ".NS".to_string()
}

fn default_history_range() -> String {
    "2y".to_string()
}

fn default_nse_base_url() -> String {
    "https://www.nseindia.com".to_string()
}

fn default_http_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}

// =============================================================================
// RuntimeConfig
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    // --- Serving ------------------------------------------------------------

    /// Address the HTTP API listens on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    // --- Price history --------------------------------------------------------

    #[serde(default = "default_yahoo_base_url")]
    pub yahoo_base_url: String,

    /// Appended to bare tickers before querying the chart endpoint
    /// (`TCS` -> `TCS.NS`).
    #[serde(default = "default_exchange_suffix")]
    pub exchange_suffix: String,

    /// Chart range parameter, e.g. `1y`, `2y`, `5y`.  Two years leaves room
    /// for the 200-session EMA and the 52-week window.
    #[serde(default = "default_history_range")]
    pub history_range: String,

    // --- Enrichments ----------------------------------------------------------

    #[serde(default = "default_nse_base_url")]
    pub nse_base_url: String,

    #[serde(default = "default_true")]
    pub enable_option_chain: bool,

    #[serde(default = "default_true")]
    pub enable_corporate_calendar: bool,

    // --- HTTP -----------------------------------------------------------------

    /// Per-request timeout for every outbound call.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            yahoo_base_url: default_yahoo_base_url(),
            exchange_suffix: default_exchange_suffix(),
            history_range: default_history_range(),
            nse_base_url: default_nse_base_url(),
            enable_option_chain: true,
            enable_corporate_calendar: true,
            http_timeout_secs: default_http_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            bind_addr = %config.bind_addr,
            history_range = %config.history_range,
            "runtime config loaded"
        );
        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise runtime config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "runtime config saved (atomic)");
        Ok(())
    }

    /// Apply `SNAPSHOT_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup.  Blank values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(addr) = get("SNAPSHOT_BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(suffix) = get("SNAPSHOT_EXCHANGE_SUFFIX") {
            self.exchange_suffix = suffix;
        }
        if let Some(range) = get("SNAPSHOT_HISTORY_RANGE") {
            self.history_range = range;
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.max(1))
    }
}

// =============================================================================
// Tests
// =============================================================================
