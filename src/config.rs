//! Configuration management module
//!
//! Defaults, optional JSON file merge, then `SNAPGRID_*` environment
//! overrides, in that order. The keep-alive numbers that used to be magic
//! constants live here with documented units.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use browser_session::BrowserSessionConfig;
use serde::{Deserialize, Serialize};

/// Keep-alive accounting knobs for the session lifecycle controller.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct CaptureSettings {
    /// Maximum cumulative idle time before a session is torn down, in seconds.
    #[serde(default = "default_keep_alive_budget_secs")]
    pub keep_alive_budget_secs: u64,
    /// Length of one keep-alive timer tick, in seconds.
    #[serde(default = "default_idle_tick_secs")]
    pub idle_tick_secs: u64,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            keep_alive_budget_secs: default_keep_alive_budget_secs(),
            idle_tick_secs: default_idle_tick_secs(),
        }
    }
}

impl CaptureSettings {
    pub fn keep_alive_budget(&self) -> Duration {
        Duration::from_secs(self.keep_alive_budget_secs)
    }

    pub fn idle_tick(&self) -> Duration {
        Duration::from_secs(self.idle_tick_secs)
    }
}

fn default_keep_alive_budget_secs() -> u64 {
    60
}

fn default_idle_tick_secs() -> u64 {
    10
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    /// Directory capture artifacts are written under.
    #[serde(default = "default_storage_root")]
    pub storage_root: PathBuf,
    #[serde(default)]
    pub capture: CaptureSettings,
    #[serde(default)]
    pub browser: BrowserSessionConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            storage_root: default_storage_root(),
            capture: CaptureSettings::default(),
            browser: BrowserSessionConfig::default(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    ([127, 0, 0, 1], 8088).into()
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("./snapgrid-artifacts")
}

impl AppConfig {
    /// Loads configuration: defaults, then the JSON file if provided, then
    /// environment overrides.
    pub fn load(config_file: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match config_file {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                serde_json::from_str(&content)
                    .with_context(|| format!("invalid config file {}", path.display()))?
            }
            _ => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("SNAPGRID_BIND_ADDR") {
            if let Ok(addr) = value.parse() {
                self.bind_addr = addr;
            }
        }
        if let Ok(value) = std::env::var("SNAPGRID_STORAGE_ROOT") {
            if !value.trim().is_empty() {
                self.storage_root = PathBuf::from(value);
            }
        }
        if let Ok(value) = std::env::var("SNAPGRID_KEEP_ALIVE_BUDGET_SECS") {
            if let Ok(secs) = value.parse() {
                self.capture.keep_alive_budget_secs = secs;
            }
        }
        if let Ok(value) = std::env::var("SNAPGRID_IDLE_TICK_SECS") {
            if let Ok(secs) = value.parse() {
                self.capture.idle_tick_secs = secs;
            }
        }
    }
}
