// src/config.rs
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::aggregator::EngineConfig;
use crate::cache::{CacheType, TtlPolicy};

const ENV_PATH: &str = "AGGREGATOR_CONFIG_PATH";
const DEFAULT_PATH: &str = "config/aggregator.toml";

fn default_provider_timeout_secs() -> u64 {
    12
}
fn default_max_page_size() -> usize {
    100
}
fn default_sweep_interval_secs() -> u64 {
    600
}

/// Deployment-level tuning for the engine and cache. Provider credentials
/// stay in the environment (see `main.rs`); this file only carries knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// Per-class TTL overrides in seconds, keyed by cache type name
    /// (`search`, `category`, `free`, `featured`, `recommendations`).
    #[serde(default)]
    pub ttl_overrides: HashMap<String, u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider_timeout_secs: default_provider_timeout_secs(),
            max_page_size: default_max_page_size(),
            sweep_interval_secs: default_sweep_interval_secs(),
            ttl_overrides: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an explicit TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// Load using env var + fallbacks:
    /// 1) $AGGREGATOR_CONFIG_PATH
    /// 2) config/aggregator.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("AGGREGATOR_CONFIG_PATH points to non-existent path"));
        }
        let default = PathBuf::from(DEFAULT_PATH);
        if default.exists() {
            return Self::load_from(&default);
        }
        Ok(Self::default())
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            provider_timeout: Duration::from_secs(self.provider_timeout_secs),
            max_page_size: self.max_page_size,
        }
    }

    /// Class TTLs with this config's overrides applied. Unknown class names
    /// are logged and skipped rather than rejected.
    pub fn ttl_policy(&self) -> TtlPolicy {
        let mut policy = TtlPolicy::default();
        for (name, secs) in &self.ttl_overrides {
            match CacheType::from_str(name) {
                Ok(t) => {
                    policy = policy.with_override(t, Duration::from_secs(*secs));
                }
                Err(_) => {
                    tracing::warn!(name, "ignoring TTL override for unknown cache type");
                }
            }
        }
        policy
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}
