use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::policy::AccessPolicy;

pub const DEFAULT_BIND: &str = "0.0.0.0:7000";

/// Startup configuration: bind address, delivery timeout, and the access
/// policy mapping each secret name to its allow-listed receivers.
#[derive(Debug, Clone, Deserialize)]
pub struct CourierConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_delivery_timeout_secs")]
    pub delivery_timeout_secs: u64,
    #[serde(default)]
    pub secrets: HashMap<String, HashSet<String>>,
}

impl Default for CourierConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            delivery_timeout_secs: default_delivery_timeout_secs(),
            secrets: HashMap::new(),
        }
    }
}

impl CourierConfig {
    /// Read configuration from a JSON file, or fall back to defaults (empty
    /// policy) when no path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    pub fn access_policy(&self) -> AccessPolicy {
        AccessPolicy::new(self.secrets.clone())
    }
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

fn default_delivery_timeout_secs() -> u64 {
    10
}
