//! Configuration module
//!
//! Engine configuration loaded from JSON. Every key is optional; missing
//! sections and fields take the defaults documented on each struct.

mod premium;
mod storage;
mod xp_source;

pub use premium::*;
pub use storage::*;
pub use xp_source::*;

use crate::error::{BattlePassError, Result};
use serde::Deserialize;
use std::path::Path;

/// Top-level engine configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EngineConfig {
    pub premium: PremiumConfig,
    pub storage: StorageConfig,
    pub xp_sources: XpSourcesConfig,
}

impl EngineConfig {
    /// Parse configuration from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| BattlePassError::InvalidConfig(e.to_string()))
    }

    /// Read configuration from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }
}
