//! Storage and autosave configuration

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Autosave never runs more often than this
pub const MIN_AUTOSAVE_INTERVAL_SECS: u64 = 30;

/// `storage` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StorageConfig {
    pub autosave_interval_seconds: u64,
    pub player_directory: PathBuf,
    /// Persist XP changes immediately. When off they wait for the next autosave;
    /// claims and premium changes are always written immediately.
    pub write_through_xp: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            autosave_interval_seconds: 120,
            player_directory: PathBuf::from("players"),
            write_through_xp: true,
        }
    }
}

impl StorageConfig {
    /// Configured interval with the minimum applied
    pub fn autosave_interval(&self) -> Duration {
        clamp_autosave_interval(Duration::from_secs(self.autosave_interval_seconds))
    }
}

#[inline]
pub fn clamp_autosave_interval(interval: Duration) -> Duration {
    interval.max(Duration::from_secs(MIN_AUTOSAVE_INTERVAL_SECS))
}
