//! Gameplay XP source configuration

use serde::Deserialize;
use std::collections::HashMap;

/// `xp-sources.playtime`
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PlaytimeConfig {
    pub enabled: bool,
    pub interval_seconds: u64,
    pub xp_per_interval: i64,
    pub notify_player: bool,
}

impl Default for PlaytimeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: 300,
            xp_per_interval: 50,
            notify_player: false,
        }
    }
}

impl PlaytimeConfig {
    /// Interval with the 10 second floor applied
    pub fn interval_secs(&self) -> u64 {
        self.interval_seconds.max(10)
    }

    /// Award per tick, at least 1
    pub fn award(&self) -> i64 {
        self.xp_per_interval.max(1)
    }
}

/// A per-kind value table (`mob-kill`, `block-break`)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ValueTableConfig {
    /// Unset means the source's own default applies
    pub enabled: Option<bool>,
    /// Keyed by upper-case kind name; `default` is the fallback
    pub values: Option<HashMap<String, i64>>,
    pub notify_player: bool,
}

impl ValueTableConfig {
    /// XP for `kind`, falling back to the `default` entry, then 0
    pub fn value_for(&self, kind: &str) -> i64 {
        let Some(values) = &self.values else {
            return 0;
        };
        values
            .get(&kind.to_ascii_uppercase())
            .or_else(|| values.get("default"))
            .copied()
            .unwrap_or(0)
    }
}

/// `xp-sources` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct XpSourcesConfig {
    pub playtime: PlaytimeConfig,
    pub mob_kill: ValueTableConfig,
    pub block_break: ValueTableConfig,
    pub ignore_creative: bool,
    pub ignore_spectator: bool,
}

impl Default for XpSourcesConfig {
    fn default() -> Self {
        Self {
            playtime: PlaytimeConfig::default(),
            mob_kill: ValueTableConfig::default(),
            block_break: ValueTableConfig::default(),
            ignore_creative: true,
            ignore_spectator: true,
        }
    }
}

impl XpSourcesConfig {
    pub fn mob_kill_enabled(&self) -> bool {
        self.mob_kill.enabled.unwrap_or(true)
    }

    pub fn block_break_enabled(&self) -> bool {
        self.block_break.enabled.unwrap_or(false)
    }
}
