//! Gameplay XP rules

use super::collaborators::XpSource;
use crate::config::XpSourcesConfig;
use crate::progress::PlayerId;
use std::time::Duration;

/// Player game mode as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameMode {
    #[default]
    Survival,
    Adventure,
    Creative,
    Spectator,
}

/// The acting player plus what the rules need to know about them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerContext {
    pub player: PlayerId,
    pub game_mode: GameMode,
}

impl PlayerContext {
    pub fn new(player: PlayerId, game_mode: GameMode) -> Self {
        Self { player, game_mode }
    }
}

/// Gameplay that can earn XP
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameplayEvent {
    MobKill { entity: String },
    BlockBreak { block: String },
    PlaytimeTick,
}

/// XP to award for one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpAward {
    pub amount: i64,
    pub source: XpSource,
    pub announce: bool,
}

/// Maps gameplay events to XP awards according to configuration
#[derive(Debug, Clone, Default)]
pub struct XpRules {
    config: XpSourcesConfig,
}

impl XpRules {
    pub fn new(config: XpSourcesConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &XpSourcesConfig {
        &self.config
    }

    fn ignores(&self, mode: GameMode) -> bool {
        (self.config.ignore_creative && mode == GameMode::Creative)
            || (self.config.ignore_spectator && mode == GameMode::Spectator)
    }

    /// Award for `event`, or `None` when the event earns nothing
    pub fn award_for(&self, mode: GameMode, event: &GameplayEvent) -> Option<XpAward> {
        if self.ignores(mode) {
            return None;
        }

        let award = match event {
            GameplayEvent::MobKill { entity } => {
                if !self.config.mob_kill_enabled() {
                    return None;
                }
                XpAward {
                    amount: self.config.mob_kill.value_for(entity),
                    source: XpSource::MobKill,
                    announce: self.config.mob_kill.notify_player,
                }
            }
            GameplayEvent::BlockBreak { block } => {
                if !self.config.block_break_enabled() {
                    return None;
                }
                XpAward {
                    amount: self.config.block_break.value_for(block),
                    source: XpSource::BlockBreak,
                    announce: self.config.block_break.notify_player,
                }
            }
            GameplayEvent::PlaytimeTick => {
                if !self.config.playtime.enabled {
                    return None;
                }
                XpAward {
                    amount: self.config.playtime.award(),
                    source: XpSource::Playtime,
                    announce: self.config.playtime.notify_player,
                }
            }
        };

        (award.amount > 0).then_some(award)
    }

    /// Playtime tick interval, `None` when playtime XP is off
    pub fn playtime_interval(&self) -> Option<Duration> {
        self.config
            .playtime
            .enabled
            .then(|| Duration::from_secs(self.config.playtime.interval_secs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValueTableConfig;
    use std::collections::HashMap;

    fn rules() -> XpRules {
        XpRules::new(XpSourcesConfig {
            mob_kill: ValueTableConfig {
                enabled: None,
                values: Some(HashMap::from([
                    ("ZOMBIE".to_string(), 10),
                    ("BAT".to_string(), 0),
                    ("default".to_string(), 3),
                ])),
                notify_player: true,
            },
            block_break: ValueTableConfig {
                enabled: Some(true),
                values: Some(HashMap::from([("DIAMOND_ORE".to_string(), 25)])),
                notify_player: false,
            },
            ..Default::default()
        })
    }

    fn mob(entity: &str) -> GameplayEvent {
        GameplayEvent::MobKill {
            entity: entity.to_string(),
        }
    }

    #[test]
    fn test_mob_kill_values() {
        let rules = rules();
        let award = rules.award_for(GameMode::Survival, &mob("zombie")).unwrap();
        assert_eq!(award.amount, 10);
        assert_eq!(award.source, XpSource::MobKill);
        assert!(award.announce);

        assert_eq!(rules.award_for(GameMode::Survival, &mob("SKELETON")).unwrap().amount, 3);
        assert!(rules.award_for(GameMode::Survival, &mob("BAT")).is_none());
    }

    #[test]
    fn test_ignored_game_modes() {
        let rules = rules();
        assert!(rules.award_for(GameMode::Creative, &mob("ZOMBIE")).is_none());
        assert!(rules.award_for(GameMode::Spectator, &GameplayEvent::PlaytimeTick).is_none());
        assert!(rules.award_for(GameMode::Adventure, &mob("ZOMBIE")).is_some());
    }

    #[test]
    fn test_block_break_without_default() {
        let rules = rules();
        let ore = GameplayEvent::BlockBreak {
            block: "DIAMOND_ORE".to_string(),
        };
        let dirt = GameplayEvent::BlockBreak {
            block: "DIRT".to_string(),
        };
        assert_eq!(rules.award_for(GameMode::Survival, &ore).unwrap().amount, 25);
        assert!(rules.award_for(GameMode::Survival, &dirt).is_none());
    }

    #[test]
    fn test_disabled_sources() {
        let rules = XpRules::default();
        let block = GameplayEvent::BlockBreak {
            block: "STONE".to_string(),
        };
        assert!(rules.award_for(GameMode::Survival, &block).is_none());
        // mob kills are on by default but have no value table
        assert!(rules.award_for(GameMode::Survival, &mob("ZOMBIE")).is_none());

        let tick = rules.award_for(GameMode::Survival, &GameplayEvent::PlaytimeTick).unwrap();
        assert_eq!(tick.amount, 50);
        assert_eq!(rules.playtime_interval(), Some(Duration::from_secs(300)));
    }
}
