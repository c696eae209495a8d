//! Reward tracks and effect descriptors

use crate::progress::PlayerId;
use ahash::AHashMap;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// `{name}` placeholder tokens inside effect templates
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{([a-z_]+)\}").expect("placeholder pattern is valid")
});

/// The two parallel reward tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    Free,
    Premium,
}

impl Track {
    pub const ALL: [Track; 2] = [Track::Free, Track::Premium];

    pub fn as_str(&self) -> &'static str {
        match self {
            Track::Free => "free",
            Track::Premium => "premium",
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Track {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "free" => Ok(Track::Free),
            "premium" => Ok(Track::Premium),
            other => Err(format!("unknown track: {}", other)),
        }
    }
}

/// One reward effect handed to the executor.
///
/// The core never interprets these; it only decides when they are due.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RewardEffect {
    /// A command template, e.g. `give {player} diamond 1`
    Command { command: String },
    /// A stack of items identified by the host's item id
    Item {
        item: String,
        #[serde(default = "default_item_amount")]
        amount: u32,
    },
    /// Anything else the host knows how to run
    Custom {
        name: String,
        #[serde(default)]
        params: serde_json::Map<String, serde_json::Value>,
    },
}

fn default_item_amount() -> u32 {
    1
}

impl RewardEffect {
    pub fn command(command: impl Into<String>) -> Self {
        RewardEffect::Command {
            command: command.into(),
        }
    }

    /// Parse a descriptor from a catalog entry: bare strings are commands,
    /// objects must carry a `kind` tag.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, String> {
        match value {
            serde_json::Value::String(command) => Ok(RewardEffect::command(command.clone())),
            serde_json::Value::Object(_) => {
                serde_json::from_value(value.clone()).map_err(|e| e.to_string())
            }
            other => Err(format!("unsupported reward descriptor: {}", other)),
        }
    }

    /// Substitute placeholders in the textual parts of this effect
    pub fn render(&self, placeholders: &AHashMap<&'static str, String>) -> RewardEffect {
        match self {
            RewardEffect::Command { command } => RewardEffect::Command {
                command: apply_placeholders(command, placeholders),
            },
            RewardEffect::Item { item, amount } => RewardEffect::Item {
                item: apply_placeholders(item, placeholders),
                amount: *amount,
            },
            RewardEffect::Custom { name, params } => RewardEffect::Custom {
                name: name.clone(),
                params: params
                    .iter()
                    .map(|(key, value)| {
                        let value = match value {
                            serde_json::Value::String(s) => {
                                serde_json::Value::String(apply_placeholders(s, placeholders))
                            }
                            other => other.clone(),
                        };
                        (key.clone(), value)
                    })
                    .collect(),
            },
        }
    }
}

/// Replace every known `{name}` token; unknown tokens are left untouched
pub fn apply_placeholders(template: &str, placeholders: &AHashMap<&'static str, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            placeholders
                .get(&caps[1])
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Everything the effect executor receives for one successful claim
#[derive(Debug, Clone, Copy)]
pub struct RewardGrant<'a> {
    pub player: PlayerId,
    pub tier: u32,
    pub required_xp: u64,
    pub track: Track,
    pub effects: &'a [RewardEffect],
}

impl RewardGrant<'_> {
    pub fn placeholders(&self) -> AHashMap<&'static str, String> {
        let mut map = AHashMap::with_capacity(4);
        map.insert("player", self.player.to_string());
        map.insert("tier", self.tier.to_string());
        map.insert("required_xp", self.required_xp.to_string());
        map.insert("track", self.track.to_string());
        map
    }

    /// Effects with grant placeholders substituted
    pub fn rendered_effects(&self) -> Vec<RewardEffect> {
        let placeholders = self.placeholders();
        self.effects.iter().map(|e| e.render(&placeholders)).collect()
    }
}
