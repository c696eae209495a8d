//! Catalog loading from JSON sources
//!
//! Expected format:
//! `{"settings": {...}, "tiers": {"1": {"required-xp": 1000, "free": {"rewards": [...]}, ...}}}`
//!
//! Structurally invalid entries are skipped and reported; they never fail the whole load.

use super::reward::RewardEffect;
use super::tier::{RewardList, Tier, TierPresentation};
use super::Catalog;
use crate::error::{BattlePassError, CatalogError};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{info, warn};

/// Result of a catalog load: the usable tiers plus every entry that was skipped
#[derive(Debug, Clone, Default)]
pub struct CatalogLoad {
    pub catalog: Catalog,
    pub errors: Vec<CatalogError>,
}

/// Presentation defaults from the `settings` section
struct PresentationDefaults {
    material: Value,
    amount: Value,
    glint: Value,
    flags: Value,
}

impl PresentationDefaults {
    fn from_settings(settings: Option<&Value>) -> Self {
        let get = |key: &str, fallback: Value| {
            settings
                .and_then(|s| s.get(key))
                .cloned()
                .unwrap_or(fallback)
        };
        Self {
            material: get("default-tier-material", Value::from("BOOK")),
            amount: get("default-tier-amount", Value::from(1)),
            glint: get("default-tier-glint", Value::from(false)),
            flags: get("default-tier-flags", Value::Array(Vec::new())),
        }
    }

    /// Fill missing presentation keys. Default flags only apply when the tier has no `item` section.
    fn apply(&self, number: u32, item: Option<&Value>) -> Value {
        let (mut merged, flags) = match item {
            Some(Value::Object(map)) => (map.clone(), Value::Array(Vec::new())),
            _ => (Map::new(), self.flags.clone()),
        };
        merged
            .entry("material")
            .or_insert_with(|| self.material.clone());
        merged.entry("amount").or_insert_with(|| self.amount.clone());
        merged.entry("glint").or_insert_with(|| self.glint.clone());
        merged.entry("flags").or_insert(flags);
        merged
            .entry("name")
            .or_insert_with(|| Value::from(format!("&eTier {}", number)));
        Value::Object(merged)
    }
}

/// Load a catalog from a parsed JSON document
pub fn load_catalog(source: &Value) -> CatalogLoad {
    let Some(tiers) = source.get("tiers").and_then(Value::as_object) else {
        warn!("Catalog source does not contain a 'tiers' section");
        return CatalogLoad {
            catalog: Catalog::default(),
            errors: vec![CatalogError::MissingTiers],
        };
    };

    let defaults = PresentationDefaults::from_settings(source.get("settings"));
    let mut parsed = Vec::with_capacity(tiers.len());
    let mut errors = Vec::new();

    for (key, entry) in tiers {
        match parse_tier(key, entry, &defaults) {
            Ok(tier) => {
                if parsed.iter().any(|t: &Tier| t.number == tier.number) {
                    errors.push(CatalogError::MalformedEntry {
                        key: key.clone(),
                        reason: format!("duplicate tier number {}", tier.number),
                    });
                } else {
                    parsed.push(tier);
                }
            }
            Err(err) => errors.push(err),
        }
    }

    for err in &errors {
        warn!("Skipping catalog entry: {}", err);
    }

    let catalog = Catalog::new(parsed);
    for drift in catalog.threshold_drift() {
        warn!(
            "Tier {} requires {} xp, less than tier {} ({} xp)",
            drift.higher_tier, drift.higher_required_xp, drift.lower_tier, drift.lower_required_xp
        );
    }
    info!("Loaded {} battle pass tiers", catalog.len());

    CatalogLoad { catalog, errors }
}

/// Parse and load a catalog from JSON text
pub fn load_catalog_str(json: &str) -> Result<CatalogLoad, CatalogError> {
    let source: Value =
        serde_json::from_str(json).map_err(|e| CatalogError::Parse(e.to_string()))?;
    Ok(load_catalog(&source))
}

/// Read and load a catalog file
pub fn load_catalog_file(path: impl AsRef<Path>) -> crate::error::Result<CatalogLoad> {
    let text = std::fs::read_to_string(path.as_ref())?;
    load_catalog_str(&text).map_err(BattlePassError::from)
}

fn parse_tier(key: &str, entry: &Value, defaults: &PresentationDefaults) -> Result<Tier, CatalogError> {
    // tier 0 is reserved for "nothing unlocked yet"
    let number = key
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| CatalogError::InvalidTierKey(key.to_string()))?;

    let Some(entry) = entry.as_object() else {
        return Err(CatalogError::MalformedEntry {
            key: key.to_string(),
            reason: "tier entry is not an object".to_string(),
        });
    };

    let required_xp = match entry.get("required-xp") {
        None => u64::from(number) * 1000,
        Some(value) => match value.as_i64() {
            Some(xp) if xp < 0 => {
                return Err(CatalogError::NegativeRequiredXp {
                    tier: number,
                    required_xp: xp,
                })
            }
            Some(xp) => xp as u64,
            None => value.as_u64().ok_or_else(|| CatalogError::MalformedEntry {
                key: key.to_string(),
                reason: format!("required-xp is not an integer: {}", value),
            })?,
        },
    };

    let free = entry.get("free");
    let premium = entry.get("premium");

    Ok(Tier {
        number,
        required_xp,
        free_rewards: parse_rewards(key, free)?,
        premium_rewards: parse_rewards(key, premium)?,
        presentation: TierPresentation {
            item: defaults.apply(number, entry.get("item")),
            free_preview: string_list(free.and_then(|t| t.get("preview"))),
            premium_preview: string_list(premium.and_then(|t| t.get("preview"))),
        },
    })
}

fn parse_rewards(key: &str, track: Option<&Value>) -> Result<RewardList, CatalogError> {
    let Some(rewards) = track.and_then(|t| t.get("rewards")) else {
        return Ok(RewardList::new());
    };
    let Some(rewards) = rewards.as_array() else {
        return Err(CatalogError::MalformedEntry {
            key: key.to_string(),
            reason: "rewards is not a list".to_string(),
        });
    };

    rewards
        .iter()
        .map(|value| {
            RewardEffect::from_value(value).map_err(|reason| CatalogError::MalformedEntry {
                key: key.to_string(),
                reason,
            })
        })
        .collect()
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Track;
    use serde_json::json;

    #[test]
    fn test_load_basic_catalog() {
        let load = load_catalog(&json!({
            "tiers": {
                "2": {"required-xp": 2000, "free": {"rewards": ["a"]}, "premium": {"rewards": ["b"]}},
                "1": {"required-xp": 1000, "free": {"rewards": ["c"], "preview": ["&a+1"]}}
            }
        }));

        assert!(load.errors.is_empty());
        let catalog = load.catalog;
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.tiers()[0].number, 1);
        assert!(catalog.find_by_number(1).unwrap().rewards(Track::Premium).is_empty());
        assert_eq!(catalog.find_by_number(1).unwrap().preview(Track::Free), &["&a+1".to_string()]);
    }

    #[test]
    fn test_invalid_entries_are_skipped() {
        let load = load_catalog(&json!({
            "tiers": {
                "abc": {"required-xp": 10},
                "1": {"required-xp": -5},
                "2": {"required-xp": "lots"},
                "3": {"required-xp": 300, "free": {"rewards": [17]}},
                "4": "not an object",
                "5": {"required-xp": 500}
            }
        }));

        assert_eq!(load.catalog.len(), 1);
        assert_eq!(load.catalog.tiers()[0].number, 5);
        assert_eq!(load.errors.len(), 5);
        assert!(load
            .errors
            .contains(&CatalogError::InvalidTierKey("abc".to_string())));
        assert!(load.errors.contains(&CatalogError::NegativeRequiredXp {
            tier: 1,
            required_xp: -5
        }));
    }

    #[test]
    fn test_missing_tiers_section() {
        let load = load_catalog(&json!({"settings": {}}));
        assert!(load.catalog.is_empty());
        assert_eq!(load.errors, vec![CatalogError::MissingTiers]);
    }

    #[test]
    fn test_default_required_xp_and_presentation() {
        let load = load_catalog(&json!({
            "settings": {"default-tier-material": "PAPER", "default-tier-glint": true},
            "tiers": {"7": {"item": {"name": "Seven"}}}
        }));

        let tier = load.catalog.find_by_number(7).unwrap();
        assert_eq!(tier.required_xp, 7000);
        assert_eq!(tier.presentation.item["material"], json!("PAPER"));
        assert_eq!(tier.presentation.item["glint"], json!(true));
        assert_eq!(tier.presentation.item["name"], json!("Seven"));
    }

    #[test]
    fn test_default_flags_only_without_item_section() {
        let load = load_catalog(&json!({
            "settings": {"default-tier-flags": ["HIDE_ATTRIBUTES"]},
            "tiers": {
                "1": {},
                "2": {"item": {"material": "EMERALD"}},
                "3": {"item": {"flags": ["HIDE_ENCHANTS"]}}
            }
        }));

        let flags = |n: u32| load.catalog.find_by_number(n).unwrap().presentation.item["flags"].clone();
        assert_eq!(flags(1), json!(["HIDE_ATTRIBUTES"]));
        assert_eq!(flags(2), json!([]));
        assert_eq!(flags(3), json!(["HIDE_ENCHANTS"]));
    }

    #[test]
    fn test_duplicate_numeric_keys() {
        let load = load_catalog(&json!({
            "tiers": {"1": {"required-xp": 100}, "01": {"required-xp": 200}}
        }));
        assert_eq!(load.catalog.len(), 1);
        assert_eq!(load.errors.len(), 1);
    }

    #[test]
    fn test_unparsable_text() {
        assert!(matches!(load_catalog_str("{not json"), Err(CatalogError::Parse(_))));
    }
}
