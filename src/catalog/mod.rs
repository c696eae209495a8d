//! Tier catalog module
//!
//! Immutable tier ladder, its loader, and the reload-swapped snapshot handle
//! the progression engine reads through.

mod loader;
mod reward;
mod snapshot;
mod tier;


pub use loader::*;
pub use reward::*;
pub use snapshot::*;
pub use tier::*;

/// A loaded tier ladder, sorted by tier number
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    tiers: Vec<Tier>,
}

/// Adjacent tiers whose thresholds run backwards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdDrift {
    pub lower_tier: u32,
    pub lower_required_xp: u64,
    pub higher_tier: u32,
    pub higher_required_xp: u64,
}

impl Catalog {
    /// Build a catalog from tiers in any order. Later duplicates of a tier number are dropped.
    pub fn new(mut tiers: Vec<Tier>) -> Self {
        tiers.sort_by_key(|t| t.number);
        tiers.dedup_by_key(|t| t.number);
        Self { tiers }
    }

    /// Generated ladder used when no catalog source exists yet
    pub fn generate_default(count: u32) -> Self {
        let tiers = (1..=count)
            .map(|number| {
                let bottles = (number / 4).max(1);
                let diamonds = (number / 10).max(1);
                let mut tier = Tier::new(
                    number,
                    u64::from(number) * 1000,
                    [RewardEffect::command(format!(
                        "give {{player}} experience_bottle {}",
                        bottles
                    ))],
                    [RewardEffect::command(format!(
                        "give {{player}} diamond {}",
                        diamonds
                    ))],
                );
                tier.presentation = TierPresentation {
                    item: serde_json::json!({
                        "material": "BOOK",
                        "amount": 1,
                        "name": format!("&eTier {}", number),
                        "glint": number % 10 == 0,
                        "flags": ["HIDE_ATTRIBUTES"],
                    }),
                    free_preview: vec![format!("&a+{} XP Bottles", bottles)],
                    premium_preview: vec![format!("&6+{} Diamonds", diamonds)],
                };
                tier
            })
            .collect();
        Self::new(tiers)
    }

    #[inline]
    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    pub fn find_by_number(&self, number: u32) -> Option<&Tier> {
        self.tiers
            .binary_search_by_key(&number, |t| t.number)
            .ok()
            .map(|idx| &self.tiers[idx])
    }

    /// Highest tier number, 0 when empty
    pub fn max_tier_number(&self) -> u32 {
        self.tiers.last().map(|t| t.number).unwrap_or(0)
    }

    /// Highest tier number whose threshold is met, 0 if none
    pub fn current_tier(&self, xp: u64) -> u32 {
        self.tiers
            .iter()
            .rev()
            .find(|t| t.required_xp <= xp)
            .map(|t| t.number)
            .unwrap_or(0)
    }

    /// First tier numbered above `number`
    pub fn next_tier_after(&self, number: u32) -> Option<&Tier> {
        let idx = self.tiers.partition_point(|t| t.number <= number);
        self.tiers.get(idx)
    }

    /// Threshold of `number`, 0 when the tier does not exist
    pub fn required_xp_for(&self, number: u32) -> u64 {
        self.find_by_number(number).map(|t| t.required_xp).unwrap_or(0)
    }

    /// Places where a higher tier number needs less XP than the tier before it
    pub fn threshold_drift(&self) -> Vec<ThresholdDrift> {
        self.tiers
            .windows(2)
            .filter(|pair| pair[1].required_xp < pair[0].required_xp)
            .map(|pair| ThresholdDrift {
                lower_tier: pair[0].number,
                lower_required_xp: pair[0].required_xp,
                higher_tier: pair[1].number,
                higher_required_xp: pair[1].required_xp,
            })
            .collect()
    }
}
