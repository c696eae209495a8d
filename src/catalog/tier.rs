//! Tier value objects

use super::reward::{RewardEffect, Track};
use smallvec::SmallVec;

/// Most tiers grant one or two effects per track
pub type RewardList = SmallVec<[RewardEffect; 2]>;

/// Display data carried through for presentation collaborators
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TierPresentation {
    /// Item/icon description with catalog defaults already applied
    pub item: serde_json::Value,
    pub free_preview: Vec<String>,
    pub premium_preview: Vec<String>,
}

/// One rung of the ladder
#[derive(Debug, Clone, PartialEq)]
pub struct Tier {
    pub number: u32,
    pub required_xp: u64,
    pub free_rewards: RewardList,
    pub premium_rewards: RewardList,
    pub presentation: TierPresentation,
}

impl Tier {
    pub fn new(
        number: u32,
        required_xp: u64,
        free_rewards: impl IntoIterator<Item = RewardEffect>,
        premium_rewards: impl IntoIterator<Item = RewardEffect>,
    ) -> Self {
        Self {
            number,
            required_xp,
            free_rewards: free_rewards.into_iter().collect(),
            premium_rewards: premium_rewards.into_iter().collect(),
            presentation: TierPresentation::default(),
        }
    }

    /// Reward list for one track
    #[inline]
    pub fn rewards(&self, track: Track) -> &[RewardEffect] {
        match track {
            Track::Free => &self.free_rewards,
            Track::Premium => &self.premium_rewards,
        }
    }

    #[inline]
    pub fn preview(&self, track: Track) -> &[String] {
        match track {
            Track::Free => &self.presentation.free_preview,
            Track::Premium => &self.presentation.premium_preview,
        }
    }
}
