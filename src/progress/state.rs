//! Per-player progress state

use crate::catalog::Track;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Stable player identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(Uuid);

impl PlayerId {
    /// Fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for PlayerId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Mutable progress for one player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerProgress {
    pub player: PlayerId,
    xp: u64,
    pub premium_owned: bool,
    pub claimed_free: BTreeSet<u32>,
    pub claimed_premium: BTreeSet<u32>,
}

impl PlayerProgress {
    /// Zero-value progress: no xp, no premium, nothing claimed
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            xp: 0,
            premium_owned: false,
            claimed_free: BTreeSet::new(),
            claimed_premium: BTreeSet::new(),
        }
    }

    #[inline]
    pub fn xp(&self) -> u64 {
        self.xp
    }

    /// Set absolute xp, clamping negatives to zero
    #[inline]
    pub fn set_xp(&mut self, amount: i64) {
        self.xp = amount.max(0) as u64;
    }

    /// Restore a stored total as-is
    #[inline]
    pub(crate) fn restore_xp(&mut self, xp: u64) {
        self.xp = xp;
    }

    /// Add xp; non-positive amounts are ignored
    #[inline]
    pub fn add_xp(&mut self, amount: i64) {
        if amount <= 0 {
            return;
        }
        self.xp = self.xp.saturating_add(amount as u64);
    }

    /// Subtract xp, stopping at zero; non-positive amounts are ignored
    #[inline]
    pub fn remove_xp(&mut self, amount: i64) {
        if amount <= 0 {
            return;
        }
        self.xp = self.xp.saturating_sub(amount as u64);
    }

    #[inline]
    pub fn claimed(&self, track: Track) -> &BTreeSet<u32> {
        match track {
            Track::Free => &self.claimed_free,
            Track::Premium => &self.claimed_premium,
        }
    }

    #[inline]
    pub fn has_claimed(&self, tier: u32, track: Track) -> bool {
        self.claimed(track).contains(&tier)
    }

    /// Record a claim; returns false if it was already recorded
    pub fn mark_claimed(&mut self, tier: u32, track: Track) -> bool {
        match track {
            Track::Free => self.claimed_free.insert(tier),
            Track::Premium => self.claimed_premium.insert(tier),
        }
    }
}
