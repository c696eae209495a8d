//! Claim outcomes and per-cell claim state

use serde::Serialize;

/// Result of a single claim attempt. Not an error: every variant is a normal answer.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClaimOutcome {
    Success,
    TierNotFound,
    TierLocked,
    AlreadyClaimed,
    PremiumRequired,
    NoRewards,
}

impl ClaimOutcome {
    #[inline]
    pub fn is_success(self) -> bool {
        self == ClaimOutcome::Success
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ClaimOutcome::Success => "success",
            ClaimOutcome::TierNotFound => "tier-not-found",
            ClaimOutcome::TierLocked => "tier-locked",
            ClaimOutcome::AlreadyClaimed => "already-claimed",
            ClaimOutcome::PremiumRequired => "premium-required",
            ClaimOutcome::NoRewards => "no-rewards",
        }
    }
}

/// Where one (player, tier, track) cell stands right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CellState {
    /// No such tier in the catalog
    Missing,
    /// Tier not reached yet
    Locked,
    /// Premium track without premium access
    NoAccess,
    /// Unlocked but nothing to grant on this track
    Empty,
    Claimable,
    Claimed,
}
