//! Contracts for the collaborators the engine talks to
//!
//! The engine never formats user text or runs rewards itself; it hands
//! structured data to these traits.

use super::claim::ClaimOutcome;
use crate::catalog::{RewardGrant, Track};
use crate::progress::PlayerId;
use serde::Serialize;

/// External premium entitlement, e.g. a permission lookup.
///
/// Queried fresh on every access check; the engine never caches the answer.
pub trait EntitlementCheck: Send + Sync {
    fn has_entitlement(&self, player: PlayerId, key: &str) -> bool;
}

/// Runs the reward effects of a successful claim.
///
/// Called while the player's progress entry is locked. An executor that needs
/// to call back into the engine for the same player must defer that work,
/// e.g. through `Scheduler::run_once_now`.
pub trait EffectExecutor: Send + Sync {
    fn execute(&self, grant: &RewardGrant<'_>);
}

/// Receives structured events for messaging/presentation
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Where an XP change came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum XpSource {
    Command,
    Playtime,
    MobKill,
    BlockBreak,
}

/// Structured engine events
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum Notification {
    XpAdded {
        player: PlayerId,
        amount: i64,
        total: u64,
        source: XpSource,
        /// Whether the player should be told
        announce: bool,
    },
    XpSet {
        player: PlayerId,
        total: u64,
    },
    XpRemoved {
        player: PlayerId,
        amount: i64,
        total: u64,
    },
    TierAdvanced {
        player: PlayerId,
        from: u32,
        to: u32,
    },
    ClaimResolved {
        player: PlayerId,
        tier: u32,
        track: Track,
        outcome: ClaimOutcome,
    },
    BulkClaimed {
        player: PlayerId,
        track: Track,
        claimed: usize,
    },
    PremiumChanged {
        player: PlayerId,
        premium_owned: bool,
    },
}

/// Nobody has an external entitlement
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEntitlements;

impl EntitlementCheck for NoEntitlements {
    fn has_entitlement(&self, _player: PlayerId, _key: &str) -> bool {
        false
    }
}

/// Drops reward grants; for hosts that only track progress
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardEffects;

impl EffectExecutor for DiscardEffects {
    fn execute(&self, _grant: &RewardGrant<'_>) {}
}

/// Drops notifications
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardNotifications;

impl NotificationSink for DiscardNotifications {
    fn notify(&self, _notification: Notification) {}
}

impl<F> EntitlementCheck for F
where
    F: Fn(PlayerId, &str) -> bool + Send + Sync,
{
    fn has_entitlement(&self, player: PlayerId, key: &str) -> bool {
        self(player, key)
    }
}
