//! Progression engine
//!
//! All mutating entry points live here. Every operation resolves the player
//! through the store, holds that player's entry lock for the whole state
//! transition, and persists before releasing it. Notifications go out after
//! the lock is released.

use super::claim::{CellState, ClaimOutcome};
use super::collaborators::{
    DiscardEffects, DiscardNotifications, EffectExecutor, EntitlementCheck, NoEntitlements,
    Notification, NotificationSink, XpSource,
};
use super::xp_rules::{GameplayEvent, PlayerContext, XpRules};
use crate::catalog::{Catalog, CatalogHandle, CatalogSnapshot, RewardGrant, Track};
use crate::config::{EngineConfig, PremiumConfig};
use crate::progress::{CachedProgress, PlayerId, PlayerProgress, ProgressStore};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

/// Progress figures for presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressSummary {
    pub xp: u64,
    pub tier: u32,
    pub max_tier: u32,
    /// Threshold of the next tier, 0 at the top of the ladder
    pub next_tier_xp: u64,
    pub xp_to_next: u64,
    pub premium_access: bool,
}

/// Settings that can change on a configuration reload
#[derive(Debug, Clone)]
struct EngineSettings {
    premium: PremiumConfig,
    write_through_xp: bool,
    xp_rules: XpRules,
}

impl EngineSettings {
    fn from_config(config: &EngineConfig) -> Self {
        Self {
            premium: config.premium.clone(),
            write_through_xp: config.storage.write_through_xp,
            xp_rules: XpRules::new(config.xp_sources.clone()),
        }
    }
}

/// Battle pass progression and claim engine
pub struct ProgressionEngine {
    catalog: Arc<CatalogHandle>,
    store: Arc<ProgressStore>,
    entitlements: Arc<dyn EntitlementCheck>,
    executor: Arc<dyn EffectExecutor>,
    notifications: Arc<dyn NotificationSink>,
    settings: RwLock<EngineSettings>,
}

impl ProgressionEngine {
    /// Engine with no entitlements, discarded effects and discarded notifications
    pub fn new(catalog: Arc<CatalogHandle>, store: Arc<ProgressStore>, config: &EngineConfig) -> Self {
        Self {
            catalog,
            store,
            entitlements: Arc::new(NoEntitlements),
            executor: Arc::new(DiscardEffects),
            notifications: Arc::new(DiscardNotifications),
            settings: RwLock::new(EngineSettings::from_config(config)),
        }
    }

    pub fn with_entitlements(mut self, entitlements: Arc<dyn EntitlementCheck>) -> Self {
        self.entitlements = entitlements;
        self
    }

    pub fn with_executor(mut self, executor: Arc<dyn EffectExecutor>) -> Self {
        self.executor = executor;
        self
    }

    pub fn with_notifications(mut self, notifications: Arc<dyn NotificationSink>) -> Self {
        self.notifications = notifications;
        self
    }

    /// Apply a reloaded configuration
    pub fn reconfigure(&self, config: &EngineConfig) {
        *self.settings.write() = EngineSettings::from_config(config);
    }

    /// Swap in a new catalog; returns the new snapshot version
    pub fn reload_catalog(&self, catalog: Catalog) -> u64 {
        self.catalog.replace(catalog)
    }

    #[inline]
    pub fn catalog(&self) -> Arc<CatalogSnapshot> {
        self.catalog.snapshot()
    }

    #[inline]
    pub fn store(&self) -> &Arc<ProgressStore> {
        &self.store
    }

    pub fn xp_rules(&self) -> XpRules {
        self.settings.read().xp_rules.clone()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Highest unlocked tier for this progress under the current catalog
    pub fn current_tier(&self, progress: &PlayerProgress) -> u32 {
        self.catalog.snapshot().current_tier(progress.xp())
    }

    pub fn current_tier_of(&self, player: PlayerId) -> u32 {
        let xp = self.xp(player);
        self.catalog.snapshot().current_tier(xp)
    }

    pub fn xp(&self, player: PlayerId) -> u64 {
        self.store.with_entry(player, |entry| entry.progress.xp())
    }

    pub fn required_xp_for(&self, tier: u32) -> u64 {
        self.catalog.snapshot().required_xp_for(tier)
    }

    /// Premium access under the configured policy
    pub fn has_premium_access(&self, player: PlayerId) -> bool {
        let owned = self
            .store
            .with_entry(player, |entry| entry.progress.premium_owned);
        self.premium_access(player, owned)
    }

    fn premium_access(&self, player: PlayerId, premium_owned: bool) -> bool {
        let premium = self.settings.read().premium.clone();
        premium.policy.resolve(premium_owned, || {
            self.entitlements
                .has_entitlement(player, &premium.entitlement_key)
        })
    }

    pub fn summary(&self, player: PlayerId) -> ProgressSummary {
        let catalog = self.catalog.snapshot();
        let progress = self.store.snapshot(player);
        let tier = catalog.current_tier(progress.xp());
        let next_tier_xp = catalog
            .next_tier_after(tier)
            .map(|t| t.required_xp)
            .unwrap_or(0);
        let xp_to_next = if next_tier_xp == 0 {
            0
        } else {
            next_tier_xp.saturating_sub(progress.xp())
        };

        ProgressSummary {
            xp: progress.xp(),
            tier,
            max_tier: catalog.max_tier_number(),
            next_tier_xp,
            xp_to_next,
            premium_access: self.premium_access(player, progress.premium_owned),
        }
    }

    /// Current state of one (player, tier, track) cell
    pub fn cell_state(&self, player: PlayerId, tier_number: u32, track: Track) -> CellState {
        let catalog = self.catalog.snapshot();
        let Some(tier) = catalog.find_by_number(tier_number) else {
            return CellState::Missing;
        };
        let progress = self.store.snapshot(player);

        if progress.has_claimed(tier_number, track) {
            CellState::Claimed
        } else if catalog.current_tier(progress.xp()) < tier_number {
            CellState::Locked
        } else if track == Track::Premium && !self.premium_access(player, progress.premium_owned) {
            CellState::NoAccess
        } else if tier.rewards(track).is_empty() {
            CellState::Empty
        } else {
            CellState::Claimable
        }
    }

    // ========================================================================
    // XP
    // ========================================================================

    /// Add XP from an administrative source; returns the new total
    pub fn add_xp(&self, player: PlayerId, amount: i64) -> u64 {
        self.add_xp_from(player, amount, XpSource::Command, true)
    }

    /// Add XP, announcing a tier advance when the unlocked tier goes up
    pub fn add_xp_from(&self, player: PlayerId, amount: i64, source: XpSource, announce: bool) -> u64 {
        if amount <= 0 {
            return self.xp(player);
        }

        let catalog = self.catalog.snapshot();
        let (before, after, total) = self.store.with_entry(player, |entry| {
            let before = catalog.current_tier(entry.progress.xp());
            entry.progress.add_xp(amount);
            let total = entry.progress.xp();
            self.persist_xp(entry);
            (before, catalog.current_tier(total), total)
        });

        self.notify(Notification::XpAdded {
            player,
            amount,
            total,
            source,
            announce,
        });
        if after > before {
            self.notify(Notification::TierAdvanced {
                player,
                from: before,
                to: after,
            });
        }
        total
    }

    /// Set absolute XP (negative clamps to 0); returns the new total
    pub fn set_xp(&self, player: PlayerId, amount: i64) -> u64 {
        let total = self.store.with_entry(player, |entry| {
            entry.progress.set_xp(amount);
            self.persist_xp(entry);
            entry.progress.xp()
        });

        self.notify(Notification::XpSet { player, total });
        total
    }

    /// Subtract XP, stopping at 0; returns the new total
    pub fn remove_xp(&self, player: PlayerId, amount: i64) -> u64 {
        if amount <= 0 {
            return self.xp(player);
        }

        let total = self.store.with_entry(player, |entry| {
            entry.progress.remove_xp(amount);
            self.persist_xp(entry);
            entry.progress.xp()
        });

        self.notify(Notification::XpRemoved {
            player,
            amount,
            total,
        });
        total
    }

    /// Apply the XP a gameplay event earns; returns the new total if anything was awarded
    pub fn record_gameplay(&self, ctx: &PlayerContext, event: &GameplayEvent) -> Option<u64> {
        let award = self.settings.read().xp_rules.award_for(ctx.game_mode, event)?;
        Some(self.add_xp_from(ctx.player, award.amount, award.source, award.announce))
    }

    /// One playtime tick for every listed player; returns how many were awarded
    pub fn award_playtime(&self, players: impl IntoIterator<Item = PlayerContext>) -> usize {
        players
            .into_iter()
            .filter(|ctx| {
                self.record_gameplay(ctx, &GameplayEvent::PlaytimeTick)
                    .is_some()
            })
            .count()
    }

    // ========================================================================
    // Premium
    // ========================================================================

    pub fn set_premium_owned(&self, player: PlayerId, value: bool) {
        self.store.with_entry(player, |entry| {
            entry.progress.premium_owned = value;
            entry.mark_dirty();
            self.persist(entry);
        });

        self.notify(Notification::PremiumChanged {
            player,
            premium_owned: value,
        });
    }

    // ========================================================================
    // Claims
    // ========================================================================

    /// Claim one tier on one track
    pub fn claim(&self, player: PlayerId, tier: u32, track: Track) -> ClaimOutcome {
        let catalog = self.catalog.snapshot();
        let outcome = self
            .store
            .with_entry(player, |entry| self.claim_with(&catalog, entry, tier, track));

        self.notify(Notification::ClaimResolved {
            player,
            tier,
            track,
            outcome,
        });
        outcome
    }

    /// Claim every candidate that can be claimed now, in order.
    ///
    /// Returns the number of successful claims; other outcomes are skipped.
    pub fn claim_all(&self, player: PlayerId, track: Track, candidates: &[u32]) -> usize {
        let catalog = self.catalog.snapshot();
        let claimed = self.store.with_entry(player, |entry| {
            candidates
                .iter()
                .filter(|&&tier| self.claim_with(&catalog, entry, tier, track).is_success())
                .count()
        });

        self.notify(Notification::BulkClaimed {
            player,
            track,
            claimed,
        });
        claimed
    }

    /// `claim_all` over every tier in the catalog
    pub fn claim_all_unlocked(&self, player: PlayerId, track: Track) -> usize {
        let candidates: Vec<u32> = self
            .catalog
            .snapshot()
            .tiers()
            .iter()
            .map(|t| t.number)
            .collect();
        self.claim_all(player, track, &candidates)
    }

    fn claim_with(
        &self,
        catalog: &Catalog,
        entry: &mut CachedProgress,
        tier_number: u32,
        track: Track,
    ) -> ClaimOutcome {
        let player = entry.progress.player;
        let Some(tier) = catalog.find_by_number(tier_number) else {
            return ClaimOutcome::TierNotFound;
        };

        if catalog.current_tier(entry.progress.xp()) < tier_number {
            return ClaimOutcome::TierLocked;
        }
        if track == Track::Premium && !self.premium_access(player, entry.progress.premium_owned) {
            return ClaimOutcome::PremiumRequired;
        }
        if entry.progress.has_claimed(tier_number, track) {
            return ClaimOutcome::AlreadyClaimed;
        }

        let rewards = tier.rewards(track);
        if rewards.is_empty() {
            return ClaimOutcome::NoRewards;
        }

        // grant, then record, then persist
        self.executor.execute(&RewardGrant {
            player,
            tier: tier_number,
            required_xp: tier.required_xp,
            track,
            effects: rewards,
        });
        entry.progress.mark_claimed(tier_number, track);
        entry.mark_dirty();
        self.persist(entry);

        ClaimOutcome::Success
    }

    // ========================================================================
    // Persistence and notifications
    // ========================================================================

    /// Write-through save; failures only cost durability
    fn persist(&self, entry: &mut CachedProgress) {
        if let Err(err) = self.store.save_entry(entry) {
            warn!("{}; change kept in memory until the next save", err);
        }
    }

    fn persist_xp(&self, entry: &mut CachedProgress) {
        entry.mark_dirty();
        if self.settings.read().write_through_xp {
            self.persist(entry);
        }
    }

    fn notify(&self, notification: Notification) {
        self.notifications.notify(notification);
    }
}
