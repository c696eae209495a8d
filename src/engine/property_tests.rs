//! Property tests for engine module
//!
//! Claims grant at most once per cell, tracks never interfere, and bulk
//! claims agree exactly with what individual claims would have done.

use parking_lot::Mutex;
use proptest::prelude::*;
use std::sync::Arc;

use crate::catalog::{Catalog, CatalogHandle, RewardEffect, RewardGrant, Tier, Track};
use crate::config::EngineConfig;
use crate::engine::{ClaimOutcome, EffectExecutor, ProgressionEngine};
use crate::progress::{MemoryRecordStore, PlayerId, ProgressStore};

#[derive(Default)]
struct CountingExecutor {
    grants: Mutex<Vec<(u32, Track)>>,
}

impl EffectExecutor for CountingExecutor {
    fn execute(&self, grant: &RewardGrant<'_>) {
        self.grants.lock().push((grant.tier, grant.track));
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Strategy generators for property tests
// ═══════════════════════════════════════════════════════════════════════════

/// Ladder of up to 12 tiers, 1000 xp apart, with some empty reward lists
fn catalog_strategy() -> impl Strategy<Value = Catalog> {
    prop::collection::vec((any::<bool>(), any::<bool>()), 1..=12).prop_map(|flags| {
        Catalog::new(
            flags
                .into_iter()
                .enumerate()
                .map(|(idx, (free, premium))| {
                    let number = idx as u32 + 1;
                    let effect = |track: &str| {
                        RewardEffect::command(format!("give {{player}} {} {}", track, number))
                    };
                    Tier::new(
                        number,
                        u64::from(number) * 1000,
                        free.then(|| effect("free")),
                        premium.then(|| effect("premium")),
                    )
                })
                .collect(),
        )
    })
}

fn track_strategy() -> impl Strategy<Value = Track> {
    prop_oneof![Just(Track::Free), Just(Track::Premium)]
}

fn engine_for(catalog: Catalog) -> (ProgressionEngine, Arc<CountingExecutor>) {
    let executor = Arc::new(CountingExecutor::default());
    let engine = ProgressionEngine::new(
        Arc::new(CatalogHandle::new(catalog)),
        Arc::new(ProgressStore::new(Arc::new(MemoryRecordStore::new()))),
        &EngineConfig::default(),
    )
    .with_executor(executor.clone());
    (engine, executor)
}

// ═══════════════════════════════════════════════════════════════════════════
// Property Tests
// ═══════════════════════════════════════════════════════════════════════════

proptest! {
    /// A repeated claim never grants twice
    #[test]
    fn prop_claim_idempotent(
        catalog in catalog_strategy(),
        xp in 0..=15_000i64,
        tier in 0..=14u32,
        track in track_strategy(),
        premium in any::<bool>()
    ) {
        let (engine, executor) = engine_for(catalog);
        let player = PlayerId::new();
        engine.set_xp(player, xp);
        engine.set_premium_owned(player, premium);

        let first = engine.claim(player, tier, track);
        let second = engine.claim(player, tier, track);

        if first == ClaimOutcome::Success {
            prop_assert_eq!(second, ClaimOutcome::AlreadyClaimed);
            prop_assert_eq!(executor.grants.lock().len(), 1);
        } else {
            prop_assert_eq!(second, first);
            prop_assert!(executor.grants.lock().is_empty());
        }
    }

    /// Claiming on one track leaves the other track's outcome unchanged
    #[test]
    fn prop_tracks_independent(
        catalog in catalog_strategy(),
        xp in 0..=15_000i64,
        tier in 1..=12u32,
        track in track_strategy()
    ) {
        let other = match track {
            Track::Free => Track::Premium,
            Track::Premium => Track::Free,
        };

        let (fresh, _) = engine_for(catalog.clone());
        let control = PlayerId::new();
        fresh.set_xp(control, xp);
        fresh.set_premium_owned(control, true);
        let expected = fresh.claim(control, tier, other);

        let (engine, _) = engine_for(catalog);
        let player = PlayerId::new();
        engine.set_xp(player, xp);
        engine.set_premium_owned(player, true);
        let _ = engine.claim(player, tier, track);

        prop_assert_eq!(engine.claim(player, tier, other), expected);
    }

    /// claim_all counts exactly the individually successful candidates and touches nothing else
    #[test]
    fn prop_claim_all_matches_individual_claims(
        catalog in catalog_strategy(),
        xp in 0..=15_000i64,
        pre_claimed in prop::collection::vec(1..=12u32, 0..=4),
        candidates in prop::collection::vec(0..=14u32, 0..=16),
        track in track_strategy(),
        premium in any::<bool>()
    ) {
        let setup = |engine: &ProgressionEngine, player: PlayerId| {
            engine.set_xp(player, xp);
            engine.set_premium_owned(player, true);
            for tier in &pre_claimed {
                let _ = engine.claim(player, *tier, track);
            }
            engine.set_premium_owned(player, premium);
        };

        let (single, _) = engine_for(catalog.clone());
        let a = PlayerId::new();
        setup(&single, a);
        let expected = candidates
            .iter()
            .filter(|&&tier| single.claim(a, tier, track) == ClaimOutcome::Success)
            .count();

        let (bulk, executor) = engine_for(catalog);
        let b = PlayerId::new();
        setup(&bulk, b);
        let before = bulk.store().snapshot(b);
        let grants_before = executor.grants.lock().len();

        let claimed = bulk.claim_all(b, track, &candidates);
        prop_assert_eq!(claimed, expected);
        prop_assert_eq!(executor.grants.lock().len() - grants_before, claimed);

        let after = bulk.store().snapshot(b);
        prop_assert_eq!(after.claimed(track).len() - before.claimed(track).len(), claimed);
        let single_after = single.store().snapshot(a);
        prop_assert_eq!(single_after.claimed(track), after.claimed(track));
    }

    /// Tier advance is only ever upward as xp is added
    #[test]
    fn prop_add_xp_never_lowers_tier(
        catalog in catalog_strategy(),
        deltas in prop::collection::vec(-500..=3_000i64, 1..=10)
    ) {
        let (engine, _) = engine_for(catalog);
        let player = PlayerId::new();
        let mut last_tier = 0;
        let mut last_xp = 0;

        for delta in deltas {
            let xp = engine.add_xp(player, delta);
            let tier = engine.current_tier_of(player);
            prop_assert!(xp >= last_xp);
            prop_assert!(tier >= last_tier);
            last_xp = xp;
            last_tier = tier;
        }
    }
}
