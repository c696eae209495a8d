//! Battle Pass Core - Tiered season progression engine
//!
//! Players earn XP, unlock numbered tiers as their XP passes each tier's
//! threshold, and claim the rewards on the free and premium tracks. The crate
//! owns the rules and the durable per-player state; the host supplies the
//! catalog document, premium entitlements, reward execution and a timer.
//!
//! ```no_run
//! use battle_pass_core::{
//!     AutosaveCoordinator, CatalogHandle, EngineConfig, FileRecordStore, ProgressStore,
//!     ProgressionEngine, TokioScheduler, Track,
//! };
//! use std::sync::Arc;
//!
//! # fn main() -> battle_pass_core::Result<()> {
//! let config = EngineConfig::from_path("battlepass.json")?;
//! let loaded = battle_pass_core::load_catalog_file("tiers.json")?;
//! let records = FileRecordStore::open(&config.storage.player_directory)?;
//! let store = Arc::new(ProgressStore::new(Arc::new(records)));
//! let engine = ProgressionEngine::new(
//!     Arc::new(CatalogHandle::new(loaded.catalog)),
//!     store.clone(),
//!     &config,
//! );
//!
//! # let runtime = tokio::runtime::Runtime::new()?;
//! let scheduler = Arc::new(TokioScheduler::new(runtime.handle().clone()));
//! let autosave = AutosaveCoordinator::from_config(store, scheduler, &config.storage);
//! autosave.start();
//!
//! # let player = battle_pass_core::PlayerId::new();
//! engine.add_xp(player, 1500);
//! let outcome = engine.claim(player, 1, Track::Free);
//! assert!(outcome.is_success());
//!
//! autosave.shutdown();
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod progress;

pub use catalog::{
    load_catalog, load_catalog_file, load_catalog_str, Catalog, CatalogHandle, CatalogLoad,
    CatalogSnapshot, RewardEffect, RewardGrant, Tier, Track,
};
pub use config::{EngineConfig, PremiumPolicy};
pub use engine::{
    CellState, ClaimOutcome, EffectExecutor, EntitlementCheck, GameMode, GameplayEvent,
    Notification, NotificationSink, PlayerContext, ProgressSummary, ProgressionEngine, XpSource,
};
pub use error::{BattlePassError, CatalogError, Result, StorageReadError, StorageWriteError};
pub use lifecycle::{
    AutosaveCoordinator, ManualScheduler, PlaytimeRewarder, PresenceSource, Scheduler,
    TaskHandle, TokioScheduler,
};
pub use progress::{
    FileRecordStore, MemoryRecordStore, PlayerId, PlayerProgress, ProgressStore, RecordStore,
    SaveReport,
};
