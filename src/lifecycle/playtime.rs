//! Periodic playtime XP

use super::scheduler::{Scheduler, TaskHandle};
use crate::engine::{PlayerContext, ProgressionEngine};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info};

/// Who is online right now
pub trait PresenceSource: Send + Sync {
    fn online_players(&self) -> Vec<PlayerContext>;
}

impl<F> PresenceSource for F
where
    F: Fn() -> Vec<PlayerContext> + Send + Sync,
{
    fn online_players(&self) -> Vec<PlayerContext> {
        self()
    }
}

/// Awards playtime XP to every online player on the configured interval
pub struct PlaytimeRewarder {
    engine: Arc<ProgressionEngine>,
    presence: Arc<dyn PresenceSource>,
    scheduler: Arc<dyn Scheduler>,
    task: Mutex<Option<TaskHandle>>,
}

impl PlaytimeRewarder {
    pub fn new(
        engine: Arc<ProgressionEngine>,
        presence: Arc<dyn PresenceSource>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        Self {
            engine,
            presence,
            scheduler,
            task: Mutex::new(None),
        }
    }

    /// (Re)arm from the engine's current XP rules. Returns false when playtime XP is off.
    pub fn start(&self) -> bool {
        self.stop();

        let Some(interval) = self.engine.xp_rules().playtime_interval() else {
            debug!("Playtime XP disabled");
            return false;
        };

        let engine = self.engine.clone();
        let presence = self.presence.clone();
        let handle = self.scheduler.run_periodically(
            interval,
            Arc::new(move || {
                let awarded = engine.award_playtime(presence.online_players());
                debug!("Playtime XP awarded to {} players", awarded);
            }),
        );
        *self.task.lock() = Some(handle);
        info!("Playtime XP every {}s", interval.as_secs());
        true
    }

    pub fn stop(&self) {
        if let Some(task) = self.task.lock().take() {
            task.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.lock().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, CatalogHandle};
    use crate::config::EngineConfig;
    use crate::engine::GameMode;
    use crate::lifecycle::ManualScheduler;
    use crate::progress::{MemoryRecordStore, PlayerId, ProgressStore};
    use std::time::Duration;

    fn engine(config: &EngineConfig) -> Arc<ProgressionEngine> {
        Arc::new(ProgressionEngine::new(
            Arc::new(CatalogHandle::new(Catalog::generate_default(10))),
            Arc::new(ProgressStore::new(Arc::new(MemoryRecordStore::new()))),
            config,
        ))
    }

    #[test]
    fn test_awards_online_survivors_each_tick() {
        let engine = engine(&EngineConfig::default());
        let (alice, bob) = (PlayerId::new(), PlayerId::new());
        let online = vec![
            PlayerContext::new(alice, GameMode::Survival),
            PlayerContext::new(bob, GameMode::Creative),
        ];
        let scheduler = Arc::new(ManualScheduler::new());
        let rewarder = PlaytimeRewarder::new(
            engine.clone(),
            Arc::new(move || online.clone()),
            scheduler.clone(),
        );

        assert!(rewarder.start());
        assert_eq!(scheduler.intervals(), vec![Duration::from_secs(300)]);

        scheduler.tick();
        scheduler.tick();
        assert_eq!(engine.xp(alice), 100);
        assert_eq!(engine.xp(bob), 0);
    }

    #[test]
    fn test_disabled_playtime_does_not_schedule() {
        let config = EngineConfig::from_json_str(r#"{"xp-sources":{"playtime":{"enabled":false}}}"#).unwrap();
        let scheduler = Arc::new(ManualScheduler::new());
        let rewarder = PlaytimeRewarder::new(engine(&config), Arc::new(Vec::<PlayerContext>::new), scheduler.clone());

        assert!(!rewarder.start());
        assert!(!rewarder.is_running());
        assert_eq!(scheduler.periodic_count(), 0);
    }

    #[test]
    fn test_restart_after_reconfigure() {
        let engine = engine(&EngineConfig::default());
        let scheduler = Arc::new(ManualScheduler::new());
        let rewarder = PlaytimeRewarder::new(engine.clone(), Arc::new(Vec::<PlayerContext>::new), scheduler.clone());
        assert!(rewarder.start());

        let config =
            EngineConfig::from_json_str(r#"{"xp-sources":{"playtime":{"interval-seconds":60}}}"#).unwrap();
        engine.reconfigure(&config);
        assert!(rewarder.start());
        assert_eq!(scheduler.intervals(), vec![Duration::from_secs(60)]);

        rewarder.stop();
        assert_eq!(scheduler.periodic_count(), 0);
    }
}
