//! Player progress cache with durable load/save
//!
//! The store owns the canonical in-memory progress for every cached player.
//! Each entry has its own mutex so operations on one player are serialized
//! while different players proceed in parallel.
//!
//! Lock order is entry first, then the cache map. Nothing holds the map lock
//! while waiting on an entry.

use super::record::{decode_progress, encode_progress, RecordStore};
use super::state::{PlayerId, PlayerProgress};
use crate::error::{StorageReadError, StorageWriteError};
use ahash::AHashMap;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// A cached player entry
#[derive(Debug)]
pub struct CachedProgress {
    pub progress: PlayerProgress,
    dirty: bool,
    evicted: bool,
}

impl CachedProgress {
    fn new(progress: PlayerProgress) -> Self {
        Self {
            progress,
            dirty: false,
            evicted: false,
        }
    }

    /// Flag unsaved changes
    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Saved and dropped from the cache. Changes made to an evicted entry are lost.
    #[inline]
    pub fn is_evicted(&self) -> bool {
        self.evicted
    }
}

/// Shared handle to one cached entry; lock it for the duration of an operation
pub type ProgressHandle = Arc<Mutex<CachedProgress>>;

/// Outcome of a bulk save
#[derive(Debug, Default)]
pub struct SaveReport {
    pub saved: usize,
    pub failed: Vec<StorageWriteError>,
}

impl SaveReport {
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Cached, durable player progress
pub struct ProgressStore {
    records: Arc<dyn RecordStore>,
    cache: RwLock<AHashMap<PlayerId, ProgressHandle>>,
    /// Bumped under the map write lock on every eviction
    evictions: AtomicU64,
}

impl ProgressStore {
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        Self {
            records,
            cache: RwLock::new(AHashMap::with_capacity(64)),
            evictions: AtomicU64::new(0),
        }
    }

    /// Cached entry for `player`, loading it from storage on first access.
    ///
    /// The handle may be evicted later; use [`with_entry`](Self::with_entry)
    /// to mutate.
    pub fn get(&self, player: PlayerId) -> ProgressHandle {
        // Fast path: already cached
        if let Some(handle) = self.cache.read().get(&player) {
            return handle.clone();
        }

        // Slow path: load outside the map lock, keep whichever entry lands first
        loop {
            let epoch = self.evictions.load(Ordering::Acquire);
            let loaded = self.load_or_default(player);
            let mut cache = self.cache.write();
            if let Some(handle) = cache.get(&player) {
                return handle.clone();
            }
            // An eviction while loading may have saved newer state than we read
            if self.evictions.load(Ordering::Acquire) != epoch {
                continue;
            }
            let handle = Arc::new(Mutex::new(CachedProgress::new(loaded)));
            cache.insert(player, handle.clone());
            return handle;
        }
    }

    /// Run `f` on the player's live entry with the entry locked
    pub fn with_entry<R>(&self, player: PlayerId, f: impl FnOnce(&mut CachedProgress) -> R) -> R {
        loop {
            let handle = self.get(player);
            let mut entry = handle.lock();
            if !entry.evicted {
                return f(&mut entry);
            }
        }
    }

    /// Copy of the player's current progress
    pub fn snapshot(&self, player: PlayerId) -> PlayerProgress {
        self.with_entry(player, |entry| entry.progress.clone())
    }

    /// Read the durable record, bypassing the cache
    pub fn load(&self, player: PlayerId) -> Result<Option<PlayerProgress>, StorageReadError> {
        match self.records.read(&player) {
            Ok(Some(bytes)) => decode_progress(player, &bytes).map(Some),
            Ok(None) => Ok(None),
            Err(source) => Err(StorageReadError::Io { player, source }),
        }
    }

    fn load_or_default(&self, player: PlayerId) -> PlayerProgress {
        match self.load(player) {
            Ok(Some(progress)) => progress,
            Ok(None) => PlayerProgress::new(player),
            Err(err) => {
                warn!("{}; starting {} from empty progress", err, player);
                PlayerProgress::new(player)
            }
        }
    }

    /// Write one player's full state, overwriting any previous record
    pub fn save(&self, progress: &PlayerProgress) -> Result<(), StorageWriteError> {
        let bytes = encode_progress(progress)?;
        self.records
            .write(&progress.player, &bytes)
            .map_err(|source| StorageWriteError::Io {
                player: progress.player,
                source,
            })?;
        debug!("Saved progress for {}", progress.player);
        Ok(())
    }

    /// Save a locked entry, clearing its dirty flag on success
    pub fn save_entry(&self, entry: &mut CachedProgress) -> Result<(), StorageWriteError> {
        self.save(&entry.progress)?;
        entry.dirty = false;
        Ok(())
    }

    fn cached_handles(&self) -> Vec<ProgressHandle> {
        self.cache.read().values().cloned().collect()
    }

    /// Persist every cached entry; one failure never stops the rest
    pub fn save_all(&self) -> SaveReport {
        let mut report = SaveReport::default();
        for handle in self.cached_handles() {
            let mut entry = handle.lock();
            if entry.evicted {
                continue;
            }
            match self.save_entry(&mut entry) {
                Ok(()) => report.saved += 1,
                Err(err) => {
                    warn!("{}", err);
                    report.failed.push(err);
                }
            }
        }
        report
    }

    /// Save and drop the cached entry. Returns false if the player was not cached.
    ///
    /// The entry stays cached until its save succeeds; a failed save leaves it
    /// in place for the next autosave.
    pub fn evict(&self, player: PlayerId) -> Result<bool, StorageWriteError> {
        let Some(handle) = self.cache.read().get(&player).cloned() else {
            return Ok(false);
        };
        let mut entry = handle.lock();
        if entry.evicted {
            return Ok(false);
        }
        self.save_entry(&mut entry)?;
        entry.evicted = true;

        let mut cache = self.cache.write();
        if cache.get(&player).is_some_and(|cached| Arc::ptr_eq(cached, &handle)) {
            cache.remove(&player);
        }
        self.evictions.fetch_add(1, Ordering::AcqRel);
        Ok(true)
    }

    #[inline]
    pub fn is_cached(&self, player: PlayerId) -> bool {
        self.cache.read().contains_key(&player)
    }

    pub fn cached_count(&self) -> usize {
        self.cache.read().len()
    }

    /// Entries with changes not yet written
    pub fn dirty_count(&self) -> usize {
        self.cached_handles()
            .iter()
            .filter(|h| h.lock().is_dirty())
            .count()
    }
}
