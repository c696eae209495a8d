//! Durable player records and the backends that hold them
//!
//! One self-contained JSON record per player. Missing keys fall back to the
//! zero value and unknown keys are ignored, so older and newer records both load.

use super::state::{PlayerId, PlayerProgress};
use crate::error::{StorageReadError, StorageWriteError};
use ahash::AHashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// On-disk shape of a player's progress
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct ProgressRecord {
    #[serde(deserialize_with = "lenient_xp")]
    xp: u64,
    premium_owned: bool,
    #[serde(deserialize_with = "lenient_tier_set")]
    claimed_free: BTreeSet<u32>,
    #[serde(deserialize_with = "lenient_tier_set")]
    claimed_premium: BTreeSet<u32>,
}

/// Non-negative xp; negatives and junk read as zero
fn lenient_xp<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().map(|f| f.max(0.0) as u64))
            .unwrap_or(0),
        Some(serde_json::Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

/// Accept numbers or numeric strings, silently dropping anything else
fn lenient_tier_set<'de, D>(deserializer: D) -> Result<BTreeSet<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .iter()
        .filter_map(|value| match value {
            serde_json::Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .collect())
}

/// Serialize progress into its durable record
pub fn encode_progress(progress: &PlayerProgress) -> Result<Vec<u8>, StorageWriteError> {
    let record = ProgressRecord {
        xp: progress.xp(),
        premium_owned: progress.premium_owned,
        claimed_free: progress.claimed_free.clone(),
        claimed_premium: progress.claimed_premium.clone(),
    };
    serde_json::to_vec_pretty(&record).map_err(|source| StorageWriteError::Encode {
        player: progress.player,
        source,
    })
}

/// Rebuild progress from a durable record
pub fn decode_progress(player: PlayerId, bytes: &[u8]) -> Result<PlayerProgress, StorageReadError> {
    let record: ProgressRecord = serde_json::from_slice(bytes)
        .map_err(|source| StorageReadError::Corrupt { player, source })?;

    let mut progress = PlayerProgress::new(player);
    progress.restore_xp(record.xp);
    progress.premium_owned = record.premium_owned;
    progress.claimed_free = record.claimed_free;
    progress.claimed_premium = record.claimed_premium;
    Ok(progress)
}

/// Byte-oriented storage of one record per player
pub trait RecordStore: Send + Sync {
    /// `Ok(None)` when the player has no record yet
    fn read(&self, player: &PlayerId) -> io::Result<Option<Vec<u8>>>;

    /// Overwrite the player's record
    fn write(&self, player: &PlayerId, bytes: &[u8]) -> io::Result<()>;
}

/// `<dir>/<uuid>.json` per player
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    dir: PathBuf,
}

impl FileRecordStore {
    /// Open (and create if needed) the record directory
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, player: &PlayerId) -> PathBuf {
        self.dir.join(format!("{}.json", player))
    }
}

impl RecordStore for FileRecordStore {
    fn read(&self, player: &PlayerId) -> io::Result<Option<Vec<u8>>> {
        match fs::read(self.path_for(player)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, player: &PlayerId, bytes: &[u8]) -> io::Result<()> {
        let path = self.path_for(player);
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &path)
    }
}

/// In-process record store
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: Mutex<AHashMap<PlayerId, Vec<u8>>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw record bytes, if any
    pub fn raw(&self, player: &PlayerId) -> Option<Vec<u8>> {
        self.records.lock().get(player).cloned()
    }

    /// Seed or corrupt a record directly
    pub fn insert_raw(&self, player: PlayerId, bytes: impl Into<Vec<u8>>) {
        self.records.lock().insert(player, bytes.into());
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl RecordStore for MemoryRecordStore {
    fn read(&self, player: &PlayerId) -> io::Result<Option<Vec<u8>>> {
        Ok(self.raw(player))
    }

    fn write(&self, player: &PlayerId, bytes: &[u8]) -> io::Result<()> {
        self.records.lock().insert(*player, bytes.to_vec());
        Ok(())
    }
}
