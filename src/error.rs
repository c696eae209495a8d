//! Error types for the battle pass core engine

use crate::progress::PlayerId;
use thiserror::Error;

/// Problems found while loading a tier catalog.
///
/// These are reported per entry: the loader skips the offending tier and keeps going.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Invalid tier key: {0}")]
    InvalidTierKey(String),

    #[error("Tier {tier} has negative required xp: {required_xp}")]
    NegativeRequiredXp { tier: u32, required_xp: i64 },

    #[error("Malformed tier entry '{key}': {reason}")]
    MalformedEntry { key: String, reason: String },

    #[error("Catalog source has no 'tiers' section")]
    MissingTiers,

    #[error("Catalog source could not be parsed: {0}")]
    Parse(String),
}

/// Failure reading a player's durable record
#[derive(Error, Debug)]
pub enum StorageReadError {
    #[error("Failed to read record for {player}: {source}")]
    Io {
        player: PlayerId,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt record for {player}: {source}")]
    Corrupt {
        player: PlayerId,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure writing a player's durable record
#[derive(Error, Debug)]
pub enum StorageWriteError {
    #[error("Failed to write record for {player}: {source}")]
    Io {
        player: PlayerId,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode record for {player}: {source}")]
    Encode {
        player: PlayerId,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageWriteError {
    pub fn player(&self) -> PlayerId {
        match self {
            StorageWriteError::Io { player, .. } | StorageWriteError::Encode { player, .. } => {
                *player
            }
        }
    }
}

/// Main error type for the battle pass core engine
#[derive(Error, Debug)]
pub enum BattlePassError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Storage read error: {0}")]
    StorageRead(#[from] StorageReadError),

    #[error("Storage write error: {0}")]
    StorageWrite(#[from] StorageWriteError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the battle pass core engine
pub type Result<T> = std::result::Result<T, BattlePassError>;
