//! Core data types for feedrep

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::Error;

/// Unique identifier for a replication run
pub type RunId = uuid::Uuid;

/// Name of the readiness marker downstream consumers look for
pub const DEFAULT_MARKER_FILE_NAME: &str = "_SUCCESS";

/// Bulk copy statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CopyStats {
    /// Number of files copied
    pub files_copied: u64,
    /// Number of files skipped because the destination was already in sync
    pub files_skipped: u64,
    /// Number of directories created
    pub directories_created: u64,
    /// Total bytes copied
    pub bytes_copied: u64,
    /// Total duration of the operation
    pub duration: Duration,
}

impl CopyStats {
    /// Create a new empty statistics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculate the overall transfer rate in bytes per second
    pub fn transfer_rate(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.bytes_copied as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Storage backing a feed
///
/// Only filesystem storage receives completion markers; table storage is
/// replicated by the generic copy and signals readiness elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StorageType {
    /// Plain files on a filesystem
    Filesystem,
    /// Table/catalog backed storage
    Table,
}

impl StorageType {
    /// Whether replicated data of this storage type gets completion markers
    pub fn marks_completion(self) -> bool {
        matches!(self, Self::Filesystem)
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filesystem => f.write_str("FILESYSTEM"),
            Self::Table => f.write_str("TABLE"),
        }
    }
}

impl FromStr for StorageType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FILESYSTEM" => Ok(Self::Filesystem),
            "TABLE" => Ok(Self::Table),
            other => Err(Error::config(format!("Unknown storage type '{}'", other))),
        }
    }
}
