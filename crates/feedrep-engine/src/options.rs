//! Bulk copy options

use feedrep_config::ReplicationConfig;
use feedrep_types::{BandwidthKb, WorkerCount};
use std::path::PathBuf;

/// Options for a single bulk copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyOptions {
    /// Paths to copy from
    pub sources: Vec<PathBuf>,
    /// Destination directory
    pub target: PathBuf,
    /// Maximum number of files copied concurrently
    pub max_maps: WorkerCount,
    /// Bandwidth cap per worker
    pub map_bandwidth_kb: BandwidthKb,
    /// Copy source contents into the target and skip files already in sync
    pub sync_folder: bool,
    /// Wait for the copy to finish
    pub blocking: bool,
}

impl CopyOptions {
    /// Create options with default tuning
    pub fn new(sources: Vec<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            sources,
            target: target.into(),
            max_maps: WorkerCount::default(),
            map_bandwidth_kb: BandwidthKb::default(),
            sync_folder: true,
            blocking: true,
        }
    }

    /// Take tuning from the replication configuration
    pub fn from_config(
        sources: Vec<PathBuf>,
        target: impl Into<PathBuf>,
        config: &ReplicationConfig,
    ) -> Self {
        Self {
            sources,
            target: target.into(),
            max_maps: config.max_maps,
            map_bandwidth_kb: config.map_bandwidth_kb,
            sync_folder: config.sync_folder,
            blocking: config.blocking,
        }
    }

    /// Set the worker count
    pub fn with_max_maps(mut self, max_maps: WorkerCount) -> Self {
        self.max_maps = max_maps;
        self
    }

    /// Set the per-worker bandwidth cap
    pub fn with_map_bandwidth_kb(mut self, map_bandwidth_kb: BandwidthKb) -> Self {
        self.map_bandwidth_kb = map_bandwidth_kb;
        self
    }

    /// Enable or disable folder synchronisation
    pub fn sync_folder(mut self, enabled: bool) -> Self {
        self.sync_folder = enabled;
        self
    }

    /// Enable or disable waiting for completion
    pub fn blocking(mut self, enabled: bool) -> Self {
        self.blocking = enabled;
        self
    }
}
