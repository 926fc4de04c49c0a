//! Feed replication driver
//!
//! A run copies the feed's sources into the target with folder sync enabled
//! and, for filesystem feeds, drops completion markers into every replicated
//! directory covered by the include path. All preconditions are checked
//! before the copy starts, so a rejected run leaves the target untouched.

use crate::engine::BulkCopyEngine;
use crate::options::CopyOptions;
use chrono::{DateTime, Utc};
use feedrep_config::Config;
use feedrep_marker::{CompletionMarker, MarkerReport};
use feedrep_pattern::{CompletionPlan, PatternBoundaryResolver};
use feedrep_types::{
    BandwidthKb, CopyStats, Error, PatternCompiler, Result, RunId, StorageType, WorkerCount,
};
use std::path::PathBuf;
use tracing::{info, info_span, Instrument};

/// What to replicate and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicationRequest {
    /// Source paths; filesystem feeds accept exactly one
    pub sources: Vec<PathBuf>,
    /// Destination directory
    pub target: PathBuf,
    /// Storage backing the feed
    pub storage_type: StorageType,
    /// Include path whose readiness is signalled
    pub include_path: Option<String>,
    /// Maximum number of concurrent copy workers
    pub max_maps: WorkerCount,
    /// Bandwidth cap per worker
    pub map_bandwidth_kb: BandwidthKb,
}

impl ReplicationRequest {
    /// Create a request with default tuning and no include path
    pub fn new(sources: Vec<PathBuf>, target: impl Into<PathBuf>, storage_type: StorageType) -> Self {
        Self {
            sources,
            target: target.into(),
            storage_type,
            include_path: None,
            max_maps: WorkerCount::default(),
            map_bandwidth_kb: BandwidthKb::default(),
        }
    }

    /// Create a request taking tuning and the include path from configuration
    pub fn from_config(
        sources: Vec<PathBuf>,
        target: impl Into<PathBuf>,
        storage_type: StorageType,
        config: &Config,
    ) -> Self {
        Self {
            sources,
            target: target.into(),
            storage_type,
            include_path: config.replication.include_path.clone(),
            max_maps: config.replication.max_maps,
            map_bandwidth_kb: config.replication.map_bandwidth_kb,
        }
    }

    /// Set the include path
    pub fn with_include_path(mut self, include_path: impl Into<String>) -> Self {
        self.include_path = Some(include_path.into());
        self
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

    /// Copy options for this request; replication always syncs and waits
    pub fn copy_options(&self) -> CopyOptions {
        CopyOptions::new(self.sources.clone(), self.target.clone())
            .with_max_maps(self.max_maps)
            .with_map_bandwidth_kb(self.map_bandwidth_kb)
            .sync_folder(true)
            .blocking(true)
    }
}

/// Outcome of one replication run
#[derive(Debug, Clone)]
pub struct ReplicationReport {
    /// Identifier of the run
    pub run_id: RunId,
    /// Storage type that was replicated
    pub storage_type: StorageType,
    /// Copy statistics
    pub stats: CopyStats,
    /// Marking outcome, present for filesystem feeds
    pub completion: Option<MarkerReport>,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run finished
    pub finished_at: DateTime<Utc>,
}

impl ReplicationReport {
    /// Marker files written by the run
    pub fn markers(&self) -> &[PathBuf] {
        self.completion
            .as_ref()
            .map_or(&[][..], |completion| completion.markers.as_slice())
    }
}

/// Runs replications with an injected copy engine and pattern compiler
pub struct FeedReplicator<E, C> {
    engine: E,
    resolver: PatternBoundaryResolver<C>,
    marker: CompletionMarker<C>,
}

impl<E, C> FeedReplicator<E, C>
where
    E: BulkCopyEngine,
    C: PatternCompiler + Clone,
{
    /// Create a replicator writing `_SUCCESS` markers
    pub fn new(engine: E, compiler: C) -> Self {
        Self {
            engine,
            resolver: PatternBoundaryResolver::new(compiler.clone()),
            marker: CompletionMarker::with_default_name(compiler),
        }
    }

    /// Create a replicator using the configured marker name
    pub fn from_config(engine: E, compiler: C, config: &Config) -> Result<Self> {
        Ok(Self {
            engine,
            resolver: PatternBoundaryResolver::new(compiler.clone()),
            marker: CompletionMarker::new(compiler, config.marker.file_name.clone())?,
        })
    }

    /// The copy engine
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Replicate the request and mark filesystem feeds complete
    pub async fn run(&self, request: &ReplicationRequest) -> Result<ReplicationReport> {
        let run_id = RunId::new_v4();
        let span = info_span!("replication", %run_id, storage = %request.storage_type);
        self.run_inner(run_id, request).instrument(span).await
    }

    async fn run_inner(&self, run_id: RunId, request: &ReplicationRequest) -> Result<ReplicationReport> {
        let started_at = Utc::now();
        let options = request.copy_options();

        let plan = if request.storage_type.marks_completion() {
            let include_path = request.include_path.as_deref().ok_or_else(|| {
                Error::precondition("An include path is required for filesystem feeds")
            })?;
            Some(CompletionPlan::resolve(
                &request.sources,
                include_path,
                &self.resolver,
            )?)
        } else {
            None
        };

        info!(
            "Started copy of {} source(s) to {} with {} engine",
            options.sources.len(),
            options.target.display(),
            self.engine.name()
        );
        let stats = self.engine.copy(&options).await?;
        info!(
            "Completed copy: {} files, {} skipped, {} bytes in {:?}",
            stats.files_copied, stats.files_skipped, stats.bytes_copied, stats.duration
        );

        let completion = match plan {
            Some(plan) => Some(
                self.marker
                    .mark_complete(&request.target, plan.fixed_path.as_str())?,
            ),
            None => None,
        };

        Ok(ReplicationReport {
            run_id,
            storage_type: request.storage_type,
            stats,
            completion,
            started_at,
            finished_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use feedrep_pattern::GlobPatternCompiler;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Records requests and materializes the directories a copy would produce
    #[derive(Default)]
    struct RecordingEngine {
        calls: AtomicUsize,
        seen: Mutex<Vec<CopyOptions>>,
        produce: Vec<&'static str>,
    }

    #[async_trait]
    impl BulkCopyEngine for RecordingEngine {
        async fn copy(&self, options: &CopyOptions) -> Result<CopyStats> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(options.clone());
            for directory in &self.produce {
                std::fs::create_dir_all(options.target.join(directory))?;
            }
            Ok(CopyStats::new())
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    fn replicator(produce: Vec<&'static str>) -> FeedReplicator<RecordingEngine, GlobPatternCompiler> {
        let engine = RecordingEngine {
            produce,
            ..RecordingEngine::default()
        };
        FeedReplicator::new(engine, GlobPatternCompiler::new())
    }

    #[tokio::test]
    async fn test_filesystem_run_marks_matching_directories() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("replica");
        let replicator = replicator(vec!["clicks/2024/hourly", "clicks/2025/hourly"]);

        let request = ReplicationRequest::new(
            vec![PathBuf::from("/data/in")],
            &target,
            StorageType::Filesystem,
        )
        .with_include_path("/data/in/clicks/*/hourly");
        let report = replicator.run(&request).await.unwrap();

        assert_eq!(
            report.markers(),
            &[
                target.join("clicks/2024/hourly/_SUCCESS"),
                target.join("clicks/2025/hourly/_SUCCESS"),
            ]
        );
        assert!(report.finished_at >= report.started_at);
    }

    #[tokio::test]
    async fn test_copy_always_syncs_and_blocks() {
        let temp_dir = TempDir::new().unwrap();
        let replicator = replicator(Vec::new());

        let request = ReplicationRequest::new(
            vec![PathBuf::from("/a"), PathBuf::from("/b")],
            temp_dir.path(),
            StorageType::Table,
        )
        .with_max_maps(WorkerCount::new(3).unwrap());
        replicator.run(&request).await.unwrap();

        let seen = replicator.engine().seen.lock().unwrap();
        assert!(seen[0].sync_folder);
        assert!(seen[0].blocking);
        assert_eq!(seen[0].max_maps.get(), 3);
        assert_eq!(seen[0].sources.len(), 2);
    }

    #[tokio::test]
    async fn test_table_storage_skips_marking() {
        let temp_dir = TempDir::new().unwrap();
        let replicator = replicator(vec!["t"]);

        let request = ReplicationRequest::new(
            vec![PathBuf::from("/warehouse/t")],
            temp_dir.path(),
            StorageType::Table,
        )
        .with_include_path("/warehouse/t/*");
        let report = replicator.run(&request).await.unwrap();

        assert!(report.completion.is_none());
        assert!(report.markers().is_empty());
        assert_eq!(replicator.engine().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_two_sources_abort_before_copy() {
        let temp_dir = TempDir::new().unwrap();
        let replicator = replicator(vec!["x"]);

        let request = ReplicationRequest::new(
            vec![PathBuf::from("/data/a"), PathBuf::from("/data/b")],
            temp_dir.path(),
            StorageType::Filesystem,
        )
        .with_include_path("/data/a/x");
        let result = replicator.run(&request).await;

        assert!(matches!(result, Err(Error::Precondition { .. })));
        assert_eq!(replicator.engine().calls.load(Ordering::SeqCst), 0);
        assert!(!temp_dir.path().join("x").exists());
    }

    #[tokio::test]
    async fn test_missing_include_path_is_a_precondition() {
        let temp_dir = TempDir::new().unwrap();
        let replicator = replicator(Vec::new());

        let request = ReplicationRequest::new(
            vec![PathBuf::from("/data/a")],
            temp_dir.path(),
            StorageType::Filesystem,
        );
        let result = replicator.run(&request).await;

        assert!(matches!(result, Err(Error::Precondition { .. })));
        assert_eq!(replicator.engine().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_include_outside_source_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let replicator = replicator(Vec::new());

        let request = ReplicationRequest::new(
            vec![PathBuf::from("/data/a")],
            temp_dir.path(),
            StorageType::Filesystem,
        )
        .with_include_path("/other/a/*");
        let result = replicator.run(&request).await;

        assert!(matches!(result, Err(Error::Precondition { .. })));
        assert_eq!(replicator.engine().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_configured_marker_name() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.marker.file_name = "_READY".to_string();
        config.replication.include_path = Some("/data/in/day".to_string());

        let replicator =
            FeedReplicator::from_config(RecordingEngine::default(), GlobPatternCompiler::new(), &config)
                .unwrap();
        let request = ReplicationRequest::from_config(
            vec![PathBuf::from("/data/in")],
            temp_dir.path(),
            StorageType::Filesystem,
            &config,
        );
        let report = replicator.run(&request).await.unwrap();

        assert_eq!(report.markers(), &[temp_dir.path().join("day/_READY")]);
        assert!(report.completion.unwrap().used_final_path());
    }
}
