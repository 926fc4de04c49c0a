//! Bulk copy engines

use crate::options::CopyOptions;
use crate::throttle::Throttle;
use async_trait::async_trait;
use feedrep_types::{BandwidthKb, CopyStats, Error, Result};
use filetime::FileTime;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info};
use walkdir::WalkDir;

/// Copies a set of sources into one destination
#[async_trait]
pub trait BulkCopyEngine: Send + Sync {
    /// Run the copy described by `options`
    ///
    /// Directories that would end up without files are never created.
    async fn copy(&self, options: &CopyOptions) -> Result<CopyStats>;

    /// Engine name used in logs
    fn name(&self) -> &'static str;
}

#[async_trait]
impl<T: BulkCopyEngine + ?Sized> BulkCopyEngine for Arc<T> {
    async fn copy(&self, options: &CopyOptions) -> Result<CopyStats> {
        (**self).copy(options).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// A single file to transfer
#[derive(Debug, Clone, PartialEq, Eq)]
struct FileJob {
    source: PathBuf,
    destination: PathBuf,
}

/// Work left after comparing sources against the destination
#[derive(Debug, Default)]
struct CopyPlan {
    jobs: Vec<FileJob>,
    skipped: u64,
}

/// [`BulkCopyEngine`] for the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalCopyEngine;

impl LocalCopyEngine {
    /// Create a new local engine
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BulkCopyEngine for LocalCopyEngine {
    async fn copy(&self, options: &CopyOptions) -> Result<CopyStats> {
        for source in &options.sources {
            tokio::fs::metadata(source)
                .await
                .map_err(|e| Error::io_at(source, e))?;
        }

        let planned = options.clone();
        let plan = tokio::task::spawn_blocking(move || plan_copy(&planned))
            .await
            .map_err(|e| Error::copy(format!("Copy planning failed: {}", e)))??;

        debug!(
            "{} files to copy, {} already in sync",
            plan.jobs.len(),
            plan.skipped
        );

        if options.blocking {
            return run_plan(plan, options).await;
        }

        let options = options.clone();
        tokio::spawn(async move {
            match run_plan(plan, &options).await {
                Ok(stats) => info!(
                    "Detached copy to {} finished: {} files, {} bytes",
                    options.target.display(),
                    stats.files_copied,
                    stats.bytes_copied
                ),
                Err(e) => error!("Detached copy to {} failed: {}", options.target.display(), e),
            }
        });
        Ok(CopyStats::new())
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

/// Walk every source and decide what must be transferred
fn plan_copy(options: &CopyOptions) -> Result<CopyPlan> {
    let mut plan = CopyPlan::default();

    for source in &options.sources {
        let base = destination_base(source, &options.target, options.sync_folder)?;

        if source.is_file() {
            let destination = base.join(file_name(source)?);
            push_job(&mut plan, source.clone(), destination, options.sync_folder)?;
            continue;
        }

        for entry in WalkDir::new(source).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().map_or_else(|| source.clone(), Path::to_path_buf);
                Error::io_at(path, e.into())
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(source)
                .map_err(|e| Error::copy(format!("{}: {}", entry.path().display(), e)))?;
            let destination = base.join(relative);
            push_job(&mut plan, entry.into_path(), destination, options.sync_folder)?;
        }
    }

    Ok(plan)
}

/// Directory a source's files are placed under
fn destination_base(source: &Path, target: &Path, sync_folder: bool) -> Result<PathBuf> {
    if sync_folder || source.is_file() {
        Ok(target.to_path_buf())
    } else {
        Ok(target.join(file_name(source)?))
    }
}

fn file_name(path: &Path) -> Result<&std::ffi::OsStr> {
    path.file_name()
        .ok_or_else(|| Error::copy(format!("Source {} has no file name", path.display())))
}

fn push_job(
    plan: &mut CopyPlan,
    source: PathBuf,
    destination: PathBuf,
    sync_folder: bool,
) -> Result<()> {
    if sync_folder && is_in_sync(&source, &destination)? {
        plan.skipped += 1;
    } else {
        plan.jobs.push(FileJob {
            source,
            destination,
        });
    }
    Ok(())
}

/// Same size and modification time on both sides
fn is_in_sync(source: &Path, destination: &Path) -> Result<bool> {
    let Ok(existing) = std::fs::metadata(destination) else {
        return Ok(false);
    };
    if !existing.is_file() {
        return Ok(false);
    }
    let original = std::fs::metadata(source).map_err(|e| Error::io_at(source, e))?;
    Ok(original.len() == existing.len()
        && FileTime::from_last_modification_time(&original)
            == FileTime::from_last_modification_time(&existing))
}

/// Execute the plan with at most `max_maps` concurrent workers
async fn run_plan(plan: CopyPlan, options: &CopyOptions) -> Result<CopyStats> {
    let start_time = Instant::now();
    let mut stats = CopyStats {
        files_skipped: plan.skipped,
        ..CopyStats::default()
    };

    let parents: BTreeSet<&Path> = plan
        .jobs
        .iter()
        .filter_map(|job| job.destination.parent())
        .collect();
    for parent in parents {
        if !parent.is_dir() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::io_at(parent, e))?;
            stats.directories_created += 1;
        }
    }

    let semaphore = Arc::new(Semaphore::new(options.max_maps.get()));
    let mut workers = JoinSet::new();

    for job in plan.jobs {
        let permit = Arc::clone(&semaphore)
            .acquire_owned()
            .await
            .map_err(|e| Error::copy(format!("Failed to acquire worker permit: {}", e)))?;
        let limit = options.map_bandwidth_kb;
        workers.spawn(async move {
            let result = copy_file(&job, limit).await;
            drop(permit);
            result
        });
    }

    while let Some(joined) = workers.join_next().await {
        let bytes = joined.map_err(|e| Error::copy(format!("Copy worker failed: {}", e)))??;
        stats.files_copied += 1;
        stats.bytes_copied += bytes;
    }

    stats.duration = start_time.elapsed();
    Ok(stats)
}

/// Copy one file under the bandwidth cap and carry its modification time over
async fn copy_file(job: &FileJob, limit: BandwidthKb) -> Result<u64> {
    let mut reader = File::open(&job.source)
        .await
        .map_err(|e| Error::io_at(&job.source, e))?;
    let mut writer = File::create(&job.destination)
        .await
        .map_err(|e| Error::io_at(&job.destination, e))?;

    let mut throttle = Throttle::new(limit);
    let mut buffer = vec![0u8; throttle.chunk_size()];

    loop {
        let read = reader
            .read(&mut buffer)
            .await
            .map_err(|e| Error::io_at(&job.source, e))?;
        if read == 0 {
            break;
        }
        writer
            .write_all(&buffer[..read])
            .await
            .map_err(|e| Error::io_at(&job.destination, e))?;
        throttle.consume(read as u64).await;
    }

    writer
        .flush()
        .await
        .map_err(|e| Error::io_at(&job.destination, e))?;
    drop(writer);

    let metadata = tokio::fs::metadata(&job.source)
        .await
        .map_err(|e| Error::io_at(&job.source, e))?;
    filetime::set_file_mtime(
        &job.destination,
        FileTime::from_last_modification_time(&metadata),
    )
    .map_err(|e| Error::io_at(&job.destination, e))?;

    debug!(
        "Copied: {} -> {}",
        job.source.display(),
        job.destination.display()
    );
    Ok(throttle.transferred())
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedrep_types::WorkerCount;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn write(path: &Path, body: &[u8]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    fn feed(temp_dir: &TempDir) -> PathBuf {
        let source = temp_dir.path().join("in/clicks");
        write(&source.join("2024/01/part-0"), b"alpha");
        write(&source.join("2024/02/part-0"), b"beta");
        write(&source.join("README"), b"feed");
        fs::create_dir_all(source.join("2024/03")).unwrap();
        source
    }

    #[tokio::test]
    async fn test_sync_folder_copies_contents() {
        let temp_dir = TempDir::new().unwrap();
        let source = feed(&temp_dir);
        let target = temp_dir.path().join("out");

        let options = CopyOptions::new(vec![source], &target);
        let stats = LocalCopyEngine::new().copy(&options).await.unwrap();

        assert_eq!(stats.files_copied, 3);
        assert_eq!(stats.bytes_copied, 13);
        assert_eq!(fs::read(target.join("2024/01/part-0")).unwrap(), b"alpha");
        assert_eq!(fs::read(target.join("README")).unwrap(), b"feed");
    }

    #[tokio::test]
    async fn test_empty_directories_are_not_created() {
        let temp_dir = TempDir::new().unwrap();
        let source = feed(&temp_dir);
        let target = temp_dir.path().join("out");

        LocalCopyEngine::new()
            .copy(&CopyOptions::new(vec![source], &target))
            .await
            .unwrap();

        assert!(target.join("2024/02").is_dir());
        assert!(!target.join("2024/03").exists());
    }

    #[tokio::test]
    async fn test_second_sync_skips_unchanged_files() {
        let temp_dir = TempDir::new().unwrap();
        let source = feed(&temp_dir);
        let target = temp_dir.path().join("out");
        let options = CopyOptions::new(vec![source.clone()], &target);
        let engine = LocalCopyEngine::new();

        engine.copy(&options).await.unwrap();
        write(&source.join("2024/01/part-0"), b"alpha, revised");
        let stats = engine.copy(&options).await.unwrap();

        assert_eq!(stats.files_copied, 1);
        assert_eq!(stats.files_skipped, 2);
        assert_eq!(stats.directories_created, 0);
        assert_eq!(
            fs::read(target.join("2024/01/part-0")).unwrap(),
            b"alpha, revised"
        );
    }

    #[tokio::test]
    async fn test_without_sync_folder_sources_keep_their_name() {
        let temp_dir = TempDir::new().unwrap();
        let source = feed(&temp_dir);
        let target = temp_dir.path().join("out");

        let options = CopyOptions::new(vec![source], &target).sync_folder(false);
        LocalCopyEngine::new().copy(&options).await.unwrap();
        let stats = LocalCopyEngine::new().copy(&options).await.unwrap();

        assert!(target.join("clicks/2024/01/part-0").is_file());
        assert_eq!(stats.files_copied, 3);
        assert_eq!(stats.files_skipped, 0);
    }

    #[tokio::test]
    async fn test_file_source_lands_under_target() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("single.dat");
        write(&source, b"0123456789");
        let target = temp_dir.path().join("out");

        let stats = LocalCopyEngine::new()
            .copy(&CopyOptions::new(vec![source], &target))
            .await
            .unwrap();

        assert_eq!(stats.bytes_copied, 10);
        assert!(target.join("single.dat").is_file());
    }

    #[tokio::test]
    async fn test_missing_source_fails_before_copying() {
        let temp_dir = TempDir::new().unwrap();
        let source = feed(&temp_dir);
        let target = temp_dir.path().join("out");

        let options = CopyOptions::new(vec![source, temp_dir.path().join("absent")], &target);
        let result = LocalCopyEngine::new().copy(&options).await;

        assert!(matches!(result, Err(Error::FileNotFound { .. })));
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn test_modification_time_is_preserved() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("in");
        write(&source.join("a"), b"a");
        let past = FileTime::from_unix_time(1_600_000_000, 0);
        filetime::set_file_mtime(source.join("a"), past).unwrap();
        let target = temp_dir.path().join("out");

        LocalCopyEngine::new()
            .copy(&CopyOptions::new(vec![source], &target))
            .await
            .unwrap();

        let copied = fs::metadata(target.join("a")).unwrap();
        assert_eq!(FileTime::from_last_modification_time(&copied), past);
    }

    #[tokio::test]
    async fn test_single_worker_copies_everything() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("in");
        for i in 0..20 {
            write(&source.join(format!("f{:02}", i)), b"xy");
        }
        let target = temp_dir.path().join("out");

        let options = CopyOptions::new(vec![source], &target)
            .with_max_maps(WorkerCount::new(1).unwrap());
        let stats = LocalCopyEngine::new().copy(&options).await.unwrap();

        assert_eq!(stats.files_copied, 20);
        assert_eq!(stats.bytes_copied, 40);
    }

    #[tokio::test]
    async fn test_bandwidth_cap_slows_the_copy() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("in");
        write(&source.join("blob"), &[7u8; 2048]);
        let target = temp_dir.path().join("out");

        let options = CopyOptions::new(vec![source], &target)
            .with_map_bandwidth_kb(BandwidthKb::new(1).unwrap());
        let started = Instant::now();
        LocalCopyEngine::new().copy(&options).await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(1500));
        assert_eq!(fs::metadata(target.join("blob")).unwrap().len(), 2048);
    }

    #[tokio::test]
    async fn test_non_blocking_copy_returns_immediately() {
        let temp_dir = TempDir::new().unwrap();
        let source = feed(&temp_dir);
        let target = temp_dir.path().join("out");

        let options = CopyOptions::new(vec![source], &target).blocking(false);
        let stats = LocalCopyEngine::new().copy(&options).await.unwrap();
        assert_eq!(stats, CopyStats::new());

        let readme = target.join("README");
        for _ in 0..100 {
            if readme.is_file() && fs::read(&readme).unwrap() == b"feed" {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(fs::read(readme).unwrap(), b"feed");
    }
}
