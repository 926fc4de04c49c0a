//! Per-worker bandwidth throttling

use feedrep_types::BandwidthKb;
use std::time::{Duration, Instant};

/// Largest chunk a worker reads before checking its budget
pub const MAX_CHUNK_SIZE: usize = 64 * 1024;

/// Keeps one worker at or below its bandwidth cap
#[derive(Debug)]
pub struct Throttle {
    bytes_per_sec: u64,
    started: Instant,
    transferred: u64,
}

impl Throttle {
    /// Start a throttle for the given cap
    pub fn new(limit: BandwidthKb) -> Self {
        Self {
            bytes_per_sec: limit.bytes_per_sec(),
            started: Instant::now(),
            transferred: 0,
        }
    }

    /// Chunk size that lets the throttle react at least once per second
    pub fn chunk_size(&self) -> usize {
        usize::try_from(self.bytes_per_sec)
            .unwrap_or(MAX_CHUNK_SIZE)
            .clamp(1, MAX_CHUNK_SIZE)
    }

    /// Bytes accounted so far
    pub fn transferred(&self) -> u64 {
        self.transferred
    }

    /// Account for `bytes` and sleep until the average rate is back under the cap
    pub async fn consume(&mut self, bytes: u64) {
        self.transferred += bytes;
        let delay = required_delay(self.transferred, self.bytes_per_sec, self.started.elapsed());
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Time still owed after moving `transferred` bytes in `elapsed` at `bytes_per_sec`
pub fn required_delay(transferred: u64, bytes_per_sec: u64, elapsed: Duration) -> Duration {
    if bytes_per_sec == 0 {
        return Duration::ZERO;
    }
    let expected = Duration::from_secs_f64(transferred as f64 / bytes_per_sec as f64);
    expected.saturating_sub(elapsed)
}
