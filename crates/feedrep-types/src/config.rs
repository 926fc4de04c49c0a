//! Validated configuration values for feedrep
//!
//! These newtypes are shared between the configuration layer and the copy
//! engine so that both agree on the accepted ranges.

/// Maximum number of parallel copy workers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorkerCount(usize);

impl WorkerCount {
    /// Minimum worker count
    pub const MIN: usize = 1;
    /// Maximum worker count
    pub const MAX: usize = 256;
    /// Default worker count
    pub const DEFAULT: usize = 5;

    /// Create a new worker count with validation
    pub fn new(count: usize) -> Result<Self, String> {
        if count < Self::MIN {
            Err(format!("Worker count {} is below minimum {}", count, Self::MIN))
        } else if count > Self::MAX {
            Err(format!("Worker count {} exceeds maximum {}", count, Self::MAX))
        } else {
            Ok(Self(count))
        }
    }

    /// Get the worker count value
    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for WorkerCount {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

/// Per-worker bandwidth cap in KiB per second
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BandwidthKb(u64);

impl BandwidthKb {
    /// Minimum bandwidth (1 KiB/s)
    pub const MIN: u64 = 1;
    /// Default bandwidth (100 MiB/s)
    pub const DEFAULT: u64 = 100 * 1024;

    /// Create a new bandwidth cap with validation
    pub fn new(kb_per_sec: u64) -> Result<Self, String> {
        if kb_per_sec < Self::MIN {
            Err(format!(
                "Bandwidth {} KB/s is below minimum {}",
                kb_per_sec,
                Self::MIN
            ))
        } else {
            Ok(Self(kb_per_sec))
        }
    }

    /// Get the bandwidth in KiB per second
    pub fn get(self) -> u64 {
        self.0
    }

    /// Get the bandwidth in bytes per second
    pub fn bytes_per_sec(self) -> u64 {
        self.0.saturating_mul(1024)
    }
}

impl Default for BandwidthKb {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}
