use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// Tracks scan throughput and matcher-internal counters.
///
/// All fields are relaxed atomics shared behind `Arc`, so workers on
/// the rayon pool update them without any locking.
#[derive(Debug, Clone)]
pub struct ScanMetrics {
    files_scanned: Arc<AtomicU64>,
    bytes_scanned: Arc<AtomicU64>,

    // Prefix-table cache metrics (KMP)
    cache_hits: Arc<AtomicU64>,
    cache_misses: Arc<AtomicU64>,

    // Rolling-hash hits rejected by byte-wise confirmation (Rabin-Karp)
    hash_collisions: Arc<AtomicU64>,
}

impl ScanMetrics {
    pub fn new() -> Self {
        Self {
            files_scanned: Arc::new(AtomicU64::new(0)),
            bytes_scanned: Arc::new(AtomicU64::new(0)),
            cache_hits: Arc::new(AtomicU64::new(0)),
            cache_misses: Arc::new(AtomicU64::new(0)),
            hash_collisions: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Records one file of `bytes` content entering classification
    pub fn record_file_scanned(&self, bytes: u64) {
        self.files_scanned.fetch_add(1, Ordering::Relaxed);
        self.bytes_scanned.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Records a prefix-table cache lookup
    pub fn record_cache_lookup(&self, hit: bool) {
        if hit {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.cache_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Records a rolling-hash equality that failed confirmation
    pub fn record_hash_collision(&self) {
        self.hash_collisions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> u64 {
        self.cache_misses.load(Ordering::Relaxed)
    }

    pub fn hash_collisions(&self) -> u64 {
        self.hash_collisions.load(Ordering::Relaxed)
    }

    /// Gets a snapshot of the current counters
    pub fn get_stats(&self) -> ScanStats {
        ScanStats {
            files_scanned: self.files_scanned.load(Ordering::Relaxed),
            bytes_scanned: self.bytes_scanned.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            hash_collisions: self.hash_collisions.load(Ordering::Relaxed),
        }
    }

    /// Logs the current counters
    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Scan stats:\n\
             Files scanned: {}\n\
             Bytes scanned: {}\n\
             Prefix-table cache hits/misses: {}/{}\n\
             Hash collisions rejected: {}",
            stats.files_scanned,
            stats.bytes_scanned,
            stats.cache_hits,
            stats.cache_misses,
            stats.hash_collisions
        );
    }
}

impl Default for ScanMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of scan counters
#[derive(Debug, Clone, Copy)]
pub struct ScanStats {
    pub files_scanned: u64,
    pub bytes_scanned: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub hash_collisions: u64,
}
