//! Host execution environment view
//!
//! The engines never read the system clock directly. The host environment
//! that serializes transactions also supplies a monotonically increasing
//! logical block height and a wall-clock timestamp, and everything
//! block- or time-dependent is derived from this trait.

use std::sync::atomic::{AtomicU64, Ordering};

/// View of the host chain supplied to every engine
pub trait ChainHost: Send + Sync {
    /// Current logical block height
    fn block_number(&self) -> u64;

    /// Current wall-clock timestamp in seconds
    fn timestamp_secs(&self) -> u64;
}

/// An in-memory host chain
///
/// Block height and time only move when explicitly advanced, which makes
/// lifecycle boundaries (voting windows, expiry days) deterministic in tests
/// and embeddings.
pub struct SimulatedChain {
    block: AtomicU64,
    time: AtomicU64,
}

impl SimulatedChain {
    /// Create a simulated chain at the given height and time
    pub fn new(block: u64, timestamp_secs: u64) -> Self {
        Self {
            block: AtomicU64::new(block),
            time: AtomicU64::new(timestamp_secs),
        }
    }

    /// Advance the block height
    pub fn advance_blocks(&self, n: u64) {
        self.block.fetch_add(n, Ordering::SeqCst);
    }

    /// Advance the wall clock
    pub fn advance_secs(&self, n: u64) {
        self.time.fetch_add(n, Ordering::SeqCst);
    }
}

impl ChainHost for SimulatedChain {
    fn block_number(&self) -> u64 {
        self.block.load(Ordering::SeqCst)
    }

    fn timestamp_secs(&self) -> u64 {
        self.time.load(Ordering::SeqCst)
    }
}
