//! Storage engine seam.
//!
//! A [`Store`] names a database location and knows how to open it; every
//! phase opens its own [`Engine`] handle and drops it when done, so no handle
//! ever outlives a measured phase.

mod memory;
#[cfg(feature = "rocksdb")]
mod rocks;

pub use memory::{MemEngine, MemStore};
#[cfg(feature = "rocksdb")]
pub use rocks::{RocksEngine, RocksStore, ValueStorage, DEFAULT_BLOB_THRESHOLD};

use crate::error::Result;
use crate::stats::StatsLayout;

pub trait Store {
    type Engine: Engine;

    /// Short engine name used in logs and recorded results.
    fn name(&self) -> &'static str;

    /// Statistics property holding the per-level size table.
    fn stats_property(&self) -> &'static str;

    fn stats_layout(&self) -> StatsLayout;

    /// Property giving the bytes stored outside the level table (separated
    /// values), if the store keeps any.
    fn value_log_property(&self) -> Option<&'static str> {
        None
    }

    /// Open the store, creating it if missing, with compression disabled.
    fn open(&self) -> Result<Self::Engine>;

    /// Physically remove everything the store has written.
    fn destroy(&self) -> Result<()>;
}

/// An open database handle. Closing is dropping.
pub trait Engine {
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()>;

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Position a fresh forward iterator on the first key and advance it at
    /// most `steps` times. Returns the number of steps taken, which is less
    /// than `steps` only when the keyspace ran out. The iterator status is
    /// checked before returning.
    fn advance_from_first(&self, steps: usize) -> Result<usize>;

    /// Named engine property as text, `None` if the engine does not know it.
    fn property(&self, name: &str) -> Result<Option<String>>;
}
