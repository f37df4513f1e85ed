//! In-memory engine for dry runs.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{Engine, Store};
use crate::error::Result;
use crate::stats::{self, StatsLayout};

pub const MEM_STATS_PROPERTY: &str = "memory.stats";

type Table = BTreeMap<Vec<u8>, Vec<u8>>;

/// A store kept in process memory.
///
/// Handles opened from the same store share one table, so data survives
/// between phases the way an on-disk store would. Cloning shares the table.
#[derive(Clone)]
pub struct MemStore {
    table: Arc<Mutex<Table>>,
    stats_enabled: bool,
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            table: Arc::default(),
            stats_enabled: true,
        }
    }

    /// A store whose statistics property is never available.
    pub fn without_stats() -> Self {
        Self {
            stats_enabled: false,
            ..Self::new()
        }
    }

    pub fn len(&self) -> usize {
        self.table.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.lock().is_empty()
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemStore {
    type Engine = MemEngine;

    fn name(&self) -> &'static str {
        "memory"
    }

    fn stats_property(&self) -> &'static str {
        MEM_STATS_PROPERTY
    }

    fn stats_layout(&self) -> StatsLayout {
        StatsLayout::LEVELDB
    }

    fn open(&self) -> Result<MemEngine> {
        Ok(MemEngine {
            table: Arc::clone(&self.table),
            stats_enabled: self.stats_enabled,
        })
    }

    fn destroy(&self) -> Result<()> {
        self.table.lock().clear();
        Ok(())
    }
}

pub struct MemEngine {
    table: Arc<Mutex<Table>>,
    stats_enabled: bool,
}

impl Engine for MemEngine {
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.table.lock().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.table.lock().get(key).cloned())
    }

    fn advance_from_first(&self, steps: usize) -> Result<usize> {
        let table = self.table.lock();
        Ok(table.keys().take(steps).count())
    }

    fn property(&self, name: &str) -> Result<Option<String>> {
        if !self.stats_enabled || name != MEM_STATS_PROPERTY {
            return Ok(None);
        }

        let table = self.table.lock();
        let bytes: usize = table.iter().map(|(k, v)| k.len() + v.len()).sum();
        let mb = (bytes as f64 / (1u64 << 20) as f64).round() as u64;
        Ok(Some(stats::render_leveldb_table(&[(0, table.len().min(1), mb)])))
    }
}
