//! Shared test utilities: small configurations and instrumented stores.

#![allow(dead_code)]

use std::cell::Cell;
use std::io;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use kv_sweep::barrier::CacheBarrier;
use kv_sweep::engine::{Engine, MemEngine, MemStore, Store};
use kv_sweep::stats::StatsLayout;
use kv_sweep::{Error, Result, SweepConfig};

/// Payload small enough for the whole sweep to run in memory quickly.
pub const SMALL_PAYLOAD: u64 = 1 << 20;

pub fn small_config(dir: &Path) -> SweepConfig {
    SweepConfig {
        mount_point: dir.to_path_buf(),
        db_dir: dir.join("db"),
        report_path: dir.join("load.txt"),
        payload_bytes: SMALL_PAYLOAD,
        scan_bias: Duration::ZERO,
        ..SweepConfig::default()
    }
}

pub fn loaded_store(num: usize, value_size: usize) -> MemStore {
    let store = MemStore::new();
    let mut engine = store.open().unwrap();
    for id in 0..num {
        engine
            .put(
                kv_sweep::workload::key(id).as_bytes(),
                kv_sweep::workload::value(id, value_size).as_bytes(),
            )
            .unwrap();
    }
    store
}

// =============================================================================
// Barriers
// =============================================================================

/// Counts flushes; optionally fails every one of them.
#[derive(Default)]
pub struct RecordingBarrier {
    pub flushes: usize,
    pub fail: bool,
}

impl RecordingBarrier {
    pub fn failing() -> Self {
        Self {
            flushes: 0,
            fail: true,
        }
    }
}

impl CacheBarrier for RecordingBarrier {
    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        if self.fail {
            return Err(Error::Command {
                command: "\"umount\" \"/mnt/test\"".into(),
                status: "exit status: 32".into(),
                stderr: "umount: /mnt/test: not mounted.".into(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Instrumented store
// =============================================================================

pub const VALUE_LOG_PROPERTY: &str = "counting.value-log";

/// Wraps a [`MemStore`], counting opens and resets and optionally failing
/// every put after the first `fail_after`. With `value_log` set the store
/// also reports that many bytes held outside its level table.
#[derive(Clone, Default)]
pub struct CountingStore {
    pub inner: MemStore,
    pub opens: Rc<Cell<usize>>,
    pub resets: Rc<Cell<usize>>,
    pub fail_after: Option<usize>,
    pub value_log: Option<u64>,
}

impl CountingStore {
    pub fn failing_after(puts: usize) -> Self {
        Self {
            fail_after: Some(puts),
            ..Self::default()
        }
    }
}

pub struct CountingEngine {
    inner: MemEngine,
    puts: usize,
    fail_after: Option<usize>,
    value_log: Option<u64>,
}

impl Store for CountingStore {
    type Engine = CountingEngine;

    fn name(&self) -> &'static str {
        "counting"
    }

    fn stats_property(&self) -> &'static str {
        self.inner.stats_property()
    }

    fn stats_layout(&self) -> StatsLayout {
        self.inner.stats_layout()
    }

    fn value_log_property(&self) -> Option<&'static str> {
        self.value_log.map(|_| VALUE_LOG_PROPERTY)
    }

    fn open(&self) -> Result<CountingEngine> {
        self.opens.set(self.opens.get() + 1);
        Ok(CountingEngine {
            inner: self.inner.open()?,
            puts: 0,
            fail_after: self.fail_after,
            value_log: self.value_log,
        })
    }

    fn destroy(&self) -> Result<()> {
        self.resets.set(self.resets.get() + 1);
        self.inner.destroy()
    }
}

impl Engine for CountingEngine {
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        if self.fail_after.is_some_and(|limit| self.puts >= limit) {
            return Err(io::Error::other("injected write failure").into());
        }
        self.puts += 1;
        self.inner.put(key, value)
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.inner.get(key)
    }

    fn advance_from_first(&self, steps: usize) -> Result<usize> {
        self.inner.advance_from_first(steps)
    }

    fn property(&self, name: &str) -> Result<Option<String>> {
        match self.value_log {
            Some(bytes) if name == VALUE_LOG_PROPERTY => Ok(Some(bytes.to_string())),
            _ => self.inner.property(name),
        }
    }
}
