//! RocksDB binding.

use std::io;
use std::path::{Path, PathBuf};

use rocksdb::{DBCompressionType, Options, DB};

use super::{Engine, Store};
use crate::error::Result;
use crate::stats::StatsLayout;

pub const ROCKS_STATS_PROPERTY: &str = "rocksdb.levelstats";

/// Total bytes held in blob files, outside the level table.
pub const ROCKS_BLOB_SIZE_PROPERTY: &str = "rocksdb.total-blob-file-size";

/// Smallest value moved to a blob file by [`ValueStorage::Threshold`] in the
/// standard variant set. Only the largest swept values reach it.
pub const DEFAULT_BLOB_THRESHOLD: u64 = 65_000;

/// Where values are kept relative to the LSM tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueStorage {
    /// Values live inline in the table files, LevelDB style.
    Inline,
    /// Every value goes to a blob file; the tree holds only references.
    Separated,
    /// Values of at least this many bytes go to blob files.
    Threshold(u64),
}

impl ValueStorage {
    /// Variants swept by a multi-variant run, in report order.
    pub const VARIANTS: [ValueStorage; 3] = [
        Self::Separated,
        Self::Threshold(DEFAULT_BLOB_THRESHOLD),
        Self::Inline,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Inline => "rocksdb",
            Self::Separated => "rocksdb-blob",
            Self::Threshold(_) => "rocksdb-blob-threshold",
        }
    }

    pub fn uses_blobs(&self) -> bool {
        !matches!(self, Self::Inline)
    }

    fn apply(&self, opts: &mut Options) {
        match *self {
            Self::Inline => {}
            Self::Separated => {
                opts.set_enable_blob_files(true);
                opts.set_min_blob_size(0);
            }
            Self::Threshold(min) => {
                opts.set_enable_blob_files(true);
                opts.set_min_blob_size(min);
            }
        }
        if self.uses_blobs() {
            opts.set_blob_compression_type(DBCompressionType::None);
        }
    }
}

pub struct RocksStore {
    path: PathBuf,
    storage: ValueStorage,
}

impl RocksStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::with_storage(path, ValueStorage::Inline)
    }

    pub fn with_storage(path: impl AsRef<Path>, storage: ValueStorage) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            storage,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn storage(&self) -> ValueStorage {
        self.storage
    }

    fn options(&self) -> Options {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_compression_type(DBCompressionType::None);
        self.storage.apply(&mut opts);
        opts
    }
}

impl Store for RocksStore {
    type Engine = RocksEngine;

    fn name(&self) -> &'static str {
        self.storage.label()
    }

    fn stats_property(&self) -> &'static str {
        ROCKS_STATS_PROPERTY
    }

    fn stats_layout(&self) -> StatsLayout {
        StatsLayout::ROCKSDB_LEVELSTATS
    }

    fn value_log_property(&self) -> Option<&'static str> {
        self.storage.uses_blobs().then_some(ROCKS_BLOB_SIZE_PROPERTY)
    }

    fn open(&self) -> Result<RocksEngine> {
        let db = DB::open(&self.options(), &self.path)?;
        log::debug!("opened {}", self.path.display());
        Ok(RocksEngine { db })
    }

    /// Removes the whole directory. A missing directory is not an error.
    fn destroy(&self) -> Result<()> {
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

pub struct RocksEngine {
    db: DB,
}

impl Engine for RocksEngine {
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.db.put(key, value)?;
        Ok(())
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.db.get(key)?)
    }

    fn advance_from_first(&self, steps: usize) -> Result<usize> {
        let mut iter = self.db.raw_iterator();
        iter.seek_to_first();

        let mut taken = 0;
        while taken < steps && iter.valid() {
            iter.next();
            taken += 1;
        }
        iter.status()?;
        Ok(taken)
    }

    fn property(&self, name: &str) -> Result<Option<String>> {
        Ok(self.db.property_value(name)?)
    }
}
