//! Sweep configuration and fixed constants.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Value sizes swept, in bytes. One report row per entry.
pub const VALUE_SIZES: [usize; 7] = [
    64,
    256,
    1024,
    4 * 1024,
    16 * 1024,
    64 * 1024,
    256 * 1024,
];

/// Width of every rendered key, in characters.
pub const KEY_WIDTH: usize = 16;

/// Raw key+value payload written per configuration (1 GiB).
pub const DEFAULT_PAYLOAD_BYTES: u64 = 1 << 30;

/// Offset added to every scan timing.
pub const DEFAULT_SCAN_BIAS: Duration = Duration::from_millis(500);

pub const DEFAULT_DEVICE: &str = "sdb1";
pub const DEFAULT_MOUNT_POINT: &str = "/mnt/g";
pub const DEFAULT_DB_DIR: &str = "/mnt/g/tmp/leveldb";
pub const DEFAULT_REPORT_PATH: &str = "load2.txt";

/// Number of key/value pairs that make up `payload_bytes` at `value_size`.
pub fn item_count(payload_bytes: u64, value_size: usize) -> usize {
    (payload_bytes / (value_size + KEY_WIDTH) as u64) as usize
}

/// `path` with the number ending its file stem replaced by `n`, keeping the
/// extension: `load2.txt` becomes `load3.txt`, `out.data` becomes `out3.data`.
pub fn numbered_report_path(path: &Path, n: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let base = stem.trim_end_matches(|c: char| c.is_ascii_digit());

    let name = match path.extension() {
        Some(ext) => format!("{}{}.{}", base, n, ext.to_string_lossy()),
        None => format!("{}{}", base, n),
    };
    path.with_file_name(name)
}

#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Block device backing the mount point, without the `/dev/` prefix.
    pub device: String,

    /// Mount point cycled by the cache barrier.
    pub mount_point: PathBuf,

    /// Database directory. Removed between configurations.
    pub db_dir: PathBuf,

    /// Plain-text report written at the end of the sweep.
    pub report_path: PathBuf,

    /// Raw payload per configuration.
    pub payload_bytes: u64,

    pub value_sizes: Vec<usize>,

    /// Added to every scan timing before throughput is derived.
    pub scan_bias: Duration,

    /// Whether the unmount/mount barrier runs at all.
    pub remount: bool,

    /// Treat a failed barrier as fatal instead of logging and continuing.
    pub strict_barriers: bool,

    /// Stop the sweep when a phase aborts before its last operation.
    pub abort_on_partial_phase: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
            mount_point: PathBuf::from(DEFAULT_MOUNT_POINT),
            db_dir: PathBuf::from(DEFAULT_DB_DIR),
            report_path: PathBuf::from(DEFAULT_REPORT_PATH),
            payload_bytes: DEFAULT_PAYLOAD_BYTES,
            value_sizes: VALUE_SIZES.to_vec(),
            scan_bias: DEFAULT_SCAN_BIAS,
            remount: true,
            strict_barriers: false,
            abort_on_partial_phase: false,
        }
    }
}

impl SweepConfig {
    /// Payload expressed in MiB, the numerator of load throughput.
    pub fn payload_mib(&self) -> f64 {
        self.payload_bytes as f64 / (1u64 << 20) as f64
    }

    pub fn validate(&self) -> Result<()> {
        if self.payload_bytes == 0 {
            return Err(Error::Config("payload must be non-zero".into()));
        }
        if self.value_sizes.is_empty() {
            return Err(Error::Config("no value sizes to sweep".into()));
        }
        if self.db_dir.as_os_str().is_empty() {
            return Err(Error::Config("database directory is empty".into()));
        }
        if self.report_path.as_os_str().is_empty() {
            return Err(Error::Config("report path is empty".into()));
        }
        for &size in &self.value_sizes {
            if item_count(self.payload_bytes, size) / 4 == 0 {
                log::warn!(
                    "payload holds fewer than 4 pairs of {}B, its scans and lookup report 0",
                    size
                );
            }
        }
        if self.remount {
            if self.device.is_empty() {
                return Err(Error::Config("device is empty".into()));
            }
            if !self.db_dir.starts_with(&self.mount_point) {
                log::warn!(
                    "database {} is outside mount point {}, barrier will not reach it",
                    self.db_dir.display(),
                    self.mount_point.display()
                );
            }
        }
        Ok(())
    }
}
