//! JSON result types.
//!
//! Every sweep is also recorded as a JSON file matching these types so runs
//! on different machines or engines can be compared with `bench-compare`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Top-level report written to a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    /// Schema version for forward compatibility.
    pub schema_version: u32,
    /// Metadata about this run (hardware, git, timestamp, environment).
    pub metadata: RunMetadata,
    /// One entry per timed phase and per size probe.
    pub results: Vec<BenchmarkResult>,
}

/// Metadata captured at the start of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    /// RFC 3339 timestamp of the run start.
    pub timestamp: String,
    /// Short git commit hash (empty if not in a git repo).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_commit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_branch: Option<String>,
    /// Whether the working tree had uncommitted changes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_dirty: Option<bool>,
    /// Engine binding the sweep ran against (e.g. "rocksdb", "memory").
    pub engine: String,
    /// Harness version.
    pub harness_version: String,
    /// Raw payload per configuration, in bytes.
    pub payload_bytes: u64,
    /// Whether the cache barrier was enabled.
    pub remount: bool,
    pub hardware: HardwareInfo,
}

/// Hardware information for reproducibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HardwareInfo {
    /// CPU model string.
    pub cpu: String,
    /// Number of logical cores.
    pub cores: usize,
    /// Total RAM in GB.
    pub ram_gb: u64,
    pub os: String,
    pub arch: String,
}

/// A single measurement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Measurement name (e.g. "sweep/1024B/ran-load").
    pub benchmark: String,
    /// Category ("load", "scan", "lookup", "size").
    pub category: String,
    /// Measurement-specific parameters.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    #[serde(default)]
    pub parameters: HashMap<String, serde_json::Value>,
    pub metrics: BenchmarkMetrics,
}

/// Metrics collected from a measurement.
///
/// Fields that don't apply are omitted from JSON output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchmarkMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mib_per_sec: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ops_per_sec: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_ns: Option<u64>,
    /// Operations actually performed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ops: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_ops: Option<u64>,
    /// False when the phase stopped before its last operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complete: Option<bool>,
    /// Engine-reported size, in the engine's unit (MB for LevelDB-family).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}
