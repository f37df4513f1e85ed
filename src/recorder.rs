//! Result recorder for saving sweep results to JSON files.
//!
//! Creates JSON files in a results directory following the types in
//! [`crate::schema`].

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::SweepConfig;
use crate::error::Result;
use crate::schema::*;
use crate::sweep::{ConfigurationResult, Step};

/// Accumulates results and writes them to a JSON file.
pub struct ResultRecorder {
    category: String,
    metadata: RunMetadata,
    results: Vec<BenchmarkResult>,
}

impl ResultRecorder {
    /// Create a new recorder for the given category.
    ///
    /// Captures metadata (hardware, git, timestamp) at construction time.
    pub fn new(category: &str, engine: &str, config: &SweepConfig) -> Self {
        Self {
            category: category.to_string(),
            metadata: RunMetadata {
                timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
                git_commit: git_short_commit(),
                git_branch: git_branch(),
                git_dirty: git_is_dirty(),
                engine: engine.to_string(),
                harness_version: env!("CARGO_PKG_VERSION").to_string(),
                payload_bytes: config.payload_bytes,
                remount: config.remount,
                hardware: capture_hardware(),
            },
            results: Vec::new(),
        }
    }

    /// Record a raw result.
    pub fn record(&mut self, result: BenchmarkResult) {
        self.results.push(result);
    }

    /// Record every timed phase and the size probe of one configuration.
    pub fn record_configuration(&mut self, result: &ConfigurationResult) {
        let row = &result.row;
        let payload_mib = self.metadata.payload_bytes as f64 / (1u64 << 20) as f64;

        let mut params = HashMap::new();
        params.insert("value_size".into(), serde_json::json!(row.value_size));
        params.insert("items".into(), serde_json::json!(row.items));

        for (step, outcome) in &result.phases {
            let elapsed = outcome.elapsed();
            self.results.push(BenchmarkResult {
                benchmark: format!("sweep/{}B/{}", row.value_size, step.label()),
                category: step.category().to_string(),
                parameters: params.clone(),
                metrics: BenchmarkMetrics {
                    mib_per_sec: Some(outcome.throughput(payload_mib * step.payload_share())),
                    ops_per_sec: Some(outcome.completed() as f64 / elapsed.as_secs_f64()),
                    elapsed_ns: Some(elapsed.as_nanos() as u64),
                    ops: Some(outcome.completed() as u64),
                    requested_ops: Some(outcome.requested() as u64),
                    complete: Some(outcome.is_complete()),
                    ..Default::default()
                },
            });
        }

        self.results.push(BenchmarkResult {
            benchmark: format!("sweep/{}B/{}", row.value_size, Step::SizeProbe.label()),
            category: Step::SizeProbe.category().to_string(),
            parameters: params,
            metrics: BenchmarkMetrics {
                size: Some(result.size.value()),
                complete: Some(result.size != crate::phase::SizeProbe::Unavailable),
                ..Default::default()
            },
        });
    }

    pub fn report(&self) -> BenchmarkReport {
        BenchmarkReport {
            schema_version: 1,
            metadata: self.metadata.clone(),
            results: self.results.clone(),
        }
    }

    /// Write all accumulated results to a JSON file in `dir`.
    ///
    /// File naming: `<category>-<timestamp>-<commit>.json`
    pub fn save(self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let report = self.report();

        let commit = self.metadata.git_commit.as_deref().unwrap_or("unknown");
        // Sanitize timestamp for filename (replace colons)
        let ts = self.metadata.timestamp.replace(':', "-");
        let filename = format!("{}-{}-{}.json", self.category, ts, commit);

        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(filename);

        fs::write(&path, serde_json::to_string_pretty(&report)?)?;

        log::info!("results saved to {}", path.display());
        Ok(path)
    }
}

// ---------------------------------------------------------------------------
// Metadata capture helpers
// ---------------------------------------------------------------------------

fn git_short_commit() -> Option<String> {
    git(&["rev-parse", "--short", "HEAD"])
}

fn git_branch() -> Option<String> {
    git(&["rev-parse", "--abbrev-ref", "HEAD"])
}

fn git_is_dirty() -> Option<bool> {
    git(&["status", "--porcelain"]).map(|out| !out.is_empty())
}

fn git(args: &[&str]) -> Option<String> {
    std::process::Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
}

fn capture_hardware() -> HardwareInfo {
    HardwareInfo {
        cpu: read_cpu_model(),
        cores: std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(0),
        ram_gb: read_total_ram_gb(),
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
    }
}

fn read_cpu_model() -> String {
    fs::read_to_string("/proc/cpuinfo")
        .ok()
        .and_then(|info| {
            info.lines()
                .find(|l| l.starts_with("model name"))
                .and_then(|l| l.split(':').nth(1))
                .map(|m| m.trim().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

fn read_total_ram_gb() -> u64 {
    fs::read_to_string("/proc/meminfo")
        .ok()
        .and_then(|info| {
            info.lines()
                .find(|l| l.starts_with("MemTotal:"))
                .and_then(|l| l.split_whitespace().nth(1))
                .and_then(|kb| kb.parse::<u64>().ok())
        })
        .map(|kb| kb / (1024 * 1024))
        .unwrap_or(0)
}
