//! Value-size sweep runner.
//!
//! Loads, scans and looks up 1 GiB of key/value pairs per value size
//! (64 B to 256 KiB), remounting the database filesystem between phases so
//! every read phase starts with a cold page cache.
//!
//! Run:      `sudo kv-sweep`
//! No root:  `kv-sweep --no-remount --db-dir /tmp/kv-sweep`
//! Dry run:  `kv-sweep --engine memory --no-remount`
//! Variants: `sudo kv-sweep --variant all` writes `load1.txt`..`load3.txt`
//! Logging:  `RUST_LOG=debug kv-sweep ...`

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use kv_sweep::barrier::{CacheBarrier, NoBarrier, SystemBarrier};
use kv_sweep::config::{self, SweepConfig};
use kv_sweep::engine::{MemStore, Store};
#[cfg(feature = "rocksdb")]
use kv_sweep::engine::{RocksStore, ValueStorage};
use kv_sweep::recorder::ResultRecorder;
use kv_sweep::sweep::ConfigurationResult;
#[cfg(feature = "rocksdb")]
use kv_sweep::sweep;
use kv_sweep::{Result, Sweep};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EngineKind {
    #[cfg(feature = "rocksdb")]
    Rocksdb,
    Memory,
}

/// How RocksDB keeps values.
#[cfg(feature = "rocksdb")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum VariantKind {
    /// Values inline in the table files
    Inline,
    /// Every value in blob files
    Blob,
    /// Values of at least --blob-threshold bytes in blob files
    BlobThreshold,
    /// blob, blob-threshold and inline in turn, one numbered report each
    All,
}

#[derive(Parser)]
#[command(name = "kv-sweep")]
#[command(about = "Cold-cache value-size sweep for embedded key-value engines", version)]
struct Cli {
    /// Engine binding to benchmark
    #[cfg_attr(feature = "rocksdb", arg(long, value_enum, default_value = "rocksdb"))]
    #[cfg_attr(not(feature = "rocksdb"), arg(long, value_enum, default_value = "memory"))]
    engine: EngineKind,

    /// RocksDB value storage
    #[cfg(feature = "rocksdb")]
    #[arg(long, value_enum, default_value = "inline")]
    variant: VariantKind,

    /// Minimum value size moved to blob files by the blob-threshold variant
    #[cfg(feature = "rocksdb")]
    #[arg(long, default_value_t = kv_sweep::engine::DEFAULT_BLOB_THRESHOLD)]
    blob_threshold: u64,

    /// Block device holding the database, without the /dev/ prefix
    #[arg(long, default_value = config::DEFAULT_DEVICE)]
    device: String,

    /// Mount point cycled between phases
    #[arg(long, default_value = config::DEFAULT_MOUNT_POINT)]
    mount_point: PathBuf,

    /// Database directory, removed between value sizes
    #[arg(long, default_value = config::DEFAULT_DB_DIR)]
    db_dir: PathBuf,

    /// Plain-text report
    #[arg(short, long, default_value = config::DEFAULT_REPORT_PATH)]
    output: PathBuf,

    /// Directory for the JSON results file
    #[arg(long, default_value = "results")]
    results_dir: PathBuf,

    /// Skip the JSON results file
    #[arg(long)]
    no_json: bool,

    /// Do not unmount/mount between phases (page cache stays warm)
    #[arg(long)]
    no_remount: bool,

    /// Stop the sweep when a remount fails
    #[arg(long)]
    strict_barriers: bool,

    /// Stop the sweep when a phase stops before its last operation
    #[arg(long)]
    strict_phases: bool,
}

impl Cli {
    fn sweep_config(&self) -> SweepConfig {
        SweepConfig {
            device: self.device.clone(),
            mount_point: self.mount_point.clone(),
            db_dir: self.db_dir.clone(),
            report_path: self.output.clone(),
            remount: !self.no_remount,
            strict_barriers: self.strict_barriers,
            abort_on_partial_phase: self.strict_phases,
            ..SweepConfig::default()
        }
    }

    #[cfg(feature = "rocksdb")]
    fn storages(&self) -> Vec<ValueStorage> {
        match self.variant {
            VariantKind::Inline => vec![ValueStorage::Inline],
            VariantKind::Blob => vec![ValueStorage::Separated],
            VariantKind::BlobThreshold => vec![ValueStorage::Threshold(self.blob_threshold)],
            VariantKind::All => vec![
                ValueStorage::Separated,
                ValueStorage::Threshold(self.blob_threshold),
                ValueStorage::Inline,
            ],
        }
    }
}

fn barrier(config: &SweepConfig) -> Box<dyn CacheBarrier> {
    if config.remount {
        Box::new(SystemBarrier::from_config(config))
    } else {
        Box::new(NoBarrier)
    }
}

fn record(
    cli: &Cli,
    config: &SweepConfig,
    engine: &str,
    results: &[ConfigurationResult],
) -> Result<()> {
    if cli.no_json {
        return Ok(());
    }
    let mut recorder = ResultRecorder::new(&format!("sweep-{}", engine), engine, config);
    for result in results {
        recorder.record_configuration(result);
    }
    recorder.save(&cli.results_dir)?;
    Ok(())
}

fn run<S: Store>(cli: &Cli, config: SweepConfig, store: S) -> Result<()> {
    let engine = store.name();
    let barrier = barrier(&config);
    let mut sweep = Sweep::new(config, store, barrier)?;
    let results = sweep.run()?;
    record(cli, sweep.config(), engine, &results)
}

/// One sweep per store, each writing its own numbered report.
#[cfg(feature = "rocksdb")]
fn run_variants<S: Store>(cli: &Cli, config: SweepConfig, stores: Vec<S>) -> Result<()> {
    let mut barrier = barrier(&config);
    for run in sweep::run_variants(&config, stores, &mut barrier)? {
        log::info!("{} report written to {}", run.engine, run.report_path.display());
        record(cli, &config, run.engine, &run.results)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.sweep_config();

    let res = match cli.engine {
        #[cfg(feature = "rocksdb")]
        EngineKind::Rocksdb => {
            let mut stores: Vec<RocksStore> = cli
                .storages()
                .into_iter()
                .map(|storage| RocksStore::with_storage(&config.db_dir, storage))
                .collect();
            if cli.variant == VariantKind::All {
                run_variants(&cli, config, stores)
            } else {
                match stores.pop() {
                    Some(store) => run(&cli, config, store),
                    None => Ok(()),
                }
            }
        }
        EngineKind::Memory => run(&cli, config, MemStore::new()),
    };

    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("sweep failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
