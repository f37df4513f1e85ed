//! Cold-cache value-size sweep for embedded key-value engines.
//!
//! For every configured value size the sweep loads 1 GiB of fixed-width
//! key/value pairs sequentially and randomly, scans and looks them up behind
//! a page-cache barrier, probes the engine's reported on-disk size and emits
//! one report row.

pub mod barrier;
pub mod compare;
pub mod config;
pub mod engine;
pub mod error;
pub mod phase;
pub mod recorder;
pub mod report;
pub mod schema;
pub mod stats;
pub mod sweep;
pub mod workload;

pub use config::SweepConfig;
pub use error::{Error, Result};
pub use sweep::Sweep;
