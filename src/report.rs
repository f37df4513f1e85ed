//! Plain-text sweep report.
//!
//! One header line followed by one space-separated row per configuration:
//!
//! ```text
//! # x yseql sseqq yranl rseqq rranq size
//! 1 180.512 95.004 40.117 88.310 3.902 1093
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;

pub const HEADER: &str = "# x yseql sseqq yranl rseqq rranq size";

/// Figures for one value-size configuration. Throughputs are MiB/s.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    /// 1-based position in the sweep.
    pub index: usize,
    pub value_size: usize,
    pub items: usize,
    /// Sequential load.
    pub yseql: f64,
    /// Scan of the sequentially loaded store.
    pub sseqq: f64,
    /// Random load.
    pub yranl: f64,
    /// Scan of the randomly loaded store.
    pub rseqq: f64,
    /// Random point lookups.
    pub rranq: f64,
    /// Engine-reported size after the random load.
    pub size: u64,
}

impl ResultRow {
    pub fn to_line(&self) -> String {
        format!(
            "{} {:.3} {:.3} {:.3} {:.3} {:.3} {}",
            self.index, self.yseql, self.sseqq, self.yranl, self.rseqq, self.rranq, self.size
        )
    }
}

pub fn render_report(rows: &[ResultRow]) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for row in rows {
        out.push_str(&row.to_line());
        out.push('\n');
    }
    out
}

pub fn write_report(path: impl AsRef<Path>, rows: &[ResultRow]) -> Result<()> {
    let mut out = BufWriter::new(File::create(path.as_ref())?);
    out.write_all(render_report(rows).as_bytes())?;
    out.flush()?;
    Ok(())
}
