//! Timed phases.
//!
//! Each phase opens its own engine handle, runs outside the clock until the
//! first operation, and drops the handle after the clock has stopped.

use std::time::{Duration, Instant};

use crate::config::KEY_WIDTH;
use crate::engine::{Engine, Store};
use crate::error::{Error, Result};
use crate::stats;
use crate::workload::{self, write_key, write_value, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Write,
    Read,
}

impl Operation {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Write => "load",
            Self::Read => "lookup",
        }
    }
}

/// How a timed phase ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PhaseOutcome {
    /// Every requested operation ran.
    Completed { ops: usize, elapsed: Duration },
    /// The loop stopped early; `elapsed` covers only what ran.
    Aborted {
        completed: usize,
        requested: usize,
        elapsed: Duration,
        reason: String,
    },
}

impl PhaseOutcome {
    pub fn elapsed(&self) -> Duration {
        match self {
            Self::Completed { elapsed, .. } | Self::Aborted { elapsed, .. } => *elapsed,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    pub fn completed(&self) -> usize {
        match self {
            Self::Completed { ops, .. } => *ops,
            Self::Aborted { completed, .. } => *completed,
        }
    }

    pub fn requested(&self) -> usize {
        match self {
            Self::Completed { ops, .. } => *ops,
            Self::Aborted { requested, .. } => *requested,
        }
    }

    /// `mib` megabytes over the elapsed time. A phase that ran no
    /// operations moved nothing and reports zero.
    pub fn throughput(&self, mib: f64) -> f64 {
        if self.completed() == 0 {
            return 0.0;
        }
        mib / self.elapsed().as_secs_f64()
    }

    fn finish(
        requested: usize,
        completed: usize,
        elapsed: Duration,
        reason: Option<String>,
    ) -> Self {
        match reason {
            None if completed == requested => Self::Completed {
                ops: requested,
                elapsed,
            },
            reason => Self::Aborted {
                completed,
                requested,
                elapsed,
                reason: reason.unwrap_or_else(|| "keyspace exhausted".to_string()),
            },
        }
    }
}

/// Run `num` puts or gets of `value_size`-wide values in the given order.
///
/// A missing key on read counts as a failure. The first failure stops the
/// loop; it is logged and reported as [`PhaseOutcome::Aborted`]. Only a
/// failure to open the engine is returned as an error.
pub fn point_ops<S: Store>(
    store: &S,
    num: usize,
    value_size: usize,
    ordering: Ordering,
    op: Operation,
) -> Result<PhaseOutcome> {
    let mut engine = store.open()?;
    let ids = workload::workload(num, ordering);

    let mut key = String::with_capacity(KEY_WIDTH);
    let mut value = String::with_capacity(match op {
        Operation::Write => value_size,
        Operation::Read => 0,
    });
    let mut failure = None;

    let start = Instant::now();
    for (index, &id) in ids.iter().enumerate() {
        write_key(&mut key, id);
        let res = match op {
            Operation::Write => {
                write_value(&mut value, id, value_size);
                engine.put(key.as_bytes(), value.as_bytes())
            }
            Operation::Read => match engine.get(key.as_bytes()) {
                Ok(Some(_)) => Ok(()),
                Ok(None) => Err(Error::KeyNotFound(key.as_bytes().to_vec())),
                Err(e) => Err(e),
            },
        };
        if let Err(e) = res {
            failure = Some((index, e));
            break;
        }
    }
    let elapsed = start.elapsed();
    drop(engine);

    let (completed, reason) = match failure {
        None => (num, None),
        Some((index, e)) => {
            log::error!(
                "{} {} failed at index {}: {}",
                ordering.label(),
                op.label(),
                index,
                e
            );
            (index, Some(e.to_string()))
        }
    };
    Ok(PhaseOutcome::finish(num, completed, elapsed, reason))
}

/// Advance a forward iterator from the first key `steps` times.
///
/// The clock covers iterator creation and release. `bias` is added to the
/// measured time.
pub fn scan<S: Store>(store: &S, steps: usize, bias: Duration) -> Result<PhaseOutcome> {
    let engine = store.open()?;

    let start = Instant::now();
    let taken = engine.advance_from_first(steps)?;
    let elapsed = start.elapsed() + bias;
    drop(engine);

    if taken < steps {
        log::warn!("scan ran out of keys after {} of {} steps", taken, steps);
    }
    Ok(PhaseOutcome::finish(steps, taken, elapsed, None))
}

/// Result of reading the engine's size table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeProbe {
    Measured(u64),
    /// The engine did not provide the statistics property.
    Unavailable,
}

impl SizeProbe {
    /// Reported figure; an unavailable property reads as zero.
    pub fn value(&self) -> u64 {
        match self {
            Self::Measured(size) => *size,
            Self::Unavailable => 0,
        }
    }
}

/// Read the engine's level table and, for stores that separate values, add
/// the value log rounded up to whole megabytes.
pub fn probe_size<S: Store>(store: &S) -> Result<SizeProbe> {
    let engine = store.open()?;
    let property = store.stats_property();

    let text = match engine.property(property)? {
        Some(text) => text,
        None => {
            log::warn!("{} property {} unavailable", store.name(), property);
            return Ok(SizeProbe::Unavailable);
        }
    };
    log::debug!("{}:\n{}", property, text);

    let mut size = stats::parse_level_sizes(&text, store.stats_layout())?;

    if let Some(property) = store.value_log_property() {
        match engine.property(property)? {
            Some(text) => size += stats::parse_byte_count(&text)?.div_ceil(1 << 20),
            None => log::warn!("{} property {} unavailable", store.name(), property),
        }
    }
    Ok(SizeProbe::Measured(size))
}
