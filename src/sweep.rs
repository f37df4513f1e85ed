//! Sweep orchestration.

use std::path::PathBuf;

use crate::barrier::CacheBarrier;
use crate::config::{item_count, numbered_report_path, SweepConfig};
use crate::engine::Store;
use crate::error::{Error, Result};
use crate::phase::{self, Operation, PhaseOutcome, SizeProbe};
use crate::report::{self, ResultRow};
use crate::workload::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    SequentialLoad,
    Barrier,
    SequentialScan,
    Reset,
    RandomLoad,
    RandomScan,
    RandomLookup,
    SizeProbe,
}

impl Step {
    pub fn label(&self) -> &'static str {
        match self {
            Self::SequentialLoad => "seq-load",
            Self::Barrier => "barrier",
            Self::SequentialScan => "seq-scan",
            Self::Reset => "reset",
            Self::RandomLoad => "ran-load",
            Self::RandomScan => "ran-scan",
            Self::RandomLookup => "ran-lookup",
            Self::SizeProbe => "size",
        }
    }

    /// Share of the configuration payload a timed step moves. Scans and
    /// lookups cover a quarter of the items.
    pub fn payload_share(&self) -> f64 {
        match self {
            Self::SequentialLoad | Self::RandomLoad => 1.0,
            _ => 0.25,
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            Self::SequentialLoad | Self::RandomLoad => "load",
            Self::SequentialScan | Self::RandomScan => "scan",
            Self::RandomLookup => "lookup",
            Self::SizeProbe => "size",
            Self::Barrier | Self::Reset => "maintenance",
        }
    }
}

/// Steps run for every configuration, in order.
pub const SCHEDULE: [Step; 11] = [
    Step::SequentialLoad,
    Step::Barrier,
    Step::SequentialScan,
    Step::Reset,
    Step::RandomLoad,
    Step::Barrier,
    Step::RandomScan,
    Step::Barrier,
    Step::RandomLookup,
    Step::SizeProbe,
    Step::Reset,
];

/// Everything measured for one value size.
#[derive(Debug, Clone)]
pub struct ConfigurationResult {
    pub row: ResultRow,
    /// Timed phases in schedule order.
    pub phases: Vec<(Step, PhaseOutcome)>,
    pub size: SizeProbe,
}

pub struct Sweep<S: Store, B: CacheBarrier> {
    config: SweepConfig,
    store: S,
    barrier: B,
}

impl<S: Store, B: CacheBarrier> Sweep<S, B> {
    pub fn new(config: SweepConfig, store: S, barrier: B) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            store,
            barrier,
        })
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn barrier(&self) -> &B {
        &self.barrier
    }

    /// Run every configuration and write the text report.
    pub fn run(&mut self) -> Result<Vec<ConfigurationResult>> {
        let sizes = self.config.value_sizes.clone();
        let mut results = Vec::with_capacity(sizes.len());

        log::info!(
            "sweeping {} value sizes on {} at {}",
            sizes.len(),
            self.store.name(),
            self.config.db_dir.display()
        );

        for (i, &value_size) in sizes.iter().enumerate() {
            log::info!("[{}/{}] value size {}B", i + 1, sizes.len(), value_size);
            let result = self.run_configuration(i + 1, value_size)?;
            log::info!("{}", result.row.to_line());
            results.push(result);
        }

        let rows: Vec<ResultRow> = results.iter().map(|r| r.row.clone()).collect();
        report::write_report(&self.config.report_path, &rows)?;
        log::info!("report written to {}", self.config.report_path.display());

        Ok(results)
    }

    /// Run [`SCHEDULE`] once for `value_size`.
    pub fn run_configuration(
        &mut self,
        index: usize,
        value_size: usize,
    ) -> Result<ConfigurationResult> {
        let items = item_count(self.config.payload_bytes, value_size);
        let quarter = items / 4;
        let payload_mib = self.config.payload_mib();
        let bias = self.config.scan_bias;

        let mut row = ResultRow {
            index,
            value_size,
            items,
            yseql: 0.0,
            sseqq: 0.0,
            yranl: 0.0,
            rseqq: 0.0,
            rranq: 0.0,
            size: 0,
        };
        let mut phases = Vec::with_capacity(5);
        let mut size = SizeProbe::Unavailable;

        for step in SCHEDULE {
            log::debug!("{}B: {}", value_size, step.label());
            let outcome = match step {
                Step::SequentialLoad => {
                    phase::point_ops(
                        &self.store,
                        items,
                        value_size,
                        Ordering::Sequential,
                        Operation::Write,
                    )?
                }
                Step::RandomLoad => {
                    phase::point_ops(
                        &self.store,
                        items,
                        value_size,
                        Ordering::Random,
                        Operation::Write,
                    )?
                }
                Step::SequentialScan | Step::RandomScan => phase::scan(&self.store, quarter, bias)?,
                Step::RandomLookup => {
                    phase::point_ops(
                        &self.store,
                        quarter,
                        value_size,
                        Ordering::Random,
                        Operation::Read,
                    )?
                }
                Step::Barrier => {
                    self.flush_cache()?;
                    continue;
                }
                Step::Reset => {
                    self.store.destroy()?;
                    continue;
                }
                Step::SizeProbe => {
                    size = phase::probe_size(&self.store)?;
                    row.size = size.value();
                    continue;
                }
            };

            let figure = match step {
                Step::SequentialLoad => &mut row.yseql,
                Step::SequentialScan => &mut row.sseqq,
                Step::RandomLoad => &mut row.yranl,
                Step::RandomScan => &mut row.rseqq,
                _ => &mut row.rranq,
            };
            *figure = outcome.throughput(payload_mib * step.payload_share());
            log::debug!(
                "{}B: {} took {:.3}s ({:.3} MiB/s)",
                value_size,
                step.label(),
                outcome.elapsed().as_secs_f64(),
                *figure
            );

            self.check_outcome(step, &outcome)?;
            phases.push((step, outcome));
        }

        Ok(ConfigurationResult { row, phases, size })
    }

    fn check_outcome(&self, step: Step, outcome: &PhaseOutcome) -> Result<()> {
        if outcome.is_complete() {
            return Ok(());
        }
        log::warn!(
            "{} stopped after {} of {} operations, its figure is not comparable",
            step.label(),
            outcome.completed(),
            outcome.requested()
        );
        if self.config.abort_on_partial_phase {
            return Err(Error::PartialPhase {
                phase: step.label(),
                completed: outcome.completed(),
                requested: outcome.requested(),
            });
        }
        Ok(())
    }

    fn flush_cache(&mut self) -> Result<()> {
        match self.barrier.flush() {
            Ok(()) => Ok(()),
            Err(e) if !self.config.strict_barriers => {
                log::warn!("cache barrier failed, continuing warm: {}", e);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

/// One complete sweep over a single engine variant.
#[derive(Debug, Clone)]
pub struct VariantRun {
    pub engine: &'static str,
    pub report_path: PathBuf,
    pub results: Vec<ConfigurationResult>,
}

/// Sweep every store in turn with the same configuration. The n-th store,
/// counted from 1, writes its report to `config.report_path` renumbered to
/// `n` (`load1.txt`, `load2.txt`, ...), so the reports can be plotted
/// against each other.
pub fn run_variants<S, B>(
    config: &SweepConfig,
    stores: impl IntoIterator<Item = S>,
    barrier: &mut B,
) -> Result<Vec<VariantRun>>
where
    S: Store,
    B: CacheBarrier + ?Sized,
{
    let mut runs = Vec::new();

    for (i, store) in stores.into_iter().enumerate() {
        let mut variant = config.clone();
        variant.report_path = numbered_report_path(&config.report_path, i + 1);
        let engine = store.name();
        log::info!(
            "variant {}: {} -> {}",
            i + 1,
            engine,
            variant.report_path.display()
        );

        let report_path = variant.report_path.clone();
        let results = Sweep::new(variant, store, &mut *barrier)?.run()?;
        runs.push(VariantRun {
            engine,
            report_path,
            results,
        });
    }

    Ok(runs)
}
