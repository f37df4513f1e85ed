//! Matching and diffing of two recorded runs.

use std::collections::HashSet;

use crate::schema::{BenchmarkMetrics, BenchmarkReport};

/// Percentage change from `base` to `cand`; zero when there is no baseline.
pub fn delta_pct(base: f64, cand: f64) -> f64 {
    if base > 0.0 {
        ((cand - base) / base) * 100.0
    } else {
        0.0
    }
}

/// Thousands-separated decimal rendering.
pub fn format_num(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Delta {
    Throughput { base: f64, cand: f64 },
    Size { base: u64, cand: u64 },
}

impl Delta {
    /// Throughput when both sides have it, otherwise size.
    pub fn between(base: &BenchmarkMetrics, cand: &BenchmarkMetrics) -> Option<Self> {
        match (base.mib_per_sec, cand.mib_per_sec, base.size, cand.size) {
            (Some(base), Some(cand), _, _) => Some(Self::Throughput { base, cand }),
            (_, _, Some(base), Some(cand)) => Some(Self::Size { base, cand }),
            _ => None,
        }
    }

    pub fn pct(&self) -> f64 {
        match *self {
            Self::Throughput { base, cand } => delta_pct(base, cand),
            Self::Size { base, cand } => delta_pct(base as f64, cand as f64),
        }
    }

    /// Within one percent either way counts as unchanged.
    pub fn hint(&self) -> &'static str {
        let pct = self.pct();
        match self {
            Self::Throughput { .. } if pct > 1.0 => "faster",
            Self::Throughput { .. } if pct < -1.0 => "slower",
            Self::Size { .. } if pct < -1.0 => "smaller",
            Self::Size { .. } if pct > 1.0 => "larger",
            _ => "~same",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparedResult {
    pub benchmark: String,
    pub delta: Delta,
    /// Either side stopped before its last operation.
    pub partial: bool,
}

impl ComparedResult {
    pub fn to_line(&self) -> String {
        let flag = if self.partial { " partial" } else { "" };
        match self.delta {
            Delta::Throughput { base, cand } => format!(
                "{:<32} | {:>8.2} MiB/s | {:>8.2} MiB/s | {:>+.1}% ({}){}",
                self.benchmark,
                base,
                cand,
                self.delta.pct(),
                self.delta.hint(),
                flag,
            ),
            Delta::Size { base, cand } => format!(
                "{:<32} | {:>11} MB | {:>11} MB | {:>+.1}% ({}){}",
                self.benchmark,
                format_num(base),
                format_num(cand),
                self.delta.pct(),
                self.delta.hint(),
                flag,
            ),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Comparison {
    /// Comparable results, in candidate order.
    pub results: Vec<ComparedResult>,
    /// Names present in both reports, comparable or not.
    pub matched: usize,
    pub baseline_only: usize,
    pub candidate_only: usize,
}

pub fn compare(baseline: &BenchmarkReport, candidate: &BenchmarkReport) -> Comparison {
    let base_names: HashSet<&str> = baseline
        .results
        .iter()
        .map(|r| r.benchmark.as_str())
        .collect();
    let cand_names: HashSet<&str> = candidate
        .results
        .iter()
        .map(|r| r.benchmark.as_str())
        .collect();

    let mut comparison = Comparison::default();

    for cand in &candidate.results {
        let Some(base) = baseline
            .results
            .iter()
            .find(|b| b.benchmark == cand.benchmark)
        else {
            comparison.candidate_only += 1;
            continue;
        };
        comparison.matched += 1;

        if let Some(delta) = Delta::between(&base.metrics, &cand.metrics) {
            comparison.results.push(ComparedResult {
                benchmark: cand.benchmark.clone(),
                delta,
                partial: base.metrics.complete == Some(false)
                    || cand.metrics.complete == Some(false),
            });
        }
    }

    comparison.baseline_only = base_names.difference(&cand_names).count();
    comparison
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::schema::{BenchmarkResult, HardwareInfo, RunMetadata};

    fn report(results: Vec<BenchmarkResult>) -> BenchmarkReport {
        BenchmarkReport {
            schema_version: 1,
            metadata: RunMetadata {
                timestamp: "2026-01-01T00:00:00Z".into(),
                git_commit: None,
                git_branch: None,
                git_dirty: None,
                engine: "memory".into(),
                harness_version: "0.0.0".into(),
                payload_bytes: 1 << 20,
                remount: false,
                hardware: HardwareInfo {
                    cpu: "unknown".into(),
                    cores: 1,
                    ram_gb: 0,
                    os: "linux".into(),
                    arch: "x86_64".into(),
                },
            },
            results,
        }
    }

    fn result(name: &str, metrics: BenchmarkMetrics) -> BenchmarkResult {
        BenchmarkResult {
            benchmark: name.into(),
            category: "load".into(),
            parameters: HashMap::new(),
            metrics,
        }
    }

    fn mib(rate: f64) -> BenchmarkMetrics {
        BenchmarkMetrics {
            mib_per_sec: Some(rate),
            complete: Some(true),
            ..Default::default()
        }
    }

    fn size(mb: u64) -> BenchmarkMetrics {
        BenchmarkMetrics {
            size: Some(mb),
            ..Default::default()
        }
    }

    #[test]
    fn delta_without_baseline_is_zero() {
        assert_eq!(delta_pct(0.0, 50.0), 0.0);
        assert_eq!(delta_pct(200.0, 150.0), -25.0);
    }

    #[test]
    fn format_num_groups_thousands() {
        assert_eq!(format_num(0), "0");
        assert_eq!(format_num(999), "999");
        assert_eq!(format_num(1_000), "1,000");
        assert_eq!(format_num(12_345_678), "12,345,678");
    }

    #[test]
    fn hints_follow_direction_of_change() {
        let faster = Delta::Throughput { base: 100.0, cand: 110.0 };
        let noise = Delta::Throughput { base: 100.0, cand: 100.5 };
        let smaller = Delta::Size { base: 1000, cand: 900 };
        assert_eq!(faster.hint(), "faster");
        assert_eq!(noise.hint(), "~same");
        assert_eq!(smaller.hint(), "smaller");
        assert_eq!(Delta::Size { base: 0, cand: 5 }.hint(), "~same");
    }

    #[test]
    fn matches_by_name_and_counts_leftovers() {
        let baseline = report(vec![
            result("sweep/64B/seq-load", mib(100.0)),
            result("sweep/64B/size", size(1200)),
            result("sweep/64B/ran-scan", mib(40.0)),
        ]);
        let candidate = report(vec![
            result("sweep/64B/seq-load", mib(80.0)),
            result("sweep/64B/size", size(1500)),
            result("sweep/256B/seq-load", mib(90.0)),
        ]);

        let cmp = compare(&baseline, &candidate);
        assert_eq!(cmp.matched, 2);
        assert_eq!(cmp.baseline_only, 1);
        assert_eq!(cmp.candidate_only, 1);

        assert_eq!(cmp.results[0].delta.pct(), -20.0);
        assert_eq!(cmp.results[0].delta.hint(), "slower");
        assert_eq!(
            cmp.results[1].delta,
            Delta::Size {
                base: 1200,
                cand: 1500
            }
        );
        assert!(cmp.results[1].to_line().contains("1,500 MB"));
    }

    #[test]
    fn partial_side_is_flagged() {
        let mut aborted = mib(50.0);
        aborted.complete = Some(false);
        let baseline = report(vec![result("sweep/1024B/ran-lookup", mib(50.0))]);
        let candidate = report(vec![result("sweep/1024B/ran-lookup", aborted)]);

        let cmp = compare(&baseline, &candidate);
        assert!(cmp.results[0].partial);
        assert!(cmp.results[0].to_line().ends_with("(~same) partial"));
    }

    #[test]
    fn results_without_common_metric_are_matched_but_not_listed() {
        let baseline = report(vec![result("sweep/64B/seq-load", mib(10.0))]);
        let candidate = report(vec![result("sweep/64B/seq-load", size(3))]);

        let cmp = compare(&baseline, &candidate);
        assert_eq!(cmp.matched, 1);
        assert!(cmp.results.is_empty());
    }
}
