//! Sweep comparison tool.
//!
//! Compares two JSON result files and prints a table of throughput and size
//! deltas per phase.
//!
//! Usage: `bench-compare <baseline.json> <candidate.json>`

use std::process::ExitCode;

use clap::Parser;
use kv_sweep::compare::compare;
use kv_sweep::schema::BenchmarkReport;

#[derive(Parser)]
#[command(name = "bench-compare")]
#[command(about = "Compare two kv-sweep JSON result files", version)]
struct Cli {
    /// Baseline results file
    baseline: String,

    /// Candidate results file
    candidate: String,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let (baseline, candidate) = match (load_report(&cli.baseline), load_report(&cli.candidate)) {
        (Some(b), Some(c)) => (b, c),
        _ => return ExitCode::FAILURE,
    };

    eprintln!(
        "Baseline: {} ({}, {})",
        cli.baseline, baseline.metadata.engine, baseline.metadata.timestamp
    );
    eprintln!(
        "Candidate: {} ({}, {})",
        cli.candidate, candidate.metadata.engine, candidate.metadata.timestamp
    );
    if baseline.metadata.payload_bytes != candidate.metadata.payload_bytes {
        log::warn!(
            "payloads differ ({} vs {} bytes), throughputs are not comparable",
            baseline.metadata.payload_bytes,
            candidate.metadata.payload_bytes
        );
    }
    eprintln!();

    let comparison = compare(&baseline, &candidate);

    println!(
        "{:<32} | {:>14} | {:>14} | {:>16}",
        "Benchmark", "Base", "New", "Delta"
    );
    println!("{}", "-".repeat(86));
    for result in &comparison.results {
        println!("{}", result.to_line());
    }
    println!("{}", "-".repeat(86));
    println!(
        "Compared: {} | Baseline only: {} | Candidate only: {}",
        comparison.matched, comparison.baseline_only, comparison.candidate_only
    );
    ExitCode::SUCCESS
}

fn load_report(path: &str) -> Option<BenchmarkReport> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| log::error!("reading {}: {}", path, e))
        .ok()?;
    serde_json::from_str(&contents)
        .map_err(|e| log::error!("parsing {}: {}", path, e))
        .ok()
}
