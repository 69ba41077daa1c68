use std::time::Instant;

use anyhow::Result;
use rand::rngs::StdRng;
use serde::{Serialize, Serializer};
use tracing::{debug, info};

use crate::config::Config;
use crate::embeddings::{seeded_rng, synthetic_batch};
use crate::mem;
use crate::similarity::topk_mean_cosine;

/// Workload shape for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchParams {
    pub runs: usize,
    pub n: usize,
    pub dim: usize,
    pub topk: usize,
}

impl BenchParams {
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.runs >= 1, "--runs must be at least 1");
        anyhow::ensure!(self.n >= 1, "--n must be at least 1");
        anyhow::ensure!(self.dim >= 1, "--dim must be at least 1");
        anyhow::ensure!(self.topk >= 1, "--topk must be at least 1");
        anyhow::ensure!(self.topk <= self.n, "--topk ({}) cannot exceed --n ({})", self.topk, self.n);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunResult {
    pub metric: f64,
    pub runtime_s: f64,
    pub max_mem_mb: f64,
    pub rss_mb: Option<f64>,
}

/// One persisted CSV line; field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub commit: String,
    pub runs: usize,
    pub n: usize,
    pub dim: usize,
    pub topk: usize,
    pub runtime_s: f64,
    pub metric: f64,
    #[serde(serialize_with = "bool_as_int")]
    pub correct: bool,
    pub device: String,
}

fn bool_as_int<S: Serializer>(v: &bool, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u8(u8::from(*v))
}

/// Generate a fresh batch and time only the metric computation.
pub fn run_once(rng: &mut StdRng, n: usize, dim: usize, topk: usize) -> Result<RunResult> {
    let batch = synthetic_batch(rng, n, dim)?;
    let start = Instant::now();
    let metric = topk_mean_cosine(&batch.db, &batch.query, topk)?;
    let runtime_s = start.elapsed().as_secs_f64();
    Ok(RunResult { metric, runtime_s, max_mem_mb: mem::accelerator_peak_mb(), rss_mb: mem::current_process_rss_mb() })
}

pub fn is_valid_metric(metric: f64) -> bool {
    metric.is_finite() && (-1.0..=1.0).contains(&metric)
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> f64 {
    let len = values.len();
    if len == 0 {
        return f64::NAN;
    }
    values.sum::<f64>() / len as f64
}

pub fn round6(v: f64) -> f64 {
    (v * 1e6).round() / 1e6
}

/// Collapse per-run results into the row that gets persisted.
pub fn summarize(cfg: &Config, params: &BenchParams, results: &[RunResult]) -> SummaryRow {
    let runtime_s = mean(results.iter().map(|r| r.runtime_s));
    let metric = mean(results.iter().map(|r| r.metric));
    SummaryRow {
        commit: cfg.commit.clone(),
        runs: params.runs,
        n: params.n,
        dim: params.dim,
        topk: params.topk,
        runtime_s: round6(runtime_s),
        metric: round6(metric),
        correct: is_valid_metric(metric),
        device: cfg.device.clone(),
    }
}

/// Seed once, run `params.runs` measured iterations, and summarize them.
pub fn run_benchmark(cfg: &Config, params: &BenchParams) -> Result<SummaryRow> {
    params.validate()?;
    let mut rng = seeded_rng(cfg.seed);
    let mut results = Vec::with_capacity(params.runs);
    for i in 0..params.runs {
        let r = run_once(&mut rng, params.n, params.dim, params.topk)?;
        debug!(run = i, metric = r.metric, runtime_s = r.runtime_s, rss_mb = ?r.rss_mb, "run finished");
        results.push(r);
    }
    let row = summarize(cfg, params, &results);
    info!(commit = %row.commit, runs = row.runs, metric = row.metric, runtime_s = row.runtime_s, correct = row.correct, "benchmark summary");
    Ok(row)
}
