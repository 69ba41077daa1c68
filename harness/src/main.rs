use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use topk_bench::config::Config;
use topk_bench::report;
use topk_bench::runner::{self, BenchParams, SummaryRow};

#[derive(Parser, Debug)]
#[command(name = "topk-bench", version, about = "Cosine top-k microbenchmark over synthetic embeddings")]
struct Cli {
	/// Number of measured runs to average
	#[arg(long, default_value_t = 3)]
	runs: usize,

	/// Rows in the synthetic database
	#[arg(long, default_value_t = 20000)]
	n: usize,

	/// Embedding width
	#[arg(long, default_value_t = 256)]
	dim: usize,

	/// How many of the best similarities to average
	#[arg(long, default_value_t = 10)]
	topk: usize,

	/// CSV log to append the summary row to
	#[arg(long, default_value = "bench.csv")]
	csv: PathBuf,
}

impl Cli {
	fn params(&self) -> BenchParams {
		BenchParams { runs: self.runs, n: self.n, dim: self.dim, topk: self.topk }
	}
}

fn main() -> Result<()> {
	init_tracing();
	let cfg = Config::load();
	let cli = Cli::parse();
	let row = run(&cli, &cfg)?;
	println!("{}", report::to_pretty_json(&row)?);
	Ok(())
}

fn run(cli: &Cli, cfg: &Config) -> Result<SummaryRow> {
	let params = cli.params();
	info!(runs = params.runs, n = params.n, dim = params.dim, topk = params.topk, seed = cfg.seed, "starting benchmark");
	let row = runner::run_benchmark(cfg, &params)?;
	report::append_csv(&cli.csv, &row)?;
	info!(csv = %cli.csv.display(), "row appended");
	Ok(row)
}

fn init_tracing() {
	let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
	// stderr only: stdout carries nothing but the JSON row
	let fmt_layer = fmt::layer().with_target(false).with_ansi(false).with_writer(std::io::stderr);
	tracing_subscriber::registry().with(env_filter).with(fmt_layer).init();
}
