//! CLI entry point for the Etsy listing ranker.
//!
//! Provides subcommands for analyzing keyword CSV exports and exporting the
//! resulting A/B/C tiers as CSV.

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use etsy_listing_ranker::analyzers::types::{AnalysisReport, Tier};
use etsy_listing_ranker::{AnalysisConfig, Pipeline, ingest::load_sources, output};
use std::ffi::OsStr;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "etsy_listing_ranker")]
#[command(about = "Score, rank and tier Etsy listing exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct RunOptions {
    /// CSV exports, one per keyword, as `KEYWORD=PATH` or a bare path
    /// (keyword = file stem)
    #[arg(value_name = "SOURCE", required = true)]
    sources: Vec<String>,

    /// JSON analysis config; defaults apply to missing keys
    #[arg(short, long)]
    config: Option<String>,

    /// Maximum number of tier A listings
    #[arg(long)]
    a_capacity: Option<usize>,

    /// Maximum tier A listings per keyword
    #[arg(long)]
    per_keyword_cap: Option<usize>,

    /// Fill A slots left empty by the per-keyword cap
    #[arg(long, default_value_t = false)]
    spillover: bool,

    /// Length of the trending and evergreen lists
    #[arg(long)]
    top_n: Option<usize>,
}

#[derive(Clone, Copy, ValueEnum)]
enum TierFilter {
    All,
    A,
    B,
    C,
}

impl TierFilter {
    fn tier(self) -> Option<Tier> {
        match self {
            TierFilter::All => None,
            TierFilter::A => Some(Tier::A),
            TierFilter::B => Some(Tier::B),
            TierFilter::C => Some(Tier::C),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline and log the tier, age-bucket and market digest
    Analyze {
        #[command(flatten)]
        run: RunOptions,

        /// Optional: write the full report as JSON to this path
        #[arg(long)]
        json: Option<String>,
    },
    /// Run the pipeline and export the tiered listings as CSV
    Export {
        #[command(flatten)]
        run: RunOptions,

        /// CSV file to write
        #[arg(short, long, default_value = "listings.csv")]
        output: String,

        /// Only export one tier
        #[arg(long, value_enum, default_value_t = TierFilter::All)]
        tier: TierFilter,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/etsy_listing_ranker.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("etsy_listing_ranker.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze { run, json } => {
            let report = run_pipeline(&run)?;
            output::print_pretty(&report);
            output::log_digest(&report);

            if let Some(path) = json {
                output::write_json(&path, &report)?;
            }
        }
        Commands::Export {
            run,
            output: out_path,
            tier,
        } => {
            let report = run_pipeline(&run)?;
            output::export_csv(&out_path, &report.selection, tier.tier())?;
        }
    }

    Ok(())
}

/// Builds the config from file and flags, validates it, then loads every
/// source and runs the pipeline.
#[tracing::instrument(skip_all, fields(sources = opts.sources.len()))]
fn run_pipeline(opts: &RunOptions) -> Result<AnalysisReport> {
    let mut config = match &opts.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(n) = opts.a_capacity {
        config.tiers.a_capacity = n;
    }
    if let Some(n) = opts.per_keyword_cap {
        config.tiers.per_keyword_cap = n;
    }
    if opts.spillover {
        config.tiers.spillover = true;
    }
    if let Some(n) = opts.top_n {
        config.top_n = n;
    }

    let pipeline = Pipeline::new(config)?;
    info!(
        a_capacity = pipeline.config().tiers.a_capacity,
        per_keyword_cap = pipeline.config().tiers.per_keyword_cap,
        spillover = pipeline.config().tiers.spillover,
        "Configuration accepted"
    );

    let sources = load_sources(&opts.sources)?;
    Ok(pipeline.run(&sources))
}
