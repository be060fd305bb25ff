//! Backtest command implementation.

use crate::data;
use anyhow::{Result, bail};
use clap::Args;
use salou::data::{CsvFundamentalsProvider, CsvPriceProvider, CsvResultSink};
use salou::eval::{BacktestConfig, BacktestReport, PairReport, QualityBacktest};
use salou::fmp::{FmpClient, FmpPriceProvider};
use salou::{PriceProvider, QualityMetric};
use std::path::PathBuf;

/// Arguments of `salou backtest`.
#[derive(Debug, Args)]
pub(crate) struct BacktestArgs {
    /// Fundamentals table (tab separated)
    #[arg(short, long)]
    fundamentals: PathBuf,

    /// Directory of `<security_id>.csv` price files
    #[arg(short, long, conflicts_with = "fmp")]
    prices: Option<PathBuf>,

    /// Fetch prices from Financial Modeling Prep instead of files
    #[arg(long)]
    fmp: bool,

    /// Suffix appended to security ids for FMP (e.g. .KS)
    #[arg(long, default_value = "", requires = "fmp")]
    fmp_suffix: String,

    /// Output directory for per-pair result tables
    #[arg(short, long, default_value = "results")]
    results: PathBuf,

    /// JSON configuration file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Metrics to test, comma separated
    #[arg(short, long, value_delimiter = ',')]
    metrics: Vec<String>,

    /// Number of quantile groups
    #[arg(short, long)]
    groups: Option<usize>,

    /// Months between report date and holding period
    #[arg(short, long)]
    buffer: Option<u32>,

    /// First report date (YYYY-MM-DD)
    #[arg(long)]
    start: Option<String>,

    /// Last report date (YYYY-MM-DD)
    #[arg(long)]
    end: Option<String>,

    /// Maximum concurrent price lookups
    #[arg(long)]
    concurrency: Option<usize>,

    /// Price lookup timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Abort when a report date has too few securities
    #[arg(long)]
    strict: bool,

    /// Output format (text or json)
    #[arg(long, default_value = "text")]
    format: String,
}

impl BacktestArgs {
    /// Configuration file (or defaults) with flag overrides applied.
    fn config(&self) -> Result<BacktestConfig> {
        let mut config = data::load_config(self.config.as_deref())?;

        if !self.metrics.is_empty() {
            config.metrics = self
                .metrics
                .iter()
                .map(|m| m.parse::<QualityMetric>())
                .collect::<Result<_, _>>()?;
        }
        if let Some(groups) = self.groups {
            config.n_groups = groups;
        }
        if let Some(buffer) = self.buffer {
            config.buffer_months = buffer;
        }
        if let Some(start) = &self.start {
            config.start = Some(data::parse_date(start)?);
        }
        if let Some(end) = &self.end {
            config.end = Some(data::parse_date(end)?);
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(timeout) = self.timeout {
            config.price_timeout_secs = timeout;
        }
        config.strict |= self.strict;

        config.validate()?;
        Ok(config)
    }
}

/// Run the quintile backtest and print the report.
pub(crate) async fn run_backtest(args: BacktestArgs) -> Result<()> {
    let config = args.config()?;
    let json = match args.format.as_str() {
        "json" => true,
        "text" => false,
        other => bail!("Unknown format '{other}', expected text or json"),
    };

    if !json {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                   Quality Quintile Backtest                  ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        let metrics: Vec<&str> = config.metrics.iter().map(|m| m.name()).collect();
        println!("Fundamentals: {}", args.fundamentals.display());
        println!("Metrics:      {}", metrics.join(", "));
        println!("Groups:       {}", config.n_groups);
        println!("Buffer:       {} month(s)", config.buffer_months);
        println!("Results:      {}", args.results.display());
        println!();
    }

    let fundamentals = CsvFundamentalsProvider::new(&args.fundamentals);
    let mut sink = CsvResultSink::new(&args.results)?;

    let report = if args.fmp {
        let client = FmpClient::from_env()?;
        let prices = FmpPriceProvider::new(client).with_suffix(args.fmp_suffix.as_str());
        execute(config, prices, &fundamentals, &mut sink).await?
    } else if let Some(dir) = &args.prices {
        execute(config, CsvPriceProvider::new(dir), &fundamentals, &mut sink).await?
    } else {
        bail!("Either --prices <dir> or --fmp is required");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

async fn execute<P: PriceProvider>(
    config: BacktestConfig,
    prices: P,
    fundamentals: &CsvFundamentalsProvider,
    sink: &mut CsvResultSink,
) -> Result<BacktestReport> {
    let backtest = QualityBacktest::new(config, prices)?;
    Ok(backtest.run(fundamentals, sink).await?)
}

fn fmt_score(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.4}"))
}

fn print_pair(pair: &PairReport) {
    println!(
        "{} {}  (hold {} to {})",
        pair.report_date(),
        pair.metric,
        pair.window.buy_date,
        pair.window.sell_date
    );

    if let Some(reason) = &pair.skip_reason {
        println!("  skipped: {reason}\n");
        return;
    }

    println!("  {:>5} {:>12} {:>8}", "Group", "Mean score", "Members");
    for group in &pair.groups {
        println!(
            "  {:>5} {:>12} {:>8}",
            group.group,
            fmt_score(group.mean_score),
            group.contributors
        );
    }
    println!("  Spread (top - bottom): {}", fmt_score(pair.spread()));
    if !pair.exclusions.is_empty() {
        println!("  Excluded securities:   {}", pair.exclusions.len());
    }
    println!();
}

fn print_report(report: &BacktestReport) {
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("GROUP RESULTS");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    for pair in &report.pairs {
        print_pair(pair);
    }

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("OVERVIEW");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    for overview in report.metric_overview() {
        let means: Vec<String> = overview
            .group_means
            .iter()
            .map(|m| fmt_score(*m))
            .collect();
        println!("{} ({} dates)", overview.metric, overview.pairs);
        println!("  Group means: {}", means.join("  "));
        println!("  Mean spread: {}", fmt_score(overview.mean_spread));
        println!();
    }

    println!("Audit:");
    println!("  Pairs completed:       {:>8}", report.completed_pairs());
    println!("  Pairs skipped:         {:>8}", report.skipped_pairs());
    println!("  Securities excluded:   {:>8}", report.excluded_securities());
    println!("  Records discarded:     {:>8}", report.discarded_records);
    println!();
}
