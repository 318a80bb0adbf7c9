//! GEX Levels CLI
//!
//! Fetches (or loads) a nearest-expiry option chain, computes Zero Gamma,
//! Put Wall and Call Wall, and prints them with the gamma regime and a
//! trade signal.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use gex_levels::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "gex-levels", author, version, about)]
struct Args {
    /// Underlying ticker to fetch from Yahoo Finance
    #[arg(short, long, default_value = "QQQ")]
    ticker: String,

    /// Load a saved chain snapshot (JSON) instead of fetching
    #[arg(short, long)]
    snapshot: Option<PathBuf>,

    /// Level detection config (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the relevance band around spot, as a fraction (0.08 = ±8%)
    #[arg(long)]
    band: Option<f64>,

    /// Override the open interest floor (strictly greater than)
    #[arg(long)]
    min_oi: Option<u64>,

    /// Append a row to this CSV history file
    #[arg(long)]
    history: Option<PathBuf>,

    /// Print the full report as JSON
    #[arg(long, default_value = "false")]
    json: bool,

    /// Snapshot cache directory
    #[arg(long, default_value = "./data/cache")]
    cache_dir: PathBuf,

    /// Always fetch a fresh chain
    #[arg(long, default_value = "false")]
    no_cache: bool,
}

fn load_config(args: &Args) -> GexResult<LevelConfig> {
    let mut config = match &args.config {
        Some(path) => LevelConfig::from_json_file(path)?,
        None => LevelConfig::default(),
    };
    if let Some(band) = args.band {
        config.filter.price_band_pct = band;
    }
    if let Some(min_oi) = args.min_oi {
        config.filter.min_open_interest = min_oi;
    }
    config.validate()?;
    Ok(config)
}

fn load_snapshot(args: &Args) -> GexResult<ChainSnapshot> {
    if let Some(path) = &args.snapshot {
        return ChainSnapshot::from_json_file(path);
    }

    let fetcher = CachedFetcher::new(CacheConfig {
        cache_dir: args.cache_dir.clone(),
        enabled: !args.no_cache,
        ..CacheConfig::default()
    })?;
    fetcher.get_snapshot(&args.ticker)
}

fn fmt_level(level: Option<f64>) -> String {
    level.map_or_else(|| "undefined".to_string(), |v| format!("{:.2}", v))
}

fn print_report(report: &GexReport, config: &LevelConfig) {
    println!("GEX Levels: {} (expiry {})", report.underlying, report.expiry);
    println!("==============================\n");

    println!("  Spot:        {:.2}", report.spot);
    println!("  Net GEX:     {:+.2}M per 1% move", report.net_gex_millions());
    println!(
        "  Contracts:   {} of {} used",
        report.contracts_used, report.contracts_total
    );
    println!();

    for kind in [LevelKind::CallWall, LevelKind::ZeroGamma, LevelKind::PutWall] {
        println!("  {:<11}  {}", kind.label(), fmt_level(report.levels.get(kind)));
    }
    if let Some(detail) = &report.zero_gamma_detail {
        let how = if detail.is_interpolated() {
            "interpolated"
        } else {
            "nearest to zero"
        };
        println!("  (zero gamma {}, window ±{:.0}%)", how, detail.window_pct * 100.0);
    }
    println!();

    match report.regime() {
        Some(regime) => println!("  Regime:      {}", regime.label()),
        None => println!("  Regime:      unknown"),
    }
    if let Some(dist) = report.put_wall_distance_pct() {
        println!("  Put Wall:    {:+.2}% from spot", dist);
    }
    if report.below_put_wall() == Some(true) {
        println!("  Warning:     spot has broken below the Put Wall");
    }
    if let Some(test) = report.testing_zero_gamma(config.signal.zero_gamma_test_pct) {
        println!("  Scanner:     {}", test.label());
    }

    match TradeSignal::evaluate(report, &config.signal) {
        Some(signal) => {
            println!("\n  Signal:      {}", signal.action.label());
            println!(
                "  Target:      {:.2} ({:+.2}%)",
                signal.target,
                signal.potential_pct()
            );
            println!("  Stop:        {:.2} ({:+.2}%)", signal.stop, signal.risk_pct());
        }
        None => println!("\n  Signal:      none"),
    }

    let near = report.profile_near_spot(0.02);
    if !near.is_empty() {
        println!("\n  {:>10}  {:>14}  {:>14}  {:>14}", "Strike", "Call GEX", "Put GEX", "Net GEX");
        for row in near {
            println!(
                "  {:>10.2}  {:>14.0}  {:>14.0}  {:>14.0}",
                row.strike, row.call_gex, row.put_gex, row.net_gex
            );
        }
    }
}

fn main() -> GexResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let snapshot = load_snapshot(&args)?;

    let report = LevelDetector::with_config(config.clone()).detect(&snapshot)?;

    if let Some(path) = &args.history {
        append_history(path, &report)?;
    }

    if args.json {
        let json = report
            .to_json()
            .map_err(|e| GexError::Serialization(e.to_string()))?;
        println!("{}", json);
    } else {
        print_report(&report, &config);
    }

    Ok(())
}
