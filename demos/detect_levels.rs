//! Example: Detect levels from a synthetic option chain
//!
//! Run with: cargo run --example detect_levels

use chrono::{Duration, Utc};
use gex_levels::prelude::*;

fn main() {
    // Sample chain: strikes around ATM, puts heavier below spot, calls above
    let spot = 500.0;
    let expiry = Utc::now().date_naive() + Duration::days(3);
    let mut snapshot = ChainSnapshot::new("DEMO", spot, expiry);

    for i in 0..41 {
        let strike = 480.0 + i as f64;
        let distance = (strike - spot).abs();

        // Put skew: downside vol higher
        let put_vol = 0.18 + (spot - strike).max(0.0) * 0.004;
        let call_vol = 0.16 + (strike - spot).max(0.0) * 0.002;

        let put_oi = if strike < spot { 3_000 - (distance as u64) * 60 } else { 400 };
        let call_oi = if strike > spot { 2_500 - (distance as u64) * 50 } else { 300 };

        snapshot.add_contract(OptionContract::put(strike, put_oi, put_vol));
        snapshot.add_contract(OptionContract::call(strike, call_oi, call_vol));
    }

    // A concentrated strike on each side
    snapshot.add_contract(OptionContract::put(490.0, 12_000, 0.24));
    snapshot.add_contract(OptionContract::call(510.0, 9_000, 0.17));

    // Far OTM interest the relevance filter should ignore
    snapshot.add_contract(OptionContract::put(400.0, 50_000, 0.55));

    println!("Chain: {} contracts, expiry {}", snapshot.contracts.len(), snapshot.expiry);
    println!("Spot: {:.2}\n", spot);

    for (name, config) in [
        ("default", LevelConfig::default()),
        ("tight", LevelConfig::tight()),
        ("wide", LevelConfig::wide()),
    ] {
        let report = match detect_levels_with_config(&snapshot, config.clone()) {
            Ok(report) => report,
            Err(e) => {
                println!("{}: detection failed: {}", name, e);
                continue;
            }
        };

        println!("=== {} config ===", name);
        println!("  Contracts used: {}/{}", report.contracts_used, report.contracts_total);
        println!("  Net GEX: {:+.2}M", report.net_gex_millions());
        for (kind, level) in report.levels.defined() {
            println!("  {:<10} {:.2}", kind.short_label(), level);
        }
        if let Some(regime) = report.regime() {
            println!("  Regime: {}", regime.label());
        }
        if let Some(signal) = TradeSignal::evaluate(&report, &config.signal) {
            println!(
                "  Signal: {} -> target {:.2}, stop {:.2}",
                signal.action.label(),
                signal.target,
                signal.stop
            );
        }

        let heaviest = report
            .strike_weights()
            .into_iter()
            .max_by(|a, b| (a.call_pct + a.put_pct).total_cmp(&(b.call_pct + b.put_pct)));
        if let Some(w) = heaviest {
            println!(
                "  Heaviest strike: {:.0} ({:.1}% calls, {:.1}% puts)",
                w.strike, w.call_pct, w.put_pct
            );
        }
        println!();
    }
}
