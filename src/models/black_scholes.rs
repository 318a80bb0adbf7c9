//! Black-Scholes Greeks
//!
//! Closed-form gamma and vanna for European options. Dividends and
//! early exercise are ignored; the chain is treated as a single expiry.

use std::f64::consts::PI;

use crate::core::{GreekResult, MIN_IMPLIED_VOL, VANNA_SIGN};

/// Standard normal PDF
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Black-Scholes d1 parameter
pub fn d1(spot: f64, strike: f64, rate: f64, vol: f64, time: f64) -> f64 {
    ((spot / strike).ln() + (rate + 0.5 * vol * vol) * time) / (vol * time.sqrt())
}

/// Black-Scholes d2 parameter
pub fn d2(spot: f64, strike: f64, rate: f64, vol: f64, time: f64) -> f64 {
    d1(spot, strike, rate, vol, time) - vol * time.sqrt()
}

/// Gamma and vanna for one contract.
///
/// Degenerate inputs (expired, zero vol, non-positive spot, anything
/// non-finite) return zero Greeks so one bad row cannot poison a chain.
pub fn compute_greeks(spot: f64, strike: f64, time: f64, rate: f64, vol: f64) -> GreekResult {
    let finite = [spot, strike, time, rate, vol].iter().all(|v| v.is_finite());
    if !finite || time <= 0.0 || vol <= MIN_IMPLIED_VOL || spot <= 0.0 {
        return GreekResult::zero();
    }

    let sqrt_t = time.sqrt();
    let d1 = d1(spot, strike, rate, vol, time);
    let d2 = d1 - vol * sqrt_t;
    let pdf_d1 = norm_pdf(d1);

    // Same for calls and puts
    let gamma = pdf_d1 / (spot * vol * sqrt_t);
    let vanna = VANNA_SIGN * pdf_d1 * d2 / vol;

    if !gamma.is_finite() || !vanna.is_finite() {
        return GreekResult::zero();
    }

    GreekResult::new(gamma, vanna)
}
