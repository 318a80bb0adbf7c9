//! Stage 3: Level Detection
//!
//! Walls come from one side of the curve only. Zero Gamma is searched in a
//! window around spot that widens only when it holds too few strikes.

use super::{LevelReport, StrikeProfile, ZeroGamma, ZeroGammaConfig, ZeroGammaMethod};

/// Strike with the most positive call GEX, among strikes that carry calls.
///
/// Ties go to the lower strike.
pub fn find_call_wall(profile: &[StrikeProfile]) -> Option<f64> {
    profile
        .iter()
        .filter(|p| p.has_calls())
        .fold(None, |best: Option<&StrikeProfile>, p| match best {
            Some(b) if b.call_gex >= p.call_gex => Some(b),
            _ => Some(p),
        })
        .map(|p| p.strike)
}

/// Strike with the largest |put GEX|, among strikes that carry puts.
///
/// Ties go to the lower strike.
pub fn find_put_wall(profile: &[StrikeProfile]) -> Option<f64> {
    profile
        .iter()
        .filter(|p| p.has_puts())
        .fold(None, |best: Option<&StrikeProfile>, p| match best {
            Some(b) if b.put_gex.abs() >= p.put_gex.abs() => Some(b),
            _ => Some(p),
        })
        .map(|p| p.strike)
}

/// Net GEX changes sign between two points (or touches zero)
pub fn is_sign_change(a: f64, b: f64) -> bool {
    a == 0.0 || b == 0.0 || (a < 0.0) != (b < 0.0)
}

/// Linear interpolation of the zero crossing between two curve points
pub fn interpolate_crossing(s0: f64, g0: f64, s1: f64, g1: f64) -> f64 {
    if g1 == g0 {
        return s0;
    }
    s0 - g0 * (s1 - s0) / (g1 - g0)
}

/// Strikes of a sorted profile within `spot * window_pct` of spot
pub fn neighborhood(profile: &[StrikeProfile], spot: f64, window_pct: f64) -> Vec<&StrikeProfile> {
    let half_width = spot * window_pct;
    profile
        .iter()
        .filter(|p| (p.strike - spot).abs() <= half_width)
        .collect()
}

/// Locate Zero Gamma on a profile sorted ascending by strike.
///
/// The window grows by `widen_factor` up to `max_window_pct` while it holds
/// fewer than two strikes. Inside the window the sign change nearest spot
/// is interpolated; without one, the strike whose net GEX is closest to
/// zero is used.
pub fn find_zero_gamma(profile: &[StrikeProfile], spot: f64, config: &ZeroGammaConfig) -> Option<ZeroGamma> {
    let mut window_pct = config.window_pct;

    loop {
        let points = neighborhood(profile, spot, window_pct);
        // A lone strike widens too: one point can neither bracket a crossing
        // nor stand in for one, so single-strike chains stay undefined.
        if points.len() >= 2 {
            return Some(locate_in_window(&points, spot, window_pct));
        }

        let next = (window_pct * config.widen_factor).min(config.max_window_pct);
        if next <= window_pct {
            tracing::debug!(
                window_pct,
                strikes = points.len(),
                "zero gamma undetermined: window exhausted"
            );
            return None;
        }
        window_pct = next;
    }
}

fn locate_in_window(points: &[&StrikeProfile], spot: f64, window_pct: f64) -> ZeroGamma {
    let crossing = points
        .windows(2)
        .filter(|w| is_sign_change(w[0].net_gex, w[1].net_gex))
        .map(|w| {
            let (lo, hi) = (w[0], w[1]);
            ZeroGamma {
                level: interpolate_crossing(lo.strike, lo.net_gex, hi.strike, hi.net_gex),
                method: ZeroGammaMethod::Interpolated {
                    lower_strike: lo.strike,
                    upper_strike: hi.strike,
                    lower_net_gex: lo.net_gex,
                    upper_net_gex: hi.net_gex,
                },
                window_pct,
            }
        })
        .min_by(|a, b| {
            (a.level - spot)
                .abs()
                .partial_cmp(&(b.level - spot).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    if let Some(zero) = crossing {
        return zero;
    }

    // No sign change: closest approach to equilibrium. `points` is non-empty.
    let nearest = points
        .iter()
        .copied()
        .min_by(|a, b| {
            a.net_gex
                .abs()
                .partial_cmp(&b.net_gex.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .unwrap_or(points[0]);

    ZeroGamma {
        level: nearest.strike,
        method: ZeroGammaMethod::NearestToZero {
            net_gex: nearest.net_gex,
        },
        window_pct,
    }
}

/// Run all three detectors over a sorted profile
pub fn detect_levels_in_profile(
    profile: &[StrikeProfile],
    spot: f64,
    config: &ZeroGammaConfig,
) -> (LevelReport, Option<ZeroGamma>) {
    let zero = find_zero_gamma(profile, spot, config);
    let report = LevelReport {
        zero_gamma: zero.map(|z| z.level),
        put_wall: find_put_wall(profile),
        call_wall: find_call_wall(profile),
    };
    (report, zero)
}
