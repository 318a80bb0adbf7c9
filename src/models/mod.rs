//! Pricing models
//!
//! - **Black-Scholes**: closed-form gamma and vanna used for exposure

pub mod black_scholes;

pub use black_scholes::{compute_greeks, d1, d2, norm_pdf};
