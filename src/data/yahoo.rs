//! Yahoo Finance data fetcher
//!
//! Fetches the nearest-expiry option chain and spot price through Yahoo
//! Finance's unofficial API and turns it into a [`ChainSnapshot`].
//!
//! Note: Yahoo Finance data is delayed ~15 minutes and intended for
//! personal use.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{ChainSnapshot, GexError, GexResult, OptionContract, OptionType};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v7/finance";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Yahoo Finance API client
pub struct YahooClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl YahooClient {
    pub fn new() -> GexResult<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the client at another host (proxies, test servers)
    pub fn with_base_url(base_url: impl Into<String>) -> GexResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GexError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> GexResult<T> {
        self.client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| GexError::Network(e.to_string()))?
            .json()
            .map_err(|e| GexError::Data(format!("Failed to parse response from {}: {}", url, e)))
    }

    /// Get current quote for a symbol
    pub fn get_quote(&self, symbol: &str) -> GexResult<SpotQuote> {
        let url = format!("{}/quote?symbols={}", self.base_url, symbol);
        let response: YahooQuoteResponse = self.get_json(&url)?;

        let result = response
            .quote_response
            .result
            .into_iter()
            .next()
            .ok_or_else(|| GexError::no_data(format!("No quote returned for {}", symbol)))?;

        let price = result
            .regular_market_price
            .filter(|p| p.is_finite() && *p > 0.0)
            .ok_or_else(|| GexError::no_data(format!("No market price for {}", symbol)))?;

        Ok(SpotQuote {
            symbol: symbol.to_string(),
            price,
            bid: result.bid,
            ask: result.ask,
            timestamp: Utc::now(),
        })
    }

    /// Get available option expiration dates, ascending
    pub fn get_expirations(&self, symbol: &str) -> GexResult<Vec<NaiveDate>> {
        let url = format!("{}/options/{}", self.base_url, symbol);
        let response: YahooOptionsResponse = self.get_json(&url)?;

        let chain = response
            .option_chain
            .result
            .into_iter()
            .next()
            .ok_or_else(|| GexError::no_data(format!("No options data for {}", symbol)))?;

        let mut expiries: Vec<NaiveDate> = chain
            .expiration_dates
            .iter()
            .filter_map(|&ts| DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive()))
            .collect();
        expiries.sort();
        expiries.dedup();

        Ok(expiries)
    }

    /// Nearest expiry that has not passed yet
    pub fn nearest_expiry(&self, symbol: &str) -> GexResult<NaiveDate> {
        let today = Utc::now().date_naive();
        self.get_expirations(symbol)?
            .into_iter()
            .find(|e| *e >= today)
            .ok_or_else(|| GexError::no_data(format!("No open expiries for {}", symbol)))
    }

    /// Get the option chain for a specific expiration
    pub fn get_option_chain(&self, symbol: &str, expiry: NaiveDate) -> GexResult<ChainSnapshot> {
        let expiry_ts = expiry
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| GexError::data(format!("Invalid expiry {}", expiry)))?
            .and_utc()
            .timestamp();

        let url = format!("{}/options/{}?date={}", self.base_url, symbol, expiry_ts);
        let response: YahooOptionsResponse = self.get_json(&url)?;

        let chain_data = response
            .option_chain
            .result
            .into_iter()
            .next()
            .ok_or_else(|| GexError::no_data(format!("No options data for {} {}", symbol, expiry)))?;

        let spot = match chain_data
            .quote
            .regular_market_price
            .filter(|p| p.is_finite() && *p > 0.0)
        {
            Some(price) => price,
            None => self.get_quote(symbol)?.price,
        };

        let snapshot = ChainSnapshot::new(symbol, spot, expiry)
            .with_contracts(convert_chain(chain_data.options.first()));

        if snapshot.is_empty() {
            return Err(GexError::no_data(format!(
                "Chain for {} {} has no usable contracts",
                symbol, expiry
            )));
        }

        tracing::info!(
            symbol,
            %expiry,
            spot,
            calls = snapshot.calls().count(),
            puts = snapshot.puts().count(),
            "fetched option chain"
        );
        Ok(snapshot)
    }

    /// Nearest-expiry chain, the default input of the level pipeline
    pub fn get_nearest_chain(&self, symbol: &str) -> GexResult<ChainSnapshot> {
        let expiry = self.nearest_expiry(symbol)?;
        self.get_option_chain(symbol, expiry)
    }
}

fn convert_chain(options: Option<&YahooOptions>) -> Vec<OptionContract> {
    let Some(options) = options else {
        return Vec::new();
    };

    let calls = options
        .calls
        .iter()
        .map(|row| convert_option_row(row, OptionType::Call));
    let puts = options
        .puts
        .iter()
        .map(|row| convert_option_row(row, OptionType::Put));

    let total = options.calls.len() + options.puts.len();
    let contracts: Vec<OptionContract> = calls.chain(puts).flatten().collect();

    if contracts.len() < total {
        tracing::debug!(
            dropped = total - contracts.len(),
            "skipped rows without strike, open interest or implied vol"
        );
    }
    contracts
}

/// Convert one Yahoo row; rows missing the fields exposure needs are dropped
fn convert_option_row(data: &YahooOptionData, side: OptionType) -> Option<OptionContract> {
    let strike = data.strike.filter(|k| k.is_finite() && *k > 0.0)?;
    let open_interest = data.open_interest.filter(|oi| *oi > 0)? as u64;
    let implied_vol = data.implied_volatility.filter(|v| v.is_finite())?;

    Some(OptionContract::new(strike, open_interest, implied_vol, side))
}

/// Spot price quote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotQuote {
    pub symbol: String,
    pub price: f64,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

// Yahoo Finance API response structures

#[derive(Debug, Deserialize)]
struct YahooQuoteResponse {
    #[serde(rename = "quoteResponse")]
    quote_response: YahooQuoteResult,
}

#[derive(Debug, Deserialize)]
struct YahooQuoteResult {
    result: Vec<YahooQuoteData>,
}

#[derive(Debug, Deserialize)]
struct YahooQuoteData {
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
    bid: Option<f64>,
    ask: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct YahooOptionsResponse {
    #[serde(rename = "optionChain")]
    option_chain: YahooOptionChain,
}

#[derive(Debug, Deserialize)]
struct YahooOptionChain {
    result: Vec<YahooOptionChainData>,
}

#[derive(Debug, Deserialize)]
struct YahooOptionChainData {
    #[serde(rename = "expirationDates", default)]
    expiration_dates: Vec<i64>,
    quote: YahooQuoteData,
    #[serde(default)]
    options: Vec<YahooOptions>,
}

#[derive(Debug, Deserialize)]
struct YahooOptions {
    #[serde(default)]
    calls: Vec<YahooOptionData>,
    #[serde(default)]
    puts: Vec<YahooOptionData>,
}

#[derive(Debug, Deserialize)]
struct YahooOptionData {
    strike: Option<f64>,
    #[serde(rename = "openInterest")]
    open_interest: Option<i64>,
    #[serde(rename = "impliedVolatility")]
    implied_volatility: Option<f64>,
}
