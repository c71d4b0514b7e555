//! Blocking [`PriceFetcher`] backed by Yahoo Finance daily closes.

use super::quotes::YahooQuoteProvider;
use crate::error::{DataError, Result};
use crate::fetcher::PriceFetcher;
use crate::series::PriceSeries;
use chrono::{DateTime, Months, NaiveTime, Utc};
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

/// Fetches end-of-day closing prices, requesting only the history that is
/// not already held.
///
/// The connector and the runtime driving it are created on first use.
pub struct YahooPriceFetcher {
    rate_limit_delay: Duration,
    client: Option<(Runtime, YahooQuoteProvider)>,
}

impl std::fmt::Debug for YahooPriceFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooPriceFetcher")
            .field("rate_limit_delay", &self.rate_limit_delay)
            .field("connected", &self.client.is_some())
            .finish()
    }
}

impl YahooPriceFetcher {
    /// Create a fetcher with the default rate limit.
    pub const fn new() -> Self {
        Self::with_rate_limit(YahooQuoteProvider::DEFAULT_RATE_LIMIT)
    }

    /// Create a fetcher that waits `rate_limit_delay` after every request.
    pub const fn with_rate_limit(rate_limit_delay: Duration) -> Self {
        Self {
            rate_limit_delay,
            client: None,
        }
    }

    fn client(&mut self) -> Result<&(Runtime, YahooQuoteProvider)> {
        if self.client.is_none() {
            let runtime = Builder::new_current_thread().enable_all().build()?;
            let provider = YahooQuoteProvider::with_rate_limit(self.rate_limit_delay)?;
            self.client = Some((runtime, provider));
        }
        self.client
            .as_ref()
            .ok_or_else(|| DataError::YahooApi("connector unavailable".to_string()))
    }
}

impl Default for YahooPriceFetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// First instant to request for `ticker`.
///
/// With no history the full lookback window is requested; otherwise the
/// request starts at the latest held date so that day is refreshed.
fn request_start(
    ticker: &str,
    existing: &PriceSeries,
    lookback_years: u32,
    end: DateTime<Utc>,
) -> Result<DateTime<Utc>> {
    match existing.last_date() {
        Some(last) => Ok(last.and_time(NaiveTime::MIN).and_utc()),
        None => end
            .checked_sub_months(Months::new(lookback_years.saturating_mul(12)))
            .ok_or_else(|| DataError::MissingData {
                symbol: ticker.to_string(),
                reason: format!("lookback of {lookback_years} years is out of range"),
            }),
    }
}

impl PriceFetcher for YahooPriceFetcher {
    fn fetch(
        &mut self,
        ticker: &str,
        existing: &PriceSeries,
        lookback_years: u32,
    ) -> Result<PriceSeries> {
        let end = Utc::now();
        let start = request_start(ticker, existing, lookback_years, end)?;
        let symbol = ticker.to_uppercase();
        debug!(ticker, %start, %end, held = existing.len(), "requesting closes");

        let (runtime, provider) = self.client()?;
        let fresh = match runtime.block_on(provider.fetch_closes(&symbol, ticker, start, end)) {
            Ok(fresh) => fresh,
            // Nothing new since the last held date.
            Err(DataError::MissingData { .. }) if !existing.is_empty() => {
                PriceSeries::new(ticker)
            }
            Err(e) => return Err(e),
        };

        let mut merged = existing.clone();
        merged.set_name(ticker);
        merged.extend_from(&fresh);
        Ok(merged)
    }
}
