//! The price-fetching collaborator used by a universe.

use crate::error::Result;
use crate::series::PriceSeries;

/// Source of historical prices for a single ticker.
///
/// Implementations receive the prices already held for `ticker` and decide
/// how much history to request. They return the full series for the ticker,
/// existing observations included.
///
/// Any `FnMut(&str, &PriceSeries, u32) -> Result<PriceSeries>` closure is a
/// `PriceFetcher`, which keeps test doubles short.
pub trait PriceFetcher {
    /// Fetch the complete price series for `ticker`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying data source fails.
    fn fetch(
        &mut self,
        ticker: &str,
        existing: &PriceSeries,
        lookback_years: u32,
    ) -> Result<PriceSeries>;
}

impl<F> PriceFetcher for F
where
    F: FnMut(&str, &PriceSeries, u32) -> Result<PriceSeries>,
{
    fn fetch(
        &mut self,
        ticker: &str,
        existing: &PriceSeries,
        lookback_years: u32,
    ) -> Result<PriceSeries> {
        self(ticker, existing, lookback_years)
    }
}
