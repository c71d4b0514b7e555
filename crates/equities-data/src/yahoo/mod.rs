//! Yahoo Finance data providers.

pub mod prices;
pub mod quotes;

pub use prices::YahooPriceFetcher;
pub use quotes::YahooQuoteProvider;
