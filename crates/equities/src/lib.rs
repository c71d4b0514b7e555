#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/equities/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod archive;
pub mod config;
pub mod error;
pub mod import;
pub mod table;
pub mod universe;
pub mod value;

// Re-export the market data crate
pub use equities_data as data;

pub use config::UniverseConfig;
pub use error::{Result, UniverseError};
pub use table::{DescriptiveTable, PriceTable, Record};
pub use universe::{Universe, UniverseBuilder};
pub use value::Value;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
