//! The two containers a universe owns.
//!
//! [`DescriptiveTable`] is row-oriented and keyed by an identifier column.
//! [`PriceTable`] is column-oriented, one column per ticker over a shared
//! date index.

pub mod descriptive;
pub mod prices;
pub mod record;

pub use descriptive::DescriptiveTable;
pub use prices::PriceTable;
pub use record::Record;
