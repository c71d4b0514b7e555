//! The universe container: descriptive data and prices for a set of equities.

use crate::archive::{self, EQUITIES_SHEET, Sheet};
use crate::config::UniverseConfig;
use crate::error::{Result, UniverseError};
use crate::import;
use crate::table::{DescriptiveTable, PriceTable, Record};
use crate::value::Value;
use equities_data::{PriceFetcher, YahooPriceFetcher};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A universe of equities.
///
/// Owns a descriptive table keyed by an identifier column and a price table
/// with one column per ticker. Both persist together in a single archive.
pub struct Universe {
    config: UniverseConfig,
    id_column_name: String,
    filename: Option<PathBuf>,
    equities: DescriptiveTable,
    prices: PriceTable,
    prices_fetcher: Box<dyn PriceFetcher>,
}

impl std::fmt::Debug for Universe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Universe")
            .field("config", &self.config)
            .field("id_column_name", &self.id_column_name)
            .field("filename", &self.filename)
            .field("equities", &self.equities.height())
            .field("prices", &(self.prices.height(), self.prices.width()))
            .finish_non_exhaustive()
    }
}

impl Universe {
    /// Create an empty universe that fetches prices from Yahoo Finance.
    pub fn new() -> Self {
        Self::with_config(UniverseConfig::default(), Box::new(YahooPriceFetcher::new()))
    }

    /// Create an empty universe with a custom price fetcher.
    pub fn with_fetcher<F: PriceFetcher + 'static>(fetcher: F) -> Self {
        Self::with_config(UniverseConfig::default(), Box::new(fetcher))
    }

    /// Create an empty universe from explicit parts.
    pub fn with_config(config: UniverseConfig, prices_fetcher: Box<dyn PriceFetcher>) -> Self {
        Self {
            id_column_name: config.id_column_name.clone(),
            config,
            filename: None,
            equities: DescriptiveTable::new(),
            prices: PriceTable::new(),
            prices_fetcher,
        }
    }

    /// Open the universe archive at `path`.
    ///
    /// The identifier column is not stored in the archive; a universe keyed
    /// by anything other than the configured default should be reopened
    /// through [`Universe::builder`] with
    /// [`UniverseBuilder::id_column_name`].
    ///
    /// # Errors
    ///
    /// Fails if the archive cannot be loaded; no universe is returned.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::builder().filename(path).build()
    }

    /// Start building a universe.
    pub fn builder() -> UniverseBuilder {
        UniverseBuilder::new()
    }

    /// Number of equities.
    pub fn len(&self) -> usize {
        self.tickers().len()
    }

    /// Whether the universe has no equities.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Archive the universe was loaded from or last saved to.
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    /// Active configuration.
    pub const fn config(&self) -> &UniverseConfig {
        &self.config
    }

    /// Name of the column that identifies each equity.
    pub fn id_column_name(&self) -> &str {
        &self.id_column_name
    }

    /// Descriptive data.
    pub const fn equities(&self) -> &DescriptiveTable {
        &self.equities
    }

    /// Price data.
    pub const fn prices(&self) -> &PriceTable {
        &self.prices
    }

    /// Replace the descriptive data with the contents of `path`.
    ///
    /// CSV, TSV, XLSX, XLS and JSON files are recognised by their contents.
    /// The identifier column is `id_column_name` when given; otherwise the
    /// current identifier column, or its lowercase spelling.
    ///
    /// # Errors
    ///
    /// Returns [`UniverseError::IdColumnError`] if the identifier column is
    /// not in the file. On any error the universe is left unchanged.
    pub fn import_file<P: AsRef<Path>>(&mut self, path: P, id_column_name: Option<&str>) -> Result<()> {
        let path = path.as_ref();
        let table = import::read_table(path)?;

        let id_column = match id_column_name {
            Some(name) if table.has_column(name) => name.to_string(),
            Some(name) => {
                return Err(UniverseError::IdColumnError(format!(
                    "Column name '{name}' not found in file"
                )));
            }
            None => table.resolve_column(&self.id_column_name).ok_or_else(|| {
                UniverseError::IdColumnError(format!(
                    "No column named '{}' or '{}' in data",
                    self.id_column_name,
                    self.id_column_name.to_lowercase()
                ))
            })?,
        };

        info!(
            path = %path.display(),
            rows = table.height(),
            columns = table.width(),
            id_column = %id_column,
            "imported descriptive data"
        );
        self.equities = table;
        self.id_column_name = id_column;
        Ok(())
    }

    /// Descriptive column names; empty when no equities are loaded.
    pub fn columns(&self) -> &[String] {
        if self.equities.is_empty() {
            &[]
        } else {
            self.equities.headers()
        }
    }

    /// Ticker symbols in row order.
    pub fn tickers(&self) -> Vec<String> {
        self.equities
            .column(&self.id_column_name)
            .map(|values| values.into_iter().map(Value::to_string).collect())
            .unwrap_or_default()
    }

    /// Descriptive data of `ticker_symbol` as `column -> value`, in column
    /// order.
    ///
    /// The first matching row wins and `"None"` text reads as
    /// [`Value::Empty`]. An empty universe yields an empty record.
    ///
    /// # Errors
    ///
    /// Returns [`UniverseError::TickerSymbolNotFound`] when the universe has
    /// equities but none with this symbol.
    pub fn equity(&self, ticker_symbol: &str) -> Result<Record> {
        if self.equities.is_empty() {
            return Ok(Record::default());
        }
        self.equities
            .find_row(&self.id_column_name, ticker_symbol)
            .map(|row| self.equities.record(row))
            .ok_or_else(|| UniverseError::TickerSymbolNotFound(ticker_symbol.to_string()))
    }

    /// Add an empty descriptive column. Does nothing when the universe has
    /// no equities or the column already exists.
    pub fn add_column(&mut self, column_name: &str) {
        if !self.equities.is_empty() && self.equities.append_column(column_name) {
            debug!(column = column_name, "added column");
        }
    }

    /// Replace the universe contents with the archive at `path`.
    ///
    /// The first sheet becomes the descriptive data and a second sheet, when
    /// present, the prices.
    ///
    /// # Errors
    ///
    /// Returns [`UniverseError::UnsupportedFormat`] unless the extension is
    /// `xlsx` or `json`, or any read error. The universe is left unchanged
    /// on error.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut sheets = archive::read_archive(path)?.into_iter();

        let equities = sheets.next().map(|s| s.table).unwrap_or_default();
        let prices = match sheets.next() {
            Some(sheet) => archive::prices_from_sheet(&sheet.table, &self.config.prices_index)?,
            None => PriceTable::new(),
        };

        if let Some(id_column) = equities.resolve_column(&self.id_column_name) {
            self.id_column_name = id_column;
        }
        info!(
            path = %path.display(),
            equities = equities.height(),
            dates = prices.height(),
            tickers = prices.width(),
            "loaded universe"
        );
        self.equities = equities;
        self.prices = prices;
        self.filename = Some(path.to_path_buf());
        Ok(())
    }

    /// Save to the archive the universe was loaded from or last saved to.
    ///
    /// # Errors
    ///
    /// Returns [`UniverseError::UniverseFilenameNotSet`] if there is no such
    /// archive.
    pub fn save(&mut self) -> Result<()> {
        let path = self
            .filename
            .clone()
            .ok_or(UniverseError::UniverseFilenameNotSet)?;
        self.save_as(path)
    }

    /// Save to `path`, replacing it, and remember it for later saves.
    ///
    /// Only the two tables are written. The identifier column name is not,
    /// so see [`Universe::open`] for reopening a universe keyed by a
    /// non-default column.
    ///
    /// # Errors
    ///
    /// Returns [`UniverseError::UnsupportedFormat`] unless `path` ends in
    /// `xlsx`, or any write error.
    pub fn save_as<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut sheets = vec![Sheet::new(EQUITIES_SHEET, self.equities.clone())];
        if !self.prices.is_empty() {
            sheets.push(archive::prices_to_sheet(&self.prices, &self.config.prices_index)?);
        }
        archive::write_archive(path, &sheets)?;

        info!(
            path = %path.display(),
            sheets = sheets.len(),
            "saved universe"
        );
        self.filename = Some(path.to_path_buf());
        Ok(())
    }

    /// Refresh prices for every ticker, in ticker order.
    ///
    /// Each ticker's held prices are handed to the fetcher, whose results
    /// replace the whole price table.
    ///
    /// # Errors
    ///
    /// Propagates the first fetch error; prices are left unchanged.
    pub fn fetch_prices(&mut self) -> Result<()> {
        let tickers = self.tickers();
        let mut fetched = Vec::with_capacity(tickers.len());
        for ticker in tickers {
            let existing = self.prices.series_or_empty(&ticker);
            debug!(ticker = %ticker, held = existing.len(), "fetching prices");
            let series = self.prices_fetcher.fetch(
                &ticker,
                &existing,
                self.config.prices_lookback_years,
            )?;
            fetched.push((ticker, series));
        }

        self.prices = PriceTable::from_series(fetched);
        info!(
            tickers = self.prices.width(),
            dates = self.prices.height(),
            "fetched prices"
        );
        Ok(())
    }
}

impl Default for Universe {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`Universe`].
#[derive(Default)]
pub struct UniverseBuilder {
    config: UniverseConfig,
    filename: Option<PathBuf>,
    prices_fetcher: Option<Box<dyn PriceFetcher>>,
}

impl std::fmt::Debug for UniverseBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UniverseBuilder")
            .field("config", &self.config)
            .field("filename", &self.filename)
            .field("custom_fetcher", &self.prices_fetcher.is_some())
            .finish()
    }
}

impl UniverseBuilder {
    /// Create a new universe builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: UniverseConfig) -> Self {
        self.config = config;
        self
    }

    /// Archive to load on build.
    pub fn filename<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.filename = Some(path.as_ref().to_path_buf());
        self
    }

    /// Price fetcher to use instead of Yahoo Finance.
    pub fn prices_fetcher<F: PriceFetcher + 'static>(mut self, fetcher: F) -> Self {
        self.prices_fetcher = Some(Box::new(fetcher));
        self
    }

    /// Years of history requested for tickers without prices.
    pub const fn prices_lookback_years(mut self, years: u32) -> Self {
        self.config.prices_lookback_years = years;
        self
    }

    /// Default identifier column.
    pub fn id_column_name(mut self, name: impl Into<String>) -> Self {
        self.config.id_column_name = name.into();
        self
    }

    /// Build the universe, loading the archive if one was given.
    ///
    /// # Errors
    ///
    /// Propagates any [`Universe::load`] error.
    pub fn build(self) -> Result<Universe> {
        let fetcher: Box<dyn PriceFetcher> = match self.prices_fetcher {
            Some(fetcher) => fetcher,
            None => Box::new(YahooPriceFetcher::new()),
        };
        let mut universe = Universe::with_config(self.config, fetcher);
        if let Some(path) = self.filename {
            universe.load(path)?;
        }
        Ok(universe)
    }
}
