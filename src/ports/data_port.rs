//! Bar provider port trait.
//!
//! Symbols are organised in groups (stocks, forex, crypto, ...). Every
//! returned series is sorted by ascending date with unique dates.

use crate::domain::batch::MarketData;
use crate::domain::error::FractalTraderError;
use crate::domain::ohlcv::OhlcvBar;

pub trait DataPort: Sync {
    fn list_groups(&self) -> Result<Vec<String>, FractalTraderError>;

    fn list_symbols(&self, group: &str) -> Result<Vec<String>, FractalTraderError>;

    fn fetch_ohlcv(&self, group: &str, symbol: &str) -> Result<Vec<OhlcvBar>, FractalTraderError>;

    /// First group containing `symbol`.
    fn find_symbol(&self, symbol: &str) -> Result<Option<String>, FractalTraderError> {
        for group in self.list_groups()? {
            if self.list_symbols(&group)?.iter().any(|s| s == symbol) {
                return Ok(Some(group));
            }
        }
        Ok(None)
    }
}

/// In-memory provider over already loaded series.
impl DataPort for MarketData {
    fn list_groups(&self) -> Result<Vec<String>, FractalTraderError> {
        Ok(self.keys().cloned().collect())
    }

    fn list_symbols(&self, group: &str) -> Result<Vec<String>, FractalTraderError> {
        Ok(self
            .get(group)
            .map(|symbols| symbols.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn fetch_ohlcv(&self, group: &str, symbol: &str) -> Result<Vec<OhlcvBar>, FractalTraderError> {
        self.get(group)
            .and_then(|symbols| symbols.get(symbol))
            .cloned()
            .ok_or_else(|| FractalTraderError::NoData {
                symbol: symbol.to_string(),
            })
    }
}
