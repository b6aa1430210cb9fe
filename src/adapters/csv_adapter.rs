//! CSV directory data adapter.
//!
//! One `{symbol}.csv` file per symbol with a `date,open,high,low,close[,volume]`
//! header. Top-level files form one group named after the directory; each
//! subdirectory holding CSV files forms a further group.

use crate::domain::error::FractalTraderError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

const FALLBACK_GROUP: &str = "csv";

pub struct CsvAdapter {
    base_path: PathBuf,
    root_group: String,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        let root_group = base_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| FALLBACK_GROUP.to_string());
        Self {
            base_path,
            root_group,
        }
    }

    fn group_dir(&self, group: &str) -> PathBuf {
        if group == self.root_group {
            self.base_path.clone()
        } else {
            self.base_path.join(group)
        }
    }

    fn csv_path(&self, group: &str, symbol: &str) -> PathBuf {
        self.group_dir(group).join(format!("{}.csv", symbol))
    }

    fn csv_stems(dir: &Path) -> Result<Vec<String>, FractalTraderError> {
        let entries = fs::read_dir(dir).map_err(|e| FractalTraderError::Data {
            reason: format!("failed to read directory {}: {}", dir.display(), e),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| FractalTraderError::Data {
                reason: format!("directory entry error: {}", e),
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "csv") {
                if let Some(stem) = path.file_stem() {
                    symbols.push(stem.to_string_lossy().into_owned());
                }
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn parse_field(
        record: &csv::StringRecord,
        idx: usize,
        name: &str,
    ) -> Result<f64, FractalTraderError> {
        record
            .get(idx)
            .ok_or_else(|| FractalTraderError::Data {
                reason: format!("missing {} column", name),
            })?
            .trim()
            .parse()
            .map_err(|e| FractalTraderError::Data {
                reason: format!("invalid {} value: {}", name, e),
            })
    }
}

impl DataPort for CsvAdapter {
    fn list_groups(&self) -> Result<Vec<String>, FractalTraderError> {
        let mut groups = vec![self.root_group.clone()];

        let entries = fs::read_dir(&self.base_path).map_err(|e| FractalTraderError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;
        let mut nested = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() && !Self::csv_stems(&path)?.is_empty() {
                nested.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        nested.sort();
        groups.extend(nested.into_iter().filter(|g| *g != self.root_group));

        Ok(groups)
    }

    fn list_symbols(&self, group: &str) -> Result<Vec<String>, FractalTraderError> {
        Self::csv_stems(&self.group_dir(group))
    }

    fn fetch_ohlcv(&self, group: &str, symbol: &str) -> Result<Vec<OhlcvBar>, FractalTraderError> {
        let path = self.csv_path(group, symbol);
        let content = fs::read_to_string(&path).map_err(|e| FractalTraderError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| FractalTraderError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(0).ok_or_else(|| FractalTraderError::Data {
                reason: "missing date column".into(),
            })?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
                FractalTraderError::Data {
                    reason: format!("invalid date format: {}", e),
                }
            })?;

            let volume = match record.get(5).map(str::trim) {
                None | Some("") => None,
                Some(v) => Some(v.parse::<f64>().map_err(|e| FractalTraderError::Data {
                    reason: format!("invalid volume value: {}", e),
                })? as i64),
            };

            bars.push(OhlcvBar {
                date,
                open: Self::parse_field(&record, 1, "open")?,
                high: Self::parse_field(&record, 2, "high")?,
                low: Self::parse_field(&record, 3, "low")?,
                close: Self::parse_field(&record, 4, "close")?,
                volume,
            });
        }

        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        tracing::debug!(symbol, bars = bars.len(), path = %path.display(), "loaded csv");
        Ok(bars)
    }
}
