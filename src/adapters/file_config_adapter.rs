//! INI file configuration adapter.
//!
//! Section and key names are case-insensitive.

use crate::domain::error::FractalTraderError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, FractalTraderError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| FractalTraderError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        tracing::debug!(file = %path.display(), sections = ?config.sections(), "config loaded");
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, FractalTraderError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| FractalTraderError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[pipeline]
ema_period = 50
min_body_ratio = 0.3

[backtest]
strategies = fractal_refined_strategy, fractal_ob_strategy
data_path = cache/market_data.json
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("backtest", "data_path"),
            Some("cache/market_data.json".to_string())
        );
        assert_eq!(
            adapter.get_string("backtest", "strategies"),
            Some("fractal_refined_strategy, fractal_ob_strategy".to_string())
        );
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[pipeline]\nlookback = 20\n").unwrap();
        assert_eq!(adapter.get_string("pipeline", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn keys_are_case_insensitive() {
        let adapter = FileConfigAdapter::from_string("[Pipeline]\nEMA_Period = 21\n").unwrap();
        assert_eq!(
            adapter.get_string("pipeline", "ema_period"),
            Some("21".to_string())
        );
    }

    #[test]
    fn get_list_splits_and_trims() {
        let adapter = FileConfigAdapter::from_string(
            "[backtest]\nstrategies = fractal , ,fractal_ob,\n",
        )
        .unwrap();
        assert_eq!(
            adapter.get_list("backtest", "strategies"),
            vec!["fractal", "fractal_ob"]
        );
        assert!(adapter.get_list("backtest", "missing").is_empty());
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[backtest]\noutput_dir = /tmp/results\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("backtest", "output_dir"),
            Some("/tmp/results".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        assert!(matches!(
            result,
            Err(FractalTraderError::ConfigParse { ref file, .. }) if file.ends_with("config.ini")
        ));
    }
}
