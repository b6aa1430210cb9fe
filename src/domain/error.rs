//! Domain error types.

/// Top-level error type for fractaltrader.
#[derive(Debug, thiserror::Error)]
pub enum FractalTraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("unknown strategy: {name}")]
    UnknownStrategy { name: String },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&FractalTraderError> for std::process::ExitCode {
    fn from(err: &FractalTraderError) -> Self {
        let code: u8 = match err {
            FractalTraderError::Io(_) | FractalTraderError::Json(_) => 1,
            FractalTraderError::ConfigParse { .. }
            | FractalTraderError::ConfigMissing { .. }
            | FractalTraderError::ConfigInvalid { .. } => 2,
            FractalTraderError::Data { .. } => 3,
            FractalTraderError::UnknownStrategy { .. } => 4,
            FractalTraderError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
