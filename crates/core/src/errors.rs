use thiserror::Error;

/// Errors from the market-data layer.
#[derive(Debug, Error)]
pub enum DataError {
    /// The provider returned no usable bars for any listing candidate.
    #[error("No price data available for {0}")]
    NoData(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Provider request failed: {0}")]
    ApiError(String),
    /// The per-fetch deadline elapsed; callers treat this like `NoData`.
    #[error("Request for {0} timed out")]
    Timeout(String),
}

impl DataError {
    /// Whether the error means "nothing to score" rather than a hard failure.
    /// Batch scans skip these instruments and continue.
    pub fn is_no_data(&self) -> bool {
        matches!(self, DataError::NoData(_) | DataError::Timeout(_))
    }
}

/// Errors from the indicator / scoring core.
#[derive(Debug, Error)]
pub enum ScreenError {
    /// Fewer bars than the minimum the indicator stack needs.
    #[error("Insufficient history: got {got} bars, need at least {need}")]
    InsufficientHistory { got: usize, need: usize },
    /// A lookback window was not yet full at the evaluation point, or the
    /// stochastic range was zero for the whole window.
    #[error("Indicator '{0}' has no value at the evaluation point")]
    IndicatorNotReady(&'static str),
    #[error("Malformed input series: {0}")]
    MalformedSeries(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_data_classification() {
        assert!(DataError::NoData("2330".into()).is_no_data());
        assert!(DataError::Timeout("2330".into()).is_no_data());
        assert!(!DataError::ParseError("bad json".into()).is_no_data());
    }

    #[test]
    fn insufficient_history_message() {
        let err = ScreenError::InsufficientHistory { got: 12, need: 30 };
        assert_eq!(
            err.to_string(),
            "Insufficient history: got 12 bars, need at least 30"
        );
    }
}
