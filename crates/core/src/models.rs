use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Market Data
// ---------------------------------------------------------------------------

/// A single daily OHLCV bar, adjusted for splits and dividends.
///
/// Invariant: `low <= open <= high` and `low <= close <= high`; a series of
/// bars is sorted strictly ascending by date with no duplicates. Gaps for
/// non-trading days are expected and never filled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PriceBar {
    /// Check the OHLC ordering invariant.
    pub fn is_well_formed(&self) -> bool {
        self.low <= self.open
            && self.low <= self.close
            && self.open <= self.high
            && self.close <= self.high
            && self.low > 0.0
    }
}

/// Requested depth of price history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Lookback {
    #[default]
    ThreeMonths,
    SixMonths,
    OneYear,
}

impl Lookback {
    /// Range string understood by the quote provider.
    pub fn as_range(&self) -> &'static str {
        match self {
            Lookback::ThreeMonths => "3mo",
            Lookback::SixMonths => "6mo",
            Lookback::OneYear => "1y",
        }
    }

    /// Inverse of [`as_range`](Self::as_range), for CLI and query params.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "3mo" => Some(Lookback::ThreeMonths),
            "6mo" => Some(Lookback::SixMonths),
            "1y" => Some(Lookback::OneYear),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Fundamentals
// ---------------------------------------------------------------------------

/// One position of a fund's holdings, ranked by weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub name: String,
    pub weight_pct: f64,
}

/// Point-in-time fundamental metadata for one instrument.
///
/// Fields are `None` when the provider has no figure for them; absent fields
/// score zero in the fundamental verdict, they are never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FundamentalSnapshot {
    /// True when the instrument behaves as a basket (ETF / mutual fund)
    /// rather than a single operating company.
    pub is_fund_like: bool,
    pub trailing_eps: Option<f64>,
    pub trailing_pe: Option<f64>,
    pub return_on_equity: Option<f64>,
    pub dividend_yield: Option<f64>,
    /// Free-text description, mainly used for fund-like instruments.
    pub description: Option<String>,
    /// Top holdings for fund-like instruments, ranked by weight.
    pub holdings: Vec<Holding>,
}

impl FundamentalSnapshot {
    pub fn fund_like(description: Option<String>, holdings: Vec<Holding>) -> Self {
        Self {
            is_fund_like: true,
            description,
            holdings,
            ..Default::default()
        }
    }

    /// EPS formatted for display, `None` when the provider had no figure.
    pub fn formatted_eps(&self) -> Option<String> {
        self.trailing_eps.map(|eps| format!("{eps:.2}"))
    }
}

// ---------------------------------------------------------------------------
// Scan output
// ---------------------------------------------------------------------------

/// One qualifying row of a batch radar scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub symbol: String,
    pub name: String,
    pub close: f64,
    /// Composite strength score, 0-7.
    pub score: u8,
    /// Triggered reason labels, in check-evaluation order
    /// (volume, then MACD, then stochastic).
    pub reasons: Vec<String>,
    pub eps: Option<String>,
}

/// Full outcome of one radar scan invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ScanReport {
    /// Qualifying instruments, sorted by descending strength score.
    pub results: Vec<ScanResult>,
    /// Instruments that had enough history to be evaluated (whether or not
    /// they cleared the score filter).
    pub evaluated: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(open: f64, high: f64, low: f64, close: f64) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open,
            high,
            low,
            close,
            volume: 1_000,
        }
    }

    #[test]
    fn well_formed_bar() {
        assert!(bar(10.0, 11.0, 9.5, 10.5).is_well_formed());
    }

    #[test]
    fn close_above_high_is_malformed() {
        assert!(!bar(10.0, 11.0, 9.5, 11.5).is_well_formed());
    }

    #[test]
    fn lookback_range_strings() {
        assert_eq!(Lookback::ThreeMonths.as_range(), "3mo");
        assert_eq!(Lookback::OneYear.as_range(), "1y");
        assert_eq!(Lookback::parse("6mo"), Some(Lookback::SixMonths));
        assert_eq!(Lookback::parse("2w"), None);
    }

    #[test]
    fn formatted_eps_rounds_to_two_places() {
        let snap = FundamentalSnapshot {
            trailing_eps: Some(2.3456),
            ..Default::default()
        };
        assert_eq!(snap.formatted_eps().as_deref(), Some("2.35"));
    }
}
