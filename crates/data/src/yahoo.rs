use crate::listing::listing_candidates;
use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use std::time::Duration;
use stockradar_core::{
    DataError, FundamentalSnapshot, Holding, Lookback, PriceBar, QuoteProvider,
};
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const FUNDAMENTAL_MODULES: &str =
    "quoteType,defaultKeyStatistics,summaryDetail,financialData,assetProfile,topHoldings";

/// Quote provider backed by the Yahoo Finance chart and quoteSummary
/// endpoints. Each symbol is resolved through its listing candidates in
/// order; the first listing that yields bars wins.
pub struct YahooProvider {
    client: reqwest::Client,
    base_url: String,
}

impl YahooProvider {
    pub fn new() -> Result<Self, DataError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the provider at a different host (used by tests and proxies).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, DataError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("stockradar/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DataError::ApiError(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    async fn fetch_chart(
        &self,
        listing: &str,
        lookback: Lookback,
    ) -> Result<Vec<PriceBar>, DataError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, listing);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("range", lookback.as_range()),
                ("interval", "1d"),
                ("events", "div,split"),
            ])
            .send()
            .await
            .map_err(|e| map_reqwest(listing, e))?;

        if !response.status().is_success() {
            return Err(DataError::ApiError(format!(
                "HTTP {} for {listing}",
                response.status()
            )));
        }

        let payload: ChartResponse = response
            .json()
            .await
            .map_err(|e| map_reqwest(listing, e))?;
        chart_to_bars(listing, payload)
    }

    async fn fetch_summary(
        &self,
        listing: &str,
        modules: &str,
    ) -> Result<SummaryResult, DataError> {
        let url = format!("{}/v10/finance/quoteSummary/{}", self.base_url, listing);
        let response = self
            .client
            .get(&url)
            .query(&[("modules", modules)])
            .send()
            .await
            .map_err(|e| map_reqwest(listing, e))?;

        if !response.status().is_success() {
            return Err(DataError::ApiError(format!(
                "HTTP {} for {listing}",
                response.status()
            )));
        }

        let payload: SummaryResponse = response
            .json()
            .await
            .map_err(|e| map_reqwest(listing, e))?;
        payload
            .quote_summary
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or_else(|| DataError::NoData(listing.to_string()))
    }
}

#[async_trait]
impl QuoteProvider for YahooProvider {
    async fn price_history(
        &self,
        symbol: &str,
        lookback: Lookback,
    ) -> Result<Vec<PriceBar>, DataError> {
        for listing in listing_candidates(symbol) {
            match self.fetch_chart(&listing, lookback).await {
                Ok(bars) if !bars.is_empty() => return Ok(bars),
                Ok(_) => debug!(%listing, "Empty series, trying next listing"),
                Err(err) => debug!(%listing, %err, "Chart fetch failed, trying next listing"),
            }
        }
        Err(DataError::NoData(symbol.to_string()))
    }

    async fn fundamentals(&self, symbol: &str) -> Result<FundamentalSnapshot, DataError> {
        for listing in listing_candidates(symbol) {
            match self.fetch_summary(&listing, FUNDAMENTAL_MODULES).await {
                Ok(result) => return Ok(summary_to_snapshot(result)),
                Err(err) => debug!(%listing, %err, "Summary fetch failed, trying next listing"),
            }
        }
        Err(DataError::NoData(symbol.to_string()))
    }

    async fn display_name(&self, symbol: &str) -> String {
        for listing in listing_candidates(symbol) {
            if let Ok(result) = self.fetch_summary(&listing, "quoteType").await {
                if let Some(quote_type) = result.quote_type {
                    if let Some(name) = quote_type.long_name.or(quote_type.short_name) {
                        return name;
                    }
                }
            }
        }
        symbol.to_string()
    }
}

fn map_reqwest(listing: &str, err: reqwest::Error) -> DataError {
    if err.is_timeout() {
        DataError::Timeout(listing.to_string())
    } else if err.is_decode() {
        DataError::ParseError(err.to_string())
    } else {
        DataError::ApiError(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Chart payload
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

/// Flatten a chart payload into bars, dropping rows with any null field
/// (Yahoo emits them for halted sessions) and any timestamp that does not
/// advance the date.
fn chart_to_bars(listing: &str, payload: ChartResponse) -> Result<Vec<PriceBar>, DataError> {
    let result = payload
        .chart
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
        .ok_or_else(|| DataError::NoData(listing.to_string()))?;

    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .unwrap_or_default();

    let mut bars: Vec<PriceBar> = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        let row = (
            quote.open.get(i).copied().flatten(),
            quote.high.get(i).copied().flatten(),
            quote.low.get(i).copied().flatten(),
            quote.close.get(i).copied().flatten(),
            quote.volume.get(i).copied().flatten(),
        );
        let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = row else {
            continue;
        };
        let Some(date) = DateTime::from_timestamp(*ts, 0).map(|dt| dt.date_naive()) else {
            continue;
        };
        if bars.last().is_some_and(|prev: &PriceBar| date <= prev.date) {
            continue;
        }
        bars.push(PriceBar {
            date,
            open,
            high,
            low,
            close,
            volume,
        });
    }
    Ok(bars)
}

// ---------------------------------------------------------------------------
// quoteSummary payload
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    result: Option<Vec<SummaryResult>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResult {
    quote_type: Option<QuoteTypeModule>,
    default_key_statistics: Option<KeyStatistics>,
    summary_detail: Option<SummaryDetail>,
    financial_data: Option<FinancialData>,
    asset_profile: Option<AssetProfile>,
    top_holdings: Option<TopHoldings>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteTypeModule {
    quote_type: Option<String>,
    short_name: Option<String>,
    long_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyStatistics {
    trailing_eps: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetail {
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<RawValue>,
    dividend_yield: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinancialData {
    return_on_equity: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssetProfile {
    long_business_summary: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TopHoldings {
    holdings: Option<Vec<HoldingEntry>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HoldingEntry {
    holding_name: Option<String>,
    holding_percent: Option<RawValue>,
}

/// Yahoo wraps numbers as `{"raw": 1.23, "fmt": "1.23"}`.
#[derive(Debug, Deserialize)]
struct RawValue {
    raw: Option<f64>,
}

fn raw(value: Option<RawValue>) -> Option<f64> {
    value.and_then(|v| v.raw)
}

fn summary_to_snapshot(result: SummaryResult) -> FundamentalSnapshot {
    let quote_type = result
        .quote_type
        .as_ref()
        .and_then(|q| q.quote_type.as_deref())
        .unwrap_or("EQUITY");
    let is_fund_like = matches!(quote_type, "ETF" | "MUTUALFUND");

    let holdings = result
        .top_holdings
        .and_then(|t| t.holdings)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|h| {
            Some(Holding {
                name: h.holding_name?,
                weight_pct: raw(h.holding_percent)? * 100.0,
            })
        })
        .collect();

    let (trailing_pe, dividend_yield) = match result.summary_detail {
        Some(detail) => (raw(detail.trailing_pe), raw(detail.dividend_yield)),
        None => (None, None),
    };

    FundamentalSnapshot {
        is_fund_like,
        trailing_eps: raw(result.default_key_statistics.and_then(|k| k.trailing_eps)),
        trailing_pe,
        return_on_equity: raw(result.financial_data.and_then(|f| f.return_on_equity)),
        dividend_yield,
        description: result.asset_profile.and_then(|a| a.long_business_summary),
        holdings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_rows_with_nulls_are_dropped() {
        let json = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1704153600, 1704240000, 1704326400],
                    "indicators": {
                        "quote": [{
                            "open":   [100.0, null, 102.0],
                            "high":   [101.0, 102.0, 103.0],
                            "low":    [99.0, 100.0, 101.0],
                            "close":  [100.5, 101.5, 102.5],
                            "volume": [10000, 12000, 9000]
                        }]
                    }
                }]
            }
        }"#;
        let payload: ChartResponse = serde_json::from_str(json).unwrap();
        let bars = chart_to_bars("2330.TW", payload).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, 100.5);
        assert_eq!(bars[1].close, 102.5);
        assert!(bars[0].date < bars[1].date);
    }

    #[test]
    fn empty_chart_result_is_no_data() {
        let json = r#"{"chart": {"result": null}}"#;
        let payload: ChartResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            chart_to_bars("XXXX", payload),
            Err(DataError::NoData(_))
        ));
    }

    #[test]
    fn equity_summary_parses_metrics() {
        let json = r#"{
            "quoteSummary": {
                "result": [{
                    "quoteType": {"quoteType": "EQUITY", "shortName": "TSMC", "longName": "Taiwan Semiconductor"},
                    "defaultKeyStatistics": {"trailingEps": {"raw": 39.2, "fmt": "39.20"}},
                    "summaryDetail": {"trailingPE": {"raw": 25.1}, "dividendYield": {"raw": 0.015}},
                    "financialData": {"returnOnEquity": {"raw": 0.27}}
                }]
            }
        }"#;
        let payload: SummaryResponse = serde_json::from_str(json).unwrap();
        let snapshot =
            summary_to_snapshot(payload.quote_summary.result.unwrap().remove(0));
        assert!(!snapshot.is_fund_like);
        assert_eq!(snapshot.trailing_eps, Some(39.2));
        assert_eq!(snapshot.trailing_pe, Some(25.1));
        assert_eq!(snapshot.return_on_equity, Some(0.27));
        assert_eq!(snapshot.dividend_yield, Some(0.015));
        assert!(snapshot.holdings.is_empty());
    }

    #[test]
    fn etf_summary_is_fund_like_with_holdings() {
        let json = r#"{
            "quoteSummary": {
                "result": [{
                    "quoteType": {"quoteType": "ETF", "shortName": "Yuanta 0050"},
                    "assetProfile": {"longBusinessSummary": "Tracks the FTSE TWSE Taiwan 50 Index."},
                    "topHoldings": {"holdings": [
                        {"holdingName": "TSMC", "holdingPercent": {"raw": 0.48}},
                        {"holdingName": "MediaTek", "holdingPercent": {"raw": 0.05}}
                    ]}
                }]
            }
        }"#;
        let payload: SummaryResponse = serde_json::from_str(json).unwrap();
        let snapshot =
            summary_to_snapshot(payload.quote_summary.result.unwrap().remove(0));
        assert!(snapshot.is_fund_like);
        assert_eq!(snapshot.holdings.len(), 2);
        assert_eq!(snapshot.holdings[0].name, "TSMC");
        assert!((snapshot.holdings[0].weight_pct - 48.0).abs() < 1e-9);
        assert!(snapshot.description.is_some());
    }

    #[test]
    fn missing_modules_yield_absent_fields() {
        let json = r#"{"quoteSummary": {"result": [{}]}}"#;
        let payload: SummaryResponse = serde_json::from_str(json).unwrap();
        let snapshot =
            summary_to_snapshot(payload.quote_summary.result.unwrap().remove(0));
        assert!(!snapshot.is_fund_like);
        assert_eq!(snapshot.trailing_eps, None);
        assert_eq!(snapshot.trailing_pe, None);
    }
}
