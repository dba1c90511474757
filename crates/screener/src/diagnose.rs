use crate::enrich::{EnrichedSeries, SeriesTail};
use crate::signals::{
    fundamental_verdict, macd_signal, obv_signal, stochastic_signal, trend_phase, volume_signal,
    FundamentalVerdict, MacdSignal, ObvSignal, StochasticSignal, TrendPhase, VolumeSignal,
};
use serde::Serialize;
use stockradar_core::{FundamentalSnapshot, PriceBar, ScreenError};

/// Number of enriched rows handed to the chart renderer.
const CHART_TAIL: usize = 60;

/// Everything the presentation layer needs for a single-instrument page:
/// the latest-bar classification signals, the fundamental verdict, and a
/// chart-ready tail of the enriched series.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticReport {
    pub symbol: String,
    pub name: String,
    pub latest: PriceBar,
    pub trend: TrendPhase,
    pub stochastic: StochasticSignal,
    pub macd: MacdSignal,
    pub volume: VolumeSignal,
    pub obv: ObvSignal,
    pub fundamentals: Option<FundamentalSnapshot>,
    pub verdict: Option<FundamentalVerdict>,
    pub chart: SeriesTail,
}

/// Run every diagnostic signal against an enriched series.
///
/// Unlike the batch scan, a missing indicator here is a user-visible failure
/// with a descriptive message, not a silent skip.
pub fn diagnose(
    symbol: &str,
    name: &str,
    series: &EnrichedSeries,
    fundamentals: Option<FundamentalSnapshot>,
) -> Result<DiagnosticReport, ScreenError> {
    let verdict = fundamentals.as_ref().and_then(fundamental_verdict);

    Ok(DiagnosticReport {
        symbol: symbol.to_string(),
        name: name.to_string(),
        latest: *series.latest_bar(),
        trend: trend_phase(series)?,
        stochastic: stochastic_signal(series)?,
        macd: macd_signal(series)?,
        volume: volume_signal(series)?,
        obv: obv_signal(series)?,
        fundamentals,
        verdict,
        chart: series.tail(CHART_TAIL),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::enrich;
    use chrono::NaiveDate;

    fn bars(n: usize) -> Vec<PriceBar> {
        (0..n)
            .map(|i| {
                let close = 100.0 + i as f64;
                PriceBar {
                    date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                        + chrono::Days::new(i as u64),
                    open: close,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 10_000,
                }
            })
            .collect()
    }

    #[test]
    fn full_report_on_long_series() {
        let series = enrich(&bars(80)).unwrap();
        let snap = FundamentalSnapshot {
            trailing_eps: Some(3.0),
            return_on_equity: Some(0.25),
            trailing_pe: Some(10.0),
            dividend_yield: Some(0.05),
            ..Default::default()
        };
        let report = diagnose("2330", "TSMC", &series, Some(snap)).unwrap();
        assert_eq!(report.trend, TrendPhase::Uptrend);
        assert_eq!(report.verdict, Some(FundamentalVerdict::Strong));
        assert_eq!(report.chart.dates.len(), 60);
        assert_eq!(report.latest.close, series.latest_bar().close);
    }

    #[test]
    fn no_fundamentals_means_no_verdict() {
        let series = enrich(&bars(80)).unwrap();
        let report = diagnose("NVDA", "NVIDIA", &series, None).unwrap();
        assert_eq!(report.verdict, None);
        assert!(report.fundamentals.is_none());
    }

    #[test]
    fn short_series_fails_with_descriptive_error() {
        let series = enrich(&bars(40)).unwrap();
        // 40 bars cannot fill the 60-day MA window.
        let err = diagnose("2330", "TSMC", &series, None).unwrap_err();
        assert!(err.to_string().contains("ma60"));
    }
}
