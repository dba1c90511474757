use crate::enrich::{enrich, MIN_BARS};
use crate::signals::strength_score;
use std::time::Duration;
use stockradar_core::{Lookback, QuoteProvider, ScanReport, ScanResult};
use tracing::{debug, info, warn};

/// Parameters for one radar scan invocation.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Minimum strength score (1-7) an instrument must reach to be reported.
    pub min_score: u8,
    pub lookback: Lookback,
    /// Per-instrument fetch deadline; elapsing it is treated like no data.
    pub fetch_timeout: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            min_score: 3,
            lookback: Lookback::ThreeMonths,
            fetch_timeout: Duration::from_secs(10),
        }
    }
}

/// Batch radar scan: fetch, enrich, and score each candidate sequentially.
///
/// Nothing here aborts the batch: instruments with no data, too little
/// history, or unevaluable indicators are skipped and the scan continues.
/// The worst-case outcome is an empty result set.
pub async fn scan(
    provider: &dyn QuoteProvider,
    symbols: &[String],
    config: &ScanConfig,
) -> ScanReport {
    let mut report = ScanReport::default();

    for symbol in symbols {
        let fetched = tokio::time::timeout(
            config.fetch_timeout,
            provider.price_history(symbol, config.lookback),
        )
        .await;

        let bars = match fetched {
            Err(_) => {
                debug!(symbol = %symbol, "Fetch timed out, skipping");
                continue;
            }
            Ok(Err(err)) if err.is_no_data() => {
                debug!(symbol = %symbol, %err, "No data, skipping");
                continue;
            }
            Ok(Err(err)) => {
                warn!(symbol = %symbol, %err, "Fetch failed, skipping");
                continue;
            }
            Ok(Ok(bars)) => bars,
        };

        if bars.len() < MIN_BARS {
            debug!(symbol = %symbol, bars = bars.len(), "Series too short, skipping");
            continue;
        }
        report.evaluated += 1;

        let series = match enrich(&bars) {
            Ok(series) => series,
            Err(err) => {
                warn!(symbol = %symbol, %err, "Enrichment failed, skipping");
                continue;
            }
        };

        let strength = match strength_score(&series) {
            Ok(strength) => strength,
            Err(err) => {
                debug!(symbol = %symbol, %err, "Not evaluable, skipping");
                continue;
            }
        };

        if strength.score < config.min_score {
            continue;
        }

        // Name and fundamentals are only fetched for qualifying instruments.
        let name = provider.display_name(symbol).await;
        let eps = match provider.fundamentals(symbol).await {
            Ok(snapshot) => snapshot.formatted_eps(),
            Err(err) => {
                debug!(symbol = %symbol, %err, "Fundamentals unavailable");
                None
            }
        };

        report.results.push(ScanResult {
            symbol: symbol.clone(),
            name,
            close: series.latest_bar().close,
            score: strength.score,
            reasons: strength.reasons.iter().map(|r| r.label().to_string()).collect(),
            eps,
        });
    }

    // Stable sort: ties keep candidate-list order.
    report.results.sort_by(|a, b| b.score.cmp(&a.score));
    info!(
        evaluated = report.evaluated,
        matched = report.results.len(),
        "Radar scan complete"
    );
    report
}
