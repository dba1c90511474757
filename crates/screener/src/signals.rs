use crate::enrich::EnrichedSeries;
use serde::{Deserialize, Serialize};
use stockradar_core::{FundamentalSnapshot, ScreenError};

// Rule thresholds shared by the diagnostic signals and the strength score.
const VOLUME_BREAKOUT_RATIO: f64 = 1.5;
const VOLUME_CONTRACTION_RATIO: f64 = 0.6;
const KD_OVERBOUGHT: f64 = 80.0;
const KD_OVERSOLD: f64 = 20.0;
const KD_LOW_ZONE: f64 = 50.0;

// ---------------------------------------------------------------------------
// Diagnostic signals
// ---------------------------------------------------------------------------

/// Trend ("wave") classification: latest close against the 60-day MA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendPhase {
    Uptrend,
    Correction,
    Consolidation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StochasticSignal {
    GoldenCross,
    Overbought,
    Oversold,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacdSignal {
    TurnedBullish,
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeSignal {
    Breakout,
    Contracting,
    Steady,
}

/// Four-way OBV classification: position against its moving average crossed
/// with the latest direction of the accumulator itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObvSignal {
    StrongAccumulation,
    BullishPullback,
    BottomAccumulation,
    Distribution,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundamentalVerdict {
    Strong,
    Weak,
    Neutral,
}

/// Value at the last index of a column, or `IndicatorNotReady` when it is
/// absent there.
fn latest(col: &[Option<f64>], name: &'static str) -> Result<f64, ScreenError> {
    col.last()
        .copied()
        .flatten()
        .ok_or(ScreenError::IndicatorNotReady(name))
}

/// Value one bar before the latest, or `IndicatorNotReady`.
fn prev(col: &[Option<f64>], name: &'static str) -> Result<f64, ScreenError> {
    col.get(col.len().wrapping_sub(2))
        .copied()
        .flatten()
        .ok_or(ScreenError::IndicatorNotReady(name))
}

pub fn trend_phase(series: &EnrichedSeries) -> Result<TrendPhase, ScreenError> {
    let close = series.latest_bar().close;
    let ma60 = latest(&series.ma60, "ma60")?;
    Ok(if close > ma60 {
        TrendPhase::Uptrend
    } else if close < ma60 {
        TrendPhase::Correction
    } else {
        TrendPhase::Consolidation
    })
}

pub fn stochastic_signal(series: &EnrichedSeries) -> Result<StochasticSignal, ScreenError> {
    let k_now = latest(&series.k, "k")?;
    let d_now = latest(&series.d, "d")?;
    let k_prev = prev(&series.k, "k")?;
    let d_prev = prev(&series.d, "d")?;

    // The cross takes priority over zone checks.
    Ok(if k_prev < d_prev && k_now > d_now {
        StochasticSignal::GoldenCross
    } else if k_now > KD_OVERBOUGHT {
        StochasticSignal::Overbought
    } else if k_now < KD_OVERSOLD {
        StochasticSignal::Oversold
    } else {
        StochasticSignal::Neutral
    })
}

pub fn macd_signal(series: &EnrichedSeries) -> Result<MacdSignal, ScreenError> {
    let hist_now = latest(&series.hist, "hist")?;
    let hist_prev = prev(&series.hist, "hist")?;

    Ok(if hist_prev < 0.0 && hist_now > 0.0 {
        MacdSignal::TurnedBullish
    } else if hist_now > 0.0 {
        MacdSignal::Bullish
    } else if hist_now < 0.0 {
        MacdSignal::Bearish
    } else {
        MacdSignal::Neutral
    })
}

pub fn volume_signal(series: &EnrichedSeries) -> Result<VolumeSignal, ScreenError> {
    let volume = series.latest_bar().volume as f64;
    let vol_ma5 = latest(&series.vol_ma5, "vol_ma5")?;

    Ok(if volume > vol_ma5 * VOLUME_BREAKOUT_RATIO {
        VolumeSignal::Breakout
    } else if volume < vol_ma5 * VOLUME_CONTRACTION_RATIO {
        VolumeSignal::Contracting
    } else {
        VolumeSignal::Steady
    })
}

pub fn obv_signal(series: &EnrichedSeries) -> Result<ObvSignal, ScreenError> {
    let idx = series.last_index();
    let obv_now = series.obv[idx];
    let obv_prev = series.obv[idx - 1];
    let obv_ma = latest(&series.obv_ma, "obv_ma")?;

    let above = obv_now > obv_ma;
    let rising = obv_now > obv_prev;
    Ok(match (above, rising) {
        (true, true) => ObvSignal::StrongAccumulation,
        (true, false) => ObvSignal::BullishPullback,
        (false, true) => ObvSignal::BottomAccumulation,
        (false, false) => ObvSignal::Distribution,
    })
}

/// Rule-of-thumb fundamental verdict. One point each for positive EPS,
/// ROE above 15%, trailing P/E under 15, and dividend yield above 4%;
/// an absent field scores zero for its criterion. Not meaningful for
/// fund-like instruments, which get `None`.
pub fn fundamental_verdict(snapshot: &FundamentalSnapshot) -> Option<FundamentalVerdict> {
    if snapshot.is_fund_like {
        return None;
    }

    let mut points = 0;
    if snapshot.trailing_eps.is_some_and(|eps| eps > 0.0) {
        points += 1;
    }
    if snapshot.return_on_equity.is_some_and(|roe| roe > 0.15) {
        points += 1;
    }
    if snapshot.trailing_pe.is_some_and(|pe| pe < 15.0) {
        points += 1;
    }
    if snapshot.dividend_yield.is_some_and(|y| y > 0.04) {
        points += 1;
    }

    Some(if points >= 3 {
        FundamentalVerdict::Strong
    } else if points == 0 {
        FundamentalVerdict::Weak
    } else {
        FundamentalVerdict::Neutral
    })
}

// ---------------------------------------------------------------------------
// Strength score (batch screening)
// ---------------------------------------------------------------------------

/// A triggered reason in the composite strength score, in check-evaluation
/// order: volume first, then MACD, then stochastic. The order is part of
/// the display contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    VolumeBreakout,
    MacdTurnedBullish,
    KdGoldenCross,
}

impl Reason {
    pub fn label(&self) -> &'static str {
        match self {
            Reason::VolumeBreakout => "Volume breakout",
            Reason::MacdTurnedBullish => "MACD turned bullish",
            Reason::KdGoldenCross => "KD golden cross",
        }
    }
}

/// Composite strength score, 0-7, with the reasons that contributed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthScore {
    pub score: u8,
    pub reasons: Vec<Reason>,
}

/// Evaluate the additive strength score against the last two rows.
///
/// All three checks are evaluated independently (never short-circuited):
/// - +3 volume above 1.5x its 5-day average on an up close
/// - +3 MACD histogram flipping from negative to positive
/// - +1 KD golden cross while K is still in the low zone (< 50)
///
/// Any required indicator value missing at the evaluation point makes the
/// instrument unevaluable; the error bubbles up so batch callers can skip it
/// rather than score it zero.
pub fn strength_score(series: &EnrichedSeries) -> Result<StrengthScore, ScreenError> {
    let latest_bar = series.latest_bar();
    let prev_bar = series.prev_bar();

    let vol_ma5 = latest(&series.vol_ma5, "vol_ma5")?;
    let hist_now = latest(&series.hist, "hist")?;
    let hist_prev = prev(&series.hist, "hist")?;
    let k_now = latest(&series.k, "k")?;
    let d_now = latest(&series.d, "d")?;
    let k_prev = prev(&series.k, "k")?;
    let d_prev = prev(&series.d, "d")?;

    let mut score = 0u8;
    let mut reasons = Vec::new();

    if latest_bar.volume as f64 > vol_ma5 * VOLUME_BREAKOUT_RATIO
        && latest_bar.close > prev_bar.close
    {
        score += 3;
        reasons.push(Reason::VolumeBreakout);
    }

    if hist_prev < 0.0 && hist_now > 0.0 {
        score += 3;
        reasons.push(Reason::MacdTurnedBullish);
    }

    if k_prev < d_prev && k_now > d_now && k_now < KD_LOW_ZONE {
        score += 1;
        reasons.push(Reason::KdGoldenCross);
    }

    Ok(StrengthScore { score, reasons })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::enrich;
    use chrono::NaiveDate;
    use stockradar_core::PriceBar;

    fn day(i: usize) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap() + chrono::Days::new(i as u64)
    }

    fn bar(i: usize, close: f64, volume: u64) -> PriceBar {
        PriceBar {
            date: day(i),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume,
        }
    }

    /// 40 slowly-rising bars with steady volume; no check triggers.
    fn quiet_series() -> Vec<PriceBar> {
        (0..40)
            .map(|i| bar(i, 100.0 + i as f64 * 0.1, 10_000))
            .collect()
    }

    #[test]
    fn volume_breakout_scores_three() {
        // Day 39 closes sharply up on twice the 5-day average volume.
        let mut bars = quiet_series();
        bars[39].close = bars[38].close + 5.0;
        bars[39].high = bars[39].close + 1.0;
        bars[39].volume = 20_000;

        let series = enrich(&bars).unwrap();
        assert_eq!(volume_signal(&series).unwrap(), VolumeSignal::Breakout);

        let result = strength_score(&series).unwrap();
        assert!(result.score >= 3);
        assert_eq!(result.reasons[0], Reason::VolumeBreakout);
    }

    #[test]
    fn quiet_series_scores_zero() {
        let series = enrich(&quiet_series()).unwrap();
        let result = strength_score(&series).unwrap();
        assert_eq!(result.score, 0);
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn macd_flip_adds_three() {
        // A long decline followed by a sharp recovery flips the histogram
        // from negative to positive on the final bar.
        let mut bars: Vec<PriceBar> = (0..39)
            .map(|i| bar(i, 120.0 - i as f64, 10_000))
            .collect();
        bars.push(bar(39, 120.0 - 38.0 + 10.0, 10_000));
        let series = enrich(&bars).unwrap();
        let hist_prev = series.hist[38].unwrap();
        let hist_now = series.hist[39].unwrap();
        assert!(hist_prev < 0.0, "setup: hist[38] = {hist_prev}");
        assert!(hist_now > 0.0, "setup: hist[39] = {hist_now}");

        assert_eq!(macd_signal(&series).unwrap(), MacdSignal::TurnedBullish);
        let result = strength_score(&series).unwrap();
        assert!(result.score >= 3);
        assert!(result.reasons.contains(&Reason::MacdTurnedBullish));
    }

    #[test]
    fn kd_golden_cross_in_low_zone_adds_one() {
        // An accelerating decline pins K below D deep in the low zone; a
        // final-bar bounce crosses K back above D while still under 50.
        let mut bars: Vec<PriceBar> = (0..39)
            .map(|i| bar(i, 200.0 - (i * i) as f64 * 0.05, 10_000))
            .collect();
        bars.push(bar(39, bars[37].close, 10_000));

        let series = enrich(&bars).unwrap();
        let (k_prev, d_prev) = (series.k[38].unwrap(), series.d[38].unwrap());
        let (k_now, d_now) = (series.k[39].unwrap(), series.d[39].unwrap());
        assert!(k_prev < d_prev, "setup: k[38]={k_prev} d[38]={d_prev}");
        assert!(k_now > d_now, "setup: k[39]={k_now} d[39]={d_now}");
        assert!(k_now < KD_LOW_ZONE, "setup: k[39]={k_now}");

        assert_eq!(
            stochastic_signal(&series).unwrap(),
            StochasticSignal::GoldenCross
        );
        let result = strength_score(&series).unwrap();
        assert_eq!(result.score, 1);
        assert_eq!(result.reasons, vec![Reason::KdGoldenCross]);
        assert_eq!(result.reasons[0].label(), "KD golden cross");
    }

    #[test]
    fn score_is_monotonic_in_signals() {
        // Adding a qualifying volume spike to an otherwise-unqualified
        // series never decreases the score.
        let base = quiet_series();
        let base_score = strength_score(&enrich(&base).unwrap()).unwrap().score;

        let mut spiked = base.clone();
        spiked[39].close = spiked[38].close + 5.0;
        spiked[39].high = spiked[39].close + 1.0;
        spiked[39].volume = 30_000;
        let spiked_score = strength_score(&enrich(&spiked).unwrap()).unwrap().score;

        assert!(spiked_score >= base_score);
        assert_eq!(spiked_score, base_score + 3);
    }

    #[test]
    fn flat_series_is_unevaluable_not_zero() {
        // Zero-range windows leave KD undefined for every bar.
        let bars: Vec<PriceBar> = (0..40)
            .map(|i| PriceBar {
                date: day(i),
                open: 10.0,
                high: 10.0,
                low: 10.0,
                close: 10.0,
                volume: 1_000,
            })
            .collect();
        let series = enrich(&bars).unwrap();
        assert!(matches!(
            strength_score(&series),
            Err(ScreenError::IndicatorNotReady(_))
        ));
    }

    #[test]
    fn trend_phases() {
        // Rising series: close well above ma60.
        let rising: Vec<PriceBar> = (0..70).map(|i| bar(i, 100.0 + i as f64, 1_000)).collect();
        let series = enrich(&rising).unwrap();
        assert_eq!(trend_phase(&series).unwrap(), TrendPhase::Uptrend);

        // Falling series: close below ma60.
        let falling: Vec<PriceBar> = (0..70).map(|i| bar(i, 200.0 - i as f64, 1_000)).collect();
        let series = enrich(&falling).unwrap();
        assert_eq!(trend_phase(&series).unwrap(), TrendPhase::Correction);
    }

    #[test]
    fn trend_needs_ma60() {
        let series = enrich(&quiet_series()).unwrap();
        assert!(matches!(
            trend_phase(&series),
            Err(ScreenError::IndicatorNotReady("ma60"))
        ));
    }

    #[test]
    fn steep_rise_reads_overbought() {
        // Close rising one point per bar keeps RSV pinned near 90.
        let bars: Vec<PriceBar> = (0..70).map(|i| bar(i, 100.0 + i as f64, 1_000)).collect();
        let series = enrich(&bars).unwrap();
        assert_eq!(
            stochastic_signal(&series).unwrap(),
            StochasticSignal::Overbought
        );
    }

    #[test]
    fn obv_accumulation_quadrants() {
        // Steady rise on volume: OBV above its MA and rising.
        let rising: Vec<PriceBar> = (0..40).map(|i| bar(i, 100.0 + i as f64, 5_000)).collect();
        let series = enrich(&rising).unwrap();
        assert_eq!(obv_signal(&series).unwrap(), ObvSignal::StrongAccumulation);

        // Steady fall: OBV below its MA and falling.
        let falling: Vec<PriceBar> = (0..40).map(|i| bar(i, 140.0 - i as f64, 5_000)).collect();
        let series = enrich(&falling).unwrap();
        assert_eq!(obv_signal(&series).unwrap(), ObvSignal::Distribution);
    }

    #[test]
    fn strong_fundamentals_verdict() {
        let snap = FundamentalSnapshot {
            is_fund_like: false,
            trailing_eps: Some(2.0),
            return_on_equity: Some(0.20),
            trailing_pe: Some(12.0),
            dividend_yield: Some(0.05),
            ..Default::default()
        };
        assert_eq!(fundamental_verdict(&snap), Some(FundamentalVerdict::Strong));
    }

    #[test]
    fn absent_fields_score_zero_points() {
        let snap = FundamentalSnapshot::default();
        assert_eq!(fundamental_verdict(&snap), Some(FundamentalVerdict::Weak));
    }

    #[test]
    fn mixed_fundamentals_are_neutral() {
        let snap = FundamentalSnapshot {
            trailing_eps: Some(1.0),
            trailing_pe: Some(40.0),
            ..Default::default()
        };
        assert_eq!(fundamental_verdict(&snap), Some(FundamentalVerdict::Neutral));
    }

    #[test]
    fn fund_like_has_no_verdict() {
        let snap = FundamentalSnapshot::fund_like(None, Vec::new());
        assert_eq!(fundamental_verdict(&snap), None);
    }
}
