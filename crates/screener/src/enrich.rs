use serde::Serialize;
use stockradar_core::{PriceBar, ScreenError};
use stockradar_indicators::macd::Macd;
use stockradar_indicators::obv::Obv;
use stockradar_indicators::sma::Sma;
use stockradar_indicators::stochastic::Stochastic;
use stockradar_indicators::Indicator;

/// Hard minimum number of bars before a series is worth enriching; anything
/// shorter cannot populate the 26-span MACD lookback reliably.
pub const MIN_BARS: usize = 30;

/// SMA window over OBV.
const OBV_MA_WINDOW: usize = 20;

/// A price series augmented with derived indicator columns.
///
/// Every column is indexed in lockstep with `bars`. A `None` entry means the
/// lookback window was not yet full (or the stochastic range was zero) at
/// that index; consumers must treat it as absent, never as zero.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedSeries {
    pub bars: Vec<PriceBar>,
    pub ma5: Vec<Option<f64>>,
    pub ma20: Vec<Option<f64>>,
    pub ma60: Vec<Option<f64>>,
    pub vol_ma5: Vec<Option<f64>>,
    pub k: Vec<Option<f64>>,
    pub d: Vec<Option<f64>>,
    pub macd: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub hist: Vec<Option<f64>>,
    pub obv: Vec<f64>,
    pub obv_ma: Vec<Option<f64>>,
}

impl EnrichedSeries {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Index of the latest bar.
    pub fn last_index(&self) -> usize {
        self.bars.len() - 1
    }

    /// The latest bar.
    pub fn latest_bar(&self) -> &PriceBar {
        &self.bars[self.last_index()]
    }

    /// The bar before the latest.
    pub fn prev_bar(&self) -> &PriceBar {
        &self.bars[self.last_index() - 1]
    }

    /// Last `n` rows (or the whole series when shorter), for charting.
    pub fn tail(&self, n: usize) -> SeriesTail {
        let start = self.len().saturating_sub(n);
        SeriesTail {
            dates: self.bars[start..].iter().map(|b| b.date).collect(),
            close: self.bars[start..].iter().map(|b| b.close).collect(),
            volume: self.bars[start..].iter().map(|b| b.volume).collect(),
            ma5: self.ma5[start..].to_vec(),
            ma20: self.ma20[start..].to_vec(),
            ma60: self.ma60[start..].to_vec(),
            k: self.k[start..].to_vec(),
            d: self.d[start..].to_vec(),
            macd: self.macd[start..].to_vec(),
            signal: self.signal[start..].to_vec(),
            hist: self.hist[start..].to_vec(),
            obv: self.obv[start..].to_vec(),
            obv_ma: self.obv_ma[start..].to_vec(),
        }
    }
}

/// Column-oriented tail of an enriched series, shaped for chart rendering.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesTail {
    pub dates: Vec<chrono::NaiveDate>,
    pub close: Vec<f64>,
    pub volume: Vec<u64>,
    pub ma5: Vec<Option<f64>>,
    pub ma20: Vec<Option<f64>>,
    pub ma60: Vec<Option<f64>>,
    pub k: Vec<Option<f64>>,
    pub d: Vec<Option<f64>>,
    pub macd: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub hist: Vec<Option<f64>>,
    pub obv: Vec<f64>,
    pub obv_ma: Vec<Option<f64>>,
}

fn validate(bars: &[PriceBar]) -> Result<(), ScreenError> {
    for window in bars.windows(2) {
        if window[1].date <= window[0].date {
            return Err(ScreenError::MalformedSeries(format!(
                "Dates not strictly ascending around {}",
                window[1].date
            )));
        }
    }
    if let Some(bad) = bars.iter().find(|b| !b.is_well_formed()) {
        return Err(ScreenError::MalformedSeries(format!(
            "OHLC invariant violated on {}",
            bad.date
        )));
    }
    Ok(())
}

/// The indicator engine: one synchronous pass over the raw series producing
/// every derived column. Pure; running it twice on the same input yields
/// identical output.
pub fn enrich(bars: &[PriceBar]) -> Result<EnrichedSeries, ScreenError> {
    if bars.len() < MIN_BARS {
        return Err(ScreenError::InsufficientHistory {
            got: bars.len(),
            need: MIN_BARS,
        });
    }
    validate(bars)?;

    let n = bars.len();
    let mut ma5_ind = Sma::new(5);
    let mut ma20_ind = Sma::new(20);
    let mut ma60_ind = Sma::new(60);
    let mut vol_ma5_ind = Sma::new(5);
    let mut stoch = Stochastic::default_params();
    let mut macd_ind = Macd::default_spans();
    let mut obv_ind = Obv::new();
    let mut obv_ma_ind = Sma::new(OBV_MA_WINDOW);

    let mut series = EnrichedSeries {
        bars: bars.to_vec(),
        ma5: Vec::with_capacity(n),
        ma20: Vec::with_capacity(n),
        ma60: Vec::with_capacity(n),
        vol_ma5: Vec::with_capacity(n),
        k: Vec::with_capacity(n),
        d: Vec::with_capacity(n),
        macd: Vec::with_capacity(n),
        signal: Vec::with_capacity(n),
        hist: Vec::with_capacity(n),
        obv: Vec::with_capacity(n),
        obv_ma: Vec::with_capacity(n),
    };

    for bar in bars {
        let volume = bar.volume as f64;

        series.ma5.push(ma5_ind.next(bar.close));
        series.ma20.push(ma20_ind.next(bar.close));
        series.ma60.push(ma60_ind.next(bar.close));
        series.vol_ma5.push(vol_ma5_ind.next(volume));

        // A zero-range window yields no KD output for that bar; the column
        // entries stay `None` rather than repeating the previous value.
        let (k, d) = match stoch.next_hlc(bar.high, bar.low, bar.close) {
            Some(out) => (Some(out.k), Some(out.d)),
            None => (None, None),
        };
        series.k.push(k);
        series.d.push(d);

        match macd_ind.next_output(bar.close) {
            Some(out) => {
                series.macd.push(Some(out.macd));
                series.signal.push(Some(out.signal));
                series.hist.push(Some(out.histogram));
            }
            None => {
                series.macd.push(None);
                series.signal.push(None);
                series.hist.push(None);
            }
        }

        let obv = obv_ind.next_bar(bar.close, volume);
        series.obv.push(obv);
        series.obv_ma.push(obv_ma_ind.next(obv));
    }

    Ok(series)
}
