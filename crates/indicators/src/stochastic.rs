use crate::ema::Ema;
use crate::Indicator;
use std::collections::VecDeque;

/// Stochastic Oscillator (KD variant).
///
/// RSV = (Close - Lowest Low) / (Highest High - Lowest Low) * 100 over a
/// trailing window, then %K = EWM(RSV) and %D = EWM(%K), both smoothed with
/// center-of-mass `com` and seeded from the first available value.
///
/// A window whose high equals its low has no defined RSV; that step emits
/// no output and leaves the smoothing state untouched rather than injecting
/// a zero or a NaN.
#[derive(Debug, Clone)]
pub struct Stochastic {
    k_period: usize,
    highs: VecDeque<f64>,
    lows: VecDeque<f64>,
    k_smooth: Ema,
    d_smooth: Ema,
}

#[derive(Debug, Clone, Copy)]
pub struct StochasticOutput {
    pub k: f64,
    pub d: f64,
}

impl Stochastic {
    pub fn new(k_period: usize, com: f64) -> Self {
        assert!(k_period > 0, "Stochastic window must be > 0");
        Self {
            k_period,
            highs: VecDeque::with_capacity(k_period),
            lows: VecDeque::with_capacity(k_period),
            k_smooth: Ema::com(com),
            d_smooth: Ema::com(com),
        }
    }

    /// Conventional KD parameters (9-bar window, com = 2 smoothing).
    pub fn default_params() -> Self {
        Self::new(9, 2.0)
    }

    pub fn next_hlc(&mut self, high: f64, low: f64, close: f64) -> Option<StochasticOutput> {
        self.highs.push_back(high);
        self.lows.push_back(low);

        if self.highs.len() > self.k_period {
            self.highs.pop_front();
            self.lows.pop_front();
        }

        if self.highs.len() < self.k_period {
            return None;
        }

        let highest = self.highs.iter().copied().fold(f64::MIN, f64::max);
        let lowest = self.lows.iter().copied().fold(f64::MAX, f64::min);

        let range = highest - lowest;
        if range == 0.0 {
            // Zero-width window: RSV is undefined for this step.
            return None;
        }

        let rsv = (close - lowest) / range * 100.0;
        let k = self.k_smooth.next(rsv)?;
        let d = self.d_smooth.next(k)?;

        Some(StochasticOutput { k, d })
    }

    pub fn output(&self) -> Option<StochasticOutput> {
        match (self.k_smooth.value(), self.d_smooth.value()) {
            (Some(k), Some(d)) => Some(StochasticOutput { k, d }),
            _ => None,
        }
    }
}

impl Indicator for Stochastic {
    fn next(&mut self, value: f64) -> Option<f64> {
        // Simplified: use value as high, low, and close.
        self.next_hlc(value, value, value).map(|o| o.k)
    }

    fn reset(&mut self) {
        self.highs.clear();
        self.lows.clear();
        self.k_smooth.reset();
        self.d_smooth.reset();
    }

    fn period(&self) -> usize {
        self.k_period
    }

    fn is_ready(&self) -> bool {
        self.output().is_some()
    }
}
