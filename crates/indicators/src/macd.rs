use crate::ema::Ema;
use crate::Indicator;

/// MACD (Moving Average Convergence Divergence).
///
/// Composed of three EMAs:
/// - Fast EMA (default span 12)
/// - Slow EMA (default span 26)
/// - Signal EMA (default span 9), smoothing the MACD line
///
/// All three use the first-value-seeded recursive EMA, so output is
/// available from the first bar onward.
#[derive(Debug, Clone)]
pub struct Macd {
    fast_ema: Ema,
    slow_ema: Ema,
    signal_ema: Ema,
    macd_line: Option<f64>,
    signal_line: Option<f64>,
}

/// MACD output with all three components.
#[derive(Debug, Clone, Copy)]
pub struct MacdOutput {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

impl Macd {
    pub fn new(fast_span: usize, slow_span: usize, signal_span: usize) -> Self {
        assert!(fast_span < slow_span, "Fast span must be less than slow span");
        Self {
            fast_ema: Ema::span(fast_span),
            slow_ema: Ema::span(slow_span),
            signal_ema: Ema::span(signal_span),
            macd_line: None,
            signal_line: None,
        }
    }

    /// Standard MACD (12, 26, 9).
    pub fn default_spans() -> Self {
        Self::new(12, 26, 9)
    }

    /// Returns the full MACD output (macd, signal, histogram) if ready.
    pub fn output(&self) -> Option<MacdOutput> {
        match (self.macd_line, self.signal_line) {
            (Some(macd), Some(signal)) => Some(MacdOutput {
                macd,
                signal,
                histogram: macd - signal,
            }),
            _ => None,
        }
    }

    /// Process next close and return full output if ready.
    pub fn next_output(&mut self, value: f64) -> Option<MacdOutput> {
        let fast = self.fast_ema.next(value);
        let slow = self.slow_ema.next(value);

        if let (Some(f), Some(s)) = (fast, slow) {
            let macd = f - s;
            self.macd_line = Some(macd);
            self.signal_line = self.signal_ema.next(macd);
        }

        self.output()
    }
}

impl Indicator for Macd {
    fn next(&mut self, value: f64) -> Option<f64> {
        self.next_output(value).map(|o| o.macd)
    }

    fn reset(&mut self) {
        self.fast_ema.reset();
        self.slow_ema.reset();
        self.signal_ema.reset();
        self.macd_line = None;
        self.signal_line = None;
    }

    fn period(&self) -> usize {
        self.slow_ema.period()
    }

    fn is_ready(&self) -> bool {
        self.signal_line.is_some()
    }
}
