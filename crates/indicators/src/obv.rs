use crate::Indicator;

/// On-Balance Volume (OBV).
///
/// Running signed-volume accumulator seeded at 0 on the first bar: volume is
/// added on an up close, subtracted on a down close, and the total is carried
/// unchanged when the close is flat.
#[derive(Debug, Clone, Default)]
pub struct Obv {
    prev_close: Option<f64>,
    total: f64,
}

impl Obv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process the next bar's close and volume; always defined.
    pub fn next_bar(&mut self, close: f64, volume: f64) -> f64 {
        match self.prev_close {
            None => {}
            Some(prev) => {
                if close > prev {
                    self.total += volume;
                } else if close < prev {
                    self.total -= volume;
                }
            }
        }
        self.prev_close = Some(close);
        self.total
    }

    pub fn value(&self) -> Option<f64> {
        self.prev_close.map(|_| self.total)
    }
}

impl Indicator for Obv {
    fn next(&mut self, value: f64) -> Option<f64> {
        // Simplified: unit volume per bar.
        Some(self.next_bar(value, 1.0))
    }

    fn reset(&mut self) {
        self.prev_close = None;
        self.total = 0.0;
    }

    fn period(&self) -> usize {
        1
    }

    fn is_ready(&self) -> bool {
        self.prev_close.is_some()
    }
}
