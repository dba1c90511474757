use crate::Indicator;

/// Exponential Moving Average (EMA), recursive form.
///
/// The first emitted value equals the first input value and the recursion
/// proceeds forward with no retroactive correction (matches pandas
/// `ewm(..., adjust=False)`). Two smoothing parameterizations:
/// - `Ema::span(n)`: alpha = 2 / (n + 1), the standard MACD convention.
/// - `Ema::com(c)`:  alpha = 1 / (1 + c), used for KD smoothing.
#[derive(Debug, Clone)]
pub struct Ema {
    len: usize,
    alpha: f64,
    current: Option<f64>,
}

impl Ema {
    /// EMA parameterized by span: alpha = 2 / (span + 1).
    pub fn span(span: usize) -> Self {
        assert!(span > 0, "EMA span must be > 0");
        Self {
            len: span,
            alpha: 2.0 / (span as f64 + 1.0),
            current: None,
        }
    }

    /// EMA parameterized by center-of-mass: alpha = 1 / (1 + com).
    pub fn com(com: f64) -> Self {
        assert!(com >= 0.0, "EMA center-of-mass must be >= 0");
        Self {
            len: 1,
            alpha: 1.0 / (1.0 + com),
            current: None,
        }
    }

    pub fn value(&self) -> Option<f64> {
        self.current
    }

    /// Feed a possibly-undefined value. An undefined input leaves the
    /// smoothing state untouched and yields no output for that step, so an
    /// EMA seeded on an undefined series stays undefined.
    pub fn next_opt(&mut self, value: Option<f64>) -> Option<f64> {
        match value {
            Some(v) => self.next(v),
            None => None,
        }
    }
}

impl Indicator for Ema {
    fn next(&mut self, value: f64) -> Option<f64> {
        let ema = match self.current {
            // Seed from the first available value.
            None => value,
            Some(prev) => self.alpha * value + (1.0 - self.alpha) * prev,
        };
        self.current = Some(ema);
        self.current
    }

    fn reset(&mut self) {
        self.current = None;
    }

    fn period(&self) -> usize {
        self.len
    }

    fn is_ready(&self) -> bool {
        self.current.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-12, "got {a}, expected {b}");
    }

    #[test]
    fn test_first_value_seeds() {
        let mut ema = Ema::span(12);
        assert_eq!(ema.next(100.0), Some(100.0));
    }

    #[test]
    fn test_span_recursion() {
        // span 3 => alpha = 0.5
        let mut ema = Ema::span(3);
        ema.next(2.0);
        // 0.5 * 6 + 0.5 * 2 = 4
        assert_close(ema.next(6.0).unwrap(), 4.0);
        // 0.5 * 8 + 0.5 * 4 = 6
        assert_close(ema.next(8.0).unwrap(), 6.0);
    }

    #[test]
    fn test_com_alpha() {
        // com 2 => alpha = 1/3
        let mut ema = Ema::com(2.0);
        ema.next(3.0);
        // 1/3 * 9 + 2/3 * 3 = 5
        assert_close(ema.next(9.0).unwrap(), 5.0);
    }

    #[test]
    fn test_undefined_input_propagates() {
        let mut ema = Ema::com(2.0);
        assert_eq!(ema.next_opt(None), None);
        assert!(!ema.is_ready());
        // First defined value still seeds normally afterwards.
        assert_eq!(ema.next_opt(Some(7.0)), Some(7.0));
    }
}
