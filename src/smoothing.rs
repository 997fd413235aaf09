//! Exponential smoothing and variance helpers
//!
//! Arousal proxies are jittery at the raw sampling rate; every arousal
//! channel runs through the same self-seeding EMA before fusion.

/// Smoothing factor used at every arousal smoothing site.
pub const AROUSAL_ALPHA: f64 = 0.2;

/// Exponential moving average step.
///
/// Self-seeding: with no previous state the new value passes through
/// unchanged. Otherwise returns `alpha * value + (1 - alpha) * prev`.
pub fn ema(prev: Option<f64>, value: f64, alpha: f64) -> f64 {
    match prev {
        Some(p) => alpha * value + (1.0 - alpha) * p,
        None => value,
    }
}

/// Stateful EMA filter wrapping [`ema`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Ema {
    state: Option<f64>,
}

impl Ema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one value and return the smoothed output.
    pub fn update(&mut self, value: f64, alpha: f64) -> f64 {
        let next = ema(self.state, value, alpha);
        self.state = Some(next);
        next
    }

    /// Discard smoothing history, as when a stream restarts.
    pub fn reset(&mut self) {
        self.state = None;
    }
}

/// Population variance. Empty input yields 0.
pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ema_self_seeds() {
        assert_eq!(ema(None, 0.7, 0.2), 0.7);
    }

    #[test]
    fn test_ema_blend() {
        // 0.2 * 1.0 + 0.8 * 0.5 = 0.6
        assert!((ema(Some(0.5), 1.0, 0.2) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_stateful_ema_tracks_history() {
        let mut filter = Ema::new();
        assert_eq!(filter.update(0.5, 0.2), 0.5);
        let second = filter.update(1.0, 0.2);
        assert!((second - 0.6).abs() < 1e-12);

        filter.reset();
        assert_eq!(filter.update(0.9, 0.2), 0.9);
    }

    #[test]
    fn test_variance_empty_is_zero() {
        assert_eq!(variance(&[]), 0.0);
    }

    #[test]
    fn test_variance_constant_is_zero() {
        assert_eq!(variance(&[3.0, 3.0, 3.0]), 0.0);
    }

    #[test]
    fn test_variance_known_value() {
        // Values 2 and 4: mean 3, variance ((1)+(1))/2 = 1
        assert!((variance(&[2.0, 4.0]) - 1.0).abs() < 1e-12);
    }
}
