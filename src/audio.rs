//! Audio feature extraction
//!
//! Computes per-block RMS energy and a coarse autocorrelation pitch
//! estimate, then mixes them into a smoothed arousal proxy. Blocks arrive
//! from an external capture collaborator as fixed-size floats in [-1,1].

use std::collections::VecDeque;

use crate::fusion::clamp_unit;
use crate::smoothing::{variance, Ema, AROUSAL_ALPHA};
use crate::types::AudioProxies;

/// Reference ceiling for RMS normalization, tuned for typical speech
/// loudness rather than derived from calibration.
const RMS_REFERENCE: f64 = 0.2;

/// Pitch search band (Hz).
const PITCH_MIN_HZ: f64 = 60.0;
const PITCH_MAX_HZ: f64 = 800.0;

/// Candidate lags are stepped by 2 samples for speed.
const LAG_STEP: usize = 2;

/// Pitch samples retained for the variance term.
const PITCH_WINDOW: usize = 25;

/// Fixed scale for mapping pitch variance into [0,1].
const PITCH_VARIANCE_SCALE: f64 = 2000.0;

/// Arousal mix weights: RMS dominates, pitch variability adds color.
const RMS_WEIGHT: f64 = 0.7;
const PITCH_VARIANCE_WEIGHT: f64 = 0.3;

/// Root-mean-square of one audio block. Empty blocks read as silence.
pub fn rms_energy(block: &[f32]) -> f64 {
    if block.is_empty() {
        return 0.0;
    }
    let sum_squares: f64 = block.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum_squares / block.len() as f64).sqrt()
}

/// RMS normalized against the speech-loudness reference and clamped to
/// [0,1].
pub fn normalized_rms(block: &[f32]) -> f64 {
    clamp_unit(rms_energy(block) / RMS_REFERENCE)
}

/// Coarse pitch estimate via time-domain autocorrelation.
///
/// Searches lags covering 60-800 Hz at the given sample rate, keeping the
/// lag with maximum correlation. Returns 0 Hz when no candidate shows
/// positive correlation (silence or unvoiced input).
pub fn estimate_pitch_hz(block: &[f32], sample_rate: u32) -> f64 {
    if block.is_empty() || sample_rate == 0 {
        return 0.0;
    }
    let min_lag = (sample_rate as f64 / PITCH_MAX_HZ).floor() as usize;
    let max_lag = (sample_rate as f64 / PITCH_MIN_HZ).floor() as usize;

    let mut best_lag = 0usize;
    let mut best_corr = 0.0f64;
    let mut lag = min_lag.max(1);
    while lag <= max_lag {
        let mut corr = 0.0f64;
        let mut i = 0usize;
        while i + lag < block.len() {
            corr += block[i] as f64 * block[i + lag] as f64;
            i += 1;
        }
        if corr > best_corr {
            best_corr = corr;
            best_lag = lag;
        }
        lag += LAG_STEP;
    }

    if best_lag > 0 {
        sample_rate as f64 / best_lag as f64
    } else {
        0.0
    }
}

/// Stateful audio extractor: tracks recent pitch history for the variance
/// term and smooths the arousal output.
#[derive(Debug, Clone)]
pub struct AudioAnalyzer {
    sample_rate: u32,
    pitch_window: VecDeque<f64>,
    arousal_ema: Ema,
}

impl AudioAnalyzer {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            pitch_window: VecDeque::with_capacity(PITCH_WINDOW),
            arousal_ema: Ema::new(),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Extract proxies from one capture block.
    ///
    /// The pitch-variance term is computed over history *before* this
    /// block's pitch is recorded, so a sudden jump registers as
    /// variability on the following block.
    pub fn analyze_block(&mut self, block: &[f32]) -> AudioProxies {
        let rms = normalized_rms(block);
        let pitch_hz = estimate_pitch_hz(block, self.sample_rate);

        let history: Vec<f64> = self.pitch_window.iter().copied().collect();
        let pitch_var = clamp_unit(variance(&history) / PITCH_VARIANCE_SCALE);

        let raw_arousal = clamp_unit(RMS_WEIGHT * rms + PITCH_VARIANCE_WEIGHT * pitch_var);
        let arousal = self.arousal_ema.update(raw_arousal, AROUSAL_ALPHA);

        self.pitch_window.push_back(pitch_hz);
        while self.pitch_window.len() > PITCH_WINDOW {
            self.pitch_window.pop_front();
        }

        AudioProxies {
            rms,
            pitch_hz,
            arousal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine_block(freq_hz: f64, sample_rate: u32, len: usize, amplitude: f32) -> Vec<f32> {
        (0..len)
            .map(|i| {
                let t = i as f64 / sample_rate as f64;
                amplitude * (2.0 * std::f64::consts::PI * freq_hz * t).sin() as f32
            })
            .collect()
    }

    #[test]
    fn test_rms_of_silence_is_zero() {
        assert_eq!(rms_energy(&[]), 0.0);
        assert_eq!(rms_energy(&[0.0; 256]), 0.0);
    }

    #[test]
    fn test_rms_of_full_scale_square() {
        let block = vec![1.0f32; 512];
        assert!((rms_energy(&block) - 1.0).abs() < 1e-9);
        // Normalization saturates well below full scale.
        assert_eq!(normalized_rms(&block), 1.0);
    }

    #[test]
    fn test_rms_normalization_reference() {
        // A constant block at the 0.2 reference level normalizes to 1.0.
        let block = vec![0.2f32; 512];
        assert!((normalized_rms(&block) - 1.0).abs() < 1e-6);

        let quiet = vec![0.1f32; 512];
        assert!((normalized_rms(&quiet) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_pitch_recovers_sine_frequency() {
        let sample_rate = 44_100;
        let freq = 220.0;
        let block = sine_block(freq, sample_rate, 2048, 0.8);
        let estimated = estimate_pitch_hz(&block, sample_rate);

        // The winning lag is quantized to the 2-sample step, so allow the
        // corresponding frequency error around 220 Hz.
        let lag = sample_rate as f64 / freq;
        let tolerance = (sample_rate as f64 / (lag - 2.0)) - freq;
        assert!(
            (estimated - freq).abs() <= tolerance + 1.0,
            "estimated {estimated} Hz for {freq} Hz input"
        );
    }

    #[test]
    fn test_pitch_of_silence_is_zero() {
        assert_eq!(estimate_pitch_hz(&[0.0; 2048], 44_100), 0.0);
        assert_eq!(estimate_pitch_hz(&[], 44_100), 0.0);
    }

    #[test]
    fn test_pitch_band_limits() {
        let sample_rate = 44_100;
        // 120 Hz is inside the band and should be found near itself, not
        // at a harmonic outside [60, 800].
        let block = sine_block(120.0, sample_rate, 4096, 0.8);
        let estimated = estimate_pitch_hz(&block, sample_rate);
        assert!((60.0..=800.0).contains(&estimated));
    }

    #[test]
    fn test_analyzer_arousal_bounded_and_smoothed() {
        let mut analyzer = AudioAnalyzer::new(44_100);
        let loud = sine_block(200.0, 44_100, 2048, 0.9);

        let first = analyzer.analyze_block(&loud);
        assert!((0.0..=1.0).contains(&first.arousal));

        // First call self-seeds the EMA, so arousal equals the raw mix.
        let raw = clamp_unit(RMS_WEIGHT * first.rms);
        assert!((first.arousal - raw).abs() < 1e-9);

        // A sudden drop to silence moves arousal only partway down.
        let second = analyzer.analyze_block(&[0.0; 2048]);
        assert!(second.arousal > 0.0);
        assert!(second.arousal < first.arousal);
    }

    #[test]
    fn test_analyzer_pitch_window_is_bounded() {
        let mut analyzer = AudioAnalyzer::new(44_100);
        let block = sine_block(180.0, 44_100, 1024, 0.5);
        for _ in 0..(PITCH_WINDOW + 10) {
            analyzer.analyze_block(&block);
        }
        assert!(analyzer.pitch_window.len() <= PITCH_WINDOW);
    }
}
