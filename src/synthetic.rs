//! Synthetic fallback signal generators
//!
//! When a capture device is denied or absent, the affected modality
//! switches to one of these oscillatory generators so downstream
//! consumers keep receiving plausible bounded values. Outputs stay in the
//! same declared ranges as the device-backed extractors.

use crate::fusion::clamp_unit;
use crate::smoothing::{Ema, AROUSAL_ALPHA};
use crate::sources::{AudioSignalSource, FaceSignalSource};
use crate::types::{AudioProxies, FaceProxies};

/// Synthetic-path arousal mix leans harder on mouth movement than the
/// device path does.
const SYNTH_MOUTH_WEIGHT: f64 = 0.5;
const SYNTH_SMILE_WEIGHT: f64 = 0.3;
const SYNTH_EYE_WEIGHT: f64 = 0.2;

/// Slow-oscillation audio stand-in.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticAudioSource;

impl SyntheticAudioSource {
    pub fn new() -> Self {
        Self
    }
}

impl AudioSignalSource for SyntheticAudioSource {
    fn sample(&mut self, now_ms: i64) -> AudioProxies {
        let t = now_ms as f64 / 1000.0;
        let rms = clamp_unit(0.4 + 0.2 * (t * 1.7).sin());
        let pitch_hz = 180.0 + 40.0 * (t * 0.9).sin();
        let arousal = clamp_unit(0.6 * rms + 0.4 * (t * 0.7).cos().abs());
        AudioProxies {
            rms,
            pitch_hz,
            arousal,
        }
    }

    fn label(&self) -> &'static str {
        "audio:synthetic"
    }
}

/// Slow-oscillation face stand-in, EMA-smoothed like the device path.
#[derive(Debug, Clone, Default)]
pub struct SyntheticFaceSource {
    arousal_ema: Ema,
}

impl SyntheticFaceSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FaceSignalSource for SyntheticFaceSource {
    fn sample(&mut self, now_ms: i64) -> FaceProxies {
        let t = now_ms as f64 / 1000.0;
        let smile = clamp_unit(0.5 + 0.3 * (t * 0.8).sin());
        let mouth = clamp_unit(0.4 + 0.3 * (t * 1.2).sin().max(0.0));
        let brow = clamp_unit(0.5 + 0.2 * (t * 0.6 + 1.0).sin());
        let eye = clamp_unit(0.5 + 0.2 * (t * 1.1).cos());

        let raw = clamp_unit(
            SYNTH_MOUTH_WEIGHT * mouth + SYNTH_SMILE_WEIGHT * smile + SYNTH_EYE_WEIGHT * (1.0 - eye),
        );
        let face_arousal = self.arousal_ema.update(raw, AROUSAL_ALPHA);

        FaceProxies {
            smile_index: smile,
            mouth_open: mouth,
            brow_distance: brow,
            eye_aspect: eye,
            face_arousal,
        }
    }

    fn label(&self) -> &'static str {
        "face:synthetic"
    }
}
