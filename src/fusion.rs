//! Weighted VAD fusion
//!
//! Combines one tick's modality proxies into a single valence-arousal-
//! dominance estimate. Valence and arousal are normalized convex
//! combinations of their two channels; dominance has a single channel
//! whose weight acts as a damping multiplier. That asymmetry is part of
//! the shipped behavior and is kept as-is.

use crate::types::{Frame, FusionWeights, Vad};

/// Clamp to [0,1]. NaN resolves to the lower bound and never propagates.
pub fn clamp_unit(x: f64) -> f64 {
    clamp(x, 0.0, 1.0)
}

/// Clamp to [min,max], mapping NaN to `min`.
pub fn clamp(x: f64, min: f64, max: f64) -> f64 {
    if x.is_nan() {
        return min;
    }
    x.clamp(min, max)
}

/// Blend a weighted channel pair, normalizing by the weight sum.
///
/// A zero-weight pair means no signal contributes; that resolves to the
/// neutral 0.5 midpoint rather than dividing by zero.
fn blend_pair(w_first: f64, first: f64, w_second: f64, second: f64) -> f64 {
    let weight_sum = w_first + w_second;
    if weight_sum <= 0.0 {
        return 0.5;
    }
    clamp_unit((w_first * first + w_second * second) / weight_sum)
}

/// Rescale a [-1,1] lexical score to [0,1].
fn rescale_signed(x: f64) -> f64 {
    x * 0.5 + 0.5
}

/// Fuse one frame of modality proxies into a VAD estimate.
///
/// Absent channels contribute their neutral raw value (0). Every axis is
/// independently clamped to [0,1].
pub fn fuse(frame: &Frame, weights: &FusionWeights) -> Vad {
    // Identity mapping, reserved hook for a future nonlinearity.
    let smile_mapped = clamp_unit(frame.smile_index.or_neutral(0.0));

    let v = blend_pair(
        weights.valence_rule,
        rescale_signed(frame.text_valence.or_neutral(0.0)),
        weights.valence_smile,
        smile_mapped,
    );

    let a = blend_pair(
        weights.arousal_audio,
        frame.audio_arousal.or_neutral(0.0),
        weights.arousal_face,
        frame.face_arousal.or_neutral(0.0),
    );

    let d = clamp_unit(rescale_signed(frame.text_dominance.or_neutral(0.0)) * weights.dominance_text);

    Vad { v, a, d }
}
