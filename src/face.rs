//! Facial expression proxies
//!
//! Maps blendshape-style named scores from an external face-capture
//! collaborator onto a small set of bounded expression proxies, plus a
//! smoothed facial arousal mix. These are heuristic rule-based scores,
//! not learned emotion estimates.

use std::collections::HashMap;

use crate::fusion::clamp_unit;
use crate::smoothing::{Ema, AROUSAL_ALPHA};
use crate::types::FaceProxies;

/// Arousal mix weights for device-backed blendshapes.
const MOUTH_WEIGHT: f64 = 0.4;
const SMILE_WEIGHT: f64 = 0.4;
const EYE_WEIGHT: f64 = 0.2;

/// Named blendshape scores for one video frame. Unknown names are
/// ignored; missing names read as 0.
pub type BlendshapeScores = HashMap<String, f64>;

fn score(scores: &BlendshapeScores, name: &str) -> f64 {
    clamp_unit(scores.get(name).copied().unwrap_or(0.0))
}

/// Derive expression proxies from one frame of blendshape scores.
///
/// - smile: average of left/right smile scores
/// - mouth-open: max of mouth-open and jaw-open
/// - brow: centered delta of inner-brow-raise vs average brow-lower
/// - eye openness: 1 minus average blink
pub fn proxies_from_blendshapes(scores: &BlendshapeScores) -> FaceProxies {
    let smile = clamp_unit(
        (score(scores, "mouthSmileLeft") + score(scores, "mouthSmileRight")) / 2.0,
    );
    let mouth = score(scores, "mouthOpen").max(score(scores, "jawOpen"));
    let brow = clamp_unit(
        0.5 + 0.5
            * (score(scores, "browInnerUp")
                - (score(scores, "browDownLeft") + score(scores, "browDownRight")) / 2.0),
    );
    let eye = clamp_unit(1.0 - (score(scores, "eyeBlinkLeft") + score(scores, "eyeBlinkRight")) / 2.0);

    FaceProxies {
        smile_index: smile,
        mouth_open: mouth,
        brow_distance: brow,
        eye_aspect: eye,
        face_arousal: raw_face_arousal(mouth, smile, eye),
    }
}

/// Unsmoothed arousal mix over the expression proxies.
pub(crate) fn raw_face_arousal(mouth: f64, smile: f64, eye: f64) -> f64 {
    clamp_unit(MOUTH_WEIGHT * mouth + SMILE_WEIGHT * smile + EYE_WEIGHT * (1.0 - eye))
}

/// Stateful face extractor: smooths the arousal proxy across frames.
#[derive(Debug, Clone, Default)]
pub struct FaceAnalyzer {
    arousal_ema: Ema,
}

impl FaceAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract proxies from one frame of blendshape scores, smoothing
    /// the arousal output.
    pub fn analyze(&mut self, scores: &BlendshapeScores) -> FaceProxies {
        let mut proxies = proxies_from_blendshapes(scores);
        proxies.face_arousal = self.arousal_ema.update(proxies.face_arousal, AROUSAL_ALPHA);
        proxies
    }
}
