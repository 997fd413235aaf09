//! Core types for the BeMore affect pipeline
//!
//! This module defines the data structures that flow through each stage of
//! the pipeline: raw samples, per-tick frames, fusion weights, and the fused
//! valence-arousal-dominance estimate.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// One scalar observation with an epoch-millisecond timestamp.
///
/// Immutable once pushed into a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Timestamp (ms since epoch)
    pub t: i64,
    /// Observed value
    pub v: f64,
}

/// A modality reading that is explicitly present or absent.
///
/// Absence means "no signal from this channel this tick" and is a normal
/// operating state, not an error. Fusion treats an absent reading as the
/// neutral raw value for that channel.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum ModalitySignal {
    Present(f64),
    #[default]
    Absent,
}

impl ModalitySignal {
    /// Returns the reading, or `neutral` when the channel is absent.
    pub fn or_neutral(self, neutral: f64) -> f64 {
        match self {
            ModalitySignal::Present(v) => v,
            ModalitySignal::Absent => neutral,
        }
    }

    pub fn is_present(self) -> bool {
        matches!(self, ModalitySignal::Present(_))
    }
}

impl From<Option<f64>> for ModalitySignal {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) => ModalitySignal::Present(v),
            None => ModalitySignal::Absent,
        }
    }
}

impl From<ModalitySignal> for Option<f64> {
    fn from(signal: ModalitySignal) -> Self {
        match signal {
            ModalitySignal::Present(v) => Some(v),
            ModalitySignal::Absent => None,
        }
    }
}

/// Per-tick snapshot of raw modality proxies prior to fusion.
///
/// Wire format uses camelCase field names so stored frames stay readable
/// by existing collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    /// Tick timestamp (ms since epoch)
    pub t: i64,
    /// Facial arousal proxy, [0,1]
    #[serde(default)]
    pub face_arousal: ModalitySignal,
    /// Audio arousal proxy, [0,1]
    #[serde(default)]
    pub audio_arousal: ModalitySignal,
    /// Lexical valence, [-1,1]
    #[serde(default)]
    pub text_valence: ModalitySignal,
    /// Lexical dominance, [-1,1]
    #[serde(default)]
    pub text_dominance: ModalitySignal,
    /// Smile intensity proxy, [0,1]
    #[serde(default)]
    pub smile_index: ModalitySignal,
}

impl Frame {
    /// A frame with every modality absent.
    pub fn at(t: i64) -> Self {
        Self {
            t,
            face_arousal: ModalitySignal::Absent,
            audio_arousal: ModalitySignal::Absent,
            text_valence: ModalitySignal::Absent,
            text_dominance: ModalitySignal::Absent,
            smile_index: ModalitySignal::Absent,
        }
    }
}

/// Fused affect estimate. Each axis is clamped to [0,1].
///
/// Recomputed wholesale every tick, never partially mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vad {
    /// Valence (displeasure..pleasure)
    pub v: f64,
    /// Arousal (calm..activated)
    pub a: f64,
    /// Dominance (submissive..in control)
    pub d: f64,
}

/// A fused estimate with its tick timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedVad {
    /// Tick timestamp (ms since epoch)
    pub t: i64,
    #[serde(flatten)]
    pub vad: Vad,
}

/// Relative per-channel influence for fusion.
///
/// Weights for a given axis need not sum to 1; fusion normalizes by their
/// sum. `dominance_text` is the exception: dominance has a single channel
/// and its weight acts as a damping multiplier (preserved as designed).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FusionWeights {
    /// Weight of lexical valence in V
    pub valence_rule: f64,
    /// Weight of the smile proxy in V
    pub valence_smile: f64,
    /// Weight of audio arousal in A
    pub arousal_audio: f64,
    /// Weight of facial arousal in A
    pub arousal_face: f64,
    /// Damping multiplier for lexical dominance in D
    pub dominance_text: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            valence_rule: 0.6,
            valence_smile: 0.4,
            arousal_audio: 0.6,
            arousal_face: 0.4,
            dominance_text: 1.0,
        }
    }
}

impl FusionWeights {
    /// Reject negative weights. Zero pairs are legal and resolve to the
    /// neutral midpoint at fusion time.
    pub fn validate(&self) -> Result<(), EngineError> {
        let fields = [
            ("valenceRule", self.valence_rule),
            ("valenceSmile", self.valence_smile),
            ("arousalAudio", self.arousal_audio),
            ("arousalFace", self.arousal_face),
            ("dominanceText", self.dominance_text),
        ];
        for (name, value) in fields {
            if !(value >= 0.0) {
                return Err(EngineError::InvalidWeight { name, value });
            }
        }
        Ok(())
    }
}

/// Per-block audio features after extraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioProxies {
    /// Normalized RMS energy, [0,1]
    pub rms: f64,
    /// Estimated pitch in Hz, 0 when unvoiced/silent
    pub pitch_hz: f64,
    /// Smoothed arousal proxy, [0,1]
    pub arousal: f64,
}

/// Facial expression proxies derived from blendshape-style scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceProxies {
    /// Smile intensity, [0,1]
    pub smile_index: f64,
    /// Mouth openness, [0,1]
    pub mouth_open: f64,
    /// Brow position (0.5 = rest), [0,1]
    pub brow_distance: f64,
    /// Eye openness, [0,1]
    pub eye_aspect: f64,
    /// Smoothed arousal proxy, [0,1]
    pub face_arousal: f64,
}

impl Default for FaceProxies {
    fn default() -> Self {
        Self {
            smile_index: 0.0,
            mouth_open: 0.0,
            brow_distance: 0.5,
            eye_aspect: 0.5,
            face_arousal: 0.0,
        }
    }
}

/// Lexical affect extracted from one text turn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextAffect {
    /// Rule-based valence, [-1,1]
    pub valence: f64,
    /// First-person vs modal-verb dominance, [-1,1]
    pub dominance: f64,
    /// Number of word tokens in the turn
    pub token_count: usize,
}

impl TextAffect {
    /// A standalone turn annotation: valence and dominance rescaled to
    /// [0,1], arousal pinned at the neutral midpoint.
    pub fn as_vad(&self) -> Vad {
        Vad {
            v: (self.valence + 1.0) / 2.0,
            a: 0.5,
            d: (self.dominance + 1.0) / 2.0,
        }
    }
}
