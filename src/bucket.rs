//! Discrete affect bucket classification
//!
//! Maps a (window-averaged) VAD estimate onto one of four coarse affect
//! categories. Thresholds are asymmetric on purpose: valence below 0.4
//! reads as "low" while "high" starts above 0.6, leaving a deliberate
//! neutral dead zone between them.

use serde::{Deserialize, Serialize};

use crate::types::Vad;

/// Coarse affect category derived from a VAD estimate.
///
/// Wire tags are the persisted bucket names; changing them would break
/// stored sessions and tip catalogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bucket {
    /// Distressed: low valence with high activation
    #[serde(rename = "lowV_highA")]
    LowValenceHighArousal,
    /// Depleted: low valence with low activation
    #[serde(rename = "lowV_lowA")]
    LowValenceLowArousal,
    /// Empowered: high valence with high dominance
    #[serde(rename = "highV_highD")]
    HighValenceHighDominance,
    #[serde(rename = "neutral")]
    Neutral,
}

impl Bucket {
    pub const COUNT: usize = 4;

    pub const ALL: [Bucket; Bucket::COUNT] = [
        Bucket::LowValenceHighArousal,
        Bucket::LowValenceLowArousal,
        Bucket::HighValenceHighDominance,
        Bucket::Neutral,
    ];

    /// Classify a VAD estimate. Rules are evaluated in order; first match
    /// wins.
    pub fn classify(vad: Vad) -> Bucket {
        if vad.v < 0.4 && vad.a > 0.6 {
            return Bucket::LowValenceHighArousal;
        }
        if vad.v < 0.4 && vad.a <= 0.6 {
            return Bucket::LowValenceLowArousal;
        }
        if vad.v > 0.6 && vad.d > 0.6 {
            return Bucket::HighValenceHighDominance;
        }
        Bucket::Neutral
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::LowValenceHighArousal => "lowV_highA",
            Bucket::LowValenceLowArousal => "lowV_lowA",
            Bucket::HighValenceHighDominance => "highV_highD",
            Bucket::Neutral => "neutral",
        }
    }

    /// Stable position of this bucket in [`Bucket::ALL`].
    pub(crate) fn index(self) -> usize {
        match self {
            Bucket::LowValenceHighArousal => 0,
            Bucket::LowValenceLowArousal => 1,
            Bucket::HighValenceHighDominance => 2,
            Bucket::Neutral => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn vad(v: f64, a: f64, d: f64) -> Vad {
        Vad { v, a, d }
    }

    #[test]
    fn test_low_valence_high_arousal() {
        assert_eq!(
            Bucket::classify(vad(0.2, 0.8, 0.3)),
            Bucket::LowValenceHighArousal
        );
    }

    #[test]
    fn test_low_valence_low_arousal() {
        assert_eq!(
            Bucket::classify(vad(0.2, 0.4, 0.3)),
            Bucket::LowValenceLowArousal
        );
    }

    #[test]
    fn test_high_valence_high_dominance() {
        assert_eq!(
            Bucket::classify(vad(0.7, 0.5, 0.7)),
            Bucket::HighValenceHighDominance
        );
    }

    #[test]
    fn test_neutral_center() {
        assert_eq!(Bucket::classify(vad(0.5, 0.5, 0.5)), Bucket::Neutral);
    }

    #[test]
    fn test_valence_boundary_excluded_from_low() {
        // v == 0.4 is not "low", so high arousal alone cannot produce a
        // low-valence bucket here.
        assert_eq!(Bucket::classify(vad(0.4, 0.8, 0.3)), Bucket::Neutral);
    }

    #[test]
    fn test_valence_boundary_excluded_from_high() {
        assert_eq!(Bucket::classify(vad(0.6, 0.5, 0.9)), Bucket::Neutral);
    }

    #[test]
    fn test_arousal_boundary_goes_low_arousal() {
        // a == 0.6 falls to the low-arousal arm.
        assert_eq!(
            Bucket::classify(vad(0.3, 0.6, 0.5)),
            Bucket::LowValenceLowArousal
        );
    }

    #[test]
    fn test_high_valence_needs_dominance() {
        assert_eq!(Bucket::classify(vad(0.9, 0.5, 0.5)), Bucket::Neutral);
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_string(&Bucket::LowValenceHighArousal).unwrap(),
            "\"lowV_highA\""
        );
        let parsed: Bucket = serde_json::from_str("\"highV_highD\"").unwrap();
        assert_eq!(parsed, Bucket::HighValenceHighDominance);
    }
}
