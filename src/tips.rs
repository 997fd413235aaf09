//! Coaching tip catalog and deterministic rotation
//!
//! Non-clinical CBT-style suggestions, three per bucket in fixed order.
//! Rotation state is owned by whoever creates the [`TipRotator`] (one per
//! session context) and threaded through calls; there is no process-wide
//! index, so concurrent sessions cannot perturb each other's rotation.

use serde::Serialize;

use crate::bucket::Bucket;
use crate::types::Vad;

/// One coaching suggestion: a reflective insight plus a concrete action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CbtTip {
    pub bucket: Bucket,
    pub insight: &'static str,
    pub action: &'static str,
}

/// Fixed catalog size per bucket.
pub const TIPS_PER_BUCKET: usize = 3;

const LOW_V_HIGH_A: [CbtTip; TIPS_PER_BUCKET] = [
    CbtTip {
        bucket: Bucket::LowValenceHighArousal,
        insight: "Noticing high activation with low mood.",
        action: "Try 4-7-8 breathing for 60s.",
    },
    CbtTip {
        bucket: Bucket::LowValenceHighArousal,
        insight: "Thoughts may be racing.",
        action: "Write one worry, challenge it once.",
    },
    CbtTip {
        bucket: Bucket::LowValenceHighArousal,
        insight: "Body signals of stress present.",
        action: "Scan body from head to toe, relax shoulders.",
    },
];

const LOW_V_LOW_A: [CbtTip; TIPS_PER_BUCKET] = [
    CbtTip {
        bucket: Bucket::LowValenceLowArousal,
        insight: "Low energy and low mood detected.",
        action: "Identify one 5-min pleasant activity today.",
    },
    CbtTip {
        bucket: Bucket::LowValenceLowArousal,
        insight: "Motivation seems low.",
        action: "Set a tiny task: 2-min tidy up.",
    },
    CbtTip {
        bucket: Bucket::LowValenceLowArousal,
        insight: "Slowed pace may appear.",
        action: "Step outside for fresh air for 3 mins.",
    },
];

const HIGH_V_HIGH_D: [CbtTip; TIPS_PER_BUCKET] = [
    CbtTip {
        bucket: Bucket::HighValenceHighDominance,
        insight: "Confidence toward goals detected.",
        action: "Break one goal into 3 sub-steps now.",
    },
    CbtTip {
        bucket: Bucket::HighValenceHighDominance,
        insight: "Sense of agency present.",
        action: "Define a next action and a when.",
    },
    CbtTip {
        bucket: Bucket::HighValenceHighDominance,
        insight: "Momentum available.",
        action: "Send a message to request support on your goal.",
    },
];

const NEUTRAL: [CbtTip; TIPS_PER_BUCKET] = [
    CbtTip {
        bucket: Bucket::Neutral,
        insight: "Balanced state.",
        action: "Reflect: what's one helpful thought just now?",
    },
    CbtTip {
        bucket: Bucket::Neutral,
        insight: "Stable moment.",
        action: "Note one strength you used today.",
    },
    CbtTip {
        bucket: Bucket::Neutral,
        insight: "Even keel.",
        action: "Plan a small reward after this session.",
    },
];

/// The full fixed-order catalog for a bucket.
pub fn tips_for_bucket(bucket: Bucket) -> &'static [CbtTip; TIPS_PER_BUCKET] {
    match bucket {
        Bucket::LowValenceHighArousal => &LOW_V_HIGH_A,
        Bucket::LowValenceLowArousal => &LOW_V_LOW_A,
        Bucket::HighValenceHighDominance => &HIGH_V_HIGH_D,
        Bucket::Neutral => &NEUTRAL,
    }
}

/// Per-bucket round-robin tip selection.
///
/// Each bucket rotates independently; asking for one bucket's tip never
/// advances another bucket's index. Calls are order-dependent by design
/// (tip variety), which is why the state lives here and not in a global.
#[derive(Debug, Clone, Default)]
pub struct TipRotator {
    indices: [usize; Bucket::COUNT],
}

impl TipRotator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the current tip for `bucket` and advance that bucket's
    /// rotation index, wrapping at the catalog length.
    pub fn next_tip(&mut self, bucket: Bucket) -> &'static CbtTip {
        let list = tips_for_bucket(bucket);
        let slot = &mut self.indices[bucket.index()];
        let tip = &list[*slot % list.len()];
        *slot = (*slot + 1) % list.len();
        tip
    }

    /// Classify a VAD estimate and rotate within the matching bucket.
    pub fn tip_for_vad(&mut self, vad: Vad) -> (Bucket, &'static CbtTip) {
        let bucket = Bucket::classify(vad);
        (bucket, self.next_tip(bucket))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rotation_wraps_after_catalog_length() {
        let mut rotator = TipRotator::new();
        let catalog = tips_for_bucket(Bucket::Neutral);

        let picks: Vec<&CbtTip> = (0..4).map(|_| rotator.next_tip(Bucket::Neutral)).collect();
        assert_eq!(picks[0], &catalog[0]);
        assert_eq!(picks[1], &catalog[1]);
        assert_eq!(picks[2], &catalog[2]);
        assert_eq!(picks[3], &catalog[0]);
    }

    #[test]
    fn test_buckets_rotate_independently() {
        let mut rotator = TipRotator::new();
        rotator.next_tip(Bucket::Neutral);
        rotator.next_tip(Bucket::Neutral);

        // A different bucket still starts from the top.
        let first = rotator.next_tip(Bucket::LowValenceHighArousal);
        assert_eq!(first, &tips_for_bucket(Bucket::LowValenceHighArousal)[0]);

        // And the first bucket's rotation was not perturbed.
        let third = rotator.next_tip(Bucket::Neutral);
        assert_eq!(third, &tips_for_bucket(Bucket::Neutral)[2]);
    }

    #[test]
    fn test_separate_rotators_do_not_interfere() {
        let mut a = TipRotator::new();
        let mut b = TipRotator::new();
        a.next_tip(Bucket::Neutral);
        a.next_tip(Bucket::Neutral);

        // A fresh rotator is unaffected by another context's calls.
        assert_eq!(
            b.next_tip(Bucket::Neutral),
            &tips_for_bucket(Bucket::Neutral)[0]
        );
    }

    #[test]
    fn test_tip_for_vad_classifies_then_rotates() {
        let mut rotator = TipRotator::new();
        let vad = Vad {
            v: 0.2,
            a: 0.8,
            d: 0.3,
        };
        let (bucket, tip) = rotator.tip_for_vad(vad);
        assert_eq!(bucket, Bucket::LowValenceHighArousal);
        assert_eq!(tip.bucket, Bucket::LowValenceHighArousal);
    }

    #[test]
    fn test_catalog_shape() {
        for bucket in Bucket::ALL {
            let catalog = tips_for_bucket(bucket);
            assert_eq!(catalog.len(), TIPS_PER_BUCKET);
            for tip in catalog {
                assert_eq!(tip.bucket, bucket);
                assert!(!tip.insight.is_empty());
                assert!(!tip.action.is_empty());
            }
        }
    }
}
