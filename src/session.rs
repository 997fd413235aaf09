//! Session records and end-of-session aggregation
//!
//! A session record is what the storage collaborator persists: the turn
//! log, the fused VAD timeline, the tips surfaced, and a mean-VAD summary
//! computed once at session end. The wire format is camelCase to match
//! stored sessions.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bucket::Bucket;
use crate::error::EngineError;
use crate::tips::CbtTip;
use crate::types::{TimedVad, Vad};

/// Who spoke a transcript turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    User,
    Coach,
}

/// One transcript turn with its standalone VAD annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRecord {
    pub id: String,
    pub speaker: Speaker,
    pub text: String,
    /// Turn timestamp (ms since epoch)
    pub t: i64,
    pub vad: Vad,
}

/// A tip surfaced during the session, with when it was shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TipEvent {
    pub id: String,
    pub bucket: Bucket,
    pub insight: String,
    pub action: String,
    /// When the tip was surfaced (ms since epoch)
    pub t: i64,
}

impl TipEvent {
    pub fn from_tip(tip: &CbtTip, t: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            bucket: tip.bucket,
            insight: tip.insight.to_string(),
            action: tip.action.to_string(),
            t,
        }
    }
}

/// Mean V/A/D over a recorded timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub avg_v: f64,
    pub avg_a: f64,
    pub avg_d: f64,
}

/// Reduces a stored VAD time series to its per-axis means.
pub struct SessionAggregator;

impl SessionAggregator {
    /// An empty timeline summarizes to zeros, not an error.
    pub fn summarize(timeline: &[TimedVad]) -> SessionSummary {
        if timeline.is_empty() {
            return SessionSummary {
                avg_v: 0.0,
                avg_a: 0.0,
                avg_d: 0.0,
            };
        }
        let n = timeline.len() as f64;
        let (sum_v, sum_a, sum_d) = timeline.iter().fold((0.0, 0.0, 0.0), |acc, point| {
            (
                acc.0 + point.vad.v,
                acc.1 + point.vad.a,
                acc.2 + point.vad.d,
            )
        });
        SessionSummary {
            avg_v: sum_v / n,
            avg_a: sum_a / n,
            avg_d: sum_d / n,
        }
    }
}

/// Complete record of one coaching session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub turns: Vec<TurnRecord>,
    pub vad_timeline: Vec<TimedVad>,
    pub tips_used: Vec<TipEvent>,
    pub summary: SessionSummary,
}

impl SessionRecord {
    pub fn to_json(&self) -> Result<String, EngineError> {
        serde_json::to_string_pretty(self).map_err(EngineError::JsonError)
    }

    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        serde_json::from_str(json).map_err(EngineError::JsonError)
    }
}

/// Top-N token counts across user turns, for reporting word clouds.
/// Ties break alphabetically so the output is deterministic.
pub fn token_frequencies(turns: &[TurnRecord], top_n: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for turn in turns {
        if turn.speaker != Speaker::User {
            continue;
        }
        for token in crate::text::tokenize(&turn.text) {
            *counts.entry(token).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(top_n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn timed(t: i64, v: f64, a: f64, d: f64) -> TimedVad {
        TimedVad {
            t,
            vad: Vad { v, a, d },
        }
    }

    fn user_turn(text: &str, t: i64) -> TurnRecord {
        TurnRecord {
            id: format!("turn-{t}"),
            speaker: Speaker::User,
            text: text.to_string(),
            t,
            vad: Vad {
                v: 0.5,
                a: 0.5,
                d: 0.5,
            },
        }
    }

    #[test]
    fn test_summary_of_empty_timeline_is_zero() {
        let summary = SessionAggregator::summarize(&[]);
        assert_eq!(summary.avg_v, 0.0);
        assert_eq!(summary.avg_a, 0.0);
        assert_eq!(summary.avg_d, 0.0);
    }

    #[test]
    fn test_summary_means() {
        let timeline = vec![
            timed(0, 0.2, 0.4, 0.6),
            timed(500, 0.4, 0.6, 0.8),
            timed(1_000, 0.6, 0.8, 1.0),
        ];
        let summary = SessionAggregator::summarize(&timeline);
        assert!((summary.avg_v - 0.4).abs() < 1e-12);
        assert!((summary.avg_a - 0.6).abs() < 1e-12);
        assert!((summary.avg_d - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_token_frequencies_user_turns_only() {
        let turns = vec![
            user_turn("good good progress", 0),
            TurnRecord {
                speaker: Speaker::Coach,
                ..user_turn("good good good good", 1)
            },
            user_turn("progress today", 2),
        ];
        let freq = token_frequencies(&turns, 10);
        assert_eq!(
            freq,
            vec![
                ("good".to_string(), 2),
                ("progress".to_string(), 2),
                ("today".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_token_frequencies_truncates() {
        let turns = vec![user_turn("one two three four", 0)];
        assert_eq!(token_frequencies(&turns, 2).len(), 2);
    }

    #[test]
    fn test_record_json_round_trip() {
        let record = SessionRecord {
            id: "session-1".to_string(),
            created_at: Utc::now(),
            turns: vec![user_turn("i feel okay", 100)],
            vad_timeline: vec![timed(100, 0.5, 0.3, 0.6)],
            tips_used: vec![TipEvent {
                id: "tip-1".to_string(),
                bucket: Bucket::Neutral,
                insight: "Balanced state.".to_string(),
                action: "Reflect.".to_string(),
                t: 200,
            }],
            summary: SessionAggregator::summarize(&[timed(100, 0.5, 0.3, 0.6)]),
        };

        let json = record.to_json().unwrap();
        let parsed = SessionRecord::from_json(&json).unwrap();
        assert_eq!(parsed, record);

        // camelCase wire names, as persisted.
        assert!(json.contains("\"vadTimeline\""));
        assert!(json.contains("\"tipsUsed\""));
        assert!(json.contains("\"createdAt\""));
    }
}
