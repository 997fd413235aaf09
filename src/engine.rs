//! Tick-driven fusion engine
//!
//! Orchestrates the full per-tick path: sample each modality source, fuse
//! the frame into a VAD estimate, record it, classify a recent window
//! average into a bucket, and surface the next coaching tip on bucket
//! change. The engine owns no timers; callers inject timestamps through
//! [`AffectEngine::tick`], so the whole pipeline can be driven
//! deterministically in tests or from capture-record timestamps offline.
//!
//! Stopping a stream is unconditional: drop the engine (or just stop
//! calling `tick`) and recorded data stays intact; `finish` turns it into
//! a session record.

use chrono::{DateTime, Utc};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::bucket::Bucket;
use crate::buffer::BoundedSeriesBuffer;
use crate::error::EngineError;
use crate::face::BlendshapeScores;
use crate::fusion::fuse;
use crate::session::{
    SessionAggregator, SessionRecord, Speaker, TipEvent, TurnRecord,
};
use crate::sources::{AudioSignalSource, FaceSignalSource};
use crate::synthetic::{SyntheticAudioSource, SyntheticFaceSource};
use crate::text::analyze_turn;
use crate::tips::TipRotator;
use crate::types::{Frame, FusionWeights, ModalitySignal, TextAffect, TimedVad, Vad};

/// Fusion runs at 2 Hz in the reference deployment.
pub const FUSION_INTERVAL_MS: i64 = 500;

/// Bucket classification averages over this recent window.
pub const DEFAULT_CLASSIFY_WINDOW_MS: i64 = 5_000;

/// Ring capacity for the rolling per-axis series: 120 s at 2 Hz.
pub const DEFAULT_TIMELINE_CAPACITY: usize = 240;

/// Session-start configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub weights: FusionWeights,
    /// Window (ms) averaged before bucket classification
    pub classify_window_ms: i64,
    /// Capacity of the rolling per-axis sample buffers
    pub timeline_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: FusionWeights::default(),
            classify_window_ms: DEFAULT_CLASSIFY_WINDOW_MS,
            timeline_capacity: DEFAULT_TIMELINE_CAPACITY,
        }
    }
}

/// What one fusion tick produced.
#[derive(Debug, Clone)]
pub struct TickOutput {
    pub t: i64,
    /// This tick's fused estimate
    pub vad: Vad,
    /// Bucket of the window-averaged estimate
    pub bucket: Bucket,
    /// Present only when the bucket changed this tick
    pub tip: Option<TipEvent>,
}

/// Stateful multimodal fusion session.
///
/// Single-threaded and cooperative: every buffer write and read happens
/// inside `tick`, which runs to completion before control returns, so a
/// snapshot never observes a half-written push.
pub struct AffectEngine {
    config: EngineConfig,
    audio: Box<dyn AudioSignalSource>,
    face: Box<dyn FaceSignalSource>,
    latest_text: Option<TextAffect>,
    v_series: BoundedSeriesBuffer,
    a_series: BoundedSeriesBuffer,
    d_series: BoundedSeriesBuffer,
    timeline: Vec<TimedVad>,
    turns: Vec<TurnRecord>,
    tips_used: Vec<TipEvent>,
    last_bucket: Option<Bucket>,
    rotator: TipRotator,
    session_id: String,
    created_at: DateTime<Utc>,
}

impl AffectEngine {
    /// Create an engine over the given modality sources.
    ///
    /// Rejects negative fusion weights and a zero timeline capacity.
    pub fn new(
        config: EngineConfig,
        audio: Box<dyn AudioSignalSource>,
        face: Box<dyn FaceSignalSource>,
    ) -> Result<Self, EngineError> {
        config.weights.validate()?;
        let v_series = BoundedSeriesBuffer::new(config.timeline_capacity)?;
        let a_series = BoundedSeriesBuffer::new(config.timeline_capacity)?;
        let d_series = BoundedSeriesBuffer::new(config.timeline_capacity)?;

        debug!(
            audio = audio.label(),
            face = face.label(),
            "affect engine started"
        );

        Ok(Self {
            config,
            audio,
            face,
            latest_text: None,
            v_series,
            a_series,
            d_series,
            timeline: Vec::new(),
            turns: Vec::new(),
            tips_used: Vec::new(),
            last_bucket: None,
            rotator: TipRotator::new(),
            session_id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
        })
    }

    /// Default configuration with both modalities on synthetic fallback.
    pub fn with_synthetic_sources() -> Result<Self, EngineError> {
        Self::new(
            EngineConfig::default(),
            Box::new(SyntheticAudioSource::new()),
            Box::new(SyntheticFaceSource::new()),
        )
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Forward one audio capture block to the audio source. Synthetic
    /// sources ignore it.
    pub fn push_audio_block(&mut self, block: Vec<f32>) {
        self.audio.push_block(block);
    }

    /// Forward one frame of blendshape scores to the face source.
    pub fn push_face_scores(&mut self, scores: BlendshapeScores) {
        self.face.push_scores(scores);
    }

    /// Record one transcript turn. User turns update the lexical channel
    /// used by subsequent ticks; coach turns are recorded only.
    pub fn push_text_turn(&mut self, speaker: Speaker, text: &str, t: i64) -> TextAffect {
        let affect = analyze_turn(text);
        self.turns.push(TurnRecord {
            id: Uuid::new_v4().to_string(),
            speaker,
            text: text.to_string(),
            t,
            vad: affect.as_vad(),
        });
        if speaker == Speaker::User {
            self.latest_text = Some(affect);
        }
        affect
    }

    /// Run one fusion tick at the given timestamp.
    pub fn tick(&mut self, now_ms: i64) -> TickOutput {
        let audio = self.audio.sample(now_ms);
        let face = self.face.sample(now_ms);

        let (text_valence, text_dominance) = match self.latest_text {
            Some(affect) => (
                ModalitySignal::Present(affect.valence),
                ModalitySignal::Present(affect.dominance),
            ),
            None => (ModalitySignal::Absent, ModalitySignal::Absent),
        };

        let frame = Frame {
            t: now_ms,
            face_arousal: ModalitySignal::Present(face.face_arousal),
            audio_arousal: ModalitySignal::Present(audio.arousal),
            text_valence,
            text_dominance,
            smile_index: ModalitySignal::Present(face.smile_index),
        };

        let vad = fuse(&frame, &self.config.weights);
        self.v_series.push(now_ms, vad.v);
        self.a_series.push(now_ms, vad.a);
        self.d_series.push(now_ms, vad.d);
        self.timeline.push(TimedVad { t: now_ms, vad });

        let averaged = self.window_average(now_ms, self.config.classify_window_ms);
        let bucket = Bucket::classify(averaged);
        trace!(t = now_ms, v = vad.v, a = vad.a, d = vad.d, bucket = bucket.as_str(), "tick");

        let tip = if self.last_bucket != Some(bucket) {
            let tip = self.rotator.next_tip(bucket);
            let event = TipEvent::from_tip(tip, now_ms);
            debug!(bucket = bucket.as_str(), action = tip.action, "bucket changed, rotating tip");
            self.tips_used.push(event.clone());
            Some(event)
        } else {
            None
        };
        self.last_bucket = Some(bucket);

        TickOutput {
            t: now_ms,
            vad,
            bucket,
            tip,
        }
    }

    /// Per-axis mean over samples inside `[now_ms - window_ms, now_ms]`.
    /// Axes with no qualifying samples read 0.
    pub fn window_average(&self, now_ms: i64, window_ms: i64) -> Vad {
        Vad {
            v: self.v_series.avg_in_window(now_ms, window_ms),
            a: self.a_series.avg_in_window(now_ms, window_ms),
            d: self.d_series.avg_in_window(now_ms, window_ms),
        }
    }

    /// Full recorded timeline, oldest first.
    pub fn timeline(&self) -> &[TimedVad] {
        &self.timeline
    }

    /// Close the session and produce its record, including the mean-VAD
    /// summary over everything recorded.
    pub fn finish(self) -> SessionRecord {
        let summary = SessionAggregator::summarize(&self.timeline);
        SessionRecord {
            id: self.session_id,
            created_at: self.created_at,
            turns: self.turns,
            vad_timeline: self.timeline,
            tips_used: self.tips_used,
            summary,
        }
    }
}
