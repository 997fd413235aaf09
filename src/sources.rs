//! Modality signal sources
//!
//! The fusion engine pulls per-tick proxies through the source traits
//! below, so the numeric core never branches on where a signal came from.
//! Device-backed sources are fed by external capture collaborators;
//! synthetic fallbacks (see [`crate::synthetic`]) implement the same
//! traits and are selected once, at capability-detection time.

use tracing::warn;

use crate::audio::AudioAnalyzer;
use crate::face::{BlendshapeScores, FaceAnalyzer};
use crate::synthetic::{SyntheticAudioSource, SyntheticFaceSource};
use crate::types::{AudioProxies, FaceProxies};

/// Per-tick audio proxy provider.
pub trait AudioSignalSource {
    fn sample(&mut self, now_ms: i64) -> AudioProxies;

    /// Feed one capture block. Sources without a device feed ignore it.
    fn push_block(&mut self, _block: Vec<f32>) {}

    /// Short label for mode-change logging.
    fn label(&self) -> &'static str;
}

/// Per-tick facial proxy provider.
pub trait FaceSignalSource {
    fn sample(&mut self, now_ms: i64) -> FaceProxies;

    /// Feed one frame of blendshape scores. Sources without a device
    /// feed ignore it.
    fn push_scores(&mut self, _scores: BlendshapeScores) {}

    fn label(&self) -> &'static str;
}

/// Device-backed audio source fed with capture blocks.
///
/// The capture collaborator pushes blocks as they arrive; each tick
/// analyzes the most recent unprocessed block, or repeats the last
/// proxies when no new block has landed.
#[derive(Debug)]
pub struct CapturedAudioSource {
    analyzer: AudioAnalyzer,
    pending: Option<Vec<f32>>,
    last: AudioProxies,
}

impl CapturedAudioSource {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            analyzer: AudioAnalyzer::new(sample_rate),
            pending: None,
            last: AudioProxies {
                rms: 0.0,
                pitch_hz: 0.0,
                arousal: 0.0,
            },
        }
    }

}

impl AudioSignalSource for CapturedAudioSource {
    fn sample(&mut self, _now_ms: i64) -> AudioProxies {
        if let Some(block) = self.pending.take() {
            self.last = self.analyzer.analyze_block(&block);
        }
        self.last
    }

    /// Accept one capture block (floats in [-1,1]). A block arriving
    /// before the previous one was consumed replaces it; extraction runs
    /// at tick rate, not capture rate.
    fn push_block(&mut self, block: Vec<f32>) {
        self.pending = Some(block);
    }

    fn label(&self) -> &'static str {
        "audio:device"
    }
}

/// Device-backed face source fed with blendshape frames.
#[derive(Debug, Default)]
pub struct CapturedFaceSource {
    analyzer: FaceAnalyzer,
    pending: Option<BlendshapeScores>,
    last: FaceProxies,
}

impl CapturedFaceSource {
    pub fn new() -> Self {
        Self::default()
    }

}

impl FaceSignalSource for CapturedFaceSource {
    fn sample(&mut self, _now_ms: i64) -> FaceProxies {
        if let Some(scores) = self.pending.take() {
            self.last = self.analyzer.analyze(&scores);
        }
        self.last
    }

    /// Accept one frame of named blendshape scores.
    fn push_scores(&mut self, scores: BlendshapeScores) {
        self.pending = Some(scores);
    }

    fn label(&self) -> &'static str {
        "face:device"
    }
}

/// Pick the device-backed audio source when capture is available,
/// otherwise fall back to the synthetic generator. Fallback is a mode
/// change worth logging, never an error.
pub fn select_audio_source(capture: Option<CapturedAudioSource>) -> Box<dyn AudioSignalSource> {
    match capture {
        Some(source) => Box::new(source),
        None => {
            warn!("audio capture unavailable, switching to synthetic fallback");
            Box::new(SyntheticAudioSource::new())
        }
    }
}

/// Pick the device-backed face source or the synthetic fallback.
pub fn select_face_source(capture: Option<CapturedFaceSource>) -> Box<dyn FaceSignalSource> {
    match capture {
        Some(source) => Box::new(source),
        None => {
            warn!("face capture unavailable, switching to synthetic fallback");
            Box::new(SyntheticFaceSource::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captured_audio_repeats_last_without_new_block() {
        let mut source = CapturedAudioSource::new(44_100);
        source.push_block(vec![0.2f32; 1024]);

        let first = source.sample(1_000);
        assert!(first.rms > 0.0);

        // No new block: identical proxies, no re-analysis drift.
        let second = source.sample(1_500);
        assert_eq!(first, second);
    }

    #[test]
    fn test_captured_audio_newest_block_wins() {
        let mut source = CapturedAudioSource::new(44_100);
        source.push_block(vec![0.9f32; 1024]);
        source.push_block(vec![0.0f32; 1024]);

        let proxies = source.sample(1_000);
        assert_eq!(proxies.rms, 0.0);
    }

    #[test]
    fn test_captured_face_starts_neutral() {
        let mut source = CapturedFaceSource::new();
        let proxies = source.sample(1_000);
        assert_eq!(proxies, FaceProxies::default());
    }

    #[test]
    fn test_selection_prefers_device() {
        let device = select_audio_source(Some(CapturedAudioSource::new(44_100)));
        assert_eq!(device.label(), "audio:device");

        let fallback = select_audio_source(None);
        assert_eq!(fallback.label(), "audio:synthetic");

        let face_fallback = select_face_source(None);
        assert_eq!(face_fallback.label(), "face:synthetic");
    }
}
