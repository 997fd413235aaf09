//! BeMore Core - On-device multimodal affect fusion engine
//!
//! Ingests noisy, low-rate behavioral signals (voice energy and pitch,
//! facial-expression proxies, text-derived sentiment) and fuses them,
//! every tick, into a bounded valence-arousal-dominance estimate, then
//! classifies that estimate into a discrete affect bucket driving
//! rotating, deterministic coaching suggestions.
//!
//! ## Pipeline
//!
//! extraction (audio / face / text) → weighted fusion → windowed bucket
//! classification → tip rotation → session aggregation
//!
//! Device capture, UI, and persistence are external collaborators; this
//! crate only consumes their samples and produces bounded estimates.

pub mod audio;
pub mod bucket;
pub mod buffer;
pub mod engine;
pub mod error;
pub mod face;
pub mod fusion;
pub mod session;
pub mod smoothing;
pub mod sources;
pub mod synthetic;
pub mod text;
pub mod tips;
pub mod types;

pub use bucket::Bucket;
pub use buffer::BoundedSeriesBuffer;
pub use engine::{AffectEngine, EngineConfig, TickOutput};
pub use error::EngineError;
pub use fusion::fuse;
pub use session::{SessionAggregator, SessionRecord, Speaker};
pub use tips::{CbtTip, TipRotator};
pub use types::{Frame, FusionWeights, ModalitySignal, Vad};

/// Engine version embedded in serialized session records
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for serialized payloads
pub const PRODUCER_NAME: &str = "bemore-core";
