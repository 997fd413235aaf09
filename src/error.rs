//! Error types for BeMore Core

use thiserror::Error;

/// Errors that can occur at engine construction or IO boundaries.
///
/// The numeric core itself never fails: NaN, empty windows, and zero-weight
/// pairs all resolve to defined neutral values so a fusion tick can never
/// stall the scheduler.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Buffer capacity must be positive, got {0}")]
    InvalidCapacity(usize),

    #[error("Fusion weight '{name}' must be non-negative, got {value}")]
    InvalidWeight { name: &'static str, value: f64 },

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}
