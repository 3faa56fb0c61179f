//! Error types for boltz-engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Worker pool needs at least one thread")]
    NoWorkers,

    #[error("Result refresh interval must be positive")]
    ZeroRefresh,

    #[error("Relaxation time must be finite and above 0.5, got {0}")]
    BadTau(f64),

    #[error("Acceleration must be finite, got {0}")]
    BadAccel(f64),

    #[error("Edge density must be positive and finite, got {0}")]
    BadEdgeDensity(f64),

    #[error("Edge speed magnitude must stay below 1, got {0}")]
    BadEdgeSpeed(f64),

    #[error("Obstacle mask has no cells: {rows}x{cols}")]
    EmptyGrid { rows: usize, cols: usize },

    #[error("Failed to spawn thread: {0}")]
    Spawn(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
