use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("difficulty must be between 1 and {max}, got {got}")]
    InvalidDifficulty { got: usize, max: usize },

    #[error("fee must be a finite number, got {0}")]
    InvalidFee(f64),

    #[error("failed to load persisted chain")]
    Load(#[source] anyhow::Error),

    #[error("persisted chain is corrupt: {0}")]
    Corrupt(String),

    #[error("failed to persist chain")]
    Persist(#[source] anyhow::Error),
}
