//! Error types for the tdlab crate

use thiserror::Error;

/// Main error type for the tdlab crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("non-terminal state '{state}' has no available actions")]
    NoActionsAvailable { state: String },

    #[error("action '{action}' is not legal in state '{state}'")]
    IllegalAction { state: String, action: String },

    #[error("on-policy update for state '{state}' needs the next action")]
    MissingNextAction { state: String },

    #[error("episode already ended; call episode_ended() before acting again")]
    EpisodeOver,

    #[error("position ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("statistics need at least 2 trials, got {trials}")]
    InsufficientTrials { trials: usize },

    #[error("trial series has {got} scores, expected one per snapshot ({expected})")]
    SeriesLength { expected: usize, got: usize },

    #[error("statistics error: {message}")]
    Statistics { message: String },

    #[error("feature vector has {got} entries, expected {expected}")]
    FeatureLength { expected: usize, got: usize },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

impl Error {
    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfiguration {
            message: message.into(),
        }
    }
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
