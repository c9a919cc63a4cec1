//! Typed errors for configuration and pose observations

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ObservationError {
    #[error("expected {expected} keypoints, found {found}")]
    KeypointCount { expected: usize, found: usize },

    #[error("keypoint {index} outside the frame: ({x}, {y})")]
    OutOfRange { index: usize, x: f32, y: f32 },
}
