use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThresholdsError {
    #[error("failed to read thresholds file at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse thresholds file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid thresholds: {0}")]
    Invalid(String),
}
