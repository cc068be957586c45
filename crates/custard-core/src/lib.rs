//! Shared domain types and configuration for the custard flavor-intelligence
//! workspace.

pub mod app_config;
pub mod baseline;
pub mod config;
pub mod observations;
pub mod stores;

pub use app_config::{AppConfig, Environment};
pub use baseline::{load_national_baseline, BaselineFlavor, NationalBaseline};
pub use config::{load_app_config, load_app_config_from_env};
pub use observations::{is_closed_marker, normalize_flavor_key, Observation};
pub use stores::{ScopeRequest, ScopeType, StoreMeta};

use thiserror::Error;

/// Caller-class validation failures. These map to a 400 at the HTTP boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid scope '{0}'; expected one of store, metro, state, national")]
    InvalidScope(String),
    #[error("scope '{0}' requires a region")]
    MissingRegion(ScopeType),
    #[error("store identifier is required")]
    MissingStoreId,
    #[error("{scope} '{region}' resolved to zero stores")]
    EmptyScope { scope: ScopeType, region: String },
    #[error("unknown store '{0}'")]
    UnknownStore(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
    #[error("failed to read national baseline at {path}: {source}")]
    BaselineFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse national baseline: {0}")]
    BaselineFileParse(#[from] serde_json::Error),
    #[error("validation error: {0}")]
    Validation(String),
}
