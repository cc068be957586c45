use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    /// `None` means the observation store is unconfigured; reads surface as
    /// "storage unavailable" instead of failing startup.
    pub database_url: Option<String>,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Maximum number of store identifiers bound into a single read.
    pub query_chunk_size: usize,
    /// How far back scope-level reads look, in days.
    pub geo_lookback_days: u32,
    /// Default cap on the per-store signal list.
    pub signal_limit: usize,
    pub cache_max_age_secs: u64,
    pub thresholds_path: Option<PathBuf>,
    pub national_baseline_path: Option<PathBuf>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("query_chunk_size", &self.query_chunk_size)
            .field("geo_lookback_days", &self.geo_lookback_days)
            .field("signal_limit", &self.signal_limit)
            .field("cache_max_age_secs", &self.cache_max_age_secs)
            .field("thresholds_path", &self.thresholds_path)
            .field("national_baseline_path", &self.national_baseline_path)
            .finish()
    }
}
