use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
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

/// Where dashboard data comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSourceKind {
    /// A YAML snapshot on disk.
    Static,
    /// The live Business Profile APIs.
    Remote,
}

impl std::fmt::Display for DataSourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSourceKind::Static => write!(f, "static"),
            DataSourceKind::Remote => write!(f, "remote"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub data_source: DataSourceKind,
    pub snapshot_path: PathBuf,
    /// Opaque bearer credential for the Business Profile APIs.
    pub gbp_access_token: Option<String>,
    /// `accounts/{id}`; the first listed account is used when unset.
    pub gbp_account: Option<String>,
    pub gbp_timeout_secs: u64,
    pub gbp_max_concurrent_locations: usize,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_timeout_secs: u64,
    /// Bearer keys accepted by the HTTP server.
    pub api_keys: Vec<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("data_source", &self.data_source)
            .field("snapshot_path", &self.snapshot_path)
            .field(
                "gbp_access_token",
                &self.gbp_access_token.as_ref().map(|_| "[redacted]"),
            )
            .field("gbp_account", &self.gbp_account)
            .field("gbp_timeout_secs", &self.gbp_timeout_secs)
            .field(
                "gbp_max_concurrent_locations",
                &self.gbp_max_concurrent_locations,
            )
            .field(
                "gemini_api_key",
                &self.gemini_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("gemini_model", &self.gemini_model)
            .field("gemini_timeout_secs", &self.gemini_timeout_secs)
            .field("api_keys", &format_args!("[{} redacted]", self.api_keys.len()))
            .finish()
    }
}
