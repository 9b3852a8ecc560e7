//! Client configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings needed to reach the API and keep the session on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API root, e.g. `https://api.gigdesk.example`
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    pub user_agent: String,

    /// Directory for the persisted session and logs
    pub data_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 30,
            user_agent: concat!("gigdesk/", env!("CARGO_PKG_VERSION")).to_string(),
            data_dir: default_data_dir(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from defaults, an optional file and `GIGDESK_*`
    /// environment variables, in increasing priority.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a value has the wrong type
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();

        let mut builder = config::Config::builder()
            .set_default("base_url", defaults.base_url)?
            .set_default("timeout_secs", defaults.timeout_secs)?
            .set_default("user_agent", defaults.user_agent)?
            .set_default("data_dir", defaults.data_dir.to_string_lossy().to_string())?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix("GIGDESK").try_parsing(true))
            .build()?;

        settings.try_deserialize()
    }
}

/// `$GIGDESK_STATE_DIR`, else the platform data directory
pub fn default_data_dir() -> PathBuf {
    std::env::var_os("GIGDESK_STATE_DIR").map_or_else(
        || {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("gigdesk")
        },
        PathBuf::from,
    )
}
