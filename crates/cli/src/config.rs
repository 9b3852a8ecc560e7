//! CLI configuration utilities

use anyhow::{Context, Result};
use gigdesk_http::ClientConfig;
use std::path::{Path, PathBuf};

/// Resolve settings: defaults, then the config file, then `GIGDESK_*`
/// variables, then command line flags
pub fn load(
    path: Option<&Path>,
    data_dir: Option<PathBuf>,
    api_url: Option<String>,
) -> Result<ClientConfig> {
    let mut config = ClientConfig::load(path).context("failed to load configuration")?;
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }
    if let Some(url) = api_url {
        config.base_url = url;
    }
    Ok(config)
}

/// Save client configuration to a JSON file
pub fn save_config<P: AsRef<Path>>(config: &ClientConfig, path: P) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Default location of the generated configuration file
pub fn default_config_path(data_dir: &Path) -> PathBuf {
    data_dir.join("gigdesk.json")
}
