use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Static request configuration, loaded from `~/.config/vidfetch/config.toml`.
/// Frozen once the context is built; nothing mutates it per request.
#[derive(SmartDefault, Serialize, Deserialize, PartialEq, Clone, Debug)]
#[serde(default)]
pub struct RequestConfig {
    /// The target URL gets percent-encoded and appended as-is.
    #[default = "https://www.tikwm.com/api/?url="]
    pub api_base: String,
    /// Sent verbatim as `Authorization`, so include any scheme (`Bearer ...`).
    pub api_key: Option<String>,
    /// Prefixed to every outbound URL when `use_cors_proxy` is on. Testing only.
    #[default = "https://www.tikwm.com/api/?url="]
    pub cors_proxy: String,
    pub use_cors_proxy: bool,
    #[default = 30]
    pub timeout_secs: u64,
    pub user_agent: Option<String>,
}

impl RequestConfig {
    /// The key, if one is configured and not blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("vidfetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<RequestConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = RequestConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from(&path)
}

pub fn load_from(path: &Path) -> Result<RequestConfig> {
    let data = fs::read_to_string(path)?;
    let cfg: RequestConfig = toml::from_str(&data)?;
    tracing::debug!("loaded config from {}", path.display());
    Ok(cfg)
}
