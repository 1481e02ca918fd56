use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Global configuration loaded from `~/.config/dlcmd/config.toml`.
///
/// Runtime-mutable state (interceptor toggle, selected tool) lives in the
/// key-value store instead; this file holds the knobs a user edits by hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DlcmdConfig {
    /// Maximum number of history entries kept; older ones are dropped.
    pub history_limit: usize,
    /// Show a desktop notification when a command is generated.
    pub notifications: bool,
    /// User agent used when an intercepted event carries none. Falls back to
    /// a built-in desktop browser string when unset.
    #[serde(default)]
    pub fallback_user_agent: Option<String>,
}

impl Default for DlcmdConfig {
    fn default() -> Self {
        Self {
            history_limit: crate::history::DEFAULT_HISTORY_LIMIT,
            notifications: true,
            fallback_user_agent: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("dlcmd")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<DlcmdConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = DlcmdConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: DlcmdConfig = toml::from_str(&data)?;
    Ok(cfg)
}
