//! `dlcmd enable` / `dlcmd disable` – toggle download interception.

use anyhow::Result;
use dlcmd_core::config::DlcmdConfig;
use dlcmd_core::history::History;
use dlcmd_core::store::JsonFileStore;

pub fn run_enable(store: &JsonFileStore, cfg: &DlcmdConfig, enabled: bool) -> Result<()> {
    let history = History::new(store, cfg.history_limit);
    let mut settings = history.settings()?;
    settings.enabled = enabled;
    history.save_settings(&settings)?;
    println!(
        "Interception {}.",
        if enabled { "enabled" } else { "disabled" }
    );
    Ok(())
}
