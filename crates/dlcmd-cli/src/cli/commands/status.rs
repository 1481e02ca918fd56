//! `dlcmd status` – current settings and history summary.

use anyhow::Result;
use dlcmd_core::config::DlcmdConfig;
use dlcmd_core::history::History;
use dlcmd_core::store::JsonFileStore;

pub fn run_status(store: &JsonFileStore, cfg: &DlcmdConfig) -> Result<()> {
    let history = History::new(store, cfg.history_limit);
    let settings = history.settings()?;
    let records = history.list()?;
    let unseen = records.iter().filter(|r| !r.seen).count();

    println!(
        "Interception: {}",
        if settings.enabled { "enabled" } else { "disabled" }
    );
    println!("Selected tool: {}", settings.tool);
    println!(
        "History: {} command(s), {} unseen (limit {})",
        records.len(),
        unseen,
        cfg.history_limit
    );
    println!("Store: {}", store.path().display());
    Ok(())
}
