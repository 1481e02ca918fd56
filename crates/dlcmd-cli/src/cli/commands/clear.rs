//! `dlcmd clear` – empty the command history.

use anyhow::Result;
use dlcmd_core::config::DlcmdConfig;
use dlcmd_core::history::History;
use dlcmd_core::store::JsonFileStore;

pub fn run_clear(store: &JsonFileStore, cfg: &DlcmdConfig) -> Result<()> {
    History::new(store, cfg.history_limit).clear()?;
    println!("History cleared.");
    Ok(())
}
