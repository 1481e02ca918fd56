//! `dlcmd remove <id>` – drop one record from history.

use anyhow::Result;
use dlcmd_core::config::DlcmdConfig;
use dlcmd_core::history::History;
use dlcmd_core::store::JsonFileStore;

pub fn run_remove(store: &JsonFileStore, cfg: &DlcmdConfig, id: &str) -> Result<()> {
    History::new(store, cfg.history_limit).remove(id)?;
    println!("Removed {id} from history.");
    Ok(())
}
