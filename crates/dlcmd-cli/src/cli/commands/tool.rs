//! `dlcmd tool <tool>` – select the tool for newly intercepted downloads.

use anyhow::Result;
use dlcmd_core::command::Tool;
use dlcmd_core::config::DlcmdConfig;
use dlcmd_core::history::History;
use dlcmd_core::store::JsonFileStore;

pub fn run_tool(store: &JsonFileStore, cfg: &DlcmdConfig, tool: Tool) -> Result<()> {
    let history = History::new(store, cfg.history_limit);
    let mut settings = history.settings()?;
    settings.tool = tool;
    history.save_settings(&settings)?;
    println!("Selected tool: {tool}");
    Ok(())
}
