//! `dlcmd show <id>` – print a stored command, optionally for another tool.

use anyhow::Result;
use dlcmd_core::command::Tool;
use dlcmd_core::config::DlcmdConfig;
use dlcmd_core::history::History;
use dlcmd_core::store::JsonFileStore;

pub fn run_show(
    store: &JsonFileStore,
    cfg: &DlcmdConfig,
    id: &str,
    tool: Option<Tool>,
) -> Result<()> {
    let history = History::new(store, cfg.history_limit);
    let record = history.get(id)?;
    let command = match tool {
        Some(t) if t != record.tool => history.rerender(id, t)?,
        _ => record.command,
    };
    println!("{command}");
    history.mark_seen(id)?;
    Ok(())
}
