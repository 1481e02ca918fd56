//! `dlcmd history` – list generated commands.

use anyhow::Result;
use dlcmd_core::config::DlcmdConfig;
use dlcmd_core::history::{unix_timestamp_ms, History};
use dlcmd_core::store::JsonFileStore;

pub fn run_history(store: &JsonFileStore, cfg: &DlcmdConfig) -> Result<()> {
    let history = History::new(store, cfg.history_limit);
    let records = history.list()?;
    if records.is_empty() {
        println!("No commands in history.");
        return Ok(());
    }

    let now = unix_timestamp_ms();
    println!("{:<14} {:<6} {:<6} {:<4} {}", "ID", "TOOL", "AGE", "NEW", "URL");
    for record in records {
        println!(
            "{:<14} {:<6} {:<6} {:<4} {}",
            record.id,
            record.tool,
            fmt_age(now.saturating_sub(record.created_at_ms)),
            if record.seen { "" } else { "*" },
            record.descriptor.url
        );
    }
    Ok(())
}

/// Compact age like "42s", "5m", "3h", "2d".
fn fmt_age(delta_ms: i64) -> String {
    let secs = delta_ms / 1000;
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86_400 {
        format!("{}h", secs / 3600)
    } else {
        format!("{}d", secs / 86_400)
    }
}
