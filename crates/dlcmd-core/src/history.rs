//! Typed settings and command history over a [`KvStore`].
//!
//! Two keys: `settings` (interceptor toggle + selected tool) and `commands`
//! (generated commands, newest first, truncated to a limit on push). Each
//! record keeps its full descriptor so it can be re-rendered under another
//! tool later without re-fetching any network context.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::command::{synthesize, RequestDescriptor, Tool};
use crate::store::KvStore;

pub const SETTINGS_KEY: &str = "settings";
pub const COMMANDS_KEY: &str = "commands";

/// Default number of history entries kept.
pub const DEFAULT_HISTORY_LIMIT: usize = 200;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("no stored command with id {0}")]
    NotFound(String),
}

/// User-tunable interception settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub tool: Tool,
}

fn default_enabled() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            enabled: true,
            tool: Tool::Curl,
        }
    }
}

/// One generated command plus everything needed to regenerate it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRecord {
    pub id: String,
    pub command: String,
    pub tool: Tool,
    pub created_at_ms: i64,
    #[serde(default)]
    pub seen: bool,
    pub descriptor: RequestDescriptor,
}

/// Settings and history API bound to one store.
pub struct History<'a> {
    store: &'a dyn KvStore,
    limit: usize,
}

impl<'a> History<'a> {
    pub fn new(store: &'a dyn KvStore, limit: usize) -> Self {
        History { store, limit }
    }

    pub fn settings(&self) -> Result<Settings> {
        match self.store.get_raw(SETTINGS_KEY)? {
            Some(value) => serde_json::from_value(value).context("parse stored settings"),
            None => Ok(Settings::default()),
        }
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        let value = serde_json::to_value(settings).context("serialize settings")?;
        self.store.set_raw(SETTINGS_KEY, value)
    }

    /// All records, newest first.
    pub fn list(&self) -> Result<Vec<CommandRecord>> {
        match self.store.get_raw(COMMANDS_KEY)? {
            Some(value) => serde_json::from_value(value).context("parse stored commands"),
            None => Ok(Vec::new()),
        }
    }

    fn save_list(&self, records: &[CommandRecord]) -> Result<()> {
        let value = serde_json::to_value(records).context("serialize commands")?;
        self.store.set_raw(COMMANDS_KEY, value)
    }

    /// Prepend a record, dropping the oldest entries beyond the limit.
    pub fn push(&self, record: CommandRecord) -> Result<()> {
        let mut records = self.list()?;
        records.insert(0, record);
        records.truncate(self.limit);
        self.save_list(&records)
    }

    pub fn get(&self, id: &str) -> Result<CommandRecord> {
        self.list()?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| HistoryError::NotFound(id.to_string()).into())
    }

    pub fn mark_seen(&self, id: &str) -> Result<()> {
        let mut records = self.list()?;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| HistoryError::NotFound(id.to_string()))?;
        if !record.seen {
            record.seen = true;
            self.save_list(&records)?;
        }
        Ok(())
    }

    pub fn remove(&self, id: &str) -> Result<()> {
        let mut records = self.list()?;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Err(HistoryError::NotFound(id.to_string()).into());
        }
        self.save_list(&records)
    }

    pub fn clear(&self) -> Result<()> {
        self.save_list(&[])
    }

    /// Regenerate a stored record's command under `tool` from its persisted
    /// descriptor. Read-only; the stored record is unchanged.
    pub fn rerender(&self, id: &str, tool: Tool) -> Result<String> {
        let record = self.get(id)?;
        Ok(synthesize(&record.descriptor, tool))
    }
}

/// Milliseconds since the Unix epoch, for record timestamps.
pub fn unix_timestamp_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
