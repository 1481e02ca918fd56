//! Download interception: event in, allow/suppress verdict out.
//!
//! The interceptor is the glue between the host event channel and the pure
//! synthesizer. Every failure path fails open: when settings can't be read or
//! the record can't be stored, the browser download is allowed to proceed and
//! the error is only logged. Suppression is earned, never the default.

use std::collections::BTreeMap;
use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::command::{synthesize, RequestDescriptor};
use crate::config::DlcmdConfig;
use crate::cookies::{cookie_header_for_url, CookieSource};
use crate::history::{unix_timestamp_ms, CommandRecord, History};
use crate::store::KvStore;

/// One request header as delivered on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderPair {
    pub name: String,
    pub value: String,
}

/// Download attempt as reported by the browser extension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadEvent {
    /// Browser-side download id; becomes the history record id.
    pub id: i64,
    pub url: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub referrer: Option<String>,
    #[serde(default)]
    pub request_headers: Vec<HeaderPair>,
    /// Pre-joined cookie string collected on the browser side, if any.
    #[serde(default)]
    pub cookies: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub start_time_ms: Option<i64>,
}

/// Verdict returned to the host: let the browser download run, or cancel it
/// because an equivalent command was generated and stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Allow,
    Suppress,
}

/// What one event produced; `command` is set only on `Suppress`.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub decision: Decision,
    pub command: Option<String>,
}

impl Outcome {
    fn allow() -> Self {
        Outcome {
            decision: Decision::Allow,
            command: None,
        }
    }
}

/// Transient user notification when a command lands in history.
pub trait Notifier: Send + Sync {
    fn notify(&self, summary: &str, body: &str);
}

/// No-op notifier for tests, headless runs, and `notifications = false`.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _summary: &str, _body: &str) {}
}

/// Desktop notifications via `notify-send`. Failures are logged, never fatal.
pub struct NotifySend;

impl Notifier for NotifySend {
    fn notify(&self, summary: &str, body: &str) {
        match Command::new("notify-send").arg(summary).arg(body).status() {
            Ok(status) if status.success() => {}
            Ok(status) => tracing::warn!("notify-send exited with {status}"),
            Err(err) => tracing::warn!("notify-send not available: {err}"),
        }
    }
}

pub struct Interceptor<'a> {
    store: &'a dyn KvStore,
    cookies: &'a dyn CookieSource,
    notifier: &'a dyn Notifier,
    config: DlcmdConfig,
}

impl<'a> Interceptor<'a> {
    pub fn new(
        store: &'a dyn KvStore,
        cookies: &'a dyn CookieSource,
        notifier: &'a dyn Notifier,
        config: DlcmdConfig,
    ) -> Self {
        Interceptor {
            store,
            cookies,
            notifier,
            config,
        }
    }

    /// Handle one intercepted download attempt.
    pub fn handle(&self, event: &DownloadEvent) -> Outcome {
        let history = History::new(self.store, self.config.history_limit);

        let settings = match history.settings() {
            Ok(s) => s,
            Err(err) => {
                tracing::warn!("settings unreadable, allowing download: {err:#}");
                return Outcome::allow();
            }
        };
        if !settings.enabled {
            tracing::debug!(url = %event.url, "interceptor disabled, allowing download");
            return Outcome::allow();
        }
        if event.url.is_empty() {
            tracing::warn!(id = event.id, "download event without URL, allowing");
            return Outcome::allow();
        }

        let headers = header_map(&event.request_headers);

        let cookies = match event.cookies.as_deref().filter(|c| !c.is_empty()) {
            Some(c) => Some(c.to_string()),
            None => {
                let joined = cookie_header_for_url(self.cookies, &event.url);
                (!joined.is_empty()).then_some(joined)
            }
        };

        let referer = event
            .referrer
            .clone()
            .filter(|r| !r.is_empty())
            .or_else(|| {
                headers
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case("referer"))
                    .map(|(_, value)| value.clone())
            });

        let descriptor = RequestDescriptor {
            url: event.url.clone(),
            filename: event.filename.clone().filter(|f| !f.is_empty()),
            headers,
            cookies,
            user_agent: event
                .user_agent
                .clone()
                .filter(|ua| !ua.is_empty())
                .or_else(|| self.config.fallback_user_agent.clone()),
            referer,
        };

        let command = synthesize(&descriptor, settings.tool);
        let record = CommandRecord {
            id: event.id.to_string(),
            command: command.clone(),
            tool: settings.tool,
            created_at_ms: event.start_time_ms.unwrap_or_else(unix_timestamp_ms),
            seen: false,
            descriptor,
        };

        if let Err(err) = history.push(record) {
            tracing::warn!("could not store command, allowing download: {err:#}");
            return Outcome::allow();
        }
        tracing::info!(id = event.id, tool = %settings.tool, url = %event.url, "download intercepted");

        if self.config.notifications {
            let name = event.filename.as_deref().filter(|f| !f.is_empty());
            self.notifier.notify(
                "Download intercepted",
                &format!("Command generated for: {}", name.unwrap_or("file")),
            );
        }

        Outcome {
            decision: Decision::Suppress,
            command: Some(command),
        }
    }
}

/// Header list -> map, dropping the cookie header and empty pairs. Reserved
/// keys beyond cookie are left in; the synthesizer ignores them anyway.
fn header_map(headers: &[HeaderPair]) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for header in headers {
        if header.name.is_empty() || header.value.is_empty() {
            continue;
        }
        if header.name.eq_ignore_ascii_case("cookie") {
            continue;
        }
        map.insert(header.name.clone(), header.value.clone());
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Tool;
    use crate::cookies::{Cookie, NoCookies};
    use crate::history::Settings;
    use crate::store::MemStore;
    use anyhow::Result;
    use std::sync::Mutex;

    struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        fn new() -> Self {
            RecordingNotifier {
                messages: Mutex::new(Vec::new()),
            }
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, _summary: &str, body: &str) {
            self.messages.lock().unwrap().push(body.to_string());
        }
    }

    struct OneCookie;

    impl CookieSource for OneCookie {
        fn cookies_for_url(&self, _url: &str) -> Result<Vec<Cookie>> {
            Ok(vec![Cookie {
                name: "session".to_string(),
                value: "abc".to_string(),
                domain: "example.com".to_string(),
                path: "/".to_string(),
            }])
        }

        fn cookies_for_domain(&self, _domain: &str) -> Result<Vec<Cookie>> {
            Ok(Vec::new())
        }
    }

    fn event(url: &str) -> DownloadEvent {
        DownloadEvent {
            id: 7,
            url: url.to_string(),
            filename: Some("f.zip".to_string()),
            referrer: None,
            request_headers: Vec::new(),
            cookies: None,
            user_agent: Some("UA".to_string()),
            start_time_ms: Some(1_000),
        }
    }

    #[test]
    fn suppresses_and_stores_record() {
        let store = MemStore::new();
        let notifier = RecordingNotifier::new();
        let interceptor =
            Interceptor::new(&store, &NoCookies, &notifier, DlcmdConfig::default());

        let outcome = interceptor.handle(&event("https://example.com/f.zip"));
        assert_eq!(outcome.decision, Decision::Suppress);
        let command = outcome.command.unwrap();
        assert!(command.starts_with("curl -L -J -O -C - 'https://example.com/f.zip'"));

        let history = History::new(&store, 10);
        let record = history.get("7").unwrap();
        assert_eq!(record.command, command);
        assert_eq!(record.tool, Tool::Curl);
        assert_eq!(record.created_at_ms, 1_000);
        assert_eq!(record.descriptor.url, "https://example.com/f.zip");

        let messages = notifier.messages.lock().unwrap();
        assert_eq!(messages.as_slice(), ["Command generated for: f.zip"]);
    }

    #[test]
    fn disabled_interceptor_allows() {
        let store = MemStore::new();
        let history = History::new(&store, 10);
        history
            .save_settings(&Settings {
                enabled: false,
                tool: Tool::Curl,
            })
            .unwrap();
        let interceptor =
            Interceptor::new(&store, &NoCookies, &NullNotifier, DlcmdConfig::default());
        let outcome = interceptor.handle(&event("https://example.com/f.zip"));
        assert_eq!(outcome.decision, Decision::Allow);
        assert!(outcome.command.is_none());
        assert!(history.list().unwrap().is_empty());
    }

    #[test]
    fn empty_url_allows() {
        let store = MemStore::new();
        let interceptor =
            Interceptor::new(&store, &NoCookies, &NullNotifier, DlcmdConfig::default());
        assert_eq!(interceptor.handle(&event("")).decision, Decision::Allow);
    }

    #[test]
    fn uses_selected_tool_from_settings() {
        let store = MemStore::new();
        History::new(&store, 10)
            .save_settings(&Settings {
                enabled: true,
                tool: Tool::Wget,
            })
            .unwrap();
        let interceptor =
            Interceptor::new(&store, &NoCookies, &NullNotifier, DlcmdConfig::default());
        let outcome = interceptor.handle(&event("https://example.com/f.zip"));
        assert!(outcome.command.unwrap().starts_with("wget -c"));
    }

    #[test]
    fn event_cookie_string_wins_over_source() {
        let store = MemStore::new();
        let mut ev = event("https://example.com/f.zip");
        ev.cookies = Some("x=1".to_string());
        let interceptor =
            Interceptor::new(&store, &OneCookie, &NullNotifier, DlcmdConfig::default());
        let command = interceptor.handle(&ev).command.unwrap();
        assert!(command.contains("Cookie: x=1"));
        assert!(!command.contains("session=abc"));
    }

    #[test]
    fn falls_back_to_cookie_source() {
        let store = MemStore::new();
        let interceptor =
            Interceptor::new(&store, &OneCookie, &NullNotifier, DlcmdConfig::default());
        let command = interceptor
            .handle(&event("https://example.com/f.zip"))
            .command
            .unwrap();
        assert!(command.contains("Cookie: session=abc"));
    }

    #[test]
    fn referer_falls_back_to_request_header() {
        let store = MemStore::new();
        let mut ev = event("https://example.com/f.zip");
        ev.request_headers = vec![
            HeaderPair {
                name: "referer".to_string(),
                value: "https://origin.example/page".to_string(),
            },
            HeaderPair {
                name: "Cookie".to_string(),
                value: "dropped=1".to_string(),
            },
            HeaderPair {
                name: "Accept".to_string(),
                value: "*/*".to_string(),
            },
        ];
        let interceptor =
            Interceptor::new(&store, &NoCookies, &NullNotifier, DlcmdConfig::default());
        let command = interceptor.handle(&ev).command.unwrap();
        assert!(command.contains("Referer: https://origin.example/page"));
        assert!(command.contains("Accept: */*"));
        assert!(!command.contains("dropped=1"));
    }

    #[test]
    fn config_fallback_user_agent_applies() {
        let store = MemStore::new();
        let mut ev = event("https://example.com/f.zip");
        ev.user_agent = None;
        let config = DlcmdConfig {
            fallback_user_agent: Some("Configured/1.0".to_string()),
            ..Default::default()
        };
        let interceptor = Interceptor::new(&store, &NoCookies, &NullNotifier, config);
        let command = interceptor.handle(&ev).command.unwrap();
        assert!(command.contains("User-Agent: Configured/1.0"));
    }

    #[test]
    fn notifications_off_stays_silent() {
        let store = MemStore::new();
        let notifier = RecordingNotifier::new();
        let config = DlcmdConfig {
            notifications: false,
            ..Default::default()
        };
        let interceptor = Interceptor::new(&store, &NoCookies, &notifier, config);
        let outcome = interceptor.handle(&event("https://example.com/f.zip"));
        assert_eq!(outcome.decision, Decision::Suppress);
        assert!(notifier.messages.lock().unwrap().is_empty());
    }
}
