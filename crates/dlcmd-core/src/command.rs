//! Command synthesis: one download descriptor in, one shell command out.
//!
//! The synthesizer is a pure, total function. Malformed input (e.g. an empty
//! URL) still produces a syntactically complete command; nothing here fails.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// User agent used when the descriptor carries none.
pub const FALLBACK_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/90.0.4430.93 Safari/537.36";

/// Output name used by wget/aria2 when the descriptor carries no filename.
pub const FALLBACK_FILENAME: &str = "downloaded_file";

/// Target download tool. Unknown values deserialize and parse as `Curl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Wget,
    Aria2,
    #[default]
    #[serde(other)]
    Curl,
}

impl Tool {
    pub fn as_str(self) -> &'static str {
        match self {
            Tool::Curl => "curl",
            Tool::Wget => "wget",
            Tool::Aria2 => "aria2",
        }
    }
}

impl std::fmt::Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Tool {
    type Err = std::convert::Infallible;

    /// Lenient parse: anything that is not `wget` or `aria2` is `curl`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "wget" => Tool::Wget,
            "aria2" => Tool::Aria2,
            _ => Tool::Curl,
        })
    }
}

/// Normalized HTTP context of one download.
///
/// `headers` never carries the cookie header; the three reserved concerns
/// (user agent, cookie, referer) live in their dedicated fields and are
/// ignored in `headers` even if present there.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookies: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referer: Option<String>,
}

/// Escape a value for interpolation inside single quotes: `'` -> `'\''`.
pub fn shell_escape(value: &str) -> String {
    value.replace('\'', "'\\''")
}

/// Wrap a value in single quotes, escaping embedded quotes.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", shell_escape(value))
}

fn is_reserved_header(name: &str) -> bool {
    name.eq_ignore_ascii_case("user-agent")
        || name.eq_ignore_ascii_case("cookie")
        || name.eq_ignore_ascii_case("referer")
}

/// Header flag spelling per tool: `-H 'K: V'` for curl, `--header='K: V'` otherwise.
fn push_header_flags(out: &mut String, headers: &BTreeMap<String, String>, tool: Tool) {
    for (name, value) in headers {
        if is_reserved_header(name) {
            continue;
        }
        match tool {
            Tool::Curl => out.push_str(&format!(" -H '{}: {}'", name, shell_escape(value))),
            Tool::Wget | Tool::Aria2 => {
                out.push_str(&format!(" --header='{}: {}'", name, shell_escape(value)));
            }
        }
    }
}

/// Render the shell command that reproduces `desc`'s download with `tool`.
///
/// Pure and deterministic; safe to call from anywhere. Token order per tool
/// matches the reference assembly: curl takes the URL right after its base
/// flags, wget/aria2 take it last after the output flag.
pub fn synthesize(desc: &RequestDescriptor, tool: Tool) -> String {
    let user_agent = desc
        .user_agent
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(FALLBACK_USER_AGENT);
    let cookies = desc.cookies.as_deref().filter(|s| !s.is_empty());
    let referer = desc.referer.as_deref().filter(|s| !s.is_empty());
    let filename = desc
        .filename
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(FALLBACK_FILENAME);

    let mut cmd = String::new();
    match tool {
        Tool::Wget => {
            cmd.push_str(&format!(
                "wget -c --header='User-Agent: {}'",
                shell_escape(user_agent)
            ));
            if let Some(c) = cookies {
                cmd.push_str(&format!(" --header='Cookie: {}'", shell_escape(c)));
            }
            if let Some(r) = referer {
                cmd.push_str(&format!(" --referer='{}'", shell_escape(r)));
            }
            push_header_flags(&mut cmd, &desc.headers, tool);
            cmd.push_str(&format!(
                " -O '{}' {}",
                shell_escape(filename),
                shell_quote(&desc.url)
            ));
        }
        Tool::Aria2 => {
            cmd.push_str(&format!(
                "aria2c -c -x5 -s5 -k1M --user-agent='{}'",
                shell_escape(user_agent)
            ));
            if let Some(c) = cookies {
                cmd.push_str(&format!(" --header='Cookie: {}'", shell_escape(c)));
            }
            if let Some(r) = referer {
                cmd.push_str(&format!(" --referer='{}'", shell_escape(r)));
            }
            push_header_flags(&mut cmd, &desc.headers, tool);
            cmd.push_str(&format!(
                " -o '{}' {}",
                shell_escape(filename),
                shell_quote(&desc.url)
            ));
        }
        Tool::Curl => {
            cmd.push_str(&format!("curl -L -J -O -C - {}", shell_quote(&desc.url)));
            cmd.push_str(&format!(" -H 'User-Agent: {}'", shell_escape(user_agent)));
            if let Some(c) = cookies {
                cmd.push_str(&format!(" -H 'Cookie: {}'", shell_escape(c)));
            }
            if let Some(r) = referer {
                cmd.push_str(&format!(" -H 'Referer: {}'", shell_escape(r)));
            }
            push_header_flags(&mut cmd, &desc.headers, tool);
        }
    }
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(url: &str) -> RequestDescriptor {
        RequestDescriptor {
            url: url.to_string(),
            ..Default::default()
        }
    }

    /// Undo POSIX single-quote escaping as a shell would, for round-trip checks.
    fn shell_unquote(quoted: &str) -> String {
        let inner = quoted
            .strip_prefix('\'')
            .and_then(|s| s.strip_suffix('\''))
            .unwrap_or(quoted);
        inner.replace("'\\''", "'")
    }

    #[test]
    fn curl_baseline_is_bit_exact() {
        let mut d = desc("https://example.com/f.zip");
        d.user_agent = Some("UA1".to_string());
        assert_eq!(
            synthesize(&d, Tool::Curl),
            "curl -L -J -O -C - 'https://example.com/f.zip' -H 'User-Agent: UA1'"
        );
    }

    #[test]
    fn wget_flag_order_and_output_name() {
        let mut d = desc("https://example.com/f.zip");
        d.filename = Some("a.bin".to_string());
        d.cookies = Some("x=1".to_string());
        d.user_agent = Some("UA2".to_string());
        let cmd = synthesize(&d, Tool::Wget);

        let ua_at = cmd.find("wget -c --header='User-Agent: UA2'").unwrap();
        let cookie_at = cmd.find("--header='Cookie: x=1'").unwrap();
        assert!(ua_at < cookie_at);
        assert!(cmd.ends_with("-O 'a.bin' 'https://example.com/f.zip'"));
    }

    #[test]
    fn aria2_baseline() {
        let mut d = desc("https://example.com/f.zip");
        d.user_agent = Some("UA3".to_string());
        assert_eq!(
            synthesize(&d, Tool::Aria2),
            "aria2c -c -x5 -s5 -k1M --user-agent='UA3' -o 'downloaded_file' 'https://example.com/f.zip'"
        );
    }

    #[test]
    fn unknown_tool_string_parses_as_curl() {
        assert_eq!("banana".parse::<Tool>().unwrap(), Tool::Curl);
        assert_eq!("curl".parse::<Tool>().unwrap(), Tool::Curl);
        assert_eq!("wget".parse::<Tool>().unwrap(), Tool::Wget);
        assert_eq!("aria2".parse::<Tool>().unwrap(), Tool::Aria2);
    }

    #[test]
    fn unknown_tool_deserializes_as_curl() {
        let t: Tool = serde_json::from_str("\"axel\"").unwrap();
        assert_eq!(t, Tool::Curl);
        let t: Tool = serde_json::from_str("\"aria2\"").unwrap();
        assert_eq!(t, Tool::Aria2);
    }

    #[test]
    fn url_appears_exactly_once_escaped() {
        let d = desc("https://example.com/it's.zip");
        for tool in [Tool::Curl, Tool::Wget, Tool::Aria2] {
            let cmd = synthesize(&d, tool);
            assert!(!cmd.is_empty());
            let quoted = "'https://example.com/it'\\''s.zip'";
            assert_eq!(cmd.matches(quoted).count(), 1, "tool {tool}: {cmd}");
            assert_eq!(shell_unquote(quoted), d.url);
        }
    }

    #[test]
    fn quotes_in_values_never_pass_through_raw() {
        let mut d = desc("https://example.com/f");
        d.user_agent = Some("Agent'X".to_string());
        d.cookies = Some("k='v'".to_string());
        d.referer = Some("https://ref.example/'p".to_string());
        d.headers
            .insert("X-Token".to_string(), "abc'def".to_string());
        for tool in [Tool::Curl, Tool::Wget, Tool::Aria2] {
            let cmd = synthesize(&d, tool);
            assert!(!cmd.contains("Agent'X"), "{cmd}");
            assert!(cmd.contains("Agent'\\''X"), "{cmd}");
            assert!(!cmd.contains("k='v'"), "{cmd}");
            assert!(!cmd.contains("abc'def"), "{cmd}");
            assert!(cmd.contains("abc'\\''def"), "{cmd}");
        }
    }

    #[test]
    fn reserved_headers_never_emitted_as_generic_flags() {
        let mut d = desc("https://example.com/f");
        d.headers
            .insert("User-Agent".to_string(), "spoofed".to_string());
        d.headers.insert("COOKIE".to_string(), "a=b".to_string());
        d.headers
            .insert("referer".to_string(), "https://x".to_string());
        d.headers
            .insert("Accept".to_string(), "text/html".to_string());
        for tool in [Tool::Curl, Tool::Wget, Tool::Aria2] {
            let cmd = synthesize(&d, tool);
            assert!(!cmd.contains("spoofed"), "{cmd}");
            assert!(!cmd.contains("COOKIE"), "{cmd}");
            assert!(!cmd.contains("a=b"), "{cmd}");
            assert!(!cmd.contains("https://x'"), "{cmd}");
            assert!(cmd.contains("Accept: text/html"), "{cmd}");
        }
    }

    #[test]
    fn non_reserved_headers_each_appear_once() {
        let mut d = desc("https://example.com/f");
        d.headers
            .insert("Accept".to_string(), "application/zip".to_string());
        d.headers
            .insert("X-Requested-With".to_string(), "dl".to_string());
        let cmd = synthesize(&d, Tool::Curl);
        assert_eq!(cmd.matches("-H 'Accept: application/zip'").count(), 1);
        assert_eq!(cmd.matches("-H 'X-Requested-With: dl'").count(), 1);
    }

    #[test]
    fn no_cookie_flag_without_cookies() {
        let mut d = desc("https://example.com/f");
        d.cookies = Some(String::new());
        for tool in [Tool::Curl, Tool::Wget, Tool::Aria2] {
            let cmd = synthesize(&d, tool);
            assert!(!cmd.contains("Cookie"), "tool {tool}: {cmd}");
        }
        d.cookies = None;
        for tool in [Tool::Curl, Tool::Wget, Tool::Aria2] {
            assert!(!synthesize(&d, tool).contains("Cookie"));
        }
    }

    #[test]
    fn missing_filename_falls_back() {
        let d = desc("https://example.com/f");
        assert!(synthesize(&d, Tool::Wget).contains("-O 'downloaded_file'"));
        assert!(synthesize(&d, Tool::Aria2).contains("-o 'downloaded_file'"));
    }

    #[test]
    fn missing_user_agent_uses_fixed_fallback() {
        let d = desc("https://example.com/f");
        for tool in [Tool::Curl, Tool::Wget, Tool::Aria2] {
            let cmd = synthesize(&d, tool);
            assert!(cmd.contains(FALLBACK_USER_AGENT), "tool {tool}");
        }
    }

    #[test]
    fn empty_url_still_yields_complete_command() {
        let cmd = synthesize(&desc(""), Tool::Curl);
        assert!(cmd.starts_with("curl -L -J -O -C - ''"));
    }

    #[test]
    fn descriptor_roundtrips_through_json() {
        let mut d = desc("https://example.com/f.zip");
        d.filename = Some("f.zip".to_string());
        d.headers
            .insert("Accept".to_string(), "*/*".to_string());
        d.cookies = Some("s=1".to_string());
        let json = serde_json::to_string(&d).unwrap();
        let back: RequestDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
    }
}
