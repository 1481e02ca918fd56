//! Netscape `cookies.txt` jar as a [`CookieSource`].
//!
//! This is the format curl and wget read and write, and what most
//! "export cookies" browser extensions produce. Seven tab-separated fields
//! per line: domain, subdomain flag, path, secure flag, expiry, name, value.
//! Lines starting with `#` are comments, except the `#HttpOnly_` prefix
//! some exporters put in front of the domain.

use anyhow::{Context, Result};
use std::path::Path;
use url::Url;

use crate::cookies::{Cookie, CookieSource};

/// Parsed cookie jar, queried by host or domain suffix.
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    cookies: Vec<Cookie>,
}

impl CookieJar {
    /// Load a jar from a `cookies.txt` file. Malformed lines are skipped.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read cookie jar: {}", path.display()))?;
        Ok(Self::parse(&text))
    }

    /// Parse jar text. Never fails; unparseable lines are dropped.
    pub fn parse(text: &str) -> Self {
        let cookies = text.lines().filter_map(parse_line).collect();
        CookieJar { cookies }
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

fn parse_line(line: &str) -> Option<Cookie> {
    // #HttpOnly_ marks a real cookie; every other leading '#' is a comment.
    let line = line.strip_prefix("#HttpOnly_").unwrap_or(line);
    if line.trim().is_empty() || line.starts_with('#') {
        return None;
    }
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != 7 {
        return None;
    }
    Some(Cookie {
        domain: fields[0].to_string(),
        path: fields[2].to_string(),
        name: fields[5].to_string(),
        value: fields[6].to_string(),
    })
}

/// True when a cookie with `cookie_domain` is in scope for a query over
/// `query_domain` and its subdomains. Leading dots are ignored for matching.
fn domain_in_scope(cookie_domain: &str, query_domain: &str) -> bool {
    let cookie = cookie_domain.strip_prefix('.').unwrap_or(cookie_domain);
    let query = query_domain.strip_prefix('.').unwrap_or(query_domain);
    cookie == query || cookie.ends_with(&format!(".{query}"))
}

/// True when a cookie would be sent to `host`: exact match, or the cookie
/// domain is a parent of `host`.
fn sent_to_host(cookie_domain: &str, host: &str) -> bool {
    let cookie = cookie_domain.strip_prefix('.').unwrap_or(cookie_domain);
    host == cookie || host.ends_with(&format!(".{cookie}"))
}

impl CookieSource for CookieJar {
    fn cookies_for_url(&self, url: &str) -> Result<Vec<Cookie>> {
        let parsed = Url::parse(url).with_context(|| format!("parse URL: {url}"))?;
        let host = match parsed.host_str() {
            Some(h) => h.to_string(),
            None => return Ok(Vec::new()),
        };
        Ok(self
            .cookies
            .iter()
            .filter(|c| sent_to_host(&c.domain, &host))
            .cloned()
            .collect())
    }

    fn cookies_for_domain(&self, domain: &str) -> Result<Vec<Cookie>> {
        Ok(self
            .cookies
            .iter()
            .filter(|c| domain_in_scope(&c.domain, domain))
            .cloned()
            .collect())
    }
}
