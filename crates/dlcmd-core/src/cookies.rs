//! Best-effort cookie lookup for a download URL.
//!
//! Queries widen in scope: the URL itself, then the exact hostname, then the
//! parent domain (`.b.c` for `a.b.c`). Results are merged in that order and
//! deduplicated by (name, domain, path). Every scope is allowed to fail;
//! a failed scope is logged and skipped so command generation stays usable
//! without a cookie store.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

/// One cookie as seen by a store. Domain and path take part in dedup only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub path: String,
}

/// A queryable cookie store (browser export, cookie jar file, test fake).
pub trait CookieSource: Send + Sync {
    /// Cookies that would be sent to `url`.
    fn cookies_for_url(&self, url: &str) -> Result<Vec<Cookie>>;

    /// Cookies scoped to `domain` (a hostname, or `.parent` form) and its subdomains.
    fn cookies_for_domain(&self, domain: &str) -> Result<Vec<Cookie>>;
}

/// Source with no cookies. Used when the event already carries a cookie
/// string, or when no store is configured.
pub struct NoCookies;

impl CookieSource for NoCookies {
    fn cookies_for_url(&self, _url: &str) -> Result<Vec<Cookie>> {
        Ok(Vec::new())
    }

    fn cookies_for_domain(&self, _domain: &str) -> Result<Vec<Cookie>> {
        Ok(Vec::new())
    }
}

/// Join the deduplicated cookies visible to `url` into `name=value; ...` form.
///
/// Idempotent and total: lookup errors and unparseable URLs narrow the result
/// instead of failing, down to an empty string.
pub fn cookie_header_for_url(source: &dyn CookieSource, url: &str) -> String {
    let mut collected: Vec<Cookie> = Vec::new();

    match source.cookies_for_url(url) {
        Ok(cookies) => collected.extend(cookies),
        Err(err) => tracing::warn!(url, "cookie lookup by URL failed: {err:#}"),
    }

    match Url::parse(url) {
        Ok(parsed) => {
            if let Some(host) = parsed.host_str() {
                match source.cookies_for_domain(host) {
                    Ok(cookies) => collected.extend(cookies),
                    Err(err) => tracing::warn!(host, "cookie lookup by host failed: {err:#}"),
                }
                // a.b.c -> .b.c; two-label hosts have no distinct parent scope.
                let labels: Vec<&str> = host.split('.').collect();
                if labels.len() > 2 {
                    let parent = format!(".{}", labels[1..].join("."));
                    match source.cookies_for_domain(&parent) {
                        Ok(cookies) => collected.extend(cookies),
                        Err(err) => {
                            tracing::warn!(domain = %parent, "cookie lookup by parent domain failed: {err:#}")
                        }
                    }
                }
            }
        }
        Err(err) => tracing::warn!(url, "not a parseable URL, skipping domain scopes: {err}"),
    }

    join_deduped(collected)
}

/// Keep the first occurrence per (name, domain, path) and join.
fn join_deduped(cookies: Vec<Cookie>) -> String {
    let mut seen = HashSet::new();
    let mut parts = Vec::new();
    for cookie in cookies {
        let key = format!("{}|{}|{}", cookie.name, cookie.domain, cookie.path);
        if seen.insert(key) {
            parts.push(format!("{}={}", cookie.name, cookie.value));
        }
    }
    parts.join("; ")
}
