//! `dlcmd gen <url>` – synthesize a command from explicit request context.

use anyhow::{bail, Result};
use dlcmd_core::command::{synthesize, RequestDescriptor};
use dlcmd_core::config::DlcmdConfig;
use dlcmd_core::cookiejar::CookieJar;
use dlcmd_core::cookies::cookie_header_for_url;
use dlcmd_core::history::{unix_timestamp_ms, CommandRecord, History};
use dlcmd_core::store::JsonFileStore;
use std::collections::BTreeMap;

use crate::cli::GenArgs;

pub fn run_gen(store: &JsonFileStore, cfg: &DlcmdConfig, args: GenArgs) -> Result<()> {
    let history = History::new(store, cfg.history_limit);
    let tool = match args.tool {
        Some(t) => t,
        None => history.settings()?.tool,
    };

    let mut headers = BTreeMap::new();
    for raw in &args.headers {
        let Some((name, value)) = raw.split_once(':') else {
            bail!("invalid --header {raw:?}, expected \"Name: Value\"");
        };
        headers.insert(name.trim().to_string(), value.trim().to_string());
    }

    let cookies = match (&args.cookie, &args.cookie_jar) {
        (Some(cookie), _) => Some(cookie.clone()),
        (None, Some(jar_path)) => {
            let jar = CookieJar::load(jar_path)?;
            let joined = cookie_header_for_url(&jar, &args.url);
            (!joined.is_empty()).then_some(joined)
        }
        (None, None) => None,
    };

    let descriptor = RequestDescriptor {
        url: args.url.clone(),
        filename: args.output.clone(),
        headers,
        cookies,
        user_agent: args.user_agent.clone().or_else(|| cfg.fallback_user_agent.clone()),
        referer: args.referer.clone(),
    };

    let command = synthesize(&descriptor, tool);
    println!("{command}");

    if args.save {
        let id = format!("gen-{}", unix_timestamp_ms());
        history.push(CommandRecord {
            id: id.clone(),
            command,
            tool,
            created_at_ms: unix_timestamp_ms(),
            seen: true,
            descriptor,
        })?;
        eprintln!("Saved to history as {id}");
    }

    Ok(())
}
