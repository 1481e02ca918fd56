//! CLI for the dlcmd command generator.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use dlcmd_core::command::Tool;
use dlcmd_core::config;
use dlcmd_core::store::JsonFileStore;
use std::path::PathBuf;

use commands::{
    run_clear, run_enable, run_gen, run_history, run_host, run_remove, run_show,
    run_status, run_tool,
};

/// Top-level CLI for dlcmd.
#[derive(Debug, Parser)]
#[command(name = "dlcmd")]
#[command(about = "dlcmd: turn browser downloads into curl/wget/aria2 commands", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Arguments for `dlcmd gen`.
#[derive(Debug, Args)]
pub struct GenArgs {
    /// Direct HTTP/HTTPS URL to generate a command for.
    pub url: String,

    /// Target tool: curl, wget or aria2 (unknown values fall back to curl).
    /// Defaults to the selected tool from settings.
    #[arg(long)]
    pub tool: Option<Tool>,

    /// Output filename for wget/aria2.
    #[arg(long, value_name = "NAME")]
    pub output: Option<String>,

    /// Extra request header, repeatable ("Name: Value").
    #[arg(long = "header", value_name = "NAME: VALUE")]
    pub headers: Vec<String>,

    /// Pre-joined cookie string ("name=value; name2=value2").
    #[arg(long)]
    pub cookie: Option<String>,

    /// Netscape cookies.txt file to resolve cookies from.
    #[arg(long, value_name = "PATH", conflicts_with = "cookie")]
    pub cookie_jar: Option<PathBuf>,

    /// Referer URL.
    #[arg(long)]
    pub referer: Option<String>,

    /// User agent (built-in desktop browser string when omitted).
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Also record the generated command in history.
    #[arg(long)]
    pub save: bool,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Generate a download command from explicit request context.
    Gen(GenArgs),

    /// Run the native-messaging host loop on stdin/stdout.
    Host,

    /// List generated commands, newest first.
    History,

    /// Print a stored command, optionally re-rendered for another tool.
    Show {
        /// Record identifier (see `dlcmd history`).
        id: String,

        /// Re-render under this tool instead of the stored one.
        #[arg(long)]
        tool: Option<Tool>,
    },

    /// Remove one record from history.
    Remove {
        /// Record identifier.
        id: String,
    },

    /// Remove all records from history.
    Clear,

    /// Turn download interception on.
    Enable,

    /// Turn download interception off.
    Disable,

    /// Select the tool used for newly intercepted downloads.
    Tool {
        /// curl, wget or aria2 (unknown values fall back to curl).
        tool: Tool,
    },

    /// Show settings and history summary.
    Status,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let store = JsonFileStore::open_default()?;

        match cli.command {
            CliCommand::Gen(args) => run_gen(&store, &cfg, args)?,
            CliCommand::Host => run_host(&store, &cfg).await?,
            CliCommand::History => run_history(&store, &cfg)?,
            CliCommand::Show { id, tool } => run_show(&store, &cfg, &id, tool)?,
            CliCommand::Remove { id } => run_remove(&store, &cfg, &id)?,
            CliCommand::Clear => run_clear(&store, &cfg)?,
            CliCommand::Enable => run_enable(&store, &cfg, true)?,
            CliCommand::Disable => run_enable(&store, &cfg, false)?,
            CliCommand::Tool { tool } => run_tool(&store, &cfg, tool)?,
            CliCommand::Status => run_status(&store, &cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
