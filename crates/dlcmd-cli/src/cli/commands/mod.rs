//! CLI command handlers. Each command is in its own file for clarity.

mod clear;
mod enable;
mod gen;
mod history;
mod host;
mod remove;
mod show;
mod status;
mod tool;

pub use clear::run_clear;
pub use enable::run_enable;
pub use gen::run_gen;
pub use history::run_history;
pub use host::run_host;
pub use remove::run_remove;
pub use show::run_show;
pub use status::run_status;
pub use tool::run_tool;
