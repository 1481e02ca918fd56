pub mod config;
pub mod logging;

pub mod command;
pub mod cookiejar;
pub mod cookies;
pub mod history;
pub mod host;
pub mod intercept;
pub mod store;
