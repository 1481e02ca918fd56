//! `dlcmd host` – native-messaging host loop on stdin/stdout.

use anyhow::Result;
use dlcmd_core::config::DlcmdConfig;
use dlcmd_core::cookies::NoCookies;
use dlcmd_core::host;
use dlcmd_core::intercept::{Interceptor, Notifier, NotifySend, NullNotifier};
use dlcmd_core::store::JsonFileStore;

pub async fn run_host(store: &JsonFileStore, cfg: &DlcmdConfig) -> Result<()> {
    let notifier: Box<dyn Notifier> = if cfg.notifications {
        Box::new(NotifySend)
    } else {
        Box::new(NullNotifier)
    };
    // Events carry their own cookie string; there is no browser store to query.
    let interceptor = Interceptor::new(store, &NoCookies, notifier.as_ref(), cfg.clone());

    tracing::info!("native-messaging host started");
    let mut stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();
    host::run_host(&interceptor, &mut stdin, &mut stdout).await
}
