//! steam-box entry point.

mod app;
mod config;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting steam-box");

    let config = config::Config::from_env()?;
    tracing::info!(
        steam_id = config.steam_id,
        update = ?config.update,
        layout = ?config.layout,
        "configuration loaded"
    );

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let cancel = CancellationToken::new();

        let on_signal = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupted, cancelling");
                on_signal.cancel();
            }
        });

        if let Some(timeout) = config.timeout {
            let on_deadline = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                tracing::warn!(timeout_secs = timeout.as_secs(), "deadline reached, cancelling");
                on_deadline.cancel();
            });
        }

        app::run(config, cancel).await
    })?;

    tracing::info!("steam-box finished");
    Ok(())
}
