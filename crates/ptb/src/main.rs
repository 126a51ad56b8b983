use std::sync::Arc;

use ptb_core::{bot::PriceTrackerBot, config::Config, messaging::port::MessagingPort};
use ptb_telegram::TelegramMessenger;
use ptb_tracker::TrackerClient;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Arc::new(Config::load()?);
    let _log_guard = ptb_core::logging::init(&cfg)?;

    tracing::info!(
        service = %cfg.service_name,
        version = %cfg.version,
        backend = %cfg.price_tracker_service,
        "starting"
    );
    if cfg.env_file.is_none() {
        tracing::warn!("environment file missed, using process environment only");
    }

    let bot = ptb_telegram::router::connect(&cfg).await?;

    let tracker = Arc::new(TrackerClient::from_config(&cfg)?);
    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let price_bot = Arc::new(PriceTrackerBot::new(tracker, messenger));

    let (stop_tx, mut stop_rx) = watch::channel(false);
    let http_cfg = cfg.clone();
    let mut http = tokio::spawn(async move {
        ptb_http::serve(&http_cfg, async move {
            let _ = stop_rx.changed().await;
        })
        .await
    });

    let polling = ptb_telegram::router::run_polling(bot, price_bot);
    tokio::pin!(polling);

    tokio::select! {
        res = &mut polling => {
            res?;
            let _ = stop_tx.send(true);
            http.await??;
        }
        res = &mut http => {
            // The server only returns early on failure (bind, TLS config).
            res??;
            anyhow::bail!("http server exited unexpectedly");
        }
    }

    tracing::info!("shutdown complete");
    Ok(())
}
