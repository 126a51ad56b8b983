//! HTTP surface of the bot process (axum): healthcheck, CORS and request logging.

use std::{future::Future, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{middleware, routing::get, Router};

use ptb_core::{config::Config, errors::Error};

pub mod cors;
pub mod health;
pub mod request_log;

#[derive(Clone, Debug)]
pub struct HttpState {
    pub version: Arc<str>,
}

impl HttpState {
    pub fn new(version: impl Into<Arc<str>>) -> Self {
        Self {
            version: version.into(),
        }
    }
}

/// Build the router. Request logging wraps CORS so preflight answers are logged too.
pub fn router(state: HttpState) -> Router {
    Router::new()
        .route("/healthcheck", get(health::healthcheck))
        .with_state(state)
        .layer(middleware::from_fn(cors::cors))
        .layer(middleware::from_fn(request_log::log_requests))
}

/// Bind and serve until `shutdown` resolves.
pub async fn serve(
    cfg: &Config,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    if cfg.tls.enabled {
        return Err(Error::Config(
            "SERVICE_HTTPS=1 is not supported; terminate TLS in front of the service".to_string(),
        )
        .into());
    }

    let addr = cfg.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("starting the HTTP server on {addr}");

    let app = router(HttpState::new(cfg.version.as_str()));
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
    .context("http server failed")?;

    Ok(())
}
