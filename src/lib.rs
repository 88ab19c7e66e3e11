pub mod broker;
pub mod config;
pub mod delivery;
pub mod error;
pub mod http;
pub mod models;
pub mod policy;
pub mod provider;
pub mod state;
pub mod telemetry;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use broker::SecretBroker;
use delivery::{DeliveryClient, HttpDeliveryClient};
use policy::AccessPolicy;
use provider::{RandomSecretProvider, SecretProvider};

pub use state::AppState;
pub use telemetry::CorrelationId;

#[derive(Clone)]
pub struct RuntimeConfig {
    pub http_addr: SocketAddr,
    pub delivery_timeout: Duration,
    pub policy: AccessPolicy,
}

pub async fn run(config: RuntimeConfig) -> anyhow::Result<()> {
    let state = build_state(config.policy, config.delivery_timeout)?;

    let http_listener = TcpListener::bind(config.http_addr).await.with_context(|| {
        format!(
            "failed to bind http listener on {addr}",
            addr = config.http_addr
        )
    })?;

    let http_addr = http_listener.local_addr()?;
    info!(%http_addr, "http server listening");

    let http_router = http::router(state);
    axum::serve(http_listener, http_router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)
}

/// Wire the production components: random value provider plus reqwest-backed
/// delivery, both behind the trait seams the broker depends on.
pub fn build_state(policy: AccessPolicy, delivery_timeout: Duration) -> anyhow::Result<AppState> {
    if policy.is_empty() {
        warn!("access policy is empty; every request will resolve to 404");
    } else {
        info!(secrets = policy.secret_count(), "access policy loaded");
    }

    let provider: Box<dyn SecretProvider> = Box::new(RandomSecretProvider::default());
    let delivery: Box<dyn DeliveryClient> = Box::new(HttpDeliveryClient::new(delivery_timeout)?);
    let broker = SecretBroker::new(policy, provider, delivery);
    Ok(AppState::new(Arc::new(broker)))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(?err, "failed to install ctrl-c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => warn!(?err, "failed to install sigterm handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
