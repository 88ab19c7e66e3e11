use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use crate::provider::SecretValue;

pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of one delivery attempt, used to select the caller-facing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The receiver completed the exchange with a success status.
    Delivered,
    /// The receiver answered, but with a failure status.
    ReceiverRejected,
    /// The exchange never completed: connect error, timeout, or a receiver
    /// identifier the transport could not use.
    TransportFailure,
}

/// Sends a secret value to a receiver endpoint.
///
/// One attempt per call; retry policy is left to a caller wrapping the broker.
/// Implementations must not pass the raw value to any sink other than the
/// outbound call itself.
#[async_trait]
pub trait DeliveryClient: Send + Sync {
    async fn send(&self, receiver: &str, value: SecretValue) -> DeliveryOutcome;
}

#[async_trait]
impl<T> DeliveryClient for Box<T>
where
    T: DeliveryClient + ?Sized,
{
    async fn send(&self, receiver: &str, value: SecretValue) -> DeliveryOutcome {
        (**self).send(receiver, value).await
    }
}

/// Delivery over HTTP: a single POST with the value as a plain-text body.
#[derive(Clone)]
pub struct HttpDeliveryClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpDeliveryClient {
    /// Build a client whose per-call timeout covers connect, write, and
    /// response read.
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("secrets-courier/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build delivery http client")?;
        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl DeliveryClient for HttpDeliveryClient {
    async fn send(&self, receiver: &str, value: SecretValue) -> DeliveryOutcome {
        let response = self
            .client
            .post(receiver)
            .timeout(self.timeout)
            .header(CONTENT_TYPE, "text/plain")
            .body(value)
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => DeliveryOutcome::Delivered,
            Ok(response) => {
                debug!(receiver = %receiver, status = %response.status(), "receiver rejected delivery");
                DeliveryOutcome::ReceiverRejected
            }
            Err(err) => {
                debug!(receiver = %receiver, error = %err, "delivery transport failure");
                DeliveryOutcome::TransportFailure
            }
        }
    }
}
