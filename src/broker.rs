use tracing::{error, info, warn};

use crate::delivery::{DeliveryClient, DeliveryOutcome};
use crate::models::SecretRequest;
use crate::policy::{AccessPolicy, PolicyDecision};
use crate::provider::{ProviderError, SecretProvider};

/// Terminal outcome of one brokered request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerResult {
    SecretUnknown,
    Forbidden,
    Delivered,
    DeliveryFailed,
}

/// Orchestrates policy check, value retrieval, and delivery.
///
/// Each `handle` call is independent: nothing persists between requests beyond
/// the immutable policy and provider, so concurrent invocations need no
/// synchronization.
pub struct SecretBroker<P, D> {
    policy: AccessPolicy,
    provider: P,
    delivery: D,
}

impl<P, D> SecretBroker<P, D>
where
    P: SecretProvider,
    D: DeliveryClient,
{
    pub fn new(policy: AccessPolicy, provider: P, delivery: D) -> Self {
        Self {
            policy,
            provider,
            delivery,
        }
    }

    /// Resolve a request to exactly one outcome in a single pass: authorize,
    /// fetch the value, deliver, report. No retries, no partial state.
    pub async fn handle(&self, request: &SecretRequest) -> BrokerResult {
        match self.policy.check(&request.secret_name, &request.send_to) {
            PolicyDecision::UnknownSecret => {
                warn!(secret = %request.secret_name, "secret not available");
                return BrokerResult::SecretUnknown;
            }
            PolicyDecision::ReceiverNotAllowed => {
                warn!(
                    secret = %request.secret_name,
                    receiver = %request.send_to,
                    "receiver not authorized for secret"
                );
                return BrokerResult::Forbidden;
            }
            PolicyDecision::Allowed => {}
        }

        let value = match self.provider.get_secret(&request.secret_name) {
            Ok(value) => value,
            Err(ProviderError::NotFound { .. }) => {
                // Policy and provider disagree on what exists; a configuration
                // bug, surfaced to the caller like any unknown secret.
                warn!(
                    secret = %request.secret_name,
                    "provider has no value for policy-listed secret"
                );
                return BrokerResult::SecretUnknown;
            }
        };

        info!(secret = %request.secret_name, receiver = %request.send_to, "delivering secret");
        match self.delivery.send(&request.send_to, value).await {
            DeliveryOutcome::Delivered => {
                info!(secret = %request.secret_name, receiver = %request.send_to, "delivered");
                BrokerResult::Delivered
            }
            outcome @ (DeliveryOutcome::ReceiverRejected | DeliveryOutcome::TransportFailure) => {
                error!(
                    secret = %request.secret_name,
                    receiver = %request.send_to,
                    outcome = ?outcome,
                    "delivery failed"
                );
                BrokerResult::DeliveryFailed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::provider::SecretValue;

    struct FixedProvider(&'static str);

    impl SecretProvider for FixedProvider {
        fn get_secret(&self, _secret_name: &str) -> Result<SecretValue, ProviderError> {
            Ok(self.0.to_string())
        }
    }

    struct MissingProvider;

    impl SecretProvider for MissingProvider {
        fn get_secret(&self, secret_name: &str) -> Result<SecretValue, ProviderError> {
            Err(ProviderError::NotFound {
                name: secret_name.to_string(),
            })
        }
    }

    struct StaticDelivery(DeliveryOutcome);

    #[async_trait]
    impl DeliveryClient for StaticDelivery {
        async fn send(&self, _receiver: &str, _value: SecretValue) -> DeliveryOutcome {
            self.0
        }
    }

    #[derive(Clone, Default)]
    struct RecordingDelivery {
        calls: Arc<Mutex<Vec<(String, SecretValue)>>>,
    }

    #[async_trait]
    impl DeliveryClient for RecordingDelivery {
        async fn send(&self, receiver: &str, value: SecretValue) -> DeliveryOutcome {
            self.calls
                .lock()
                .unwrap()
                .push((receiver.to_string(), value));
            DeliveryOutcome::Delivered
        }
    }

    fn policy(entries: &[(&str, &[&str])]) -> AccessPolicy {
        let receivers: HashMap<String, HashSet<String>> = entries
            .iter()
            .map(|(name, targets)| {
                (
                    name.to_string(),
                    targets.iter().map(|t| t.to_string()).collect(),
                )
            })
            .collect();
        AccessPolicy::new(receivers)
    }

    fn request(secret_name: &str, send_to: &str) -> SecretRequest {
        SecretRequest {
            secret_name: secret_name.to_string(),
            send_to: send_to.to_string(),
        }
    }

    #[tokio::test]
    async fn unknown_secret_regardless_of_receiver() {
        let broker = SecretBroker::new(
            policy(&[("db-password", &["http://x/receive"])]),
            FixedProvider("value"),
            StaticDelivery(DeliveryOutcome::Delivered),
        );

        for receiver in ["http://x/receive", "http://evil/receive"] {
            assert_eq!(
                broker.handle(&request("api-token", receiver)).await,
                BrokerResult::SecretUnknown
            );
        }
    }

    #[tokio::test]
    async fn unlisted_receiver_is_forbidden() {
        let broker = SecretBroker::new(
            policy(&[("db-password", &["http://x/receive"])]),
            FixedProvider("value"),
            StaticDelivery(DeliveryOutcome::Delivered),
        );

        assert_eq!(
            broker
                .handle(&request("db-password", "http://evil/receive"))
                .await,
            BrokerResult::Forbidden
        );
    }

    #[tokio::test]
    async fn authorized_pair_delivers() {
        let delivery = RecordingDelivery::default();
        let broker = SecretBroker::new(
            policy(&[("db-password", &["http://x/receive"])]),
            FixedProvider("v4lue"),
            delivery.clone(),
        );

        assert_eq!(
            broker
                .handle(&request("db-password", "http://x/receive"))
                .await,
            BrokerResult::Delivered
        );

        let calls = delivery.calls.lock().unwrap();
        assert_eq!(
            calls.as_slice(),
            [("http://x/receive".to_string(), "v4lue".to_string())]
        );
    }

    #[tokio::test]
    async fn delivery_failures_collapse_to_one_result() {
        for outcome in [
            DeliveryOutcome::ReceiverRejected,
            DeliveryOutcome::TransportFailure,
        ] {
            let broker = SecretBroker::new(
                policy(&[("db-password", &["http://x/receive"])]),
                FixedProvider("value"),
                StaticDelivery(outcome),
            );

            assert_eq!(
                broker
                    .handle(&request("db-password", "http://x/receive"))
                    .await,
                BrokerResult::DeliveryFailed
            );
        }
    }

    #[tokio::test]
    async fn provider_miss_on_listed_secret_reads_as_unknown() {
        let delivery = RecordingDelivery::default();
        let broker = SecretBroker::new(
            policy(&[("db-password", &["http://x/receive"])]),
            MissingProvider,
            delivery.clone(),
        );

        assert_eq!(
            broker
                .handle(&request("db-password", "http://x/receive"))
                .await,
            BrokerResult::SecretUnknown
        );
        // Nothing may leave the process when the value cannot be produced.
        assert!(delivery.calls.lock().unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_requests_resolve_independently() {
        let entries: Vec<(String, String)> = (0..16)
            .map(|i| (format!("secret-{i}"), format!("http://receiver-{i}/receive")))
            .collect();
        let receivers: HashMap<String, HashSet<String>> = entries
            .iter()
            .map(|(name, receiver)| (name.clone(), HashSet::from([receiver.clone()])))
            .collect();

        let delivery = RecordingDelivery::default();
        let broker = Arc::new(SecretBroker::new(
            AccessPolicy::new(receivers),
            FixedProvider("value"),
            delivery.clone(),
        ));

        let mut handles = Vec::new();
        for (name, receiver) in entries.clone() {
            let broker = Arc::clone(&broker);
            handles.push(tokio::spawn(async move {
                broker.handle(&request(&name, &receiver)).await
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap(), BrokerResult::Delivered);
        }

        let calls = delivery.calls.lock().unwrap();
        assert_eq!(calls.len(), entries.len());
        for (_, receiver) in &entries {
            assert_eq!(
                calls.iter().filter(|(target, _)| target == receiver).count(),
                1,
                "exactly one delivery per receiver"
            );
        }
    }
}
