use std::sync::Arc;

use crate::broker::SecretBroker;
use crate::delivery::DeliveryClient;
use crate::provider::SecretProvider;

pub type SharedBroker = Arc<SecretBroker<Box<dyn SecretProvider>, Box<dyn DeliveryClient>>>;

/// Shared, read-only request state. The policy and provider never change
/// after startup and each delivery call is self-contained, so no lock is
/// needed around the broker.
#[derive(Clone)]
pub struct AppState {
    pub broker: SharedBroker,
}

impl AppState {
    pub fn new(broker: SharedBroker) -> Self {
        Self { broker }
    }
}
