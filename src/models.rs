use serde::{Deserialize, Serialize};

/// One inbound delivery request. Field names are camelCase on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SecretRequest {
    pub secret_name: String,
    pub send_to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveredResponse {
    pub status: String,
}

impl DeliveredResponse {
    pub fn new() -> Self {
        Self {
            status: "delivered".into(),
        }
    }
}

impl Default for DeliveredResponse {
    fn default() -> Self {
        Self::new()
    }
}
