use std::collections::{HashMap, HashSet};

/// Outcome of checking a (secret name, receiver) pair against the policy.
///
/// The two failure cases stay distinct: callers see 404 for an unknown secret
/// and 403 for a known secret with an unlisted receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    Allowed,
    UnknownSecret,
    ReceiverNotAllowed,
}

/// Static mapping from secret name to the receivers permitted to obtain it.
///
/// Built once at startup from configuration and never mutated afterwards, so
/// it is safe to share across request handlers without locking. An absent key
/// means the secret is unknown, never "allow all".
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    receivers: HashMap<String, HashSet<String>>,
}

impl AccessPolicy {
    pub fn new(receivers: HashMap<String, HashSet<String>>) -> Self {
        Self { receivers }
    }

    pub fn check(&self, secret_name: &str, receiver: &str) -> PolicyDecision {
        match self.receivers.get(secret_name) {
            None => PolicyDecision::UnknownSecret,
            Some(allowed) if allowed.contains(receiver) => PolicyDecision::Allowed,
            Some(_) => PolicyDecision::ReceiverNotAllowed,
        }
    }

    pub fn is_authorized(&self, secret_name: &str, receiver: &str) -> bool {
        matches!(self.check(secret_name, receiver), PolicyDecision::Allowed)
    }

    pub fn secret_count(&self) -> usize {
        self.receivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receivers.is_empty()
    }
}
