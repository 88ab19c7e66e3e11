use rand::distr::Alphanumeric;
use rand::Rng;
use thiserror::Error;

/// Opaque secret payload. Held only for the duration of one delivery attempt
/// and handed to exactly one network call; never written to a log sink.
pub type SecretValue = String;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("no secret strategy for '{name}'")]
    NotFound { name: String },
}

/// Produces the value for a named secret.
///
/// The broker only relies on this contract, so deterministic lookup, rotation,
/// or an external vault can replace the random strategy without touching any
/// other component.
pub trait SecretProvider: Send + Sync {
    fn get_secret(&self, secret_name: &str) -> Result<SecretValue, ProviderError>;
}

impl<T> SecretProvider for Box<T>
where
    T: SecretProvider + ?Sized,
{
    fn get_secret(&self, secret_name: &str) -> Result<SecretValue, ProviderError> {
        (**self).get_secret(secret_name)
    }
}

/// Synthesizes a fresh alphanumeric value on every call, regardless of name.
///
/// The thread RNG is cryptographically secure. Nothing is cached: two calls
/// for the same name are not guaranteed to match, and callers must not rely
/// on idempotence of this strategy.
pub struct RandomSecretProvider {
    length: usize,
}

impl RandomSecretProvider {
    pub const DEFAULT_LENGTH: usize = 32;

    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl Default for RandomSecretProvider {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LENGTH)
    }
}

impl SecretProvider for RandomSecretProvider {
    fn get_secret(&self, _secret_name: &str) -> Result<SecretValue, ProviderError> {
        let value = rand::rng()
            .sample_iter(Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect();
        Ok(value)
    }
}
