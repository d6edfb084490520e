use crate::domain::shared::random::RandomSource;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CredentialError {
    #[error("No OpenAI API keys configured")]
    NoCredentialsConfigured,
}

/// An upstream API key. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredential(String);

impl ApiCredential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiCredential(***)")
    }
}

/// Supplies the credential to use for the next upstream call
pub trait CredentialProvider: Send + Sync {
    fn next(&self) -> Result<ApiCredential, CredentialError>;
}

/// Pool of interchangeable keys; each call picks one uniformly at random to
/// spread quota across accounts.
pub struct RandomCredentialPool {
    credentials: Vec<ApiCredential>,
    random: Arc<dyn RandomSource>,
}

impl RandomCredentialPool {
    pub fn new(keys: Vec<String>, random: Arc<dyn RandomSource>) -> Self {
        let credentials = keys.into_iter().map(ApiCredential::new).collect();
        Self {
            credentials,
            random,
        }
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }
}

impl CredentialProvider for RandomCredentialPool {
    fn next(&self) -> Result<ApiCredential, CredentialError> {
        if self.credentials.is_empty() {
            return Err(CredentialError::NoCredentialsConfigured);
        }

        let index = self.random.below(self.credentials.len());
        Ok(self.credentials[index].clone())
    }
}
