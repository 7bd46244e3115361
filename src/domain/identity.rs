use async_trait::async_trait;
use thiserror::Error;

/// Profile returned by an external identity provider
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalProfile {
    /// Provider-scoped user id
    pub provider_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    /// The provider answered but refused the access token
    #[error("access token rejected: {0}")]
    Rejected(String),

    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// External identity provider used for social login
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolves the profile that owns `access_token`
    async fn fetch_profile(&self, access_token: &str) -> Result<ExternalProfile, IdentityError>;
}
