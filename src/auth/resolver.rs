//! Resolves the signed-in user from the backend.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::api::{ApiClient, ClientError};
use crate::models::{User, UserEnvelope};

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// No token, or the backend rejected it. The session is cleared.
    #[error("not signed in")]
    Unauthenticated,
    #[error("could not resolve user: {0}")]
    Unavailable(String),
}

impl From<ClientError> for ResolveError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Unauthenticated => ResolveError::Unauthenticated,
            other => ResolveError::Unavailable(other.to_string()),
        }
    }
}

/// Source of the current user's profile. Every call fetches fresh.
#[async_trait]
pub trait UserSource: Send + Sync {
    async fn resolve(&self) -> Result<User, ResolveError>;
}

/// Fetches the profile via `GET /api/auth/user`.
pub struct UserResolver {
    client: Arc<ApiClient>,
}

impl UserResolver {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UserSource for UserResolver {
    async fn resolve(&self) -> Result<User, ResolveError> {
        match self.client.get::<UserEnvelope>("/api/auth/user").await {
            Ok(envelope) => {
                let user = User::from(envelope);
                debug!(user = %user.email, role = %user.role(), "Resolved user");
                Ok(user)
            }
            Err(ClientError::Unauthenticated) => Err(ResolveError::Unauthenticated),
            Err(e) => {
                warn!(error = %e, "Failed to resolve user");
                Err(e.into())
            }
        }
    }
}
