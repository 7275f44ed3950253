//! Persistence of the bearer credential.
//!
//! Exactly one credential is active per browser session. The token is opaque:
//! nothing in the portal parses or inspects it.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tower_sessions::Session;

/// Session key under which the credential is persisted.
pub const TOKEN_KEY: &str = "token";

#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("session storage error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("token store lock poisoned")]
    Poisoned,
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn get(&self) -> Result<Option<String>, TokenStoreError>;

    async fn set(&self, credential: String) -> Result<(), TokenStoreError>;

    async fn clear(&self) -> Result<(), TokenStoreError>;
}

/// Credential kept in the browser's server-side session; survives page
/// reloads for as long as the session cookie does.
#[derive(Clone)]
pub struct SessionTokenStore {
    session: Session,
}

impl SessionTokenStore {
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}

#[async_trait]
impl TokenStore for SessionTokenStore {
    async fn get(&self) -> Result<Option<String>, TokenStoreError> {
        Ok(self.session.get::<String>(TOKEN_KEY).await?)
    }

    async fn set(&self, credential: String) -> Result<(), TokenStoreError> {
        // New credential, new session id: a pre-login cookie must not carry over.
        self.session.cycle_id().await?;
        self.session.insert(TOKEN_KEY, credential).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), TokenStoreError> {
        self.session.remove::<String>(TOKEN_KEY).await?;
        Ok(())
    }
}

/// In-process credential holder for embedding the session core outside a
/// web request (tools, tests).
#[derive(Clone, Default)]
pub struct MemoryTokenStore {
    credential: Arc<Mutex<Option<String>>>,
}

impl MemoryTokenStore {
    pub fn with_token(credential: impl Into<String>) -> Self {
        Self {
            credential: Arc::new(Mutex::new(Some(credential.into()))),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self) -> Result<Option<String>, TokenStoreError> {
        let guard = self.credential.lock().map_err(|_| TokenStoreError::Poisoned)?;
        Ok(guard.clone())
    }

    async fn set(&self, credential: String) -> Result<(), TokenStoreError> {
        let mut guard = self.credential.lock().map_err(|_| TokenStoreError::Poisoned)?;
        *guard = Some(credential);
        Ok(())
    }

    async fn clear(&self) -> Result<(), TokenStoreError> {
        let mut guard = self.credential.lock().map_err(|_| TokenStoreError::Poisoned)?;
        *guard = None;
        Ok(())
    }
}
