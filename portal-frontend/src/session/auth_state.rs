use std::sync::Arc;
use tokio::sync::watch;

use super::events::{SessionEvent, SessionEvents};
use super::token_store::TokenStore;
use crate::models::Identity;

/// Where session resolution stands for the current load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Resolution in flight or not yet attempted.
    Pending,
    /// Resolved with an identity.
    Authenticated,
    /// Resolved without one: no credential, or it was rejected.
    Anonymous,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthSnapshot {
    pub status: SessionStatus,
    pub identity: Option<Identity>,
}

impl AuthSnapshot {
    fn pending() -> Self {
        Self {
            status: SessionStatus::Pending,
            identity: None,
        }
    }

    fn settled(identity: Option<Identity>) -> Self {
        let status = if identity.is_some() {
            SessionStatus::Authenticated
        } else {
            SessionStatus::Anonymous
        };
        Self { status, identity }
    }
}

/// Identity and resolution status of one browser session, shared by every
/// view of the current load.
///
/// Only login, logout, profile-save and session resolution write to it.
#[derive(Clone)]
pub struct AuthState {
    snapshot: Arc<watch::Sender<AuthSnapshot>>,
    store: Arc<dyn TokenStore>,
    events: SessionEvents,
}

impl AuthState {
    pub fn new(store: Arc<dyn TokenStore>, events: SessionEvents) -> Self {
        let (snapshot, _) = watch::channel(AuthSnapshot::pending());
        Self {
            snapshot: Arc::new(snapshot),
            store,
            events,
        }
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.snapshot.borrow().status
    }

    pub fn identity(&self) -> Option<Identity> {
        self.snapshot.borrow().identity.clone()
    }

    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    pub fn events(&self) -> &SessionEvents {
        &self.events
    }

    /// Replaces the identity directly, without a resolution round trip.
    /// Callers must have stored the credential first.
    pub fn set_identity(&self, identity: Option<Identity>) {
        self.snapshot.send_replace(AuthSnapshot::settled(identity));
    }

    /// Finishes resolution for this load.
    pub(crate) fn resolve_to(&self, identity: Option<Identity>) {
        self.snapshot.send_replace(AuthSnapshot::settled(identity));
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.snapshot.subscribe()
    }

    /// Waits until resolution has settled either way.
    pub async fn wait_until_resolved(&self) -> SessionStatus {
        let mut receiver = self.subscribe();
        let status = match receiver
            .wait_for(|snapshot| snapshot.status != SessionStatus::Pending)
            .await
        {
            Ok(snapshot) => snapshot.status,
            // The sender lives in `self`, so it cannot be dropped while we wait.
            Err(_) => self.status(),
        };
        status
    }

    /// Clears the credential, forgets the identity and asks the router to
    /// navigate to the login view. Safe to call when already signed out.
    pub async fn logout(&self) {
        if let Err(e) = self.store.clear().await {
            tracing::error!(error = %e, "Failed to clear credential during logout");
        }

        let previous = self.identity();
        self.snapshot.send_replace(AuthSnapshot::settled(None));
        self.events.publish(SessionEvent::LoggedOut);

        match previous {
            Some(identity) => tracing::info!(user_id = %identity.id, "User logged out"),
            None => tracing::debug!("Logout without an active identity"),
        }
    }
}
