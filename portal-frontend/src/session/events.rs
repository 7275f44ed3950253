use tokio::sync::broadcast;

/// Things that happened to the browser session while a view was running.
/// The session router turns both into navigation to the login view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The backend rejected the credential (HTTP 401); it has been cleared.
    Invalidated,
    /// The user logged out explicitly.
    LoggedOut,
}

/// Per-load event bus between the transport layer and the view router.
#[derive(Clone)]
pub struct SessionEvents {
    sender: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(8);
        Self { sender }
    }

    pub fn publish(&self, event: SessionEvent) {
        // No subscriber just means nobody is routing this load.
        if self.sender.send(event).is_err() {
            tracing::debug!(?event, "Session event published without subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}

/// Drains whatever is queued on `receiver` without waiting.
pub fn drain(receiver: &mut broadcast::Receiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    loop {
        match receiver.try_recv() {
            Ok(event) => events.push(event),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Session events dropped before routing");
            }
            Err(_) => break,
        }
    }
    events
}
