use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use alto_tracker::domain::Destination;
use alto_tracker::error::NotificationError;
use alto_tracker::port::{NotificationMessage, NotificationTransport};
use async_trait::async_trait;

#[derive(Default)]
struct State {
    sent: Vec<(Destination, NotificationMessage)>,
    unresolvable: HashSet<String>,
    failing: HashSet<String>,
}

/// Thread-safe message collector with per-destination failure injection.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    state: Arc<Mutex<State>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `destination` fail resolution.
    pub fn reject(&self, destination: &str) {
        self.lock().unresolvable.insert(destination.to_string());
    }

    /// Make every delivery to `destination` fail.
    pub fn fail_deliveries_to(&self, destination: &str) {
        self.lock().failing.insert(destination.to_string());
    }

    pub fn sent(&self) -> Vec<(Destination, NotificationMessage)> {
        self.lock().sent.clone()
    }

    /// Titles of messages accepted by `destination`, in delivery order.
    pub fn titles_to(&self, destination: &str) -> Vec<String> {
        self.messages_to(destination)
            .into_iter()
            .map(|message| message.title)
            .collect()
    }

    pub fn messages_to(&self, destination: &str) -> Vec<NotificationMessage> {
        self.lock()
            .sent
            .iter()
            .filter(|(d, _)| d.as_str() == destination)
            .map(|(_, message)| message.clone())
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("lock transport state")
    }
}

#[async_trait]
impl NotificationTransport for RecordingTransport {
    fn resolve(&self, destination: &Destination) -> Result<(), NotificationError> {
        if self.lock().unresolvable.contains(destination.as_str()) {
            return Err(NotificationError::InvalidDestination {
                destination: destination.to_string(),
                reason: "unknown webhook".into(),
            });
        }
        Ok(())
    }

    async fn deliver(
        &self,
        destination: &Destination,
        message: &NotificationMessage,
    ) -> Result<(), NotificationError> {
        let mut state = self.lock();
        if state.failing.contains(destination.as_str()) {
            return Err(NotificationError::Rejected {
                status: 500,
                body: "internal error".into(),
            });
        }
        state.sent.push((destination.clone(), message.clone()));
        Ok(())
    }
}
