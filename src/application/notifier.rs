//! Fan-out of new events to every registered destination of an entity.
//!
//! Destinations are independent: one that cannot be resolved or that
//! rejects a message never affects delivery to the others, and a failed
//! message never prevents the next message to the same destination.

use std::ops::AddAssign;
use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{debug, warn};

use super::blocking::store_io;
use super::message::MessageFormatter;
use super::registry::{Listener, ListenerRegistry};
use crate::domain::{ActivityEvent, Destination, EntityKey};
use crate::error::NotificationError;
use crate::port::{NotificationMessage, NotificationTransport};

/// Outcome counters for one fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Destinations that were attempted.
    pub destinations: usize,
    /// Destinations skipped because they could not be resolved.
    pub unresolved: usize,
    /// Messages accepted by their destination.
    pub delivered: usize,
    /// Messages that failed to deliver.
    pub failed: usize,
}

impl AddAssign for DeliveryReport {
    fn add_assign(&mut self, other: Self) {
        self.destinations += other.destinations;
        self.unresolved += other.unresolved;
        self.delivered += other.delivered;
        self.failed += other.failed;
    }
}

/// Sends event notifications through a [`NotificationTransport`].
pub struct EventNotifier {
    registry: Arc<ListenerRegistry>,
    transport: Arc<dyn NotificationTransport>,
    formatter: MessageFormatter,
}

impl EventNotifier {
    pub fn new(
        registry: Arc<ListenerRegistry>,
        transport: Arc<dyn NotificationTransport>,
        formatter: MessageFormatter,
    ) -> Self {
        Self {
            registry,
            transport,
            formatter,
        }
    }

    #[must_use]
    pub fn formatter(&self) -> &MessageFormatter {
        &self.formatter
    }

    /// Deliver every event in `events`, in order, to each destination
    /// currently registered for `entity`.
    ///
    /// Never fails; problems are logged and counted in the report.
    pub async fn notify(&self, entity: &EntityKey, events: &[ActivityEvent]) -> DeliveryReport {
        if events.is_empty() {
            return DeliveryReport::default();
        }

        let registry = Arc::clone(&self.registry);
        let key = entity.clone();
        match store_io(move || registry.listeners_for(&key)).await {
            Ok(listeners) => self.notify_listeners(entity, &listeners, events).await,
            Err(e) => {
                warn!(entity = %entity, error = %e, "Failed to load listeners, skipping notification");
                DeliveryReport::default()
            }
        }
    }

    /// Deliver `events` to an explicit listener snapshot.
    pub async fn notify_listeners(
        &self,
        entity: &EntityKey,
        listeners: &[Listener],
        events: &[ActivityEvent],
    ) -> DeliveryReport {
        let messages: Vec<NotificationMessage> = events
            .iter()
            .map(|event| self.formatter.event_message(entity, event))
            .collect();

        let reports = join_all(
            listeners
                .iter()
                .map(|listener| self.deliver_sequence(entity, listener, &messages)),
        )
        .await;

        let mut total = DeliveryReport::default();
        for report in reports {
            total += report;
        }
        debug!(
            entity = %entity,
            destinations = total.destinations,
            delivered = total.delivered,
            failed = total.failed,
            "Notifications dispatched"
        );
        total
    }

    /// Resolve `destination` and send a single message to it.
    pub async fn send(
        &self,
        destination: &Destination,
        message: &NotificationMessage,
    ) -> Result<(), NotificationError> {
        self.transport.resolve(destination)?;
        self.transport.deliver(destination, message).await
    }

    async fn deliver_sequence(
        &self,
        entity: &EntityKey,
        listener: &Listener,
        messages: &[NotificationMessage],
    ) -> DeliveryReport {
        let mut report = DeliveryReport {
            destinations: 1,
            ..DeliveryReport::default()
        };

        if let Err(e) = self.transport.resolve(&listener.destination) {
            warn!(
                entity = %entity,
                group = %listener.group,
                error = %e,
                "Skipping unresolvable destination"
            );
            report.unresolved = 1;
            return report;
        }

        for message in messages {
            match self.transport.deliver(&listener.destination, message).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!(
                        entity = %entity,
                        group = %listener.group,
                        title = %message.title,
                        error = %e,
                        "Notification delivery failed"
                    );
                    report.failed += 1;
                }
            }
        }
        report
    }
}
