//! Transport that only logs, used for dry runs.

use async_trait::async_trait;
use tracing::info;

use crate::domain::Destination;
use crate::error::NotificationError;
use crate::port::{NotificationMessage, NotificationTransport};

/// Accepts every destination and writes each message to the log.
#[derive(Debug, Default)]
pub struct LogTransport;

#[async_trait]
impl NotificationTransport for LogTransport {
    fn resolve(&self, _destination: &Destination) -> Result<(), NotificationError> {
        Ok(())
    }

    async fn deliver(
        &self,
        destination: &Destination,
        message: &NotificationMessage,
    ) -> Result<(), NotificationError> {
        let fields = message
            .fields
            .iter()
            .map(|field| format!("{}={}", field.name, field.value))
            .collect::<Vec<_>>()
            .join(", ");
        info!(
            destination = %destination,
            title = %message.title,
            fields = %fields,
            "Notification (dry run)"
        );
        Ok(())
    }
}
