//! Notification transport port.
//!
//! Defines the structured message the engine produces and the trait for
//! delivering it to a destination such as a webhook.

use async_trait::async_trait;

use crate::domain::Destination;
use crate::error::NotificationError;

/// One named field of a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageField {
    pub name: String,
    pub value: String,
}

impl MessageField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A structured, human-readable notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationMessage {
    pub title: String,
    pub description: Option<String>,
    pub fields: Vec<MessageField>,
    pub thumbnail_url: Option<String>,
}

impl NotificationMessage {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(MessageField::new(name, value));
        self
    }

    /// Value of the first field called `name`.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.value.as_str())
    }
}

/// Delivers notifications to destinations.
///
/// Each `deliver` call is at-most-once and best-effort: implementations
/// report failure and never retry.
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    /// Check that `destination` is something this transport can address.
    fn resolve(&self, destination: &Destination) -> Result<(), NotificationError>;

    /// Deliver one message to one destination.
    async fn deliver(
        &self,
        destination: &Destination,
        message: &NotificationMessage,
    ) -> Result<(), NotificationError>;
}
