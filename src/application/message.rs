//! Notification framing for activity events.

use crate::domain::{ActivityEvent, AddressLink, EntityKey, EntityKind};
use crate::error::ScrapeError;
use crate::port::NotificationMessage;

pub const FIELD_WALLET: &str = "Wallet tracked";
pub const FIELD_PRICE: &str = "Price";
pub const FIELD_FROM: &str = "From Address";
pub const FIELD_TO: &str = "To Address";
pub const FIELD_TOKEN: &str = "Token";

/// Builds notification messages from events.
#[derive(Debug, Clone)]
pub struct MessageFormatter {
    price_unit: String,
}

impl MessageFormatter {
    pub fn new(price_unit: impl Into<String>) -> Self {
        Self {
            price_unit: price_unit.into(),
        }
    }

    /// Message announcing one new event observed on `entity`.
    ///
    /// Wallet notifications lead with the tracked wallet, since the event
    /// itself may name a different address on either side.
    #[must_use]
    pub fn event_message(&self, entity: &EntityKey, event: &ActivityEvent) -> NotificationMessage {
        let mut message = NotificationMessage::new(event.event_type());

        if entity.kind() == EntityKind::Wallet {
            message = message.with_field(FIELD_WALLET, entity.name());
        }
        if let Some(price) = event.price() {
            message = message.with_field(FIELD_PRICE, format!("{price} {}", self.price_unit));
        }
        if let Some(from) = event.from_link() {
            message = message.with_field(FIELD_FROM, markdown_link(from));
        }
        if let Some(to) = event.to_link() {
            message = message.with_field(FIELD_TO, markdown_link(to));
        }
        message = message.with_field(FIELD_TOKEN, format!("[Link]({})", event.token_url()));
        message.thumbnail_url = event.preview_image_url().map(str::to_string);

        message
    }

    /// Message sent once to a destination to prove it accepts deliveries.
    #[must_use]
    pub fn test_message(&self) -> NotificationMessage {
        NotificationMessage::new("Testing").with_description("Testing the Webhook")
    }

    /// Operator alert for a failed scrape.
    #[must_use]
    pub fn scrape_failure_message(
        &self,
        entity: &EntityKey,
        url: &str,
        error: &ScrapeError,
    ) -> NotificationMessage {
        NotificationMessage::new("Scrape failed")
            .with_description(error.to_string())
            .with_field("Entity", entity.to_string())
            .with_field("Page", url)
    }
}

impl Default for MessageFormatter {
    fn default() -> Self {
        Self::new("CANTO")
    }
}

fn markdown_link(link: &AddressLink) -> String {
    format!("[{}]({})", link.address, link.url)
}
