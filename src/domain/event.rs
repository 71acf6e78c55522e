//! Marketplace activity events and their identity key.
//!
//! An [`ActivityEvent`] is one observed marketplace action (sale, transfer,
//! listing, ...). Two events denote the same real-world occurrence when
//! their [`EventIdentity`] matches; every other field is payload carried
//! through to notifications.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::EventError;

/// A wallet address together with its profile link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressLink {
    pub address: String,
    pub url: String,
}

impl AddressLink {
    pub fn new(address: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            url: url.into(),
        }
    }
}

/// The five fields that decide whether two events are the same occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventIdentity<'a> {
    pub event_type: &'a str,
    pub token_id: &'a str,
    pub price: Option<&'a str>,
    pub to_address: Option<&'a str>,
    pub from_address: Option<&'a str>,
}

/// One observed marketplace action.
///
/// Equality and hashing consider only the identity key, never the preview
/// image or any of the `*_url` fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "EventRecord", into = "EventRecord")]
pub struct ActivityEvent {
    event_type: String,
    token_id: String,
    token_url: String,
    price: Option<String>,
    to: Option<AddressLink>,
    from: Option<AddressLink>,
    preview_image_url: Option<String>,
}

impl ActivityEvent {
    /// Create an event for `token_id` listed on the entity page at
    /// `entity_url`. The token link is derived as `entity_url/token_id`.
    pub fn new(
        event_type: impl Into<String>,
        token_id: impl Into<String>,
        entity_url: &str,
    ) -> Self {
        let token_id = token_id.into();
        let token_url = format!("{}/{}", entity_url.trim_end_matches('/'), token_id);
        Self {
            event_type: event_type.into(),
            token_id,
            token_url,
            price: None,
            to: None,
            from: None,
            preview_image_url: None,
        }
    }

    #[must_use]
    pub fn with_price(mut self, price: impl Into<String>) -> Self {
        self.price = Some(price.into());
        self
    }

    #[must_use]
    pub fn with_to(mut self, to: AddressLink) -> Self {
        self.to = Some(to);
        self
    }

    #[must_use]
    pub fn with_from(mut self, from: AddressLink) -> Self {
        self.from = Some(from);
        self
    }

    #[must_use]
    pub fn with_preview_image(mut self, url: impl Into<String>) -> Self {
        self.preview_image_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn identity(&self) -> EventIdentity<'_> {
        EventIdentity {
            event_type: &self.event_type,
            token_id: &self.token_id,
            price: self.price.as_deref(),
            to_address: self.to.as_ref().map(|to| to.address.as_str()),
            from_address: self.from.as_ref().map(|from| from.address.as_str()),
        }
    }

    #[must_use]
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    #[must_use]
    pub fn token_id(&self) -> &str {
        &self.token_id
    }

    #[must_use]
    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    #[must_use]
    pub fn price(&self) -> Option<&str> {
        self.price.as_deref()
    }

    #[must_use]
    pub fn to_link(&self) -> Option<&AddressLink> {
        self.to.as_ref()
    }

    #[must_use]
    pub fn from_link(&self) -> Option<&AddressLink> {
        self.from.as_ref()
    }

    #[must_use]
    pub fn preview_image_url(&self) -> Option<&str> {
        self.preview_image_url.as_deref()
    }
}

impl PartialEq for ActivityEvent {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for ActivityEvent {}

impl Hash for ActivityEvent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

/// Flat, persisted form of an event.
///
/// Field names match the history files written by earlier deployments of
/// the tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct EventRecord {
    pub event_type: Option<String>,
    pub token_id: Option<String>,
    pub token_url: Option<String>,
    pub price: Option<String>,
    pub to_address: Option<String>,
    pub to_address_url: Option<String>,
    pub from_address: Option<String>,
    pub from_address_url: Option<String>,
    pub preview_image_url: Option<String>,
}

fn address_pair(
    address: Option<String>,
    url: Option<String>,
    side: &'static str,
) -> Result<Option<AddressLink>, EventError> {
    match (address, url) {
        (Some(address), Some(url)) => Ok(Some(AddressLink { address, url })),
        (None, None) => Ok(None),
        _ => Err(EventError::HalfAddress { side }),
    }
}

impl TryFrom<EventRecord> for ActivityEvent {
    type Error = EventError;

    fn try_from(record: EventRecord) -> Result<Self, Self::Error> {
        let event_type = record.event_type.ok_or(EventError::MissingField {
            field: "event type",
        })?;
        let token_id = record
            .token_id
            .ok_or(EventError::MissingField { field: "token id" })?;
        let token_url = record.token_url.ok_or(EventError::MissingField {
            field: "token url",
        })?;

        Ok(Self {
            event_type,
            token_id,
            token_url,
            price: record.price,
            to: address_pair(record.to_address, record.to_address_url, "to")?,
            from: address_pair(record.from_address, record.from_address_url, "from")?,
            preview_image_url: record.preview_image_url,
        })
    }
}

impl From<ActivityEvent> for EventRecord {
    fn from(event: ActivityEvent) -> Self {
        let (to_address, to_address_url) = event
            .to
            .map_or((None, None), |to| (Some(to.address), Some(to.url)));
        let (from_address, from_address_url) = event
            .from
            .map_or((None, None), |from| (Some(from.address), Some(from.url)));

        Self {
            event_type: Some(event.event_type),
            token_id: Some(event.token_id),
            token_url: Some(event.token_url),
            price: event.price,
            to_address,
            to_address_url,
            from_address,
            from_address_url,
            preview_image_url: event.preview_image_url,
        }
    }
}
