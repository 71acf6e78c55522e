//! Discord-style webhook transport.
//!
//! Each message becomes one embed posted to the destination URL. Delivery is
//! a single POST with no retry.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use reqwest::Client as HttpClient;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::domain::Destination;
use crate::error::NotificationError;
use crate::port::{NotificationMessage, NotificationTransport};

/// Response bodies longer than this are cut in error messages.
const MAX_ERROR_BODY: usize = 200;

/// Webhook sender identity and HTTP settings.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub sender_name: String,
    pub sender_avatar_url: Option<String>,
    pub request_timeout: Duration,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            sender_name: "Alto Tracker".into(),
            sender_avatar_url: None,
            request_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    username: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    avatar_url: Option<&'a str>,
    embeds: [Embed<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Embed<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    fields: Vec<EmbedField<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thumbnail: Option<EmbedImage<'a>>,
    timestamp: String,
}

#[derive(Debug, Serialize)]
struct EmbedField<'a> {
    name: &'a str,
    value: &'a str,
    inline: bool,
}

#[derive(Debug, Serialize)]
struct EmbedImage<'a> {
    url: &'a str,
}

/// Posts notifications to webhook URLs.
pub struct WebhookTransport {
    http: HttpClient,
    config: WebhookConfig,
}

impl WebhookTransport {
    #[must_use]
    pub fn new(config: WebhookConfig) -> Self {
        let http = HttpClient::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });
        Self { http, config }
    }

    fn parse(destination: &Destination) -> Result<Url, NotificationError> {
        let invalid = |reason: String| NotificationError::InvalidDestination {
            destination: destination.to_string(),
            reason,
        };

        let url = Url::parse(destination.as_str()).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(invalid("missing host".into()));
        }
        Ok(url)
    }

    fn payload<'a>(&'a self, message: &'a NotificationMessage) -> WebhookPayload<'a> {
        WebhookPayload {
            username: &self.config.sender_name,
            avatar_url: self.config.sender_avatar_url.as_deref(),
            embeds: [Embed {
                title: &message.title,
                description: message.description.as_deref(),
                fields: message
                    .fields
                    .iter()
                    .map(|field| EmbedField {
                        name: &field.name,
                        value: &field.value,
                        inline: false,
                    })
                    .collect(),
                thumbnail: message
                    .thumbnail_url
                    .as_deref()
                    .map(|url| EmbedImage { url }),
                timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            }],
        }
    }
}

#[async_trait]
impl NotificationTransport for WebhookTransport {
    fn resolve(&self, destination: &Destination) -> Result<(), NotificationError> {
        Self::parse(destination).map(|_| ())
    }

    async fn deliver(
        &self,
        destination: &Destination,
        message: &NotificationMessage,
    ) -> Result<(), NotificationError> {
        let url = Self::parse(destination)?;

        let response = self
            .http
            .post(url)
            .json(&self.payload(message))
            .send()
            .await
            .map_err(|e| NotificationError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(title = %message.title, status = status.as_u16(), "Webhook delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn transport() -> WebhookTransport {
        WebhookTransport::new(WebhookConfig {
            sender_name: "Alto Tracker".into(),
            sender_avatar_url: Some("https://img/avatar.png".into()),
            request_timeout: Duration::from_secs(1),
        })
    }

    #[test]
    fn resolve_accepts_http_urls() {
        let transport = transport();
        let destination = Destination::new("https://discord.com/api/webhooks/1/abc");

        assert!(transport.resolve(&destination).is_ok());
    }

    #[test]
    fn resolve_rejects_non_urls_and_other_schemes() {
        let transport = transport();

        for raw in ["not a url", "ftp://example.com/hook", "mailto:someone@example.com"] {
            let err = transport.resolve(&Destination::new(raw)).unwrap_err();
            assert!(
                matches!(err, NotificationError::InvalidDestination { .. }),
                "{raw}: {err}"
            );
        }
    }

    #[test]
    fn payload_is_a_single_embed() {
        let transport = transport();
        let message = NotificationMessage::new("Sale")
            .with_field("Price", "10 CANTO")
            .with_field("Token", "[Link](https://alto.build/collections/foo/1)");

        let json: Value = serde_json::to_value(transport.payload(&message)).unwrap();

        assert_eq!(json["username"], "Alto Tracker");
        assert_eq!(json["avatar_url"], "https://img/avatar.png");
        let embeds = json["embeds"].as_array().unwrap();
        assert_eq!(embeds.len(), 1);
        assert_eq!(embeds[0]["title"], "Sale");
        assert_eq!(embeds[0]["fields"][0]["name"], "Price");
        assert_eq!(embeds[0]["fields"][0]["value"], "10 CANTO");
        assert!(embeds[0].get("thumbnail").is_none());
        assert!(embeds[0].get("description").is_none());
        assert!(embeds[0]["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn payload_carries_thumbnail() {
        let transport = transport();
        let mut message = NotificationMessage::new("List");
        message.thumbnail_url = Some("https://img/1.png".into());

        let json: Value = serde_json::to_value(transport.payload(&message)).unwrap();

        assert_eq!(json["embeds"][0]["thumbnail"]["url"], "https://img/1.png");
    }

    #[tokio::test]
    async fn unreachable_host_is_a_delivery_error() {
        let transport = transport();
        let destination = Destination::new("http://127.0.0.1:9/hook");

        let err = transport
            .deliver(&destination, &NotificationMessage::new("Testing"))
            .await
            .unwrap_err();

        assert!(matches!(err, NotificationError::Unreachable(_)));
    }
}
