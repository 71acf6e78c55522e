//! Raw activity rows as read off the marketplace table.

use serde::Deserialize;

use crate::domain::{ActivityEvent, AddressLink};
use crate::error::ScrapeError;
use crate::port::ScrapeOutcome;

/// Cell text shown for an empty column.
const EMPTY_CELL: &str = "--";
/// Sender cell text for mints.
const NULL_ADDRESS: &str = "null address";

/// One table row, cell by cell, exactly as displayed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawActivityRow {
    pub event_type: String,
    pub token_id: String,
    pub preview_image_url: Option<String>,
    pub price: String,
    pub to_text: String,
    pub to_href: Option<String>,
    pub from_text: String,
    pub from_href: Option<String>,
}

/// Turn `rows` (newest first, as displayed) into unseen events, oldest
/// first.
///
/// Rows matching an event in `known` are skipped. A row that cannot be
/// interpreted stops processing; the events built so far are returned
/// alongside the error.
pub fn normalize_rows(
    rows: Vec<RawActivityRow>,
    entity_url: &str,
    price_unit: &str,
    known: &[ActivityEvent],
) -> ScrapeOutcome {
    let unit_suffix = format!("\n{price_unit}");
    let mut events = Vec::with_capacity(rows.len());

    for row in rows.into_iter().rev() {
        match normalize_row(row, entity_url, &unit_suffix) {
            Ok(event) => {
                if !known.contains(&event) {
                    events.push(event);
                }
            }
            Err(error) => {
                return ScrapeOutcome {
                    events,
                    error: Some(error),
                }
            }
        }
    }

    ScrapeOutcome::ok(events)
}

fn normalize_row(
    row: RawActivityRow,
    entity_url: &str,
    unit_suffix: &str,
) -> Result<ActivityEvent, ScrapeError> {
    let mut event = ActivityEvent::new(row.event_type, row.token_id, entity_url);

    if row.price != EMPTY_CELL {
        let price = row.price.strip_suffix(unit_suffix).unwrap_or(&row.price);
        event = event.with_price(price);
    }

    if row.to_text != EMPTY_CELL {
        event = event.with_to(address_link(row.to_href, "receiving")?);
    }

    if row.from_text != EMPTY_CELL && row.from_text != NULL_ADDRESS {
        event = event.with_from(address_link(row.from_href, "sending")?);
    }

    if let Some(image) = row.preview_image_url {
        event = event.with_preview_image(image);
    }

    Ok(event)
}

fn address_link(href: Option<String>, side: &str) -> Result<AddressLink, ScrapeError> {
    let href = href
        .filter(|href| !href.is_empty())
        .ok_or_else(|| ScrapeError::Parse(format!("couldn't parse {side} wallet address")))?;
    let address = href
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string();
    Ok(AddressLink::new(address, href))
}
