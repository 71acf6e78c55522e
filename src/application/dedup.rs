//! Separates freshly scraped events from already-recorded history.

use std::collections::HashSet;

use crate::domain::{ActivityEvent, EventIdentity};

/// Return the events in `fresh` whose identity key does not appear in
/// `known`, preserving the order of `fresh`.
///
/// Membership is by identity key only; the order of `known` is irrelevant.
/// Repeats inside `fresh` are all returned; the history keeps one of them.
#[must_use]
pub fn diff(fresh: &[ActivityEvent], known: &[ActivityEvent]) -> Vec<ActivityEvent> {
    let known: HashSet<EventIdentity<'_>> = known.iter().map(ActivityEvent::identity).collect();

    fresh
        .iter()
        .filter(|event| !known.contains(&event.identity()))
        .cloned()
        .collect()
}
