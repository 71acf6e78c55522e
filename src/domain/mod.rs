//! Marketplace-agnostic domain types: events, tracked entities, identifiers.

pub mod entity;
pub mod event;
pub mod id;

pub use entity::{EntityKey, EntityKind};
pub use event::{ActivityEvent, AddressLink, EventIdentity, EventRecord};
pub use id::{Destination, GroupId};
