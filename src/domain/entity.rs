//! Tracked entities: marketplace collections and wallets.
//!
//! Both kinds share one tracking pipeline. They differ only in where their
//! activity feed lives and in how their notifications are framed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use url::Url;

/// The kind of entity whose activity feed is polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// An item collection on the marketplace.
    Collection,
    /// A wallet profile on the marketplace.
    Wallet,
}

impl EntityKind {
    /// Path segment of the marketplace page that lists this kind's activity.
    #[must_use]
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::Collection => "collections",
            Self::Wallet => "profile",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Collection => "collection",
            Self::Wallet => "wallet",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "collection" => Ok(Self::Collection),
            "wallet" => Ok(Self::Wallet),
            other => Err(format!("unknown entity kind '{other}'")),
        }
    }
}

/// Identity of a tracked entity: its kind plus its name or address.
///
/// Rendered as `kind:name`, which is also the key used in every persisted
/// collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityKey {
    kind: EntityKind,
    name: String,
}

impl EntityKey {
    /// Create a key from a kind and an already-extracted name.
    pub fn new(kind: EntityKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    /// Extract the entity name from a user-supplied link.
    ///
    /// The name is the last non-empty path segment of the link, so both
    /// `https://alto.build/collections/foo` and `foo` yield `foo`.
    /// Returns `None` when no usable name can be found.
    #[must_use]
    pub fn from_link(kind: EntityKind, link: &str) -> Option<Self> {
        let link = link.trim();
        let name = match Url::parse(link) {
            Ok(url) => url
                .path_segments()?
                .filter(|segment| !segment.is_empty())
                .last()?
                .to_string(),
            Err(_) => link.trim_end_matches('/').rsplit('/').next()?.to_string(),
        };

        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return None;
        }
        Some(Self::new(kind, name))
    }

    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// URL of this entity's page on the marketplace.
    ///
    /// `base_url` is expected to end with `/`.
    #[must_use]
    pub fn source_url(&self, base_url: &str) -> String {
        format!("{base_url}{}/{}", self.kind.path_segment(), self.name)
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.name)
    }
}

impl FromStr for EntityKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, name) = s
            .split_once(':')
            .ok_or_else(|| format!("entity key '{s}' is missing a kind prefix"))?;
        if name.is_empty() {
            return Err(format!("entity key '{s}' has an empty name"));
        }
        Ok(Self::new(kind.parse()?, name))
    }
}

impl Serialize for EntityKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EntityKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_link_takes_last_path_segment() {
        let key = EntityKey::from_link(
            EntityKind::Collection,
            "https://alto.build/collections/canto-longnecks/",
        )
        .unwrap();
        assert_eq!(key.name(), "canto-longnecks");
        assert_eq!(key.kind(), EntityKind::Collection);
    }

    #[test]
    fn from_link_accepts_bare_names() {
        let key = EntityKey::from_link(EntityKind::Wallet, "0xabc").unwrap();
        assert_eq!(key.name(), "0xabc");
    }

    #[test]
    fn from_link_rejects_empty_links() {
        assert!(EntityKey::from_link(EntityKind::Wallet, "").is_none());
        assert!(EntityKey::from_link(EntityKind::Wallet, "https://alto.build/").is_none());
        assert!(EntityKey::from_link(EntityKind::Wallet, "two words").is_none());
    }

    #[test]
    fn source_url_uses_kind_template() {
        let base = "https://alto.build/";
        assert_eq!(
            EntityKey::new(EntityKind::Collection, "foo").source_url(base),
            "https://alto.build/collections/foo"
        );
        assert_eq!(
            EntityKey::new(EntityKind::Wallet, "0xabc").source_url(base),
            "https://alto.build/profile/0xabc"
        );
    }

    #[test]
    fn key_string_form_parses_back() {
        let key = EntityKey::new(EntityKind::Wallet, "0xabc");
        assert_eq!(key.to_string(), "wallet:0xabc");
        assert_eq!("wallet:0xabc".parse::<EntityKey>().unwrap(), key);
        assert!("0xabc".parse::<EntityKey>().is_err());
        assert!("vault:0xabc".parse::<EntityKey>().is_err());
    }
}
