//! Key-value persistence port.
//!
//! Each store instance holds one collection (history, listeners, allow
//! list). Values are JSON documents; typed access goes through
//! [`TypedStoreExt`].

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::StoreError;

/// Closure applied by [`KeyValueStore::update`]: current value in, value to
/// store out (`None` deletes the key).
pub type UpdateFn<'a> = dyn FnMut(Option<Value>) -> Option<Value> + 'a;

/// A durable string-keyed collection of JSON values.
///
/// `set`, `remove` and `update` must be atomic: after a crash the collection
/// holds either the old or the new value for the key, never a torn write.
/// Implementations shared between processes must also serialize writers
/// across those processes.
pub trait KeyValueStore: Send + Sync {
    /// Get the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Replace the value stored under `key`.
    fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    /// Remove `key`. Returns whether it was present.
    fn remove(&self, key: &str) -> Result<bool, StoreError>;

    /// Read-modify-write `key` with no other writer in between.
    ///
    /// Nothing is written when `apply` returns the value it was given.
    fn update(&self, key: &str, apply: &mut UpdateFn<'_>) -> Result<(), StoreError>;

    /// All keys currently present, in sorted order.
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

/// Serde helpers over any [`KeyValueStore`].
pub trait TypedStoreExt {
    fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError>;

    fn set_as<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError>;

    /// Typed [`KeyValueStore::update`]. A value that fails to decode is left
    /// untouched and reported as [`StoreError::Corrupt`].
    fn update_as<T, F>(&self, key: &str, apply: F) -> Result<(), StoreError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(Option<T>) -> Option<T>;
}

impl<S: KeyValueStore + ?Sized> TypedStoreExt for S {
    fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        self.get(key)?
            .map(|value| {
                serde_json::from_value(value).map_err(|source| StoreError::Corrupt {
                    key: key.to_string(),
                    source,
                })
            })
            .transpose()
    }

    fn set_as<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let value = serde_json::to_value(value).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.set(key, value)
    }

    fn update_as<T, F>(&self, key: &str, apply: F) -> Result<(), StoreError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(Option<T>) -> Option<T>,
    {
        let mut apply = Some(apply);
        let mut failure = None;

        self.update(key, &mut |current: Option<Value>| -> Option<Value> {
            let Some(apply) = apply.take() else {
                return current;
            };
            let decoded = match current.clone().map(serde_json::from_value::<T>).transpose() {
                Ok(decoded) => decoded,
                Err(source) => {
                    failure = Some(StoreError::Corrupt {
                        key: key.to_string(),
                        source,
                    });
                    return current;
                }
            };
            match apply(decoded).map(|value| serde_json::to_value(&value)).transpose() {
                Ok(next) => next,
                Err(source) => {
                    failure = Some(StoreError::Encode {
                        key: key.to_string(),
                        source,
                    });
                    current
                }
            }
        })?;

        failure.map_or(Ok(()), Err)
    }
}
