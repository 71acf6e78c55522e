//! JSON-file backed store.
//!
//! The whole collection lives in one JSON object on disk. Every read goes to
//! the file, so changes written by another process (the CLI adding a
//! tracker while the poller runs) are picked up on the next access.
//!
//! Every mutation is a read-modify-write of the whole document, done while
//! holding an exclusive advisory lock on a sibling `.lock` file. That lock is
//! shared by every handle in every process, so writers never overwrite each
//! other's changes. The new document goes to a uniquely named temp file in
//! the same directory and is then renamed over the old one: the file on
//! disk always holds either the previous or the new collection.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use parking_lot::Mutex;
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::trace;

use crate::error::StoreError;
use crate::port::{KeyValueStore, UpdateFn};

type Collection = BTreeMap<String, Value>;

/// A [`KeyValueStore`] persisted as a single JSON document.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock_path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open the store at `path`, creating parent directories as needed.
    ///
    /// A missing file is an empty collection; nothing is written until the
    /// first `set`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| io_error(parent, source))?;
            }
        }
        Ok(Self {
            lock_path: path.with_extension("lock"),
            path,
            write_lock: Mutex::new(()),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Collection, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Collection::new()),
            Err(source) => return Err(io_error(&self.path, source)),
        };
        if contents.trim().is_empty() {
            return Ok(Collection::new());
        }
        serde_json::from_str(&contents).map_err(|source| StoreError::Corrupt {
            key: self.path.display().to_string(),
            source,
        })
    }

    /// Run `mutate` on the current collection under the cross-process lock,
    /// writing the result back if `mutate` returns `true`.
    fn modify<T>(
        &self,
        mutate: impl FnOnce(&mut Collection) -> (bool, T),
    ) -> Result<T, StoreError> {
        let _guard = self.write_lock.lock();
        let _file_lock = self.lock_exclusive()?;

        let mut collection = self.read()?;
        let (changed, result) = mutate(&mut collection);
        if changed {
            self.write(&collection)?;
        }
        Ok(result)
    }

    /// The returned file holds the lock until it is dropped.
    fn lock_exclusive(&self) -> Result<File, StoreError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_path)
            .map_err(|source| io_error(&self.lock_path, source))?;
        FileExt::lock_exclusive(&file).map_err(|source| io_error(&self.lock_path, source))?;
        Ok(file)
    }

    fn write(&self, collection: &Collection) -> Result<(), StoreError> {
        let json =
            serde_json::to_string_pretty(collection).map_err(|source| StoreError::Encode {
                key: self.path.display().to_string(),
                source,
            })?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = NamedTempFile::new_in(dir).map_err(|source| io_error(dir, source))?;
        temp.write_all(json.as_bytes())
            .map_err(|source| io_error(temp.path(), source))?;
        temp.as_file()
            .sync_all()
            .map_err(|source| io_error(temp.path(), source))?;
        temp.persist(&self.path)
            .map_err(|e| io_error(&self.path, e.error))?;

        trace!(path = %self.path.display(), keys = collection.len(), "Store written");
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.read()?.remove(key))
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.modify(|collection| {
            collection.insert(key.to_string(), value);
            (true, ())
        })
    }

    fn remove(&self, key: &str) -> Result<bool, StoreError> {
        self.modify(|collection| {
            let removed = collection.remove(key).is_some();
            (removed, removed)
        })
    }

    fn update(&self, key: &str, apply: &mut UpdateFn<'_>) -> Result<(), StoreError> {
        self.modify(|collection| {
            let current = collection.get(key).cloned();
            let next = apply(current.clone());
            if next == current {
                return (false, ());
            }
            match next {
                Some(value) => collection.insert(key.to_string(), value),
                None => collection.remove(key),
            };
            (true, ())
        })
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.read()?.into_keys().collect())
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}
