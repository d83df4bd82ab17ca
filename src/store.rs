// src/store.rs

//! Flat-file JSON persistence.
//!
//! Every collection lives in exactly one file holding a JSON array. Reads load
//! the whole array, writes replace the whole file. Each collection has its own
//! writer lock so that a load-modify-save cycle run through [`RecordStore::update`]
//! cannot lose a concurrent writer's change.

use std::{
    collections::HashMap,
    fmt, fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use serde::{Serialize, de::DeserializeOwned};
use tempfile::NamedTempFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    People,
    Accounts,
    Lessons,
    Exercises,
    Exams,
    Results,
    Posts,
    Achievements,
}

impl Collection {
    pub const ALL: [Collection; 8] = [
        Collection::People,
        Collection::Accounts,
        Collection::Lessons,
        Collection::Exercises,
        Collection::Exams,
        Collection::Results,
        Collection::Posts,
        Collection::Achievements,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Collection::People => "people.json",
            Collection::Accounts => "accounts.json",
            Collection::Lessons => "lessons.json",
            Collection::Exercises => "exercises.json",
            Collection::Exams => "exams.json",
            Collection::Results => "results.json",
            Collection::Posts => "posts.json",
            Collection::Achievements => "achievements.json",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// A record type that is persisted as one element of a collection file.
pub trait Record: Serialize + DeserializeOwned {
    const COLLECTION: Collection;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode {collection}: {source}")]
    Encode {
        collection: Collection,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to replace {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: tempfile::PersistError,
    },
    #[error("writer lock for {0} is poisoned")]
    LockPoisoned(Collection),
}

pub struct RecordStore {
    root: PathBuf,
    locks: HashMap<Collection, Mutex<()>>,
}

impl RecordStore {
    /// Opens (and creates, if needed) the data directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StoreError::Io {
            path: root.clone(),
            source,
        })?;

        let locks = Collection::ALL
            .into_iter()
            .map(|c| (c, Mutex::new(())))
            .collect();

        Ok(Self { root, locks })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, collection: Collection) -> PathBuf {
        self.root.join(collection.file_name())
    }

    /// Loads a whole collection. Absent, empty or unparsable files yield an empty list.
    pub fn load<T: Record>(&self) -> Result<Vec<T>, StoreError> {
        let _guard = self.lock(T::COLLECTION)?;
        self.read(T::COLLECTION)
    }

    /// Overwrites a whole collection.
    pub fn save<T: Record>(&self, records: &[T]) -> Result<(), StoreError> {
        let _guard = self.lock(T::COLLECTION)?;
        self.write(T::COLLECTION, records)
    }

    /// Runs `f` on the current contents of a collection while holding its writer
    /// lock, then saves the (possibly modified) list. If `f` fails nothing is written.
    pub fn update<T, R, E, F>(&self, f: F) -> Result<R, E>
    where
        T: Record,
        E: From<StoreError>,
        F: FnOnce(&mut Vec<T>) -> Result<R, E>,
    {
        let _guard = self.lock(T::COLLECTION)?;
        let mut records = self.read(T::COLLECTION)?;
        let out = f(&mut records)?;
        self.write(T::COLLECTION, &records)?;
        Ok(out)
    }

    fn lock(&self, collection: Collection) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.locks[&collection]
            .lock()
            .map_err(|_| StoreError::LockPoisoned(collection))
    }

    fn read<T: DeserializeOwned>(&self, collection: Collection) -> Result<Vec<T>, StoreError> {
        let path = self.path_of(collection);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str(&raw) {
            Ok(records) => Ok(records),
            Err(e) => {
                let aside = path.with_extension("json.corrupt");
                tracing::warn!(
                    %collection,
                    error = %e,
                    "Malformed collection file, treating it as empty (moved to {})",
                    aside.display()
                );
                if let Err(rename_err) = fs::rename(&path, &aside) {
                    tracing::error!("Failed to move aside {}: {}", path.display(), rename_err);
                }
                Ok(Vec::new())
            }
        }
    }

    fn write<T: Serialize>(&self, collection: Collection, records: &[T]) -> Result<(), StoreError> {
        let path = self.path_of(collection);
        let bytes = serde_json::to_vec_pretty(records)
            .map_err(|source| StoreError::Encode { collection, source })?;

        // Write next to the target so the rename stays on one filesystem.
        let mut tmp = NamedTempFile::new_in(&self.root).map_err(|source| StoreError::Io {
            path: self.root.clone(),
            source,
        })?;
        tmp.write_all(&bytes)
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|source| StoreError::Io {
                path: tmp.path().to_path_buf(),
                source,
            })?;
        tmp.persist(&path)
            .map_err(|source| StoreError::Persist { path, source })?;

        tracing::debug!(%collection, records = records.len(), "Collection saved");
        Ok(())
    }
}
