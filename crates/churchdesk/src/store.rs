//! In-memory record collections mirrored to a [`KeyValueStore`].
//!
//! A [`RecordStore`] is loaded once when opened and saved explicitly after
//! every successful mutation. When a save fails the mutation is undone, so
//! the in-memory collection always matches what was last persisted.

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::records::{Record, RecordId};
use crate::storage::{load_collection, save_collection, KeyValueStore};

/// How a collection was populated when it was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Read back from storage.
    Persisted,
    /// Nothing was stored; the default rows were seeded.
    Defaults,
    /// Stored data could not be decoded; it was set aside and defaults seeded.
    Recovered,
}

/// Key a malformed collection is copied to before it is replaced.
#[must_use]
pub fn corrupt_backup_key(key: &str) -> String {
    format!("{key}.corrupt")
}

/// Load the collection under `key`, seeding and saving `seed()` when nothing
/// usable is stored.
///
/// Malformed data is copied to [`corrupt_backup_key`] before the defaults
/// overwrite it.
///
/// # Errors
///
/// Returns an error if the backend itself fails.
pub fn load_or_seed<T, S>(
    store: &S,
    key: &str,
    seed: impl FnOnce() -> Vec<T>,
) -> Result<(Vec<T>, LoadSource)>
where
    T: Serialize + DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match load_collection(store, key) {
        Ok(Some(records)) => {
            debug!("Loaded {} records from {}", records.len(), key);
            Ok((records, LoadSource::Persisted))
        }
        Ok(None) => {
            let records = seed();
            save_collection(store, key, &records)?;
            info!("Seeded {} default records under {}", records.len(), key);
            Ok((records, LoadSource::Defaults))
        }
        Err(Error::CorruptState { key, source }) => {
            let backup = corrupt_backup_key(&key);
            warn!(
                "Stored value under {} is unreadable ({}); moving it to {} and restoring defaults",
                key, source, backup
            );
            if let Some(raw) = store.get(&key)? {
                store.set(&backup, &raw)?;
            }
            let records = seed();
            save_collection(store, &key, &records)?;
            Ok((records, LoadSource::Recovered))
        }
        Err(e) => Err(e),
    }
}

/// An ordered collection of one record kind.
#[derive(Debug)]
pub struct RecordStore<R, S> {
    store: S,
    records: Vec<R>,
    source: LoadSource,
}

impl<R: Record, S: KeyValueStore> RecordStore<R, S> {
    /// Load the collection for `R` from `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read or the seeded defaults
    /// cannot be saved.
    pub fn open(store: S) -> Result<Self> {
        let (records, source) = load_or_seed(&store, R::KIND.storage_key(), R::seed)?;
        Ok(Self {
            store,
            records,
            source,
        })
    }

    /// How the collection was populated.
    #[must_use]
    pub fn source(&self) -> LoadSource {
        self.source
    }

    /// All records in insertion order.
    #[must_use]
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Look up a record by identifier.
    #[must_use]
    pub fn get(&self, id: RecordId) -> Option<&R> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The identifier the next created record will get: one more than the
    /// largest existing identifier, or 1. Identifiers are always positive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the largest identifier is already
    /// `RecordId::MAX`.
    pub fn next_id(&self) -> Result<RecordId> {
        self.records
            .iter()
            .map(Record::id)
            .max()
            .unwrap_or(0)
            .max(0)
            .checked_add(1)
            .ok_or_else(|| Error::validation(format!("no {} identifiers left", R::KIND)))
    }

    /// Validate `draft`, append it as a new record and save.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the draft is rejected, or a storage
    /// error if the save fails. The collection is unchanged in both cases.
    pub fn create(&mut self, draft: R::Draft) -> Result<&R> {
        let record = R::from_draft(self.next_id()?, draft)?;
        let id = record.id();
        self.records.push(record);

        if let Err(e) = self.save() {
            self.records.pop();
            return Err(e);
        }

        info!("Created {} {}", R::KIND, id);
        self.last()
    }

    /// Merge `patch` into the record with identifier `id` and save.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown identifier,
    /// [`Error::Validation`] if the merged record is invalid, or a storage
    /// error if the save fails. The collection is unchanged in every case.
    pub fn update(&mut self, id: RecordId, patch: R::Patch) -> Result<&R> {
        let index = self.position(id)?;
        let previous = self.records[index].clone();
        self.records[index].apply_patch(patch)?;

        if let Err(e) = self.save() {
            self.records[index] = previous;
            return Err(e);
        }

        info!("Updated {} {}", R::KIND, id);
        Ok(&self.records[index])
    }

    /// Remove the record with identifier `id` once `confirm` agrees.
    ///
    /// `confirm` sees the record about to be removed. Returns the removed
    /// record; the remaining records keep their order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown identifier,
    /// [`Error::Cancelled`] if `confirm` declines, or a storage error if the
    /// save fails. The collection is unchanged in every case.
    pub fn delete(&mut self, id: RecordId, confirm: impl FnOnce(&R) -> bool) -> Result<R> {
        let index = self.position(id)?;
        if !confirm(&self.records[index]) {
            return Err(Error::cancelled(format!("delete of {} {id}", R::KIND)));
        }

        let removed = self.records.remove(index);
        if let Err(e) = self.save() {
            self.records.insert(index, removed);
            return Err(e);
        }

        info!("Deleted {} {}", R::KIND, id);
        Ok(removed)
    }

    fn position(&self, id: RecordId) -> Result<usize> {
        self.records
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| Error::not_found(R::KIND.label(), id))
    }

    fn last(&self) -> Result<&R> {
        self.records
            .last()
            .ok_or_else(|| Error::internal("collection empty after insert"))
    }

    fn save(&self) -> Result<()> {
        save_collection(&self.store, R::KIND.storage_key(), &self.records)
    }
}
