//! Persistent store for the portal document.
//!
//! The whole procurement state is one JSON document kept under a single key in
//! the `local_storage` table. Every mutation follows the same discipline: load
//! the full document, change a copy, save the full document back. There is no
//! locking; the last save wins.
//!
//! An absent key yields the seed document. A key holding unreadable JSON is
//! reported as [`Error::CorruptDocument`] and left untouched until the caller
//! explicitly discards it with [`Store::reset`].

use crate::{
    core::migrate,
    entities::{StorageEntry, storage_entry},
    errors::{Error, Result},
    models::PortalDocument,
};
use sea_orm::{Set, prelude::*};
use serde_json::Value;
use tracing::{debug, error, info, warn};

/// Handle to the stored portal document.
#[derive(Debug, Clone)]
pub struct Store {
    db: DatabaseConnection,
    key: String,
    seed: PortalDocument,
}

impl Store {
    /// Creates a store over `db` that keeps its document under `key`.
    ///
    /// `seed` is returned by [`Store::load`] while the key is absent and written by
    /// [`Store::initialize`] and [`Store::reset`].
    pub fn new(db: DatabaseConnection, key: impl Into<String>, seed: PortalDocument) -> Self {
        Self {
            db,
            key: key.into(),
            seed,
        }
    }

    /// The storage key this store reads and writes.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The seed document.
    #[must_use]
    pub const fn seed(&self) -> &PortalDocument {
        &self.seed
    }

    /// Reads the stored text under the key, if any.
    pub async fn read_raw(&self) -> Result<Option<String>> {
        let entry = StorageEntry::find()
            .filter(storage_entry::Column::Key.eq(self.key.as_str()))
            .one(&self.db)
            .await?;
        Ok(entry.map(|e| e.value))
    }

    /// Overwrites the stored text under the key (insert or update).
    pub async fn write_raw(&self, value: String) -> Result<()> {
        let now = chrono::Utc::now().naive_utc();

        let existing = StorageEntry::find()
            .filter(storage_entry::Column::Key.eq(self.key.as_str()))
            .one(&self.db)
            .await?;

        if let Some(entry) = existing {
            let mut active_model: storage_entry::ActiveModel = entry.into();
            active_model.value = Set(value);
            active_model.updated_at = Set(now);
            active_model.update(&self.db).await?;
        } else {
            let new_entry = storage_entry::ActiveModel {
                key: Set(self.key.clone()),
                value: Set(value),
                updated_at: Set(now),
                ..Default::default()
            };
            new_entry.insert(&self.db).await?;
        }

        Ok(())
    }

    /// Loads the current document.
    ///
    /// Returns the seed when nothing (or JSON `null`) is stored. Legacy shapes are
    /// normalized on the way in.
    ///
    /// # Errors
    /// [`Error::CorruptDocument`] when the stored text cannot be read as a portal
    /// document; the stored text is left as is.
    pub async fn load(&self) -> Result<PortalDocument> {
        let Some(raw) = self.read_raw().await? else {
            debug!("No document stored under '{}', using seed", self.key);
            return Ok(self.seed.clone());
        };

        let parsed = serde_json::from_str::<Value>(&raw)
            .map_err(|e| e.to_string())
            .and_then(|value| {
                if value.is_null() {
                    Ok(None)
                } else {
                    migrate::normalize(value).map(Some)
                }
            });

        match parsed {
            Ok(Some(document)) => {
                debug!(
                    "Loaded document '{}': {} vendor(s), {} RFP(s), {} bid(s)",
                    self.key,
                    document.vendors.len(),
                    document.rfps.len(),
                    document.bids.len()
                );
                Ok(document)
            }
            Ok(None) => {
                debug!("Document under '{}' is null, using seed", self.key);
                Ok(self.seed.clone())
            }
            Err(message) => {
                error!(
                    "Stored document under '{}' is unreadable and was not loaded: {}",
                    self.key, message
                );
                Err(Error::CorruptDocument {
                    key: self.key.clone(),
                    message,
                })
            }
        }
    }

    /// Serializes `document` and overwrites the stored one in a single write.
    pub async fn save(&self, document: &PortalDocument) -> Result<()> {
        let value = serde_json::to_string(document)?;
        self.write_raw(value).await?;
        debug!("Saved document '{}'", self.key);
        Ok(())
    }

    /// Writes the seed if the key is absent, then returns the current document.
    pub async fn initialize(&self) -> Result<PortalDocument> {
        if self.read_raw().await?.is_none() {
            info!("Initializing '{}' with the seed document", self.key);
            self.save(&self.seed).await?;
            return Ok(self.seed.clone());
        }
        self.load().await
    }

    /// Discards whatever is stored and writes the seed document.
    ///
    /// This is the explicit acknowledgement path for a corrupt document.
    pub async fn reset(&self) -> Result<PortalDocument> {
        warn!("Resetting '{}' to the seed document", self.key);
        self.save(&self.seed).await?;
        Ok(self.seed.clone())
    }

    /// Runs one load-mutate-save cycle.
    ///
    /// `mutate` works on a loaded copy; the copy is saved only if it returns `Ok`,
    /// so a failed operation leaves the stored document untouched.
    pub async fn update<T, F>(&self, mutate: F) -> Result<T>
    where
        F: FnOnce(&mut PortalDocument) -> Result<T>,
    {
        let mut document = self.load().await?;
        let value = mutate(&mut document)?;
        self.save(&document).await?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_load_returns_seed_when_empty() -> Result<()> {
        let store = setup_test_store().await?;

        let document = store.load().await?;
        assert_eq!(&document, store.seed());
        // Loading never writes
        assert!(store.read_raw().await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_initialize_writes_seed_once() -> Result<()> {
        let store = setup_test_store().await?;

        store.initialize().await?;
        let first = store.read_raw().await?.unwrap();

        store
            .update(|doc| {
                doc.projects.push("Riverside".into());
                Ok(())
            })
            .await?;
        let document = store.initialize().await?;
        assert!(document.projects.contains(&"Riverside".to_string()));
        assert_ne!(store.read_raw().await?.unwrap(), first);
        Ok(())
    }

    #[tokio::test]
    async fn test_save_load_round_trip_is_stable() -> Result<()> {
        let (store, _rfp_id) = setup_with_bids().await?;

        let before = store.read_raw().await?.unwrap();
        let document = store.load().await?;
        store.save(&document).await?;
        let after = store.read_raw().await?.unwrap();

        assert_eq!(before, after);
        assert_eq!(store.load().await?, document);
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupt_document_is_reported_not_replaced() -> Result<()> {
        init_test_tracing();
        let store = setup_test_store().await?;
        store.write_raw("{not json".to_string()).await?;

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, Error::CorruptDocument { .. }));
        // Nothing was discarded
        assert_eq!(store.read_raw().await?.unwrap(), "{not json");

        // Mutations refuse to run on top of unreadable state
        let result = store.update(|_| Ok(())).await;
        assert!(matches!(result, Err(Error::CorruptDocument { .. })));

        // Explicit reset recovers
        let document = store.reset().await?;
        assert_eq!(&document, store.seed());
        assert_eq!(store.load().await?, document);
        Ok(())
    }

    #[tokio::test]
    async fn test_null_document_is_treated_as_absent() -> Result<()> {
        let store = setup_test_store().await?;
        store.write_raw("null".to_string()).await?;
        assert_eq!(&store.load().await?, store.seed());
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_update_writes_nothing() -> Result<()> {
        let store = setup_test_store().await?;
        store.initialize().await?;
        let before = store.read_raw().await?;

        let result: Result<()> = store
            .update(|doc| {
                doc.counters.rfp += 10;
                Err(Error::validation("abort"))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(store.read_raw().await?, before);
        Ok(())
    }

    #[tokio::test]
    async fn test_stores_are_isolated_by_key() -> Result<()> {
        let store = setup_test_store().await?;
        store.initialize().await?;

        let other = Store::new(store.db.clone(), "other-key", PortalDocument::default());
        assert!(other.read_raw().await?.is_none());
        other.initialize().await?;
        assert!(other.load().await?.vendors.is_empty());
        assert_eq!(store.load().await?.vendors.len(), 3);
        Ok(())
    }
}
