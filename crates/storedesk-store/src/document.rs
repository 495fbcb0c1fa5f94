//! Versioned documents on top of the key-value store.

use std::marker::PhantomData;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Store, StoreError};

/// Maximum retry attempts for [`DocumentStore::update`].
const MAX_UPDATE_RETRIES: u32 = 3;

/// A stored document and its bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document<T> {
    /// Document id within its collection.
    pub id: String,
    /// The stored value.
    pub data: T,
    /// Incremented on every save, starting at 1.
    pub version: u64,
    /// When the document was created (Unix timestamp).
    pub created_at: u64,
    /// When the document was last saved (Unix timestamp).
    pub updated_at: u64,
}

/// A collection of documents of one type, stored under `<collection>:<id>`.
///
/// Saves carry the version they were based on; a save against a version
/// that has since moved on fails with [`StoreError::ConcurrentModification`].
pub struct DocumentStore<T> {
    store: Store,
    collection: String,
    _phantom: PhantomData<T>,
}

impl<T> DocumentStore<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    /// Wrap `store` as the collection `collection`.
    pub fn new(store: Store, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
            _phantom: PhantomData,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Load a document.
    pub fn load(&self, id: &str) -> Result<Option<Document<T>>, StoreError> {
        self.store.get(&self.key(id))
    }

    /// Load a document, failing if it does not exist.
    pub fn require(&self, id: &str) -> Result<Document<T>, StoreError> {
        self.load(id)?
            .ok_or_else(|| StoreError::NotFound(self.key(id)))
    }

    /// Create a new document at version 1.
    pub fn create(&self, id: &str, data: T) -> Result<Document<T>, StoreError> {
        let key = self.key(id);
        if self.store.exists(&key)? {
            return Err(StoreError::AlreadyExists(key));
        }
        let now = now();
        let doc = Document {
            id: id.to_string(),
            data,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        self.store.set(&key, &doc)?;
        debug!(key = %key, "document created");
        Ok(doc)
    }

    /// Save `data` over version `expected_version`.
    pub fn save(
        &self,
        id: &str,
        data: T,
        expected_version: u64,
    ) -> Result<Document<T>, StoreError> {
        let key = self.key(id);
        let current = self.require(id)?;
        if current.version != expected_version {
            warn!(
                key = %key,
                expected = expected_version,
                found = current.version,
                "stale document save refused"
            );
            return Err(StoreError::ConcurrentModification {
                key,
                expected: expected_version,
                found: current.version,
            });
        }
        let doc = Document {
            id: current.id,
            data,
            version: current.version + 1,
            created_at: current.created_at,
            updated_at: now(),
        };
        self.store.set(&key, &doc)?;
        debug!(key = %key, version = doc.version, "document saved");
        Ok(doc)
    }

    /// Read, change and save a document, retrying on concurrent writes.
    pub fn update<F>(&self, id: &str, f: F) -> Result<Document<T>, StoreError>
    where
        F: Fn(T) -> T,
    {
        let mut last_error = None;
        for _attempt in 0..MAX_UPDATE_RETRIES {
            let current = self.require(id)?;
            match self.save(id, f(current.data), current.version) {
                Ok(doc) => return Ok(doc),
                Err(e @ StoreError::ConcurrentModification { .. }) => last_error = Some(e),
                Err(e) => return Err(e),
            }
        }
        Err(last_error.unwrap_or_else(|| StoreError::NotFound(self.key(id))))
    }

    /// Delete a document. Returns whether it existed.
    pub fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let key = self.key(id);
        let existed = self.store.exists(&key)?;
        self.store.delete(&key)?;
        Ok(existed)
    }

    /// Ids of all documents in the collection, sorted.
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        let prefix = format!("{}:", self.collection);
        Ok(self
            .store
            .keys_with_prefix(&prefix)?
            .into_iter()
            .map(|k| k[prefix.len()..].to_string())
            .collect())
    }

    fn key(&self, id: &str) -> String {
        format!("{}:{}", self.collection, id)
    }
}

fn now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
