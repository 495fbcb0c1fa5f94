//! Versioned JSON document store for StoreDesk.
//!
//! Page trees are persisted as JSON documents keyed by page id. The store
//! is a thin typed layer over a byte key-value backend: in memory for tests
//! and previews, one file per key for the local tooling.
//!
//! # Example
//!
//! ```rust
//! use storedesk_store::{DocumentStore, Store};
//!
//! let pages: DocumentStore<serde_json::Value> =
//!     DocumentStore::new(Store::open_memory(), "page");
//!
//! let doc = pages.create("home", serde_json::json!({"id": "root", "type": "root"}))?;
//! assert_eq!(doc.version, 1);
//!
//! let doc = pages.save("home", doc.data, doc.version)?;
//! assert_eq!(doc.version, 2);
//! # Ok::<(), storedesk_store::StoreError>(())
//! ```

mod document;
mod error;
mod kv;

pub use document::{Document, DocumentStore};
pub use error::StoreError;
pub use kv::{FileBackend, KvBackend, MemoryBackend, Store};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Document, DocumentStore, Store, StoreError};
}
