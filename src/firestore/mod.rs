//! Remote document store: the single shared aggregate document in a hosted document database.

mod document;
pub mod error;
mod http;
mod in_memory;
mod rpc_error;
pub mod serializer;

pub use document::{
    DocumentPath, DocumentSnapshot, DocumentStore, SnapshotCallback, SnapshotErrorCallback,
};
pub use error::{FirestoreError, FirestoreErrorCode, FirestoreResult};
pub use http::{HttpDocumentStore, HttpDocumentStoreBuilder};
pub use in_memory::InMemoryDocumentStore;
pub use rpc_error::map_http_error;
