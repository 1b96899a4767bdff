//! The Sync Facade and the two persistence strategies behind it.

mod backend;
mod client;
mod context;
mod poller;

pub use backend::{
    backend_for, LocalOnlyBackend, RemoteBackedBackend, SyncBackend, SyncBackendHandle,
};
pub use client::SyncClient;
pub use context::{StudyMateContext, StudyMateContextBuilder};
