//! # studymate-sync
//!
//! Persistence and sync layer of the StudyMate study planner.
//!
//! The whole application state is one aggregate document, [`model::AppData`]. It is loaded,
//! saved and watched as a unit through [`sync::SyncClient`], which runs in one of two modes
//! fixed at startup:
//!
//! - **remote-backed**: a hosted document database holds the shared document, an object store
//!   holds uploaded images, and local key-value storage is the write-through cache and fallback;
//! - **local-only**: local key-value storage is the only store and callers poll for changes.
//!
//! No sync operation returns an error. Remote failures fall back to the local copy or are
//! logged and dropped.
//!
//! ```no_run
//! use std::sync::Arc;
//! use studymate_sync::config::StudyMateConfig;
//! use studymate_sync::model::{AppData, NewTask};
//! use studymate_sync::sync::{StudyMateContext, SyncClient};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = StudyMateConfig::from_env()?;
//! let client = SyncClient::new(&StudyMateContext::from_config(config));
//!
//! let mut data = client.load().await;
//! data.add_task(NewTask {
//!     text: "Repasar derivadas".into(),
//!     subject: "Cálculo".into(),
//!     ..NewTask::default()
//! });
//! client.save(&data).await;
//!
//! let _watch = client
//!     .watch(Arc::new(|latest: AppData| println!("{} tasks", latest.tasks.len())))
//!     .await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod firestore;
pub mod local;
pub mod logger;
pub mod model;
pub mod platform;
pub mod security;
pub mod storage;
pub mod sync;
pub mod util;
