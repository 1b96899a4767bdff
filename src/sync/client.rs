use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_channel::Receiver;
use futures::future::join_all;

use crate::config::constants::MIN_POLL_INTERVAL;
use crate::config::{PersistenceMode, StudyMateConfig};
use crate::logger::Logger;
use crate::local::LocalAdapter;
use crate::model::{AppData, FileItem, Folder, Theme};
use crate::storage::ImageUpload;
use crate::sync::backend::{backend_for, SyncBackendHandle};
use crate::sync::context::StudyMateContext;
use crate::sync::poller::spawn_poller;
use crate::util::{NextFn, Subscription};

static LOGGER: LazyLock<Logger> = LazyLock::new(|| Logger::new("@studymate/sync"));

/// The single entry point for loading, saving and watching the aggregate document.
///
/// The strategy is fixed when the client is built. None of the operations return errors:
/// remote failures fall back to local storage or are logged and dropped.
#[derive(Clone)]
pub struct SyncClient {
    backend: SyncBackendHandle,
    local: LocalAdapter,
    sync_interval: Duration,
}

impl std::fmt::Debug for SyncClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncClient")
            .field("mode", &self.mode())
            .field("sync_interval", &self.sync_interval)
            .finish()
    }
}

impl SyncClient {
    pub fn new(context: &StudyMateContext) -> Self {
        Self::with_backend(
            backend_for(context),
            context.local().clone(),
            context.config().sync_interval,
        )
    }

    pub fn from_config(config: StudyMateConfig) -> Self {
        Self::new(&StudyMateContext::from_config(config))
    }

    pub fn with_backend(
        backend: SyncBackendHandle,
        local: LocalAdapter,
        sync_interval: Duration,
    ) -> Self {
        Self {
            backend,
            local,
            sync_interval,
        }
    }

    pub fn mode(&self) -> PersistenceMode {
        self.backend.mode()
    }

    pub async fn load(&self) -> AppData {
        self.backend.load().await
    }

    pub async fn save(&self, data: &AppData) {
        self.backend.save(data).await;
    }

    /// Remote pushes in remote-backed mode; a no-op handle in local-only mode.
    pub fn subscribe(&self, callback: NextFn<AppData>) -> Subscription {
        self.backend.subscribe(callback)
    }

    pub async fn upload_image(&self, upload: ImageUpload, folder_id: Option<&str>) -> FileItem {
        self.backend.upload_image(upload, folder_id).await
    }

    /// Removes the file's blob when it lives in the object store; inline files are left alone.
    pub async fn delete_image(&self, file: &FileItem) {
        self.backend.delete_image(file).await;
    }

    /// Removes a folder, saves the document and deletes the folder's stored blobs.
    pub async fn delete_folder(&self, data: &mut AppData, folder_id: &str) -> Option<Folder> {
        let folder = data.remove_folder(folder_id)?;
        self.save(data).await;
        join_all(
            folder
                .files
                .iter()
                .filter(|file| file.is_remote())
                .map(|file| self.delete_image(file)),
        )
        .await;
        Some(folder)
    }

    pub async fn delete_general_file(&self, data: &mut AppData, file_id: &str) -> Option<FileItem> {
        let file = data.remove_general_file(file_id)?;
        self.save(data).await;
        self.delete_image(&file).await;
        Some(file)
    }

    pub async fn delete_folder_file(
        &self,
        data: &mut AppData,
        folder_id: &str,
        file_id: &str,
    ) -> Option<FileItem> {
        let file = data.remove_file_from_folder(folder_id, file_id)?;
        self.save(data).await;
        self.delete_image(&file).await;
        Some(file)
    }

    /// Re-loads every `interval` and calls back only when the document changed since the
    /// previous load. The first load happens before this returns and is not reported.
    /// Intervals shorter than [`MIN_POLL_INTERVAL`] are raised to it.
    pub async fn start_polling(&self, interval: Duration, callback: NextFn<AppData>) -> Subscription {
        let interval = if interval < MIN_POLL_INTERVAL {
            LOGGER.warn(format!(
                "polling interval {interval:?} is too short; using {MIN_POLL_INTERVAL:?}"
            ));
            MIN_POLL_INTERVAL
        } else {
            interval
        };
        let baseline = self.load().await;
        spawn_poller(Arc::clone(&self.backend), interval, baseline, callback)
    }

    /// Live pushes when remote-backed, polling at the configured interval when local-only.
    pub async fn watch(&self, callback: NextFn<AppData>) -> Subscription {
        match self.mode() {
            PersistenceMode::RemoteBacked => self.subscribe(callback),
            PersistenceMode::LocalOnly => self.start_polling(self.sync_interval, callback).await,
        }
    }

    /// [`watch`](Self::watch) delivered through a channel. Dropping the subscription closes
    /// the feed; the receiver then drains whatever is already queued.
    pub async fn changes(&self) -> (Receiver<AppData>, Subscription) {
        let (sender, receiver) = async_channel::unbounded();
        let subscription = self
            .watch(Arc::new(move |data: AppData| {
                // A dropped receiver only means nobody is listening any more.
                let _ = sender.try_send(data);
            }))
            .await;
        (receiver, subscription)
    }

    pub fn theme(&self) -> Option<Theme> {
        self.local.theme()
    }

    pub fn set_theme(&self, theme: Theme) {
        self.local.set_theme(theme);
    }
}
