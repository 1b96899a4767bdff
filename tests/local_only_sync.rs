#![cfg(not(target_arch = "wasm32"))]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use studymate_sync::config::{PersistenceMode, StudyMateConfig};
use studymate_sync::local::{InMemoryKeyValueStorage, KeyValueStorage};
use studymate_sync::model::{AppData, NewTask, Theme, DEFAULT_SUBJECTS};
use studymate_sync::storage::ImageUpload;
use studymate_sync::sync::{StudyMateContext, SyncClient};

fn local_client(storage: Arc<InMemoryKeyValueStorage>, interval: Duration) -> SyncClient {
    let config = StudyMateConfig::default()
        .with_sync_interval(interval)
        .expect("non-zero interval");
    SyncClient::new(&StudyMateContext::builder(config).with_storage(storage).build())
}

fn task(text: &str) -> NewTask {
    NewTask {
        text: text.into(),
        ..NewTask::default()
    }
}

#[tokio::test(flavor = "current_thread")]
async fn empty_storage_loads_default_document() {
    let client = local_client(Arc::new(InMemoryKeyValueStorage::new()), Duration::from_secs(3));

    assert_eq!(client.mode(), PersistenceMode::LocalOnly);
    let data = client.load().await;
    assert_eq!(data.subjects, DEFAULT_SUBJECTS);
    assert_eq!(data.subjects.len(), 14);
    assert!(data.tasks.is_empty());
    assert!(data.events.is_empty());
    assert!(data.schedule.is_empty());
    assert!(data.folders.is_empty());
    assert!(data.general_files.is_empty());
    assert!(data.flashcards.is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn save_then_load_round_trips() {
    let client = local_client(Arc::new(InMemoryKeyValueStorage::new()), Duration::from_secs(3));
    let mut data = client.load().await;
    data.add_task(task("Entregar informe"));
    data.add_folder("Química orgánica");
    data.add_subject("Música");

    client.save(&data).await;
    assert_eq!(client.load().await, data);
}

#[tokio::test(flavor = "current_thread")]
async fn corrupt_storage_loads_defaults() {
    let storage = Arc::new(InMemoryKeyValueStorage::new());
    storage
        .set_item("studymate_shared_data", "{\"tasks\": [")
        .unwrap();
    let client = local_client(storage, Duration::from_secs(3));

    assert_eq!(client.load().await, AppData::default());
}

#[tokio::test(flavor = "current_thread")]
async fn quota_failures_are_swallowed() {
    let storage = Arc::new(InMemoryKeyValueStorage::with_quota(64));
    let client = local_client(storage, Duration::from_secs(3));

    client.save(&AppData::default()).await;
    assert_eq!(client.load().await, AppData::default());
}

#[tokio::test(flavor = "current_thread")]
async fn subscribe_is_a_no_op() {
    let client = local_client(Arc::new(InMemoryKeyValueStorage::new()), Duration::from_secs(3));
    let subscription = client.subscribe(Arc::new(|_: AppData| panic!("unexpected push")));
    assert!(subscription.is_noop());

    let mut data = AppData::default();
    data.add_task(task("x"));
    client.save(&data).await;
    subscription.unsubscribe();
}

#[tokio::test(flavor = "current_thread")]
async fn polling_reports_external_changes_once() {
    let storage = Arc::new(InMemoryKeyValueStorage::new());
    let watcher = local_client(Arc::clone(&storage), Duration::from_millis(20));
    let other_tab = local_client(storage, Duration::from_millis(20));

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let subscription = watcher
        .start_polling(
            Duration::from_millis(20),
            Arc::new(move |data: AppData| sink.lock().unwrap().push(data)),
        )
        .await;

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(seen.lock().unwrap().is_empty());

    let mut data = other_tab.load().await;
    data.add_task(task("Hecho en otra pestaña"));
    other_tab.save(&data).await;

    tokio::time::sleep(Duration::from_millis(120)).await;
    drop(subscription);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0], data);
}

#[tokio::test(flavor = "current_thread")]
async fn zero_polling_interval_still_yields_to_other_tasks() {
    let storage = Arc::new(InMemoryKeyValueStorage::new());
    let watcher = local_client(Arc::clone(&storage), Duration::from_millis(20));
    let writer = local_client(storage, Duration::from_millis(20));

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let subscription = watcher
        .start_polling(
            Duration::ZERO,
            Arc::new(move |data: AppData| sink.lock().unwrap().push(data)),
        )
        .await;

    // A poller that never suspends would starve this single-threaded runtime here.
    tokio::time::sleep(Duration::from_millis(30)).await;
    let mut data = writer.load().await;
    data.add_subject("Astronomía");
    writer.save(&data).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    drop(subscription);

    assert_eq!(*seen.lock().unwrap(), [data]);
}

#[tokio::test(flavor = "current_thread")]
async fn changes_channel_uses_polling_in_local_mode() {
    let storage = Arc::new(InMemoryKeyValueStorage::new());
    let watcher = local_client(Arc::clone(&storage), Duration::from_millis(10));
    let writer = local_client(storage, Duration::from_millis(10));

    let (receiver, subscription) = watcher.changes().await;

    let mut data = AppData::default();
    data.add_subject("Astronomía");
    writer.save(&data).await;

    let received = tokio::time::timeout(Duration::from_secs(2), receiver.recv())
        .await
        .expect("change within timeout")
        .expect("open channel");
    assert!(received.subjects.iter().any(|subject| subject == "Astronomía"));
    drop(subscription);
}

#[tokio::test(flavor = "current_thread")]
async fn uploads_are_inlined_and_deletes_are_noops() {
    let client = local_client(Arc::new(InMemoryKeyValueStorage::new()), Duration::from_secs(3));
    let file = client
        .upload_image(
            ImageUpload::new("horario.png", &b"\x89PNG"[..]).with_content_type("image/png"),
            None,
        )
        .await;

    assert_eq!(file.kind, "image");
    assert_eq!(file.name, "horario.png");
    assert_eq!(file.url, "data:image/png;base64,iVBORw==");
    assert_eq!(file.storage_path, None);

    let mut data = AppData::default();
    data.add_general_file(file.clone());
    client.save(&data).await;
    let removed = client.delete_general_file(&mut data, &file.id).await;
    assert_eq!(removed, Some(file));
    assert!(client.load().await.general_files.is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn theme_preference_persists() {
    let storage = Arc::new(InMemoryKeyValueStorage::new());
    let client = local_client(Arc::clone(&storage), Duration::from_secs(3));

    assert_eq!(client.theme(), None);
    client.set_theme(Theme::Dark);
    assert_eq!(client.theme(), Some(Theme::Dark));
    assert_eq!(
        storage.get_item("studymate_theme").unwrap().as_deref(),
        Some("dark")
    );
}
