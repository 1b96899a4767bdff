use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde_json::{json, Value as JsonValue};

use crate::config::constants::{MIN_POLL_INTERVAL, REMOTE_WATCH_INTERVAL};
use crate::firestore::document::{
    DocumentPath, DocumentSnapshot, DocumentStore, SnapshotCallback, SnapshotErrorCallback,
};
use crate::firestore::error::{internal_error, missing_project_id, FirestoreResult};
use crate::firestore::rpc_error::map_http_error;
use crate::firestore::serializer::{decode_document_fields, encode_document_fields};
use crate::logger::Logger;
use crate::platform::runtime::{sleep, spawn_detached};
use crate::util::Subscription;

static LOGGER: LazyLock<Logger> = LazyLock::new(|| Logger::new("@studymate/firestore"));

const FIRESTORE_API_HOST: &str = "https://firestore.googleapis.com";
const FIRESTORE_API_VERSION: &str = "v1";
const DEFAULT_DATABASE: &str = "(default)";

const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Firestore REST v1 client for single documents.
///
/// The REST surface has no push channel, so [`DocumentStore::listen`] runs a detached watch loop
/// that re-reads the document every `watch_interval` and reports each new `updateTime`.
#[derive(Clone, Debug)]
pub struct HttpDocumentStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    watch_interval: Duration,
    request_timeout: Option<Duration>,
}

#[derive(Clone, Debug)]
pub struct HttpDocumentStoreBuilder {
    project_id: String,
    database: String,
    api_key: Option<String>,
    client: Option<Client>,
    emulator_host: Option<String>,
    watch_interval: Duration,
    request_timeout: Option<Duration>,
}

impl HttpDocumentStoreBuilder {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            database: DEFAULT_DATABASE.to_owned(),
            api_key: None,
            client: None,
            emulator_host: None,
            watch_interval: REMOTE_WATCH_INTERVAL,
            request_timeout: Some(Duration::from_secs(20)),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Targets a local emulator (`host:port`) over plain HTTP instead of the hosted API.
    pub fn with_emulator_host(mut self, host: impl Into<String>) -> Self {
        self.emulator_host = Some(host.into());
        self
    }

    /// Re-read interval of [`DocumentStore::listen`]; raised to [`MIN_POLL_INTERVAL`] if shorter.
    pub fn with_watch_interval(mut self, interval: Duration) -> Self {
        self.watch_interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn build(self) -> FirestoreResult<HttpDocumentStore> {
        if self.project_id.trim().is_empty() {
            return Err(missing_project_id());
        }
        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .build()
                .map_err(|err| internal_error(err.to_string()))?,
        };
        let base_url = build_base_url(
            &self.project_id,
            &self.database,
            self.emulator_host.as_deref(),
        );
        Ok(HttpDocumentStore {
            client,
            base_url,
            api_key: self.api_key,
            watch_interval: self.watch_interval,
            request_timeout: self.request_timeout,
        })
    }
}

impl HttpDocumentStore {
    pub fn builder(project_id: impl Into<String>) -> HttpDocumentStoreBuilder {
        HttpDocumentStoreBuilder::new(project_id)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn watch_interval(&self) -> Duration {
        self.watch_interval
    }

    fn document_url(&self, path: &DocumentPath) -> String {
        format!(
            "{}/documents/{}/{}",
            self.base_url,
            utf8_percent_encode(path.collection(), PATH_SEGMENT),
            utf8_percent_encode(path.document_id(), PATH_SEGMENT)
        )
    }

    fn build_request(&self, method: Method, url: String) -> RequestBuilder {
        let mut builder = self.client.request(method, url);
        if let Some(key) = self.api_key.as_deref() {
            builder = builder.query(&[("key", key)]);
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            if let Some(timeout) = self.request_timeout {
                builder = builder.timeout(timeout);
            }
        }
        builder.header("Content-Type", "application/json")
    }

    async fn send(&self, request: RequestBuilder) -> FirestoreResult<(StatusCode, String)> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        Ok((status, text))
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl DocumentStore for HttpDocumentStore {
    async fn get_document(&self, path: &DocumentPath) -> FirestoreResult<DocumentSnapshot> {
        let url = self.document_url(path);
        log::debug!("GET {url}");
        let (status, text) = self.send(self.build_request(Method::GET, url)).await?;

        if status == StatusCode::NOT_FOUND {
            return Ok(DocumentSnapshot::missing(path.clone()));
        }
        if !status.is_success() {
            return Err(map_http_error(status, &text));
        }

        let document: JsonValue = serde_json::from_str(&text)?;
        let data = decode_document_fields(&document)?;
        let update_time = document
            .get("updateTime")
            .and_then(JsonValue::as_str)
            .map(str::to_owned);
        Ok(DocumentSnapshot::new(path.clone(), Some(data), update_time))
    }

    async fn set_document(&self, path: &DocumentPath, data: &JsonValue) -> FirestoreResult<()> {
        // PATCH without an update mask replaces every field of the document.
        let body = json!({ "fields": encode_document_fields(data)? });
        let url = self.document_url(path);
        log::debug!("PATCH {url}");
        let (status, text) = self
            .send(self.build_request(Method::PATCH, url).json(&body))
            .await?;

        if status.is_success() {
            Ok(())
        } else {
            Err(map_http_error(status, &text))
        }
    }

    fn listen(
        &self,
        path: &DocumentPath,
        on_next: SnapshotCallback,
        on_error: SnapshotErrorCallback,
    ) -> Subscription {
        let cancelled = Arc::new(AtomicBool::new(false));
        let store = self.clone();
        let path = path.clone();
        let flag = Arc::clone(&cancelled);

        LOGGER.debug(format!("watching {path} every {:?}", store.watch_interval));
        spawn_detached(async move {
            let mut last_seen: Option<Option<String>> = None;
            while !flag.load(Ordering::SeqCst) {
                match store.get_document(&path).await {
                    Ok(snapshot) => {
                        let marker = snapshot.update_time().map(str::to_owned);
                        let changed = last_seen.as_ref() != Some(&marker);
                        if changed && !flag.load(Ordering::SeqCst) {
                            last_seen = Some(marker);
                            on_next(snapshot);
                        }
                    }
                    Err(err) => {
                        if !flag.load(Ordering::SeqCst) {
                            on_error(&err);
                        }
                    }
                }
                sleep(store.watch_interval).await;
            }
            LOGGER.debug(format!("stopped watching {path}"));
        });

        Subscription::new(move || cancelled.store(true, Ordering::SeqCst))
    }
}

fn build_base_url(project_id: &str, database: &str, emulator_host: Option<&str>) -> String {
    match emulator_host {
        Some(host) => format!(
            "http://{host}/{FIRESTORE_API_VERSION}/projects/{project_id}/databases/{database}"
        ),
        None => format!(
            "{FIRESTORE_API_HOST}/{FIRESTORE_API_VERSION}/projects/{project_id}/databases/{database}"
        ),
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::firestore::error::{FirestoreError, FirestoreErrorCode};
    use httpmock::prelude::*;
    use httpmock::Method::PATCH;
    use std::sync::Mutex;

    const DOC_PATH: &str = "/v1/projects/study-project/databases/(default)/documents/studymate/shared_data";

    fn store_for(server: &MockServer) -> HttpDocumentStore {
        HttpDocumentStore::builder("study-project")
            .with_api_key("api-key")
            .with_emulator_host(server.address().to_string())
            .with_watch_interval(Duration::from_millis(20))
            .build()
            .unwrap()
    }

    fn shared_path() -> DocumentPath {
        DocumentPath::new("studymate", "shared_data")
    }

    #[test]
    fn hosted_base_url_uses_default_database() {
        let store = HttpDocumentStore::builder("p").build().unwrap();
        assert_eq!(
            store.base_url(),
            "https://firestore.googleapis.com/v1/projects/p/databases/(default)"
        );
        let err = HttpDocumentStore::builder(" ").build().unwrap_err();
        assert_eq!(err.code, FirestoreErrorCode::MissingProjectId);
    }

    #[test]
    fn zero_watch_interval_is_raised_to_minimum() {
        let store = HttpDocumentStore::builder("p")
            .with_watch_interval(Duration::ZERO)
            .build()
            .unwrap();
        assert_eq!(store.watch_interval(), MIN_POLL_INTERVAL);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn get_document_decodes_fields_and_update_time() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path(DOC_PATH).query_param("key", "api-key");
            then.status(200).json_body(json!({
                "name": "projects/study-project/databases/(default)/documents/studymate/shared_data",
                "fields": {
                    "subjects": {"arrayValue": {"values": [{"stringValue": "Física"}]}}
                },
                "updateTime": "2026-03-01T12:00:00.000001Z"
            }));
        });

        let snapshot = store_for(&server)
            .get_document(&shared_path())
            .await
            .unwrap();

        mock.assert();
        assert!(snapshot.exists());
        assert_eq!(snapshot.data(), Some(&json!({"subjects": ["Física"]})));
        assert_eq!(snapshot.update_time(), Some("2026-03-01T12:00:00.000001Z"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn missing_document_is_not_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(DOC_PATH);
            then.status(404).json_body(json!({
                "error": {"code": 404, "message": "Document not found", "status": "NOT_FOUND"}
            }));
        });

        let snapshot = store_for(&server)
            .get_document(&shared_path())
            .await
            .unwrap();
        assert!(!snapshot.exists());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn set_document_patches_typed_fields() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(PATCH)
                .path(DOC_PATH)
                .query_param("key", "api-key")
                .json_body(json!({
                    "fields": {
                        "tasks": {"arrayValue": {"values": []}},
                        "subjects": {"arrayValue": {"values": [{"stringValue": "Química"}]}}
                    }
                }));
            then.status(200).json_body(json!({"updateTime": "2026-03-01T12:00:01Z"}));
        });

        store_for(&server)
            .set_document(&shared_path(), &json!({"tasks": [], "subjects": ["Química"]}))
            .await
            .unwrap();
        mock.assert();
    }

    #[tokio::test(flavor = "current_thread")]
    async fn permission_errors_are_mapped() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(PATCH).path(DOC_PATH);
            then.status(403).json_body(json!({
                "error": {"code": 403, "message": "Missing or insufficient permissions.", "status": "PERMISSION_DENIED"}
            }));
        });

        let err = store_for(&server)
            .set_document(&shared_path(), &json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.code, FirestoreErrorCode::PermissionDenied);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn watch_loop_delivers_each_version_once() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(DOC_PATH);
            then.status(200).json_body(json!({
                "fields": {"tasks": {"arrayValue": {}}},
                "updateTime": "2026-03-01T12:00:00Z"
            }));
        });

        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        let subscription = store_for(&server).listen(
            &shared_path(),
            Arc::new(move |snapshot: DocumentSnapshot| {
                sink.lock().unwrap().push(snapshot.update_time().map(str::to_owned));
            }),
            Arc::new(|err: &FirestoreError| panic!("unexpected watch error: {err}")),
        );

        tokio::time::sleep(Duration::from_millis(150)).await;
        subscription.unsubscribe();

        let received = received.lock().unwrap();
        assert_eq!(received.as_slice(), [Some("2026-03-01T12:00:00Z".to_string())]);
    }
}
