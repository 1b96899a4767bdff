use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde_json::Value;
use url::form_urlencoded;

use crate::logger::Logger;
use crate::storage::error::{
    internal_error, invalid_argument, no_default_bucket, no_download_url, object_not_found,
    unknown_error, StorageError, StorageResult,
};
use crate::storage::{BlobStore, UploadedBlob};

static LOGGER: LazyLock<Logger> = LazyLock::new(|| Logger::new("@studymate/storage"));

pub const DEFAULT_HOST: &str = "firebasestorage.googleapis.com";
const DEFAULT_PROTOCOL: &str = "https";

/// Firebase Storage REST v0 client bound to one bucket.
#[derive(Clone, Debug)]
pub struct HttpBlobStore {
    client: Client,
    bucket: String,
    host: String,
    protocol: &'static str,
    request_timeout: Option<Duration>,
}

#[derive(Clone, Debug)]
pub struct HttpBlobStoreBuilder {
    bucket: String,
    client: Option<Client>,
    host: String,
    protocol: &'static str,
    request_timeout: Option<Duration>,
}

impl HttpBlobStoreBuilder {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            client: None,
            host: DEFAULT_HOST.to_owned(),
            protocol: DEFAULT_PROTOCOL,
            request_timeout: Some(Duration::from_secs(120)),
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Targets a local emulator (`host:port`) over plain HTTP.
    pub fn with_emulator_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self.protocol = "http";
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn build(self) -> StorageResult<HttpBlobStore> {
        let bucket = self
            .bucket
            .trim()
            .trim_start_matches("gs://")
            .trim_end_matches('/')
            .to_owned();
        if bucket.is_empty() {
            return Err(no_default_bucket());
        }
        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .build()
                .map_err(|err| internal_error(format!("failed to build HTTP client: {err}")))?,
        };
        Ok(HttpBlobStore {
            client,
            bucket,
            host: self.host,
            protocol: self.protocol,
            request_timeout: self.request_timeout,
        })
    }
}

impl HttpBlobStore {
    pub fn builder(bucket: impl Into<String>) -> HttpBlobStoreBuilder {
        HttpBlobStoreBuilder::new(bucket)
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn bucket_url(&self) -> String {
        format!(
            "{}://{}/v0/b/{}/o",
            self.protocol,
            self.host,
            utf8_percent_encode(&self.bucket, NON_ALPHANUMERIC)
        )
    }

    fn object_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.bucket_url(),
            utf8_percent_encode(path, NON_ALPHANUMERIC)
        )
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        let mut builder = self.client.request(method, url);
        #[cfg(not(target_arch = "wasm32"))]
        {
            if let Some(timeout) = self.request_timeout {
                builder = builder.timeout(timeout);
            }
        }
        builder
    }

    async fn send(&self, request: RequestBuilder) -> StorageResult<(StatusCode, Vec<u8>)> {
        let response = request
            .send()
            .await
            .map_err(|err| internal_error(format!("storage request failed: {err}")))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| internal_error(format!("failed to read response body: {err}")))?
            .to_vec();
        Ok((status, body))
    }

    /// Builds the public download URL for `path` from the object's current metadata.
    pub async fn download_url(&self, path: &str) -> StorageResult<String> {
        let (status, body) = self
            .send(self.request(Method::GET, self.object_url(path)))
            .await?;
        if !status.is_success() {
            return Err(map_failure(path, status, &body));
        }
        let metadata = parse_metadata(&body)?;
        self.download_url_from_metadata(path, &metadata)
            .ok_or_else(|| no_download_url(path))
    }

    fn download_url_from_metadata(&self, path: &str, metadata: &Value) -> Option<String> {
        let tokens = metadata
            .get("downloadTokens")
            .and_then(Value::as_str)
            .filter(|tokens| !tokens.is_empty())?;
        let token = tokens.split(',').find(|segment| !segment.is_empty())?;
        let encoded_token: String = form_urlencoded::byte_serialize(token.as_bytes()).collect();
        Some(format!(
            "{}?alt=media&token={}",
            self.object_url(path),
            encoded_token
        ))
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl BlobStore for HttpBlobStore {
    async fn upload(
        &self,
        path: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> StorageResult<UploadedBlob> {
        if path.is_empty() {
            return Err(invalid_argument("Object path must not be empty."));
        }
        log::debug!("uploading {} bytes to {path}", bytes.len());
        let request = self
            .request(Method::POST, self.bucket_url())
            .query(&[("uploadType", "media"), ("name", path)])
            .header("Content-Type", content_type)
            .body(bytes);
        let (status, body) = self.send(request).await?;
        if !status.is_success() {
            return Err(map_failure(path, status, &body));
        }

        let metadata = parse_metadata(&body)?;
        let download_url = match self.download_url_from_metadata(path, &metadata) {
            Some(url) => url,
            None => {
                LOGGER.warn(format!(
                    "upload of {path} returned no download token; reading metadata"
                ));
                self.download_url(path).await?
            }
        };
        Ok(UploadedBlob {
            path: path.to_owned(),
            download_url,
        })
    }

    async fn delete(&self, path: &str) -> StorageResult<()> {
        log::debug!("deleting {path}");
        let (status, body) = self
            .send(self.request(Method::DELETE, self.object_url(path)))
            .await?;
        match status {
            StatusCode::OK | StatusCode::NO_CONTENT => Ok(()),
            status => Err(map_failure(path, status, &body)),
        }
    }
}

fn parse_metadata(body: &[u8]) -> StorageResult<Value> {
    serde_json::from_slice(body)
        .map_err(|err| internal_error(format!("failed to parse object metadata: {err}")))
}

fn map_failure(path: &str, status: StatusCode, body: &[u8]) -> StorageError {
    let base = match status {
        StatusCode::NOT_FOUND => object_not_found(path),
        status if status.is_server_error() => {
            LOGGER.warn(format!("storage service error {status} for {path}"));
            internal_error(format!("storage request failed with status {status}"))
        }
        status if status.is_client_error() => {
            internal_error(format!("storage request failed with status {status}"))
        }
        status => unknown_error(format!("unexpected storage response status {status}")),
    };
    base.with_status(status.as_u16())
        .with_server_response(String::from_utf8_lossy(body).to_string())
}
