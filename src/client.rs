//! HTTP access to the computation service.
//!
//! Both controllers go through [`ServiceClient`], which turns the service's
//! conventions into `LabResult`: a non-2xx status, `"success": false` or an
//! `"error"` field all become [`LabError::Remote`].

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::error::{LabError, LabResult, TransportError};

const USER_AGENT: &str = concat!("labdesk/", env!("CARGO_PKG_VERSION"));

/// Status and raw body of one service response
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A file to send as the multipart `file` field
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, path: &str, body: Value) -> Result<RawResponse, TransportError>;

    async fn post_file(&self, path: &str, file: UploadFile) -> Result<RawResponse, TransportError>;
}

/// reqwest-backed transport
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// No request or connect timeout is set; a call fails only when the
    /// connection itself is rejected
    fn client_builder() -> reqwest::ClientBuilder {
        reqwest::Client::builder().user_agent(USER_AGENT)
    }

    pub fn new(base_url: impl Into<String>) -> LabResult<Self> {
        let client = Self::client_builder()
            .build()
            .map_err(|e| LabError::configuration(format!("HTTP client build failed: {}", e)))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, path: &str, body: Value) -> Result<RawResponse, TransportError> {
        let resp = self.client.post(self.url(path)).json(&body).send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(RawResponse { status, body })
    }

    async fn post_file(&self, path: &str, file: UploadFile) -> Result<RawResponse, TransportError> {
        let part = reqwest::multipart::Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str("text/csv")?;
        let form = reqwest::multipart::Form::new().part("file", part);
        let resp = self.client.post(self.url(path)).multipart(form).send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(RawResponse { status, body })
    }
}

/// How a failed call is described to the user
#[derive(Debug, Clone, Copy)]
pub struct FailureText {
    /// Prefix for transport and decoding failures, e.g. "Error uploading file"
    pub transport: &'static str,
    /// Shown when the service fails without an `error` message
    pub fallback: &'static str,
}

#[derive(Clone)]
pub struct ServiceClient {
    transport: Arc<dyn Transport>,
}

impl ServiceClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub fn http(base_url: impl Into<String>) -> LabResult<Self> {
        Ok(Self::new(Arc::new(HttpTransport::new(base_url)?)))
    }

    #[instrument(skip(self, body, text))]
    pub async fn post_json<B, R>(&self, path: &str, body: &B, text: FailureText) -> LabResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = serde_json::to_value(body)
            .map_err(|e| LabError::malformed(text.transport, e.to_string()))?;
        let raw = self
            .transport
            .post_json(path, body)
            .await
            .map_err(|e| LabError::transport(text.transport, e))?;
        interpret(raw, text)
    }

    #[instrument(skip(self, file, text), fields(file = %file.file_name, bytes = file.bytes.len()))]
    pub async fn post_file<R>(&self, path: &str, file: UploadFile, text: FailureText) -> LabResult<R>
    where
        R: DeserializeOwned,
    {
        let raw = self
            .transport
            .post_file(path, file)
            .await
            .map_err(|e| LabError::transport(text.transport, e))?;
        interpret(raw, text)
    }
}

/// Apply the service's success/error conventions to a raw response
pub fn interpret<R: DeserializeOwned>(raw: RawResponse, text: FailureText) -> LabResult<R> {
    let value: Value = serde_json::from_str(&raw.body)
        .map_err(|e| LabError::malformed(text.transport, e.to_string()))?;

    let error_message = value.get("error").and_then(|e| match e {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    });
    let reported_failure = value.get("success").and_then(Value::as_bool) == Some(false);

    if !raw.is_success() || error_message.is_some() || reported_failure {
        let message = error_message.unwrap_or_else(|| text.fallback.to_string());
        warn!(status = raw.status, %message, "service reported failure");
        return Err(LabError::remote(Some(raw.status), message));
    }

    debug!(status = raw.status, "service call succeeded");
    serde_json::from_value(value).map_err(|e| LabError::malformed(text.transport, e.to_string()))
}

/// In-memory transport for tests; enabled by the `testing` feature outside this crate
#[cfg(any(test, feature = "testing"))]
pub mod testing {
    //! In-memory transport that records calls and replays canned responses.

    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedCall {
        Json { path: String, body: Value },
        File { path: String, file_name: String, bytes: Vec<u8> },
    }

    #[derive(Default)]
    pub struct RecordingTransport {
        responses: Mutex<VecDeque<Result<RawResponse, String>>>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl RecordingTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(&self, status: u16, body: Value) -> &Self {
            self.respond_raw(status, &body.to_string())
        }

        pub fn respond_raw(&self, status: u16, body: &str) -> &Self {
            self.push(Ok(RawResponse {
                status,
                body: body.to_string(),
            }))
        }

        /// Queue a connection-level failure
        pub fn fail(&self, message: &str) -> &Self {
            self.push(Err(message.to_string()))
        }

        fn push(&self, response: Result<RawResponse, String>) -> &Self {
            if let Ok(mut queue) = self.responses.lock() {
                queue.push_back(response);
            }
            self
        }

        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().map(|c| c.clone()).unwrap_or_default()
        }

        fn next(&self, call: RecordedCall) -> Result<RawResponse, TransportError> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(call);
            }
            let next = self.responses.lock().ok().and_then(|mut q| q.pop_front());
            match next {
                Some(Ok(raw)) => Ok(raw),
                Some(Err(message)) => Err(TransportError::Unavailable(message)),
                None => Err(TransportError::Unavailable("no response queued".to_string())),
            }
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn post_json(&self, path: &str, body: Value) -> Result<RawResponse, TransportError> {
            self.next(RecordedCall::Json {
                path: path.to_string(),
                body,
            })
        }

        async fn post_file(&self, path: &str, file: UploadFile) -> Result<RawResponse, TransportError> {
            self.next(RecordedCall::File {
                path: path.to_string(),
                file_name: file.file_name,
                bytes: file.bytes,
            })
        }
    }
}
