//! Scoped substitution of outbound HTTP calls.
//!
//! Production code talks to the network through the [`HttpTransport`]
//! capability trait. Tests inject a [`MockTransport`] for the scope's
//! duration, so any call to a registered URL returns a pre-built response
//! and nothing ever reaches a real socket.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::{header, HeaderName, HeaderValue, Method, Request, Response, StatusCode};
use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

use crate::error::Result;

/// Errors surfaced through the transport seam.
#[derive(Error, Debug)]
pub enum TransportError {
    /// No mock is registered for the request. The double performs no
    /// network IO, so an unmatched call fails the way a refused
    /// connection would.
    #[error("no mock registered for {method} {url}")]
    Unmatched { method: Method, url: String },

    #[error("mock response could not be rendered: {0}")]
    Render(#[from] crate::error::MockError),

    /// Escape hatch for production implementations wrapping client errors.
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Capability trait for outbound HTTP.
///
/// Code under test holds a `dyn HttpTransport`; tests hand it a
/// [`MockTransport`], production hands it a real client wrapper.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: Request<Bytes>) -> std::result::Result<Response<Bytes>, TransportError>;
}

/// A canned HTTP response.
///
/// Carries at most one meaningful payload: a structured JSON value or raw
/// text. When both are set the structured payload wins; when neither is
/// set the body is empty.
#[derive(Debug, Clone)]
pub struct MockResponse {
    status: StatusCode,
    json_body: Option<serde_json::Value>,
    text_body: Option<String>,
    headers: Vec<(String, String)>,
    content_type: Option<String>,
}

impl Default for MockResponse {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            json_body: None,
            text_body: None,
            headers: Vec::new(),
            content_type: None,
        }
    }
}

impl MockResponse {
    /// A `200 OK` response with an empty body.
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn status(status: StatusCode) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    /// A `200 OK` response carrying a JSON payload.
    pub fn json(value: serde_json::Value) -> Self {
        Self {
            json_body: Some(value),
            ..Self::default()
        }
    }

    /// A `200 OK` response carrying a plain-text payload.
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            text_body: Some(body.into()),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Overrides the `content-type` header regardless of payload kind.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Renders the descriptor into a transport-level response.
    ///
    /// An explicit content-type override wins; otherwise a JSON payload
    /// defaults to `application/json` and a text payload to
    /// `text/plain; charset=utf-8`.
    pub fn to_response(&self) -> Result<Response<Bytes>> {
        let (body, default_type) = if let Some(json) = &self.json_body {
            (Bytes::from(serde_json::to_vec(json)?), Some("application/json"))
        } else if let Some(text) = &self.text_body {
            (
                Bytes::from(text.clone()),
                Some("text/plain; charset=utf-8"),
            )
        } else {
            (Bytes::new(), None)
        };

        let mut response = Response::new(body);
        *response.status_mut() = self.status;

        let headers = response.headers_mut();
        for (name, value) in &self.headers {
            let name = HeaderName::try_from(name.as_str()).map_err(axum::http::Error::from)?;
            let value = HeaderValue::try_from(value.as_str()).map_err(axum::http::Error::from)?;
            headers.insert(name, value);
        }
        if let Some(content_type) = &self.content_type {
            let value =
                HeaderValue::try_from(content_type.as_str()).map_err(axum::http::Error::from)?;
            headers.insert(header::CONTENT_TYPE, value);
        }
        if !headers.contains_key(header::CONTENT_TYPE) {
            if let Some(default_type) = default_type {
                headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(default_type));
            }
        }

        Ok(response)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RouteKey {
    /// `None` matches any method.
    method: Option<Method>,
    url: String,
}

/// Record of one dispatched request.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub url: String,
    pub body: Bytes,
}

#[derive(Debug, Default)]
struct MockState {
    routes: HashMap<RouteKey, MockResponse>,
    calls: Vec<RecordedCall>,
}

/// Test double for the [`HttpTransport`] seam.
///
/// Clonable handle over a shared route table: registration order does not
/// matter, each key maps to exactly one response, and a method-specific
/// registration wins over an any-method one for the same URL. Every
/// dispatched request is recorded for later assertions.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a response for a specific method and exact URL.
    /// Re-registering the same method/URL pair replaces the response.
    pub fn on(&self, method: Method, url: impl Into<String>, response: MockResponse) {
        self.insert(Some(method), url.into(), response);
    }

    /// Registers a response for `GET` on an exact URL.
    pub fn on_get(&self, url: impl Into<String>, response: MockResponse) {
        self.on(Method::GET, url, response);
    }

    /// Registers a response for `POST` on an exact URL.
    pub fn on_post(&self, url: impl Into<String>, response: MockResponse) {
        self.on(Method::POST, url, response);
    }

    /// Registers a response for any method on an exact URL.
    pub fn on_any(&self, url: impl Into<String>, response: MockResponse) {
        self.insert(None, url.into(), response);
    }

    fn insert(&self, method: Option<Method>, url: String, response: MockResponse) {
        let mut state = self.lock();
        state.routes.insert(RouteKey { method, url }, response);
    }

    fn lookup(&self, method: &Method, url: &str) -> Option<MockResponse> {
        let state = self.lock();
        state
            .routes
            .get(&RouteKey {
                method: Some(method.clone()),
                url: url.to_string(),
            })
            .or_else(|| {
                state.routes.get(&RouteKey {
                    method: None,
                    url: url.to_string(),
                })
            })
            .cloned()
    }

    /// Returns the number of requests dispatched through the double.
    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// Returns all recorded requests, in dispatch order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    /// Returns the recorded requests for one exact URL.
    pub fn calls_to(&self, url: &str) -> Vec<RecordedCall> {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.url == url)
            .cloned()
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|err| err.into_inner())
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: Request<Bytes>) -> std::result::Result<Response<Bytes>, TransportError> {
        let (parts, body) = request.into_parts();
        let url = parts.uri.to_string();
        let method = parts.method;

        {
            let mut state = self.lock();
            state.calls.push(RecordedCall {
                method: method.clone(),
                url: url.clone(),
                body,
            });
        }

        match self.lookup(&method, &url) {
            Some(mock) => {
                debug!(%method, %url, "serving mocked response");
                Ok(mock.to_response()?)
            }
            None => {
                debug!(%method, %url, "no mock registered, failing request");
                Err(TransportError::Unmatched { method, url })
            }
        }
    }
}
