//! Synthetic inbound requests.
//!
//! Builds a realistic `http::Request` carrying a JSON or form body, query
//! string, and optionally pre-seeded session and per-request state, without
//! binding a network socket. The result is fed straight to a router via
//! `tower::ServiceExt::oneshot`.

use axum::body::Body;
use axum::http::{header, Method, Request};
use serde_json::Value;

use crate::error::Result;
use crate::session::{RequestState, SessionState};

/// Builder for a synthetic inbound request.
#[derive(Debug, Clone, Default)]
pub struct RequestBuilder {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    json_body: Option<Value>,
    form_body: Option<Vec<(String, String)>>,
    session: Option<SessionState>,
    state: Option<RequestState>,
}

impl RequestBuilder {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Appends one query pair; pairs are percent-encoded into the URI.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets a JSON body. Takes precedence over a form body when both are
    /// supplied.
    pub fn json(mut self, body: Value) -> Self {
        self.json_body = Some(body);
        self
    }

    /// Sets a form-encoded body.
    pub fn form<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.form_body = Some(
            pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        );
        self
    }

    /// Seeds session attributes into the request extensions.
    pub fn session(mut self, session: SessionState) -> Self {
        self.session = Some(session);
        self
    }

    /// Seeds per-request state attributes into the request extensions.
    pub fn state(mut self, state: RequestState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn build(self) -> Result<Request<Body>> {
        let uri = if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, encode_pairs(&self.query))
        };

        let mut builder = Request::builder().method(self.method).uri(uri);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        // JSON wins when both bodies are supplied.
        let mut request = if let Some(json) = &self.json_body {
            builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(json)?))?
        } else if let Some(form) = &self.form_body {
            builder
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(encode_pairs(form)))?
        } else {
            builder.body(Body::empty())?
        };

        if let Some(session) = self.session {
            request.extensions_mut().insert(session);
        }
        if let Some(state) = self.state {
            request.extensions_mut().insert(state);
        }

        Ok(request)
    }
}

fn encode_pairs(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| {
            format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
        })
        .collect::<Vec<_>>()
        .join("&")
}
