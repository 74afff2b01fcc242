//! Composed boundary scope.
//!
//! Nests the four substitutions into one acquisition with a fixed order:
//! HTTP outermost, then filesystem, then environment, then session.
//! Teardown runs strictly in reverse, so no handle outlives a scope it
//! depends on.

use std::path::Path;

use axum::http::Method;

use crate::env::EnvMock;
use crate::error::Result;
use crate::fs::{FsMock, MockFileSystem};
use crate::http::{MockResponse, MockTransport};
use crate::session::{SessionMock, SessionState};

/// Declarative description of everything a composed scope substitutes.
#[derive(Debug, Default)]
pub struct BoundarySpec {
    routes: Vec<(Option<Method>, String, MockResponse)>,
    filesystem: MockFileSystem,
    env_vars: Vec<(String, String)>,
    env_clear_prefix: Option<String>,
    session: SessionState,
}

impl BoundarySpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an outbound route for a specific method.
    pub fn route(mut self, method: Method, url: impl Into<String>, response: MockResponse) -> Self {
        self.routes.push((Some(method), url.into(), response));
        self
    }

    /// Registers an outbound route matching any method.
    pub fn route_any(mut self, url: impl Into<String>, response: MockResponse) -> Self {
        self.routes.push((None, url.into(), response));
        self
    }

    pub fn filesystem(mut self, layout: MockFileSystem) -> Self {
        self.filesystem = layout;
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.push((key.into(), value.into()));
        self
    }

    pub fn clear_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_clear_prefix = Some(prefix.into());
        self
    }

    pub fn session(mut self, session: SessionState) -> Self {
        self.session = session;
        self
    }
}

/// Handles for one composed acquisition.
///
/// Field order is teardown order: the session accessor is restored first,
/// then the environment snapshot, then the ephemeral filesystem root is
/// removed, and the transport handle goes last.
#[derive(Debug)]
pub struct BoundaryMock {
    _session: SessionMock,
    _env: EnvMock,
    fs: FsMock,
    http: MockTransport,
}

impl BoundaryMock {
    /// Acquires all four scopes: HTTP, then filesystem, then environment,
    /// then session.
    pub fn acquire(spec: BoundarySpec) -> Result<Self> {
        let http = MockTransport::new();
        for (method, url, response) in spec.routes {
            match method {
                Some(method) => http.on(method, url, response),
                None => http.on_any(url, response),
            }
        }

        let fs = FsMock::with_layout(&spec.filesystem)?;

        let env = EnvMock::apply(
            spec.env_vars.iter().map(|(key, value)| (key.as_str(), value.as_str())),
            spec.env_clear_prefix.as_deref(),
        );

        let session = SessionMock::install(spec.session);

        Ok(Self {
            _session: session,
            _env: env,
            fs,
            http,
        })
    }

    /// The transport double, for further registrations and call assertions.
    pub fn http(&self) -> MockTransport {
        self.http.clone()
    }

    /// The ephemeral filesystem root.
    pub fn fs_root(&self) -> &Path {
        self.fs.root()
    }

    /// Resolves a path relative to the ephemeral root.
    pub fn fs_path(&self, relative: impl AsRef<Path>) -> std::path::PathBuf {
        self.fs.path(relative)
    }
}
