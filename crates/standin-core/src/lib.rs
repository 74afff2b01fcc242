//! # standin-core
//!
//! Scoped test doubles for the boundaries a test suite has to substitute:
//!
//! - Outbound HTTP calls, through an injectable transport capability
//! - Filesystem layout, under an ephemeral root
//! - Process environment variables
//! - Inbound request and session state
//!
//! Every scope follows the same shape: capture prior state, install the
//! substitute, hand control to the test body, restore the prior state
//! unconditionally - on normal exit, early return, and panic alike.

pub mod compose;
pub mod env;
pub mod error;
pub mod fs;
pub mod http;
pub mod request;
pub mod session;

pub use compose::{BoundaryMock, BoundarySpec};
pub use env::EnvMock;
pub use error::{MockError, Result};
pub use fs::{FileContent, FsMock, MockFile, MockFileSystem};
pub use http::{HttpTransport, MockResponse, MockTransport, RecordedCall, TransportError};
pub use request::RequestBuilder;
pub use session::{current_session, RequestState, SessionMock, SessionState};
