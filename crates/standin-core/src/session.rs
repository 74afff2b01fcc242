//! Scoped substitution of the current-session accessor.
//!
//! Handler code reads "the current session" through [`current_session`].
//! [`SessionMock`] patches that accessor for the scope's duration and
//! restores the previous value at exit, so nesting unwinds naturally.
//!
//! The accessor is thread-local: scopes are sequential and single-threaded,
//! and parallel test binaries must not observe each other's sessions.

use std::cell::RefCell;
use std::collections::HashMap;
use std::marker::PhantomData;

use serde_json::Value;
use tracing::debug;

/// Session attributes visible to handler code, keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    values: HashMap<String, Value>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

/// Per-request state attributes, distinct from session attributes so both
/// can ride the same request extensions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestState {
    values: HashMap<String, Value>,
}

impl RequestState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

thread_local! {
    static CURRENT_SESSION: RefCell<Option<SessionState>> = const { RefCell::new(None) };
}

/// The accessor handler code reads. Outside any scope it yields `None`.
pub fn current_session() -> Option<SessionState> {
    CURRENT_SESSION.with(|slot| slot.borrow().clone())
}

/// Scope guard patching the session accessor.
///
/// Not `Send`: the guard must drop on the thread whose accessor it patched.
#[derive(Debug)]
pub struct SessionMock {
    previous: Option<SessionState>,
    _thread_bound: PhantomData<*const ()>,
}

impl SessionMock {
    /// Installs `state` as the current session, saving whatever the
    /// accessor held before.
    pub fn install(state: SessionState) -> Self {
        let previous = CURRENT_SESSION.with(|slot| slot.borrow_mut().replace(state));
        debug!("patched session accessor");
        Self {
            previous,
            _thread_bound: PhantomData,
        }
    }
}

impl Drop for SessionMock {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT_SESSION.with(|slot| *slot.borrow_mut() = previous);
        debug!("restored session accessor");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_install_and_restore() {
        assert!(current_session().is_none());

        let state = SessionState::new().with("user_id", "u-42").with("admin", true);
        {
            let _session = SessionMock::install(state);
            let current = current_session().unwrap();
            assert_eq!(current.get("user_id"), Some(&json!("u-42")));
            assert_eq!(current.get("admin"), Some(&json!(true)));
        }

        assert!(current_session().is_none());
    }

    #[test]
    fn test_nested_scopes_restore_in_reverse_order() {
        let _outer = SessionMock::install(SessionState::new().with("level", "outer"));

        {
            let _inner = SessionMock::install(SessionState::new().with("level", "inner"));
            assert_eq!(
                current_session().unwrap().get("level"),
                Some(&json!("inner"))
            );
        }

        assert_eq!(
            current_session().unwrap().get("level"),
            Some(&json!("outer"))
        );
    }

    #[test]
    fn test_restore_runs_when_body_panics() {
        let _outer = SessionMock::install(SessionState::new().with("origin", "panic-test"));

        let result = std::panic::catch_unwind(|| {
            let _inner = SessionMock::install(SessionState::new().with("origin", "doomed"));
            panic!("scope body failed");
        });

        assert!(result.is_err());
        assert_eq!(
            current_session().unwrap().get("origin"),
            Some(&json!("panic-test"))
        );
    }

    #[test]
    fn test_state_maps_hold_arbitrary_values() {
        let state = RequestState::new()
            .with("trace_id", "t-1")
            .with("attempt", 2);

        assert_eq!(state.len(), 2);
        assert_eq!(state.get("attempt"), Some(&json!(2)));
        assert!(SessionState::new().is_empty());
    }
}
