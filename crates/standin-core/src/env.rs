//! Scoped substitution of process environment variables.
//!
//! [`EnvMock`] snapshots the entire environment on entry and restores it
//! verbatim on drop, so any mutation made inside the scope, by the mock or
//! by code under test, is undone on every exit path.

use std::env;
use std::ffi::OsString;
use std::sync::{Mutex, MutexGuard, OnceLock};

use tracing::debug;

/// The environment is process-global state, so scopes serialize on one
/// lock. Poisoning is recovered: a panicking test must not wedge the rest
/// of the binary.
fn env_lock() -> MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner())
}

/// Scope guard holding an environment snapshot.
///
/// The lock is held for the scope's whole duration; acquiring a second
/// `EnvMock` on the same thread before the first drops will deadlock.
/// Scopes are meant to be used one at a time.
#[derive(Debug)]
pub struct EnvMock {
    _lock: MutexGuard<'static, ()>,
    saved: Vec<(OsString, OsString)>,
}

impl EnvMock {
    /// Snapshots the current environment without changing anything.
    pub fn capture() -> Self {
        let lock = env_lock();
        let saved = env::vars_os().collect();
        debug!("captured environment snapshot");
        Self { _lock: lock, saved }
    }

    /// Snapshots the environment, then sets the given variables.
    pub fn vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Self::apply(vars, None)
    }

    /// Snapshots the environment, removes every key starting with
    /// `clear_prefix` (when given), then sets the explicit overrides.
    pub fn apply<I, K, V>(vars: I, clear_prefix: Option<&str>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mock = Self::capture();

        if let Some(prefix) = clear_prefix {
            let doomed: Vec<String> = env::vars()
                .map(|(key, _)| key)
                .filter(|key| key.starts_with(prefix))
                .collect();
            for key in doomed {
                env::remove_var(&key);
            }
        }

        for (key, value) in vars {
            env::set_var(key.as_ref(), value.as_ref());
        }

        mock
    }

    /// Sets a variable inside the scope. Undone at exit like any other
    /// mutation.
    pub fn set(&self, key: impl AsRef<str>, value: impl AsRef<str>) {
        env::set_var(key.as_ref(), value.as_ref());
    }
}

impl Drop for EnvMock {
    /// Replaces the entire environment map with the snapshot. Runs before
    /// the lock guard is released (custom drop precedes field drops).
    fn drop(&mut self) {
        let current: Vec<OsString> = env::vars_os().map(|(key, _)| key).collect();
        for key in current {
            env::remove_var(&key);
        }
        for (key, value) in &self.saved {
            env::set_var(key, value);
        }
        debug!("restored environment snapshot");
    }
}
