//! Session
//!
//! The logged-in user's identifier, held as an explicit [`Session`] value
//! and persisted through a [`SessionStore`]. The browser dashboard backs
//! the store with `localStorage`; the CLI uses [`FileSessionStore`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;

use crate::error::SessionError;

/// Storage key for the identifier (browser `localStorage` and session file)
pub const SESSION_KEY: &str = "user_id";

/// Opaque identifier returned by the login endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap a raw identifier. Empty identifiers are rejected.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A logged-in user. Created on login and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
}

impl Session {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }
}

/// Persistence for the single session identifier
pub trait SessionStore {
    /// Read the stored session, if any
    fn load(&self) -> Result<Option<Session>, SessionError>;

    /// Persist a session, replacing any previous one
    fn save(&self, session: &Session) -> Result<(), SessionError>;
}

/// In-memory store for callers that keep the session only for the life of
/// the process
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>, SessionError> {
        self.inner
            .lock()
            .map(|guard| guard.clone())
            .map_err(|e| SessionError::Unavailable(e.to_string()))
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|e| SessionError::Unavailable(e.to_string()))?;
        *guard = Some(session.clone());
        Ok(())
    }
}

#[cfg(feature = "native")]
pub use file::FileSessionStore;

#[cfg(feature = "native")]
mod file {
    use super::*;
    use std::path::{Path, PathBuf};

    /// Session persisted as a small JSON file
    #[derive(Debug, Clone)]
    pub struct FileSessionStore {
        path: PathBuf,
    }

    impl FileSessionStore {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }

        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    impl SessionStore for FileSessionStore {
        fn load(&self) -> Result<Option<Session>, SessionError> {
            let content = match std::fs::read_to_string(&self.path) {
                Ok(content) => content,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
                Err(e) => return Err(e.into()),
            };

            if content.trim().is_empty() {
                return Ok(None);
            }

            let session: Session = serde_json::from_str(&content)?;
            tracing::debug!(path = ?self.path, "Loaded session");
            Ok(Some(session))
        }

        fn save(&self, session: &Session) -> Result<(), SessionError> {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let content = serde_json::to_string_pretty(session)?;
            std::fs::write(&self.path, content)?;
            tracing::debug!(path = ?self.path, "Saved session");
            Ok(())
        }
    }
}
