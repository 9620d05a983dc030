//! Session store trait, backend selection and the in-memory store.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use dcommon::{BoxFuture, SessionId};
use ddeck::Session;

use crate::backends::filesystem::FilesystemSessionStore;
use crate::backends::sqlite::{SqliteSessionStore, default_sqlite_path};
use crate::error::MemoryError;

/// Persistence boundary for deck editing sessions.
pub trait SessionStore: Send + Sync {
    fn load<'a>(
        &'a self,
        session_id: &'a SessionId,
    ) -> BoxFuture<'a, Result<Option<Session>, MemoryError>>;

    fn save<'a>(&'a self, session: &'a Session) -> BoxFuture<'a, Result<(), MemoryError>>;

    /// Resumes the session stored under `session_id`, or starts a fresh one.
    ///
    /// A missing id creates a session with a generated id. New sessions are
    /// not persisted until the first `save`.
    fn get_or_create<'a>(
        &'a self,
        session_id: Option<SessionId>,
    ) -> BoxFuture<'a, Result<Session, MemoryError>> {
        Box::pin(async move {
            let Some(session_id) = session_id else {
                return Ok(Session::with_generated_id());
            };

            if session_id.as_str().trim().is_empty() {
                return Err(MemoryError::invalid_request("session id must not be blank"));
            }

            match self.load(&session_id).await? {
                Some(session) => Ok(session),
                None => Ok(Session::new(session_id)),
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStoreConfig {
    InMemory,
    Filesystem { root: PathBuf },
    Sqlite { path: PathBuf },
}

impl Default for SessionStoreConfig {
    fn default() -> Self {
        Self::Sqlite {
            path: default_sqlite_path(),
        }
    }
}

pub fn create_session_store(
    config: SessionStoreConfig,
) -> Result<Arc<dyn SessionStore>, MemoryError> {
    match config {
        SessionStoreConfig::InMemory => Ok(Arc::new(InMemorySessionStore::new())),
        SessionStoreConfig::Filesystem { root } => {
            Ok(Arc::new(FilesystemSessionStore::new(root)?))
        }
        SessionStoreConfig::Sqlite { path } => Ok(Arc::new(SqliteSessionStore::new(path)?)),
    }
}

pub fn create_default_session_store() -> Result<Arc<dyn SessionStore>, MemoryError> {
    create_session_store(SessionStoreConfig::default())
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<SessionId, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize, MemoryError> {
        Ok(self
            .sessions
            .lock()
            .map_err(|_| MemoryError::storage("memory store lock poisoned"))?
            .len())
    }

    pub fn is_empty(&self) -> Result<bool, MemoryError> {
        Ok(self.len()? == 0)
    }
}

impl SessionStore for InMemorySessionStore {
    fn load<'a>(
        &'a self,
        session_id: &'a SessionId,
    ) -> BoxFuture<'a, Result<Option<Session>, MemoryError>> {
        Box::pin(async move {
            let sessions = self
                .sessions
                .lock()
                .map_err(|_| MemoryError::storage("memory store lock poisoned"))?;
            Ok(sessions.get(session_id).cloned())
        })
    }

    fn save<'a>(&'a self, session: &'a Session) -> BoxFuture<'a, Result<(), MemoryError>> {
        Box::pin(async move {
            let mut sessions = self
                .sessions
                .lock()
                .map_err(|_| MemoryError::storage("memory store lock poisoned"))?;
            sessions.insert(session.session_id.clone(), session.clone());
            Ok(())
        })
    }
}
