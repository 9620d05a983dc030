use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use dcommon::{BoxFuture, SessionId};
use ddeck::Session;
use rusqlite::{Connection, OptionalExtension, params};

use crate::backend::SessionStore;
use crate::error::MemoryError;

/// Stores each session as a JSON document row keyed by session id.
#[derive(Debug)]
pub struct SqliteSessionStore {
    connection: Mutex<Connection>,
}

impl SqliteSessionStore {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, MemoryError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|error| {
                MemoryError::storage(format!(
                    "failed to create sqlite parent directory: {error}"
                ))
            })?;
        }

        let connection = Connection::open(path).map_err(|error| {
            MemoryError::storage(format!("failed to open sqlite database: {error}"))
        })?;
        Self::from_connection(connection)
    }

    pub fn new_in_memory() -> Result<Self, MemoryError> {
        let connection = Connection::open_in_memory().map_err(|error| {
            MemoryError::storage(format!("failed to open in-memory sqlite database: {error}"))
        })?;
        Self::from_connection(connection)
    }

    fn from_connection(connection: Connection) -> Result<Self, MemoryError> {
        connection
            .busy_timeout(Duration::from_secs(5))
            .map_err(|error| {
                MemoryError::storage(format!("failed to configure sqlite busy timeout: {error}"))
            })?;
        let store = Self {
            connection: Mutex::new(connection),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    fn connection(&self) -> Result<std::sync::MutexGuard<'_, Connection>, MemoryError> {
        self.connection
            .lock()
            .map_err(|_| MemoryError::storage("sqlite store lock poisoned"))
    }

    fn initialize_schema(&self) -> Result<(), MemoryError> {
        let conn = self.connection()?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;

            CREATE TABLE IF NOT EXISTS deck_sessions (
                session_id TEXT PRIMARY KEY,
                state_json TEXT NOT NULL,
                slide_count INTEGER NOT NULL,
                pending_count INTEGER NOT NULL,
                updated_at_secs INTEGER NOT NULL
            );
            ",
        )
        .map_err(|error| {
            MemoryError::storage(format!("failed to initialize sqlite schema: {error}"))
        })
    }
}

impl SessionStore for SqliteSessionStore {
    fn load<'a>(
        &'a self,
        session_id: &'a SessionId,
    ) -> BoxFuture<'a, Result<Option<Session>, MemoryError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            let state_json = conn
                .query_row(
                    "SELECT state_json FROM deck_sessions WHERE session_id = ?1",
                    params![session_id.as_str()],
                    |row| row.get::<_, String>(0),
                )
                .optional()
                .map_err(|error| {
                    MemoryError::storage(format!("failed to load session row: {error}"))
                })?;

            let Some(state_json) = state_json else {
                return Ok(None);
            };

            let session = serde_json::from_str::<Session>(&state_json).map_err(|error| {
                MemoryError::serialization(format!("failed to deserialize session: {error}"))
            })?;
            Ok(Some(session))
        })
    }

    fn save<'a>(&'a self, session: &'a Session) -> BoxFuture<'a, Result<(), MemoryError>> {
        Box::pin(async move {
            let state_json = serde_json::to_string(session).map_err(|error| {
                MemoryError::serialization(format!("failed to serialize session: {error}"))
            })?;
            let updated_at_secs = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| elapsed.as_secs() as i64)
                .unwrap_or_default();

            let conn = self.connection()?;
            conn.execute(
                "INSERT INTO deck_sessions
                    (session_id, state_json, slide_count, pending_count, updated_at_secs)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(session_id) DO UPDATE SET
                    state_json = excluded.state_json,
                    slide_count = excluded.slide_count,
                    pending_count = excluded.pending_count,
                    updated_at_secs = excluded.updated_at_secs",
                params![
                    session.session_id.as_str(),
                    state_json,
                    session.slide_count() as i64,
                    session.pending_edits.len() as i64,
                    updated_at_secs,
                ],
            )
            .map_err(|error| MemoryError::storage(format!("failed to save session row: {error}")))?;
            Ok(())
        })
    }
}

pub(crate) fn default_sqlite_path() -> PathBuf {
    if let Some(explicit) = std::env::var_os("DECKWRIGHT_SQLITE_PATH") {
        return PathBuf::from(explicit);
    }

    if let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
        return PathBuf::from(home)
            .join(".deckwright")
            .join("sessions.sqlite3");
    }

    PathBuf::from("deckwright-sessions.sqlite3")
}
