use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use dcommon::{BoxFuture, SessionId};
use ddeck::Session;
use serde::{Deserialize, Serialize};

use crate::backend::SessionStore;
use crate::error::MemoryError;

const FORMAT_VERSION: u32 = 1;

/// Stores one pretty-printed JSON document per session under `root/sessions`.
#[derive(Debug)]
pub struct FilesystemSessionStore {
    root: PathBuf,
    lock: Mutex<()>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedSession {
    version: u32,
    saved_at_secs: u64,
    session: Session,
}

impl FilesystemSessionStore {
    pub fn new(root: impl AsRef<Path>) -> Result<Self, MemoryError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join("sessions")).map_err(|error| {
            MemoryError::storage(format!("failed to create session store root: {error}"))
        })?;
        Ok(Self {
            root,
            lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn session_path(&self, session_id: &SessionId) -> PathBuf {
        self.root.join("sessions").join(format!(
            "{}.json",
            hex_encode(session_id.as_str().as_bytes())
        ))
    }

    fn read_session(&self, session_id: &SessionId) -> Result<Option<Session>, MemoryError> {
        let path = self.session_path(session_id);
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path).map_err(|error| {
            MemoryError::storage(format!("failed to read session file: {error}"))
        })?;
        let persisted = serde_json::from_slice::<PersistedSession>(&bytes).map_err(|error| {
            MemoryError::serialization(format!("failed to deserialize session: {error}"))
        })?;

        if persisted.version > FORMAT_VERSION {
            return Err(MemoryError::serialization(format!(
                "session file version {} is newer than supported version {FORMAT_VERSION}",
                persisted.version
            )));
        }

        Ok(Some(persisted.session))
    }

    fn write_session(&self, session: &Session) -> Result<(), MemoryError> {
        let persisted = PersistedSession {
            version: FORMAT_VERSION,
            saved_at_secs: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| elapsed.as_secs())
                .unwrap_or_default(),
            session: session.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&persisted).map_err(|error| {
            MemoryError::serialization(format!("failed to serialize session: {error}"))
        })?;

        write_atomic(&self.session_path(&session.session_id), &bytes)
    }
}

impl SessionStore for FilesystemSessionStore {
    fn load<'a>(
        &'a self,
        session_id: &'a SessionId,
    ) -> BoxFuture<'a, Result<Option<Session>, MemoryError>> {
        Box::pin(async move {
            let _guard = self
                .lock
                .lock()
                .map_err(|_| MemoryError::storage("filesystem store lock poisoned"))?;
            self.read_session(session_id)
        })
    }

    fn save<'a>(&'a self, session: &'a Session) -> BoxFuture<'a, Result<(), MemoryError>> {
        Box::pin(async move {
            let _guard = self
                .lock
                .lock()
                .map_err(|_| MemoryError::storage("filesystem store lock poisoned"))?;
            self.write_session(session)
        })
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), MemoryError> {
    let Some(parent) = path.parent() else {
        return Err(MemoryError::storage("session file missing parent directory"));
    };
    fs::create_dir_all(parent).map_err(|error| {
        MemoryError::storage(format!("failed to create parent directory: {error}"))
    })?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes).map_err(|error| {
        MemoryError::storage(format!("failed to write temporary session file: {error}"))
    })?;

    if path.exists() {
        fs::remove_file(path).map_err(|error| {
            MemoryError::storage(format!("failed to replace existing session file: {error}"))
        })?;
    }
    fs::rename(&tmp, path)
        .map_err(|error| MemoryError::storage(format!("failed to finalize session file: {error}")))
}

/// Session ids are caller supplied, so file names use their hex encoding.
fn hex_encode(input: &[u8]) -> String {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";
    let mut output = String::with_capacity(input.len() * 2);
    for byte in input {
        output.push(DIGITS[usize::from(byte >> 4)] as char);
        output.push(DIGITS[usize::from(byte & 0x0f)] as char);
    }
    output
}
