//! Session persistence for deckwright editing sessions.
//!
//! Sessions are persisted whole: the presentation, staged and applied edits,
//! context files and style template travel together as one JSON document.
//!
//! ```rust
//! use dmemory::{InMemorySessionStore, SessionStore};
//!
//! let runtime = tokio::runtime::Builder::new_current_thread()
//!     .build()
//!     .expect("runtime should build");
//! runtime.block_on(async {
//!     let store = InMemorySessionStore::new();
//!     let mut session = store
//!         .get_or_create(Some("deck-1".into()))
//!         .await
//!         .expect("session should resolve");
//!     session.create_presentation("Quarterly review");
//!     store.save(&session).await.expect("save should work");
//!
//!     let loaded = store
//!         .load(&"deck-1".into())
//!         .await
//!         .expect("load should work")
//!         .expect("session should exist");
//!     assert_eq!(loaded.presentation.map(|deck| deck.title).as_deref(), Some("Quarterly review"));
//! });
//! ```

mod backend;
mod error;

mod backends {
    pub(crate) mod filesystem;
    pub(crate) mod sqlite;
}

pub mod prelude {
    pub use crate::{
        FilesystemSessionStore, InMemorySessionStore, MemoryError, MemoryErrorKind,
        SessionStore, SessionStoreConfig, SqliteSessionStore, create_default_session_store,
        create_session_store,
    };
}

pub use backend::{
    InMemorySessionStore, SessionStore, SessionStoreConfig, create_default_session_store,
    create_session_store,
};
pub use backends::filesystem::FilesystemSessionStore;
pub use backends::sqlite::SqliteSessionStore;
pub use error::{MemoryError, MemoryErrorKind};

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use dcommon::SessionId;
    use ddeck::{ContextFile, Session, SlideLayout};

    use crate::{
        FilesystemSessionStore, InMemorySessionStore, MemoryErrorKind, SessionStore,
        SessionStoreConfig, SqliteSessionStore, create_session_store,
    };

    fn temp_dir(prefix: &str) -> std::path::PathBuf {
        let unique = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!("dmemory-{prefix}-{unique}"))
    }

    fn populated_session(id: &str) -> Session {
        let mut session = Session::new(id);
        session.create_presentation("Roadmap");
        session
            .stage_add("<h1>Intro</h1>", SlideLayout::Title, None)
            .expect("add should stage");
        session.commit().expect("commit should run");
        session
            .stage_update(0, "<h1>Intro v2</h1>")
            .expect("update should stage");
        session
            .context_files
            .push(ContextFile::new("notes.md", "# Notes"));
        session
    }

    async fn assert_round_trip(store: &dyn SessionStore, id: &str) {
        let session = populated_session(id);
        store.save(&session).await.expect("save should work");

        let loaded = store
            .load(&SessionId::from(id))
            .await
            .expect("load should work")
            .expect("session should exist");
        assert_eq!(loaded, session);
        assert_eq!(loaded.slide_count(), 1);
        assert_eq!(loaded.pending_edits.len(), 1);
        assert_eq!(loaded.applied_edits.len(), 1);
    }

    #[tokio::test]
    async fn in_memory_store_round_trips_sessions() {
        let store = InMemorySessionStore::new();
        assert_round_trip(&store, "memory-a").await;
        assert_eq!(store.len().expect("len should work"), 1);
    }

    #[tokio::test]
    async fn sqlite_store_round_trips_and_overwrites() {
        let store = SqliteSessionStore::new_in_memory().expect("sqlite store should initialize");
        assert_round_trip(&store, "sqlite-a").await;

        let mut session = populated_session("sqlite-a");
        session.commit().expect("commit should run");
        store.save(&session).await.expect("second save should work");

        let loaded = store
            .load(&SessionId::from("sqlite-a"))
            .await
            .expect("load should work")
            .expect("session should exist");
        assert!(loaded.pending_edits.is_empty());
        assert_eq!(loaded.applied_edits.len(), 2);
    }

    #[tokio::test]
    async fn filesystem_store_round_trips_unusual_ids() {
        let root = temp_dir("filesystem");
        let store = FilesystemSessionStore::new(&root).expect("fs store should initialize");
        assert_round_trip(&store, "../weird/id with spaces").await;

        let entries = std::fs::read_dir(root.join("sessions"))
            .expect("sessions dir should exist")
            .count();
        assert_eq!(entries, 1);

        std::fs::remove_dir_all(&root).expect("temporary directory should be removable");
    }

    #[tokio::test]
    async fn load_of_unknown_session_is_none() {
        let store = SqliteSessionStore::new_in_memory().expect("sqlite store should initialize");
        let loaded = store
            .load(&SessionId::from("missing"))
            .await
            .expect("load should work");
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn get_or_create_resumes_or_starts_sessions() {
        let store: Arc<dyn SessionStore> =
            create_session_store(SessionStoreConfig::InMemory).expect("store should build");

        let fresh = store
            .get_or_create(None)
            .await
            .expect("fresh session should be created");
        assert!(!fresh.session_id.as_str().is_empty());
        assert!(fresh.presentation.is_none());

        let named = store
            .get_or_create(Some(SessionId::from("named")))
            .await
            .expect("named session should be created");
        assert_eq!(named.session_id.as_str(), "named");

        store
            .save(&populated_session("named"))
            .await
            .expect("save should work");
        let resumed = store
            .get_or_create(Some(SessionId::from("named")))
            .await
            .expect("named session should resume");
        assert_eq!(resumed.slide_count(), 1);
    }

    #[tokio::test]
    async fn get_or_create_rejects_blank_ids() {
        let store = InMemorySessionStore::new();
        let error = store
            .get_or_create(Some(SessionId::from("  ")))
            .await
            .expect_err("blank id should fail");
        assert_eq!(error.kind, MemoryErrorKind::InvalidRequest);
    }
}
