//! Shared utilities and strongly-typed common values for deckwright crates.
//!
//! ```rust
//! use dcommon::{GenerationOptions, SessionId, TraceId};
//!
//! let session = SessionId::from("deck-session-1");
//! let trace = TraceId::new("trace-1");
//!
//! let options = GenerationOptions::default().with_temperature(0.7);
//! assert_eq!(session.as_str(), "deck-session-1");
//! assert_eq!(trace.to_string(), "trace-1");
//! assert_eq!(options.max_tokens, None);
//! ```

pub mod future {
    //! Shared async future aliases.
    //!
    //! ```rust
    //! use dcommon::BoxFuture;
    //!
    //! fn slide_count<'a>(slides: &'a [String]) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { slides.len() })
    //! }
    //!
    //! let _future = slide_count(&[]);
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod context {
    //! Cross-crate identifier newtypes.
    //!
    //! ```rust
    //! use dcommon::{SessionId, TraceId};
    //!
    //! let session = SessionId::new("session-42");
    //! let trace = TraceId::from("trace-42");
    //!
    //! assert_eq!(session.to_string(), "session-42");
    //! assert_eq!(trace.as_str(), "trace-42");
    //! ```

    use std::fmt::{Display, Formatter};

    use serde::{Deserialize, Serialize};

    /// External identifier of a deck editing session.
    #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct SessionId(String);

    impl SessionId {
        pub fn new(value: impl Into<String>) -> Self {
            Self(value.into())
        }

        pub fn as_str(&self) -> &str {
            self.0.as_str()
        }

        pub fn into_inner(self) -> String {
            self.0
        }
    }

    impl Display for SessionId {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<String> for SessionId {
        fn from(value: String) -> Self {
            Self(value)
        }
    }

    impl From<&str> for SessionId {
        fn from(value: &str) -> Self {
            Self(value.to_string())
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub struct TraceId(String);

    impl TraceId {
        pub fn new(value: impl Into<String>) -> Self {
            Self(value.into())
        }

        pub fn as_str(&self) -> &str {
            self.0.as_str()
        }
    }

    impl Display for TraceId {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<String> for TraceId {
        fn from(value: String) -> Self {
            Self(value)
        }
    }

    impl From<&str> for TraceId {
        fn from(value: &str) -> Self {
            Self(value.to_string())
        }
    }
}

pub mod model {
    //! Shared generation settings used by request types.
    //!
    //! ```rust
    //! use dcommon::GenerationOptions;
    //!
    //! let options = GenerationOptions::default()
    //!     .with_temperature(0.2)
    //!     .with_max_tokens(4096);
    //!
    //! assert_eq!(options.temperature, Some(0.2));
    //! assert_eq!(options.max_tokens, Some(4096));
    //! ```

    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct GenerationOptions {
        pub temperature: Option<f32>,
        pub max_tokens: Option<u32>,
    }

    impl GenerationOptions {
        pub fn with_temperature(mut self, temperature: f32) -> Self {
            self.temperature = Some(temperature);
            self
        }

        pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
            self.max_tokens = Some(max_tokens);
            self
        }
    }
}

pub mod registry {
    //! Insertion-ordered registry used by runtime registries.
    //!
    //! Lookups go through a hash index while iteration follows registration
    //! order, so anything derived from `values()` is stable across runs.
    //!
    //! ```rust
    //! use dcommon::Registry;
    //!
    //! let mut registry = Registry::new();
    //! registry.insert("zeta".to_string(), 1_u32);
    //! registry.insert("alpha".to_string(), 2_u32);
    //!
    //! assert_eq!(registry.get("alpha"), Some(&2));
    //! assert_eq!(registry.values().copied().collect::<Vec<_>>(), vec![1, 2]);
    //! ```

    use std::borrow::Borrow;
    use std::collections::HashMap;
    use std::hash::Hash;

    #[derive(Debug, Clone)]
    pub struct Registry<K, V> {
        index: HashMap<K, usize>,
        entries: Vec<(K, V)>,
    }

    impl<K, V> Default for Registry<K, V>
    where
        K: Eq + Hash,
    {
        fn default() -> Self {
            Self {
                index: HashMap::new(),
                entries: Vec::new(),
            }
        }
    }

    impl<K, V> Registry<K, V>
    where
        K: Eq + Hash + Clone,
    {
        pub fn new() -> Self {
            Self::default()
        }

        /// Inserts `value` under `key`. Replacing an existing key keeps its
        /// original position and returns the previous value.
        pub fn insert(&mut self, key: K, value: V) -> Option<V> {
            if let Some(&position) = self.index.get(&key) {
                let previous = std::mem::replace(&mut self.entries[position].1, value);
                return Some(previous);
            }

            self.index.insert(key.clone(), self.entries.len());
            self.entries.push((key, value));
            None
        }

        pub fn get<Q>(&self, key: &Q) -> Option<&V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.index
                .get(key)
                .and_then(|position| self.entries.get(*position))
                .map(|(_, value)| value)
        }

        pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            let position = self.index.remove(key)?;
            let (_, value) = self.entries.remove(position);
            for slot in self.index.values_mut() {
                if *slot > position {
                    *slot -= 1;
                }
            }
            Some(value)
        }

        pub fn contains_key<Q>(&self, key: &Q) -> bool
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.index.contains_key(key)
        }

        pub fn keys(&self) -> impl Iterator<Item = &K> {
            self.entries.iter().map(|(key, _)| key)
        }

        pub fn values(&self) -> impl Iterator<Item = &V> {
            self.entries.iter().map(|(_, value)| value)
        }

        pub fn len(&self) -> usize {
            self.entries.len()
        }

        pub fn is_empty(&self) -> bool {
            self.entries.is_empty()
        }
    }
}

pub use context::{SessionId, TraceId};
pub use future::BoxFuture;
pub use model::GenerationOptions;
pub use registry::Registry;

#[cfg(test)]
mod tests {
    use super::{GenerationOptions, Registry, SessionId, TraceId};

    #[test]
    fn id_newtypes_round_trip_strings() {
        let session = SessionId::new("session-1");
        let trace = TraceId::from("trace-1");

        assert_eq!(session.as_str(), "session-1");
        assert_eq!(trace.as_str(), "trace-1");
        assert_eq!(session.to_string(), "session-1");
        assert_eq!(trace.to_string(), "trace-1");
    }

    #[test]
    fn session_id_serializes_as_plain_string() {
        let session = SessionId::new("abc");
        let encoded = serde_json::to_string(&session).expect("session id should serialize");
        assert_eq!(encoded, "\"abc\"");

        let decoded: SessionId =
            serde_json::from_str("\"xyz\"").expect("session id should deserialize");
        assert_eq!(decoded.as_str(), "xyz");
    }

    #[test]
    fn generation_options_builder_helpers_set_values() {
        let options = GenerationOptions::default()
            .with_temperature(0.3)
            .with_max_tokens(123);

        assert_eq!(options.temperature, Some(0.3));
        assert_eq!(options.max_tokens, Some(123));
    }

    #[test]
    fn registry_iterates_in_registration_order() {
        let mut registry = Registry::new();
        registry.insert("create".to_string(), 1_u32);
        registry.insert("add".to_string(), 2_u32);
        registry.insert("commit".to_string(), 3_u32);

        let keys = registry.keys().cloned().collect::<Vec<_>>();
        assert_eq!(keys, vec!["create", "add", "commit"]);

        let replaced = registry.insert("add".to_string(), 20);
        assert_eq!(replaced, Some(2));
        assert_eq!(registry.values().copied().collect::<Vec<_>>(), vec![1, 20, 3]);
    }

    #[test]
    fn registry_remove_keeps_remaining_lookups_valid() {
        let mut registry = Registry::new();
        assert!(registry.is_empty());

        registry.insert("alpha".to_string(), 1_u32);
        registry.insert("beta".to_string(), 2_u32);
        registry.insert("gamma".to_string(), 3_u32);

        assert_eq!(registry.remove("alpha"), Some(1));
        assert_eq!(registry.get("beta"), Some(&2));
        assert_eq!(registry.get("gamma"), Some(&3));
        assert!(!registry.contains_key("alpha"));
        assert_eq!(registry.len(), 2);
    }
}
