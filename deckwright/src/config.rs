//! Layered configuration: defaults, then an optional TOML file, then
//! environment overrides, then validation.
//!
//! ```rust
//! use deckwright::{DeckwrightConfig, LogFormat, StorageBackend};
//!
//! let config = DeckwrightConfig::from_toml_str(
//!     r#"
//!     [agent]
//!     max_turns = 12
//!
//!     [storage]
//!     backend = "memory"
//!
//!     [logging]
//!     format = "json"
//!     "#,
//! )
//! .expect("config should parse");
//!
//! assert_eq!(config.agent.max_turns, 12);
//! assert_eq!(config.storage.backend, StorageBackend::Memory);
//! assert_eq!(config.logging.format, LogFormat::Json);
//! assert_eq!(config.provider.model, "gpt-4o-mini");
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use dagent::{AgentPolicy, DEFAULT_MAX_TURNS, DEFAULT_MODEL};
use dmemory::SessionStoreConfig;
use serde::Deserialize;

pub const CONFIG_PATH_ENV: &str = "DECKWRIGHT_CONFIG";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    Read,
    Parse,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub kind: ConfigErrorKind,
    pub message: String,
}

impl ConfigError {
    pub fn new(kind: ConfigErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn read(message: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::Read, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::Parse, message)
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::Invalid, message)
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub base_url: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    /// `0` disables the bound.
    pub max_turns: u32,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Memory,
    Filesystem,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Root directory for `filesystem`, database file for `sqlite`.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeckwrightConfig {
    pub provider: ProviderConfig,
    pub agent: AgentConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 120,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
            temperature: None,
            max_tokens: None,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            path: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" | "in_memory" => Ok(Self::Memory),
            "filesystem" | "fs" => Ok(Self::Filesystem),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(ConfigError::invalid(format!(
                "unsupported storage backend `{other}` (expected memory|filesystem|sqlite)"
            ))),
        }
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::invalid(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AgentConfig {
    pub fn policy(&self, model: impl Into<String>) -> AgentPolicy {
        let max_turns = (self.max_turns > 0).then_some(self.max_turns);
        let mut policy = AgentPolicy::default()
            .with_model(model)
            .with_max_turns(max_turns);
        if let Some(temperature) = self.temperature {
            policy = policy.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            policy = policy.with_max_tokens(max_tokens);
        }
        policy
    }
}

impl StorageConfig {
    pub fn store_config(&self) -> SessionStoreConfig {
        match (self.backend, &self.path) {
            (StorageBackend::Memory, _) => SessionStoreConfig::InMemory,
            (StorageBackend::Filesystem, Some(root)) => SessionStoreConfig::Filesystem {
                root: root.clone(),
            },
            (StorageBackend::Filesystem, None) => SessionStoreConfig::Filesystem {
                root: PathBuf::from(".deckwright"),
            },
            (StorageBackend::Sqlite, Some(path)) => SessionStoreConfig::Sqlite { path: path.clone() },
            (StorageBackend::Sqlite, None) => SessionStoreConfig::default(),
        }
    }
}

impl DeckwrightConfig {
    /// Loads from `path`, or from `DECKWRIGHT_CONFIG` when no path is given,
    /// and applies process environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// Same as [`DeckwrightConfig::load`] with an explicit environment lookup.
    pub fn load_with_env(
        path: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let path = path
            .map(Path::to_path_buf)
            .or_else(|| read_env(&env, CONFIG_PATH_ENV).map(PathBuf::from));
        if let Some(path) = path {
            config.apply_patch(read_patch(&path)?);
        }

        config.apply_env_overrides(&env)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML document over the defaults, without environment overrides.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let patch = toml::from_str::<ConfigPatch>(raw)
            .map_err(|error| ConfigError::parse(format!("invalid config: {error}")))?;
        let mut config = Self::default();
        config.apply_patch(patch);
        config.validate()?;
        Ok(config)
    }

    pub fn policy(&self) -> AgentPolicy {
        self.agent.policy(self.provider.model.clone())
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(provider) = patch.provider {
            if let Some(base_url) = provider.base_url {
                self.provider.base_url = base_url;
            }
            if let Some(model) = provider.model {
                self.provider.model = model;
            }
            if let Some(api_key_env) = provider.api_key_env {
                self.provider.api_key_env = api_key_env;
            }
            if let Some(timeout_secs) = provider.timeout_secs {
                self.provider.timeout_secs = timeout_secs;
            }
        }

        if let Some(agent) = patch.agent {
            if let Some(max_turns) = agent.max_turns {
                self.agent.max_turns = max_turns;
            }
            if agent.temperature.is_some() {
                self.agent.temperature = agent.temperature;
            }
            if agent.max_tokens.is_some() {
                self.agent.max_tokens = agent.max_tokens;
            }
        }

        if let Some(storage) = patch.storage {
            if let Some(backend) = storage.backend {
                self.storage.backend = backend;
            }
            if storage.path.is_some() {
                self.storage.path = storage.path;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(
        &mut self,
        env: &impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(value) = read_env(env, "DECKWRIGHT_MODEL") {
            self.provider.model = value;
        }
        if let Some(value) = read_env(env, "DECKWRIGHT_BASE_URL") {
            self.provider.base_url = value;
        }
        if let Some(value) = read_env(env, "DECKWRIGHT_MAX_TURNS") {
            self.agent.max_turns = value.trim().parse().map_err(|_| {
                ConfigError::invalid(format!(
                    "invalid environment override for `DECKWRIGHT_MAX_TURNS`: `{value}`"
                ))
            })?;
        }
        if let Some(value) = read_env(env, "DECKWRIGHT_STORAGE_BACKEND") {
            self.storage.backend = value.parse()?;
        }
        if let Some(value) = read_env(env, "DECKWRIGHT_STORAGE_PATH") {
            self.storage.path = Some(PathBuf::from(value));
        }
        if let Some(value) = read_env(env, "DECKWRIGHT_LOG_LEVEL") {
            self.logging.level = value;
        }
        if let Some(value) = read_env(env, "DECKWRIGHT_LOG_FORMAT") {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.provider.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::invalid(
                "provider.base_url must be an http:// or https:// URL",
            ));
        }
        if self.provider.model.trim().is_empty() {
            return Err(ConfigError::invalid("provider.model must not be empty"));
        }
        if self.provider.api_key_env.trim().is_empty() {
            return Err(ConfigError::invalid("provider.api_key_env must not be empty"));
        }
        if self.provider.timeout_secs == 0 || self.provider.timeout_secs > 600 {
            return Err(ConfigError::invalid(
                "provider.timeout_secs must be in range 1..=600",
            ));
        }

        if let Some(temperature) = self.agent.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            return Err(ConfigError::invalid(
                "agent.temperature must be in range 0.0..=2.0",
            ));
        }
        if self.agent.max_tokens == Some(0) {
            return Err(ConfigError::invalid(
                "agent.max_tokens must be greater than zero",
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid("logging.level must not be empty"));
        }

        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigPatch {
    provider: Option<ProviderPatch>,
    agent: Option<AgentPatch>,
    storage: Option<StoragePatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProviderPatch {
    base_url: Option<String>,
    model: Option<String>,
    api_key_env: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct AgentPatch {
    max_turns: Option<u32>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct StoragePatch {
    backend: Option<StorageBackend>,
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|error| {
        ConfigError::read(format!(
            "could not read config file `{}`: {error}",
            path.display()
        ))
    })?;

    toml::from_str::<ConfigPatch>(&raw).map_err(|error| {
        ConfigError::parse(format!(
            "could not parse config file `{}`: {error}",
            path.display()
        ))
    })
}

fn read_env(env: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    env(key).filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::time::{SystemTime, UNIX_EPOCH};

    use dmemory::SessionStoreConfig;

    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| values.get(key).cloned()
    }

    fn temp_config(contents: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after epoch")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("deckwright-config-{nanos}"));
        std::fs::create_dir_all(&dir).expect("temp dir should be created");
        let path = dir.join("deckwright.toml");
        std::fs::write(&path, contents).expect("config should be written");
        path
    }

    #[test]
    fn defaults_validate_and_produce_the_default_policy() {
        let config = DeckwrightConfig::load_with_env(None, env_from(&[]))
            .expect("defaults should load");
        assert_eq!(config, DeckwrightConfig::default());

        let policy = config.policy();
        assert_eq!(policy.model, "gpt-4o-mini");
        assert_eq!(policy.max_turns, Some(32));
        assert_eq!(config.storage.store_config(), SessionStoreConfig::default());
    }

    #[test]
    fn file_values_are_overridden_by_environment() {
        let path = temp_config(
            r#"
            [provider]
            base_url = "http://localhost:8080/v1"
            model = "gpt-4o"

            [agent]
            max_turns = 0
            temperature = 0.2

            [storage]
            backend = "filesystem"
            path = "/var/lib/decks"
            "#,
        );

        let config = DeckwrightConfig::load_with_env(
            Some(&path),
            env_from(&[("DECKWRIGHT_MODEL", "gpt-4.1"), ("DECKWRIGHT_LOG_FORMAT", "pretty")]),
        )
        .expect("config should load");

        assert_eq!(config.provider.base_url, "http://localhost:8080/v1");
        assert_eq!(config.provider.model, "gpt-4.1");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.policy().max_turns, None);
        assert_eq!(config.policy().temperature, Some(0.2));
        assert_eq!(
            config.storage.store_config(),
            SessionStoreConfig::Filesystem {
                root: PathBuf::from("/var/lib/decks"),
            }
        );
    }

    #[test]
    fn config_path_can_come_from_the_environment() {
        let path = temp_config("[logging]\nlevel = \"debug\"\n");
        let path_text = path.to_string_lossy().into_owned();

        let config = DeckwrightConfig::load_with_env(
            None,
            env_from(&[(CONFIG_PATH_ENV, path_text.as_str()), ("DECKWRIGHT_STORAGE_BACKEND", "memory")]),
        )
        .expect("config should load");

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.storage.store_config(), SessionStoreConfig::InMemory);
    }

    #[test]
    fn failures_are_classified() {
        let missing = DeckwrightConfig::load_with_env(
            Some(Path::new("/definitely/not/here/deckwright.toml")),
            env_from(&[]),
        )
        .expect_err("missing file should fail");
        assert_eq!(missing.kind, ConfigErrorKind::Read);

        let unknown_key = DeckwrightConfig::from_toml_str("[agent]\nmax_loops = 3\n")
            .expect_err("unknown keys should fail");
        assert_eq!(unknown_key.kind, ConfigErrorKind::Parse);

        let bad_turns = DeckwrightConfig::load_with_env(
            None,
            env_from(&[("DECKWRIGHT_MAX_TURNS", "lots")]),
        )
        .expect_err("non-numeric override should fail");
        assert_eq!(bad_turns.kind, ConfigErrorKind::Invalid);

        let bad_url = DeckwrightConfig::from_toml_str("[provider]\nbase_url = \"api.openai.com\"\n")
            .expect_err("scheme-less url should fail");
        assert_eq!(bad_url.kind, ConfigErrorKind::Invalid);
        assert_eq!(
            bad_url.to_string(),
            "Invalid: provider.base_url must be an http:// or https:// URL"
        );
    }
}
