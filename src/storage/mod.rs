use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ConfigDirs;
use crate::state::ThemeState;

/// Fixed key the theme preference is stored under.
pub const STORAGE_KEY: &str = "theme-preference";
const STORAGE_VERSION: u32 = 0;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("missing HOME environment variable")]
    MissingHomeDirectory,
    #[error("failed to read theme state: {path}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write theme state: {path}")]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to parse theme state")]
    Parse(#[from] serde_json::Error),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Durable home of the persisted [`ThemeState`].
pub trait ThemeStorage {
    /// `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> StorageResult<Option<ThemeState>>;
    fn save(&self, state: &ThemeState) -> StorageResult<()>;
}

#[derive(Debug, Serialize)]
struct PersistedEnvelopeRef<'a> {
    state: &'a ThemeState,
    version: u32,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PersistedPayload {
    Envelope {
        state: ThemeState,
        #[serde(default)]
        version: u32,
    },
    Bare(ThemeState),
}

pub fn encode_state(state: &ThemeState) -> StorageResult<String> {
    let envelope = PersistedEnvelopeRef {
        state,
        version: STORAGE_VERSION,
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

pub fn decode_state(serialized: &str) -> StorageResult<ThemeState> {
    match serde_json::from_str(serialized)? {
        PersistedPayload::Envelope { state, version } => {
            if version != STORAGE_VERSION {
                tracing::debug!(version, "reading theme state from a different version");
            }
            Ok(state)
        }
        PersistedPayload::Bare(state) => Ok(state),
    }
}

/// Reads stored state, falling back to defaults on any failure.
pub fn load_or_default(storage: &dyn ThemeStorage) -> ThemeState {
    match storage.load() {
        Ok(Some(state)) => state,
        Ok(None) => ThemeState::default(),
        Err(err) => {
            tracing::warn!(?err, "failed to load theme state; using defaults");
            ThemeState::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn with_default_path() -> StorageResult<Self> {
        Self::with_default_path_in(&ConfigDirs::from_env())
    }

    pub fn with_default_path_in(dirs: &ConfigDirs) -> StorageResult<Self> {
        dirs.theme_state_path()
            .map(Self::with_path)
            .ok_or(StorageError::MissingHomeDirectory)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ThemeStorage for FileStorage {
    fn load(&self) -> StorageResult<Option<ThemeState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let serialized = fs::read_to_string(&self.path).map_err(|source| StorageError::Read {
            path: self.path.clone(),
            source,
        })?;
        decode_state(&serialized).map(Some)
    }

    fn save(&self, state: &ThemeState) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        let serialized = encode_state(state)?;
        fs::write(&self.path, serialized).map_err(|source| StorageError::Write {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), current = %state.current, "saved theme state");
        Ok(())
    }
}

/// In-process storage; clones share the same slot so a reload can observe
/// what an earlier controller wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Rc<RefCell<Option<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_raw(serialized: impl Into<String>) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Some(serialized.into()))),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.slot.borrow().clone()
    }
}

impl ThemeStorage for MemoryStorage {
    fn load(&self) -> StorageResult<Option<ThemeState>> {
        self.slot.borrow().as_deref().map(decode_state).transpose()
    }

    fn save(&self, state: &ThemeState) -> StorageResult<()> {
        let serialized = encode_state(state)?;
        *self.slot.borrow_mut() = Some(serialized);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{BuiltinTheme, ThemeId};
    use crate::state::CustomTheme;

    fn fixture_root() -> PathBuf {
        let mut path = std::env::temp_dir();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::SystemTime::UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos());
        let pid = std::process::id();
        path.push(format!("themekeeper-storage-{pid}-{nanos}"));
        path
    }

    fn with_temp_root<F: FnOnce(&Path)>(f: F) {
        let root = fixture_root();
        fs::create_dir_all(&root).unwrap();
        f(&root);
        let _ = fs::remove_dir_all(&root);
    }

    fn sample_state() -> ThemeState {
        ThemeState {
            current: ThemeId::Custom,
            follow_system: true,
            custom_theme: Some(
                CustomTheme::new("Late Night")
                    .with_color("--background", "#000000")
                    .with_color("--primary", "#ff00aa"),
            ),
        }
    }

    #[test]
    fn default_path_uses_storage_key_under_app_dir() {
        let dirs = ConfigDirs {
            xdg_config_home: Some(PathBuf::from("/tmp/config-root")),
            home: None,
        };
        let storage = FileStorage::with_default_path_in(&dirs).unwrap();
        assert_eq!(
            storage.path(),
            Path::new("/tmp/config-root/themekeeper/theme-preference.json")
        );
    }

    #[test]
    fn default_path_errors_without_home() {
        let err = FileStorage::with_default_path_in(&ConfigDirs::default()).unwrap_err();
        assert!(matches!(err, StorageError::MissingHomeDirectory));
    }

    #[test]
    fn file_storage_missing_file_loads_none() {
        with_temp_root(|root| {
            let storage = FileStorage::with_path(root.join("absent.json"));
            assert!(storage.load().unwrap().is_none());
            assert_eq!(load_or_default(&storage), ThemeState::default());
        });
    }

    #[test]
    fn file_storage_round_trips_state() {
        with_temp_root(|root| {
            let storage = FileStorage::with_path(root.join("nested").join("state.json"));
            let state = sample_state();
            storage.save(&state).unwrap();
            assert_eq!(storage.load().unwrap(), Some(state));
        });
    }

    #[test]
    fn file_storage_corrupt_payload_falls_back_to_defaults() {
        with_temp_root(|root| {
            let path = root.join("state.json");
            fs::write(&path, "{ invalid ").unwrap();
            let storage = FileStorage::with_path(&path);
            assert!(matches!(storage.load(), Err(StorageError::Parse(_))));
            assert_eq!(load_or_default(&storage), ThemeState::default());
        });
    }

    #[test]
    fn encoded_state_uses_versioned_envelope() {
        let encoded = encode_state(&ThemeState::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "state": {
                    "current": "terminal-dark",
                    "followSystem": false,
                    "customTheme": null
                },
                "version": 0
            })
        );
    }

    #[test]
    fn decode_accepts_bare_state_object() {
        let state = decode_state(r#"{"current":"midnight-ink","followSystem":true}"#).unwrap();
        assert_eq!(state.current, ThemeId::Builtin(BuiltinTheme::MidnightInk));
        assert!(state.follow_system);
    }

    #[test]
    fn decode_rejects_unknown_theme_id() {
        let err = decode_state(r#"{"state":{"current":"solarized"},"version":0}"#);
        assert!(err.is_err());
    }

    #[test]
    fn memory_storage_clones_share_slot() {
        let storage = MemoryStorage::new();
        let reader = storage.clone();
        assert!(reader.load().unwrap().is_none());

        storage.save(&sample_state()).unwrap();
        assert_eq!(reader.load().unwrap(), Some(sample_state()));
        assert!(reader.raw().unwrap().contains("\"version\": 0"));
    }
}
