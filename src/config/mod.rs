//! Where themekeeper keeps its files, and the optional `config.json`.
//!
//! Everything lives in one directory, `$XDG_CONFIG_HOME/themekeeper` (or
//! `~/.config/themekeeper`): the settings file and the persisted theme state.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::storage::STORAGE_KEY;

const APP_DIR: &str = "themekeeper";
const APP_CONFIG_FILE: &str = "config.json";

/// Application-level settings from `config.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// Overrides where the theme state file lives. Relative paths resolve
    /// against the app directory.
    #[serde(default)]
    pub storage_path: Option<PathBuf>,
    /// Forces the reduced-motion preference instead of asking the platform.
    #[serde(default)]
    pub reduce_motion: Option<bool>,
}

impl AppConfig {
    pub fn load() -> Self {
        Self::load_from(&ConfigDirs::from_env())
    }

    /// Missing, unreadable or malformed files all give the defaults.
    pub fn load_from(dirs: &ConfigDirs) -> Self {
        let Some(app_dir) = dirs.app_dir() else {
            tracing::debug!("no config directory; using default settings");
            return Self::default();
        };
        let path = app_dir.join(APP_CONFIG_FILE);
        if !path.exists() {
            return Self::default();
        }

        let config: Self = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
                tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
                Self::default()
            }),
            Err(err) => {
                tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
                Self::default()
            }
        };
        config.resolved_against(&app_dir)
    }

    fn resolved_against(mut self, app_dir: &Path) -> Self {
        if let Some(path) = self.storage_path.take() {
            self.storage_path = Some(if path.is_relative() {
                app_dir.join(path)
            } else {
                path
            });
        }
        self
    }
}

/// The two environment inputs that decide the config root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDirs {
    pub xdg_config_home: Option<PathBuf>,
    pub home: Option<PathBuf>,
}

impl ConfigDirs {
    pub fn from_env() -> Self {
        Self {
            xdg_config_home: std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
            home: std::env::var_os("HOME").map(PathBuf::from),
        }
    }

    /// An empty `XDG_CONFIG_HOME` counts as unset. `None` without either.
    pub fn root(&self) -> Option<PathBuf> {
        match &self.xdg_config_home {
            Some(xdg) if !xdg.as_os_str().is_empty() => Some(xdg.clone()),
            _ => self.home.as_ref().map(|home| home.join(".config")),
        }
    }

    pub fn app_dir(&self) -> Option<PathBuf> {
        self.root().map(|root| root.join(APP_DIR))
    }

    /// Default location of the persisted theme state.
    pub fn theme_state_path(&self) -> Option<PathBuf> {
        self.app_dir()
            .map(|dir| dir.join(format!("{STORAGE_KEY}.json")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_temp_root<F: FnOnce(&Path)>(f: F) {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::SystemTime::UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos());
        let root = std::env::temp_dir().join(format!(
            "themekeeper-config-{}-{nanos}",
            std::process::id()
        ));
        std::fs::create_dir_all(root.join(APP_DIR)).unwrap();
        f(&root);
        let _ = std::fs::remove_dir_all(&root);
    }

    fn xdg(root: &Path) -> ConfigDirs {
        ConfigDirs {
            xdg_config_home: Some(root.to_path_buf()),
            home: None,
        }
    }

    #[test]
    fn theme_state_path_prefers_xdg_config_home() {
        let dirs = ConfigDirs {
            xdg_config_home: Some(PathBuf::from("/tmp/config-root")),
            home: Some(PathBuf::from("/tmp/home")),
        };
        assert_eq!(
            dirs.theme_state_path(),
            Some(PathBuf::from("/tmp/config-root/themekeeper/theme-preference.json"))
        );
    }

    #[test]
    fn empty_xdg_config_home_falls_back_to_home() {
        let dirs = ConfigDirs {
            xdg_config_home: Some(PathBuf::new()),
            home: Some(PathBuf::from("/tmp/home")),
        };
        assert_eq!(dirs.app_dir(), Some(PathBuf::from("/tmp/home/.config/themekeeper")));
    }

    #[test]
    fn no_root_without_home_or_xdg() {
        let dirs = ConfigDirs::default();
        assert_eq!(dirs.root(), None);
        assert_eq!(dirs.theme_state_path(), None);
        assert_eq!(AppConfig::load_from(&dirs), AppConfig::default());
    }

    #[test]
    fn load_reads_overrides() {
        with_temp_root(|root| {
            std::fs::write(
                root.join(APP_DIR).join(APP_CONFIG_FILE),
                r#"{"storage_path": "/tmp/themes/state.json", "reduce_motion": true}"#,
            )
            .unwrap();

            let config = AppConfig::load_from(&xdg(root));
            assert_eq!(
                config.storage_path,
                Some(PathBuf::from("/tmp/themes/state.json"))
            );
            assert_eq!(config.reduce_motion, Some(true));
        });
    }

    #[test]
    fn relative_storage_path_resolves_inside_app_dir() {
        with_temp_root(|root| {
            std::fs::write(
                root.join(APP_DIR).join(APP_CONFIG_FILE),
                r#"{"storage_path": "profiles/work.json"}"#,
            )
            .unwrap();

            let config = AppConfig::load_from(&xdg(root));
            assert_eq!(
                config.storage_path,
                Some(root.join(APP_DIR).join("profiles").join("work.json"))
            );
            assert_eq!(config.reduce_motion, None);
        });
    }

    #[test]
    fn load_defaults_on_missing_or_invalid_file() {
        with_temp_root(|root| {
            assert_eq!(AppConfig::load_from(&xdg(root)), AppConfig::default());

            std::fs::write(root.join(APP_DIR).join(APP_CONFIG_FILE), "not json").unwrap();
            assert_eq!(AppConfig::load_from(&xdg(root)), AppConfig::default());
        });
    }
}
