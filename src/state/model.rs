use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::registry::{default_theme, ThemeId};

/// User-defined palette keyed by CSS custom property name (`--primary`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomTheme {
    pub name: String,
    #[serde(default)]
    pub colors: BTreeMap<String, String>,
}

impl CustomTheme {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            colors: BTreeMap::new(),
        }
    }

    pub fn with_color(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.colors.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeState {
    pub current: ThemeId,
    #[serde(default)]
    pub follow_system: bool,
    #[serde(default)]
    pub custom_theme: Option<CustomTheme>,
}

impl Default for ThemeState {
    fn default() -> Self {
        Self {
            current: default_theme(),
            follow_system: false,
            custom_theme: None,
        }
    }
}

impl ThemeState {
    /// `current` may only be `custom` while a custom palette exists.
    pub fn is_consistent(&self) -> bool {
        !self.current.is_custom() || self.custom_theme.is_some()
    }

    pub(crate) fn repaired(mut self) -> Self {
        if !self.is_consistent() {
            tracing::warn!("stored theme is custom without a palette; resetting to default");
            self.current = default_theme();
        }
        self
    }
}
