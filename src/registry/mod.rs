use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

pub const CUSTOM_THEME_ID: &str = "custom";

pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("unknown theme id: {0}")]
    UnknownTheme(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeCategory {
    Dark,
    Light,
}

impl ThemeCategory {
    pub const fn opposite(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }
}

/// Swatch colors shown next to a theme in pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePreview {
    pub primary: &'static str,
    pub background: &'static str,
    pub accent: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeMetadata {
    pub id: &'static str,
    pub name: &'static str,
    pub category: ThemeCategory,
    pub preview: ThemePreview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinTheme {
    TerminalDark,
    MidnightInk,
    EmberNight,
    KpopRainbow,
    PaperWhite,
    SakuraMist,
}

/// Registry order; the first theme of a category wins category lookups.
pub const BUILTIN_THEMES: [BuiltinTheme; 6] = [
    BuiltinTheme::TerminalDark,
    BuiltinTheme::MidnightInk,
    BuiltinTheme::EmberNight,
    BuiltinTheme::KpopRainbow,
    BuiltinTheme::PaperWhite,
    BuiltinTheme::SakuraMist,
];

pub const DEFAULT_THEME: BuiltinTheme = BuiltinTheme::TerminalDark;

const TERMINAL_DARK: ThemeMetadata = ThemeMetadata {
    id: "terminal-dark",
    name: "Terminal Dark",
    category: ThemeCategory::Dark,
    preview: ThemePreview {
        primary: "#39ff14",
        background: "#0a0e14",
        accent: "#ffb000",
    },
};

const MIDNIGHT_INK: ThemeMetadata = ThemeMetadata {
    id: "midnight-ink",
    name: "Midnight Ink",
    category: ThemeCategory::Dark,
    preview: ThemePreview {
        primary: "#7aa2f7",
        background: "#1a1b26",
        accent: "#bb9af7",
    },
};

const EMBER_NIGHT: ThemeMetadata = ThemeMetadata {
    id: "ember-night",
    name: "Ember Night",
    category: ThemeCategory::Dark,
    preview: ThemePreview {
        primary: "#ff6e40",
        background: "#1c1412",
        accent: "#ffd180",
    },
};

const KPOP_RAINBOW: ThemeMetadata = ThemeMetadata {
    id: "kpop-rainbow",
    name: "K-Pop Rainbow",
    category: ThemeCategory::Light,
    preview: ThemePreview {
        primary: "#ff2d95",
        background: "#ffffff",
        accent: "#7c4dff",
    },
};

const PAPER_WHITE: ThemeMetadata = ThemeMetadata {
    id: "paper-white",
    name: "Paper White",
    category: ThemeCategory::Light,
    preview: ThemePreview {
        primary: "#1f2328",
        background: "#fafafa",
        accent: "#0969da",
    },
};

const SAKURA_MIST: ThemeMetadata = ThemeMetadata {
    id: "sakura-mist",
    name: "Sakura Mist",
    category: ThemeCategory::Light,
    preview: ThemePreview {
        primary: "#d6336c",
        background: "#fff5f8",
        accent: "#20c997",
    },
};

impl BuiltinTheme {
    pub const fn metadata(self) -> &'static ThemeMetadata {
        match self {
            Self::TerminalDark => &TERMINAL_DARK,
            Self::MidnightInk => &MIDNIGHT_INK,
            Self::EmberNight => &EMBER_NIGHT,
            Self::KpopRainbow => &KPOP_RAINBOW,
            Self::PaperWhite => &PAPER_WHITE,
            Self::SakuraMist => &SAKURA_MIST,
        }
    }

    pub const fn id(self) -> &'static str {
        self.metadata().id
    }

    pub const fn category(self) -> ThemeCategory {
        self.metadata().category
    }

    pub fn from_id(id: &str) -> Option<Self> {
        BUILTIN_THEMES.into_iter().find(|theme| theme.id() == id)
    }
}

/// Identifier of the active theme: a registry entry or the user's custom palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeId {
    Builtin(BuiltinTheme),
    Custom,
}

impl ThemeId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Builtin(theme) => theme.id(),
            Self::Custom => CUSTOM_THEME_ID,
        }
    }

    pub const fn is_custom(self) -> bool {
        matches!(self, Self::Custom)
    }

    pub fn metadata(self) -> Option<&'static ThemeMetadata> {
        match self {
            Self::Builtin(theme) => Some(theme.metadata()),
            Self::Custom => None,
        }
    }
}

impl Default for ThemeId {
    fn default() -> Self {
        Self::Builtin(DEFAULT_THEME)
    }
}

impl From<BuiltinTheme> for ThemeId {
    fn from(theme: BuiltinTheme) -> Self {
        Self::Builtin(theme)
    }
}

impl fmt::Display for ThemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeId {
    type Err = RegistryError;

    fn from_str(raw: &str) -> RegistryResult<Self> {
        let id = raw.trim();
        if id == CUSTOM_THEME_ID {
            return Ok(Self::Custom);
        }
        BuiltinTheme::from_id(id)
            .map(Self::Builtin)
            .ok_or_else(|| RegistryError::UnknownTheme(id.to_string()))
    }
}

impl Serialize for ThemeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ThemeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

pub fn all_themes() -> impl Iterator<Item = &'static ThemeMetadata> {
    BUILTIN_THEMES.into_iter().map(BuiltinTheme::metadata)
}

pub fn default_theme() -> ThemeId {
    ThemeId::Builtin(DEFAULT_THEME)
}

pub fn is_valid_theme_id(id: &str) -> bool {
    id.parse::<ThemeId>().is_ok()
}

pub fn first_theme_in(category: ThemeCategory) -> Option<BuiltinTheme> {
    BUILTIN_THEMES
        .into_iter()
        .find(|theme| theme.category() == category)
}

pub fn themes_in(category: ThemeCategory) -> impl Iterator<Item = &'static ThemeMetadata> {
    all_themes().filter(move |meta| meta.category == category)
}

/// First registry theme of the opposite category, or the theme itself when
/// that category is empty.
pub fn opposite_theme(theme: BuiltinTheme) -> BuiltinTheme {
    first_theme_in(theme.category().opposite()).unwrap_or(theme)
}
