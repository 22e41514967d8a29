use crate::registry::{ThemeCategory, ThemeId};

use super::model::CustomTheme;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeEvent {
    SetTheme(ThemeId),
    Toggle,
    /// `scheme` is the OS preference sampled at request time; ignored when
    /// `follow` is false.
    SetFollowSystem {
        follow: bool,
        scheme: ThemeCategory,
    },
    SystemSchemeChanged(ThemeCategory),
    SaveCustomTheme(CustomTheme),
    DeleteCustomTheme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeEventKind {
    SetTheme,
    Toggle,
    SetFollowSystem,
    SystemSchemeChanged,
    SaveCustomTheme,
    DeleteCustomTheme,
}

impl ThemeEvent {
    pub fn kind(&self) -> ThemeEventKind {
        match self {
            Self::SetTheme(_) => ThemeEventKind::SetTheme,
            Self::Toggle => ThemeEventKind::Toggle,
            Self::SetFollowSystem { .. } => ThemeEventKind::SetFollowSystem,
            Self::SystemSchemeChanged(_) => ThemeEventKind::SystemSchemeChanged,
            Self::SaveCustomTheme(_) => ThemeEventKind::SaveCustomTheme,
            Self::DeleteCustomTheme => ThemeEventKind::DeleteCustomTheme,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeTransition {
    pub from: ThemeId,
    pub event: ThemeEventKind,
    pub to: ThemeId,
}

impl ThemeTransition {
    pub const fn new(from: ThemeId, event: ThemeEventKind, to: ThemeId) -> Self {
        Self { from, event, to }
    }

    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}
