use crate::registry::{default_theme, first_theme_in, BuiltinTheme, ThemeCategory, ThemeId};

use super::error::{StateError, StateResult};
use super::{ThemeEvent, ThemeState, ThemeTransition};

/// Toggle and follow-system always pick between these two, whatever else is registered.
pub const TOGGLE_DARK: BuiltinTheme = BuiltinTheme::TerminalDark;
pub const TOGGLE_LIGHT: BuiltinTheme = BuiltinTheme::KpopRainbow;

#[derive(Debug, Default)]
pub struct ThemeMachine {
    state: ThemeState,
    transition_history: Vec<ThemeTransition>,
}

impl ThemeMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: ThemeState) -> Self {
        Self {
            state: state.repaired(),
            transition_history: Vec::new(),
        }
    }

    pub fn state(&self) -> &ThemeState {
        &self.state
    }

    pub fn current(&self) -> ThemeId {
        self.state.current
    }

    pub fn history(&self) -> &[ThemeTransition] {
        &self.transition_history
    }

    pub fn can_transition(&self, event: &ThemeEvent) -> bool {
        self.check(event).is_ok()
    }

    /// Only `SetTheme(Custom)` without a saved palette is refused.
    pub fn check(&self, event: &ThemeEvent) -> StateResult<()> {
        match event {
            ThemeEvent::SetTheme(id) if id.is_custom() && self.state.custom_theme.is_none() => {
                Err(StateError::MissingCustomTheme {
                    event: event.kind(),
                })
            }
            _ => Ok(()),
        }
    }

    pub fn next_state(&self, event: &ThemeEvent) -> StateResult<ThemeState> {
        self.check(event)?;
        Ok(self.reduce(event))
    }

    pub fn transition(&mut self, event: ThemeEvent) -> StateResult<ThemeTransition> {
        self.check(&event).inspect_err(|err| {
            tracing::warn!(from = %self.state.current, ?err, "rejected theme transition");
        })?;
        Ok(self.commit(event))
    }

    /// Applies `event` without the custom-palette check; a refused event leaves
    /// the state as it was but is still recorded.
    pub fn commit(&mut self, event: ThemeEvent) -> ThemeTransition {
        tracing::debug!(from = %self.state.current, event = ?event.kind(), "apply theme transition");
        let next = self.reduce(&event);
        let record = ThemeTransition::new(self.state.current, event.kind(), next.current);
        self.state = next;
        self.transition_history.push(record);
        record
    }

    fn reduce(&self, event: &ThemeEvent) -> ThemeState {
        let mut next = self.state.clone();
        match event {
            ThemeEvent::SetTheme(id) => {
                if !id.is_custom() || next.custom_theme.is_some() {
                    next.current = *id;
                }
            }
            ThemeEvent::Toggle => {
                next.current = toggled(self.state.current).into();
            }
            ThemeEvent::SetFollowSystem { follow, scheme } => {
                next.follow_system = *follow;
                if *follow {
                    next.current = theme_for_scheme(*scheme).into();
                }
            }
            ThemeEvent::SystemSchemeChanged(scheme) => {
                if next.follow_system {
                    if let Some(theme) = first_theme_in(*scheme) {
                        next.current = theme.into();
                    }
                }
            }
            ThemeEvent::SaveCustomTheme(theme) => {
                next.custom_theme = Some(theme.clone());
                next.current = ThemeId::Custom;
            }
            ThemeEvent::DeleteCustomTheme => {
                next.custom_theme = None;
                next.current = default_theme();
            }
        }
        next
    }
}

fn toggled(current: ThemeId) -> BuiltinTheme {
    if current == ThemeId::Builtin(TOGGLE_DARK) {
        TOGGLE_LIGHT
    } else {
        TOGGLE_DARK
    }
}

fn theme_for_scheme(scheme: ThemeCategory) -> BuiltinTheme {
    match scheme {
        ThemeCategory::Dark => TOGGLE_DARK,
        ThemeCategory::Light => TOGGLE_LIGHT,
    }
}
