use super::event::ThemeEventKind;
use thiserror::Error;

pub type StateResult<T> = std::result::Result<T, StateError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("cannot select the custom theme before one is saved (event {event:?})")]
    MissingCustomTheme { event: ThemeEventKind },
}
