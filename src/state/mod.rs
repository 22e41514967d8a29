pub mod error;
pub mod event;
pub mod machine;
pub mod model;

pub use error::{StateError, StateResult};
pub use event::{ThemeEvent, ThemeEventKind, ThemeTransition};
pub use machine::ThemeMachine;
pub use model::{CustomTheme, ThemeState};
