use std::fmt::Write as _;

use crate::controller::ThemeController;
use crate::error::{AppError, AppResult};
use crate::presentation::THEME_ATTRIBUTE;
use crate::registry::{ThemeCategory, ThemeId};
use crate::state::CustomTheme;

pub const USAGE: &str = "\
usage: themekeeper [command]

commands:
  show                               print the active theme (default)
  list                               list registered themes
  set <theme-id>                     select a theme (or `custom`)
  toggle                             switch between terminal-dark and kpop-rainbow
  follow <on|off>                    follow the system light/dark preference
  save-custom <name> [--key=value]   store a custom palette and select it
  delete-custom                      remove the custom palette";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Show,
    List,
    Set(ThemeId),
    Toggle,
    Follow(bool),
    SaveCustom(CustomTheme),
    DeleteCustom,
}

impl Command {
    pub fn parse<I>(args: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let Some(name) = args.next() else {
            return Ok(Self::Show);
        };
        let rest: Vec<String> = args.collect();

        let command = match (name.as_str(), rest.as_slice()) {
            ("show", []) => Self::Show,
            ("list", []) => Self::List,
            ("set", [id]) => Self::Set(id.parse()?),
            ("toggle", []) => Self::Toggle,
            ("follow", [flag]) => Self::Follow(parse_switch(flag)?),
            ("save-custom", [theme_name, colors @ ..]) => {
                Self::SaveCustom(parse_custom_theme(theme_name, colors)?)
            }
            ("delete-custom", []) => Self::DeleteCustom,
            _ => {
                return Err(AppError::Usage(format!(
                    "unrecognized arguments: {name} {}",
                    rest.join(" ")
                )))
            }
        };
        Ok(command)
    }

    /// Runs the command and returns the report to print.
    pub fn execute(self, controller: &mut ThemeController) -> AppResult<String> {
        match self {
            Self::Show => {}
            Self::List => return Ok(describe_registry(controller)),
            Self::Set(id) => {
                controller.set_theme(id)?;
            }
            Self::Toggle => {
                controller.toggle_theme();
            }
            Self::Follow(follow) => {
                controller.set_follow_system(follow);
            }
            Self::SaveCustom(theme) => {
                controller.save_custom_theme(theme);
            }
            Self::DeleteCustom => {
                controller.delete_custom_theme();
            }
        }
        Ok(describe_state(controller))
    }
}

fn parse_switch(flag: &str) -> AppResult<bool> {
    match flag {
        "on" | "true" | "1" => Ok(true),
        "off" | "false" | "0" => Ok(false),
        other => Err(AppError::Usage(format!("expected on/off, got `{other}`"))),
    }
}

fn parse_custom_theme(name: &str, colors: &[String]) -> AppResult<CustomTheme> {
    colors.iter().try_fold(CustomTheme::new(name), |theme, raw| {
        let (key, value) = raw
            .split_once('=')
            .filter(|(key, value)| key.starts_with("--") && !value.is_empty())
            .ok_or_else(|| AppError::Usage(format!("expected --property=value, got `{raw}`")))?;
        Ok(theme.with_color(key, value))
    })
}

pub fn describe_state(controller: &ThemeController) -> String {
    let mut out = String::new();
    let current = controller.current();
    let label = current
        .metadata()
        .map(|meta| meta.name.to_string())
        .or_else(|| controller.custom_theme().map(|theme| theme.name.clone()))
        .unwrap_or_default();
    let _ = writeln!(out, "current: {current} ({label})");
    let _ = writeln!(out, "follow system: {}", controller.follow_system());
    let _ = writeln!(
        out,
        "{THEME_ATTRIBUTE}: {}",
        controller.document().attribute(THEME_ATTRIBUTE).unwrap_or("-")
    );
    if let Some(custom) = controller.custom_theme() {
        let _ = writeln!(out, "custom theme: {} ({} colors)", custom.name, custom.colors.len());
    }
    out
}

pub fn describe_registry(controller: &ThemeController) -> String {
    let mut out = String::new();
    for category in [ThemeCategory::Dark, ThemeCategory::Light] {
        let _ = writeln!(out, "{} themes:", category.as_str());
        for meta in controller.themes().filter(|meta| meta.category == category) {
            let marker = if controller.current().as_str() == meta.id {
                '*'
            } else {
                ' '
            };
            let _ = writeln!(
                out,
                " {marker} {:<14} {:<14} {} {} {}",
                meta.id,
                meta.name,
                meta.preview.primary,
                meta.preview.background,
                meta.preview.accent
            );
        }
    }
    out
}
