use std::collections::{BTreeMap, BTreeSet};

use crate::registry::ThemeId;

pub const THEME_ATTRIBUTE: &str = "data-theme";
pub const REDUCE_MOTION_CLASS: &str = "reduce-motion";
pub const CUSTOM_THEME_STYLE_ID: &str = "custom-theme-vars";

/// Model of the rendering layer's root element: the attributes, classes and
/// injected style blocks that styling rules key off.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentRoot {
    attributes: BTreeMap<String, String>,
    classes: BTreeSet<String>,
    styles: BTreeMap<String, String>,
}

impl DocumentRoot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_string(), value.to_string());
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn toggle_class(&mut self, class: &str, enabled: bool) {
        if enabled {
            self.classes.insert(class.to_string());
        } else {
            self.classes.remove(class);
        }
    }

    pub fn style(&self, id: &str) -> Option<&str> {
        self.styles.get(id).map(String::as_str)
    }

    pub fn styles(&self) -> impl Iterator<Item = (&str, &str)> {
        self.styles
            .iter()
            .map(|(id, css)| (id.as_str(), css.as_str()))
    }

    fn upsert_style(&mut self, id: &str, css: String) {
        self.styles.insert(id.to_string(), css);
    }

    fn remove_style(&mut self, id: &str) -> bool {
        self.styles.remove(id).is_some()
    }
}

pub fn apply_theme(root: &mut DocumentRoot, theme_id: ThemeId) {
    root.set_attribute(THEME_ATTRIBUTE, theme_id.as_str());
    tracing::debug!(theme = %theme_id, "applied theme attribute");
}

/// Theme currently painted on `root`, if any valid one is.
pub fn current_theme(root: &DocumentRoot) -> Option<ThemeId> {
    root.attribute(THEME_ATTRIBUTE)
        .and_then(|raw| raw.parse().ok())
}

pub fn set_reduced_motion(root: &mut DocumentRoot, reduced: bool) {
    root.toggle_class(REDUCE_MOTION_CLASS, reduced);
}

/// Writes the custom palette as CSS custom properties scoped to the custom theme.
pub fn inject_custom_theme<'a, I>(root: &mut DocumentRoot, css_variables: I)
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    let declarations: String = css_variables
        .into_iter()
        .map(|(key, value)| format!("  {key}: {value};\n"))
        .collect();
    let css = format!("[{THEME_ATTRIBUTE}=\"custom\"] {{\n{declarations}}}");
    root.upsert_style(CUSTOM_THEME_STYLE_ID, css);
}

pub fn remove_custom_theme(root: &mut DocumentRoot) -> bool {
    root.remove_style(CUSTOM_THEME_STYLE_ID)
}
