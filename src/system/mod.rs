use std::cell::Cell;
use std::rc::Rc;

use crate::events::{EventBus, Subscription};
use crate::registry::ThemeCategory;

const COLOR_SCHEME_ENV: &str = "THEMEKEEPER_COLOR_SCHEME";
const REDUCE_MOTION_ENV: &str = "THEMEKEEPER_REDUCE_MOTION";
const GTK_THEME_ENV: &str = "GTK_THEME";

/// Platform preferences the controller samples.
pub trait SystemProbe {
    /// `None` when the platform expresses no light/dark preference.
    fn color_scheme(&self) -> Option<ThemeCategory>;

    fn prefers_reduced_motion(&self) -> bool;

    /// Registers for color-scheme change notifications. Probes that cannot
    /// observe changes return `None`.
    fn watch_color_scheme(
        &self,
        _callback: Box<dyn FnMut(&ThemeCategory)>,
    ) -> Option<Subscription> {
        None
    }

    /// Registers for reduced-motion preference changes; same contract as
    /// [`SystemProbe::watch_color_scheme`].
    fn watch_reduced_motion(&self, _callback: Box<dyn FnMut(&bool)>) -> Option<Subscription> {
        None
    }
}

/// Samples the OS scheme once; no preference resolves to dark.
pub fn sample_color_scheme(probe: &dyn SystemProbe) -> ThemeCategory {
    let scheme = probe.color_scheme().unwrap_or(ThemeCategory::Dark);
    tracing::debug!(scheme = scheme.as_str(), "sampled system color scheme");
    scheme
}

/// Reads preferences from the process environment.
#[derive(Debug, Clone, Default)]
pub struct EnvSystemProbe {
    reduce_motion_override: Option<bool>,
}

impl EnvSystemProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reduce_motion_override(reduce_motion: Option<bool>) -> Self {
        Self {
            reduce_motion_override: reduce_motion,
        }
    }
}

impl SystemProbe for EnvSystemProbe {
    fn color_scheme(&self) -> Option<ThemeCategory> {
        let explicit = std::env::var(COLOR_SCHEME_ENV).ok();
        let gtk_theme = std::env::var(GTK_THEME_ENV).ok();
        scheme_from_env_values(explicit.as_deref(), gtk_theme.as_deref())
    }

    fn prefers_reduced_motion(&self) -> bool {
        if let Some(forced) = self.reduce_motion_override {
            return forced;
        }
        std::env::var(REDUCE_MOTION_ENV)
            .ok()
            .is_some_and(|value| flag_enabled(&value))
    }
}

fn scheme_from_env_values(
    explicit: Option<&str>,
    gtk_theme: Option<&str>,
) -> Option<ThemeCategory> {
    explicit
        .and_then(scheme_from_theme_name)
        .or_else(|| gtk_theme.and_then(scheme_from_theme_name))
}

/// Guesses a scheme from a theme name such as `Adwaita:dark` or `Breeze-Light`.
pub fn scheme_from_theme_name(theme_name: &str) -> Option<ThemeCategory> {
    let normalized = theme_name.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        return None;
    }
    if normalized.contains("dark") {
        return Some(ThemeCategory::Dark);
    }
    if normalized.contains("light") {
        return Some(ThemeCategory::Light);
    }
    None
}

fn flag_enabled(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on" | "reduce"
    )
}

/// Probe with values set by the host; clones share state, and the setters
/// notify watchers when a value actually changes.
#[derive(Clone, Default)]
pub struct StaticProbe {
    scheme: Rc<Cell<Option<ThemeCategory>>>,
    reduced_motion: Rc<Cell<bool>>,
    changes: Rc<EventBus<ThemeCategory>>,
    motion_changes: Rc<EventBus<bool>>,
}

impl StaticProbe {
    pub fn new(scheme: Option<ThemeCategory>, reduced_motion: bool) -> Self {
        Self {
            scheme: Rc::new(Cell::new(scheme)),
            reduced_motion: Rc::new(Cell::new(reduced_motion)),
            changes: Rc::new(EventBus::new()),
            motion_changes: Rc::new(EventBus::new()),
        }
    }

    pub fn set_color_scheme(&self, scheme: ThemeCategory) {
        if self.scheme.replace(Some(scheme)) != Some(scheme) {
            self.changes.emit(&scheme);
        }
    }

    pub fn set_reduced_motion(&self, reduced_motion: bool) {
        if self.reduced_motion.replace(reduced_motion) != reduced_motion {
            self.motion_changes.emit(&reduced_motion);
        }
    }

    pub fn watcher_count(&self) -> usize {
        self.changes.listener_count()
    }

    pub fn motion_watcher_count(&self) -> usize {
        self.motion_changes.listener_count()
    }
}

impl std::fmt::Debug for StaticProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticProbe")
            .field("scheme", &self.scheme.get())
            .field("reduced_motion", &self.reduced_motion.get())
            .field("watchers", &self.changes.listener_count())
            .field("motion_watchers", &self.motion_changes.listener_count())
            .finish()
    }
}

impl SystemProbe for StaticProbe {
    fn color_scheme(&self) -> Option<ThemeCategory> {
        self.scheme.get()
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion.get()
    }

    fn watch_color_scheme(
        &self,
        callback: Box<dyn FnMut(&ThemeCategory)>,
    ) -> Option<Subscription> {
        Some(self.changes.subscribe(callback))
    }

    fn watch_reduced_motion(&self, callback: Box<dyn FnMut(&bool)>) -> Option<Subscription> {
        Some(self.motion_changes.subscribe(callback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn scheme_from_theme_name_detects_dark_and_light_keywords() {
        assert_eq!(scheme_from_theme_name("Adwaita:dark"), Some(ThemeCategory::Dark));
        assert_eq!(scheme_from_theme_name("Breeze-Light"), Some(ThemeCategory::Light));
        assert_eq!(scheme_from_theme_name("HighContrast"), None);
        assert_eq!(scheme_from_theme_name("   "), None);
    }

    #[test]
    fn explicit_scheme_wins_over_gtk_theme() {
        assert_eq!(
            scheme_from_env_values(Some("light"), Some("Adwaita:dark")),
            Some(ThemeCategory::Light)
        );
        assert_eq!(
            scheme_from_env_values(Some("bogus"), Some("Adwaita:dark")),
            Some(ThemeCategory::Dark)
        );
        assert_eq!(scheme_from_env_values(None, None), None);
    }

    #[test]
    fn flag_enabled_accepts_common_truthy_values() {
        for value in ["1", "true", "YES", " on ", "reduce"] {
            assert!(flag_enabled(value), "{value} should enable");
        }
        for value in ["0", "false", "", "no-preference"] {
            assert!(!flag_enabled(value), "{value} should not enable");
        }
    }

    #[test]
    fn env_probe_reduce_motion_override_wins() {
        assert!(EnvSystemProbe::with_reduce_motion_override(Some(true)).prefers_reduced_motion());
        assert!(!EnvSystemProbe::with_reduce_motion_override(Some(false)).prefers_reduced_motion());
    }

    #[test]
    fn sample_without_preference_defaults_to_dark() {
        let probe = StaticProbe::new(None, false);
        assert_eq!(sample_color_scheme(&probe), ThemeCategory::Dark);
        probe.set_color_scheme(ThemeCategory::Light);
        assert_eq!(sample_color_scheme(&probe), ThemeCategory::Light);
    }

    #[test]
    fn static_probe_notifies_watchers_only_on_change() {
        let probe = StaticProbe::new(Some(ThemeCategory::Dark), false);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let subscription = probe
            .watch_color_scheme(Box::new(move |scheme| sink.borrow_mut().push(*scheme)))
            .expect("static probe supports watching");

        probe.set_color_scheme(ThemeCategory::Dark);
        probe.set_color_scheme(ThemeCategory::Light);
        assert_eq!(*seen.borrow(), vec![ThemeCategory::Light]);

        drop(subscription);
        assert_eq!(probe.watcher_count(), 0);
    }

    #[test]
    fn static_probe_reports_reduced_motion_changes() {
        let probe = StaticProbe::new(None, false);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let subscription = probe
            .watch_reduced_motion(Box::new(move |reduced| sink.borrow_mut().push(*reduced)))
            .expect("static probe supports watching");

        probe.set_reduced_motion(false);
        probe.set_reduced_motion(true);
        probe.set_reduced_motion(true);
        assert_eq!(*seen.borrow(), vec![true]);
        assert!(probe.prefers_reduced_motion());

        drop(subscription);
        assert_eq!(probe.motion_watcher_count(), 0);
    }

    #[test]
    fn env_probe_cannot_watch() {
        let probe = EnvSystemProbe::new();
        assert!(probe.watch_reduced_motion(Box::new(|_| {})).is_none());
        assert!(probe.watch_color_scheme(Box::new(|_| {})).is_none());
    }
}
