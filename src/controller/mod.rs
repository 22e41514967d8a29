//! Owner of the theme state.
//!
//! [`ThemeController`] ties the pure [`ThemeMachine`] to its side effects:
//! every accepted change is persisted, painted onto the [`DocumentRoot`] and,
//! where applicable, broadcast as a [`ThemeChange`].

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::AppConfig;
use crate::events::{EventBus, Subscription, ThemeChange, THEME_CHANGE_EVENT};
use crate::presentation::{
    apply_theme, inject_custom_theme, remove_custom_theme, set_reduced_motion, DocumentRoot,
};
use crate::registry::{all_themes, ThemeCategory, ThemeId, ThemeMetadata};
use crate::state::{
    CustomTheme, StateResult, ThemeEvent, ThemeMachine, ThemeState, ThemeTransition,
};
use crate::storage::{load_or_default, FileStorage, StorageResult, ThemeStorage};
use crate::system::{sample_color_scheme, EnvSystemProbe, SystemProbe};

/// Live platform subscription plus the queue its callback fills.
struct Watch<T> {
    subscription: Option<Subscription>,
    mailbox: Rc<RefCell<Vec<T>>>,
}

impl<T: Copy + 'static> Watch<T> {
    fn start(
        register: impl FnOnce(Box<dyn FnMut(&T)>) -> Option<Subscription>,
    ) -> Self {
        let mailbox = Rc::new(RefCell::new(Vec::new()));
        let sink = mailbox.clone();
        let subscription = register(Box::new(move |value: &T| sink.borrow_mut().push(*value)));
        Self {
            subscription,
            mailbox,
        }
    }

    fn is_live(&self) -> bool {
        self.subscription.is_some()
    }

    fn drain(&self) -> Vec<T> {
        std::mem::take(&mut *self.mailbox.borrow_mut())
    }
}

pub struct ThemeController {
    machine: ThemeMachine,
    storage: Box<dyn ThemeStorage>,
    probe: Box<dyn SystemProbe>,
    document: DocumentRoot,
    changes: EventBus<ThemeChange>,
    system_watch: Option<Watch<ThemeCategory>>,
    motion_watch: Option<Watch<bool>>,
}

impl ThemeController {
    /// Restores persisted state (defaults on any read failure) and paints it.
    pub fn load(storage: Box<dyn ThemeStorage>, probe: Box<dyn SystemProbe>) -> Self {
        let state = load_or_default(storage.as_ref());
        tracing::info!(
            current = %state.current,
            follow_system = state.follow_system,
            has_custom_theme = state.custom_theme.is_some(),
            "loaded theme state"
        );

        let mut controller = Self {
            machine: ThemeMachine::with_state(state),
            storage,
            probe,
            document: DocumentRoot::new(),
            changes: EventBus::new(),
            system_watch: None,
            motion_watch: None,
        };
        controller.render();

        let reduced_motion = controller.probe.prefers_reduced_motion();
        controller.reduced_motion_changed(reduced_motion);
        controller.start_motion_watch();

        if controller.follow_system() {
            controller.start_system_watch();
            let scheme = sample_color_scheme(controller.probe.as_ref());
            controller.system_scheme_changed(scheme);
        }
        controller
    }

    /// Opens the controller against the user's config directory.
    pub fn from_app_config(config: &AppConfig) -> StorageResult<Self> {
        let storage = match &config.storage_path {
            Some(path) => FileStorage::with_path(path),
            None => FileStorage::with_default_path()?,
        };
        tracing::debug!(path = %storage.path().display(), "using theme state file");
        let probe = EnvSystemProbe::with_reduce_motion_override(config.reduce_motion);
        Ok(Self::load(Box::new(storage), Box::new(probe)))
    }

    /// Fails only for `custom` while no palette is saved; nothing changes then.
    pub fn set_theme(&mut self, id: ThemeId) -> StateResult<ThemeId> {
        let event = ThemeEvent::SetTheme(id);
        self.machine.check(&event).inspect_err(|err| {
            tracing::warn!(current = %self.current(), ?err, "rejected theme selection");
        })?;
        Ok(self.apply(event, true))
    }

    /// Flips between the two fixed toggle themes.
    pub fn toggle_theme(&mut self) -> ThemeId {
        self.apply(ThemeEvent::Toggle, true)
    }

    pub fn set_follow_system(&mut self, follow: bool) -> ThemeId {
        let scheme = sample_color_scheme(self.probe.as_ref());
        let current = self.apply(ThemeEvent::SetFollowSystem { follow, scheme }, follow);
        if follow {
            self.start_system_watch();
        } else {
            self.stop_system_watch();
        }
        current
    }

    pub fn save_custom_theme(&mut self, theme: CustomTheme) -> ThemeId {
        self.apply(ThemeEvent::SaveCustomTheme(theme), true)
    }

    pub fn delete_custom_theme(&mut self) -> ThemeId {
        self.apply(ThemeEvent::DeleteCustomTheme, true)
    }

    /// OS color-scheme notification; only acted on while following the system.
    pub fn system_scheme_changed(&mut self, scheme: ThemeCategory) -> ThemeId {
        if !self.follow_system() {
            tracing::trace!(scheme = scheme.as_str(), "ignoring system scheme change");
            return self.current();
        }
        self.apply(ThemeEvent::SystemSchemeChanged(scheme), true)
    }

    /// Applies scheme and reduced-motion changes queued by the platform
    /// watches. Returns how many were handled.
    pub fn process_system_events(&mut self) -> usize {
        let motion = self
            .motion_watch
            .as_ref()
            .map(Watch::drain)
            .unwrap_or_default();
        for reduced in &motion {
            self.reduced_motion_changed(*reduced);
        }

        let schemes = self
            .system_watch
            .as_ref()
            .map(Watch::drain)
            .unwrap_or_default();
        for scheme in &schemes {
            self.system_scheme_changed(*scheme);
        }
        motion.len() + schemes.len()
    }

    pub fn reduced_motion_changed(&mut self, reduced: bool) {
        set_reduced_motion(&mut self.document, reduced);
        tracing::debug!(reduced, "updated reduced motion preference");
    }

    pub fn subscribe(&self, callback: impl FnMut(&ThemeChange) + 'static) -> Subscription {
        self.changes.subscribe(callback)
    }

    /// Drops platform subscriptions; the controller stays usable for reads.
    pub fn dispose(&mut self) {
        self.stop_system_watch();
        if self.motion_watch.take().is_some() {
            tracing::debug!("stopped watching reduced motion preference");
        }
    }

    pub fn current(&self) -> ThemeId {
        self.machine.current()
    }

    pub fn follow_system(&self) -> bool {
        self.machine.state().follow_system
    }

    pub fn custom_theme(&self) -> Option<&CustomTheme> {
        self.machine.state().custom_theme.as_ref()
    }

    pub fn state(&self) -> &ThemeState {
        self.machine.state()
    }

    pub fn is_custom_theme(&self) -> bool {
        self.current().is_custom() && self.custom_theme().is_some()
    }

    /// Custom palettes carry no category and report as not dark.
    pub fn is_dark(&self) -> bool {
        self.current()
            .metadata()
            .is_some_and(|meta| meta.category == ThemeCategory::Dark)
    }

    pub fn themes(&self) -> impl Iterator<Item = &'static ThemeMetadata> {
        all_themes()
    }

    pub fn document(&self) -> &DocumentRoot {
        &self.document
    }

    pub fn history(&self) -> &[ThemeTransition] {
        self.machine.history()
    }

    pub fn is_watching_system(&self) -> bool {
        self.system_watch.is_some()
    }

    pub fn is_watching_reduced_motion(&self) -> bool {
        self.motion_watch.is_some()
    }

    fn apply(&mut self, event: ThemeEvent, broadcast: bool) -> ThemeId {
        let palette_before = self.custom_theme().cloned();
        let transition = self.machine.commit(event);
        let palette_changed = palette_before.as_ref() != self.custom_theme();

        self.persist();
        if transition.changed() || palette_changed {
            self.render();
        }
        if broadcast {
            let change = ThemeChange {
                theme_id: transition.to,
            };
            let delivered = self.changes.emit(&change);
            tracing::debug!(
                event = THEME_CHANGE_EVENT,
                theme = %change.theme_id,
                delivered,
                "broadcast theme change"
            );
        }
        if transition.changed() {
            tracing::info!(from = %transition.from, to = %transition.to, "theme changed");
        }
        transition.to
    }

    fn persist(&self) {
        if let Err(err) = self.storage.save(self.machine.state()) {
            tracing::warn!(?err, "failed to persist theme state");
        }
    }

    fn render(&mut self) {
        let state = self.machine.state();
        apply_theme(&mut self.document, state.current);
        match &state.custom_theme {
            Some(custom) if state.current.is_custom() => {
                inject_custom_theme(&mut self.document, &custom.colors);
            }
            Some(_) => {}
            None => {
                remove_custom_theme(&mut self.document);
            }
        }
    }

    fn start_system_watch(&mut self) {
        if self.system_watch.is_some() {
            return;
        }
        let probe = self.probe.as_ref();
        let watch = Watch::start(|callback| probe.watch_color_scheme(callback));
        tracing::debug!(live = watch.is_live(), "watching system color scheme");
        self.system_watch = Some(watch);
    }

    fn stop_system_watch(&mut self) {
        if self.system_watch.take().is_some() {
            tracing::debug!("stopped watching system color scheme");
        }
    }

    fn start_motion_watch(&mut self) {
        let probe = self.probe.as_ref();
        let watch = Watch::start(|callback| probe.watch_reduced_motion(callback));
        tracing::debug!(live = watch.is_live(), "watching reduced motion preference");
        self.motion_watch = Some(watch);
    }
}

impl std::fmt::Debug for ThemeController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeController")
            .field("state", self.machine.state())
            .field("document", &self.document)
            .field("listeners", &self.changes.listener_count())
            .field("watching_system", &self.system_watch.is_some())
            .field("watching_reduced_motion", &self.motion_watch.is_some())
            .finish()
    }
}
