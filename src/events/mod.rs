//! Observer plumbing for theme notifications.
//!
//! Listeners register a callback and get back a [`Subscription`]; dropping the
//! subscription removes the callback at once, even while an event is being
//! delivered. Delivery is synchronous and in registration order. Listeners
//! added during delivery first hear the next event, and a listener that
//! re-enters the bus is not called again for the nested event.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::registry::ThemeId;

pub const THEME_CHANGE_EVENT: &str = "themechange";

/// Broadcast whenever the active theme or the custom palette behind it changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeChange {
    pub theme_id: ThemeId,
}

type Callback<T> = Rc<RefCell<dyn FnMut(&T)>>;

struct Subscribers<T> {
    next_id: u64,
    entries: Vec<(u64, Callback<T>)>,
}

impl<T> Default for Subscribers<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<T> Subscribers<T> {
    fn remove(&mut self, id: u64) {
        self.entries.retain(|(entry_id, _)| *entry_id != id);
    }

    fn contains(&self, id: u64) -> bool {
        self.entries.iter().any(|(entry_id, _)| *entry_id == id)
    }
}

pub struct EventBus<T> {
    subscribers: Rc<RefCell<Subscribers<T>>>,
}

impl<T: 'static> EventBus<T> {
    pub fn new() -> Self {
        Self {
            subscribers: Rc::new(RefCell::new(Subscribers::default())),
        }
    }

    pub fn subscribe(&self, callback: impl FnMut(&T) + 'static) -> Subscription {
        let callback: Callback<T> = Rc::new(RefCell::new(callback));
        let id = {
            let mut subscribers = self.subscribers.borrow_mut();
            let id = subscribers.next_id;
            subscribers.next_id += 1;
            subscribers.entries.push((id, callback));
            id
        };
        tracing::trace!(id, "listener subscribed");

        let weak: Weak<RefCell<Subscribers<T>>> = Rc::downgrade(&self.subscribers);
        Subscription {
            id,
            detach: Some(Box::new(move || {
                if let Some(subscribers) = weak.upgrade() {
                    subscribers.borrow_mut().remove(id);
                }
            })),
        }
    }

    /// Delivers `event` to every current listener and returns how many ran.
    pub fn emit(&self, event: &T) -> usize {
        let snapshot: Vec<(u64, Callback<T>)> = self
            .subscribers
            .borrow()
            .entries
            .iter()
            .map(|(id, callback)| (*id, Rc::clone(callback)))
            .collect();

        let mut delivered = 0;
        for (id, callback) in snapshot {
            if !self.subscribers.borrow().contains(id) {
                continue;
            }
            let Ok(mut listener) = callback.try_borrow_mut() else {
                tracing::trace!(id, "skipping re-entrant listener");
                continue;
            };
            (&mut *listener)(event);
            delivered += 1;
        }
        delivered
    }

    pub fn listener_count(&self) -> usize {
        self.subscribers.borrow().entries.len()
    }
}

impl<T: 'static> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for EventBus<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.subscribers.borrow().entries.len())
            .finish()
    }
}

/// Keeps a listener registered until dropped.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    detach: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn unsubscribe(mut self) {
        self.detach_now();
    }

    fn detach_now(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
            tracing::trace!(id = self.id, "listener unsubscribed");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.detach.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn emit_reaches_listeners_in_registration_order() {
        let bus = EventBus::<u32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let first = seen.clone();
        let _a = bus.subscribe(move |value| first.borrow_mut().push(("a", *value)));
        let second = seen.clone();
        let _b = bus.subscribe(move |value| second.borrow_mut().push(("b", *value)));

        assert_eq!(bus.emit(&7), 2);
        assert_eq!(*seen.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn dropping_subscription_stops_delivery() {
        let bus = EventBus::<u32>::new();
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let subscription = bus.subscribe(move |_| counter.set(counter.get() + 1));

        bus.emit(&1);
        drop(subscription);
        bus.emit(&2);

        assert_eq!(hits.get(), 1);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn subscription_outliving_bus_drops_cleanly() {
        let bus = EventBus::<u32>::new();
        let subscription = bus.subscribe(|_| {});
        drop(bus);
        subscription.unsubscribe();
    }

    #[test]
    fn listener_dropping_itself_during_emit_is_removed() {
        let bus = Rc::new(EventBus::<u32>::new());
        let held: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let hits = Rc::new(Cell::new(0));

        let held_for_listener = held.clone();
        let counter = hits.clone();
        let subscription = bus.subscribe(move |_| {
            counter.set(counter.get() + 1);
            held_for_listener.borrow_mut().take();
        });
        *held.borrow_mut() = Some(subscription);

        bus.emit(&1);
        bus.emit(&2);

        assert_eq!(hits.get(), 1);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn subscription_dropped_before_nested_emit_stays_dropped() {
        let bus = Rc::new(EventBus::<u32>::new());
        let victim_seen = Rc::new(RefCell::new(Vec::new()));
        let victim: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let bus_for_listener = bus.clone();
        let victim_for_listener = victim.clone();
        let _dropper = bus.subscribe(move |value| {
            if *value == 1 {
                victim_for_listener.borrow_mut().take();
                bus_for_listener.emit(&99);
            }
        });
        let sink = victim_seen.clone();
        *victim.borrow_mut() = Some(bus.subscribe(move |value| sink.borrow_mut().push(*value)));

        bus.emit(&1);
        bus.emit(&2);

        assert!(victim_seen.borrow().is_empty());
        assert_eq!(bus.listener_count(), 1);
    }

    #[test]
    fn subscribing_during_emit_joins_next_event() {
        let bus = Rc::new(EventBus::<u32>::new());
        let late_hits = Rc::new(Cell::new(0));
        let keep: Rc<RefCell<Vec<Subscription>>> = Rc::new(RefCell::new(Vec::new()));

        let bus_for_listener = bus.clone();
        let keep_for_listener = keep.clone();
        let late_counter = late_hits.clone();
        let _outer = bus.subscribe(move |_| {
            if keep_for_listener.borrow().is_empty() {
                let counter = late_counter.clone();
                let late = bus_for_listener.subscribe(move |_| counter.set(counter.get() + 1));
                keep_for_listener.borrow_mut().push(late);
            }
        });

        assert_eq!(bus.emit(&1), 1);
        assert_eq!(late_hits.get(), 0);
        assert_eq!(bus.emit(&2), 2);
        assert_eq!(late_hits.get(), 1);

        keep.borrow_mut().clear();
    }
}
