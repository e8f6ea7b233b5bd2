use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::infrastructure::error::WidgetError;
use crate::messaging::events::{BusEvent, Channel};

/// Listener callback registered on a channel.
pub type Listener = Rc<dyn Fn(&BusEvent) -> Result<(), WidgetError>>;

/// Identity of a bus participant. A dispatch never reaches listeners
/// registered under the sender's own identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

struct Entry {
    key: u64,
    subscriber: SubscriberId,
    channel: Channel,
    listener: Listener,
    /// Cleared on removal; dispatch snapshots check it before each call
    alive: Rc<Cell<bool>>,
}

#[derive(Default)]
struct Registry {
    next_subscriber: u64,
    next_key: u64,
    entries: Vec<Entry>,
}

/// Synchronous publish/subscribe bus with sender exclusion.
///
/// One bus is created per page and handed to every component that needs
/// it. Listeners run in subscription order on the caller's stack.
pub struct EventBus {
    registry: Rc<RefCell<Registry>>,
}

/// Result of a single dispatch.
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Listeners that were invoked, failed ones included
    pub delivered: usize,

    /// Errors returned by listeners. A failing listener does not stop the
    /// remaining ones from being notified.
    pub failures: Vec<WidgetError>,
}

impl DispatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Handle that keeps a listener registered.
///
/// Dropping the handle removes the listener, so a component that owns its
/// subscriptions releases them when it is torn down.
#[must_use = "dropping a Subscription unsubscribes the listener"]
pub struct Subscription {
    registry: Weak<RefCell<Registry>>,
    key: u64,
    channel: Channel,
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry::default())),
        }
    }

    /// Allocate a fresh subscriber identity
    pub fn register(&self) -> SubscriberId {
        let mut registry = self.registry.borrow_mut();
        registry.next_subscriber += 1;
        SubscriberId(registry.next_subscriber)
    }

    /// Register `listener` for `channel` on behalf of `subscriber`.
    ///
    /// Subscribing twice registers two listeners, and both fire.
    pub fn subscribe<F>(&self, subscriber: SubscriberId, channel: Channel, listener: F) -> Subscription
    where
        F: Fn(&BusEvent) -> Result<(), WidgetError> + 'static,
    {
        let mut registry = self.registry.borrow_mut();
        registry.next_key += 1;
        let key = registry.next_key;
        registry.entries.push(Entry {
            key,
            subscriber,
            channel,
            listener: Rc::new(listener),
            alive: Rc::new(Cell::new(true)),
        });

        tracing::trace!(channel = %channel, subscriber = subscriber.0, key, "listener subscribed");

        Subscription {
            registry: Rc::downgrade(&self.registry),
            key,
            channel,
        }
    }

    /// Invoke every listener on the event's channel except the sender's own.
    ///
    /// The listener list is snapshotted first, so listeners may subscribe,
    /// unsubscribe or dispatch again. Listeners removed by an earlier listener
    /// of the same dispatch are skipped. Nested dispatch on the same channel is
    /// not guarded and can recurse.
    pub fn dispatch(&self, sender: SubscriberId, event: &BusEvent) -> DispatchReport {
        let channel = event.channel();
        let targets: Vec<(u64, Rc<Cell<bool>>, Listener)> = self
            .registry
            .borrow()
            .entries
            .iter()
            .filter(|entry| entry.channel == channel && entry.subscriber != sender)
            .map(|entry| (entry.key, entry.alive.clone(), entry.listener.clone()))
            .collect();

        let mut report = DispatchReport::default();
        for (key, alive, listener) in targets {
            if !alive.get() {
                continue;
            }
            report.delivered += 1;
            if let Err(e) = listener(event) {
                tracing::warn!(channel = %channel, key, error = %e, "listener failed");
                report.failures.push(e);
            }
        }

        tracing::debug!(
            channel = %channel,
            sender = sender.0,
            delivered = report.delivered,
            failed = report.failures.len(),
            "dispatched event"
        );
        report
    }

    /// Number of listeners currently registered on `channel`
    pub fn subscriber_count(&self, channel: Channel) -> usize {
        self.registry
            .borrow()
            .entries
            .iter()
            .filter(|entry| entry.channel == channel)
            .count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Subscription {
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Whether the listener is still registered on a live bus
    pub fn is_active(&self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let active = registry.borrow().entries.iter().any(|entry| entry.key == self.key);
        active
    }

    /// Remove the listener now instead of at drop time.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        // Removed listeners are dropped only after the registry borrow ends:
        // a listener may own further subscriptions whose drop re-enters here.
        let removed: Vec<Entry> = {
            let Ok(mut registry) = registry.try_borrow_mut() else {
                tracing::error!(channel = %self.channel, key = self.key, "bus busy, listener left registered");
                return;
            };
            let entries = std::mem::take(&mut registry.entries);
            let (removed, kept): (Vec<Entry>, Vec<Entry>) =
                entries.into_iter().partition(|entry| entry.key == self.key);
            registry.entries = kept;
            removed
        };
        for entry in &removed {
            entry.alive.set(false);
        }
        tracing::trace!(channel = %self.channel, key = self.key, "listener unsubscribed");
        drop(removed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internationalization::Language;
    use std::cell::Cell;

    fn change_lang(lang: Language) -> BusEvent {
        BusEvent::ChangeLang(lang)
    }

    #[test]
    fn test_sender_is_excluded() {
        let bus = EventBus::new();
        let a = bus.register();
        let b = bus.register();
        let a_hits = Rc::new(Cell::new(0));
        let b_hits = Rc::new(Cell::new(0));

        let hits = a_hits.clone();
        let _sa = bus.subscribe(a, Channel::ChangeLang, move |_: &BusEvent| {
            hits.set(hits.get() + 1);
            Ok(())
        });
        let hits = b_hits.clone();
        let _sb = bus.subscribe(b, Channel::ChangeLang, move |_: &BusEvent| {
            hits.set(hits.get() + 1);
            Ok(())
        });

        let report = bus.dispatch(a, &change_lang(Language::English));
        assert_eq!(report.delivered, 1);
        assert_eq!(a_hits.get(), 0);
        assert_eq!(b_hits.get(), 1);
    }

    #[test]
    fn test_dispatch_without_subscribers_is_noop() {
        let bus = EventBus::new();
        let sender = bus.register();
        let report = bus.dispatch(sender, &change_lang(Language::Russian));
        assert_eq!(report.delivered, 0);
        assert!(report.is_clean());
    }

    #[test]
    fn test_duplicate_subscriptions_both_fire_in_order() {
        let bus = EventBus::new();
        let sender = bus.register();
        let listener = bus.register();
        let order = Rc::new(RefCell::new(Vec::new()));

        let log = order.clone();
        let _first = bus.subscribe(listener, Channel::ChangeLang, move |_: &BusEvent| {
            log.borrow_mut().push("first");
            Ok(())
        });
        let log = order.clone();
        let _second = bus.subscribe(listener, Channel::ChangeLang, move |_: &BusEvent| {
            log.borrow_mut().push("second");
            Ok(())
        });

        bus.dispatch(sender, &change_lang(Language::English));
        assert_eq!(*order.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn test_payload_reaches_listener() {
        let bus = EventBus::new();
        let sender = bus.register();
        let listener = bus.register();
        let seen = Rc::new(Cell::new(None));

        let sink = seen.clone();
        let _sub = bus.subscribe(listener, Channel::ChangeLang, move |event: &BusEvent| {
            let BusEvent::ChangeLang(lang) = event;
            sink.set(Some(*lang));
            Ok(())
        });

        bus.dispatch(sender, &change_lang(Language::English));
        assert_eq!(seen.get(), Some(Language::English));
    }

    #[test]
    fn test_failing_listener_is_isolated() {
        let bus = EventBus::new();
        let sender = bus.register();
        let listener = bus.register();
        let later_hits = Rc::new(Cell::new(0));

        let _failing = bus.subscribe(listener, Channel::ChangeLang, |_: &BusEvent| {
            Err(WidgetError::listener("changeLang", "boom"))
        });
        let hits = later_hits.clone();
        let _later = bus.subscribe(listener, Channel::ChangeLang, move |_: &BusEvent| {
            hits.set(hits.get() + 1);
            Ok(())
        });

        let report = bus.dispatch(sender, &change_lang(Language::English));
        assert_eq!(report.delivered, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(later_hits.get(), 1);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let bus = EventBus::new();
        let listener = bus.register();
        let sub = bus.subscribe(listener, Channel::ChangeLang, |_: &BusEvent| Ok(()));
        assert!(sub.is_active());
        assert_eq!(bus.subscriber_count(Channel::ChangeLang), 1);

        sub.unsubscribe();
        assert_eq!(bus.subscriber_count(Channel::ChangeLang), 0);
    }

    #[test]
    fn test_dropping_listener_releases_subscriptions_it_owns() {
        let bus = EventBus::new();
        let outer_id = bus.register();
        let inner_id = bus.register();
        let inner = bus.subscribe(inner_id, Channel::ChangeLang, |_: &BusEvent| Ok(()));
        let outer = bus.subscribe(outer_id, Channel::ChangeLang, move |_: &BusEvent| {
            let _owned = &inner;
            Ok(())
        });
        assert_eq!(bus.subscriber_count(Channel::ChangeLang), 2);

        drop(outer);
        assert_eq!(bus.subscriber_count(Channel::ChangeLang), 0);
    }

    #[test]
    fn test_dispatch_skips_every_listener_removed_mid_dispatch() {
        let bus = Rc::new(EventBus::new());
        let sender = bus.register();
        let listener = bus.register();
        let later_hits = Rc::new(Cell::new(0));
        let slots: Rc<RefCell<Vec<Subscription>>> = Rc::new(RefCell::new(Vec::new()));

        let victims = slots.clone();
        let _first = bus.subscribe(listener, Channel::ChangeLang, move |_: &BusEvent| {
            victims.borrow_mut().clear();
            Ok(())
        });
        for _ in 0..50 {
            let hits = later_hits.clone();
            let sub = bus.subscribe(listener, Channel::ChangeLang, move |_: &BusEvent| {
                hits.set(hits.get() + 1);
                Ok(())
            });
            slots.borrow_mut().push(sub);
        }

        let report = bus.dispatch(sender, &change_lang(Language::English));
        assert_eq!(report.delivered, 1);
        assert_eq!(later_hits.get(), 0);
        assert_eq!(bus.subscriber_count(Channel::ChangeLang), 1);
    }

    #[test]
    fn test_subscription_outliving_bus() {
        let sub = {
            let bus = EventBus::new();
            let listener = bus.register();
            bus.subscribe(listener, Channel::ChangeLang, |_: &BusEvent| Ok(()))
        };
        assert!(!sub.is_active());
        drop(sub);
    }

    #[test]
    fn test_listener_can_unsubscribe_later_listener() {
        let bus = Rc::new(EventBus::new());
        let sender = bus.register();
        let listener = bus.register();
        let later_hits = Rc::new(Cell::new(0));
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let victim = slot.clone();
        let _first = bus.subscribe(listener, Channel::ChangeLang, move |_: &BusEvent| {
            victim.borrow_mut().take();
            Ok(())
        });
        let hits = later_hits.clone();
        *slot.borrow_mut() = Some(bus.subscribe(listener, Channel::ChangeLang, move |_: &BusEvent| {
            hits.set(hits.get() + 1);
            Ok(())
        }));

        let report = bus.dispatch(sender, &change_lang(Language::English));
        assert_eq!(report.delivered, 1);
        assert_eq!(later_hits.get(), 0);
    }

    #[test]
    fn test_listener_can_dispatch_from_inside() {
        let bus = Rc::new(EventBus::new());
        let outer_sender = bus.register();
        let relay = bus.register();
        let sink_id = bus.register();
        let sink_hits = Rc::new(Cell::new(0));

        let relay_bus = Rc::downgrade(&bus);
        let _relay = bus.subscribe(relay, Channel::ChangeLang, move |event: &BusEvent| {
            if let (Some(bus), BusEvent::ChangeLang(Language::English)) = (relay_bus.upgrade(), event) {
                bus.dispatch(relay, &BusEvent::ChangeLang(Language::Russian));
            }
            Ok(())
        });
        let hits = sink_hits.clone();
        let _sink = bus.subscribe(sink_id, Channel::ChangeLang, move |_: &BusEvent| {
            hits.set(hits.get() + 1);
            Ok(())
        });

        bus.dispatch(outer_sender, &change_lang(Language::English));
        // once from the nested dispatch, once from the outer one
        assert_eq!(sink_hits.get(), 2);
    }
}
