//! # void_event - Synchronous Event System
//!
//! Observer lists for editor-side notifications:
//! - Synchronous delivery: `publish` returns after every handler ran
//! - Priority-ordered handlers (ties keep subscription order)
//! - Handlers receive a read-only context alongside the event, so an owner
//!   can hand observers a view of its committed state
//! - [`EventChannel`] for observers that prefer to drain events later

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

/// Handler priority
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Low = 0,
    #[default]
    Normal = 1,
    High = 2,
    Critical = 3,
}

/// Subscriber ID
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(pub u64);

/// Event handler receiving the publisher's context and the event
pub type EventHandler<E, C> = Box<dyn FnMut(&C, &E)>;

struct Subscriber<E: 'static, C: ?Sized + 'static> {
    id: SubscriberId,
    priority: Priority,
    handler: EventHandler<E, C>,
}

/// Ordered list of handlers for one event type.
///
/// `C` is the context handed to every handler. The owner usually passes
/// itself, which lets handlers query state without holding a reference
/// between notifications.
pub struct EventBus<E: 'static, C: ?Sized + 'static = ()> {
    subscribers: Vec<Subscriber<E, C>>,
    next_subscriber_id: u64,
    published: u64,
}

impl<E: 'static, C: ?Sized + 'static> EventBus<E, C> {
    /// Create an empty bus
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            next_subscriber_id: 1,
            published: 0,
        }
    }

    /// Subscribe with normal priority
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriberId
    where
        F: FnMut(&C, &E) + 'static,
    {
        self.subscribe_with_priority(handler, Priority::Normal)
    }

    /// Subscribe with priority
    pub fn subscribe_with_priority<F>(&mut self, handler: F, priority: Priority) -> SubscriberId
    where
        F: FnMut(&C, &E) + 'static,
    {
        let id = SubscriberId(self.next_subscriber_id);
        self.next_subscriber_id += 1;

        self.subscribers.push(Subscriber {
            id,
            priority,
            handler: Box::new(handler),
        });

        // Stable sort keeps subscription order among equal priorities
        self.subscribers.sort_by(|a, b| b.priority.cmp(&a.priority));

        id
    }

    /// Unsubscribe. Returns false if the id was unknown.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    /// Deliver an event to every handler, highest priority first
    pub fn publish(&mut self, ctx: &C, event: &E) {
        for subscriber in &mut self.subscribers {
            (subscriber.handler)(ctx, event);
        }
        self.published += 1;
    }

    /// Number of registered handlers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Total events published on this bus
    pub fn published_count(&self) -> u64 {
        self.published
    }

    /// Remove every handler
    pub fn clear(&mut self) {
        self.subscribers.clear();
    }
}

impl<E: Clone + 'static, C: ?Sized + 'static> EventBus<E, C> {
    /// Subscribe a handler that copies every event into `channel`.
    pub fn forward_to(&mut self, channel: Arc<EventChannel<E>>) -> SubscriberId {
        self.subscribe(move |_: &C, event: &E| channel.send(event.clone()))
    }
}

impl<E: 'static, C: ?Sized + 'static> Default for EventBus<E, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static, C: ?Sized + 'static> std::fmt::Debug for EventBus<E, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .field("published", &self.published)
            .finish()
    }
}

/// Queue for single-type events, drained by the consumer
pub struct EventChannel<E> {
    queue: Mutex<VecDeque<E>>,
}

impl<E> EventChannel<E> {
    /// Create a new channel
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
        }
    }

    /// Send an event
    pub fn send(&self, event: E) {
        self.queue.lock().push_back(event);
    }

    /// Receive the oldest event
    pub fn receive(&self) -> Option<E> {
        self.queue.lock().pop_front()
    }

    /// Drain all events in send order
    pub fn drain(&self) -> Vec<E> {
        self.queue.lock().drain(..).collect()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Get pending count
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }
}

impl<E> Default for EventChannel<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Prelude
pub mod prelude {
    pub use crate::{EventBus, EventChannel, EventHandler, Priority, SubscriberId};
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Debug, PartialEq)]
    struct TestEvent(i32);

    #[test]
    fn test_event_bus() {
        let mut bus: EventBus<TestEvent> = EventBus::new();
        let counter = Rc::new(RefCell::new(0));
        let counter_clone = counter.clone();

        bus.subscribe(move |_, _: &TestEvent| {
            *counter_clone.borrow_mut() += 1;
        });

        bus.publish(&(), &TestEvent(42));

        assert_eq!(*counter.borrow(), 1);
        assert_eq!(bus.published_count(), 1);
    }

    #[test]
    fn test_handlers_see_context() {
        let mut bus: EventBus<TestEvent, Vec<i32>> = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();

        bus.subscribe(move |ctx: &Vec<i32>, e: &TestEvent| {
            seen_clone.borrow_mut().push(ctx.len() as i32 + e.0);
        });

        bus.publish(&vec![1, 2, 3], &TestEvent(10));
        assert_eq!(*seen.borrow(), vec![13]);
    }

    #[test]
    fn test_event_channel() {
        let channel: EventChannel<TestEvent> = EventChannel::new();

        channel.send(TestEvent(1));
        channel.send(TestEvent(2));
        channel.send(TestEvent(3));

        let events = channel.drain();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].0, 1);
        assert_eq!(events[1].0, 2);
        assert_eq!(events[2].0, 3);
        assert!(channel.is_empty());
    }

    #[test]
    fn test_forward_to_channel() {
        let mut bus: EventBus<TestEvent> = EventBus::new();
        let channel = Arc::new(EventChannel::new());
        bus.forward_to(channel.clone());

        bus.publish(&(), &TestEvent(7));
        bus.publish(&(), &TestEvent(8));

        assert_eq!(channel.drain(), vec![TestEvent(7), TestEvent(8)]);
    }

    #[test]
    fn test_priority() {
        let mut bus: EventBus<TestEvent> = EventBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let order1 = order.clone();
        let order2 = order.clone();
        let order3 = order.clone();

        bus.subscribe_with_priority(
            move |_, e: &TestEvent| order1.borrow_mut().push(("low", e.0)),
            Priority::Low,
        );
        bus.subscribe_with_priority(
            move |_, e: &TestEvent| order2.borrow_mut().push(("high", e.0)),
            Priority::High,
        );
        bus.subscribe(move |_, e: &TestEvent| order3.borrow_mut().push(("normal", e.0)));

        bus.publish(&(), &TestEvent(42));

        let received = order.borrow();
        assert_eq!(received[0].0, "high");
        assert_eq!(received[1].0, "normal");
        assert_eq!(received[2].0, "low");
    }

    #[test]
    fn test_unsubscribe() {
        let mut bus: EventBus<TestEvent> = EventBus::new();
        let id = bus.subscribe(|_, _| {});
        assert_eq!(bus.subscriber_count(), 1);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.subscriber_count(), 0);
    }
}
