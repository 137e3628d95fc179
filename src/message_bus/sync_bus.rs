//! Synchronous message bus implementation
//!
//! Subscribers are either channel consumers (std::sync::mpsc) or callbacks.
//! Delivery happens outside the registry lock, so a callback may itself
//! subscribe or publish.

use super::error_handling::{MessageBusError, MessageBusResult};
use super::events::{Event, EventType};
use log::{debug, error};
use std::any::Any;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Consumer handle for receiving events of a specific type
pub struct Consumer<T: EventType> {
    receiver: Receiver<T>,
}

impl<T: EventType> Consumer<T> {
    /// Try to receive an event without blocking
    pub fn try_recv(&mut self) -> Result<T, mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive an event, blocking until one is available
    pub fn recv(&mut self) -> Result<T, mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Get an iterator over received events
    pub fn iter(&mut self) -> mpsc::Iter<'_, T> {
        self.receiver.iter()
    }

    /// Drain all events that are already queued
    pub fn drain(&mut self) -> Vec<T> {
        self.receiver.try_iter().collect()
    }

    /// Try to receive an event with a timeout
    pub fn recv_timeout(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<T, mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}

/// Handle of a registered subscriber, used to unsubscribe callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler<T> = Arc<dyn Fn(&T) + Send + Sync>;

enum Subscriber<T> {
    Channel(Sender<T>),
    Callback(Handler<T>),
}

impl<T> Clone for Subscriber<T> {
    fn clone(&self) -> Self {
        match self {
            Subscriber::Channel(sender) => Subscriber::Channel(sender.clone()),
            Subscriber::Callback(handler) => Subscriber::Callback(Arc::clone(handler)),
        }
    }
}

struct Registration {
    id: SubscriptionId,
    // Holds a `Subscriber<T>` for the event type it is filed under
    subscriber: Box<dyn Any + Send>,
}

/// Internal registry for managing event subscribers
#[derive(Default)]
struct SubscriberRegistry {
    subscribers: HashMap<&'static str, Vec<Registration>>,
}

impl SubscriberRegistry {
    fn add_subscriber<T: EventType>(&mut self, id: SubscriptionId, subscriber: Subscriber<T>) {
        self.subscribers
            .entry(T::type_id())
            .or_default()
            .push(Registration {
                id,
                subscriber: Box::new(subscriber),
            });
    }

    fn get_subscribers<T: EventType>(&self) -> Vec<(SubscriptionId, Subscriber<T>)> {
        self.subscribers
            .get(T::type_id())
            .map(|registrations| {
                registrations
                    .iter()
                    .filter_map(|r| {
                        r.subscriber
                            .downcast_ref::<Subscriber<T>>()
                            .map(|s| (r.id, s.clone()))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn remove(&mut self, ids: &[SubscriptionId]) -> usize {
        let mut removed = 0;
        for registrations in self.subscribers.values_mut() {
            let before = registrations.len();
            registrations.retain(|r| !ids.contains(&r.id));
            removed += before - registrations.len();
        }
        removed
    }
}

/// Main synchronous message bus for event-driven communication
pub struct MessageBus {
    registry: Arc<Mutex<SubscriberRegistry>>,
    next_id: AtomicU64,
}

impl MessageBus {
    /// Create a new message bus instance
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(SubscriberRegistry::default())),
            next_id: AtomicU64::new(1),
        }
    }

    fn registry(&self) -> MutexGuard<'_, SubscriberRegistry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Subscribe to events of a specific type
    /// Returns a Consumer that can be used to receive events
    pub fn subscribe<T: EventType>(&self) -> Consumer<T> {
        let (sender, receiver) = mpsc::channel();
        let id = self.next_id();
        self.registry().add_subscriber(id, Subscriber::Channel(sender));
        Consumer { receiver }
    }

    /// Register a callback invoked synchronously for every event of type `T`
    pub fn subscribe_fn<T, F>(&self, handler: F) -> SubscriptionId
    where
        T: EventType,
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.registry()
            .add_subscriber::<T>(id, Subscriber::Callback(Arc::new(handler)));
        id
    }

    /// Remove a subscription; returns false if it was already gone
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.registry().remove(&[id]) > 0
    }

    /// Publish an event to all subscribers of that event type
    ///
    /// Every live subscriber receives the event, in registration order. A
    /// panicking callback is logged and skipped. Consumers whose receiving
    /// end was dropped are removed and reported as a send failure.
    pub fn publish<T: EventType>(&self, event: T) -> MessageBusResult<()> {
        let subscribers = self.registry().get_subscribers::<T>();
        if subscribers.is_empty() {
            // No subscribers for this event type - this is not an error
            return Ok(());
        }

        let total_subscribers = subscribers.len();
        let mut disconnected = Vec::new();
        for (id, subscriber) in subscribers {
            match subscriber {
                Subscriber::Channel(sender) => {
                    if sender.send(event.clone()).is_err() {
                        disconnected.push(id);
                    }
                }
                Subscriber::Callback(handler) => {
                    if catch_unwind(AssertUnwindSafe(|| handler(&event))).is_err() {
                        error!("Subscriber to {} panicked while handling event", T::type_id());
                    }
                }
            }
        }

        if disconnected.is_empty() {
            return Ok(());
        }
        let pruned = self.registry().remove(&disconnected);
        debug!("Pruned {} disconnected {} consumers", pruned, T::type_id());
        Err(MessageBusError::SendFailed {
            reason: format!(
                "{} of {} subscribers failed to receive event",
                disconnected.len(),
                total_subscribers
            ),
        })
    }

    /// Convenience method to publish a unified Event
    pub fn publish_event(&self, event: Event) -> MessageBusResult<()> {
        match event {
            Event::SortingChanged(e) => self.publish(e),
            Event::FeatureHidden(e) => self.publish(e),
            Event::FeatureUnhidden(e) => self.publish(e),
            Event::FilterChanged(e) => self.publish(e),
            Event::ViewInvalidated(e) => self.publish(e),
        }
    }

    /// Get the number of subscribers for a given event type
    pub fn subscriber_count<T: EventType>(&self) -> usize {
        self.registry().get_subscribers::<T>().len()
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}
