use crate::collection::{CollectionEventCallback, CollectionEventListener};
use crate::common::NITRITE_EVENT;
use crate::errors::{ErrorKind, NitriteError, NitriteResult};
use basu::error::BasuError;
use basu::event::Event;
use basu::{EventBus, Handle, HandlerId};
use std::marker::PhantomData;
use std::sync::Arc;

pub trait EventAware {
    // NOTE: impl CollectionEventCallback cannot be used to make it object safe
    fn subscribe(&self, handler: CollectionEventListener) -> NitriteResult<Option<SubscriberRef>>;

    fn unsubscribe(&self, subscriber: SubscriberRef) -> NitriteResult<()>;
}

/// Publishes and subscribes to events in the Nitrite system.
///
/// This struct manages an event bus that allows components to register listeners
/// and receive notifications about system events. It provides both synchronous
/// event publishing and listener management.
///
/// # Responsibilities
///
/// * **Event Publishing**: Broadcasts events to all registered listeners
/// * **Listener Registration**: Registers event handlers to receive notifications
/// * **Listener Deregistration**: Removes previously registered event handlers
/// * **Listener Queries**: Checks if any listeners are currently registered
/// * **Lifecycle Management**: Closes the event bus and cleans up resources
/// * **Performance Optimization**: Fast path for no-listener scenarios
///
/// # Example
///
/// ```ignore
/// let event_bus: NitriteEventBus<E, L> = NitriteEventBus::new();
/// let listener = MyEventListener;
/// let subscriber = event_bus.register(listener)?;
/// 
/// // Publish an event
/// event_bus.publish(my_event)?;
/// 
/// // Deregister when done
/// event_bus.deregister(subscriber)?;
/// ```
#[derive(Clone)]
pub struct NitriteEventBus<E, L> {
    inner: Arc<NitriteEventBusInner<E, L>>,
}

impl<E, L> Default for NitriteEventBus<E, L>
where
    L: Handle<E> + 'static,
    E: Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E, L> NitriteEventBus<E, L>
where
    L: Handle<E> + 'static,
    E: Send + Sync,
{
    /// Creates a new event bus instance.
    pub fn new() -> Self {
        let inner = NitriteEventBusInner::new();
        NitriteEventBus {
            inner: Arc::new(inner),
        }
    }

    /// Registers an event listener with the bus.
    pub fn register(&self, listener: L) -> NitriteResult<Option<SubscriberRef>> {
        self.inner.register(listener)
    }

    /// Deregisters a previously registered event listener.
    pub fn deregister(&self, subscriber: SubscriberRef) -> NitriteResult<()> {
        self.inner.deregister(subscriber)
    }

    /// Publishes an event to all registered listeners.
    pub fn publish(&self, event: E) -> NitriteResult<()> {
        self.inner.publish(event)
    }

    /// Closes the event bus and clears all registered listeners.
    pub fn close(&self) -> NitriteResult<()> {
        self.inner.close()
    }

    /// Returns true if there are any registered listeners.
    pub fn has_listeners(&self) -> bool {
        self.inner.has_listeners()
    }
}

pub struct SubscriberRef {
    pub(crate) inner: HandlerId,
}

impl SubscriberRef {
    pub fn new(inner: HandlerId) -> Self {
        SubscriberRef { inner }
    }
}

/// Inner implementation of the event bus.
struct NitriteEventBusInner<E, L> {
    event_bus: EventBus<E>,
    phantom_data: PhantomData<L>,
}

impl<E, L> NitriteEventBusInner<E, L>
where
    L: Handle<E> + 'static,
    E: Send + Sync,
{
    fn new() -> Self {
        let event_bus = EventBus::new();
        NitriteEventBusInner {
            event_bus,
            phantom_data: PhantomData,
        }
    }

    pub fn register(&self, listener: L) -> NitriteResult<Option<SubscriberRef>> {
        let subscriber = self.event_bus.subscribe(NITRITE_EVENT, Box::new(listener));
        match subscriber {
            Ok(subscriber) => Ok(Some(SubscriberRef::new(subscriber))),
            Err(e) => Err(Self::nitrite_error(e)),
        }
    }

    #[inline]
    pub fn deregister(&self, subscriber: SubscriberRef) -> NitriteResult<()> {
        match self.event_bus.unsubscribe(NITRITE_EVENT, &subscriber.inner) {
            Ok(_) => Ok(()),
            Err(e) => Err(Self::nitrite_error(e)),
        }
    }

    #[inline]
    pub fn publish(&self, event: E) -> NitriteResult<()> {
        // Fast path: check if there are listeners before creating event
        let handler_count = match self.event_bus.get_handler_count(NITRITE_EVENT) {
            Ok(count) => count,
            Err(e) => {
                // If event type not found, no listeners - early return
                if matches!(e, BasuError::EventTypeNotFOUND) {
                    return Ok(());
                }
                return Err(Self::nitrite_error(e));
            }
        };

        // Only create event if there are listeners
        if handler_count == 0 {
            return Ok(());
        }

        let basu_event = Event::new(event);
        match self.event_bus.publish(NITRITE_EVENT, &basu_event) {
            Ok(_) => Ok(()),
            Err(e) => Err(Self::nitrite_error(e)),
        }
    }

    #[inline]
    pub fn close(&self) -> NitriteResult<()> {
        let result = self.event_bus.clear();
        match result {
            Ok(_) => Ok(()),
            Err(e) => Err(Self::nitrite_error(e)),
        }
    }

    #[inline]
    pub fn has_listeners(&self) -> bool {
        match self.event_bus.get_handler_count(NITRITE_EVENT) {
            Ok(count) => count > 0,
            Err(e) => {
                if matches!(e, BasuError::EventTypeNotFOUND) {
                    false
                } else {
                    log::warn!("Failed to check listeners: {}, defaulting to false", e);
                    false
                }
            }
        }
    }

    #[inline]
    pub fn nitrite_error(e: BasuError) -> NitriteError {
        match e {
            BasuError::EventTypeNotFOUND => {
                NitriteError::new(
                    "Event bus error: the requested event type is not registered. Register a handler for the event type before publishing",
                    ErrorKind::EventError
                )
            }
            BasuError::MutexPoisoned => NitriteError::new(
                "Event bus error: internal mutex poisoned - the event bus may be in an inconsistent state",
                ErrorKind::EventError
            ),
            BasuError::HandlerError(e) => {
                let error_message = e.source()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "Unknown error in event handler".to_string());
                NitriteError::new(
                    &format!("Event handler error: {}", error_message),
                    ErrorKind::EventError
                )
            }
        }
    }
}
