// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use common::{error::LocationError, options::LocationOptions, position::PositionSample};
use strum_macros::EnumDiscriminants;
use tokio::sync::broadcast::{self, error::SendError};

/// Represents a high-level event in the system.
///
/// Each `Event` wraps an [`EventKind`], which defines the actual type
/// and data carried by the event.
///
/// This structure is designed to be passed through an [`EventBus`]
/// between asynchronous modules.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    /// The inner event type and associated data.
    pub kind: EventKind,
}

impl Event {
    /// Returns the type of the event without its payload.
    pub fn event_type(&self) -> EventKindType {
        EventKindType::from(&self.kind)
    }
}

/// A thread-safe, reference-counted pointer to a [`PositionSample`].
///
/// This type alias wraps a [`PositionSample`] inside an [`Arc`](std::sync::Arc),
/// allowing multiple consumers to share ownership of the same sample without
/// copying it.
pub type PositionSamplePtr = std::sync::Arc<PositionSample>;

/// Enumerates the different kinds of events that can be emitted
/// and transmitted via the [`EventBus`].
///
/// [`EventKindType`] is the payload-free discriminant of every variant.
#[derive(Clone, Debug, PartialEq, EnumDiscriminants)]
#[strum_discriminants(name(EventKindType), derive(Hash))]
pub enum EventKind {
    /// Indicates that a module shall terminate.
    QuitEvent,

    /// The best known position changed.
    ///
    /// Emitted by a location session each time a sample passed the arbitration.
    PositionChangedEvent(PositionSamplePtr),

    /// A location session failed to start or lost its provider.
    LocationErrorEvent(LocationError),

    /// Requests a location module to start tracking with the given options.
    StartTrackingRequestEvent(LocationOptions),

    /// Requests a location module to stop tracking.
    StopTrackingRequestEvent,

    /// Requests the best cached position of all enabled providers.
    LastKnownPositionRequestEvent,

    /// Answer to [`EventKind::LastKnownPositionRequestEvent`].
    ///
    /// `None` if no provider has a cached position.
    LastKnownPositionResponseEvent(Option<PositionSamplePtr>),
}

/// Returns a reference to the payload of `$kind` if it is the variant `$variant`.
///
/// ```
/// use module_core::{EventKind, payload_ref};
///
/// let kind = EventKind::LastKnownPositionResponseEvent(None);
/// assert_eq!(payload_ref!(kind, EventKind::LastKnownPositionResponseEvent), Some(&None));
/// assert!(payload_ref!(kind, EventKind::PositionChangedEvent).is_none());
/// ```
#[macro_export]
macro_rules! payload_ref {
    ($kind:expr, $variant:path) => {
        match &$kind {
            $variant(payload) => Some(payload),
            _ => None,
        }
    };
}

/// A simple asynchronous event bus for publishing and subscribing to [`Event`]s.
///
/// The event bus uses a [`tokio::sync::broadcast::channel`] under the hood,
/// allowing multiple receivers to listen for the same stream of events.
///
/// Each published event is cloned and distributed to all active subscribers.
/// If no subscribers exist at the time of publication, the event is discarded silently.
pub struct EventBus {
    /// The broadcast sender used internally to distribute events.
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a new [`EventBus`] with a fixed buffer capacity of 100 messages.
    ///
    /// When the buffer is full, the oldest messages are dropped automatically
    /// as new ones are published.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(100);
        EventBus { sender }
    }

    /// Subscribes to the event bus and returns a [`tokio::sync::broadcast::Receiver`].
    ///
    /// The returned receiver will receive all future events published after the
    /// subscription is created.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    /// Publishes an [`Event`] to all active subscribers.
    ///
    /// If no subscribers exist, the event is discarded silently.
    pub fn publish(&self, event: &Event) {
        let _ = self.sender.send(event.clone());
    }

    /// Returns a clone of the sender, e.g. to publish from a signal handler.
    pub fn sender(&self) -> broadcast::Sender<Event> {
        self.sender.clone()
    }

    /// Creates a [`ModuleCtx`] bound to this [`EventBus`].
    pub fn context(&self) -> ModuleCtx {
        ModuleCtx::new(self)
    }
}

/// Provides a default instance of [`EventBus`].
impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Defines the common interface for an asynchronous module
/// that can be executed and communicate via the [`EventBus`].
#[async_trait::async_trait]
pub trait Module {
    /// Runs the module asynchronously until completion.
    ///
    /// This function typically contains the module's main event loop,
    /// reacting to messages received through the [`ModuleCtx`].
    async fn run(&mut self) -> Result<(), ()>;
}

/// Provides a module-scoped context for interacting with the [`EventBus`].
///
/// Each `ModuleCtx` owns both a sender and a receiver, allowing the module
/// to both publish and listen for events concurrently.
pub struct ModuleCtx {
    /// The broadcast sender used to publish events.
    pub sender: broadcast::Sender<Event>,

    /// The broadcast receiver used to listen for events.
    pub receiver: broadcast::Receiver<Event>,
}

impl ModuleCtx {
    /// Constructs a new [`ModuleCtx`] from the given [`EventBus`].
    pub fn new(event_bus: &EventBus) -> Self {
        ModuleCtx {
            sender: event_bus.sender.clone(),
            receiver: event_bus.subscribe(),
        }
    }

    /// Publishes an event of `kind` on the bus.
    ///
    /// Fails if nobody is subscribed to the bus.
    pub fn publish_event(&self, kind: EventKind) -> Result<usize, SendError<Event>> {
        self.sender.send(Event { kind })
    }
}

pub mod test_helper;
