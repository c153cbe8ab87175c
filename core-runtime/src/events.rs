//! # Event Bus System
//!
//! Provides an event-driven channel for the music library using
//! `tokio::sync::broadcast`. Components publish what changed (a song was
//! liked, a playlist was deleted, a search narrowed the lists) and any number
//! of subscribers (a view refresher, the server log, tests) react to it.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, LibraryEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let event_bus = EventBus::new(100);
//! let mut subscriber = event_bus.subscribe();
//!
//! event_bus
//!     .emit(CoreEvent::Library(LibraryEvent::SongLikeToggled {
//!         song_id: 3,
//!         liked: true,
//!     }))
//!     .ok();
//!
//! let received = subscriber.recv().await.unwrap();
//! assert_eq!(received.description(), "Song like toggled");
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber was too slow and missed `n`
//!   events. Non-fatal.
//! - **`RecvError::Closed`**: all senders have been dropped.
//!
//! Emitting with no subscribers returns an error; publishers ignore it with
//! `.ok()` because nobody listening is a normal state.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum published through the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Library content and browsing events
    Library(LibraryEvent),
    /// Client storage lifecycle events
    Storage(StorageEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Library(e) => e.description(),
            CoreEvent::Storage(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Storage(StorageEvent::Reset) => EventSeverity::Warning,
            CoreEvent::Library(LibraryEvent::PlaylistCreated { .. })
            | CoreEvent::Library(LibraryEvent::PlaylistUpdated { .. })
            | CoreEvent::Library(LibraryEvent::PlaylistDeleted { .. })
            | CoreEvent::Storage(StorageEvent::Seeded { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Library Events
// ============================================================================

/// Events related to library content changes and browsing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum LibraryEvent {
    /// Stored collections were loaded and rendered.
    Loaded {
        playlist_count: usize,
        song_count: usize,
    },
    /// A song's liked flag was inverted and persisted.
    SongLikeToggled {
        song_id: u32,
        /// The new value of the flag.
        liked: bool,
    },
    /// A search narrowed (or restored) the rendered lists.
    SearchPerformed {
        query: String,
        exact: bool,
        playlist_matches: usize,
        song_matches: usize,
    },
    /// New playlist created.
    PlaylistCreated { playlist_id: String, name: String },
    /// Playlist name, description, thumbnail or songs replaced.
    PlaylistUpdated { playlist_id: String, name: String },
    /// Playlist removed.
    PlaylistDeleted { playlist_id: String },
}

impl LibraryEvent {
    fn description(&self) -> &str {
        match self {
            LibraryEvent::Loaded { .. } => "Library loaded",
            LibraryEvent::SongLikeToggled { .. } => "Song like toggled",
            LibraryEvent::SearchPerformed { .. } => "Search performed",
            LibraryEvent::PlaylistCreated { .. } => "Playlist created",
            LibraryEvent::PlaylistUpdated { .. } => "Playlist updated",
            LibraryEvent::PlaylistDeleted { .. } => "Playlist deleted",
        }
    }
}

// ============================================================================
// Storage Events
// ============================================================================

/// Events emitted by the client-side storage manager.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum StorageEvent {
    /// Seed data was written for keys that were absent.
    Seeded { keys: Vec<String> },
    /// All stored collections were removed.
    Reset,
}

impl StorageEvent {
    fn description(&self) -> &str {
        match self {
            StorageEvent::Seeded { .. } => "Storage seeded",
            StorageEvent::Reset => "Storage reset",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Cloning the bus yields another publisher for the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// Subscribers falling more than `capacity` events behind receive
    /// `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// if there are none.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// Subscriber that skips events rejected by a predicate.
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` are returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn liked(song_id: u32) -> CoreEvent {
        CoreEvent::Library(LibraryEvent::SongLikeToggled {
            song_id,
            liked: true,
        })
    }

    #[tokio::test]
    async fn test_event_bus_subscription() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);

        let _sub1 = bus.subscribe();
        let _sub2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_event_emission_no_subscribers() {
        let bus = EventBus::new(10);
        assert!(bus.emit(liked(1)).is_err());
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        assert_eq!(bus.emit(liked(4)).unwrap(), 2);

        assert_eq!(sub1.recv().await.unwrap(), liked(4));
        assert_eq!(sub2.recv().await.unwrap(), liked(4));
    }

    #[tokio::test]
    async fn test_event_stream_with_filter() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe())
            .filter(|event| matches!(event, CoreEvent::Storage(_)));

        bus.emit(liked(1)).ok();
        bus.emit(CoreEvent::Storage(StorageEvent::Reset)).ok();

        bus.emit(liked(2)).ok();
        bus.emit(CoreEvent::Storage(StorageEvent::Seeded {
            keys: vec!["songs".to_string()],
        }))
        .ok();

        assert_eq!(
            stream.recv().await.unwrap(),
            CoreEvent::Storage(StorageEvent::Reset)
        );
        assert!(matches!(
            stream.recv().await.unwrap(),
            CoreEvent::Storage(StorageEvent::Seeded { .. })
        ));
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe();

        for id in 0..5 {
            bus.emit(liked(id)).ok();
        }

        assert!(matches!(sub.recv().await, Err(RecvError::Lagged(_))));
    }

    #[test]
    fn test_severity_and_description() {
        let created = CoreEvent::Library(LibraryEvent::PlaylistCreated {
            playlist_id: "p1".to_string(),
            name: "Focus".to_string(),
        });
        assert_eq!(created.severity(), EventSeverity::Info);
        assert_eq!(created.description(), "Playlist created");

        let updated = CoreEvent::Library(LibraryEvent::PlaylistUpdated {
            playlist_id: "p1".to_string(),
            name: "Deep Focus".to_string(),
        });
        assert_eq!(updated.severity(), EventSeverity::Info);

        assert_eq!(
            CoreEvent::Storage(StorageEvent::Reset).severity(),
            EventSeverity::Warning
        );
        assert_eq!(liked(1).severity(), EventSeverity::Debug);
    }

    #[test]
    fn test_event_serialization_shape() {
        let json = serde_json::to_value(liked(7)).unwrap();
        assert_eq!(json["type"], "Library");
        assert_eq!(json["payload"]["event"], "SongLikeToggled");
        assert_eq!(json["payload"]["song_id"], 7);
    }
}
