//! Runtime plumbing shared by every crate of the music library: the
//! [`LibraryConfig`] builder, `tracing` setup in [`logging`] and the
//! broadcast [`EventBus`].

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{LibraryConfig, LibraryConfigBuilder};
pub use error::{Error, Result};
pub use events::{CoreEvent, EventBus, EventSeverity, EventStream, LibraryEvent, StorageEvent};
