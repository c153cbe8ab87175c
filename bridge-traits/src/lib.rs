//! # Host Bridge Traits
//!
//! Capabilities the music library core needs from its host, expressed as
//! `Send + Sync` async traits so one implementation can be shared behind an
//! `Arc` across axum handlers and tasks.
//!
//! | Trait | Used for | Desktop implementation |
//! |-------|----------|------------------------|
//! | [`KeyValueStore`](storage::KeyValueStore) | client store (`songs`, `playlists` keys) | `SqliteKeyValueStore`, `MemoryKeyValueStore` |
//! | [`FileSystemAccess`](storage::FileSystemAccess) | JSON documents and thumbnails | `TokioFileSystem` |
//! | [`HttpClient`](http::HttpClient) | remote playlist API | `ReqwestHttpClient` |
//! | [`LoggerSink`](log::LoggerSink) | mirroring `tracing` events to the host | [`ConsoleLogger`](log::ConsoleLogger) |
//!
//! Every operation fails with [`BridgeError`](error::BridgeError);
//! implementations keep the native context (path, key, URL) in the message.

pub mod error;
pub mod http;
pub mod log;
pub mod storage;

pub use error::BridgeError;

pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use log::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use storage::{FileSystemAccess, KeyValueStore};
