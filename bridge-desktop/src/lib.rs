//! Desktop and server implementations of the host bridges.
//!
//! ```ignore
//! use bridge_desktop::{ReqwestHttpClient, SqliteKeyValueStore, TokioFileSystem};
//!
//! let store = SqliteKeyValueStore::new("data/library.db".into()).await?;
//! let fs = TokioFileSystem::new();
//! let http = ReqwestHttpClient::new()?.with_attempts(5);
//! ```

mod filesystem;
mod http;
mod key_value;
mod memory;

pub use filesystem::TokioFileSystem;
pub use http::ReqwestHttpClient;
pub use key_value::SqliteKeyValueStore;
pub use memory::MemoryKeyValueStore;
