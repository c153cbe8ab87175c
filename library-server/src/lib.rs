//! HTTP surface of the music library.
//!
//! The binary in `main.rs` parses the command line, installs logging and
//! serves [`create_router`]; integration tests drive the same router in
//! process.

pub mod error;
pub mod events;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use events::spawn_event_log;
pub use routes::create_router;
pub use state::AppState;
