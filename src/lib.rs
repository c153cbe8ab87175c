//! Umbrella crate for hosts embedding the music library.
//!
//! `desktop-shims` (default) re-exports the service façade with the desktop
//! bridges; `library-only` re-exports just the domain crate.

#[cfg(feature = "desktop-shims")]
pub use core_service;

#[cfg(feature = "library-only")]
pub use core_library;
