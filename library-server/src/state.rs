use core_library::{PlaylistsManager, SongsManager};
use core_service::CoreService;
use std::sync::Arc;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub songs: Arc<SongsManager>,
    pub playlists: Arc<PlaylistsManager>,
}

impl AppState {
    pub fn new(core: &CoreService) -> Self {
        Self {
            songs: core.songs(),
            playlists: core.playlists(),
        }
    }
}
