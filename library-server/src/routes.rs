//! JSON routes over the songs and playlists managers.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch};
use axum::{Json, Router};
use core_library::thumbnail::THUMBNAIL_URL_PREFIX;
use core_library::{search, Playlist, PlaylistDraft, SearchResults, Song};
use core_service::CoreService;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Builds the application router, including the static thumbnail route.
///
/// Request bodies are capped at `max_upload_bytes`, since playlist thumbnails
/// travel inline as base64 data URIs.
pub fn create_router(core: &CoreService) -> Router {
    let thumbnails = ServeDir::new(core.config().assets_dir.clone());

    Router::new()
        .route("/", get(root))
        .route("/api/songs", get(list_songs))
        .route("/api/songs/:id", get(get_song))
        .route("/api/songs/:id/like", patch(toggle_like))
        .route("/api/playlists", get(list_playlists).post(create_playlist))
        .route(
            "/api/playlists/:id",
            get(get_playlist)
                .put(update_playlist)
                .delete(delete_playlist),
        )
        .route("/api/search", get(search_library))
        .nest_service(&format!("/{}", THUMBNAIL_URL_PREFIX), thumbnails)
        .layer(DefaultBodyLimit::max(core.config().max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState::new(core))
}

async fn root() -> &'static str {
    "Music Library API"
}

async fn list_songs(State(state): State<AppState>) -> ApiResult<Json<Vec<Song>>> {
    let songs = state.songs.get_all_songs().await?;
    tracing::debug!("Returning {} songs", songs.len());
    Ok(Json(songs))
}

// Malformed ids answer 400 with the JSON error body
fn parse_song_id(raw: &str) -> ApiResult<u32> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid song id '{}'", raw)))
}

async fn get_song(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Song>> {
    state
        .songs
        .get_song_by_id(parse_song_id(&id)?)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Song"))
}

#[derive(Debug, Serialize)]
struct LikeResponse {
    liked: bool,
}

async fn toggle_like(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<LikeResponse>> {
    match state.songs.update_song_like(parse_song_id(&id)?).await? {
        Some(liked) => Ok(Json(LikeResponse { liked })),
        None => Err(ApiError::NotFound("Song")),
    }
}

async fn list_playlists(State(state): State<AppState>) -> ApiResult<Json<Vec<Playlist>>> {
    Ok(Json(state.playlists.get_all_playlists().await?))
}

async fn get_playlist(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Playlist>> {
    state
        .playlists
        .get_playlist_by_id(&id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Playlist"))
}

async fn create_playlist(
    State(state): State<AppState>,
    Json(draft): Json<PlaylistDraft>,
) -> ApiResult<impl IntoResponse> {
    let playlist = state.playlists.add_playlist(draft).await?;
    Ok((StatusCode::CREATED, Json(playlist)))
}

async fn update_playlist(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<PlaylistDraft>,
) -> ApiResult<Json<Playlist>> {
    state
        .playlists
        .update_playlist(&id, draft)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Playlist"))
}

async fn delete_playlist(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if state.playlists.delete_playlist(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Playlist"))
    }
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    search_query: String,
    #[serde(default)]
    exact: bool,
}

async fn search_library(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<SearchResults>> {
    let playlists = state.playlists.get_all_playlists().await?;
    let songs = state.songs.get_all_songs().await?;
    Ok(Json(search(&params.search_query, params.exact, &playlists, &songs)))
}
