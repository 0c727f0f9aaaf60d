pub mod config;
pub mod error;
pub mod room;
pub mod session;
pub mod store;
pub mod types;
pub mod ws;

use askama::Template;
use axum::Router;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use tower_http::services::ServeDir;

use config::ServerConfig;
use room::MAP_NAMES;
use session::RoomHandle;

#[derive(Clone)]
pub struct AppState {
    pub room: RoomHandle,
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    maps: &'static [&'static str],
}

async fn index_page() -> Response {
    match (IndexTemplate { maps: &MAP_NAMES }).render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Failed to render index: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Build the router: the client page, its static assets and the event socket.
pub fn build_app(config: &ServerConfig, room: RoomHandle) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/ws", get(ws::ws_handler))
        .nest_service("/static", ServeDir::new(&config.static_path))
        .with_state(AppState { room })
}
