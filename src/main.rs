use tracing_subscriber::EnvFilter;

use draftban::config::{self, ServerConfig};
use draftban::room::Room;
use draftban::session::{self, RoomHandle};
use draftban::store::NicknameStore;

async fn shutdown_signal(room: RoomHandle) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutting down, saving seated names");
    room.shutdown().await;
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env();
    config::init(&config).expect("Failed to create data directory");

    let store = NicknameStore::load(&config.data_path);
    tracing::info!("Loaded {} known nicknames", store.names().len());

    let room = session::spawn_room(Room::new(), store, config.continuity_interval);
    let app = draftban::build_app(&config, room.clone());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .expect("Failed to bind");

    tracing::info!("Map ban server running on port {}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(room))
        .await
        .expect("Server error");
}
