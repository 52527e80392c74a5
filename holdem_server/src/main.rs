use axum::routing::{get, post};
use axum::Router;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod api;
mod error;
mod protocol;
mod settings;
mod state;
mod ws;

use state::{AppState, SharedState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let state = SharedState::new(AppState::new(&settings));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&settings.server.bind_addr).await?;
    info!(
        addr = %listener.local_addr()?,
        max_players = settings.table.max_players,
        min_buy_in = settings.table.min_buy_in,
        "server listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}

fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/game/table/{table_id}", post(api::create_table))
        .route("/api/game/table/{table_id}/join", post(api::join_table))
        .route("/api/game/table/{table_id}/start", post(api::start_game))
        .route("/api/game/table/{table_id}/action", post(api::submit_action))
        .route("/api/game/table/{table_id}/next-street", post(api::next_street))
        .route("/api/game/table/{table_id}/status", get(api::table_status))
        .route("/ws/table/{table_id}", get(ws::table_socket))
        .with_state(state)
}
