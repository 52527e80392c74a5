use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use holdem_core::TableId;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::perform_action;
use crate::error::ApiError;
use crate::protocol::{ActionRequest, ProtocolError, ServerMessage};
use crate::state::SharedState;

/// `GET /ws/table/{table_id}`. Unknown tables are refused before the upgrade.
pub async fn table_socket(
    ws: WebSocketUpgrade,
    State(state): State<SharedState>,
    Path(table_id): Path<TableId>,
) -> Result<impl IntoResponse, ApiError> {
    state.game.get_table(&table_id)?;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, table_id)))
}

async fn handle_socket(socket: WebSocket, state: SharedState, table_id: TableId) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(state.channel_capacity());
    let connection_id = Uuid::new_v4();

    let writer = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let payload = match serde_json::to_string(&msg) {
                Ok(payload) => payload,
                Err(err) => {
                    warn!(%err, "failed to encode outbound message");
                    continue;
                }
            };
            if sender.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    state.subscribe(&table_id, connection_id, tx.clone());
    info!(table = %table_id, %connection_id, "observer connected");

    if let Ok(snapshot) = state.game.get_table(&table_id) {
        reply(&tx, &table_id, ServerMessage::TableSnapshot(snapshot)).await;
    }

    while let Some(Ok(msg)) = receiver.next().await {
        let request = match msg {
            Message::Text(text) => ActionRequest::from_json(text.as_str()),
            Message::Binary(bytes) => ActionRequest::decode(&bytes),
            Message::Close(_) => break,
            _ => continue,
        };
        handle_request(&state, &table_id, &tx, request).await;
    }

    state.unsubscribe(&table_id, connection_id);
    writer.abort();
    info!(table = %table_id, %connection_id, "observer disconnected");
}

/// Applies one decoded frame. Failures go back to the sender only;
/// successes are broadcast as a fresh snapshot.
async fn handle_request(
    state: &SharedState,
    table_id: &str,
    tx: &mpsc::Sender<ServerMessage>,
    request: Result<ActionRequest, ProtocolError>,
) {
    let result = request
        .map_err(ApiError::from)
        .and_then(|request| {
            debug!(table = %table_id, player = %request.player_id, action = ?request.action, "action received");
            perform_action(state, table_id, request)
        });

    match result {
        Ok(()) => state.publish_snapshot(table_id).await,
        Err(err) => {
            debug!(table = %table_id, error = %err, "action rejected");
            let message = match &err {
                ApiError::Game(err) => ServerMessage::from(err),
                ApiError::Protocol(err) => ServerMessage::from(err),
            };
            reply(tx, table_id, message).await;
        }
    }
}

/// Queues a message for this connection only.
async fn reply(tx: &mpsc::Sender<ServerMessage>, table_id: &str, message: ServerMessage) -> bool {
    let delivered = tx.send(message).await.is_ok();
    if !delivered {
        debug!(table = %table_id, "connection writer gone, reply dropped");
    }
    delivered
}
