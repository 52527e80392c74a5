//! REST surface under `/api/game/table/{table_id}`.
//!
//! Every mutating call answers with the resulting table snapshot and pushes
//! it to the table's WebSocket observers.

use axum::extract::{Path, Query, State};
use axum::Json;
use holdem_core::{ActionType, Chips, PlayerId, StreetOutcome, TableId, TableSnapshot};
use serde::Deserialize;
use tracing::info;

use crate::error::ApiError;
use crate::protocol::{ActionRequest, ServerMessage};
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinParams {
    pub player_id: PlayerId,
    pub player_name: String,
    pub chips: Chips,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionParams {
    pub player_id: PlayerId,
    pub action: ActionType,
    #[serde(default)]
    pub amount: i64,
}

impl From<ActionParams> for ActionRequest {
    fn from(params: ActionParams) -> Self {
        ActionRequest {
            player_id: params.player_id,
            action: params.action,
            amount: params.amount,
        }
    }
}

pub async fn create_table(
    State(state): State<SharedState>,
    Path(table_id): Path<TableId>,
) -> Result<Json<TableSnapshot>, ApiError> {
    let snapshot = state.game.create_table(&table_id)?;
    Ok(Json(snapshot))
}

pub async fn join_table(
    State(state): State<SharedState>,
    Path(table_id): Path<TableId>,
    Query(params): Query<JoinParams>,
) -> Result<Json<TableSnapshot>, ApiError> {
    state
        .game
        .join_player(&table_id, &params.player_id, &params.player_name, params.chips)?;
    info!(table = %table_id, player = %params.player_id, "player seated");
    updated(&state, &table_id).await
}

pub async fn start_game(
    State(state): State<SharedState>,
    Path(table_id): Path<TableId>,
) -> Result<Json<TableSnapshot>, ApiError> {
    state.game.start_game(&table_id)?;
    updated(&state, &table_id).await
}

pub async fn submit_action(
    State(state): State<SharedState>,
    Path(table_id): Path<TableId>,
    Query(params): Query<ActionParams>,
) -> Result<Json<TableSnapshot>, ApiError> {
    perform_action(&state, &table_id, ActionRequest::from(params))?;
    updated(&state, &table_id).await
}

pub async fn next_street(
    State(state): State<SharedState>,
    Path(table_id): Path<TableId>,
) -> Result<Json<StreetOutcome>, ApiError> {
    let outcome = state.game.next_street(&table_id)?;
    state.publish(&table_id, ServerMessage::from(outcome.clone())).await;
    state.publish_snapshot(&table_id).await;
    Ok(Json(outcome))
}

pub async fn table_status(
    State(state): State<SharedState>,
    Path(table_id): Path<TableId>,
) -> Result<Json<TableSnapshot>, ApiError> {
    Ok(Json(state.game.get_table(&table_id)?))
}

/// Validates and applies one action. Shared with the WebSocket path.
pub fn perform_action(state: &SharedState, table_id: &str, request: ActionRequest) -> Result<(), ApiError> {
    let amount = request.chips()?;
    state
        .game
        .submit_action(table_id, &request.player_id, request.action, amount)?;
    Ok(())
}

async fn updated(state: &SharedState, table_id: &str) -> Result<Json<TableSnapshot>, ApiError> {
    let snapshot = state.game.get_table(table_id)?;
    state
        .publish(table_id, ServerMessage::TableSnapshot(snapshot.clone()))
        .await;
    Ok(Json(snapshot))
}
