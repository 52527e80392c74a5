//! Messages exchanged with table observers.
//!
//! Actions arrive either as JSON (`{"playerId", "action", "amount"}`) or as
//! a compact binary frame:
//!
//! ```text
//! [action ordinal: u8][amount: i64 BE][id length: u32 BE][player id: UTF-8]
//! ```
//!
//! Ordinals follow `ActionType` declaration order, CHECK = 0 through
//! ALL_IN = 5.

use holdem_core::{ActionType, Card, Chips, GameError, GameRound, PlayerId, ShowdownResult, StreetOutcome, TableSnapshot};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const HEADER_LEN: usize = 1 + 8 + 4;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("frame truncated: need {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
    #[error("frame has {0} unexpected trailing bytes")]
    TrailingBytes(usize),
    #[error("unknown action ordinal {0}")]
    UnknownAction(u8),
    #[error("amount must not be negative, got {0}")]
    NegativeAmount(i64),
    #[error("player id is not valid UTF-8")]
    InvalidUtf8,
    #[error("malformed JSON action: {0}")]
    Json(#[from] serde_json::Error),
}

/// A player's action as sent by a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub player_id: PlayerId,
    pub action: ActionType,
    #[serde(default)]
    pub amount: i64,
}

impl ActionRequest {
    pub fn from_json(text: &str) -> Result<ActionRequest, ProtocolError> {
        let request: ActionRequest = serde_json::from_str(text)?;
        request.chips()?;
        Ok(request)
    }

    /// The amount as chips. Fails on negative amounts.
    pub fn chips(&self) -> Result<Chips, ProtocolError> {
        Chips::try_from(self.amount).map_err(|_| ProtocolError::NegativeAmount(self.amount))
    }

    pub fn encode(&self) -> Vec<u8> {
        let id = self.player_id.as_bytes();
        let mut buf = Vec::with_capacity(HEADER_LEN + id.len());
        buf.push(ordinal(self.action));
        buf.extend_from_slice(&self.amount.to_be_bytes());
        buf.extend_from_slice(&(id.len() as u32).to_be_bytes());
        buf.extend_from_slice(id);
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<ActionRequest, ProtocolError> {
        if bytes.len() < HEADER_LEN {
            return Err(ProtocolError::Truncated { expected: HEADER_LEN, actual: bytes.len() });
        }
        let (header, body) = bytes.split_at(HEADER_LEN);

        let action = ActionType::ALL
            .get(usize::from(header[0]))
            .copied()
            .ok_or(ProtocolError::UnknownAction(header[0]))?;

        let mut amount = [0u8; 8];
        amount.copy_from_slice(&header[1..9]);
        let amount = i64::from_be_bytes(amount);

        let mut id_len = [0u8; 4];
        id_len.copy_from_slice(&header[9..13]);
        let id_len = u32::from_be_bytes(id_len) as usize;

        if body.len() < id_len {
            return Err(ProtocolError::Truncated {
                expected: HEADER_LEN + id_len,
                actual: bytes.len(),
            });
        }
        if body.len() > id_len {
            return Err(ProtocolError::TrailingBytes(body.len() - id_len));
        }
        let player_id = std::str::from_utf8(body)
            .map_err(|_| ProtocolError::InvalidUtf8)?
            .to_string();

        let request = ActionRequest { player_id, action, amount };
        request.chips()?;
        Ok(request)
    }
}

fn ordinal(action: ActionType) -> u8 {
    match action {
        ActionType::Check => 0,
        ActionType::Call => 1,
        ActionType::Bet => 2,
        ActionType::Raise => 3,
        ActionType::Fold => 4,
        ActionType::AllIn => 5,
    }
}

/// Server -> observer messages.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub enum ServerMessage {
    /// Full table state after any change.
    TableSnapshot(TableSnapshot),
    /// Community cards revealed by a street advance.
    CommunityCardsDealt { round: GameRound, cards: Vec<Card> },
    /// Showdown results. The table has already been reset.
    Showdown { results: Vec<ShowdownResult> },
    /// Sent only to the connection whose request failed.
    Error { code: String, message: String },
}

impl From<StreetOutcome> for ServerMessage {
    fn from(outcome: StreetOutcome) -> Self {
        match outcome {
            StreetOutcome::Dealt { round, cards } => ServerMessage::CommunityCardsDealt { round, cards },
            StreetOutcome::Showdown { results } => ServerMessage::Showdown { results },
        }
    }
}

impl From<&GameError> for ServerMessage {
    fn from(err: &GameError) -> Self {
        ServerMessage::Error {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<&ProtocolError> for ServerMessage {
    fn from(err: &ProtocolError) -> Self {
        ServerMessage::Error {
            code: "bad_request".to_string(),
            message: err.to_string(),
        }
    }
}
