use crate::state::{Chips, GameRound, PlayerId, TableId};
use thiserror::Error;

/// How a failure should be treated by whoever called into the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller asked for something the rules forbid. State is untouched.
    Validation,
    /// The table is in a state that correct operation never reaches.
    State,
    /// Chips were about to leave the system. State was rolled back.
    Integrity,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("table {0} does not exist")]
    TableNotFound(TableId),
    #[error("player {0} is not seated at this table")]
    PlayerNotFound(PlayerId),
    #[error("table {0} already exists")]
    TableAlreadyExists(TableId),
    #[error("table is full ({max} seats)")]
    TableFull { max: usize },
    #[error("player {0} is already seated")]
    DuplicatePlayer(PlayerId),
    #[error("buy-in of {chips} is below the minimum of {minimum}")]
    BelowMinBuyIn { chips: Chips, minimum: Chips },
    #[error("{seated} players seated, at least {required} needed to start")]
    NotEnoughPlayers { seated: usize, required: usize },
    #[error("player {0} has already folded")]
    PlayerFolded(PlayerId),
    #[error("insufficient chips: requested {requested}, available {available}")]
    InsufficientChips { requested: Chips, available: Chips },
    #[error("chip amount exceeds what a table can hold")]
    ChipOverflow,
    #[error("deck is exhausted")]
    DeckExhausted,
    #[error("hand evaluation needs at least 5 cards, got {given}")]
    InsufficientCards { given: usize },
    #[error("no active players left for showdown")]
    NoActivePlayers,
    #[error("table cannot advance from {0:?}")]
    UnexpectedRound(GameRound),
    #[error(
        "chip integrity violated: player debited {debited}, pot credited {credited} (rolled back: {rolled_back})"
    )]
    IntegrityViolation {
        debited: Chips,
        credited: Chips,
        rolled_back: bool,
    },
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::NoActivePlayers | GameError::UnexpectedRound(_) => ErrorKind::State,
            GameError::IntegrityViolation { .. } => ErrorKind::Integrity,
            GameError::TableNotFound(_)
            | GameError::PlayerNotFound(_)
            | GameError::TableAlreadyExists(_)
            | GameError::TableFull { .. }
            | GameError::DuplicatePlayer(_)
            | GameError::BelowMinBuyIn { .. }
            | GameError::NotEnoughPlayers { .. }
            | GameError::PlayerFolded(_)
            | GameError::InsufficientChips { .. }
            | GameError::ChipOverflow
            | GameError::DeckExhausted
            | GameError::InsufficientCards { .. } => ErrorKind::Validation,
        }
    }

    /// Machine-readable code for transports.
    pub fn code(&self) -> &'static str {
        match self {
            GameError::TableNotFound(_) => "table_not_found",
            GameError::PlayerNotFound(_) => "player_not_found",
            GameError::TableAlreadyExists(_) => "table_already_exists",
            GameError::TableFull { .. } => "table_full",
            GameError::DuplicatePlayer(_) => "duplicate_player",
            GameError::BelowMinBuyIn { .. } => "below_min_buy_in",
            GameError::NotEnoughPlayers { .. } => "not_enough_players",
            GameError::PlayerFolded(_) => "player_folded",
            GameError::InsufficientChips { .. } => "insufficient_chips",
            GameError::ChipOverflow => "chip_overflow",
            GameError::DeckExhausted => "deck_exhausted",
            GameError::InsufficientCards { .. } => "insufficient_cards",
            GameError::NoActivePlayers => "no_active_players",
            GameError::UnexpectedRound(_) => "unexpected_round",
            GameError::IntegrityViolation { .. } => "integrity_violation",
        }
    }
}

pub type GameResult<T> = Result<T, GameError>;
