//! # Texas Hold'em table engine
//!
//! Rules for a multiplayer hold'em table: card and deck model, seven-card
//! hand evaluation, the betting ledger that moves chips between a player and
//! the pot, and the table state machine that walks a hand from pre-flop to
//! showdown and pays the winners.
//!
//! [`GameService`] is the entry point. It keeps tables in a concurrent map
//! and serializes every mutation of a table behind that table's own lock.
//! Transports (HTTP, WebSocket, wire codecs) live outside this crate.

mod betting;
mod card;
mod deck;
mod error;
mod logic;
mod service;
mod state;

pub use betting::apply_action;
pub use card::*;
pub use deck::Deck;
pub use error::*;
pub use logic::{split_pot, MIN_PLAYERS};
pub use service::GameService;
pub use state::*;
