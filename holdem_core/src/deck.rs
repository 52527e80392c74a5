use crate::card::{Card, Rank, Suit};
use crate::error::{GameError, GameResult};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Builds the 52 distinct cards in suit-major order.
fn full_deck() -> Vec<Card> {
    let mut cards = Vec::with_capacity(52);
    for suit in Suit::ALL {
        for rank in Rank::ALL {
            cards.push(Card::new(rank, suit));
        }
    }
    cards
}

/// A deck owned by exactly one table. Cards leave the deck when drawn, so a
/// card can never be dealt twice within one hand.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
    rng: StdRng,
}

impl Deck {
    /// A full, shuffled deck seeded from the operating system.
    pub fn new() -> Deck {
        Deck::from_rng(StdRng::from_os_rng())
    }

    /// A full, shuffled deck whose order is reproducible for a given seed.
    pub fn with_seed(seed: u64) -> Deck {
        Deck::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Deck {
        let mut deck = Deck { cards: full_deck(), rng };
        deck.shuffle();
        deck
    }

    /// Re-randomizes the order of the cards still in the deck.
    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut self.rng);
    }

    /// Puts every card back and shuffles, ready for a fresh hand.
    pub fn reset(&mut self) {
        self.cards = full_deck();
        self.shuffle();
    }

    /// Removes and returns the top card.
    pub fn draw(&mut self) -> GameResult<Card> {
        self.cards.pop().ok_or(GameError::DeckExhausted)
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }
}

impl Default for Deck {
    fn default() -> Self {
        Deck::new()
    }
}
