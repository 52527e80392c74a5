use crate::card::{Card, HandScore};
use crate::deck::Deck;
use crate::error::{GameError, GameResult};
use serde::{Deserialize, Serialize};

pub type TableId = String;
pub type PlayerId = String;
/// Chip amounts are opaque non-negative integers.
pub type Chips = u64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameRound {
    PreFlop,
    Flop,
    Turn,
    River,
    Showdown,
}

impl GameRound {
    /// The round that follows this one. `Showdown` has no successor.
    pub fn next(self) -> Option<GameRound> {
        match self {
            GameRound::PreFlop => Some(GameRound::Flop),
            GameRound::Flop => Some(GameRound::Turn),
            GameRound::Turn => Some(GameRound::River),
            GameRound::River => Some(GameRound::Showdown),
            GameRound::Showdown => None,
        }
    }

    /// Community cards revealed on entering this round.
    pub fn cards_to_deal(self) -> usize {
        match self {
            GameRound::Flop => 3,
            GameRound::Turn | GameRound::River => 1,
            GameRound::PreFlop | GameRound::Showdown => 0,
        }
    }
}

/// What a player does on their turn. The declaration order is the wire
/// ordinal used by binary transports.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    Check,
    Call,
    Bet,
    Raise,
    Fold,
    AllIn,
}

impl ActionType {
    pub const ALL: [ActionType; 6] = [
        ActionType::Check,
        ActionType::Call,
        ActionType::Bet,
        ActionType::Raise,
        ActionType::Fold,
        ActionType::AllIn,
    ];

    /// Whether the action transfers chips from the player to the pot.
    pub fn moves_chips(self) -> bool {
        match self {
            ActionType::Bet | ActionType::Raise | ActionType::Call | ActionType::AllIn => true,
            ActionType::Check | ActionType::Fold => false,
        }
    }
}

/// Limits applied when seating players.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TableConfig {
    pub max_players: usize,
    pub min_buy_in: Chips,
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            max_players: 6,
            min_buy_in: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    chips: Chips,
    current_bet: Chips,
    folded: bool,
    hole_cards: Vec<Card>,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>, chips: Chips) -> Player {
        Player {
            id: id.into(),
            name: name.into(),
            chips,
            current_bet: 0,
            folded: false,
            hole_cards: Vec::with_capacity(2),
        }
    }

    pub fn chips(&self) -> Chips {
        self.chips
    }

    /// Chips committed during the current hand.
    pub fn current_bet(&self) -> Chips {
        self.current_bet
    }

    pub fn is_folded(&self) -> bool {
        self.folded
    }

    pub fn hole_cards(&self) -> &[Card] {
        &self.hole_cards
    }

    /// The only way chips leave a player's stack.
    pub fn bet_chips(&mut self, amount: Chips) -> GameResult<()> {
        if amount > self.chips {
            return Err(GameError::InsufficientChips {
                requested: amount,
                available: self.chips,
            });
        }
        let current_bet = self.current_bet.checked_add(amount).ok_or(GameError::ChipOverflow)?;
        self.chips -= amount;
        self.current_bet = current_bet;
        Ok(())
    }

    pub fn fold(&mut self) {
        self.folded = true;
    }

    pub fn win_chips(&mut self, amount: Chips) -> GameResult<()> {
        self.chips = self.chips.checked_add(amount).ok_or(GameError::ChipOverflow)?;
        Ok(())
    }

    pub fn receive_cards(&mut self, first: Card, second: Card) {
        self.hole_cards.clear();
        self.hole_cards.push(first);
        self.hole_cards.push(second);
    }

    /// Clears everything that belongs to a single hand.
    pub fn reset_for_hand(&mut self) {
        self.current_bet = 0;
        self.folded = false;
        self.hole_cards.clear();
    }

    pub(crate) fn ledger_snapshot(&self) -> (Chips, Chips) {
        (self.chips, self.current_bet)
    }

    pub(crate) fn restore_ledger(&mut self, (chips, current_bet): (Chips, Chips)) {
        self.chips = chips;
        self.current_bet = current_bet;
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pot {
    total_amount: Chips,
}

impl Pot {
    pub fn new() -> Pot {
        Pot::default()
    }

    pub fn total_amount(&self) -> Chips {
        self.total_amount
    }

    pub fn add(&mut self, amount: Chips) -> GameResult<()> {
        self.total_amount = self.total_amount.checked_add(amount).ok_or(GameError::ChipOverflow)?;
        Ok(())
    }

    /// Empties the pot and hands back what it held.
    pub fn take(&mut self) -> Chips {
        std::mem::take(&mut self.total_amount)
    }

    pub fn reset(&mut self) {
        self.total_amount = 0;
    }

    pub(crate) fn restore(&mut self, total_amount: Chips) {
        self.total_amount = total_amount;
    }
}

/// One player's outcome at showdown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShowdownResult {
    pub player_id: PlayerId,
    pub score: HandScore,
    pub hole_cards: Vec<Card>,
    pub winnings: Chips,
}

/// What a call to advance the street did.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum StreetOutcome {
    /// Community cards revealed on entering `round`.
    Dealt { round: GameRound, cards: Vec<Card> },
    /// The hand was settled and the table reset to a fresh pre-flop.
    Showdown { results: Vec<ShowdownResult> },
}

/// A game table: seats, board, deck and pot for one room.
#[derive(Debug)]
pub struct Table {
    pub(crate) id: TableId,
    pub(crate) config: TableConfig,
    /// Seating order is join order.
    pub(crate) players: Vec<Player>,
    pub(crate) community_cards: Vec<Card>,
    pub(crate) deck: Deck,
    pub(crate) pot: Pot,
    pub(crate) round: GameRound,
    pub(crate) hand_number: u64,
    pub(crate) last_showdown: Option<Vec<ShowdownResult>>,
}

impl Table {
    pub fn new(id: impl Into<TableId>, config: TableConfig) -> Table {
        Table::with_deck(id, config, Deck::new())
    }

    pub fn with_deck(id: impl Into<TableId>, config: TableConfig, deck: Deck) -> Table {
        Table {
            id: id.into(),
            config,
            players: Vec::new(),
            community_cards: Vec::with_capacity(5),
            deck,
            pot: Pot::new(),
            round: GameRound::PreFlop,
            hand_number: 0,
            last_showdown: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn community_cards(&self) -> &[Card] {
        &self.community_cards
    }

    pub fn pot(&self) -> &Pot {
        &self.pot
    }

    pub fn round(&self) -> GameRound {
        self.round
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn player(&self, player_id: &str) -> GameResult<&Player> {
        self.players
            .iter()
            .find(|p| p.id == player_id)
            .ok_or_else(|| GameError::PlayerNotFound(player_id.to_string()))
    }

    /// Seats a player at the end of the seating order.
    ///
    /// # Errors
    /// `TableFull`, `DuplicatePlayer`, `BelowMinBuyIn` or `ChipOverflow`
    /// (the table total would no longer fit in `Chips`), checked in that
    /// order. Nothing changes on failure.
    pub fn add_player(&mut self, player: Player) -> GameResult<()> {
        if self.players.len() >= self.config.max_players {
            return Err(GameError::TableFull { max: self.config.max_players });
        }
        if self.players.iter().any(|p| p.id == player.id) {
            return Err(GameError::DuplicatePlayer(player.id));
        }
        if player.chips() < self.config.min_buy_in {
            return Err(GameError::BelowMinBuyIn {
                chips: player.chips(),
                minimum: self.config.min_buy_in,
            });
        }
        // every later stack, bet and pot is bounded by this total
        self.total_chips()
            .checked_add(player.chips())
            .ok_or(GameError::ChipOverflow)?;
        self.players.push(player);
        Ok(())
    }

    /// Sum of every stack plus the pot. Constant across a hand, and never
    /// above `Chips::MAX` since `add_player` refuses buy-ins past it.
    pub fn total_chips(&self) -> Chips {
        self.players.iter().map(Player::chips).sum::<Chips>() + self.pot.total_amount()
    }

    /// Read model handed to transports.
    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            id: self.id.clone(),
            round: self.round,
            community_cards: self.community_cards.clone(),
            pot: self.pot.total_amount(),
            players: self.players.iter().map(PlayerSnapshot::from).collect(),
            hand_number: self.hand_number,
            last_showdown: self.last_showdown.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub chips: Chips,
    pub current_bet: Chips,
    pub folded: bool,
    pub hole_cards: Vec<Card>,
}

impl From<&Player> for PlayerSnapshot {
    fn from(player: &Player) -> Self {
        PlayerSnapshot {
            id: player.id.clone(),
            name: player.name.clone(),
            chips: player.chips,
            current_bet: player.current_bet,
            folded: player.folded,
            hole_cards: player.hole_cards.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TableSnapshot {
    pub id: TableId,
    pub round: GameRound,
    pub community_cards: Vec<Card>,
    pub pot: Chips,
    pub players: Vec<PlayerSnapshot>,
    pub hand_number: u64,
    pub last_showdown: Option<Vec<ShowdownResult>>,
}

impl TableSnapshot {
    pub fn total_chips(&self) -> Chips {
        self.players.iter().map(|p| p.chips).sum::<Chips>() + self.pot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::with_deck("t1", TableConfig::default(), Deck::with_seed(11))
    }

    #[test]
    fn test_round_sequence() {
        let mut round = GameRound::PreFlop;
        let mut seen = vec![round];
        while let Some(next) = round.next() {
            seen.push(next);
            round = next;
        }
        assert_eq!(seen, vec![
            GameRound::PreFlop,
            GameRound::Flop,
            GameRound::Turn,
            GameRound::River,
            GameRound::Showdown,
        ]);
    }

    #[test]
    fn test_bet_chips_rejects_overdraw() {
        let mut player = Player::new("p1", "Alice", 500);
        assert_eq!(
            player.bet_chips(501),
            Err(GameError::InsufficientChips { requested: 501, available: 500 })
        );
        assert_eq!(player.chips(), 500);

        player.bet_chips(500).unwrap();
        assert_eq!(player.chips(), 0);
        assert_eq!(player.current_bet(), 500);
    }

    #[test]
    fn test_reset_for_hand() {
        let mut player = Player::new("p1", "Alice", 1000);
        player.bet_chips(100).unwrap();
        player.fold();
        player.reset_for_hand();
        assert_eq!(player.current_bet(), 0);
        assert!(!player.is_folded());
        assert!(player.hole_cards().is_empty());
        assert_eq!(player.chips(), 900);
    }

    #[test]
    fn test_pot_take_empties() {
        let mut pot = Pot::new();
        pot.add(300).unwrap();
        pot.add(200).unwrap();
        assert_eq!(pot.take(), 500);
        assert_eq!(pot.total_amount(), 0);
    }

    #[test]
    fn test_seventh_player_is_rejected() {
        let mut table = table();
        for i in 0..6 {
            table.add_player(Player::new(format!("p{i}"), "x", 1000)).unwrap();
        }
        assert_eq!(
            table.add_player(Player::new("p6", "x", 1000)),
            Err(GameError::TableFull { max: 6 })
        );
        assert_eq!(table.players().len(), 6);
    }

    #[test]
    fn test_duplicate_and_buy_in_rejected() {
        let mut table = table();
        table.add_player(Player::new("p1", "Alice", 1000)).unwrap();
        assert_eq!(
            table.add_player(Player::new("p1", "Again", 5000)),
            Err(GameError::DuplicatePlayer("p1".to_string()))
        );
        assert_eq!(
            table.add_player(Player::new("p2", "Bob", 999)),
            Err(GameError::BelowMinBuyIn { chips: 999, minimum: 1000 })
        );
        assert_eq!(table.players().len(), 1);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut table = table();
        table.add_player(Player::new("p1", "Alice", 1200)).unwrap();
        let json = serde_json::to_value(table.snapshot()).unwrap();
        assert_eq!(json["round"], "PRE_FLOP");
        assert_eq!(json["players"][0]["chips"], 1200);
        assert_eq!(json["pot"], 0);
    }

    #[test]
    fn test_action_type_wire_names() {
        assert_eq!(serde_json::to_string(&ActionType::AllIn).unwrap(), "\"ALL_IN\"");
        let parsed: ActionType = serde_json::from_str("\"RAISE\"").unwrap();
        assert_eq!(parsed, ActionType::Raise);
    }

    #[test]
    fn test_buy_in_capped_by_table_total() {
        let mut table = table();
        table.add_player(Player::new("whale", "Whale", Chips::MAX)).unwrap();
        assert_eq!(
            table.add_player(Player::new("p2", "Two", 1000)),
            Err(GameError::ChipOverflow)
        );
        assert_eq!(table.players().len(), 1);
        assert_eq!(table.total_chips(), Chips::MAX);
    }

    #[test]
    fn test_checked_chip_arithmetic() {
        let mut player = Player::new("p", "P", Chips::MAX);
        assert_eq!(player.win_chips(1), Err(GameError::ChipOverflow));
        assert_eq!(player.chips(), Chips::MAX);

        let mut pot = Pot::new();
        pot.add(Chips::MAX).unwrap();
        assert_eq!(pot.add(1), Err(GameError::ChipOverflow));
        assert_eq!(pot.total_amount(), Chips::MAX);
    }
}
