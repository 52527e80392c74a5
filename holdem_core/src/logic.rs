use crate::betting;
use crate::card::{evaluate_hand, Card, HandScore};
use crate::error::{GameError, GameResult};
use crate::state::*;
use tracing::{debug, info};

/// Players needed before a hand can be dealt.
pub const MIN_PLAYERS: usize = 2;

const DECK_SIZE: usize = 52;

// --- Table state machine ---

impl Table {
    /// Starts a new hand.
    ///
    /// Puts every card back in the deck and reshuffles, clears the board and
    /// every player's per-hand state, then deals two hole cards to each
    /// seated player in seating order. Chips still sitting in the pot from an
    /// unfinished hand go back to whoever committed them.
    ///
    /// # Errors
    /// `NotEnoughPlayers` with fewer than two seated players.
    pub fn start_hand(&mut self) -> GameResult<()> {
        if self.players.len() < MIN_PLAYERS {
            return Err(GameError::NotEnoughPlayers {
                seated: self.players.len(),
                required: MIN_PLAYERS,
            });
        }
        if self.players.len() * 2 + 5 > DECK_SIZE {
            return Err(GameError::DeckExhausted);
        }

        self.refund_pot()?;
        self.prepare_new_hand();

        for player in self.players.iter_mut() {
            let first = self.deck.draw()?;
            let second = self.deck.draw()?;
            player.receive_cards(first, second);
        }
        self.hand_number += 1;

        info!(table = %self.id, hand = self.hand_number, players = self.players.len(), "hand started");
        Ok(())
    }

    /// Applies a player's action against this table's pot.
    pub fn apply_action(&mut self, player_id: &str, action: ActionType, amount: Chips) -> GameResult<()> {
        let player = self
            .players
            .iter_mut()
            .find(|p| p.id == player_id)
            .ok_or_else(|| GameError::PlayerNotFound(player_id.to_string()))?;
        betting::apply_action(player, &mut self.pot, action, amount)
    }

    /// Moves the hand one round forward.
    ///
    /// Entering the flop deals three community cards, the turn and river one
    /// each. Entering showdown settles the pot and immediately resets the
    /// table to a fresh pre-flop, so `Showdown` is never observed as the
    /// current round.
    ///
    /// # Errors
    /// `NoActivePlayers` if showdown would be reached with every player
    /// folded. The table is left untouched.
    pub fn advance_street(&mut self) -> GameResult<StreetOutcome> {
        let next = self
            .round
            .next()
            .ok_or(GameError::UnexpectedRound(self.round))?;

        if next == GameRound::Showdown {
            let results = self.showdown()?;
            return Ok(StreetOutcome::Showdown { results });
        }

        let cards = self.deal_community(next.cards_to_deal())?;
        self.round = next;
        debug!(table = %self.id, round = ?next, cards = ?cards, "street dealt");
        Ok(StreetOutcome::Dealt { round: next, cards })
    }

    fn deal_community(&mut self, count: usize) -> GameResult<Vec<Card>> {
        let mut cards = Vec::with_capacity(count);
        for _ in 0..count {
            cards.push(self.deck.draw()?);
        }
        self.community_cards.extend_from_slice(&cards);
        Ok(cards)
    }

    pub fn active_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| !p.is_folded())
    }

    /// Scores every active player, pays the winners and resets the table.
    /// Scoring and every payout are checked first, so a failure leaves the
    /// table exactly as it was.
    fn showdown(&mut self) -> GameResult<Vec<ShowdownResult>> {
        let mut scored: Vec<(usize, HandScore)> = Vec::new();
        for (seat, player) in self.players.iter().enumerate().filter(|(_, p)| !p.is_folded()) {
            let mut cards = player.hole_cards().to_vec();
            cards.extend_from_slice(&self.community_cards);
            scored.push((seat, evaluate_hand(&cards)?));
        }

        let best = scored
            .iter()
            .map(|(_, score)| score)
            .max()
            .cloned()
            .ok_or(GameError::NoActivePlayers)?;
        // seat order, so the earliest seat collects any odd chip
        let winners: Vec<usize> = scored
            .iter()
            .filter(|(_, score)| *score == best)
            .map(|(seat, _)| *seat)
            .collect();

        let pot = self.pot.total_amount();
        let shares = split_pot(pot, winners.len());
        debug_assert_eq!(shares.iter().sum::<Chips>(), pot);
        for (&seat, &share) in winners.iter().zip(&shares) {
            self.players[seat]
                .chips()
                .checked_add(share)
                .ok_or(GameError::ChipOverflow)?;
        }

        // nothing below can fail
        self.pot.take();
        for (&seat, &share) in winners.iter().zip(&shares) {
            self.players[seat].win_chips(share)?;
        }
        self.round = GameRound::Showdown;

        let results: Vec<ShowdownResult> = scored
            .into_iter()
            .map(|(seat, score)| {
                let player = &self.players[seat];
                let winnings = winners
                    .iter()
                    .position(|&w| w == seat)
                    .map_or(0, |i| shares[i]);
                ShowdownResult {
                    player_id: player.id.clone(),
                    score,
                    hole_cards: player.hole_cards().to_vec(),
                    winnings,
                }
            })
            .collect();

        for result in results.iter().filter(|r| r.winnings > 0) {
            info!(
                table = %self.id,
                player = %result.player_id,
                hand = %result.score,
                winnings = result.winnings,
                "showdown winner"
            );
        }

        self.last_showdown = Some(results.clone());
        self.prepare_new_hand();
        Ok(results)
    }

    /// Fresh deck, empty board and pot, pre-flop, no per-hand player state.
    fn prepare_new_hand(&mut self) {
        self.deck.reset();
        self.community_cards.clear();
        self.pot.reset();
        self.round = GameRound::PreFlop;
        for player in self.players.iter_mut() {
            player.reset_for_hand();
        }
    }

    /// Returns chips committed to an unfinished hand. Everything in the pot
    /// was committed through the ledger, so the pot equals the sum of the
    /// players' current bets.
    fn refund_pot(&mut self) -> GameResult<()> {
        let in_pot = self.pot.total_amount();
        if in_pot == 0 {
            return Ok(());
        }
        let committed = self
            .players
            .iter()
            .try_fold(0, |sum: Chips, p| sum.checked_add(p.current_bet()))
            .ok_or(GameError::ChipOverflow)?;
        if committed != in_pot {
            return Err(GameError::IntegrityViolation {
                debited: committed,
                credited: in_pot,
                rolled_back: false,
            });
        }

        for player in &self.players {
            player
                .chips()
                .checked_add(player.current_bet())
                .ok_or(GameError::ChipOverflow)?;
        }

        self.pot.take();
        for player in self.players.iter_mut() {
            let bet = player.current_bet();
            player.win_chips(bet)?;
        }
        debug!(table = %self.id, refunded = in_pot, "unfinished hand refunded");
        Ok(())
    }
}

/// Splits `pot` evenly between `winners`. The first share also carries the
/// remainder of the integer division, so the shares always sum to `pot`.
pub fn split_pot(pot: Chips, winners: usize) -> Vec<Chips> {
    if winners == 0 {
        return Vec::new();
    }
    let count = winners as Chips;
    let mut shares = vec![pot / count; winners];
    shares[0] += pot % count;
    shares
}

// --- Unit tests ---
