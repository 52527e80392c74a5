//! Chip movement between a player and the pot.
//!
//! The caller must hold the owning table's lock: the snapshot, the mutation
//! and a possible restore all have to happen without any other writer
//! touching the same player or pot.

use crate::error::{ErrorKind, GameError, GameResult};
use crate::state::{ActionType, Chips, Player, Pot};
use tracing::{debug, error};

/// Applies one action for `player` against `pot`.
///
/// Bet, raise and call move `amount`; all-in moves the whole remaining stack
/// and ignores `amount`; fold only marks the player; check does nothing.
///
/// # Errors
/// - `PlayerFolded` if the player already folded (nothing is touched).
/// - `InsufficientChips` if a bet/raise exceeds the stack (nothing is
///   touched), or if a call does (rolled back).
/// - `IntegrityViolation` if the chips taken from the player differ from the
///   chips added to the pot. Both are restored before this is returned.
pub fn apply_action(
    player: &mut Player,
    pot: &mut Pot,
    action: ActionType,
    amount: Chips,
) -> GameResult<()> {
    validate(player, action, amount)?;

    transact(player, pot, action.moves_chips(), |player, pot| match action {
        ActionType::Bet | ActionType::Raise | ActionType::Call => move_chips(player, pot, amount),
        ActionType::AllIn => {
            let stack = player.chips();
            move_chips(player, pot, stack)
        }
        ActionType::Fold => {
            player.fold();
            Ok(())
        }
        ActionType::Check => Ok(()),
    })?;

    debug!(
        player = %player.id,
        ?action,
        amount,
        chips = player.chips(),
        pot = pot.total_amount(),
        "action applied"
    );
    Ok(())
}

fn validate(player: &Player, action: ActionType, amount: Chips) -> GameResult<()> {
    if player.is_folded() {
        return Err(GameError::PlayerFolded(player.id.clone()));
    }
    if matches!(action, ActionType::Bet | ActionType::Raise) && amount > player.chips() {
        return Err(GameError::InsufficientChips {
            requested: amount,
            available: player.chips(),
        });
    }
    Ok(())
}

fn move_chips(player: &mut Player, pot: &mut Pot, amount: Chips) -> GameResult<()> {
    player.bet_chips(amount)?;
    pot.add(amount)
}

/// State of a player/pot pair before a mutation.
#[derive(Debug, Clone, Copy)]
struct LedgerSnapshot {
    player: (Chips, Chips),
    pot: Chips,
}

impl LedgerSnapshot {
    fn capture(player: &Player, pot: &Pot) -> LedgerSnapshot {
        LedgerSnapshot {
            player: player.ledger_snapshot(),
            pot: pot.total_amount(),
        }
    }

    fn restore(self, player: &mut Player, pot: &mut Pot) {
        player.restore_ledger(self.player);
        pot.restore(self.pot);
    }

    /// Zero-sum check: what left the player is exactly what reached the pot.
    fn verify(&self, player: &Player, pot: &Pot) -> GameResult<()> {
        let (chips_before, _) = self.player;
        let debited = i128::from(chips_before) - i128::from(player.chips());
        let credited = i128::from(pot.total_amount()) - i128::from(self.pot);
        if debited != credited {
            return Err(GameError::IntegrityViolation {
                debited: chips_before.saturating_sub(player.chips()),
                credited: pot.total_amount().saturating_sub(self.pot),
                rolled_back: false,
            });
        }
        Ok(())
    }
}

/// Runs `mutate` against the pair and restores the snapshot if it fails or,
/// when `check_zero_sum` is set, if the result breaks the zero-sum rule.
fn transact<F>(player: &mut Player, pot: &mut Pot, check_zero_sum: bool, mutate: F) -> GameResult<()>
where
    F: FnOnce(&mut Player, &mut Pot) -> GameResult<()>,
{
    let before = LedgerSnapshot::capture(player, pot);

    let result = mutate(player, pot).and_then(|()| {
        if check_zero_sum {
            before.verify(player, pot)
        } else {
            Ok(())
        }
    });

    match result {
        Ok(()) => Ok(()),
        Err(err) => {
            before.restore(player, pot);
            let err = match err {
                GameError::IntegrityViolation { debited, credited, .. } => {
                    GameError::IntegrityViolation { debited, credited, rolled_back: true }
                }
                other => other,
            };
            if err.kind() == ErrorKind::Integrity {
                error!(player = %player.id, error = %err, "rolled back chip movement");
            } else {
                debug!(player = %player.id, error = %err, "action rejected, state restored");
            }
            Err(err)
        }
    }
}
