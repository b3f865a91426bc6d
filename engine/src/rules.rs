use serde::{Deserialize, Serialize};

use crate::errors::EngineError;

/// A player action as requested over the wire.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "kebab-case")]
pub enum Action {
    /// Fold and forfeit the hand.
    Fold,
    /// Check (only when nothing is owed).
    Check,
    /// Match the current bet.
    Call,
    /// Open the betting for the given amount.
    Bet(u32),
    /// Raise the current bet by the given increment.
    Raise(u32),
    /// Commit the whole remaining stack.
    AllIn,
}

/// The effective action after legality checks: call-for-less and
/// stack-capped raises come back as `AllIn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatedAction {
    Fold,
    Check,
    /// Chips to move to match the current bet.
    Call(u32),
    Bet(u32),
    /// Raise increment on top of the current bet.
    Raise(u32),
    /// Whole remaining stack.
    AllIn(u32),
}

/// Betting context for one seat at its turn.
#[derive(Debug, Clone, Copy)]
pub struct BetLimits {
    /// Seat's remaining stack.
    pub stack: u32,
    /// Seat's chips already committed this round.
    pub committed: u32,
    /// Bet level everyone must match this round.
    pub current_bet: u32,
    /// Minimum raise increment (the previous raise increment of the
    /// street, big blind at street open).
    pub min_raise: u32,
    /// Table minimum opening bet (the big blind).
    pub min_bet: u32,
    /// Optional table cap on opening bets.
    pub max_bet: Option<u32>,
}

/// Checks a requested action against the betting rules and converts it to
/// the effective one.
///
/// # Errors
///
/// Client errors only: [`EngineError::CannotCheck`],
/// [`EngineError::BetNotAllowed`], [`EngineError::NothingToRaise`],
/// [`EngineError::BetBelowMinimum`], [`EngineError::BetAboveMaximum`],
/// [`EngineError::RaiseBelowMinimum`], [`EngineError::InsufficientChips`].
///
/// # Examples
///
/// ```
/// use holdem_engine::rules::{validate, Action, BetLimits, ValidatedAction};
///
/// let limits = BetLimits {
///     stack: 80,
///     committed: 10,
///     current_bet: 50,
///     min_raise: 40,
///     min_bet: 10,
///     max_bet: None,
/// };
///
/// // A raise the stack cannot cover becomes an all-in.
/// let action = validate(&limits, Action::Raise(100)).unwrap();
/// assert_eq!(action, ValidatedAction::AllIn(80));
/// ```
pub fn validate(limits: &BetLimits, action: Action) -> Result<ValidatedAction, EngineError> {
    match action {
        Action::Fold => Ok(ValidatedAction::Fold),
        Action::Check => {
            if limits.committed == limits.current_bet {
                Ok(ValidatedAction::Check)
            } else {
                Err(EngineError::CannotCheck)
            }
        }
        Action::Call => {
            let owed = limits.current_bet.saturating_sub(limits.committed);
            if owed >= limits.stack {
                Ok(ValidatedAction::AllIn(limits.stack))
            } else {
                Ok(ValidatedAction::Call(owed))
            }
        }
        Action::Bet(amount) => {
            if limits.current_bet != 0 {
                return Err(EngineError::BetNotAllowed);
            }
            if amount < limits.min_bet {
                return Err(EngineError::BetBelowMinimum {
                    amount,
                    minimum: limits.min_bet,
                });
            }
            if let Some(maximum) = limits.max_bet {
                if amount > maximum {
                    return Err(EngineError::BetAboveMaximum { amount, maximum });
                }
            }
            if amount > limits.stack {
                return Err(EngineError::InsufficientChips {
                    amount,
                    stack: limits.stack,
                });
            }
            if amount == limits.stack {
                Ok(ValidatedAction::AllIn(limits.stack))
            } else {
                Ok(ValidatedAction::Bet(amount))
            }
        }
        Action::Raise(amount) => {
            if limits.current_bet == 0 {
                return Err(EngineError::NothingToRaise);
            }
            let target = limits.current_bet.saturating_add(amount);
            let needed = target.saturating_sub(limits.committed);
            if needed >= limits.stack {
                // short-stack raise is permitted as an all-in
                return Ok(ValidatedAction::AllIn(limits.stack));
            }
            if amount < limits.min_raise {
                return Err(EngineError::RaiseBelowMinimum {
                    amount,
                    minimum: limits.min_raise,
                });
            }
            Ok(ValidatedAction::Raise(amount))
        }
        Action::AllIn => Ok(ValidatedAction::AllIn(limits.stack)),
    }
}
