use thiserror::Error;

/// Errors produced by the game core.
///
/// Client errors are precondition failures: the caller asked for something
/// the rules forbid and the room state is unchanged. Invariant errors mean
/// the engine itself reached a corrupt state; the coordinator quarantines
/// the room when it sees one.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    // -- client errors -------------------------------------------------
    #[error("seat limit must be between 2 and 10, got {0}")]
    InvalidSeatLimit(usize),
    #[error("player {0} is not seated at this room")]
    SeatNotFound(String),
    #[error("player {0} already holds a seat")]
    AlreadySeated(String),
    #[error("room is full ({0} seats)")]
    RoomFull(usize),
    #[error("room is not accepting players")]
    NotAcceptingPlayers,
    #[error("a hand is already in progress")]
    HandInProgress,
    #[error("no hand in progress")]
    NoHandInProgress,
    #[error("need at least 2 seats with chips to start a hand")]
    NotEnoughPlayers,
    #[error("it's not seat {0}'s turn")]
    NotYourTurn(usize),
    #[error("cannot check when there is a bet to call")]
    CannotCheck,
    #[error("nothing to raise; use bet")]
    NothingToRaise,
    #[error("there is already a bet; use raise")]
    BetNotAllowed,
    #[error("bet {amount} is below the table minimum {minimum}")]
    BetBelowMinimum { amount: u32, minimum: u32 },
    #[error("bet {amount} is above the table maximum {maximum}")]
    BetAboveMaximum { amount: u32, maximum: u32 },
    #[error("raise {amount} is below the minimum raise {minimum}")]
    RaiseBelowMinimum { amount: u32, minimum: u32 },
    #[error("insufficient chips: tried to wager {amount} with a stack of {stack}")]
    InsufficientChips { amount: u32, stack: u32 },

    // -- invariant violations ------------------------------------------
    #[error("deck underflow: no cards left to deal")]
    DeckUnderflow,
    #[error("pot {pot} does not match seat contributions {contributed}")]
    PotMismatch { pot: u32, contributed: u32 },
    #[error("stack accounting broken for seat {seat}")]
    StackMismatch { seat: usize },
    #[error("turn points at seat {seat} which cannot act")]
    TurnOnDeadSeat { seat: usize },
    #[error("community has {count} cards, illegal for the current phase")]
    BadBoardSize { count: usize },
    #[error("duplicate or foreign card detected in play")]
    CardsCorrupt,
    #[error("blind flags inconsistent for the current hand")]
    BadBlindFlags,
}

impl EngineError {
    /// True for precondition failures the caller can correct; false for
    /// invariant violations that poison the room.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            EngineError::DeckUnderflow
                | EngineError::PotMismatch { .. }
                | EngineError::StackMismatch { .. }
                | EngineError::TurnOnDeadSeat { .. }
                | EngineError::BadBoardSize { .. }
                | EngineError::CardsCorrupt
                | EngineError::BadBlindFlags
        )
    }
}
