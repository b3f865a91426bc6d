use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::deck::Deck;
use crate::errors::EngineError;
use crate::eval::{evaluate, Evaluation};
use crate::pot::{side_pots, split_award};
use crate::rules::{validate, Action, BetLimits, ValidatedAction};
use crate::seat::Seat;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Waiting,
    Playing,
    Finished,
}

/// Betting street of the current hand.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
}

/// Input to the state machine. Every mutation of a running hand arrives as
/// one of these, in the order the coordinator queued them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// Creator starts a deal; `seed` drives the shuffle so the transition
    /// is a deterministic function of its inputs.
    StartHand { seed: u64 },
    Action { seat: usize, action: Action },
    /// Turn deadline fired. Interpreted as a fold, always, even when a
    /// check would be legal. Carries the turn serial it was scheduled for;
    /// a stale serial (or a seat that no longer owes action) is a no-op so
    /// best-effort timer cancellation is safe.
    Timeout { seat: usize, serial: u64 },
    Disconnect { seat: usize },
    Reconnect { seat: usize },
    /// Creator ended the room: resolve any hand on the spot.
    ForceEnd,
}

/// Per-pot outcome at showdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PotResult {
    pub amount: u32,
    pub eligible: Vec<usize>,
    pub winners: Vec<usize>,
}

/// A hand revealed at showdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatReveal {
    pub seat: usize,
    pub player: String,
    pub hole: Vec<Card>,
    pub evaluation: Evaluation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub seat: usize,
    pub player: String,
    pub amount: u32,
}

/// Ordered outbound events of one applied transition, fanned out to
/// subscribers by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Outbound {
    HandStarted {
        dealer: usize,
    },
    ActionApplied {
        seat: usize,
        action: Action,
    },
    PhaseAdvanced {
        phase: Phase,
    },
    Showdown {
        community: Vec<Card>,
        reveals: Vec<SeatReveal>,
        pots: Vec<PotResult>,
    },
    HandEnded {
        payouts: Vec<Payout>,
    },
    WaitingForPlayers,
}

/// One deal cycle. Exists only between `StartHand` and settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    pub phase: Phase,
    pub community: Vec<Card>,
    pub deck: Deck,
    pub pot: u32,
    /// Bet level every live seat must match this round.
    pub current_bet: u32,
    /// Minimum raise increment: the previous raise increment of the
    /// street, the big blind at street open.
    pub min_raise: u32,
    pub last_aggressor: Option<usize>,
    pub current_turn: Option<usize>,
}

/// Result of applying one event: the next room value plus the ordered
/// events it emitted. The input room is never mutated.
#[derive(Debug, Clone)]
pub struct Transition {
    pub room: Room,
    pub events: Vec<Outbound>,
}

/// A table and everything on it. `apply` is the only way a hand moves:
/// value in, value out, so there is no shared mutable state to go stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub name: String,
    pub creator: String,
    pub seat_limit: usize,
    /// The big blind; also the minimum opening bet.
    pub min_bet: u32,
    pub max_bet: Option<u32>,
    pub status: RoomStatus,
    pub seats: Vec<Seat>,
    /// Dealer cursor: index into `seats`.
    pub dealer: usize,
    pub hand: Option<Hand>,
    /// Bumped whenever the turn moves; lets late timeouts be recognized.
    pub turn_serial: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Room {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        creator: impl Into<String>,
        seat_limit: usize,
        min_bet: u32,
        max_bet: Option<u32>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, EngineError> {
        if !(2..=10).contains(&seat_limit) {
            return Err(EngineError::InvalidSeatLimit(seat_limit));
        }
        Ok(Self {
            id: id.into(),
            name: name.into(),
            creator: creator.into(),
            seat_limit,
            min_bet,
            max_bet,
            status: RoomStatus::Waiting,
            seats: Vec::new(),
            dealer: 0,
            hand: None,
            turn_serial: 0,
            created_at,
            updated_at: created_at,
        })
    }

    pub fn seat_of(&self, player: &str) -> Option<usize> {
        self.seats.iter().position(|s| s.player == player)
    }

    /// Seats with chips behind.
    pub fn funded_count(&self) -> usize {
        self.seats.iter().filter(|s| s.chips > 0).count()
    }

    /// Seats shown to the outside: departed seats are already gone as far
    /// as anyone else is concerned.
    pub fn present_count(&self) -> usize {
        self.seats.iter().filter(|s| !s.departed).count()
    }

    /// Adds a seat. Only legal while the room is waiting and has space.
    pub fn join(
        &self,
        player: &str,
        username: &str,
        chips: u32,
    ) -> Result<Room, EngineError> {
        if self.seat_of(player).is_some() {
            return Err(EngineError::AlreadySeated(player.to_string()));
        }
        match self.status {
            RoomStatus::Waiting => {}
            _ => return Err(EngineError::NotAcceptingPlayers),
        }
        if self.seats.len() >= self.seat_limit {
            return Err(EngineError::RoomFull(self.seat_limit));
        }
        let mut room = self.clone();
        room.seats.push(Seat::new(player, username, chips));
        Ok(room)
    }

    /// Removes a player's seat. During a hand the seat folds and lingers
    /// (invisible to views) until settlement so the pot accounting stays
    /// intact; the fold may end the hand single-winner. An empty room
    /// finishes.
    pub fn leave(&self, player: &str) -> Result<Transition, EngineError> {
        let idx = self
            .seat_of(player)
            .ok_or_else(|| EngineError::SeatNotFound(player.to_string()))?;
        let mut room = self.clone();
        let mut events = Vec::new();
        if room.hand.is_some() {
            let was_live = room.seats[idx].is_live();
            room.seats[idx].departed = true;
            room.seats[idx].connected = false;
            if was_live {
                room.seats[idx].folded = true;
                resolve_round(&mut room, idx, &mut events)?;
            }
        } else {
            remove_seat(&mut room, idx);
        }
        if room.present_count() == 0 {
            room.status = RoomStatus::Finished;
        }
        Ok(Transition { room, events })
    }

    /// Applies one event and returns the next room value with the events
    /// it emitted. Client errors leave the room untouched.
    pub fn apply(&self, event: Event) -> Result<Transition, EngineError> {
        match event {
            Event::StartHand { seed } => {
                let deck = Deck::shuffled(&mut ChaCha20Rng::seed_from_u64(seed));
                self.start_hand_with_deck(deck)
            }
            Event::Action { seat, action } => self.apply_action(seat, action),
            Event::Timeout { seat, serial } => self.apply_timeout(seat, serial),
            Event::Disconnect { seat } => self.set_connected(seat, false),
            Event::Reconnect { seat } => self.set_connected(seat, true),
            Event::ForceEnd => self.force_end(),
        }
    }

    /// Starts a hand from an explicit deck. `apply(StartHand)` shuffles
    /// from the event seed; simulations and tests may stack the deck.
    pub fn start_hand_with_deck(&self, deck: Deck) -> Result<Transition, EngineError> {
        if self.hand.is_some() {
            return Err(EngineError::HandInProgress);
        }
        if self.status == RoomStatus::Finished {
            return Err(EngineError::NotAcceptingPlayers);
        }
        if self.funded_count() < 2 {
            return Err(EngineError::NotEnoughPlayers);
        }

        let mut room = self.clone();
        let mut deck = deck;
        for s in room.seats.iter_mut() {
            s.reset_for_hand();
        }

        if room.seats[room.dealer].chips == 0 {
            room.dealer = next_funded(&room.seats, room.dealer).expect("funded seat exists");
        }
        let dealer = room.dealer;
        let heads_up = room.funded_count() == 2;
        let sb = if heads_up {
            dealer
        } else {
            next_funded(&room.seats, dealer).expect("small blind seat")
        };
        let bb = next_funded(&room.seats, sb).expect("big blind seat");

        // two cards each, one at a time, starting left of the dealer
        let order: Vec<usize> = clockwise(room.seats.len(), dealer)
            .filter(|&i| room.seats[i].chips > 0)
            .collect();
        for _ in 0..2 {
            for &i in &order {
                let card = deck.deal()?;
                room.seats[i].hole.push(card);
            }
        }

        room.seats[dealer].is_dealer = true;
        room.seats[sb].is_small_blind = true;
        room.seats[bb].is_big_blind = true;

        let mut pot = 0;
        pot += room.seats[sb].commit(room.min_bet / 2);
        pot += room.seats[bb].commit(room.min_bet);

        room.hand = Some(Hand {
            phase: Phase::Preflop,
            community: Vec::new(),
            deck,
            pot,
            current_bet: room.min_bet,
            min_raise: room.min_bet,
            last_aggressor: Some(bb),
            current_turn: None,
        });
        room.status = RoomStatus::Playing;

        let mut events = vec![Outbound::HandStarted { dealer }];
        if round_complete(&room.seats, room.min_bet) {
            // blinds already all-in: run the board out
            advance_streets(&mut room, &mut events, false)?;
        } else {
            let first = next_owing(&room.seats, room.min_bet, bb).expect("someone owes action");
            set_turn(&mut room, Some(first));
        }
        Ok(Transition { room, events })
    }

    fn apply_action(&self, seat: usize, action: Action) -> Result<Transition, EngineError> {
        let hand = self.hand.as_ref().ok_or(EngineError::NoHandInProgress)?;
        if hand.current_turn != Some(seat) {
            return Err(EngineError::NotYourTurn(seat));
        }

        let limits = BetLimits {
            stack: self.seats[seat].chips,
            committed: self.seats[seat].bet,
            current_bet: hand.current_bet,
            min_raise: hand.min_raise,
            min_bet: self.min_bet,
            max_bet: self.max_bet,
        };
        let validated = validate(&limits, action)?;

        let mut room = self.clone();
        let effective = {
            let hand = room.hand.as_mut().expect("hand checked above");
            match validated {
                ValidatedAction::Fold => {
                    room.seats[seat].folded = true;
                    Action::Fold
                }
                ValidatedAction::Check => Action::Check,
                ValidatedAction::Call(owed) => {
                    hand.pot += room.seats[seat].commit(owed);
                    Action::Call
                }
                ValidatedAction::Bet(amount) => {
                    hand.pot += room.seats[seat].commit(amount);
                    hand.current_bet = amount;
                    hand.min_raise = amount;
                    hand.last_aggressor = Some(seat);
                    reset_acted_except(&mut room.seats, seat);
                    Action::Bet(amount)
                }
                ValidatedAction::Raise(increment) => {
                    let target = hand.current_bet + increment;
                    let needed = target - room.seats[seat].bet;
                    hand.pot += room.seats[seat].commit(needed);
                    hand.current_bet = room.seats[seat].bet;
                    hand.min_raise = increment;
                    hand.last_aggressor = Some(seat);
                    reset_acted_except(&mut room.seats, seat);
                    Action::Raise(increment)
                }
                ValidatedAction::AllIn(stack) => {
                    hand.pot += room.seats[seat].commit(stack);
                    let new_bet = room.seats[seat].bet;
                    if new_bet > hand.current_bet {
                        let increment = new_bet - hand.current_bet;
                        hand.current_bet = new_bet;
                        if increment >= hand.min_raise {
                            hand.min_raise = increment;
                            hand.last_aggressor = Some(seat);
                            reset_acted_except(&mut room.seats, seat);
                        }
                        // a short all-in lifts the bet level without
                        // re-opening the round: min raise and aggressor
                        // stand, seats come back only to match the shortfall
                    }
                    Action::AllIn
                }
            }
        };
        room.seats[seat].acted = true;

        let mut events = vec![Outbound::ActionApplied {
            seat,
            action: effective,
        }];
        resolve_round(&mut room, seat, &mut events)?;
        Ok(Transition { room, events })
    }

    fn apply_timeout(&self, seat: usize, serial: u64) -> Result<Transition, EngineError> {
        let stale = match &self.hand {
            None => true,
            Some(hand) => serial != self.turn_serial || hand.current_turn != Some(seat),
        };
        if stale {
            // the timer lost the race against a real action
            return Ok(Transition {
                room: self.clone(),
                events: Vec::new(),
            });
        }
        self.apply_action(seat, Action::Fold)
    }

    fn set_connected(&self, seat: usize, connected: bool) -> Result<Transition, EngineError> {
        if seat >= self.seats.len() {
            return Err(EngineError::SeatNotFound(format!("seat {seat}")));
        }
        let mut room = self.clone();
        room.seats[seat].connected = connected;
        Ok(Transition {
            room,
            events: Vec::new(),
        })
    }

    fn force_end(&self) -> Result<Transition, EngineError> {
        let mut room = self.clone();
        let mut events = Vec::new();
        if room.hand.is_some() {
            if live_count(&room.seats) <= 1 {
                end_single_winner(&mut room, &mut events, true)?;
            } else {
                advance_streets(&mut room, &mut events, true)?;
            }
        } else {
            room.status = RoomStatus::Finished;
        }
        Ok(Transition { room, events })
    }

    /// Verifies the state invariants that must hold after every applied
    /// event. A failure here is a bug, not a bad request; the coordinator
    /// quarantines the room.
    pub fn check_invariants(&self) -> Result<(), EngineError> {
        let Some(hand) = &self.hand else {
            return Ok(());
        };

        let contributed: u32 = self.seats.iter().map(|s| s.total_bet).sum();
        if hand.pot != contributed {
            return Err(EngineError::PotMismatch {
                pot: hand.pot,
                contributed,
            });
        }

        for (i, s) in self.seats.iter().enumerate() {
            if s.chips + s.total_bet != s.hand_start_stack {
                return Err(EngineError::StackMismatch { seat: i });
            }
        }

        for count in [
            self.seats.iter().filter(|s| s.is_dealer).count(),
            self.seats.iter().filter(|s| s.is_small_blind).count(),
            self.seats.iter().filter(|s| s.is_big_blind).count(),
        ] {
            // departed seats keep their flags until settlement, so every
            // running hand has exactly one of each
            if count != 1 {
                return Err(EngineError::BadBlindFlags);
            }
        }
        let dealt = self.seats.iter().filter(|s| !s.hole.is_empty()).count();
        if dealt == 2 {
            // heads-up: dealer posts the small blind
            let coherent = self
                .seats
                .iter()
                .all(|s| !s.is_dealer || s.is_small_blind || s.departed);
            if !coherent {
                return Err(EngineError::BadBlindFlags);
            }
        }

        if let Some(turn) = hand.current_turn {
            if turn >= self.seats.len() || !self.seats[turn].can_act() {
                return Err(EngineError::TurnOnDeadSeat { seat: turn });
            }
        }

        let expected_board = match hand.phase {
            Phase::Preflop => 0,
            Phase::Flop => 3,
            Phase::Turn => 4,
            Phase::River | Phase::Showdown => 5,
        };
        if hand.community.len() != expected_board {
            return Err(EngineError::BadBoardSize {
                count: hand.community.len(),
            });
        }

        // every card in play is distinct and came off this deck
        let mut seen = std::collections::HashSet::new();
        for c in hand.deck.cards() {
            if !seen.insert(*c) {
                return Err(EngineError::CardsCorrupt);
            }
        }
        let consumed: std::collections::HashSet<Card> =
            hand.deck.consumed().iter().copied().collect();
        let mut in_play = std::collections::HashSet::new();
        for card in hand
            .community
            .iter()
            .chain(self.seats.iter().flat_map(|s| s.hole.iter()))
        {
            if !consumed.contains(card) || !in_play.insert(*card) {
                return Err(EngineError::CardsCorrupt);
            }
        }
        Ok(())
    }
}

// -- free helpers over the seat list -----------------------------------

fn clockwise(n: usize, from: usize) -> impl Iterator<Item = usize> {
    (1..=n).map(move |offset| (from + offset) % n)
}

fn next_funded(seats: &[Seat], from: usize) -> Option<usize> {
    clockwise(seats.len(), from).find(|&i| seats[i].chips > 0 && !seats[i].departed)
}

fn next_owing(seats: &[Seat], current_bet: u32, from: usize) -> Option<usize> {
    clockwise(seats.len(), from).find(|&i| seats[i].owes_action(current_bet))
}

fn live_count(seats: &[Seat]) -> usize {
    seats.iter().filter(|s| s.is_live()).count()
}

fn reset_acted_except(seats: &mut [Seat], actor: usize) {
    for (i, s) in seats.iter_mut().enumerate() {
        if i != actor {
            s.acted = false;
        }
    }
}

/// A betting round is done when nobody still owes a decision. A lone
/// non-all-in seat owes one only while short of the current bet.
fn round_complete(seats: &[Seat], current_bet: u32) -> bool {
    let actors: Vec<&Seat> = seats.iter().filter(|s| s.can_act()).collect();
    if actors.len() <= 1 {
        actors.iter().all(|s| s.bet >= current_bet)
    } else {
        !seats.iter().any(|s| s.owes_action(current_bet))
    }
}

fn set_turn(room: &mut Room, turn: Option<usize>) {
    if let Some(hand) = room.hand.as_mut() {
        hand.current_turn = turn;
    }
    room.turn_serial += 1;
}

/// After any fold or action: end the hand if one seat is left, advance the
/// street if the round closed, otherwise move the turn along (when it was
/// `from`'s to begin with).
fn resolve_round(
    room: &mut Room,
    from: usize,
    events: &mut Vec<Outbound>,
) -> Result<(), EngineError> {
    if room.hand.is_none() {
        return Ok(());
    }
    if live_count(&room.seats) <= 1 {
        return end_single_winner(room, events, false);
    }
    let current_bet = room.hand.as_ref().expect("hand").current_bet;
    if round_complete(&room.seats, current_bet) {
        return advance_streets(room, events, false);
    }
    if room.hand.as_ref().expect("hand").current_turn == Some(from) {
        let next = next_owing(&room.seats, current_bet, from);
        set_turn(room, next);
    }
    Ok(())
}

/// Deals the next street(s). Loops so an all-in runout carries straight
/// through to showdown, burning before each street. `force` skips betting
/// entirely (creator ended the room).
fn advance_streets(
    room: &mut Room,
    events: &mut Vec<Outbound>,
    force: bool,
) -> Result<(), EngineError> {
    loop {
        let min_bet = room.min_bet;
        let phase = {
            let hand = room.hand.as_mut().expect("hand");
            match hand.phase {
                Phase::Preflop => {
                    hand.deck.burn()?;
                    for _ in 0..3 {
                        let card = hand.deck.deal()?;
                        hand.community.push(card);
                    }
                    hand.phase = Phase::Flop;
                }
                Phase::Flop => {
                    hand.deck.burn()?;
                    let card = hand.deck.deal()?;
                    hand.community.push(card);
                    hand.phase = Phase::Turn;
                }
                Phase::Turn => {
                    hand.deck.burn()?;
                    let card = hand.deck.deal()?;
                    hand.community.push(card);
                    hand.phase = Phase::River;
                }
                Phase::River | Phase::Showdown => {
                    hand.phase = Phase::Showdown;
                    return showdown(room, events, force);
                }
            }
            hand.current_bet = 0;
            hand.min_raise = min_bet;
            hand.last_aggressor = None;
            hand.current_turn = None;
            hand.phase
        };
        for s in room.seats.iter_mut() {
            s.reset_for_street();
        }
        events.push(Outbound::PhaseAdvanced { phase });
        if force || round_complete(&room.seats, 0) {
            continue;
        }
        match next_owing(&room.seats, 0, room.dealer) {
            Some(first) => {
                set_turn(room, Some(first));
                return Ok(());
            }
            None => continue,
        }
    }
}

fn showdown(
    room: &mut Room,
    events: &mut Vec<Outbound>,
    force: bool,
) -> Result<(), EngineError> {
    let hand = room.hand.take().expect("hand");
    let seat_count = room.seats.len();
    let pots = side_pots(&room.seats);

    let mut payouts = vec![0u32; seat_count];
    let mut results = Vec::with_capacity(pots.len());
    for pot in &pots {
        let live: Vec<usize> = pot
            .eligible
            .iter()
            .copied()
            .filter(|&i| room.seats[i].is_live())
            .collect();
        let winners: Vec<usize> = if live.is_empty() {
            // uncalled layer flows back to its contributors
            pot.eligible.clone()
        } else {
            let mut best = 0u32;
            let mut winners = Vec::new();
            for &i in &live {
                let score = evaluate(&room.seats[i].hole, &hand.community).score;
                if score > best {
                    best = score;
                    winners = vec![i];
                } else if score == best {
                    winners.push(i);
                }
            }
            winners
        };
        for (seat, amount) in split_award(pot.amount, &winners, room.dealer, seat_count) {
            payouts[seat] += amount;
        }
        results.push(PotResult {
            amount: pot.amount,
            eligible: pot.eligible.clone(),
            winners,
        });
    }

    let reveals: Vec<SeatReveal> = room
        .seats
        .iter()
        .enumerate()
        .filter(|(_, s)| s.is_live())
        .map(|(i, s)| SeatReveal {
            seat: i,
            player: s.player.clone(),
            hole: s.hole.clone(),
            evaluation: evaluate(&s.hole, &hand.community),
        })
        .collect();
    events.push(Outbound::Showdown {
        community: hand.community.clone(),
        reveals,
        pots: results,
    });
    settle(room, payouts, events, force)
}

fn end_single_winner(
    room: &mut Room,
    events: &mut Vec<Outbound>,
    force: bool,
) -> Result<(), EngineError> {
    let hand = room.hand.take().expect("hand");
    let mut payouts = vec![0u32; room.seats.len()];
    if let Some(winner) = room.seats.iter().position(|s| s.is_live()) {
        payouts[winner] = hand.pot;
    }
    settle(room, payouts, events, force)
}

/// Pays winners, resets per-hand state, purges departed seats, rotates the
/// dealer, and decides whether the room keeps going.
fn settle(
    room: &mut Room,
    payouts: Vec<u32>,
    events: &mut Vec<Outbound>,
    force: bool,
) -> Result<(), EngineError> {
    let mut list = Vec::new();
    for (i, &amount) in payouts.iter().enumerate() {
        if amount > 0 {
            room.seats[i].chips += amount;
            list.push(Payout {
                seat: i,
                player: room.seats[i].player.clone(),
                amount,
            });
        }
    }
    events.push(Outbound::HandEnded { payouts: list });

    for s in room.seats.iter_mut() {
        s.reset_for_hand();
    }
    room.hand = None;
    room.turn_serial += 1;

    // drop seats whose players left mid-hand, keeping the cursor aligned
    let gone_before_dealer = room
        .seats
        .iter()
        .take(room.dealer)
        .filter(|s| s.departed)
        .count();
    let dealer_departed = room
        .seats
        .get(room.dealer)
        .map(|s| s.departed)
        .unwrap_or(false);
    room.seats.retain(|s| !s.departed);
    if room.seats.is_empty() {
        room.dealer = 0;
        room.status = RoomStatus::Finished;
        return Ok(());
    }
    room.dealer -= gone_before_dealer;
    if dealer_departed {
        if room.dealer >= room.seats.len() {
            room.dealer = 0;
        }
        // the slot now holds the seat clockwise of the vacated button;
        // step back one so the rotation below does not skip it
        room.dealer = (room.dealer + room.seats.len() - 1) % room.seats.len();
    }

    if let Some(next) = next_funded(&room.seats, room.dealer) {
        room.dealer = next;
    }
    if !force && room.funded_count() >= 2 {
        room.status = RoomStatus::Waiting;
        events.push(Outbound::WaitingForPlayers);
    } else {
        room.status = RoomStatus::Finished;
    }
    Ok(())
}

/// Seat removal outside a hand; index fixups only.
fn remove_seat(room: &mut Room, idx: usize) {
    room.seats.remove(idx);
    if room.seats.is_empty() {
        room.dealer = 0;
        return;
    }
    if room.dealer > idx {
        room.dealer -= 1;
    }
    room.dealer %= room.seats.len();
}
