//! # holdem-engine: multi-table Texas Hold'em game core
//!
//! The deterministic heart of the poker server: cards, deck, hand
//! evaluation, and the hand state machine that carries a table from blinds
//! through showdown. Everything here is a pure value transformation with
//! no I/O, clocks, or async, so a room snapshot plus an event sequence
//! replays to exactly one outcome.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card representation (Suit, Rank, Card) and deck construction
//! - [`deck`] - Fisher-Yates shuffling over an injected randomness source
//! - [`eval`] - Best-five-of-seven hand evaluation with total-order scores
//! - [`seat`] - Seat state and chip accounting
//! - [`machine`] - The hand state machine: `Room::apply(event)`
//! - [`rules`] - Betting legality checks
//! - [`pot`] - Side-pot construction and payout splitting
//! - [`errors`] - Typed errors, split client vs. invariant
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::Utc;
//! use holdem_engine::machine::{Event, Room};
//!
//! let room = Room::new("r1", "High Stakes", "alice", 6, 10, None, Utc::now())
//!     .expect("valid room")
//!     .join("alice", "alice", 1_000)
//!     .expect("seat alice")
//!     .join("bob", "bob", 1_000)
//!     .expect("seat bob");
//!
//! let next = room.apply(Event::StartHand { seed: 42 }).expect("start hand");
//! assert!(next.room.hand.is_some());
//! ```
//!
//! ## Deterministic deals
//!
//! The shuffle seed travels inside the `StartHand` event, so the same room
//! and the same events always produce the same hand:
//!
//! ```rust
//! use holdem_engine::deck::Deck;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! let a = Deck::shuffled(&mut ChaCha20Rng::seed_from_u64(42));
//! let b = Deck::shuffled(&mut ChaCha20Rng::seed_from_u64(42));
//! assert_eq!(a, b);
//! ```

pub mod cards;
pub mod deck;
pub mod errors;
pub mod eval;
pub mod machine;
pub mod pot;
pub mod rules;
pub mod seat;
