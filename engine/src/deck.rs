use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::cards::{full_deck, Card};
use crate::errors::EngineError;

/// The card sequence for one hand. Cards are consumed front to back; the
/// consumed prefix stays in place so a snapshot can account for every card
/// that left the deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Card>,
    position: usize,
}

impl Deck {
    /// A full 52-card deck, Fisher-Yates shuffled by the supplied source.
    pub fn shuffled<R: Rng>(rng: &mut R) -> Self {
        let mut cards = full_deck();
        cards.shuffle(rng);
        Self { cards, position: 0 }
    }

    /// A deck with a fixed card order. Test rigging only; the sequence does
    /// not have to contain all 52 cards.
    pub fn stacked(cards: Vec<Card>) -> Self {
        Self { cards, position: 0 }
    }

    pub fn deal(&mut self) -> Result<Card, EngineError> {
        if self.position >= self.cards.len() {
            return Err(EngineError::DeckUnderflow);
        }
        let c = self.cards[self.position];
        self.position += 1;
        Ok(c)
    }

    pub fn burn(&mut self) -> Result<(), EngineError> {
        self.deal().map(|_| ())
    }

    pub fn remaining(&self) -> usize {
        self.cards.len().saturating_sub(self.position)
    }

    /// Cards already dealt or burned, in order.
    pub fn consumed(&self) -> &[Card] {
        &self.cards[..self.position]
    }

    /// The entire sequence, consumed and remaining.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn same_seed_same_order() {
        let mut a = Deck::shuffled(&mut ChaCha20Rng::seed_from_u64(7));
        let mut b = Deck::shuffled(&mut ChaCha20Rng::seed_from_u64(7));
        for _ in 0..52 {
            assert_eq!(a.deal().expect("deal a"), b.deal().expect("deal b"));
        }
    }

    #[test]
    fn different_seeds_differ() {
        let a = Deck::shuffled(&mut ChaCha20Rng::seed_from_u64(1));
        let b = Deck::shuffled(&mut ChaCha20Rng::seed_from_u64(2));
        assert_ne!(a.cards(), b.cards());
    }

    #[test]
    fn deal_past_end_underflows() {
        let mut deck = Deck::stacked(vec!["Ah".parse().expect("card")]);
        assert!(deck.deal().is_ok());
        assert_eq!(deck.deal(), Err(EngineError::DeckUnderflow));
    }

    #[test]
    fn burn_consumes_one() {
        let mut deck = Deck::shuffled(&mut ChaCha20Rng::seed_from_u64(3));
        deck.burn().expect("burn");
        assert_eq!(deck.remaining(), 51);
        assert_eq!(deck.consumed().len(), 1);
    }
}
