use serde::{Deserialize, Serialize};

use crate::cards::{Card, Rank, Suit};

/// Hand category, weakest to strongest. The discriminant is the high nibble
/// of the packed score.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Fewer than five cards available; no hand yet.
    Incomplete = 0,
    HighCard = 1,
    Pair = 2,
    TwoPair = 3,
    Trips = 4,
    Straight = 5,
    Flush = 6,
    FullHouse = 7,
    Quads = 8,
    StraightFlush = 9,
    RoyalFlush = 10,
}

/// Result of evaluating hole cards against the board.
///
/// `score` is a total ordering over hands: for any two evaluations,
/// `a.score > b.score` exactly when `a` beats `b` under standard hold'em
/// rules including kickers, and equal scores are ties. The category sits in
/// bits 20..24 and five 4-bit kickers (descending significance) fill bits
/// 0..20, so comparing the packed integers compares category first and then
/// kickers in order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub category: Category,
    pub score: u32,
}

fn pack(category: Category, kickers: [u8; 5]) -> Evaluation {
    let mut score = (category as u32) << 20;
    for (i, k) in kickers.iter().enumerate() {
        score |= (*k as u32) << (16 - 4 * i);
    }
    Evaluation { category, score }
}

/// Selects the best 5-card hand from 2 hole cards plus up to 5 board cards.
///
/// With fewer than five cards in total the result is
/// `Category::Incomplete` with score 0. Deterministic over its inputs; no
/// allocation beyond small scratch vectors.
///
/// # Examples
///
/// ```
/// use holdem_engine::cards::Card;
/// use holdem_engine::eval::{evaluate, Category};
///
/// let hole: Vec<Card> = ["Ah", "Kh"].iter().map(|c| c.parse().unwrap()).collect();
/// let board: Vec<Card> = ["Qh", "Jh", "Th", "2c", "3c"]
///     .iter()
///     .map(|c| c.parse().unwrap())
///     .collect();
///
/// let eval = evaluate(&hole, &board);
/// assert_eq!(eval.category, Category::RoyalFlush);
/// ```
pub fn evaluate(hole: &[Card], board: &[Card]) -> Evaluation {
    let cards: Vec<Card> = hole.iter().chain(board.iter()).copied().collect();
    if cards.len() < 5 {
        return Evaluation {
            category: Category::Incomplete,
            score: 0,
        };
    }

    // Count ranks and suits
    let mut rank_counts = [0u8; 15]; // 2..14 used
    let mut suit_counts = [0u8; 4];
    let mut by_suit: [Vec<u8>; 4] = [vec![], vec![], vec![], vec![]];
    for &c in cards.iter() {
        let r = rank_val(c.rank);
        rank_counts[r as usize] += 1;
        let s = suit_index(c.suit);
        suit_counts[s] += 1;
        by_suit[s].push(r);
    }

    let mut flush_suit: Option<usize> = None;
    for (s, &count) in suit_counts.iter().enumerate() {
        if count >= 5 {
            flush_suit = Some(s);
            break;
        }
    }

    // Straight flush / royal flush
    if let Some(s) = flush_suit {
        by_suit[s].sort_unstable();
        by_suit[s].dedup();
        if let Some(high) = detect_straight_high(&by_suit[s]) {
            let category = if high == 14 {
                Category::RoyalFlush
            } else {
                Category::StraightFlush
            };
            return pack(category, [high, 0, 0, 0, 0]);
        }
    }

    // Four of a kind
    if let Some((quad, kicker)) = detect_quads(&rank_counts) {
        return pack(Category::Quads, [quad, kicker, 0, 0, 0]);
    }

    // Full house
    if let Some((trip, pair)) = detect_full_house(&rank_counts) {
        return pack(Category::FullHouse, [trip, pair, 0, 0, 0]);
    }

    // Flush: five highest cards of the flush suit
    if let Some(s) = flush_suit {
        let mut ranks = by_suit[s].clone();
        ranks.sort_unstable_by(|a, b| b.cmp(a));
        let mut k = [0u8; 5];
        k.copy_from_slice(&ranks[..5]);
        return pack(Category::Flush, k);
    }

    // Straight
    let mut uniq: Vec<u8> = (2..=14u8).filter(|&r| rank_counts[r as usize] > 0).collect();
    uniq.dedup();
    if let Some(high) = detect_straight_high(&uniq) {
        return pack(Category::Straight, [high, 0, 0, 0, 0]);
    }

    // Trips / two pair / pair / high card
    let (trip_ranks, pair_ranks, singles) = classify_multiples(&rank_counts);
    if let Some(t) = trip_ranks.first().copied() {
        let mut remain: Vec<u8> = pair_ranks.iter().chain(singles.iter()).copied().collect();
        remain.sort_unstable_by(|a, b| b.cmp(a));
        let mut k = [t, 0, 0, 0, 0];
        k[1] = *remain.first().unwrap_or(&0);
        k[2] = *remain.get(1).unwrap_or(&0);
        return pack(Category::Trips, k);
    }
    if pair_ranks.len() >= 2 {
        let high = pair_ranks[0];
        let low = pair_ranks[1];
        // the displaced third pair counts as a kicker candidate
        let mut rest: Vec<u8> = pair_ranks[2..].iter().chain(singles.iter()).copied().collect();
        rest.sort_unstable_by(|a, b| b.cmp(a));
        let mut k = [high, low, 0, 0, 0];
        k[2] = *rest.first().unwrap_or(&0);
        return pack(Category::TwoPair, k);
    }
    if let Some(p) = pair_ranks.first().copied() {
        let mut rest = singles.clone();
        rest.sort_unstable_by(|a, b| b.cmp(a));
        let mut k = [p, 0, 0, 0, 0];
        for i in 0..3 {
            k[i + 1] = *rest.get(i).unwrap_or(&0);
        }
        return pack(Category::Pair, k);
    }

    let mut highs = singles;
    highs.sort_unstable_by(|a, b| b.cmp(a));
    let mut k = [0u8; 5];
    for (i, item) in k.iter_mut().enumerate() {
        *item = *highs.get(i).unwrap_or(&0);
    }
    pack(Category::HighCard, k)
}

fn rank_val(r: Rank) -> u8 {
    r as u8
}

fn suit_index(s: Suit) -> usize {
    match s {
        Suit::Clubs => 0,
        Suit::Diamonds => 1,
        Suit::Hearts => 2,
        Suit::Spades => 3,
    }
}

/// Highest straight top card in a sorted, deduplicated rank list, treating
/// an Ace additionally as 1 for the wheel (which reports as 5-high).
fn detect_straight_high(sorted_unique_ranks: &[u8]) -> Option<u8> {
    if sorted_unique_ranks.is_empty() {
        return None;
    }
    let mut w = sorted_unique_ranks.to_vec();
    if w.binary_search(&14).is_ok() {
        w.insert(0, 1);
    }

    let mut run = 1;
    let mut best_high = 0u8;
    for i in 1..w.len() {
        if w[i] == w[i - 1] + 1 {
            run += 1;
            if run >= 5 {
                best_high = w[i];
            }
        } else {
            run = 1;
        }
    }
    if best_high == 0 {
        None
    } else {
        Some(best_high)
    }
}

fn detect_quads(rank_counts: &[u8; 15]) -> Option<(u8, u8)> {
    let quad = (2..=14u8).rev().find(|&r| rank_counts[r as usize] == 4)?;
    let kicker = (2..=14u8)
        .rev()
        .find(|&r| r != quad && rank_counts[r as usize] > 0)
        .unwrap_or(0);
    Some((quad, kicker))
}

fn detect_full_house(rank_counts: &[u8; 15]) -> Option<(u8, u8)> {
    let mut trips: Vec<u8> = vec![];
    let mut pairs: Vec<u8> = vec![];
    for r in (2..=14u8).rev() {
        match rank_counts[r as usize] {
            3 => trips.push(r),
            2 => pairs.push(r),
            _ => {}
        }
    }
    match (trips.first(), trips.get(1), pairs.first()) {
        // two sets of trips: the lower one fills the pair slot
        (Some(&t), Some(&second), _) => Some((t, second)),
        (Some(&t), None, Some(&p)) => Some((t, p)),
        _ => None,
    }
}

/// Rank lists (descending) for trips, pairs, and singles.
fn classify_multiples(rank_counts: &[u8; 15]) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
    let mut trips = vec![];
    let mut pairs = vec![];
    let mut singles = vec![];
    for r in (2..=14u8).rev() {
        match rank_counts[r as usize] {
            3 => trips.push(r),
            2 => pairs.push(r),
            1 => singles.push(r),
            _ => {}
        }
    }
    (trips, pairs, singles)
}
