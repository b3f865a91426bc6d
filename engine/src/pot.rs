use serde::{Deserialize, Serialize};

use crate::seat::Seat;

/// One layer of the pot: an amount plus the seats allowed to win it.
///
/// Layers are ordered by contribution level ascending, so eligibility is
/// monotone: a seat eligible for layer `k` is eligible for every layer
/// below it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidePot {
    pub amount: u32,
    /// Seat indices of the non-folded seats that matched this layer.
    pub eligible: Vec<usize>,
}

/// Builds the side-pot layering from cumulative hand contributions.
///
/// Each distinct contribution level `c_k` (ascending) forms a pot of
/// `(c_k - c_{k-1}) * |seats with total_bet >= c_k|`. Folded seats pay
/// into every layer they reached but are never eligible; a layer whose
/// contributors all folded keeps them as eligible so the chips flow back
/// rather than evaporate.
pub fn side_pots(seats: &[Seat]) -> Vec<SidePot> {
    let mut levels: Vec<u32> = seats
        .iter()
        .map(|s| s.total_bet)
        .filter(|&c| c > 0)
        .collect();
    levels.sort_unstable();
    levels.dedup();

    let mut pots = Vec::new();
    let mut prev = 0u32;
    for level in levels {
        let step = level - prev;
        let contributors = seats.iter().filter(|s| s.total_bet >= level).count() as u32;
        let mut eligible: Vec<usize> = seats
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_live() && s.total_bet >= level)
            .map(|(i, _)| i)
            .collect();
        if eligible.is_empty() {
            // uncalled layer; refund to whoever paid it
            eligible = seats
                .iter()
                .enumerate()
                .filter(|(_, s)| s.total_bet >= level)
                .map(|(i, _)| i)
                .collect();
        }
        pots.push(SidePot {
            amount: step * contributors,
            eligible,
        });
        prev = level;
    }
    pots
}

/// Splits `amount` equally among `winners` (seat indices), handing any odd
/// chips one at a time to the winners closest clockwise from the dealer.
/// Returns `(seat, share)` pairs for the non-zero shares.
pub fn split_award(
    amount: u32,
    winners: &[usize],
    dealer: usize,
    seat_count: usize,
) -> Vec<(usize, u32)> {
    if winners.is_empty() || amount == 0 {
        return Vec::new();
    }
    let base = amount / winners.len() as u32;
    let mut odd = amount % winners.len() as u32;
    let mut shares: Vec<(usize, u32)> = Vec::with_capacity(winners.len());

    // winners reordered clockwise starting left of the dealer
    let mut order: Vec<usize> = Vec::with_capacity(winners.len());
    for offset in 1..=seat_count {
        let idx = (dealer + offset) % seat_count;
        if winners.contains(&idx) {
            order.push(idx);
        }
    }

    for seat in order {
        let mut share = base;
        if odd > 0 {
            share += 1;
            odd -= 1;
        }
        if share > 0 {
            shares.push((seat, share));
        }
    }
    shares
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seat::Seat;

    fn seat(chips: u32, total_bet: u32, folded: bool) -> Seat {
        let mut s = Seat::new("p", "p", chips);
        s.total_bet = total_bet;
        s.folded = folded;
        s.hole = vec!["Ah".parse().expect("card"), "Kd".parse().expect("card")];
        s
    }

    #[test]
    fn single_level_single_pot() {
        let seats = vec![seat(0, 50, false), seat(0, 50, false), seat(0, 50, false)];
        let pots = side_pots(&seats);
        assert_eq!(pots.len(), 1);
        assert_eq!(pots[0].amount, 150);
        assert_eq!(pots[0].eligible, vec![0, 1, 2]);
    }

    #[test]
    fn layered_contributions_build_side_pots() {
        // P1 all-in 50, P2 and P3 at 110 each
        let seats = vec![seat(0, 50, false), seat(90, 110, false), seat(90, 110, false)];
        let pots = side_pots(&seats);
        assert_eq!(pots.len(), 2);
        assert_eq!(pots[0].amount, 150);
        assert_eq!(pots[0].eligible, vec![0, 1, 2]);
        assert_eq!(pots[1].amount, 120);
        assert_eq!(pots[1].eligible, vec![1, 2]);
        let total: u32 = pots.iter().map(|p| p.amount).sum();
        let contributed: u32 = seats.iter().map(|s| s.total_bet).sum();
        assert_eq!(total, contributed);
    }

    #[test]
    fn folded_money_stays_in_but_confers_no_eligibility() {
        let seats = vec![seat(0, 40, true), seat(60, 40, false), seat(60, 40, false)];
        let pots = side_pots(&seats);
        assert_eq!(pots.len(), 1);
        assert_eq!(pots[0].amount, 120);
        assert_eq!(pots[0].eligible, vec![1, 2]);
    }

    #[test]
    fn uncalled_top_layer_refunds_to_its_contributor() {
        // the only seat at the top level folded everyone else out earlier
        // in a different line; the layer must not evaporate
        let seats = vec![seat(0, 100, true), seat(0, 40, false)];
        let pots = side_pots(&seats);
        assert_eq!(pots.len(), 2);
        assert_eq!(pots[1].eligible, vec![0]);
        let total: u32 = pots.iter().map(|p| p.amount).sum();
        assert_eq!(total, 140);
    }

    #[test]
    fn eligibility_is_monotone() {
        let seats = vec![
            seat(0, 30, false),
            seat(0, 80, false),
            seat(10, 120, false),
            seat(10, 120, false),
        ];
        let pots = side_pots(&seats);
        for window in pots.windows(2) {
            for idx in &window[1].eligible {
                assert!(window[0].eligible.contains(idx));
            }
        }
    }

    #[test]
    fn split_award_gives_odd_chip_clockwise_from_dealer() {
        // dealer at 0; winner order clockwise is 1 then 2
        let shares = split_award(101, &[1, 2], 0, 3);
        assert_eq!(shares, vec![(1, 51), (2, 50)]);

        // dealer at 1; seat 2 is now first clockwise
        let shares = split_award(101, &[0, 2], 1, 3);
        assert_eq!(shares, vec![(2, 51), (0, 50)]);
    }

    #[test]
    fn split_award_exact_division_has_no_odd_chip() {
        let shares = split_award(100, &[0, 1], 2, 3);
        let total: u32 = shares.iter().map(|(_, a)| a).sum();
        assert_eq!(total, 100);
        assert_eq!(shares.iter().map(|(_, a)| *a).max(), shares.iter().map(|(_, a)| *a).min());
    }
}
