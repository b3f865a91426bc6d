use chrono::Utc;
use holdem_engine::cards::Card;
use holdem_engine::deck::Deck;
use holdem_engine::machine::{Event, Outbound, Room};
use holdem_engine::rules::Action;

fn cards(texts: &[&str]) -> Vec<Card> {
    texts.iter().map(|c| c.parse().expect("card")).collect()
}

fn apply(room: &Room, event: Event) -> Room {
    let next = room.apply(event).expect("apply event");
    next.room.check_invariants().expect("invariants hold");
    next.room
}

fn act(room: &Room, seat: usize, action: Action) -> Room {
    apply(room, Event::Action { seat, action })
}

/// Short stack all-in on the flop builds a main pot it can win and a side
/// pot it cannot: P1 (50) ends best, P2 second, P3 third.
#[test]
fn layered_all_in_splits_main_and_side_pot() {
    let mut room = Room::new("r1", "table", "p1", 10, 10, None, Utc::now()).expect("room");
    room = room.join("p1", "p1", 50).expect("join");
    room = room.join("p2", "p2", 200).expect("join");
    room = room.join("p3", "p3", 200).expect("join");
    // dealer on P3 so P1 posts the small blind, P2 the big blind
    room.dealer = 2;

    // deal order from the dealer's left: P1, P2, P3, twice around
    let deck = Deck::stacked(cards(&[
        "Ah", "Kh", "2c", // first round
        "Ad", "Kd", "7d", // second round
        "3c", // burn
        "As", "Ks", "4h", // flop: trips for P1, trips for P2
        "3d", // burn
        "8c", // turn
        "3h", // burn
        "9d", // river
    ]));
    let next = room.start_hand_with_deck(deck).expect("start");
    let mut room = next.room;
    room.check_invariants().expect("invariants");

    // everyone in for the blind: pot 30
    room = act(&room, 2, Action::Call);
    room = act(&room, 0, Action::Call);
    room = act(&room, 1, Action::Check);
    assert_eq!(room.hand.as_ref().expect("hand").pot, 30);
    assert_eq!(room.hand.as_ref().expect("hand").community.len(), 3);

    // flop: P1 shoves 40 more, P2 calls, P3 raises to 100, P2 calls
    room = act(&room, 0, Action::AllIn);
    room = act(&room, 1, Action::Call);
    room = act(&room, 2, Action::Raise(60));
    room = act(&room, 1, Action::Call);

    assert_eq!(room.seats[0].total_bet, 50);
    assert_eq!(room.seats[1].total_bet, 110);
    assert_eq!(room.seats[2].total_bet, 110);
    assert_eq!(room.hand.as_ref().expect("hand").pot, 270);

    // check the turn and river down
    room = act(&room, 1, Action::Check);
    room = act(&room, 2, Action::Check);
    room = act(&room, 1, Action::Check);
    let next = room
        .apply(Event::Action {
            seat: 2,
            action: Action::Check,
        })
        .expect("river check");
    let room = next.room;

    // main pot 150 to P1 (trip aces), side pot 120 to P2 (trip kings)
    let showdown = next
        .events
        .iter()
        .find_map(|e| match e {
            Outbound::Showdown { pots, .. } => Some(pots.clone()),
            _ => None,
        })
        .expect("showdown event");
    assert_eq!(showdown.len(), 2);
    assert_eq!(showdown[0].amount, 150);
    assert_eq!(showdown[0].eligible, vec![0, 1, 2]);
    assert_eq!(showdown[0].winners, vec![0]);
    assert_eq!(showdown[1].amount, 120);
    assert_eq!(showdown[1].eligible, vec![1, 2]);
    assert_eq!(showdown[1].winners, vec![1]);

    assert_eq!(room.seats[0].chips, 150);
    assert_eq!(room.seats[1].chips, 210);
    assert_eq!(room.seats[2].chips, 90);
}

#[test]
fn side_pot_amounts_sum_to_the_pot() {
    let mut room = Room::new("r1", "table", "p1", 10, 10, None, Utc::now()).expect("room");
    for (id, stack) in [("p1", 40), ("p2", 90), ("p3", 300), ("p4", 300)] {
        room = room.join(id, id, stack).expect("join");
    }
    let room = apply(&room, Event::StartHand { seed: 77 });

    // everyone shoves preflop at three distinct stack levels
    let mut room = room;
    while let Some(turn) = room.hand.as_ref().and_then(|h| h.current_turn) {
        room = act(&room, turn, Action::AllIn);
    }

    // the hand ran out and every chip was paid back out
    assert!(room.hand.is_none());
    let total: u32 = room.seats.iter().map(|s| s.chips).sum();
    assert_eq!(total, 40 + 90 + 300 + 300);
}

#[test]
fn folded_contributions_stay_in_the_pot_without_eligibility() {
    let room = {
        let mut r = Room::new("r1", "table", "p1", 10, 10, None, Utc::now()).expect("room");
        for id in ["p1", "p2", "p3"] {
            r = r.join(id, id, 500).expect("join");
        }
        r
    };
    let room = apply(&room, Event::StartHand { seed: 21 });

    // seat 0 raises then folds to a re-raise; its 60 stays in the pot
    let room = act(&room, 0, Action::Raise(50));
    let room = act(&room, 1, Action::Raise(90)); // to 150
    let room = act(&room, 2, Action::Fold);
    let room = act(&room, 0, Action::Fold);

    assert!(room.hand.is_none());
    // winner collected blinds plus the folded raise
    assert_eq!(room.seats[1].chips, 500 - 150 + 150 + 60 + 10);
}
