use chrono::Utc;
use holdem_engine::cards::Card;
use holdem_engine::deck::Deck;
use holdem_engine::eval::Category;
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

fn heads_up(stack: u32) -> Room {
    let mut room = Room::new("r1", "table", "p1", 10, 10, None, Utc::now()).expect("room");
    room = room.join("p1", "p1", stack).expect("join");
    room = room.join("p2", "p2", stack).expect("join");
    room
}

/// Royal flush over an ace-high straight, checked down on a stacked deck.
#[test]
fn royal_flush_wins_the_showdown() {
    let room = heads_up(1000);
    // heads-up deal starts left of the dealer: P2, P1, P2, P1
    let deck = Deck::stacked(cards(&[
        "Ad", "Ah", "Kd", "Kh", // holes: P1 gets Ah Kh, P2 gets Ad Kd
        "4d", // burn
        "Qh", "Jh", "Th", // flop
        "4s", // burn
        "2c", // turn
        "4c", // burn
        "3c", // river
    ]));
    let next = room.start_hand_with_deck(deck).expect("start");
    let mut room = next.room;
    room.check_invariants().expect("invariants");
    assert_eq!(room.seats[0].hole, cards(&["Ah", "Kh"]));
    assert_eq!(room.seats[1].hole, cards(&["Ad", "Kd"]));

    room = act(&room, 0, Action::Call);
    room = act(&room, 1, Action::Check);
    for _ in 0..2 {
        room = act(&room, 1, Action::Check);
        room = act(&room, 0, Action::Check);
    }
    room = act(&room, 1, Action::Check);
    let next = room
        .apply(Event::Action {
            seat: 0,
            action: Action::Check,
        })
        .expect("closing check");

    let (reveals, pots) = next
        .events
        .iter()
        .find_map(|e| match e {
            Outbound::Showdown { reveals, pots, .. } => Some((reveals.clone(), pots.clone())),
            _ => None,
        })
        .expect("showdown event");
    let p1 = reveals.iter().find(|r| r.seat == 0).expect("p1 reveal");
    let p2 = reveals.iter().find(|r| r.seat == 1).expect("p2 reveal");
    assert_eq!(p1.evaluation.category, Category::RoyalFlush);
    assert_eq!(p2.evaluation.category, Category::Straight);
    assert_eq!(pots.len(), 1);
    assert_eq!(pots[0].winners, vec![0]);

    assert_eq!(next.room.seats[0].chips, 1010);
    assert_eq!(next.room.seats[1].chips, 990);
}

/// Both seats all-in preflop: the board runs out with burns before the
/// showdown settles the hand.
#[test]
fn preflop_all_ins_run_the_board_out() {
    let room = heads_up(200);
    let room = apply(&room, Event::StartHand { seed: 11 });

    let room = apply(
        &room,
        Event::Action {
            seat: 0,
            action: Action::AllIn,
        },
    );
    let next = room
        .apply(Event::Action {
            seat: 1,
            action: Action::Call,
        })
        .expect("call the shove");

    // hand resolved in one transition: flop, turn, river, then showdown
    let phases = next
        .events
        .iter()
        .filter(|e| matches!(e, Outbound::PhaseAdvanced { .. }))
        .count();
    assert_eq!(phases, 3);
    let community = next
        .events
        .iter()
        .find_map(|e| match e {
            Outbound::Showdown { community, .. } => Some(community.clone()),
            _ => None,
        })
        .expect("showdown event");
    assert_eq!(community.len(), 5);

    // 4 hole cards + 3 burns + 5 board came off the deck
    let total: u32 = next.room.seats.iter().map(|s| s.chips).sum();
    assert_eq!(total, 400);
}

#[test]
fn board_tie_splits_with_odd_chip_clockwise_of_dealer() {
    let mut room = Room::new("r1", "table", "p1", 10, 10, None, Utc::now()).expect("room");
    for id in ["p1", "p2", "p3"] {
        room = room.join(id, id, 1000).expect("join");
    }
    // deal order from the dealer's left: P2, P3, P1
    let deck = Deck::stacked(cards(&[
        "4c", "2s", "2c", "4d", "3s", "3d", // holes
        "5c", // burn
        "Ah", "Kh", "Qh", // flop
        "5d", // burn
        "Jh", // turn
        "5h", // burn
        "Th", // river: a royal flush on the board
    ]));
    let next = room.start_hand_with_deck(deck).expect("start");
    let mut room = next.room;

    // P1 calls, the small blind folds its 5, the big blind checks: pot 25
    room = act(&room, 0, Action::Call);
    room = act(&room, 1, Action::Fold);
    room = act(&room, 2, Action::Check);
    for _ in 0..3 {
        room = act(&room, 2, Action::Check);
        room = act(&room, 0, Action::Check);
    }

    assert!(room.hand.is_none());
    // both live hands play the board; 25 cannot split evenly, and the odd
    // chip lands on the winner closest clockwise to the dealer
    assert_eq!(room.seats[2].chips, 1003);
    assert_eq!(room.seats[0].chips, 1002);
    assert_eq!(room.seats[1].chips, 995);
}

#[test]
fn single_winner_keeps_hole_cards_hidden() {
    let room = heads_up(500);
    let room = apply(&room, Event::StartHand { seed: 13 });
    let next = room
        .apply(Event::Action {
            seat: 0,
            action: Action::Fold,
        })
        .expect("fold");

    assert!(next
        .events
        .iter()
        .all(|e| !matches!(e, Outbound::Showdown { .. })));
    let payouts = next
        .events
        .iter()
        .find_map(|e| match e {
            Outbound::HandEnded { payouts } => Some(payouts.clone()),
            _ => None,
        })
        .expect("hand ended");
    assert_eq!(payouts.len(), 1);
    assert_eq!(payouts[0].seat, 1);
    assert_eq!(payouts[0].amount, 15);
}
