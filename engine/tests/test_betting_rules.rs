use chrono::Utc;
use holdem_engine::errors::EngineError;
use holdem_engine::machine::{Event, Room};
use holdem_engine::rules::Action;

fn room_with(stacks: &[u32]) -> Room {
    let mut room = Room::new("r1", "table", "p1", 10, 10, None, Utc::now()).expect("room");
    for (i, &stack) in stacks.iter().enumerate() {
        let id = format!("p{}", i + 1);
        room = room.join(&id, &id, stack).expect("join");
    }
    room
}

fn apply(room: &Room, event: Event) -> Room {
    let next = room.apply(event).expect("apply event");
    next.room.check_invariants().expect("invariants hold");
    next.room
}

fn act(room: &Room, seat: usize, action: Action) -> Room {
    apply(room, Event::Action { seat, action })
}

#[test]
fn check_facing_a_bet_is_rejected_and_state_unchanged() {
    let room = room_with(&[1000, 1000, 1000]);
    let room = apply(&room, Event::StartHand { seed: 6 });
    let before = room.clone();

    let err = room
        .apply(Event::Action {
            seat: 0,
            action: Action::Check,
        })
        .expect_err("check with a bet open");
    assert_eq!(err, EngineError::CannotCheck);
    assert!(err.is_client_error());
    // turn is still the same seat's and nothing moved
    assert_eq!(room, before);
    assert_eq!(room.hand.as_ref().expect("hand").current_turn, Some(0));
}

#[test]
fn acting_out_of_turn_is_rejected() {
    let room = room_with(&[1000, 1000, 1000]);
    let room = apply(&room, Event::StartHand { seed: 6 });

    let err = room
        .apply(Event::Action {
            seat: 2,
            action: Action::Call,
        })
        .expect_err("seat 2 acted early");
    assert_eq!(err, EngineError::NotYourTurn(2));
}

#[test]
fn bet_below_table_minimum_is_rejected() {
    let room = room_with(&[1000, 1000]);
    let mut room = apply(&room, Event::StartHand { seed: 6 });
    // close preflop to get an open flop round
    room = act(&room, 0, Action::Call);
    room = act(&room, 1, Action::Check);

    let err = room
        .apply(Event::Action {
            seat: 1,
            action: Action::Bet(4),
        })
        .expect_err("undersized bet");
    assert_eq!(
        err,
        EngineError::BetBelowMinimum {
            amount: 4,
            minimum: 10
        }
    );
}

#[test]
fn raise_must_match_previous_raise_increment() {
    let room = room_with(&[1000, 1000, 1000]);
    let room = apply(&room, Event::StartHand { seed: 6 });

    // seat 0 raises by 30 on top of the blind
    let room = act(&room, 0, Action::Raise(30));
    assert_eq!(room.hand.as_ref().expect("hand").current_bet, 40);

    // the next raise must be at least 30 more
    let err = room
        .apply(Event::Action {
            seat: 1,
            action: Action::Raise(20),
        })
        .expect_err("undersized raise");
    assert_eq!(
        err,
        EngineError::RaiseBelowMinimum {
            amount: 20,
            minimum: 30
        }
    );

    let room = act(&room, 1, Action::Raise(30));
    assert_eq!(room.hand.as_ref().expect("hand").current_bet, 70);
}

#[test]
fn raise_monotonicity_within_a_round() {
    let room = room_with(&[1000, 1000, 1000]);
    let mut room = apply(&room, Event::StartHand { seed: 6 });
    let mut last_bet = room.hand.as_ref().expect("hand").current_bet;

    for (seat, action) in [
        (0, Action::Raise(10)),
        (1, Action::Raise(15)),
        (2, Action::Call),
        (0, Action::Call),
    ] {
        room = act(&room, seat, action);
        let hand = room.hand.as_ref().expect("hand");
        if !hand.community.is_empty() {
            // the round closed and the street reset the bet level
            break;
        }
        assert!(hand.current_bet >= last_bet, "current bet never shrinks");
        last_bet = hand.current_bet;
    }
    assert_eq!(last_bet, 35);
}

#[test]
fn big_blind_keeps_the_option_after_limps() {
    let room = room_with(&[1000, 1000, 1000]);
    let mut room = apply(&room, Event::StartHand { seed: 6 });
    room = act(&room, 0, Action::Call);
    room = act(&room, 1, Action::Call);

    // still preflop: the big blind has not spoken
    let hand = room.hand.as_ref().expect("hand");
    assert_eq!(hand.community.len(), 0);
    assert_eq!(hand.current_turn, Some(2));

    // a raise from the option re-opens the round
    room = act(&room, 2, Action::Raise(20));
    assert_eq!(room.hand.as_ref().expect("hand").current_turn, Some(0));
}

#[test]
fn short_all_in_raise_does_not_grow_the_minimum_raise() {
    // seat 2 can only shove 25 over a 40 bet, below the 30 increment
    let room = room_with(&[1000, 1000, 65]);
    let room = apply(&room, Event::StartHand { seed: 6 });

    let room = act(&room, 0, Action::Raise(30)); // to 40
    let room = act(&room, 1, Action::Call);
    let room = act(&room, 2, Action::AllIn); // 65 total, a 25 short raise

    let hand = room.hand.as_ref().expect("hand");
    assert_eq!(hand.current_bet, 65);
    // the increment on a full re-raise is still measured from 30
    assert_eq!(hand.min_raise, 30);
    // earlier actors owe the shortfall but the aggressor is unchanged
    assert_eq!(hand.last_aggressor, Some(0));
    assert_eq!(hand.current_turn, Some(0));

    // calling the shortfall closes the round
    let room = act(&room, 0, Action::Call);
    let room = act(&room, 1, Action::Call);
    assert_eq!(room.hand.as_ref().expect("hand").community.len(), 3);
}

#[test]
fn call_for_less_goes_all_in_without_reopening() {
    let room = room_with(&[1000, 1000, 30]);
    let room = apply(&room, Event::StartHand { seed: 6 });

    let room = act(&room, 0, Action::Raise(40)); // to 50
    let room = act(&room, 1, Action::Call);
    let room = act(&room, 2, Action::Call); // only 30 behind

    // short call ends the round; the flop comes
    let hand = room.hand.as_ref().expect("hand");
    assert!(room.seats[2].all_in);
    assert_eq!(room.seats[2].total_bet, 30);
    assert_eq!(hand.community.len(), 3);
}

#[test]
fn wrong_phase_actions_are_rejected() {
    let room = room_with(&[1000, 1000]);
    let err = room
        .apply(Event::Action {
            seat: 0,
            action: Action::Call,
        })
        .expect_err("no hand yet");
    assert_eq!(err, EngineError::NoHandInProgress);
}

#[test]
fn fold_forfeits_committed_chips() {
    let room = room_with(&[1000, 1000, 1000]);
    let room = apply(&room, Event::StartHand { seed: 6 });
    let room = act(&room, 0, Action::Raise(20)); // commits 30
    let room = act(&room, 1, Action::Fold); // small blind forfeits 5
    let room = act(&room, 2, Action::Call);

    // seat 1 has folded; its street commitment stays in the pot
    assert!(room.seats[1].folded);
    assert_eq!(room.seats[1].total_bet, 5);
    assert_eq!(room.seats[1].chips, 995);
    let hand = room.hand.as_ref().expect("hand");
    assert_eq!(hand.pot, 30 + 30 + 5);
}
