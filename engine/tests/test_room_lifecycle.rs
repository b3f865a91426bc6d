use chrono::Utc;
use holdem_engine::errors::EngineError;
use holdem_engine::machine::{Event, Outbound, Room, RoomStatus};
use holdem_engine::rules::Action;

fn room_with(stacks: &[u32]) -> Room {
    let mut room = Room::new("r1", "table", "p1", 3, 10, None, Utc::now()).expect("room");
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

#[test]
fn join_rules() {
    let room = room_with(&[1000, 1000, 1000]);
    assert_eq!(
        room.join("p1", "p1", 500).expect_err("duplicate"),
        EngineError::AlreadySeated("p1".into())
    );
    assert_eq!(
        room.join("p4", "p4", 500).expect_err("full"),
        EngineError::RoomFull(3)
    );

    let playing = apply(&room_with(&[1000, 1000]), Event::StartHand { seed: 1 });
    assert_eq!(
        playing.join("p9", "p9", 500).expect_err("mid-hand"),
        EngineError::NotAcceptingPlayers
    );
}

#[test]
fn timeout_on_turn_folds_the_seat() {
    let room = room_with(&[1000, 1000, 1000]);
    let room = apply(&room, Event::StartHand { seed: 2 });
    let serial = room.turn_serial;

    let next = room
        .apply(Event::Timeout { seat: 0, serial })
        .expect("timeout");
    assert!(next.room.seats[0].folded);
    assert!(next
        .events
        .iter()
        .any(|e| matches!(e, Outbound::ActionApplied { seat: 0, action: Action::Fold })));
    // turn moved on
    assert_eq!(
        next.room.hand.as_ref().expect("hand").current_turn,
        Some(1)
    );
}

#[test]
fn stale_timeout_is_a_no_op() {
    let room = room_with(&[1000, 1000, 1000]);
    let room = apply(&room, Event::StartHand { seed: 2 });
    let stale_serial = room.turn_serial;

    // the player acts before the timer's event is drained
    let room = apply(
        &room,
        Event::Action {
            seat: 0,
            action: Action::Call,
        },
    );
    let next = room
        .apply(Event::Timeout {
            seat: 0,
            serial: stale_serial,
        })
        .expect("stale timeout");
    assert!(next.events.is_empty());
    assert_eq!(next.room, room);

    // a timeout for a seat that is not on turn is equally ignored
    let next = room
        .apply(Event::Timeout {
            seat: 2,
            serial: room.turn_serial,
        })
        .expect("off-turn timeout");
    assert!(next.events.is_empty());
}

#[test]
fn disconnect_keeps_seat_and_cards_until_reconnect() {
    let room = room_with(&[1000, 1000, 1000]);
    let room = apply(&room, Event::StartHand { seed: 4 });
    let hole = room.seats[1].hole.clone();

    let room = apply(&room, Event::Disconnect { seat: 1 });
    assert!(!room.seats[1].connected);
    assert_eq!(room.seats[1].hole, hole);
    // presence does not touch the turn
    assert_eq!(room.hand.as_ref().expect("hand").current_turn, Some(0));

    let room = apply(&room, Event::Reconnect { seat: 1 });
    assert!(room.seats[1].connected);
    assert_eq!(room.seats[1].hole, hole);
}

#[test]
fn leave_outside_a_hand_removes_the_seat() {
    let room = room_with(&[1000, 1000, 1000]);
    let next = room.leave("p2").expect("leave");
    assert_eq!(next.room.seats.len(), 2);
    assert!(next.room.seat_of("p2").is_none());
}

#[test]
fn leave_mid_hand_folds_and_can_end_the_hand() {
    let room = room_with(&[1000, 1000]);
    let room = apply(&room, Event::StartHand { seed: 5 });

    let next = room.leave("p1").expect("leave during hand");
    // hand resolved single-winner; seat purged at settlement
    assert!(next.room.hand.is_none());
    assert!(next.room.seat_of("p1").is_none());
    assert_eq!(next.room.seats.len(), 1);
    assert_eq!(next.room.seats[0].chips, 1005);
    assert!(next
        .events
        .iter()
        .any(|e| matches!(e, Outbound::HandEnded { .. })));
    assert_eq!(next.room.status, RoomStatus::Finished);
}

#[test]
fn leave_mid_hand_with_three_keeps_playing() {
    let room = room_with(&[1000, 1000, 1000]);
    let room = apply(&room, Event::StartHand { seed: 5 });

    // seat 1 departs out of turn; hand continues heads-up
    let next = room.leave("p2").expect("leave");
    let room = next.room;
    room.check_invariants().expect("invariants");
    assert!(room.hand.is_some());
    // the seat lingers folded until settlement but is not shown
    assert_eq!(room.present_count(), 2);
    assert!(room.seats[1].folded);
    assert!(room.seats[1].departed);

    // finish the hand: the departed seat is gone afterwards
    let room = apply(
        &room,
        Event::Action {
            seat: 0,
            action: Action::Fold,
        },
    );
    assert!(room.hand.is_none());
    assert_eq!(room.seats.len(), 2);
    assert!(room.seat_of("p2").is_none());
}

#[test]
fn departing_dealer_passes_the_button_to_the_next_seat() {
    let room = room_with(&[1000, 1000, 1000]);
    let room = apply(&room, Event::StartHand { seed: 5 });

    // the dealer leaves mid-hand; p2 then folds and p3 collects
    let room = room.leave("p1").expect("dealer leaves").room;
    room.check_invariants().expect("invariants");
    let room = apply(
        &room,
        Event::Action {
            seat: 1,
            action: Action::Fold,
        },
    );

    assert!(room.hand.is_none());
    assert!(room.seat_of("p1").is_none());
    // the button moves one seat clockwise of the vacated dealer, not two
    assert_eq!(room.seat_of("p2"), Some(room.dealer));
    assert_eq!(room.seats[room.seat_of("p3").expect("p3")].chips, 1005);
}

#[test]
fn departing_dealer_rotation_wraps_past_the_end() {
    let mut room = room_with(&[1000, 1000, 1000]);
    // put the button on the last seat
    room.dealer = 2;
    let room = apply(&room, Event::StartHand { seed: 5 });
    assert!(room.seats[2].is_dealer);

    let room = room.leave("p3").expect("dealer leaves").room;
    room.check_invariants().expect("invariants");
    let room = apply(
        &room,
        Event::Action {
            seat: 0,
            action: Action::Fold,
        },
    );

    assert!(room.hand.is_none());
    assert!(room.seat_of("p3").is_none());
    // clockwise of the vacated last seat is the first seat
    assert_eq!(room.seat_of("p1"), Some(room.dealer));
}

#[test]
fn force_end_without_hand_finishes_the_room() {
    let room = room_with(&[1000, 1000]);
    let room = apply(&room, Event::ForceEnd);
    assert_eq!(room.status, RoomStatus::Finished);
}

#[test]
fn force_end_mid_hand_runs_out_the_board_and_settles() {
    let room = room_with(&[1000, 1000, 1000]);
    let room = apply(&room, Event::StartHand { seed: 6 });
    let room = apply(
        &room,
        Event::Action {
            seat: 0,
            action: Action::Call,
        },
    );

    let next = room.apply(Event::ForceEnd).expect("force end");
    assert!(next.room.hand.is_none());
    assert_eq!(next.room.status, RoomStatus::Finished);
    assert!(next
        .events
        .iter()
        .any(|e| matches!(e, Outbound::Showdown { .. })));
    let total: u32 = next.room.seats.iter().map(|s| s.chips).sum();
    assert_eq!(total, 3000);
}

#[test]
fn force_end_with_one_live_seat_awards_without_reveal() {
    let room = room_with(&[1000, 1000]);
    let room = apply(&room, Event::StartHand { seed: 7 });
    let room = apply(
        &room,
        Event::Action {
            seat: 0,
            action: Action::Fold,
        },
    );
    // the fold already settled; ending now just closes the room
    let room = apply(&room, Event::ForceEnd);
    assert_eq!(room.status, RoomStatus::Finished);
}

#[test]
fn last_seat_leaving_finishes_the_room() {
    let room = room_with(&[1000, 1000]);
    let room = room.leave("p1").expect("leave").room;
    let room = room.leave("p2").expect("leave").room;
    assert!(room.seats.is_empty());
    assert_eq!(room.status, RoomStatus::Finished);
}
