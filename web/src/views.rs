use chrono::{DateTime, Utc};
use holdem_engine::cards::Card;
use holdem_engine::machine::{Phase, Room, RoomStatus};
use serde::{Deserialize, Serialize};

/// Placeholder shown in place of hole cards the viewer may not see.
pub const HIDDEN_CARD: &str = "??";

/// One seat as rendered to a subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub id: String,
    pub username: String,
    pub chips: u32,
    pub bet: u32,
    pub total_bet: u32,
    pub folded: bool,
    pub all_in: bool,
    pub connected: bool,
    pub is_dealer: bool,
    pub is_small_blind: bool,
    pub is_big_blind: bool,
    /// Hole cards in `"Ah"` text form, `"??"` for cards the viewer may not
    /// see, empty when the seat holds no cards.
    pub hand: Vec<String>,
}

/// The wire shape of a room snapshot, redacted for one viewer. The deck is
/// never part of this; nothing a subscriber receives can predict a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    pub id: String,
    pub name: String,
    pub creator: String,
    pub status: RoomStatus,
    pub phase: String,
    pub pot: u32,
    pub current_bet: u32,
    pub current_turn: Option<usize>,
    pub community: Vec<Card>,
    pub players: Vec<PlayerView>,
    pub min_bet: u32,
    pub max_bet: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lobby listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub id: String,
    pub name: String,
    pub creator: String,
    pub current_players: usize,
    pub seat_limit: usize,
    pub min_bet: u32,
    pub max_bet: Option<u32>,
    pub created_at: DateTime<Utc>,
}

fn phase_name(phase: Option<Phase>) -> String {
    match phase {
        None => "idle".to_string(),
        Some(Phase::Preflop) => "preflop".to_string(),
        Some(Phase::Flop) => "flop".to_string(),
        Some(Phase::Turn) => "turn".to_string(),
        Some(Phase::River) => "river".to_string(),
        Some(Phase::Showdown) => "showdown".to_string(),
    }
}

impl RoomView {
    /// Builds the view of `room` as `viewer` is allowed to see it: own hole
    /// cards verbatim, everyone else's hidden. (Showdown reveals travel in
    /// the showdown event itself, since the hand is already settled by the
    /// time this snapshot is taken.)
    pub fn redacted(room: &Room, viewer: Option<&str>) -> RoomView {
        // departed seats are gone as far as subscribers are concerned, so
        // the turn index is remapped onto the visible list
        let mut players = Vec::with_capacity(room.seats.len());
        let mut current_turn = None;
        let engine_turn = room.hand.as_ref().and_then(|h| h.current_turn);
        for (i, seat) in room.seats.iter().enumerate() {
            if seat.departed {
                continue;
            }
            if engine_turn == Some(i) {
                current_turn = Some(players.len());
            }
            let own = viewer == Some(seat.player.as_str());
            let hand = seat
                .hole
                .iter()
                .map(|card| {
                    if own {
                        card.to_string()
                    } else {
                        HIDDEN_CARD.to_string()
                    }
                })
                .collect();
            players.push(PlayerView {
                id: seat.player.clone(),
                username: seat.username.clone(),
                chips: seat.chips,
                bet: seat.bet,
                total_bet: seat.total_bet,
                folded: seat.folded,
                all_in: seat.all_in,
                connected: seat.connected,
                is_dealer: seat.is_dealer,
                is_small_blind: seat.is_small_blind,
                is_big_blind: seat.is_big_blind,
                hand,
            });
        }

        RoomView {
            id: room.id.clone(),
            name: room.name.clone(),
            creator: room.creator.clone(),
            status: room.status,
            phase: phase_name(room.hand.as_ref().map(|h| h.phase)),
            pot: room.hand.as_ref().map(|h| h.pot).unwrap_or(0),
            current_bet: room.hand.as_ref().map(|h| h.current_bet).unwrap_or(0),
            current_turn,
            community: room
                .hand
                .as_ref()
                .map(|h| h.community.clone())
                .unwrap_or_default(),
            players,
            min_bet: room.min_bet,
            max_bet: room.max_bet,
            created_at: room.created_at,
            updated_at: room.updated_at,
        }
    }
}

impl RoomSummary {
    pub fn of(room: &Room) -> RoomSummary {
        RoomSummary {
            id: room.id.clone(),
            name: room.name.clone(),
            creator: room.creator.clone(),
            current_players: room.present_count(),
            seat_limit: room.seat_limit,
            min_bet: room.min_bet,
            max_bet: room.max_bet,
            created_at: room.created_at,
        }
    }
}
