use holdem_engine::rules::Action;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::{self, Response};
use warp::Reply;

use crate::errors::{ErrorResponse, IntoErrorResponse};
use crate::rooms::{CreateRoomParams, RoomManager};
use crate::views::RoomView;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub name: String,
    pub creator_id: String,
    #[serde(default = "default_seat_limit")]
    pub seat_limit: usize,
    pub min_bet: u32,
    #[serde(default)]
    pub max_bet: Option<u32>,
}

fn default_seat_limit() -> usize {
    10
}

/// Body shared by join/leave/start/end: just the authenticated caller.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRequest {
    pub player_id: String,
}

/// Action names exactly as the wire allows them; anything else fails
/// deserialization before it reaches the engine.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionName {
    Fold,
    Check,
    Call,
    Bet,
    Raise,
    AllIn,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActRequest {
    pub player_id: String,
    pub action: ActionName,
    #[serde(default)]
    pub amount: Option<u32>,
}

impl ActRequest {
    fn into_action(self) -> Result<(String, Action), ErrorResponse> {
        let action = match (self.action, self.amount) {
            (ActionName::Fold, _) => Action::Fold,
            (ActionName::Check, _) => Action::Check,
            (ActionName::Call, _) => Action::Call,
            (ActionName::AllIn, _) => Action::AllIn,
            (ActionName::Bet, Some(amount)) => Action::Bet(amount),
            (ActionName::Raise, Some(amount)) => Action::Raise(amount),
            (ActionName::Bet, None) | (ActionName::Raise, None) => {
                return Err(ErrorResponse::new(
                    "missing_amount",
                    "bet and raise require an amount",
                ));
            }
        };
        Ok((self.player_id, action))
    }
}

/// Creates a room and seats the creator.
///
/// `POST /api/rooms` with `{name, creatorId, seatLimit, minBet, maxBet}`;
/// responds 201 with the creator's redacted room snapshot.
pub async fn create_room(manager: Arc<RoomManager>, request: CreateRoomRequest) -> Response {
    let params = CreateRoomParams {
        name: request.name,
        creator: request.creator_id,
        seat_limit: request.seat_limit,
        min_bet: request.min_bet,
        max_bet: request.max_bet,
    };
    let creator = params.creator.clone();
    match manager.create_room(params) {
        Ok(room) => reply::with_status(
            reply::json(&RoomView::redacted(&room, Some(&creator))),
            StatusCode::CREATED,
        )
        .into_response(),
        Err(err) => err.into_http_response(),
    }
}

/// Lobby listing: waiting rooms with open seats, newest first.
///
/// `GET /api/rooms`.
pub async fn list_rooms(manager: Arc<RoomManager>) -> Response {
    match manager.list_rooms() {
        Ok(summaries) => reply::json(&summaries).into_response(),
        Err(err) => err.into_http_response(),
    }
}

/// Fetches one room, redacted for `player` when given (spectator view
/// otherwise).
///
/// `GET /api/rooms/{id}?player=...`.
pub async fn get_room(
    manager: Arc<RoomManager>,
    room_id: String,
    player: Option<String>,
) -> Response {
    match manager.view(&room_id, player.as_deref()).await {
        Ok(view) => reply::json(&view).into_response(),
        Err(err) => err.into_http_response(),
    }
}

/// `POST /api/rooms/{id}/join`. Idempotent while the caller holds a seat.
pub async fn join_room(
    manager: Arc<RoomManager>,
    room_id: String,
    request: PlayerRequest,
) -> Response {
    match manager.join_room(&room_id, &request.player_id).await {
        Ok(room) => {
            reply::json(&RoomView::redacted(&room, Some(&request.player_id))).into_response()
        }
        Err(err) => err.into_http_response(),
    }
}

/// `POST /api/rooms/{id}/leave`. Idempotent.
pub async fn leave_room(
    manager: Arc<RoomManager>,
    room_id: String,
    request: PlayerRequest,
) -> Response {
    match manager.leave_room(&room_id, &request.player_id).await {
        Ok(room) => reply::json(&RoomView::redacted(&room, None)).into_response(),
        Err(err) => err.into_http_response(),
    }
}

/// `POST /api/rooms/{id}/start`. Creator only; fails while a hand runs or
/// with fewer than two funded seats.
pub async fn start_hand(
    manager: Arc<RoomManager>,
    room_id: String,
    request: PlayerRequest,
) -> Response {
    match manager.start_hand(&room_id, &request.player_id).await {
        Ok(room) => {
            reply::json(&RoomView::redacted(&room, Some(&request.player_id))).into_response()
        }
        Err(err) => err.into_http_response(),
    }
}

/// Applies one betting action for the caller's seat.
///
/// `POST /api/rooms/{id}/actions` with
/// `{playerId, action: "fold"|"check"|"call"|"bet"|"raise"|"all-in", amount?}`.
pub async fn act(manager: Arc<RoomManager>, room_id: String, request: ActRequest) -> Response {
    let (player, action) = match request.into_action() {
        Ok(parsed) => parsed,
        Err(body) => return body.into_response(StatusCode::BAD_REQUEST),
    };
    match manager.act(&room_id, &player, action).await {
        Ok(room) => reply::json(&RoomView::redacted(&room, Some(&player))).into_response(),
        Err(err) => err.into_http_response(),
    }
}

/// `POST /api/rooms/{id}/end`. Creator only; force-resolves any hand and
/// destroys the room, returning the final snapshot.
pub async fn end_room(
    manager: Arc<RoomManager>,
    room_id: String,
    request: PlayerRequest,
) -> Response {
    match manager.end_room(&room_id, &request.player_id).await {
        Ok(room) => reply::json(&RoomView::redacted(&room, None)).into_response(),
        Err(err) => err.into_http_response(),
    }
}
