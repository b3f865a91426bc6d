use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use warp::http::{self, StatusCode};
use warp::reply::{self, Response};
use warp::sse;
use warp::Reply;

use crate::errors::IntoErrorResponse;
use crate::events::Envelope;
use crate::rooms::{PlayerFeed, RoomManager};

/// Opens the push channel for `(room, player)`.
///
/// `GET /api/rooms/{id}/events?player=...` as server-sent events. The first
/// message is the current redacted snapshot; every following message is an
/// event envelope carrying the updated snapshot. Closing the stream runs
/// the coordinator's disconnect flow.
pub async fn stream_events(
    manager: Arc<RoomManager>,
    room_id: String,
    player: Option<String>,
) -> Response {
    let Some(player) = player else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "missing_player",
            "the `player` query parameter is required".to_string(),
        );
    };
    match manager.subscribe(&room_id, &player).await {
        Ok((first, feed)) => {
            let stream = feed_stream(first, feed);
            let keep_alive = sse::keep_alive()
                .interval(Duration::from_secs(15))
                .text(":keep-alive\n");
            let reply = sse::reply(keep_alive.stream(stream));
            reply::with_header(reply, http::header::CACHE_CONTROL, "no-cache").into_response()
        }
        Err(err) => err.into_http_response(),
    }
}

/// Closes every channel the player holds on the room.
///
/// `DELETE /api/rooms/{id}/events?player=...`.
pub async fn unsubscribe(
    manager: Arc<RoomManager>,
    room_id: String,
    player: Option<String>,
) -> Response {
    let Some(player) = player else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "missing_player",
            "the `player` query parameter is required".to_string(),
        );
    };
    manager.unsubscribe(&room_id, &player);
    reply::json(&serde_json::json!({ "unsubscribed": true })).into_response()
}

fn feed_stream(
    first: Envelope,
    mut feed: PlayerFeed,
) -> impl tokio_stream::Stream<Item = Result<sse::Event, Infallible>> {
    // move the receiver out; the feed itself rides along in the closure so
    // its drop hook fires when the client goes away
    let (_placeholder_tx, placeholder) = mpsc::channel(1);
    let receiver = std::mem::replace(&mut feed.subscription.receiver, placeholder);
    let feed = Arc::new(feed);

    let initial = tokio_stream::once(Ok(render_envelope(&first)));
    let updates = ReceiverStream::new(receiver).map(move |envelope| {
        let _keep_alive = Arc::clone(&feed);
        Ok(render_envelope(&envelope))
    });
    initial.chain(updates)
}

fn render_envelope(envelope: &Envelope) -> sse::Event {
    match serde_json::to_string(envelope) {
        Ok(json) => sse::Event::default().event("room_event").data(json),
        Err(err) => {
            let fallback = serde_json::json!({
                "kind": "error",
                "message": format!("failed to serialize room event: {err}")
            })
            .to_string();
            sse::Event::default().event("room_event").data(fallback)
        }
    }
}

fn error_response(status: StatusCode, error: &'static str, message: String) -> Response {
    #[derive(Serialize)]
    struct ErrorBody<'a> {
        error: &'a str,
        message: String,
    }

    let body = ErrorBody { error, message };
    reply::with_status(reply::json(&body), status).into_response()
}
