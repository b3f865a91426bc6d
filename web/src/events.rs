use holdem_engine::machine::{Outbound, Room};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;

// Bounded per-subscriber queues: a slow consumer is detached rather than
// allowed to slow the coordinator.
const PUSH_QUEUE_CAPACITY: usize = 64;

/// One message on a subscriber's push channel: the event kind, its payload
/// when there is one, and the room snapshot redacted for that subscriber.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<serde_json::Value>,
    pub room: crate::views::RoomView,
}

pub type EnvelopeReceiver = mpsc::Receiver<Envelope>;

/// Open push channel for one (room, player) pair. Dropping it detaches the
/// subscriber from the bus.
pub struct Subscription {
    bus: RoomBus,
    room_id: String,
    subscriber_id: usize,
    pub receiver: EnvelopeReceiver,
}

impl Subscription {
    /// Detaches from the bus immediately instead of at drop time.
    pub fn close(&mut self) {
        self.bus.detach(&self.room_id, &[self.subscriber_id]);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.bus.detach(&self.room_id, &[self.subscriber_id]);
    }
}

#[derive(Debug, Clone)]
struct SubscriberSlot {
    id: usize,
    player: String,
    tx: mpsc::Sender<Envelope>,
}

/// Per-room subscriber sets. Guarded by its own lock, separate from any
/// room's command queue, and only ever touched by the publish path and the
/// connection lifecycle.
#[derive(Debug, Clone, Default)]
pub struct RoomBus {
    inner: Arc<RoomBusInner>,
}

#[derive(Debug, Default)]
struct RoomBusInner {
    subscribers: RwLock<HashMap<String, Vec<SubscriberSlot>>>,
    next_id: AtomicUsize,
}

impl RoomBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a subscriber and returns its channel. The caller is
    /// expected to push the current snapshot as the first message.
    pub fn subscribe(&self, room_id: &str, player: &str) -> Subscription {
        let (tx, receiver) = mpsc::channel(PUSH_QUEUE_CAPACITY);
        let id = self.inner.next_id.fetch_add(1, Ordering::AcqRel);
        {
            let mut guard = self
                .inner
                .subscribers
                .write()
                .expect("subscriber lock poisoned");
            guard
                .entry(room_id.to_string())
                .or_default()
                .push(SubscriberSlot {
                    id,
                    player: player.to_string(),
                    tx,
                });
        }
        tracing::info!(room_id, player, subscriber_id = id, "subscribed to room");
        Subscription {
            bus: self.clone(),
            room_id: room_id.to_string(),
            subscriber_id: id,
            receiver,
        }
    }

    /// Renders a per-subscriber view of `room` and pushes one envelope per
    /// subscriber. Never blocks: full queues get the subscriber detached.
    pub fn publish(&self, room_id: &str, kind: &str, event: Option<serde_json::Value>, room: &Room) {
        let subscribers = {
            let guard = self
                .inner
                .subscribers
                .read()
                .expect("subscriber lock poisoned");
            match guard.get(room_id) {
                Some(list) => list.clone(),
                None => return,
            }
        };

        tracing::debug!(
            room_id,
            kind,
            subscriber_count = subscribers.len(),
            "publishing room event"
        );

        let mut overflowed = Vec::new();
        for slot in subscribers {
            let envelope = Envelope {
                kind: kind.to_string(),
                event: event.clone(),
                room: crate::views::RoomView::redacted(room, Some(&slot.player)),
            };
            if let Err(err) = slot.tx.try_send(envelope) {
                tracing::warn!(
                    room_id,
                    subscriber_id = slot.id,
                    error = ?err,
                    "subscriber queue full or closed, detaching"
                );
                overflowed.push(slot.id);
            }
        }
        if !overflowed.is_empty() {
            self.detach(room_id, &overflowed);
        }
    }

    /// Publishes one engine transition: every emitted event in order, each
    /// carrying the post-transition snapshot.
    pub fn publish_transition(&self, room_id: &str, events: &[Outbound], room: &Room) {
        for event in events {
            let payload = serde_json::to_value(event).ok();
            self.publish(room_id, kind_of(event), payload, room);
        }
    }

    /// Pushes an error envelope; the channel itself stays up.
    pub fn publish_error(&self, room_id: &str, message: &str, room: &Room) {
        self.publish(
            room_id,
            "error",
            Some(serde_json::json!({ "message": message })),
            room,
        );
    }

    pub fn unsubscribe_player(&self, room_id: &str, player: &str) {
        let ids: Vec<usize> = {
            let guard = self
                .inner
                .subscribers
                .read()
                .expect("subscriber lock poisoned");
            guard
                .get(room_id)
                .map(|list| {
                    list.iter()
                        .filter(|s| s.player == player)
                        .map(|s| s.id)
                        .collect()
                })
                .unwrap_or_default()
        };
        if !ids.is_empty() {
            self.detach(room_id, &ids);
        }
    }

    /// True while `player` has at least one open channel to the room.
    pub fn has_subscriber(&self, room_id: &str, player: &str) -> bool {
        let guard = self
            .inner
            .subscribers
            .read()
            .expect("subscriber lock poisoned");
        guard
            .get(room_id)
            .map(|list| list.iter().any(|s| s.player == player))
            .unwrap_or(false)
    }

    pub fn drop_room(&self, room_id: &str) {
        let mut guard = self
            .inner
            .subscribers
            .write()
            .expect("subscriber lock poisoned");
        guard.remove(room_id);
    }

    pub fn subscriber_count(&self) -> usize {
        let guard = self
            .inner
            .subscribers
            .read()
            .expect("subscriber lock poisoned");
        guard.values().map(|list| list.len()).sum()
    }

    fn detach(&self, room_id: &str, ids: &[usize]) {
        let mut guard = self
            .inner
            .subscribers
            .write()
            .expect("subscriber lock poisoned");
        if let Some(list) = guard.get_mut(room_id) {
            list.retain(|s| !ids.contains(&s.id));
            if list.is_empty() {
                guard.remove(room_id);
            }
        }
    }
}

/// Envelope kind string for an engine event, per the streaming contract.
pub fn kind_of(event: &Outbound) -> &'static str {
    match event {
        Outbound::HandStarted { .. } => "handStarted",
        Outbound::ActionApplied { .. } => "actionApplied",
        Outbound::PhaseAdvanced { .. } => "phaseAdvanced",
        Outbound::Showdown { .. } => "showdown",
        Outbound::HandEnded { .. } => "handEnded",
        Outbound::WaitingForPlayers => "waitingForPlayers",
    }
}
