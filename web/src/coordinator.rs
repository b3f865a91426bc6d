use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use holdem_engine::machine::{Event, Outbound, Room, Transition};
use holdem_engine::rules::Action;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::errors::RoomError;
use crate::events::RoomBus;
use crate::store::SnapshotStore;

const PERSIST_ATTEMPTS: u32 = 3;
const PERSIST_BACKOFF: Duration = Duration::from_millis(50);

/// Chips a player sits down with, in big blinds. Wallets are someone
/// else's problem; every seat buys in for the same stack.
pub const BUYIN_BIG_BLINDS: u32 = 100;

pub fn store_key(room_id: &str) -> String {
    format!("room:{room_id}")
}

/// Deadlines the coordinator enforces. Injectable so tests run in
/// milliseconds.
#[derive(Debug, Clone, Copy)]
pub struct TimerConfig {
    /// How long the seat on turn has before it is auto-folded.
    pub turn_deadline: Duration,
    /// How long a disconnected player's seat is held before removal.
    pub disconnect_grace: Duration,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            turn_deadline: Duration::from_secs(30),
            disconnect_grace: Duration::from_secs(60),
        }
    }
}

/// Everything a room can be asked to do. Requests mutate through the
/// engine; `Snapshot` reads the current value; `Shutdown` stops the worker.
#[derive(Debug)]
pub enum RoomRequest {
    Join {
        player: String,
        username: String,
    },
    Leave {
        player: String,
    },
    Start {
        player: String,
        seed: u64,
    },
    Act {
        player: String,
        action: Action,
    },
    End {
        player: String,
    },
    Disconnect {
        player: String,
    },
    Reconnect {
        player: String,
    },
    Timeout {
        seat: usize,
        serial: u64,
    },
    GraceExpired {
        player: String,
    },
    Snapshot,
    Shutdown,
}

pub struct RoomCommand {
    pub request: RoomRequest,
    pub reply: Option<oneshot::Sender<Result<Room, RoomError>>>,
}

/// Entry point to one room's serialized command queue. Cloneable; all
/// clones feed the same FIFO.
#[derive(Clone)]
pub struct RoomHandle {
    tx: mpsc::UnboundedSender<RoomCommand>,
}

impl RoomHandle {
    /// Spawns the single-writer task owning `room` and returns its handle.
    pub fn spawn(
        room: Room,
        store: Arc<dyn SnapshotStore>,
        bus: RoomBus,
        timers: TimerConfig,
    ) -> RoomHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let driver = RoomDriver {
            room,
            rx,
            self_tx: tx.clone(),
            store,
            bus,
            timers,
            turn_timer: None,
            scheduled_serial: None,
            grace_timers: HashMap::new(),
            lifecycle_event: None,
            degraded: false,
            quarantined: false,
        };
        tokio::spawn(driver.run());
        RoomHandle { tx }
    }

    /// Sends a request and waits for the post-apply snapshot.
    pub async fn request(&self, request: RoomRequest) -> Result<Room, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(RoomCommand {
                request,
                reply: Some(reply_tx),
            })
            .map_err(|_| RoomError::Closed)?;
        reply_rx.await.map_err(|_| RoomError::Closed)?
    }

    /// Fire-and-forget enqueue, usable from sync contexts (connection drop
    /// callbacks, timers).
    pub fn notify(&self, request: RoomRequest) {
        let _ = self.tx.send(RoomCommand {
            request,
            reply: None,
        });
    }
}

/// The per-room worker. Owns the room value outright: every transition is
/// applied here, one command at a time, in arrival order.
struct RoomDriver {
    room: Room,
    rx: mpsc::UnboundedReceiver<RoomCommand>,
    self_tx: mpsc::UnboundedSender<RoomCommand>,
    store: Arc<dyn SnapshotStore>,
    bus: RoomBus,
    timers: TimerConfig,
    turn_timer: Option<JoinHandle<()>>,
    scheduled_serial: Option<u64>,
    grace_timers: HashMap<String, JoinHandle<()>>,
    /// Join/leave envelope queued by the request being handled, published
    /// ahead of the engine events it caused.
    lifecycle_event: Option<(&'static str, serde_json::Value)>,
    degraded: bool,
    quarantined: bool,
}

impl RoomDriver {
    async fn run(mut self) {
        while let Some(command) = self.rx.recv().await {
            match command.request {
                RoomRequest::Snapshot => {
                    if let Some(reply) = command.reply {
                        let _ = reply.send(Ok(self.room.clone()));
                    }
                    continue;
                }
                RoomRequest::Shutdown => {
                    if let Some(reply) = command.reply {
                        let _ = reply.send(Ok(self.room.clone()));
                    }
                    break;
                }
                request => self.handle(request, command.reply).await,
            }
        }
        self.abort_timers();
        tracing::debug!(room_id = %self.room.id, "room worker stopped");
    }

    async fn handle(
        &mut self,
        request: RoomRequest,
        reply: Option<oneshot::Sender<Result<Room, RoomError>>>,
    ) {
        if self.quarantined {
            if let Some(reply) = reply {
                let _ = reply.send(Err(RoomError::Quarantined));
            }
            return;
        }
        if self.degraded && !self.try_recover() {
            if let Some(reply) = reply {
                let _ = reply.send(Err(RoomError::Degraded));
            }
            return;
        }

        self.lifecycle_event = None;
        let outcome = self.transition_for(request);
        match outcome {
            Ok(Some(transition)) => {
                if let Err(violation) = transition.room.check_invariants() {
                    // a broken transition never becomes the room's state
                    tracing::error!(
                        room_id = %self.room.id,
                        error = %violation,
                        "invariant violation, quarantining room"
                    );
                    self.quarantined = true;
                    self.abort_timers();
                    self.bus.publish_error(
                        &self.room.id,
                        "room quarantined after an internal fault",
                        &self.room,
                    );
                    if let Some(reply) = reply {
                        let _ = reply.send(Err(RoomError::Rules(violation)));
                    }
                    return;
                }

                let Transition { mut room, events } = transition;
                room.updated_at = Utc::now();
                self.room = room;
                if let Some(reply) = reply {
                    let _ = reply.send(Ok(self.room.clone()));
                }
                self.after_apply(&events).await;
            }
            Ok(None) => {
                // no state change (stale timer, unknown grace expiry)
                if let Some(reply) = reply {
                    let _ = reply.send(Ok(self.room.clone()));
                }
            }
            Err(err) => {
                if let Some(reply) = reply {
                    let _ = reply.send(Err(err));
                }
            }
        }
    }

    /// Maps a request onto an engine transition. `Ok(None)` means the
    /// request dissolved into nothing (idempotent no-ops).
    fn transition_for(&mut self, request: RoomRequest) -> Result<Option<Transition>, RoomError> {
        match request {
            RoomRequest::Join { player, username } => {
                let chips = self.room.min_bet.saturating_mul(BUYIN_BIG_BLINDS);
                match self.room.join(&player, &username, chips) {
                    Ok(room) => {
                        self.lifecycle_event =
                            Some(("playerJoined", serde_json::json!({ "player": player })));
                        Ok(Some(Transition {
                            room,
                            events: Vec::new(),
                        }))
                    }
                    // re-join while holding a seat is idempotent
                    Err(holdem_engine::errors::EngineError::AlreadySeated(_)) => Ok(None),
                    Err(err) => Err(err.into()),
                }
            }
            RoomRequest::Leave { player } => {
                self.cancel_grace(&player);
                match self.room.leave(&player) {
                    Ok(transition) => {
                        self.lifecycle_event =
                            Some(("playerLeft", serde_json::json!({ "player": player })));
                        Ok(Some(transition))
                    }
                    // leaving twice is an ack, not an error
                    Err(holdem_engine::errors::EngineError::SeatNotFound(_)) => Ok(None),
                    Err(err) => Err(err.into()),
                }
            }
            RoomRequest::Start { player, seed } => {
                if player != self.room.creator {
                    return Err(RoomError::NotCreator);
                }
                Ok(Some(self.room.apply(Event::StartHand { seed })?))
            }
            RoomRequest::Act { player, action } => {
                let seat = self.room.seat_of(&player).ok_or_else(|| {
                    RoomError::Rules(holdem_engine::errors::EngineError::SeatNotFound(
                        player.clone(),
                    ))
                })?;
                Ok(Some(self.room.apply(Event::Action { seat, action })?))
            }
            RoomRequest::End { player } => {
                if player != self.room.creator {
                    return Err(RoomError::NotCreator);
                }
                Ok(Some(self.room.apply(Event::ForceEnd)?))
            }
            RoomRequest::Disconnect { player } => {
                let Some(seat) = self.room.seat_of(&player) else {
                    return Ok(None);
                };
                self.start_grace(player);
                Ok(Some(self.room.apply(Event::Disconnect { seat })?))
            }
            RoomRequest::Reconnect { player } => {
                let Some(seat) = self.room.seat_of(&player) else {
                    return Ok(None);
                };
                self.cancel_grace(&player);
                Ok(Some(self.room.apply(Event::Reconnect { seat })?))
            }
            RoomRequest::Timeout { seat, serial } => {
                // late timers are expected; the machine no-ops stale ones
                let transition = self.room.apply(Event::Timeout { seat, serial })?;
                Ok(Some(transition))
            }
            RoomRequest::GraceExpired { player } => {
                self.grace_timers.remove(&player);
                match self.room.seat_of(&player) {
                    Some(seat) if !self.room.seats[seat].connected => {
                        tracing::info!(
                            room_id = %self.room.id,
                            player,
                            "reconnect grace expired, removing seat"
                        );
                        let transition = self.room.leave(&player).ok();
                        if transition.is_some() {
                            self.lifecycle_event =
                                Some(("playerLeft", serde_json::json!({ "player": player })));
                        }
                        Ok(transition)
                    }
                    _ => Ok(None),
                }
            }
            RoomRequest::Snapshot | RoomRequest::Shutdown => unreachable!("handled by run()"),
        }
    }

    /// Post-apply duties: persist the snapshot, keep the turn timer in step
    /// with the turn serial, then fan the events out. None of this holds up
    /// the caller, who was answered from the applied value already.
    async fn after_apply(&mut self, events: &[Outbound]) {
        if !self.persist().await {
            self.degraded = true;
            self.bus.publish_error(
                &self.room.id,
                "room state could not be persisted; recent actions may be lost",
                &self.room,
            );
            self.reload_last_good();
        }
        self.reschedule_turn_timer();
        if let Some((kind, payload)) = self.lifecycle_event.take() {
            self.bus
                .publish(&self.room.id, kind, Some(payload), &self.room);
        }
        if !events.is_empty() {
            self.bus.publish_transition(&self.room.id, events, &self.room);
        }
    }

    async fn persist(&self) -> bool {
        let snapshot = match serde_json::to_value(&self.room) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::error!(room_id = %self.room.id, error = %err, "snapshot serialization failed");
                return false;
            }
        };
        let key = store_key(&self.room.id);
        for attempt in 0..PERSIST_ATTEMPTS {
            match self.store.put(&key, snapshot.clone()) {
                Ok(()) => return true,
                Err(err) => {
                    tracing::warn!(
                        room_id = %self.room.id,
                        attempt,
                        error = %err,
                        "snapshot write failed"
                    );
                    tokio::time::sleep(PERSIST_BACKOFF * 2u32.pow(attempt)).await;
                }
            }
        }
        false
    }

    /// One write attempt against a degraded store; success clears the flag.
    fn try_recover(&mut self) -> bool {
        let Ok(snapshot) = serde_json::to_value(&self.room) else {
            return false;
        };
        if self.store.put(&store_key(&self.room.id), snapshot).is_ok() {
            tracing::info!(room_id = %self.room.id, "store recovered, room back in service");
            self.degraded = false;
            true
        } else {
            false
        }
    }

    fn reload_last_good(&mut self) {
        match self.store.get(&store_key(&self.room.id)) {
            Ok(Some(value)) => match serde_json::from_value::<Room>(value) {
                Ok(room) => {
                    tracing::info!(room_id = %room.id, "reloaded last persisted snapshot");
                    self.room = room;
                    self.reschedule_turn_timer();
                }
                Err(err) => {
                    tracing::error!(error = %err, "persisted snapshot is unreadable");
                }
            },
            _ => {
                tracing::warn!(room_id = %self.room.id, "no persisted snapshot to reload");
            }
        }
    }

    /// (Re)arms the auto-fold timer whenever the turn serial moved.
    /// Cancellation is best-effort: a timer that already fired enqueues a
    /// `Timeout` the machine will recognize as stale.
    fn reschedule_turn_timer(&mut self) {
        let target = self
            .room
            .hand
            .as_ref()
            .and_then(|h| h.current_turn)
            .map(|seat| (seat, self.room.turn_serial));
        match target {
            Some((seat, serial)) => {
                if self.scheduled_serial == Some(serial) {
                    return;
                }
                if let Some(timer) = self.turn_timer.take() {
                    timer.abort();
                }
                let tx = self.self_tx.clone();
                let deadline = self.timers.turn_deadline;
                self.turn_timer = Some(tokio::spawn(async move {
                    tokio::time::sleep(deadline).await;
                    let _ = tx.send(RoomCommand {
                        request: RoomRequest::Timeout { seat, serial },
                        reply: None,
                    });
                }));
                self.scheduled_serial = Some(serial);
            }
            None => {
                if let Some(timer) = self.turn_timer.take() {
                    timer.abort();
                }
                self.scheduled_serial = None;
            }
        }
    }

    fn start_grace(&mut self, player: String) {
        self.cancel_grace(&player);
        let tx = self.self_tx.clone();
        let grace = self.timers.disconnect_grace;
        let key = player.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            let _ = tx.send(RoomCommand {
                request: RoomRequest::GraceExpired { player },
                reply: None,
            });
        });
        self.grace_timers.insert(key, timer);
    }

    fn cancel_grace(&mut self, player: &str) {
        if let Some(timer) = self.grace_timers.remove(player) {
            timer.abort();
        }
    }

    fn abort_timers(&mut self) {
        if let Some(timer) = self.turn_timer.take() {
            timer.abort();
        }
        for (_, timer) in self.grace_timers.drain() {
            timer.abort();
        }
    }
}
