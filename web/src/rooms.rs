use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::Utc;
use holdem_engine::machine::{Room, RoomStatus};
use holdem_engine::rules::Action;
use uuid::Uuid;

use crate::coordinator::{store_key, RoomHandle, RoomRequest, TimerConfig};
use crate::errors::RoomError;
use crate::events::{Envelope, RoomBus, Subscription};
use crate::store::SnapshotStore;
use crate::views::{RoomSummary, RoomView};

/// Room creation parameters as they arrive from the API.
#[derive(Debug, Clone)]
pub struct CreateRoomParams {
    pub name: String,
    pub creator: String,
    pub seat_limit: usize,
    pub min_bet: u32,
    pub max_bet: Option<u32>,
}

/// Directory of live rooms plus the front door to their coordinators.
///
/// The registry itself is a thin index: the snapshot store is the source of
/// truth, and a room found there but not in the map is rehydrated into a
/// fresh worker on first touch.
pub struct RoomManager {
    rooms: RwLock<HashMap<String, RoomHandle>>,
    store: Arc<dyn SnapshotStore>,
    bus: RoomBus,
    timers: TimerConfig,
}

/// A player's open push channel plus the hooks that fire the disconnect
/// flow when it closes.
pub struct PlayerFeed {
    pub subscription: Subscription,
    bus: RoomBus,
    handle: RoomHandle,
    room_id: String,
    player: String,
}

impl Drop for PlayerFeed {
    fn drop(&mut self) {
        self.subscription.close();
        // a second tab may still be attached; only the last closed channel
        // marks the player disconnected
        if !self.bus.has_subscriber(&self.room_id, &self.player) {
            self.handle.notify(RoomRequest::Disconnect {
                player: self.player.clone(),
            });
        }
    }
}

impl RoomManager {
    pub fn new(store: Arc<dyn SnapshotStore>, bus: RoomBus, timers: TimerConfig) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            store,
            bus,
            timers,
        }
    }

    pub fn bus(&self) -> &RoomBus {
        &self.bus
    }

    /// Creates a room, seats the creator, persists the initial snapshot
    /// and spawns the room worker.
    pub fn create_room(&self, params: CreateRoomParams) -> Result<Room, RoomError> {
        let id = Uuid::new_v4().to_string();
        let room = Room::new(
            &id,
            params.name,
            &params.creator,
            params.seat_limit,
            params.min_bet,
            params.max_bet,
            Utc::now(),
        )?
        .join(
            &params.creator,
            &params.creator,
            params
                .min_bet
                .saturating_mul(crate::coordinator::BUYIN_BIG_BLINDS),
        )?;

        let snapshot = serde_json::to_value(&room).map_err(|_| RoomError::Closed)?;
        self.store
            .put(&store_key(&id), snapshot)
            .map_err(|_| RoomError::Degraded)?;

        let handle = RoomHandle::spawn(
            room.clone(),
            Arc::clone(&self.store),
            self.bus.clone(),
            self.timers,
        );
        self.rooms
            .write()
            .expect("room map lock poisoned")
            .insert(id.clone(), handle);

        tracing::info!(
            room_id = %id,
            creator = %room.creator,
            seat_limit = room.seat_limit,
            min_bet = room.min_bet,
            "room created"
        );
        Ok(room)
    }

    pub async fn join_room(&self, room_id: &str, player: &str) -> Result<Room, RoomError> {
        let handle = self.handle_for(room_id)?;
        handle
            .request(RoomRequest::Join {
                player: player.to_string(),
                username: player.to_string(),
            })
            .await
    }

    pub async fn leave_room(&self, room_id: &str, player: &str) -> Result<Room, RoomError> {
        let handle = self.handle_for(room_id)?;
        let room = handle
            .request(RoomRequest::Leave {
                player: player.to_string(),
            })
            .await?;
        // the last seat leaving destroys the room
        if room.present_count() == 0 {
            self.teardown(room_id).await;
        }
        Ok(room)
    }

    pub async fn start_hand(&self, room_id: &str, player: &str) -> Result<Room, RoomError> {
        let handle = self.handle_for(room_id)?;
        handle
            .request(RoomRequest::Start {
                player: player.to_string(),
                seed: rand::random(),
            })
            .await
    }

    pub async fn act(
        &self,
        room_id: &str,
        player: &str,
        action: Action,
    ) -> Result<Room, RoomError> {
        let handle = self.handle_for(room_id)?;
        handle
            .request(RoomRequest::Act {
                player: player.to_string(),
                action,
            })
            .await
    }

    /// Creator tears the room down; any running hand is force-resolved
    /// first and the final snapshot returned.
    pub async fn end_room(&self, room_id: &str, player: &str) -> Result<Room, RoomError> {
        let handle = self.handle_for(room_id)?;
        let room = handle
            .request(RoomRequest::End {
                player: player.to_string(),
            })
            .await?;
        self.teardown(room_id).await;
        Ok(room)
    }

    pub async fn snapshot(&self, room_id: &str) -> Result<Room, RoomError> {
        let handle = self.handle_for(room_id)?;
        handle.request(RoomRequest::Snapshot).await
    }

    pub async fn view(&self, room_id: &str, viewer: Option<&str>) -> Result<RoomView, RoomError> {
        let room = self.snapshot(room_id).await?;
        Ok(RoomView::redacted(&room, viewer))
    }

    /// Lobby listing straight off the store: waiting rooms with open
    /// seats, newest first.
    pub fn list_rooms(&self) -> Result<Vec<RoomSummary>, RoomError> {
        let values = self
            .store
            .list_with_prefix("room:")
            .map_err(|_| RoomError::Degraded)?;
        let mut summaries: Vec<RoomSummary> = values
            .into_iter()
            .filter_map(|value| serde_json::from_value::<Room>(value).ok())
            .filter(|room| {
                room.status == RoomStatus::Waiting && room.present_count() < room.seat_limit
            })
            .map(|room| RoomSummary::of(&room))
            .collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(summaries)
    }

    /// Opens a push channel. The first envelope is the current snapshot,
    /// redacted for the subscriber; a seated subscriber is marked
    /// connected, cancelling any reconnect grace timer.
    pub async fn subscribe(
        &self,
        room_id: &str,
        player: &str,
    ) -> Result<(Envelope, PlayerFeed), RoomError> {
        let handle = self.handle_for(room_id)?;
        let room = handle
            .request(RoomRequest::Reconnect {
                player: player.to_string(),
            })
            .await?;
        let subscription = self.bus.subscribe(room_id, player);
        let first = Envelope {
            kind: "snapshot".to_string(),
            event: None,
            room: RoomView::redacted(&room, Some(player)),
        };
        let feed = PlayerFeed {
            subscription,
            bus: self.bus.clone(),
            handle,
            room_id: room_id.to_string(),
            player: player.to_string(),
        };
        Ok((first, feed))
    }

    /// Closes every channel the player holds and runs the disconnect flow.
    pub fn unsubscribe(&self, room_id: &str, player: &str) {
        self.bus.unsubscribe_player(room_id, player);
        if let Some(handle) = self
            .rooms
            .read()
            .expect("room map lock poisoned")
            .get(room_id)
            .cloned()
        {
            handle.notify(RoomRequest::Disconnect {
                player: player.to_string(),
            });
        }
    }

    pub fn active_rooms(&self) -> Vec<String> {
        self.rooms
            .read()
            .expect("room map lock poisoned")
            .keys()
            .cloned()
            .collect()
    }

    fn handle_for(&self, room_id: &str) -> Result<RoomHandle, RoomError> {
        if let Some(handle) = self
            .rooms
            .read()
            .expect("room map lock poisoned")
            .get(room_id)
            .cloned()
        {
            return Ok(handle);
        }
        // not resident: rehydrate from the last persisted snapshot
        let value = self
            .store
            .get(&store_key(room_id))
            .map_err(|_| RoomError::Degraded)?
            .ok_or_else(|| RoomError::NotFound(room_id.to_string()))?;
        let room: Room = serde_json::from_value(value).map_err(|err| {
            tracing::error!(room_id, error = %err, "persisted snapshot unreadable");
            RoomError::Quarantined
        })?;

        let mut guard = self.rooms.write().expect("room map lock poisoned");
        if let Some(handle) = guard.get(room_id) {
            return Ok(handle.clone());
        }
        tracing::info!(room_id, "rehydrating room from snapshot store");
        let handle = RoomHandle::spawn(
            room,
            Arc::clone(&self.store),
            self.bus.clone(),
            self.timers,
        );
        guard.insert(room_id.to_string(), handle.clone());
        Ok(handle)
    }

    async fn teardown(&self, room_id: &str) {
        let handle = self
            .rooms
            .write()
            .expect("room map lock poisoned")
            .remove(room_id);
        if let Some(handle) = handle {
            // let the worker flush its queue (and final broadcasts) first
            let _ = handle.request(RoomRequest::Shutdown).await;
        }
        if let Err(err) = self.store.delete(&store_key(room_id)) {
            tracing::warn!(room_id, error = %err, "failed to delete room snapshot");
        }
        self.bus.drop_room(room_id);
        tracing::info!(room_id, "room destroyed");
    }
}
