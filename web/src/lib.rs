//! # holdem-web: the poker server around the engine
//!
//! Room coordination, turn deadlines, disconnect grace, snapshot
//! persistence, and the HTTP/SSE surface. Each room runs behind a
//! single-writer worker task; the pure engine ([`holdem_engine`]) does the
//! actual poker.

pub mod coordinator;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod logging;
pub mod rooms;
pub mod server;
pub mod store;
pub mod views;

pub use coordinator::{RoomHandle, RoomRequest, TimerConfig};
pub use errors::{ErrorResponse, ErrorSeverity, IntoErrorResponse, RoomError};
pub use events::{Envelope, RoomBus, Subscription};
pub use logging::{init_logging, init_test_logging, TestLogSubscriber};
pub use rooms::{CreateRoomParams, PlayerFeed, RoomManager};
pub use server::{AppContext, ServerConfig, ServerError, ServerHandle, WebServer};
pub use store::{FailingStore, MemoryStore, SnapshotStore, StoreError};
pub use views::{PlayerView, RoomSummary, RoomView};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_provides_shared_components() {
        let ctx = AppContext::new_for_tests();
        assert_eq!(ctx.bus().subscriber_count(), 0);
        assert!(ctx.rooms().active_rooms().is_empty());
    }
}
