pub mod health;
pub mod room;
pub mod sse;

pub use health::health;
pub use room::{
    act, create_room, end_room, get_room, join_room, leave_room, list_rooms, start_hand,
    ActRequest, CreateRoomRequest, PlayerRequest,
};
pub use sse::{stream_events, unsubscribe};
