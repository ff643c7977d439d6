//! Domain layer: value objects, entities, the room registry, the identity
//! mapping, the error taxonomy, and the message-delivery abstraction.

pub mod entity;
pub mod error;
pub mod identity_map;
pub mod pusher;
pub mod registry;
pub mod value_object;

pub use entity::{Participant, Room, StoredMessage, HISTORY_LIMIT, ROOM_CAPACITY};
pub use error::SignalingError;
pub use identity_map::IdentityMap;
pub use pusher::{MessagePushError, MessagePusher, PusherChannel, PusherFrame};
#[cfg(test)]
pub use pusher::MockMessagePusher;
pub use registry::{RemoveOutcome, RoomRegistry};
pub use value_object::{ConnId, Identity, RoomCode, Timestamp};
