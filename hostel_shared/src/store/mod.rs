mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use async_trait::async_trait;

use crate::{error::StorageError, room::Room};

/// Durable storage of rooms keyed by room number.
#[async_trait]
pub trait RoomStore: Send + Sync {
    async fn fetch(&self, room_number: &str) -> Result<Option<Room>, StorageError>;
    /// All rooms ordered by room number
    async fn fetch_all(&self) -> Result<Vec<Room>, StorageError>;
    /// Fails with [`StorageError::Conflict`] when the room number is taken.
    async fn insert(&self, room: &Room) -> Result<(), StorageError>;
    /// Overwrites the whole record of an existing room.
    async fn replace(&self, room: &Room) -> Result<(), StorageError>;
}
