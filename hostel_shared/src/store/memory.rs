use std::collections::{btree_map::Entry, BTreeMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{error::StorageError, room::Room, store::RoomStore};

#[derive(Debug, Default)]
pub struct MemoryStore {
    rooms: RwLock<BTreeMap<String, Room>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomStore for MemoryStore {
    async fn fetch(&self, room_number: &str) -> Result<Option<Room>, StorageError> {
        Ok(self.rooms.read().await.get(room_number).cloned())
    }

    async fn fetch_all(&self) -> Result<Vec<Room>, StorageError> {
        Ok(self.rooms.read().await.values().cloned().collect())
    }

    async fn insert(&self, room: &Room) -> Result<(), StorageError> {
        let mut rooms = self.rooms.write().await;
        match rooms.entry(room.get_room_number().to_string()) {
            Entry::Occupied(e) => Err(StorageError::Conflict(e.key().clone())),
            Entry::Vacant(e) => {
                e.insert(room.clone());
                Ok(())
            }
        }
    }

    async fn replace(&self, room: &Room) -> Result<(), StorageError> {
        let mut rooms = self.rooms.write().await;
        match rooms.get_mut(room.get_room_number()) {
            Some(stored) => {
                *stored = room.clone();
                Ok(())
            }
            None => Err(StorageError::Conflict(room.get_room_number().to_string())),
        }
    }
}
