pub mod clock;
pub mod error;
pub mod inventory;
pub mod room;
pub mod seed;
pub mod store;

pub use crate::{
    clock::{Clock, FixedClock, SystemClock},
    error::{InventoryError, StorageError},
    inventory::{BookableFilter, BookableRooms, RoomInventory, SeedReport},
    room::{NewRoom, Room, RoomDetails, RoomStatus},
    store::{MemoryStore, MongoStore, RoomStore},
};
