use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::{ClientOptions, FindOptions, IndexOptions},
    Client, Collection, IndexModel,
};

use crate::{
    error::{is_duplicate_key, StorageError},
    room::Room,
    store::RoomStore,
};

#[derive(Debug, Clone)]
pub struct MongoStore {
    rooms: Collection<Room>,
}

impl MongoStore {
    // Inits the database connection and the unique room number index
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StorageError> {
        let mut client_options = ClientOptions::parse(uri).await?;
        client_options.app_name = Some("hostel_app".to_string());
        let client = Client::with_options(client_options)?;
        let rooms = client.database(database).collection::<Room>("rooms");

        let index = IndexModel::builder()
            .keys(doc! { "room_number": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        rooms.create_index(index, None).await?;

        Ok(Self { rooms })
    }
}

#[async_trait]
impl RoomStore for MongoStore {
    async fn fetch(&self, room_number: &str) -> Result<Option<Room>, StorageError> {
        let filter = doc! { "room_number": room_number };
        Ok(self.rooms.find_one(filter, None).await?)
    }

    async fn fetch_all(&self) -> Result<Vec<Room>, StorageError> {
        let options = FindOptions::builder()
            .sort(doc! { "room_number": 1 })
            .build();
        let cursor = self.rooms.find(None, options).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn insert(&self, room: &Room) -> Result<(), StorageError> {
        match self.rooms.insert_one(room, None).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => {
                Err(StorageError::Conflict(room.get_room_number().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn replace(&self, room: &Room) -> Result<(), StorageError> {
        let filter = doc! { "room_number": room.get_room_number() };
        let result = self.rooms.replace_one(filter, room, None).await?;

        if result.matched_count == 0 {
            return Err(StorageError::Conflict(room.get_room_number().to_string()));
        }
        Ok(())
    }
}
