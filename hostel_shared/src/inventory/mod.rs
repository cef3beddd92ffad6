mod bookable;

pub use bookable::{Bookable, BookableFilter, BookableRooms};

use std::{
    collections::HashMap,
    future::Future,
    sync::{Arc, Mutex},
};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use tokio::sync::{Mutex as RoomLock, OwnedMutexGuard};

use crate::{
    clock::Clock,
    error::{InventoryError, StorageError},
    room::{NewRoom, Room, RoomDetails},
    store::RoomStore,
};

/// Outcome of [`RoomInventory::seed`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub created: usize,
    pub skipped: usize,
}

/// Authoritative owner of the hostel rooms.
///
/// Every mutation is validated on a copy of the stored room and written back
/// as a whole record, so a rejected operation leaves the store untouched.
/// Mutations of the same room are serialized, reads work on snapshots.
pub struct RoomInventory {
    store: Arc<dyn RoomStore>,
    clock: Arc<dyn Clock>,
    locks: Mutex<HashMap<String, Arc<RoomLock<()>>>>,
}

impl RoomInventory {
    pub fn new(store: Arc<dyn RoomStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub async fn create_room(&self, spec: NewRoom) -> Result<Room, InventoryError> {
        let room = Room::new(spec)?;
        let room_number = room.get_room_number();
        let _guard = self.lock_room(room_number).await;

        if read_retrying(|| self.store.fetch(room_number)).await?.is_some() {
            debug!("room {} already exists", room_number);
            return Err(InventoryError::DuplicateRoomNumber(room_number.to_string()));
        }

        match self.store.insert(&room).await {
            Ok(()) => {}
            Err(StorageError::Conflict(n)) => return Err(InventoryError::DuplicateRoomNumber(n)),
            Err(e) => return Err(e.into()),
        }

        info!("room {} created as {}", room_number, room.get_status());
        Ok(room)
    }

    pub async fn get_room(&self, room_number: &str) -> Result<Room, InventoryError> {
        read_retrying(|| self.store.fetch(room_number))
            .await?
            .ok_or_else(|| InventoryError::RoomNotFound(room_number.to_string()))
    }

    pub async fn list_rooms(&self) -> Result<Vec<Room>, InventoryError> {
        Ok(read_retrying(|| self.store.fetch_all()).await?)
    }

    pub async fn list_bookable(
        &self,
        filter: BookableFilter,
    ) -> Result<BookableRooms, InventoryError> {
        let rooms = read_retrying(|| self.store.fetch_all()).await?;
        Ok(BookableRooms::new(rooms, filter))
    }

    pub async fn check_in(&self, room_number: &str, count: u32) -> Result<Room, InventoryError> {
        let room = self.mutate(room_number, |room| room.check_in(count)).await?;

        info!(
            "checked {} guests into room {} ({}/{})",
            count,
            room_number,
            room.get_occupied(),
            room.get_capacity()
        );
        Ok(room)
    }

    pub async fn check_out(&self, room_number: &str, count: u32) -> Result<Room, InventoryError> {
        let room = self.mutate(room_number, |room| room.check_out(count)).await?;

        info!(
            "checked {} guests out of room {} ({}/{})",
            count,
            room_number,
            room.get_occupied(),
            room.get_capacity()
        );
        Ok(room)
    }

    pub async fn set_maintenance(
        &self,
        room_number: &str,
        enabled: bool,
    ) -> Result<Room, InventoryError> {
        let room = self
            .mutate(room_number, |room| {
                room.set_maintenance(enabled);
                Ok(())
            })
            .await?;

        info!("room {} is now {}", room_number, room.get_status());
        Ok(room)
    }

    pub async fn record_cleaning(
        &self,
        room_number: &str,
        at: DateTime<Utc>,
    ) -> Result<Room, InventoryError> {
        let room = self
            .mutate(room_number, |room| room.record_cleaning(at))
            .await?;

        info!("room {} cleaned at {}", room_number, at);
        Ok(room)
    }

    pub async fn update_details(
        &self,
        room_number: &str,
        details: RoomDetails,
    ) -> Result<Room, InventoryError> {
        let room = self
            .mutate(room_number, |room| room.apply_details(details))
            .await?;

        info!("room {} details updated", room_number);
        Ok(room)
    }

    /// Provisions each room, leaving the ones already present untouched.
    pub async fn seed(&self, specs: Vec<NewRoom>) -> Result<SeedReport, InventoryError> {
        let mut report = SeedReport::default();

        for spec in specs {
            match self.create_room(spec).await {
                Ok(_) => report.created += 1,
                Err(InventoryError::DuplicateRoomNumber(n)) => {
                    debug!("seed skipped existing room {}", n);
                    report.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            "seeded {} rooms, {} already present",
            report.created, report.skipped
        );
        Ok(report)
    }

    async fn mutate<F>(&self, room_number: &str, apply: F) -> Result<Room, InventoryError>
    where
        F: FnOnce(&mut Room) -> Result<(), InventoryError> + Send,
    {
        let _guard = self.lock_room(room_number).await;
        let mut room = self.get_room(room_number).await?;

        if let Err(e) = apply(&mut room) {
            debug!("rejected change on room {}: {}", room_number, e);
            return Err(e);
        }

        // writes are never retried, a lost acknowledgement could apply twice
        self.store.replace(&room).await?;
        Ok(room)
    }

    async fn lock_room(&self, room_number: &str) -> RoomGuard<'_> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            locks.entry(room_number.to_string()).or_default().clone()
        };

        RoomGuard {
            locks: &self.locks,
            room_number: room_number.to_string(),
            guard: Some(lock.lock_owned().await),
        }
    }
}

/// Holds a room lock and drops its table entry once nobody else waits on it.
struct RoomGuard<'a> {
    locks: &'a Mutex<HashMap<String, Arc<RoomLock<()>>>>,
    room_number: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for RoomGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());

        // waiters hold their own clone, so a count of one means only the table is left
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        if locks
            .get(&self.room_number)
            .map_or(false, |lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.room_number);
        }
    }
}

async fn read_retrying<T, F, Fut>(read: F) -> Result<T, StorageError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, StorageError>>,
{
    match read().await {
        Err(e) if e.is_transient() => {
            warn!("transient storage failure, retrying once: {}", e);
            read().await
        }
        result => result,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use rust_decimal::Decimal;

    use super::*;
    use crate::{
        clock::FixedClock,
        room::{tests::dorm, RoomStatus},
        seed::default_rooms,
        store::MemoryStore,
    };

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn inventory() -> RoomInventory {
        RoomInventory::new(
            Arc::new(MemoryStore::new()),
            Arc::new(FixedClock::new(start())),
        )
    }

    async fn inventory_with(rooms: &[(&str, u32, u32)]) -> RoomInventory {
        let inventory = inventory();
        for (number, capacity, occupied) in rooms {
            inventory
                .create_room(dorm(number, *capacity, *occupied))
                .await
                .unwrap();
        }
        inventory
    }

    #[tokio::test]
    async fn check_in_fills_room_then_rejects() {
        let inventory = inventory_with(&[("R001", 4, 3)]).await;

        let room = inventory.check_in("R001", 1).await.unwrap();
        assert_eq!(room.get_occupied(), 4);
        assert_eq!(room.get_status(), RoomStatus::Full);

        let err = inventory.check_in("R001", 1).await.unwrap_err();
        assert_eq!(
            err,
            InventoryError::CapacityExceeded {
                room_number: "R001".to_string(),
                occupied: 4,
                requested: 1,
                capacity: 4,
            }
        );
        assert_eq!(inventory.get_room("R001").await.unwrap().get_occupied(), 4);
    }

    #[tokio::test]
    async fn check_out_everyone_makes_room_available() {
        let inventory = inventory_with(&[("R002", 6, 6)]).await;
        assert_eq!(
            inventory.get_room("R002").await.unwrap().get_status(),
            RoomStatus::Full
        );

        let room = inventory.check_out("R002", 6).await.unwrap();
        assert_eq!(room.get_occupied(), 0);
        assert_eq!(room.get_status(), RoomStatus::Available);
    }

    #[tokio::test]
    async fn maintenance_blocks_check_in_and_restores_status() {
        let inventory = inventory_with(&[("R005", 8, 5)]).await;

        let room = inventory.set_maintenance("R005", true).await.unwrap();
        assert_eq!(room.get_status(), RoomStatus::Maintenance);
        assert_eq!(room.get_occupied(), 5);

        let err = inventory.check_in("R005", 1).await.unwrap_err();
        assert_eq!(err, InventoryError::RoomUnderMaintenance("R005".to_string()));
        assert!(inventory.check_out("R005", 1).await.is_err());

        let room = inventory.set_maintenance("R005", false).await.unwrap();
        assert_eq!(room.get_status(), RoomStatus::Occupied);
        assert_eq!(room.get_occupied(), 5);
    }

    #[tokio::test]
    async fn check_in_then_out_is_a_no_op() {
        let inventory = inventory_with(&[("R006", 12, 8)]).await;
        let before = inventory.get_room("R006").await.unwrap();

        inventory.check_in("R006", 3).await.unwrap();
        let after = inventory.check_out("R006", 3).await.unwrap();

        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn occupancy_stays_within_capacity() {
        let inventory = inventory_with(&[("R001", 4, 0)]).await;
        let steps: [(bool, u32); 10] = [
            (true, 2),
            (true, 3),
            (false, 1),
            (true, 3),
            (false, 5),
            (false, 4),
            (true, 4),
            (true, 1),
            (false, 2),
            (true, 1),
        ];

        for (check_in, count) in steps {
            let _ = if check_in {
                inventory.check_in("R001", count).await
            } else {
                inventory.check_out("R001", count).await
            };

            let room = inventory.get_room("R001").await.unwrap();
            assert!(room.get_occupied() <= room.get_capacity());
            assert_eq!(room.get_status(), room.derived_status());
        }
    }

    #[tokio::test]
    async fn unknown_room_is_reported() {
        let inventory = inventory();
        let missing = InventoryError::RoomNotFound("R404".to_string());

        assert_eq!(inventory.check_in("R404", 1).await.unwrap_err(), missing);
        assert_eq!(inventory.check_out("R404", 1).await.unwrap_err(), missing);
        assert_eq!(
            inventory.set_maintenance("R404", true).await.unwrap_err(),
            missing
        );
        assert_eq!(
            inventory.record_cleaning("R404", start()).await.unwrap_err(),
            missing
        );
    }

    #[tokio::test]
    async fn cleaning_must_move_forward() {
        let inventory = inventory_with(&[("R001", 4, 0)]).await;

        inventory.record_cleaning("R001", start()).await.unwrap();
        let earlier = start() - Duration::hours(1);
        let err = inventory.record_cleaning("R001", earlier).await.unwrap_err();

        assert_eq!(
            err,
            InventoryError::NonMonotonicTimestamp {
                given: earlier,
                last: start(),
            }
        );
        let room = inventory.get_room("R001").await.unwrap();
        assert_eq!(room.get_last_cleaned(), Some(start()));

        // same instant again is fine
        inventory.record_cleaning("R001", start()).await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_room_number_leaves_existing_room() {
        let inventory = inventory_with(&[("R001", 4, 3)]).await;

        let err = inventory.create_room(dorm("R001", 8, 0)).await.unwrap_err();
        assert_eq!(err, InventoryError::DuplicateRoomNumber("R001".to_string()));

        let room = inventory.get_room("R001").await.unwrap();
        assert_eq!(room.get_capacity(), 4);
        assert_eq!(room.get_occupied(), 3);
    }

    #[tokio::test]
    async fn list_bookable_skips_full_and_maintenance() {
        let clock = FixedClock::new(start());
        let inventory = inventory();
        inventory.seed(default_rooms(&clock)).await.unwrap();

        let bookable = inventory
            .list_bookable(BookableFilter::default())
            .await
            .unwrap();
        let numbers = bookable
            .iter()
            .map(|r| r.get_room_number())
            .collect::<Vec<_>>();
        assert_eq!(numbers, vec!["R001", "R005", "R006"]);

        // restartable
        assert_eq!(bookable.iter().count(), 3);
        assert_eq!((&bookable).into_iter().count(), 3);
    }

    #[tokio::test]
    async fn list_bookable_applies_filters() {
        let clock = FixedClock::new(start());
        let inventory = inventory();
        inventory.seed(default_rooms(&clock)).await.unwrap();

        let filter = BookableFilter {
            room_type: Some("Mixed Dormitory".to_string()),
            max_price: Some(Decimal::new(2000, 2)),
            min_free: Some(3),
            ..Default::default()
        };
        let bookable = inventory.list_bookable(filter).await.unwrap();
        let numbers = bookable
            .iter()
            .map(|r| r.get_room_number())
            .collect::<Vec<_>>();
        assert_eq!(numbers, vec!["R005", "R006"]);

        let filter = BookableFilter {
            floor: Some(1),
            ..Default::default()
        };
        let bookable = inventory.list_bookable(filter).await.unwrap();
        assert_eq!(bookable.iter().count(), 1);
    }

    #[tokio::test]
    async fn seeding_twice_skips_existing_rooms() {
        let clock = FixedClock::new(start());
        let inventory = inventory();

        let first = inventory.seed(default_rooms(&clock)).await.unwrap();
        let second = inventory.seed(default_rooms(&clock)).await.unwrap();

        assert_eq!(first, SeedReport { created: 6, skipped: 0 });
        assert_eq!(second, SeedReport { created: 0, skipped: 6 });
        assert_eq!(inventory.list_rooms().await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn update_details_rederives_status() {
        let inventory = inventory_with(&[("R001", 4, 3)]).await;
        let details = RoomDetails {
            capacity: Some(3),
            price: Some(Decimal::new(2700, 2)),
            ..Default::default()
        };

        let room = inventory.update_details("R001", details).await.unwrap();
        assert_eq!(room.get_status(), RoomStatus::Full);
        assert_eq!(room.get_price(), Decimal::new(2700, 2));
    }

    #[tokio::test]
    async fn concurrent_check_ins_never_overbook() {
        let inventory = Arc::new(inventory_with(&[("R006", 12, 0)]).await);

        let handles = (0..30)
            .map(|_| {
                let inventory = inventory.clone();
                tokio::spawn(async move { inventory.check_in("R006", 1).await.is_ok() })
            })
            .collect::<Vec<_>>();

        let mut accepted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                accepted += 1;
            }
        }

        assert_eq!(accepted, 12);
        let room = inventory.get_room("R006").await.unwrap();
        assert_eq!(room.get_occupied(), 12);
        assert_eq!(room.get_status(), RoomStatus::Full);
    }

    #[tokio::test]
    async fn lock_table_does_not_grow_with_unknown_rooms() {
        let inventory = inventory_with(&[("R001", 4, 0)]).await;

        for i in 0..1000 {
            let number = format!("X{}", i);
            assert!(inventory.check_in(&number, 1).await.is_err());
        }
        inventory.check_in("R001", 1).await.unwrap();
        inventory.check_out("R001", 1).await.unwrap();

        assert!(inventory.locks.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn lock_table_drains_after_concurrent_check_ins() {
        let inventory = Arc::new(inventory_with(&[("R006", 12, 0)]).await);

        let handles = (0..30)
            .map(|_| {
                let inventory = inventory.clone();
                tokio::spawn(async move { inventory.check_in("R006", 1).await.is_ok() })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            handle.await.unwrap();
        }

        assert!(inventory.locks.lock().unwrap().is_empty());
    }

    /// Store failing a set number of reads, and every write when asked to.
    struct FlakyStore {
        inner: MemoryStore,
        failing_reads: AtomicUsize,
        failing_writes: bool,
        writes: AtomicUsize,
    }

    impl FlakyStore {
        fn new(failing_reads: usize, failing_writes: bool) -> Self {
            Self {
                inner: MemoryStore::new(),
                failing_reads: AtomicUsize::new(failing_reads),
                failing_writes,
                writes: AtomicUsize::new(0),
            }
        }

        fn read_fails(&self) -> bool {
            self.failing_reads
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        }
    }

    #[async_trait]
    impl RoomStore for FlakyStore {
        async fn fetch(&self, room_number: &str) -> Result<Option<Room>, StorageError> {
            if self.read_fails() {
                return Err(StorageError::Unavailable("connection reset".to_string()));
            }
            self.inner.fetch(room_number).await
        }

        async fn fetch_all(&self) -> Result<Vec<Room>, StorageError> {
            if self.read_fails() {
                return Err(StorageError::Unavailable("connection reset".to_string()));
            }
            self.inner.fetch_all().await
        }

        async fn insert(&self, room: &Room) -> Result<(), StorageError> {
            self.inner.insert(room).await
        }

        async fn replace(&self, room: &Room) -> Result<(), StorageError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if self.failing_writes {
                return Err(StorageError::Unavailable("connection reset".to_string()));
            }
            self.inner.replace(room).await
        }
    }

    async fn flaky_inventory(store: Arc<FlakyStore>) -> RoomInventory {
        store
            .inner
            .insert(&Room::new(dorm("R001", 4, 1)).unwrap())
            .await
            .unwrap();
        RoomInventory::new(store, Arc::new(FixedClock::new(start())))
    }

    #[tokio::test]
    async fn transient_read_is_retried_once() {
        let inventory = flaky_inventory(Arc::new(FlakyStore::new(1, false))).await;
        assert!(inventory.get_room("R001").await.is_ok());

        let inventory = flaky_inventory(Arc::new(FlakyStore::new(2, false))).await;
        assert!(matches!(
            inventory.get_room("R001").await,
            Err(InventoryError::StorageError(_))
        ));
    }

    #[tokio::test]
    async fn failed_write_is_surfaced_not_retried() {
        let store = Arc::new(FlakyStore::new(0, true));
        let inventory = flaky_inventory(store.clone()).await;

        let err = inventory.check_in("R001", 1).await.unwrap_err();
        assert!(matches!(err, InventoryError::StorageError(_)));
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
        assert_eq!(store.inner.fetch("R001").await.unwrap().unwrap().get_occupied(), 1);
    }
}
