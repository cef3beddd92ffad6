use chrono::{DateTime, Utc};
use mongodb::error::{ErrorKind, WriteFailure};
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("room number already exists: {0}")]
    DuplicateRoomNumber(String),

    #[error("invalid room number: {0:?}")]
    InvalidRoomNumber(String),

    #[error("invalid capacity: {occupied} occupied for a capacity of {capacity}")]
    InvalidCapacity { capacity: u32, occupied: u32 },

    #[error("invalid price: {0}")]
    InvalidPrice(Decimal),

    #[error("invalid guest count: {0}")]
    InvalidCount(u32),

    #[error("room not found: {0}")]
    RoomNotFound(String),

    #[error("room under maintenance: {0}")]
    RoomUnderMaintenance(String),

    #[error("capacity exceeded for room {room_number}: {occupied} + {requested} > {capacity}")]
    CapacityExceeded {
        room_number: String,
        occupied: u32,
        requested: u32,
        capacity: u32,
    },

    #[error("occupancy underflow for room {room_number}: {occupied} - {requested} < 0")]
    Underflow {
        room_number: String,
        occupied: u32,
        requested: u32,
    },

    #[error("cleaning timestamp {given} precedes last cleaning {last}")]
    NonMonotonicTimestamp {
        given: DateTime<Utc>,
        last: DateTime<Utc>,
    },

    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),
}

impl PartialEq for InventoryError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            // storage failures carry driver errors that can't be compared
            (Self::StorageError(_), Self::StorageError(_)) => true,
            (Self::DuplicateRoomNumber(v1), Self::DuplicateRoomNumber(v2)) => v1 == v2,
            (Self::InvalidRoomNumber(v1), Self::InvalidRoomNumber(v2)) => v1 == v2,
            (
                Self::InvalidCapacity { capacity: c1, occupied: o1 },
                Self::InvalidCapacity { capacity: c2, occupied: o2 },
            ) => c1 == c2 && o1 == o2,
            (Self::InvalidPrice(v1), Self::InvalidPrice(v2)) => v1 == v2,
            (Self::InvalidCount(v1), Self::InvalidCount(v2)) => v1 == v2,
            (Self::RoomNotFound(v1), Self::RoomNotFound(v2)) => v1 == v2,
            (Self::RoomUnderMaintenance(v1), Self::RoomUnderMaintenance(v2)) => v1 == v2,
            (
                Self::CapacityExceeded {
                    room_number: r1,
                    occupied: o1,
                    requested: q1,
                    capacity: c1,
                },
                Self::CapacityExceeded {
                    room_number: r2,
                    occupied: o2,
                    requested: q2,
                    capacity: c2,
                },
            ) => r1 == r2 && o1 == o2 && q1 == q2 && c1 == c2,
            (
                Self::Underflow {
                    room_number: r1,
                    occupied: o1,
                    requested: q1,
                },
                Self::Underflow {
                    room_number: r2,
                    occupied: o2,
                    requested: q2,
                },
            ) => r1 == r2 && o1 == o2 && q1 == q2,
            (
                Self::NonMonotonicTimestamp { given: g1, last: l1 },
                Self::NonMonotonicTimestamp { given: g2, last: l2 },
            ) => g1 == g2 && l1 == l2,
            _ => false,
        }
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("conflicting write on room {0}")]
    Conflict(String),

    #[error("mongodb error: {0}")]
    Mongo(#[from] mongodb::error::Error),
}

impl StorageError {
    /// Failures worth a second attempt when the operation is idempotent.
    pub fn is_transient(&self) -> bool {
        match self {
            StorageError::Unavailable(_) => true,
            StorageError::Conflict(_) => false,
            StorageError::Mongo(e) => matches!(
                *e.kind,
                ErrorKind::Io(_) | ErrorKind::ServerSelection { .. }
            ),
        }
    }
}

/// Mongo reports unique index violations as write error 11000.
pub(crate) fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    matches!(
        *e.kind,
        ErrorKind::Write(WriteFailure::WriteError(ref w)) if w.code == 11000
    )
}
