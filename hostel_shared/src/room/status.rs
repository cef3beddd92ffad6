use core::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Available,
    Occupied,
    Full,
    Maintenance,
}

impl RoomStatus {
    /// Status of a room given its occupancy and maintenance flag.
    ///
    /// Total over its inputs: the previous status plays no part, so it can be
    /// recomputed from scratch at any time.
    pub fn derive(occupied: u32, capacity: u32, maintenance: bool) -> Self {
        if maintenance {
            RoomStatus::Maintenance
        } else if occupied >= capacity {
            RoomStatus::Full
        } else if occupied > 0 {
            RoomStatus::Occupied
        } else {
            RoomStatus::Available
        }
    }

    /// Whether guests can still be booked into a room with this status.
    pub fn is_bookable(self) -> bool {
        matches!(self, RoomStatus::Available | RoomStatus::Occupied)
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomStatus::Available => write!(f, "available"),
            RoomStatus::Occupied => write!(f, "occupied"),
            RoomStatus::Full => write!(f, "full"),
            RoomStatus::Maintenance => write!(f, "maintenance"),
        }
    }
}
