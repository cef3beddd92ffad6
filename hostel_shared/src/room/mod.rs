mod status;

pub use status::RoomStatus;

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::InventoryError;

/// A unit of hostel inventory: a dormitory bed block or a private room.
///
/// Stored records are checked again when read back, and their status is
/// derived anew rather than trusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RoomRecord")]
pub struct Room {
    room_number: String,
    name: String,
    #[serde(rename = "type")]
    room_type: String,
    capacity: u32,
    occupied: u32,
    floor: i32,
    price: Decimal,
    status: RoomStatus,
    description: String,
    amenities: BTreeSet<String>,
    last_cleaned: Option<DateTime<Utc>>,
}

/// A room as it sits in storage.
#[derive(Deserialize)]
struct RoomRecord {
    room_number: String,
    name: String,
    #[serde(rename = "type")]
    room_type: String,
    capacity: u32,
    occupied: u32,
    floor: i32,
    price: Decimal,
    status: RoomStatus,
    #[serde(default)]
    description: String,
    #[serde(default)]
    amenities: BTreeSet<String>,
    #[serde(default)]
    last_cleaned: Option<DateTime<Utc>>,
}

impl TryFrom<RoomRecord> for Room {
    type Error = InventoryError;

    fn try_from(record: RoomRecord) -> Result<Self, Self::Error> {
        Room::new(NewRoom {
            room_number: record.room_number,
            name: record.name,
            room_type: record.room_type,
            capacity: record.capacity,
            occupied: record.occupied,
            floor: record.floor,
            price: record.price,
            status: Some(record.status),
            description: record.description,
            amenities: record.amenities,
            last_cleaned: record.last_cleaned,
        })
    }
}

/// Attributes of a room being provisioned.
///
/// Only a `maintenance` status is honoured, any other status is derived from
/// the occupancy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRoom {
    pub room_number: String,
    pub name: String,
    #[serde(rename = "type")]
    pub room_type: String,
    pub capacity: u32,
    #[serde(default)]
    pub occupied: u32,
    pub floor: i32,
    pub price: Decimal,
    #[serde(default)]
    pub status: Option<RoomStatus>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amenities: BTreeSet<String>,
    #[serde(default)]
    pub last_cleaned: Option<DateTime<Utc>>,
}

/// Partial edit of the descriptive attributes of a room.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomDetails {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub room_type: Option<String>,
    pub capacity: Option<u32>,
    pub floor: Option<i32>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub amenities: Option<BTreeSet<String>>,
}

impl Room {
    pub fn new(spec: NewRoom) -> Result<Self, InventoryError> {
        let number = &spec.room_number;
        if number.is_empty() || number.trim() != number {
            return Err(InventoryError::InvalidRoomNumber(spec.room_number));
        }
        validate_capacity(spec.capacity, spec.occupied)?;
        validate_price(spec.price)?;

        let maintenance = spec.status == Some(RoomStatus::Maintenance);

        Ok(Self {
            status: RoomStatus::derive(spec.occupied, spec.capacity, maintenance),
            room_number: spec.room_number,
            name: spec.name,
            room_type: spec.room_type,
            capacity: spec.capacity,
            occupied: spec.occupied,
            floor: spec.floor,
            price: spec.price,
            description: spec.description,
            amenities: spec.amenities,
            last_cleaned: spec.last_cleaned,
        })
    }

    pub fn get_room_number(&self) -> &str {
        &self.room_number
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_type(&self) -> &str {
        &self.room_type
    }

    pub fn get_capacity(&self) -> u32 {
        self.capacity
    }

    pub fn get_occupied(&self) -> u32 {
        self.occupied
    }

    pub fn get_floor(&self) -> i32 {
        self.floor
    }

    pub fn get_price(&self) -> Decimal {
        self.price
    }

    pub fn get_status(&self) -> RoomStatus {
        self.status
    }

    pub fn get_description(&self) -> &str {
        &self.description
    }

    pub fn get_amenities(&self) -> &BTreeSet<String> {
        &self.amenities
    }

    pub fn get_last_cleaned(&self) -> Option<DateTime<Utc>> {
        self.last_cleaned
    }

    pub fn is_under_maintenance(&self) -> bool {
        self.status == RoomStatus::Maintenance
    }

    pub fn is_bookable(&self) -> bool {
        self.status.is_bookable()
    }

    pub fn free_places(&self) -> u32 {
        self.capacity.saturating_sub(self.occupied)
    }

    /// Status this room should carry given its current fields.
    pub fn derived_status(&self) -> RoomStatus {
        RoomStatus::derive(self.occupied, self.capacity, self.is_under_maintenance())
    }

    pub(crate) fn check_in(&mut self, count: u32) -> Result<(), InventoryError> {
        validate_count(count)?;
        if self.is_under_maintenance() {
            return Err(InventoryError::RoomUnderMaintenance(self.room_number.clone()));
        }

        match self.occupied.checked_add(count) {
            Some(total) if total <= self.capacity => self.occupied = total,
            _ => {
                return Err(InventoryError::CapacityExceeded {
                    room_number: self.room_number.clone(),
                    occupied: self.occupied,
                    requested: count,
                    capacity: self.capacity,
                })
            }
        }

        self.status = self.derived_status();
        Ok(())
    }

    pub(crate) fn check_out(&mut self, count: u32) -> Result<(), InventoryError> {
        validate_count(count)?;
        if self.is_under_maintenance() {
            return Err(InventoryError::RoomUnderMaintenance(self.room_number.clone()));
        }

        self.occupied = self
            .occupied
            .checked_sub(count)
            .ok_or_else(|| InventoryError::Underflow {
                room_number: self.room_number.clone(),
                occupied: self.occupied,
                requested: count,
            })?;

        self.status = self.derived_status();
        Ok(())
    }

    pub(crate) fn set_maintenance(&mut self, enabled: bool) {
        self.status = RoomStatus::derive(self.occupied, self.capacity, enabled);
    }

    pub(crate) fn record_cleaning(&mut self, at: DateTime<Utc>) -> Result<(), InventoryError> {
        if let Some(last) = self.last_cleaned {
            if at < last {
                return Err(InventoryError::NonMonotonicTimestamp { given: at, last });
            }
        }

        self.last_cleaned = Some(at);
        Ok(())
    }

    pub(crate) fn apply_details(&mut self, details: RoomDetails) -> Result<(), InventoryError> {
        if let Some(capacity) = details.capacity {
            validate_capacity(capacity, self.occupied)?;
            self.capacity = capacity;
        }
        if let Some(price) = details.price {
            validate_price(price)?;
            self.price = price;
        }
        if let Some(name) = details.name {
            self.name = name;
        }
        if let Some(room_type) = details.room_type {
            self.room_type = room_type;
        }
        if let Some(floor) = details.floor {
            self.floor = floor;
        }
        if let Some(description) = details.description {
            self.description = description;
        }
        if let Some(amenities) = details.amenities {
            self.amenities = amenities;
        }

        self.status = self.derived_status();
        Ok(())
    }
}

fn validate_capacity(capacity: u32, occupied: u32) -> Result<(), InventoryError> {
    if capacity == 0 || occupied > capacity {
        return Err(InventoryError::InvalidCapacity { capacity, occupied });
    }
    Ok(())
}

fn validate_price(price: Decimal) -> Result<(), InventoryError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(InventoryError::InvalidPrice(price));
    }
    Ok(())
}

fn validate_count(count: u32) -> Result<(), InventoryError> {
    if count == 0 {
        return Err(InventoryError::InvalidCount(count));
    }
    Ok(())
}
