use std::slice;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::room::Room;

/// Narrows down [`BookableRooms`]; unset fields match every room.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookableFilter {
    pub floor: Option<i32>,
    #[serde(rename = "type")]
    pub room_type: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    /// Minimum number of free places, `capacity - occupied`
    pub min_free: Option<u32>,
}

impl BookableFilter {
    pub fn matches(&self, room: &Room) -> bool {
        room.is_bookable()
            && room.free_places() >= self.min_free.unwrap_or(1)
            && self.floor.map_or(true, |f| room.get_floor() == f)
            && self
                .room_type
                .as_deref()
                .map_or(true, |t| room.get_type() == t)
            && self.min_price.map_or(true, |p| room.get_price() >= p)
            && self.max_price.map_or(true, |p| room.get_price() <= p)
    }
}

/// Snapshot of the inventory taken at listing time.
///
/// Filtering happens while iterating, and the snapshot can be walked any
/// number of times.
#[derive(Debug, Clone)]
pub struct BookableRooms {
    rooms: Vec<Room>,
    filter: BookableFilter,
}

impl BookableRooms {
    pub(crate) fn new(rooms: Vec<Room>, filter: BookableFilter) -> Self {
        Self { rooms, filter }
    }

    pub fn iter(&self) -> Bookable<'_> {
        Bookable {
            rooms: self.rooms.iter(),
            filter: &self.filter,
        }
    }

    pub fn filter(&self) -> &BookableFilter {
        &self.filter
    }
}

impl<'a> IntoIterator for &'a BookableRooms {
    type Item = &'a Room;
    type IntoIter = Bookable<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct Bookable<'a> {
    rooms: slice::Iter<'a, Room>,
    filter: &'a BookableFilter,
}

impl<'a> Iterator for Bookable<'a> {
    type Item = &'a Room;

    fn next(&mut self) -> Option<Self::Item> {
        let filter = self.filter;
        self.rooms.find(|room| filter.matches(room))
    }
}
