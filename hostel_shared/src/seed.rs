use std::collections::BTreeSet;

use chrono::Duration;
use rust_decimal::Decimal;

use crate::{
    clock::Clock,
    room::{NewRoom, RoomStatus},
};

struct Fixture {
    room_number: &'static str,
    name: &'static str,
    room_type: &'static str,
    capacity: u32,
    occupied: u32,
    floor: i32,
    price_cents: i64,
    maintenance: bool,
    description: &'static str,
    amenities: &'static [&'static str],
    cleaned_ago: Duration,
}

fn fixtures() -> [Fixture; 6] {
    [
        Fixture {
            room_number: "R001",
            name: "4-Bed Mixed Dorm A",
            room_type: "Mixed Dormitory",
            capacity: 4,
            occupied: 3,
            floor: 1,
            price_cents: 2500,
            maintenance: false,
            description: "Comfortable mixed dormitory with individual lockers and reading lights.",
            amenities: &["Free WiFi", "AC", "Individual Lockers", "Reading Lights", "Power Outlets"],
            cleaned_ago: Duration::hours(2),
        },
        Fixture {
            room_number: "R002",
            name: "6-Bed Female Dorm B",
            room_type: "Female Dormitory",
            capacity: 6,
            occupied: 6,
            floor: 1,
            price_cents: 2300,
            maintenance: false,
            description: "Female-only dormitory with shared bathroom facilities.",
            amenities: &["Free WiFi", "AC", "Individual Lockers", "Hair Dryer", "Shared Bathroom"],
            cleaned_ago: Duration::hours(1),
        },
        Fixture {
            room_number: "R003",
            name: "Private Single 201",
            room_type: "Private Single",
            capacity: 1,
            occupied: 1,
            floor: 2,
            price_cents: 4500,
            maintenance: false,
            description: "Private single room with shared bathroom facilities.",
            amenities: &["Private Space", "Shared Bathroom", "Free WiFi", "Quiet Area", "Reading Desk"],
            cleaned_ago: Duration::days(1),
        },
        Fixture {
            room_number: "R004",
            name: "Private Double 302",
            room_type: "Private Double",
            capacity: 2,
            occupied: 0,
            floor: 3,
            price_cents: 6500,
            maintenance: true,
            description: "Private double room with private bathroom and city view.",
            amenities: &["Private Bathroom", "Free WiFi", "TV", "City View", "Mini Fridge"],
            cleaned_ago: Duration::days(2),
        },
        Fixture {
            room_number: "R005",
            name: "8-Bed Mixed Dorm C",
            room_type: "Mixed Dormitory",
            capacity: 8,
            occupied: 5,
            floor: 2,
            price_cents: 2000,
            maintenance: false,
            description: "Budget-friendly mixed dormitory with large windows.",
            amenities: &["Free WiFi", "AC", "Individual Lockers", "Large Windows", "Common Area Access"],
            cleaned_ago: Duration::hours(3),
        },
        Fixture {
            room_number: "R006",
            name: "12-Bed Mixed Dorm D",
            room_type: "Mixed Dormitory",
            capacity: 12,
            occupied: 8,
            floor: 3,
            price_cents: 1800,
            maintenance: false,
            description: "Economy option with basic amenities and large windows.",
            amenities: &["Free WiFi", "Individual Lockers", "Large Windows", "Reading Lights"],
            cleaned_ago: Duration::hours(4),
        },
    ]
}

/// The sample rooms a fresh hostel is provisioned with.
///
/// Cleaning times are placed relative to `clock`.
pub fn default_rooms(clock: &dyn Clock) -> Vec<NewRoom> {
    let now = clock.now();

    fixtures()
        .into_iter()
        .map(|f| NewRoom {
            room_number: f.room_number.to_string(),
            name: f.name.to_string(),
            room_type: f.room_type.to_string(),
            capacity: f.capacity,
            occupied: f.occupied,
            floor: f.floor,
            price: Decimal::new(f.price_cents, 2),
            status: f.maintenance.then_some(RoomStatus::Maintenance),
            description: f.description.to_string(),
            amenities: f
                .amenities
                .iter()
                .map(|a| a.to_string())
                .collect::<BTreeSet<_>>(),
            last_cleaned: Some(now - f.cleaned_ago),
        })
        .collect()
}
