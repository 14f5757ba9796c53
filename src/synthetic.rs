//! Reproducible dummy listings for local testing and benchmarks.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

use crate::geo::Coordinates;
use crate::listings::{NewRoom, Price, RoomType};

pub const DEFAULT_QTY_ROOMS: usize = 500;
pub const DEFAULT_OWNER_EMAIL: &str = "admin@roomfinder.local";

const MIN_PRICE: u64 = 5_000;
const MAX_PRICE: u64 = 30_000;
// Roughly one kilometre.
const COORDINATE_JITTER: f64 = 0.01;
const DESCRIPTION: &str = "Spacious and affordable room near public transport.";

/// Neighbourhoods of the Kathmandu valley with a representative centre point.
pub const LOCATIONS: [(&str, f64, f64); 10] = [
    ("Kathmandu", 27.7172, 85.3240),
    ("Lalitpur", 27.6644, 85.3188),
    ("Bhaktapur", 27.6710, 85.4298),
    ("Baneshwor", 27.6915, 85.3420),
    ("Boudha", 27.7215, 85.3620),
    ("Kalanki", 27.6935, 85.2817),
    ("Chabahil", 27.7172, 85.3466),
    ("Kirtipur", 27.6788, 85.2775),
    ("Maharajgunj", 27.7369, 85.3300),
    ("Jawalakhel", 27.6727, 85.3142),
];

/// `qty_rooms` listings owned by `owner_email`; the same seed yields the same listings.
pub fn generate_rooms(qty_rooms: usize, seed: u64, owner_email: &str) -> Vec<NewRoom> {
    let mut rng = Pcg64::seed_from_u64(seed);
    (1..=qty_rooms)
        .map(|number| generate_room(&mut rng, number, owner_email))
        .collect()
}

fn generate_room(rng: &mut Pcg64, number: usize, owner_email: &str) -> NewRoom {
    let room_type = *RoomType::ALL.choose(rng).unwrap_or(&RoomType::TwoBhk);
    let (location, latitude, longitude) = *LOCATIONS.choose(rng).unwrap_or(&LOCATIONS[0]);
    let coordinates = Coordinates::new(
        latitude + rng.gen_range(-COORDINATE_JITTER..COORDINATE_JITTER),
        longitude + rng.gen_range(-COORDINATE_JITTER..COORDINATE_JITTER),
    )
    .ok();

    NewRoom {
        owner_email: owner_email.to_string(),
        title: format!("Room {} - {}", number, room_type),
        description: DESCRIPTION.to_string(),
        price: Price::from_units(rng.gen_range(MIN_PRICE..=MAX_PRICE)),
        location: location.to_string(),
        room_type,
        contact_number: format!("+977-98{}", rng.gen_range(10_000_000..=99_999_999u32)),
        coordinates,
    }
}

#[cfg(test)]
mod synthetic_test {
    use super::*;

    #[test]
    fn should_generate_requested_number_of_rooms() {
        let rooms = generate_rooms(25, 42, DEFAULT_OWNER_EMAIL);
        assert_eq!(25, rooms.len());
        assert_eq!("Room 1 - ", &rooms[0].title[..9]);
        assert!(rooms.iter().all(|room| {
            room.price >= Price::from_units(MIN_PRICE) && room.price <= Price::from_units(MAX_PRICE)
        }));
        assert!(rooms
            .iter()
            .all(|room| LOCATIONS.iter().any(|(name, _, _)| *name == room.location)));
        assert!(rooms.iter().all(|room| room.coordinates.is_some()));
        assert!(rooms.iter().all(|room| room.contact_number.len() == 15));
    }

    #[test]
    fn should_be_reproducible_for_seed() {
        assert_eq!(generate_rooms(10, 7, "a@b.c"), generate_rooms(10, 7, "a@b.c"));
        assert_ne!(generate_rooms(10, 7, "a@b.c"), generate_rooms(10, 8, "a@b.c"));
    }
}
