//! Nearby rooms by great-circle distance.
//!
//! A straight scan over every room that has coordinates; there is no spatial
//! index.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::RoomError;
use crate::listings::{ListingRepository, Room, RoomId};

/// Mean earth radius (IUGG).
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, RoomError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(RoomError::validation("latitude", "must be within [-90, 90]"));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(RoomError::validation("longitude", "must be within [-180, 180]"));
        }
        Ok(Coordinates {
            latitude,
            longitude,
        })
    }
}

pub fn haversine_km(from: &Coordinates, to: &Coordinates) -> f64 {
    let lat_from = from.latitude.to_radians();
    let lat_to = to.latitude.to_radians();
    let delta_lat = (to.latitude - from.latitude).to_radians();
    let delta_lon = (to.longitude - from.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat_from.cos() * lat_to.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[derive(Clone, Debug, PartialEq)]
pub struct NearbyRoom {
    pub room: Room,
    pub distance_km: f64,
}

/// Rooms within `radius_km` of the target, nearest first, at most `limit`.
pub fn nearby(
    target: &Room,
    candidates: Vec<Room>,
    radius_km: f64,
    limit: usize,
) -> Result<Vec<NearbyRoom>, RoomError> {
    let origin = target
        .coordinates
        .ok_or(RoomError::MissingCoordinates(target.id))?;

    let mut within_radius: Vec<NearbyRoom> = candidates
        .into_iter()
        .filter(|room| room.id != target.id)
        .filter_map(|room| {
            let distance_km = haversine_km(&origin, room.coordinates.as_ref()?);
            if distance_km <= radius_km {
                Some(NearbyRoom { room, distance_km })
            } else {
                None
            }
        })
        .collect();

    within_radius.sort_by(|a, b| {
        a.distance_km
            .partial_cmp(&b.distance_km)
            .unwrap_or(Ordering::Equal)
    });
    within_radius.truncate(limit);

    Ok(within_radius)
}

pub fn nearby_for<R: ListingRepository + ?Sized>(
    repository: &R,
    target_id: RoomId,
    radius_km: f64,
    limit: usize,
) -> Result<Vec<NearbyRoom>, RoomError> {
    let target = repository
        .get(target_id)?
        .ok_or(RoomError::RoomNotFound(target_id))?;
    let candidates = repository.filter(&|room| room.id != target_id && room.coordinates.is_some())?;

    nearby(&target, candidates, radius_km, limit)
}

#[cfg(test)]
mod geo_test {
    use chrono::NaiveDateTime;
    use float_cmp::approx_eq;

    use super::*;
    use crate::listings::{Price, RoomType};

    fn room_at(id: RoomId, coordinates: Option<Coordinates>) -> Room {
        Room {
            id,
            owner_email: "owner@example.com".to_string(),
            title: format!("Room {}", id),
            description: "Sunny room".to_string(),
            price: Price::from_units(8000),
            location: "Lalitpur".to_string(),
            room_type: RoomType::OneBhk,
            contact_number: "+977-9800000000".to_string(),
            coordinates,
            created_at: NaiveDateTime::from_timestamp(1_700_000_000, 0),
        }
    }

    fn coords(latitude: f64, longitude: f64) -> Option<Coordinates> {
        Some(Coordinates::new(latitude, longitude).unwrap())
    }

    #[test]
    fn should_compute_zero_distance_for_same_point() {
        let kathmandu = Coordinates::new(27.7172, 85.3240).unwrap();
        assert!(approx_eq!(f64, 0.0, haversine_km(&kathmandu, &kathmandu), epsilon = 1e-9));
    }

    #[test]
    fn should_compute_known_distance() {
        // One degree of latitude along a meridian.
        let a = Coordinates::new(0.0, 0.0).unwrap();
        let b = Coordinates::new(1.0, 0.0).unwrap();
        assert!(approx_eq!(f64, 111.195, haversine_km(&a, &b), epsilon = 0.01));
    }

    #[test]
    fn should_reject_out_of_range_coordinates() {
        assert!(Coordinates::new(91.0, 0.0).is_err());
        assert!(Coordinates::new(0.0, -181.0).is_err());
    }

    #[test]
    fn should_return_nearest_rooms_within_radius() {
        let target = room_at(1, coords(27.7172, 85.3240));
        let candidates = vec![
            room_at(2, coords(27.6644, 85.3188)), // Lalitpur, ~6 km
            room_at(3, coords(27.7215, 85.3620)), // Boudha, ~3.8 km
            room_at(4, coords(27.6710, 85.4298)), // Bhaktapur, ~11.6 km
            room_at(5, None),
        ];

        let found = nearby(&target, candidates, 10.0, 10).unwrap();
        let ids: Vec<RoomId> = found.iter().map(|nearby| nearby.room.id).collect();
        assert_eq!(vec![3, 2], ids);

        let limited = nearby(
            &target,
            vec![
                room_at(2, coords(27.6644, 85.3188)),
                room_at(3, coords(27.7215, 85.3620)),
            ],
            10.0,
            1,
        )
        .unwrap();
        assert_eq!(1, limited.len());
        assert_eq!(3, limited[0].room.id);
    }

    #[test]
    fn should_fail_for_target_without_coordinates() {
        let target = room_at(1, None);
        match nearby(&target, vec![], 5.0, 10) {
            Err(RoomError::MissingCoordinates(1)) => {}
            other => panic!("unexpected result {:?}", other),
        }
    }
}
