use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::RoomError;
use crate::geo::Coordinates;

pub mod memory_store;
pub mod rocksdb_store;
pub mod schema;

pub use memory_store::InMemoryRoomStore;
pub use rocksdb_store::RocksDBRoomStore;

pub type RoomId = u64;
pub type ReviewId = u64;
pub type UserKey = u128;

// Prices carry two decimals and at most ten digits in total.
const MAX_PRICE_HUNDREDTHS: u64 = 10_000_000_000 - 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomType {
    OneBhk,
    TwoBhk,
    ThreeBhk,
    FourBhk,
}

impl RoomType {
    pub const ALL: [RoomType; 4] = [
        RoomType::OneBhk,
        RoomType::TwoBhk,
        RoomType::ThreeBhk,
        RoomType::FourBhk,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::OneBhk => "1BHK",
            RoomType::TwoBhk => "2BHK",
            RoomType::ThreeBhk => "3BHK",
            RoomType::FourBhk => "4BHK",
        }
    }
}

impl Default for RoomType {
    fn default() -> Self {
        RoomType::TwoBhk
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomType {
    type Err = RoomError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        RoomType::ALL
            .iter()
            .find(|room_type| room_type.as_str().eq_ignore_ascii_case(value))
            .copied()
            .ok_or_else(|| {
                RoomError::validation("room_type", format!("unknown room type '{}'", value))
            })
    }
}

/// A non-negative amount with two decimals, stored in hundredths.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Price(u64);

impl Price {
    pub fn from_hundredths(hundredths: u64) -> Self {
        Price(hundredths)
    }

    pub fn from_units(units: u64) -> Self {
        Price(units * 100)
    }

    pub fn from_f64(value: f64) -> Result<Self, RoomError> {
        if !value.is_finite() {
            return Err(RoomError::validation("price", "must be a number"));
        }
        if value < 0.0 {
            return Err(RoomError::validation("price", "must not be negative"));
        }
        let scaled = value * 100.0;
        let hundredths = scaled.round();
        if (scaled - hundredths).abs() > 1e-6 {
            return Err(RoomError::validation(
                "price",
                "must have at most 2 decimal places",
            ));
        }
        if hundredths > MAX_PRICE_HUNDREDTHS as f64 {
            return Err(RoomError::validation("price", "must have at most 10 digits"));
        }
        Ok(Price(hundredths as u64))
    }

    pub fn hundredths(&self) -> u64 {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub owner_email: String,
    pub title: String,
    pub description: String,
    pub price: Price,
    pub location: String,
    pub room_type: RoomType,
    pub contact_number: String,
    pub coordinates: Option<Coordinates>,
    pub created_at: NaiveDateTime,
}

/// Everything a caller supplies for a listing; id and timestamp are assigned by the store.
#[derive(Clone, Debug, PartialEq)]
pub struct NewRoom {
    pub owner_email: String,
    pub title: String,
    pub description: String,
    pub price: Price,
    pub location: String,
    pub room_type: RoomType,
    pub contact_number: String,
    pub coordinates: Option<Coordinates>,
}

impl NewRoom {
    pub fn into_room(self, id: RoomId, created_at: NaiveDateTime) -> Room {
        Room {
            id,
            owner_email: self.owner_email,
            title: self.title,
            description: self.description,
            price: self.price,
            location: self.location,
            room_type: self.room_type,
            contact_number: self.contact_number,
            coordinates: self.coordinates,
            created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub room_id: RoomId,
    pub user: String,
    pub rating: u8,
    pub comment: String,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewReview {
    pub user: String,
    pub rating: u8,
    pub comment: String,
}

impl NewReview {
    pub fn into_review(self, id: ReviewId, room_id: RoomId, created_at: NaiveDateTime) -> Review {
        Review {
            id,
            room_id,
            user: self.user,
            rating: self.rating,
            comment: self.comment,
            created_at,
        }
    }
}

/// Read and write access to room listings.
///
/// `list` returns rooms in ascending id order; that order is the corpus order
/// used wherever rankings need a deterministic tie-break.
pub trait ListingRepository {
    fn get(&self, id: RoomId) -> Result<Option<Room>, RoomError>;

    fn list(&self) -> Result<Vec<Room>, RoomError>;

    fn filter(&self, predicate: &dyn Fn(&Room) -> bool) -> Result<Vec<Room>, RoomError> {
        let mut rooms = self.list()?;
        rooms.retain(|room| predicate(room));
        Ok(rooms)
    }

    fn all_excluding(&self, id: RoomId) -> Result<Vec<Room>, RoomError> {
        self.filter(&|room| room.id != id)
    }

    fn insert(&self, new_room: NewRoom) -> Result<Room, RoomError>;

    /// Replaces the editable fields; id, owner and creation time are kept.
    fn update(&self, id: RoomId, new_room: NewRoom) -> Result<Room, RoomError>;

    /// Removes the room together with its reviews and bookmarks.
    fn delete(&self, id: RoomId) -> Result<(), RoomError>;
}

pub trait ReviewRepository {
    fn add_review(&self, room_id: RoomId, review: NewReview) -> Result<Review, RoomError>;

    fn reviews_for_room(&self, room_id: RoomId) -> Result<Vec<Review>, RoomError>;

    fn reviews_by_user(&self, user: &str) -> Result<Vec<Review>, RoomError>;

    fn count_reviews(&self) -> Result<usize, RoomError>;
}

pub trait BookmarkRepository {
    /// Returns whether the room is bookmarked after the toggle.
    fn toggle_bookmark(&self, user: &str, room_id: RoomId) -> Result<bool, RoomError>;

    fn bookmarked_rooms(&self, user: &str) -> Result<Vec<RoomId>, RoomError>;
}

pub trait RoomStore: ListingRepository + ReviewRepository + BookmarkRepository + Send + Sync {}

impl<T> RoomStore for T where T: ListingRepository + ReviewRepository + BookmarkRepository + Send + Sync
{}

/// Stable 128-bit key for a user string, used to lay out bookmark keys.
pub fn user_key(user: &str) -> UserKey {
    let digest = md5::compute(user.trim().to_lowercase());
    u128::from_be_bytes(digest.0)
}

/// Newest rooms first; rooms created in the same instant fall back to descending id.
pub fn sort_newest_first(rooms: &mut [Room]) {
    rooms.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

pub fn sort_reviews_newest_first(reviews: &mut [Review]) {
    reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}
