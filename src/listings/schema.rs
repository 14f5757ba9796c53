//! Wire representations of listings, reviews and bookmarks.
//!
//! Storage records never go over the wire directly: each entity has an
//! explicit schema struct and a mapping in both directions, and all input
//! validation happens while mapping a payload into its domain type.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::RoomError;
use crate::geo::{Coordinates, NearbyRoom};
use crate::listings::{NewReview, NewRoom, Price, Review, ReviewId, Room, RoomId, RoomType};

const MAX_TITLE_CHARS: usize = 100;
const MAX_LOCATION_CHARS: usize = 100;
const MAX_CONTACT_CHARS: usize = 20;
const MIN_RATING: i64 = 1;
const MAX_RATING: i64 = 5;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSchema {
    pub id: RoomId,
    pub owner_email: String,
    pub title: String,
    pub description: String,
    pub price: String,
    pub location: String,
    pub room_type: String,
    pub contact_number: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: String,
}

impl RoomSchema {
    pub fn from_room(room: &Room) -> Self {
        RoomSchema {
            id: room.id,
            owner_email: room.owner_email.clone(),
            title: room.title.clone(),
            description: room.description.clone(),
            price: room.price.to_string(),
            location: room.location.clone(),
            room_type: room.room_type.to_string(),
            contact_number: room.contact_number.clone(),
            latitude: room.coordinates.map(|c| c.latitude),
            longitude: room.coordinates.map(|c| c.longitude),
            created_at: format_timestamp(&room.created_at),
        }
    }
}

pub fn to_room_schemas(rooms: &[Room]) -> Vec<RoomSchema> {
    rooms.iter().map(RoomSchema::from_room).collect()
}

/// Prices are accepted both as JSON numbers and as decimal strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Number(f64),
    Text(String),
}

impl PriceInput {
    fn into_price(self) -> Result<Price, RoomError> {
        let value = match self {
            PriceInput::Number(value) => value,
            PriceInput::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| RoomError::validation("price", "must be a number"))?,
        };
        Price::from_f64(value)
    }
}

/// Payload of room creation and full updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRoomSchema {
    pub owner_email: String,
    pub title: String,
    pub description: String,
    pub price: PriceInput,
    pub location: String,
    #[serde(default)]
    pub room_type: Option<String>,
    pub contact_number: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl NewRoomSchema {
    pub fn into_new_room(self) -> Result<NewRoom, RoomError> {
        let owner_email = validate_user("owner_email", &self.owner_email)?;
        let title = required_text("title", &self.title, MAX_TITLE_CHARS)?;
        let description = required_text("description", &self.description, usize::MAX)?;
        let location = required_text("location", &self.location, MAX_LOCATION_CHARS)?;
        let contact_number =
            required_text("contact_number", &self.contact_number, MAX_CONTACT_CHARS)?;
        let price = self.price.into_price()?;
        let room_type = match self.room_type.as_deref().map(str::trim) {
            None | Some("") => RoomType::default(),
            Some(value) => value.parse()?,
        };
        let coordinates = match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates::new(latitude, longitude)?),
            (None, None) => None,
            _ => {
                return Err(RoomError::validation(
                    "coordinates",
                    "latitude and longitude must be given together",
                ))
            }
        };

        Ok(NewRoom {
            owner_email,
            title,
            description,
            price,
            location,
            room_type,
            contact_number,
            coordinates,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSchema {
    pub id: ReviewId,
    pub room_id: RoomId,
    pub user: String,
    pub rating: u8,
    pub comment: String,
    pub created_at: String,
}

impl ReviewSchema {
    pub fn from_review(review: &Review) -> Self {
        ReviewSchema {
            id: review.id,
            room_id: review.room_id,
            user: review.user.clone(),
            rating: review.rating,
            comment: review.comment.clone(),
            created_at: format_timestamp(&review.created_at),
        }
    }
}

pub fn to_review_schemas(reviews: &[Review]) -> Vec<ReviewSchema> {
    reviews.iter().map(ReviewSchema::from_review).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReviewSchema {
    pub user: String,
    pub rating: i64,
    #[serde(default)]
    pub comment: String,
}

impl NewReviewSchema {
    pub fn into_new_review(self) -> Result<NewReview, RoomError> {
        let user = validate_user("user", &self.user)?;
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(RoomError::validation(
                "rating",
                format!("must be between {} and {}", MIN_RATING, MAX_RATING),
            ));
        }
        Ok(NewReview {
            user,
            rating: self.rating as u8,
            comment: self.comment.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyRoomSchema {
    #[serde(flatten)]
    pub room: RoomSchema,
    pub distance_km: f64,
}

impl NearbyRoomSchema {
    pub fn from_nearby(nearby: &NearbyRoom) -> Self {
        NearbyRoomSchema {
            room: RoomSchema::from_room(&nearby.room),
            distance_km: nearby.distance_km,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BookmarkSchema {
    pub bookmarked: bool,
}

/// Users are identified by their email address; it must at least look like one.
pub fn validate_user(field: &'static str, user: &str) -> Result<String, RoomError> {
    let user = user.trim();
    if user.is_empty() {
        return Err(RoomError::validation(field, "must not be empty"));
    }
    if !user.contains('@') {
        return Err(RoomError::validation(field, "must be an email address"));
    }
    Ok(user.to_string())
}

fn required_text(field: &'static str, value: &str, max_chars: usize) -> Result<String, RoomError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(RoomError::validation(field, "must not be empty"));
    }
    if value.chars().count() > max_chars {
        return Err(RoomError::validation(
            field,
            format!("must be at most {} characters", max_chars),
        ));
    }
    Ok(value.to_string())
}

fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}
