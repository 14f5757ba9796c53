//! CSV import and export of listings.
//!
//! One row per room: `owner_email,title,description,price,location,room_type,
//! contact_number,latitude,longitude`. Ids and creation times are assigned by
//! the store on import.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::RoomError;
use crate::listings::schema::{NewRoomSchema, PriceInput};
use crate::listings::{ListingRepository, NewRoom, Room, RoomStore};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub owner_email: String,
    pub title: String,
    pub description: String,
    pub price: String,
    pub location: String,
    pub room_type: String,
    pub contact_number: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl ListingRecord {
    pub fn from_new_room(new_room: &NewRoom) -> Self {
        ListingRecord {
            owner_email: new_room.owner_email.clone(),
            title: new_room.title.clone(),
            description: new_room.description.clone(),
            price: new_room.price.to_string(),
            location: new_room.location.clone(),
            room_type: new_room.room_type.to_string(),
            contact_number: new_room.contact_number.clone(),
            latitude: new_room.coordinates.map(|c| c.latitude),
            longitude: new_room.coordinates.map(|c| c.longitude),
        }
    }

    pub fn from_room(room: &Room) -> Self {
        ListingRecord {
            owner_email: room.owner_email.clone(),
            title: room.title.clone(),
            description: room.description.clone(),
            price: room.price.to_string(),
            location: room.location.clone(),
            room_type: room.room_type.to_string(),
            contact_number: room.contact_number.clone(),
            latitude: room.coordinates.map(|c| c.latitude),
            longitude: room.coordinates.map(|c| c.longitude),
        }
    }

    /// Validates the record the same way an HTTP payload is validated.
    pub fn into_new_room(self) -> Result<NewRoom, RoomError> {
        NewRoomSchema {
            owner_email: self.owner_email,
            title: self.title,
            description: self.description,
            price: PriceInput::Text(self.price),
            location: self.location,
            room_type: Some(self.room_type),
            contact_number: self.contact_number,
            latitude: self.latitude,
            longitude: self.longitude,
        }
        .into_new_room()
    }
}

pub fn read_listings_csv<P: AsRef<Path>>(path: P) -> Result<Vec<NewRoom>, RoomError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut listings = Vec::new();
    for (row, record) in reader.deserialize::<ListingRecord>().enumerate() {
        match record?.into_new_room() {
            Ok(new_room) => listings.push(new_room),
            // Row 1 is the header.
            Err(err) => warn!("skipping listing on row {}: {}", row + 2, err),
        }
    }
    Ok(listings)
}

pub fn write_listings_csv<P: AsRef<Path>>(
    path: P,
    records: &[ListingRecord],
) -> Result<(), RoomError> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Imports the listings at `path` when the store holds no rooms yet.
/// Returns how many rooms were inserted.
pub fn seed_store_if_empty<P: AsRef<Path>>(
    store: &dyn RoomStore,
    path: P,
) -> Result<usize, RoomError> {
    if !store.list()?.is_empty() {
        info!("store already has listings, not seeding");
        return Ok(0);
    }

    let listings = read_listings_csv(&path)?;
    let qty_listings = listings.len();
    for new_room in listings {
        store.insert(new_room)?;
    }
    info!(
        "seeded {} listings from {}",
        qty_listings,
        path.as_ref().display()
    );
    Ok(qty_listings)
}
