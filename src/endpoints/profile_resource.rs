use actix_web::{get, web, HttpResponse};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::catalog::SharedHandlesAndConfig;
use crate::error::RoomError;
use crate::listings::schema::{to_room_schemas, validate_user, RoomSchema};
use crate::listings::{
    sort_reviews_newest_first, BookmarkRepository, ListingRepository, ReviewRepository, Room,
    RoomId, RoomStore,
};

#[derive(Debug, Deserialize)]
pub struct ProfileParams {
    user: String,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct ProfileSchema {
    pub user: String,
    pub reviewed_rooms: Vec<RoomSchema>,
    pub bookmarked_rooms: Vec<RoomSchema>,
}

/// Rooms the user reviewed (once each, most recently reviewed first) and the
/// rooms they bookmarked.
#[get("/profile")]
pub async fn profile(
    data: web::Data<SharedHandlesAndConfig>,
    query: web::Query<ProfileParams>,
) -> Result<HttpResponse, RoomError> {
    let user = validate_user("user", &query.user)?;

    let mut reviews = data.room_store.reviews_by_user(&user)?;
    sort_reviews_newest_first(&mut reviews);
    let reviewed_ids: Vec<RoomId> = reviews.iter().map(|review| review.room_id).unique().collect();

    let reviewed_rooms = existing_rooms(data.room_store.as_ref(), reviewed_ids)?;
    let bookmarked_rooms =
        existing_rooms(data.room_store.as_ref(), data.room_store.bookmarked_rooms(&user)?)?;

    Ok(HttpResponse::Ok().json(ProfileSchema {
        user,
        reviewed_rooms: to_room_schemas(&reviewed_rooms),
        bookmarked_rooms: to_room_schemas(&bookmarked_rooms),
    }))
}

fn existing_rooms(store: &dyn RoomStore, room_ids: Vec<RoomId>) -> Result<Vec<Room>, RoomError> {
    let mut rooms = Vec::with_capacity(room_ids.len());
    for room_id in room_ids {
        if let Some(room) = store.get(room_id)? {
            rooms.push(room);
        }
    }
    Ok(rooms)
}
