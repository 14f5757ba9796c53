use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;

use crate::catalog::SharedHandlesAndConfig;
use crate::error::RoomError;
use crate::listings::schema::{to_room_schemas, validate_user, BookmarkSchema};
use crate::listings::{BookmarkRepository, ListingRepository, Room, RoomId};

#[derive(Debug, Deserialize)]
pub struct BookmarkParams {
    user: String,
}

/// Bookmarks the room for the user, or removes the bookmark when it exists.
#[post("/bookmarks/{room_id:\\d+}")]
pub async fn toggle_bookmark(
    data: web::Data<SharedHandlesAndConfig>,
    room_id: web::Path<RoomId>,
    query: web::Query<BookmarkParams>,
) -> Result<HttpResponse, RoomError> {
    let user = validate_user("user", &query.user)?;
    let bookmarked = data.room_store.toggle_bookmark(&user, room_id.into_inner())?;
    Ok(HttpResponse::Ok().json(BookmarkSchema { bookmarked }))
}

#[get("/bookmarks/mine")]
pub async fn my_bookmarks(
    data: web::Data<SharedHandlesAndConfig>,
    query: web::Query<BookmarkParams>,
) -> Result<HttpResponse, RoomError> {
    let user = validate_user("user", &query.user)?;
    let mut rooms: Vec<Room> = Vec::new();
    for room_id in data.room_store.bookmarked_rooms(&user)? {
        if let Some(room) = data.room_store.get(room_id)? {
            rooms.push(room);
        }
    }
    Ok(HttpResponse::Ok().json(to_room_schemas(&rooms)))
}
