use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Deserialize;
use tracing::info;

use crate::catalog::SharedHandlesAndConfig;
use crate::error::RoomError;
use crate::listings::schema::{to_room_schemas, validate_user, NewRoomSchema, RoomSchema};
use crate::listings::{sort_newest_first, ListingRepository, RoomId};
use crate::search::{search_rooms, SearchQuery};

#[derive(Debug, Deserialize)]
pub struct ListRoomsParams {
    search: Option<String>,
    max_price: Option<String>,
    room_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OwnerParams {
    owner: String,
}

#[get("/rooms")]
pub async fn list_rooms(
    data: web::Data<SharedHandlesAndConfig>,
    query: web::Query<ListRoomsParams>,
) -> Result<HttpResponse, RoomError> {
    let search_query = SearchQuery::from_params(
        query.search.as_deref(),
        query.max_price.as_deref(),
        query.room_type.as_deref(),
    );
    let rooms = search_rooms(data.room_store.as_ref(), &search_query, &data.fuzzy_matcher)?;
    Ok(HttpResponse::Ok().json(to_room_schemas(&rooms)))
}

#[post("/rooms")]
pub async fn create_room(
    data: web::Data<SharedHandlesAndConfig>,
    payload: web::Json<NewRoomSchema>,
) -> Result<HttpResponse, RoomError> {
    let new_room = payload.into_inner().into_new_room()?;
    let room = data.room_store.insert(new_room)?;
    info!("room {} listed by {}", room.id, room.owner_email);
    Ok(HttpResponse::Created().json(RoomSchema::from_room(&room)))
}

// Unfiltered, for the map view.
#[get("/rooms/all")]
pub async fn all_rooms(data: web::Data<SharedHandlesAndConfig>) -> Result<HttpResponse, RoomError> {
    let rooms = data.room_store.list()?;
    Ok(HttpResponse::Ok().json(to_room_schemas(&rooms)))
}

#[get("/rooms/mine")]
pub async fn my_rooms(
    data: web::Data<SharedHandlesAndConfig>,
    query: web::Query<OwnerParams>,
) -> Result<HttpResponse, RoomError> {
    let owner = validate_user("owner", &query.owner)?;
    let mut rooms = data
        .room_store
        .filter(&|room| room.owner_email.eq_ignore_ascii_case(&owner))?;
    sort_newest_first(&mut rooms);
    Ok(HttpResponse::Ok().json(to_room_schemas(&rooms)))
}

#[get("/rooms/{room_id:\\d+}")]
pub async fn get_room(
    data: web::Data<SharedHandlesAndConfig>,
    room_id: web::Path<RoomId>,
) -> Result<HttpResponse, RoomError> {
    let room_id = room_id.into_inner();
    let room = data
        .room_store
        .get(room_id)?
        .ok_or(RoomError::RoomNotFound(room_id))?;
    Ok(HttpResponse::Ok().json(RoomSchema::from_room(&room)))
}

#[put("/rooms/{room_id:\\d+}")]
pub async fn update_room(
    data: web::Data<SharedHandlesAndConfig>,
    room_id: web::Path<RoomId>,
    payload: web::Json<NewRoomSchema>,
) -> Result<HttpResponse, RoomError> {
    let room_id = room_id.into_inner();
    let new_room = payload.into_inner().into_new_room()?;
    ensure_owner(&data, room_id, &new_room.owner_email)?;
    let room = data.room_store.update(room_id, new_room)?;
    Ok(HttpResponse::Ok().json(RoomSchema::from_room(&room)))
}

#[delete("/rooms/{room_id:\\d+}")]
pub async fn delete_room(
    data: web::Data<SharedHandlesAndConfig>,
    room_id: web::Path<RoomId>,
    query: web::Query<OwnerParams>,
) -> Result<HttpResponse, RoomError> {
    let room_id = room_id.into_inner();
    let owner = validate_user("owner", &query.owner)?;
    ensure_owner(&data, room_id, &owner)?;
    data.room_store.delete(room_id)?;
    info!("room {} removed by {}", room_id, owner);
    Ok(HttpResponse::NoContent().finish())
}

fn ensure_owner(data: &SharedHandlesAndConfig, room_id: RoomId, owner: &str) -> Result<(), RoomError> {
    let room = data
        .room_store
        .get(room_id)?
        .ok_or(RoomError::RoomNotFound(room_id))?;
    if room.owner_email.eq_ignore_ascii_case(owner.trim()) {
        Ok(())
    } else {
        Err(RoomError::NotOwner(room_id))
    }
}
