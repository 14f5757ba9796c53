use actix_web::{get, web, HttpResponse};
use serde::Deserialize;

use crate::catalog::SharedHandlesAndConfig;
use crate::error::RoomError;
use crate::geo::nearby_for;
use crate::listings::schema::NearbyRoomSchema;
use crate::listings::RoomId;

#[derive(Debug, Deserialize)]
pub struct NearbyParams {
    radius_km: Option<f64>,
    limit: Option<usize>,
}

#[get("/rooms/{room_id:\\d+}/nearby")]
pub async fn nearby_rooms(
    data: web::Data<SharedHandlesAndConfig>,
    room_id: web::Path<RoomId>,
    query: web::Query<NearbyParams>,
) -> Result<HttpResponse, RoomError> {
    let radius_km = query.radius_km.unwrap_or(data.nearby_radius_km);
    if !(radius_km.is_finite() && radius_km > 0.0) {
        return Err(RoomError::validation("radius_km", "must be a positive number"));
    }
    let limit = query.limit.unwrap_or(data.nearby_limit);

    let nearby = nearby_for(data.room_store.as_ref(), room_id.into_inner(), radius_km, limit)?;
    let rooms: Vec<NearbyRoomSchema> = nearby.iter().map(NearbyRoomSchema::from_nearby).collect();
    Ok(HttpResponse::Ok().json(rooms))
}
