use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;

use crate::catalog::SharedHandlesAndConfig;
use crate::error::RoomError;
use crate::listings::schema::{to_review_schemas, validate_user, NewReviewSchema, ReviewSchema};
use crate::listings::{sort_reviews_newest_first, ReviewRepository, RoomId};

#[derive(Debug, Deserialize)]
pub struct UserParams {
    user: String,
}

#[post("/rooms/{room_id:\\d+}/reviews")]
pub async fn add_review(
    data: web::Data<SharedHandlesAndConfig>,
    room_id: web::Path<RoomId>,
    payload: web::Json<NewReviewSchema>,
) -> Result<HttpResponse, RoomError> {
    let review = payload.into_inner().into_new_review()?;
    let review = data.room_store.add_review(room_id.into_inner(), review)?;
    Ok(HttpResponse::Created().json(ReviewSchema::from_review(&review)))
}

#[get("/rooms/{room_id:\\d+}/reviews")]
pub async fn room_reviews(
    data: web::Data<SharedHandlesAndConfig>,
    room_id: web::Path<RoomId>,
) -> Result<HttpResponse, RoomError> {
    let mut reviews = data.room_store.reviews_for_room(room_id.into_inner())?;
    sort_reviews_newest_first(&mut reviews);
    Ok(HttpResponse::Ok().json(to_review_schemas(&reviews)))
}

#[get("/reviews/mine")]
pub async fn my_reviews(
    data: web::Data<SharedHandlesAndConfig>,
    query: web::Query<UserParams>,
) -> Result<HttpResponse, RoomError> {
    let user = validate_user("user", &query.user)?;
    let mut reviews = data.room_store.reviews_by_user(&user)?;
    sort_reviews_newest_first(&mut reviews);
    Ok(HttpResponse::Ok().json(to_review_schemas(&reviews)))
}
