use actix_web::{get, web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::catalog::SharedHandlesAndConfig;
use crate::error::{Detail, RoomError};
use crate::listings::schema::RoomSchema;
use crate::listings::RoomId;
use crate::recommend::{recommend_for, Recommendation};

const NO_CANDIDATES_DETAIL: &str = "No other rooms to compare for recommendation.";

#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendedRoomSchema {
    #[serde(flatten)]
    pub room: RoomSchema,
    pub similarity: f64,
}

// Rooms most similar to the given one, best first. A catalogue holding only
// this room is not an error: it answers 200 with a detail message instead.
#[get("/rooms/{room_id:\\d+}/recommend")]
pub async fn recommend_similar(
    data: web::Data<SharedHandlesAndConfig>,
    room_id: web::Path<RoomId>,
) -> Result<HttpResponse, RoomError> {
    let recommendation = recommend_for(
        data.room_store.as_ref(),
        room_id.into_inner(),
        data.num_rooms_to_recommend,
    )?;

    let response = match recommendation {
        Recommendation::NoCandidates => HttpResponse::Ok().json(Detail {
            detail: NO_CANDIDATES_DETAIL.to_string(),
        }),
        Recommendation::Ranked(ranked) => {
            let rooms: Vec<RecommendedRoomSchema> = ranked
                .iter()
                .map(|scored| RecommendedRoomSchema {
                    room: RoomSchema::from_room(&scored.room),
                    similarity: scored.similarity,
                })
                .collect();
            HttpResponse::Ok().json(rooms)
        }
    };
    Ok(response)
}
