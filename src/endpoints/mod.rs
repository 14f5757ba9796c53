use std::fmt::Display;

use actix_web::{web, Error, HttpRequest};
use tracing::debug;

use crate::error::RoomError;

pub mod bookmarks_resource;
pub mod index_resource;
pub mod nearby_resource;
pub mod profile_resource;
pub mod recommend_resource;
pub mod reviews_resource;
pub mod rooms_resource;

/// Registers every public route. `/rooms/all` and `/rooms/mine` go before
/// the `/rooms/{room_id}` routes.
///
/// Extractor failures (malformed JSON, missing or mistyped query parameters)
/// answer 400 with the same `{"detail"}` body as every other error.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, req| rejected("body", err, req)))
        .app_data(web::QueryConfig::default().error_handler(|err, req| rejected("query", err, req)))
        .app_data(web::PathConfig::default().error_handler(|err, req| rejected("path", err, req)));

    cfg.service(rooms_resource::list_rooms)
        .service(rooms_resource::create_room)
        .service(rooms_resource::all_rooms)
        .service(rooms_resource::my_rooms)
        .service(rooms_resource::get_room)
        .service(rooms_resource::update_room)
        .service(rooms_resource::delete_room)
        .service(reviews_resource::add_review)
        .service(reviews_resource::room_reviews)
        .service(reviews_resource::my_reviews)
        .service(bookmarks_resource::toggle_bookmark)
        .service(bookmarks_resource::my_bookmarks)
        .service(profile_resource::profile)
        .service(recommend_resource::recommend_similar)
        .service(nearby_resource::nearby_rooms)
        .service(index_resource::internal);
}

fn rejected(field: &'static str, err: impl Display, req: &HttpRequest) -> Error {
    debug!("rejected {} of {}: {}", field, req.path(), err);
    RoomError::validation(field, err.to_string()).into()
}

#[cfg(test)]
mod endpoints_test {
    use std::sync::Arc;

    use actix_web::http::{header, StatusCode};
    use actix_web::{test, App};

    use super::*;
    use crate::catalog::SharedHandlesAndConfig;
    use crate::endpoints::profile_resource::ProfileSchema;
    use crate::endpoints::recommend_resource::RecommendedRoomSchema;
    use crate::error::Detail;
    use crate::listings::schema::{
        BookmarkSchema, NearbyRoomSchema, NewReviewSchema, NewRoomSchema, PriceInput, ReviewSchema,
        RoomSchema,
    };
    use crate::listings::InMemoryRoomStore;
    use crate::search::FuzzyMatcher;

    const OWNER: &str = "owner@example.com";

    fn handles() -> SharedHandlesAndConfig {
        SharedHandlesAndConfig {
            room_store: Arc::new(InMemoryRoomStore::new()),
            num_rooms_to_recommend: 5,
            fuzzy_matcher: FuzzyMatcher::default(),
            nearby_radius_km: 5.0,
            nearby_limit: 10,
            qty_workers: 1,
            db_path: "memory".to_string(),
        }
    }

    fn payload(title: &str, location: &str, price: f64) -> NewRoomSchema {
        NewRoomSchema {
            owner_email: OWNER.to_string(),
            title: title.to_string(),
            description: "near campus".to_string(),
            price: PriceInput::Number(price),
            location: location.to_string(),
            room_type: Some("1BHK".to_string()),
            contact_number: "+977-9812345678".to_string(),
            latitude: None,
            longitude: None,
        }
    }

    fn located(title: &str, latitude: f64, longitude: f64) -> NewRoomSchema {
        let mut payload = payload(title, "Kathmandu", 9000.0);
        payload.latitude = Some(latitude);
        payload.longitude = Some(longitude);
        payload
    }

    macro_rules! app {
        () => {
            test::init_service(App::new().data(handles()).configure(configure)).await
        };
    }

    macro_rules! create {
        ($app:expr, $payload:expr) => {{
            let req = test::TestRequest::post()
                .uri("/rooms")
                .set_json(&$payload)
                .to_request();
            let resp = test::call_service(&mut $app, req).await;
            assert_eq!(StatusCode::CREATED, resp.status());
            let room: RoomSchema = test::read_body_json(resp).await;
            room
        }};
    }

    #[actix_rt::test]
    async fn should_create_and_fetch_room() {
        let mut app = app!();
        let created = create!(app, payload("Cozy Room", "Lalitpur", 10000.0));
        assert_eq!("10000.00", created.price);
        assert_eq!("1BHK", created.room_type);

        let req = test::TestRequest::get()
            .uri(&format!("/rooms/{}", created.id))
            .to_request();
        let fetched: RoomSchema = test::read_response_json(&mut app, req).await;
        assert_eq!(created, fetched);
    }

    #[actix_rt::test]
    async fn should_reject_invalid_room_payload() {
        let mut app = app!();
        let req = test::TestRequest::post()
            .uri("/rooms")
            .set_json(&payload("Cozy Room", "Lalitpur", -3.0))
            .to_request();
        let resp = test::call_service(&mut app, req).await;
        assert_eq!(StatusCode::BAD_REQUEST, resp.status());
        let detail: Detail = test::read_body_json(resp).await;
        assert!(detail.detail.contains("price"));
    }

    #[actix_rt::test]
    async fn should_answer_not_found_for_missing_room() {
        let mut app = app!();
        let req = test::TestRequest::get().uri("/rooms/42").to_request();
        let resp = test::call_service(&mut app, req).await;
        assert_eq!(StatusCode::NOT_FOUND, resp.status());
    }

    #[actix_rt::test]
    async fn should_search_rooms_newest_first() {
        let mut app = app!();
        create!(app, payload("Cozy Room", "Lalitpur", 10000.0));
        create!(app, payload("Garage space", "Kalanki", 5000.0));
        create!(app, payload("Sunny flat", "Lalitpur", 20000.0));

        let req = test::TestRequest::get().uri("/rooms?search=lalitpr").to_request();
        let rooms: Vec<RoomSchema> = test::read_response_json(&mut app, req).await;
        let titles: Vec<&str> = rooms.iter().map(|room| room.title.as_str()).collect();
        assert_eq!(vec!["Sunny flat", "Cozy Room"], titles);

        let req = test::TestRequest::get()
            .uri("/rooms?search=lalitpur&max_price=15000")
            .to_request();
        let rooms: Vec<RoomSchema> = test::read_response_json(&mut app, req).await;
        assert_eq!(1, rooms.len());

        let req = test::TestRequest::get().uri("/rooms?max_price=abc").to_request();
        let rooms: Vec<RoomSchema> = test::read_response_json(&mut app, req).await;
        assert_eq!(3, rooms.len());
    }

    #[actix_rt::test]
    async fn should_only_let_owner_modify_room() {
        let mut app = app!();
        let room = create!(app, payload("Cozy Room", "Lalitpur", 10000.0));

        let mut intruder = payload("Taken over", "Lalitpur", 1.0);
        intruder.owner_email = "someone@example.com".to_string();
        let req = test::TestRequest::put()
            .uri(&format!("/rooms/{}", room.id))
            .set_json(&intruder)
            .to_request();
        assert_eq!(StatusCode::FORBIDDEN, test::call_service(&mut app, req).await.status());

        let req = test::TestRequest::put()
            .uri(&format!("/rooms/{}", room.id))
            .set_json(&payload("Cozier Room", "Lalitpur", 11000.0))
            .to_request();
        let updated: RoomSchema = test::read_response_json(&mut app, req).await;
        assert_eq!("Cozier Room", updated.title);
        assert_eq!(room.created_at, updated.created_at);

        let req = test::TestRequest::delete()
            .uri(&format!("/rooms/{}?owner=someone@example.com", room.id))
            .to_request();
        assert_eq!(StatusCode::FORBIDDEN, test::call_service(&mut app, req).await.status());

        let req = test::TestRequest::delete()
            .uri(&format!("/rooms/{}?owner={}", room.id, OWNER))
            .to_request();
        assert_eq!(StatusCode::NO_CONTENT, test::call_service(&mut app, req).await.status());

        let req = test::TestRequest::get().uri("/rooms/all").to_request();
        let rooms: Vec<RoomSchema> = test::read_response_json(&mut app, req).await;
        assert!(rooms.is_empty());
    }

    #[actix_rt::test]
    async fn should_list_rooms_of_owner() {
        let mut app = app!();
        create!(app, payload("Cozy Room", "Lalitpur", 10000.0));
        let mut other = payload("Garage", "Kalanki", 5000.0);
        other.owner_email = "other@example.com".to_string();
        create!(app, other);

        let req = test::TestRequest::get()
            .uri(&format!("/rooms/mine?owner={}", OWNER))
            .to_request();
        let rooms: Vec<RoomSchema> = test::read_response_json(&mut app, req).await;
        assert_eq!(1, rooms.len());
        assert_eq!("Cozy Room", rooms[0].title);
    }

    #[actix_rt::test]
    async fn should_add_and_list_reviews() {
        let mut app = app!();
        let room = create!(app, payload("Cozy Room", "Lalitpur", 10000.0));

        let review = NewReviewSchema {
            user: "guest@example.com".to_string(),
            rating: 4,
            comment: " Quiet and clean ".to_string(),
        };
        let req = test::TestRequest::post()
            .uri(&format!("/rooms/{}/reviews", room.id))
            .set_json(&review)
            .to_request();
        let resp = test::call_service(&mut app, req).await;
        assert_eq!(StatusCode::CREATED, resp.status());
        let created: ReviewSchema = test::read_body_json(resp).await;
        assert_eq!("Quiet and clean", created.comment);

        let out_of_range = NewReviewSchema {
            rating: 6,
            ..review.clone()
        };
        let req = test::TestRequest::post()
            .uri(&format!("/rooms/{}/reviews", room.id))
            .set_json(&out_of_range)
            .to_request();
        assert_eq!(StatusCode::BAD_REQUEST, test::call_service(&mut app, req).await.status());

        let req = test::TestRequest::post()
            .uri("/rooms/999/reviews")
            .set_json(&review)
            .to_request();
        assert_eq!(StatusCode::NOT_FOUND, test::call_service(&mut app, req).await.status());

        let req = test::TestRequest::get()
            .uri(&format!("/rooms/{}/reviews", room.id))
            .to_request();
        let reviews: Vec<ReviewSchema> = test::read_response_json(&mut app, req).await;
        assert_eq!(vec![created.clone()], reviews);

        let req = test::TestRequest::get()
            .uri("/reviews/mine?user=guest@example.com")
            .to_request();
        let reviews: Vec<ReviewSchema> = test::read_response_json(&mut app, req).await;
        assert_eq!(vec![created], reviews);
    }

    #[actix_rt::test]
    async fn should_toggle_bookmarks() {
        let mut app = app!();
        let room = create!(app, payload("Cozy Room", "Lalitpur", 10000.0));
        let uri = format!("/bookmarks/{}?user=guest@example.com", room.id);

        let req = test::TestRequest::post().uri(&uri).to_request();
        let toggled: BookmarkSchema = test::read_response_json(&mut app, req).await;
        assert!(toggled.bookmarked);

        let req = test::TestRequest::get()
            .uri("/bookmarks/mine?user=guest@example.com")
            .to_request();
        let rooms: Vec<RoomSchema> = test::read_response_json(&mut app, req).await;
        assert_eq!(vec![room.id], rooms.iter().map(|room| room.id).collect::<Vec<_>>());

        let req = test::TestRequest::post().uri(&uri).to_request();
        let toggled: BookmarkSchema = test::read_response_json(&mut app, req).await;
        assert!(!toggled.bookmarked);

        let req = test::TestRequest::post()
            .uri("/bookmarks/999?user=guest@example.com")
            .to_request();
        assert_eq!(StatusCode::NOT_FOUND, test::call_service(&mut app, req).await.status());
    }

    #[actix_rt::test]
    async fn should_recommend_similar_rooms() {
        let mut app = app!();
        let target = create!(app, payload("Cozy Room", "Lalitpur", 10000.0));

        let req = test::TestRequest::get()
            .uri(&format!("/rooms/{}/recommend", target.id))
            .to_request();
        let resp = test::call_service(&mut app, req).await;
        assert_eq!(StatusCode::OK, resp.status());
        let detail: Detail = test::read_body_json(resp).await;
        assert_eq!("No other rooms to compare for recommendation.", detail.detail);

        let garage = create!(app, payload("Garage space downtown", "Kalanki", 5000.0));
        let twin = create!(app, payload("Cozy Room", "Lalitpur", 12000.0));

        let req = test::TestRequest::get()
            .uri(&format!("/rooms/{}/recommend", target.id))
            .to_request();
        let ranked: Vec<RecommendedRoomSchema> = test::read_response_json(&mut app, req).await;
        let ids: Vec<u64> = ranked.iter().map(|scored| scored.room.id).collect();
        assert_eq!(vec![twin.id, garage.id], ids);
        assert!(ranked[0].similarity > ranked[1].similarity);

        let req = test::TestRequest::get().uri("/rooms/999/recommend").to_request();
        assert_eq!(StatusCode::NOT_FOUND, test::call_service(&mut app, req).await.status());
    }

    #[actix_rt::test]
    async fn should_find_nearby_rooms() {
        let mut app = app!();
        let center = create!(app, located("Durbar Square flat", 27.7172, 85.3240));
        let boudha = create!(app, located("Boudha flat", 27.7215, 85.3620));
        create!(app, located("Bhaktapur flat", 27.6710, 85.4298));
        let without = create!(app, payload("Cozy Room", "Lalitpur", 10000.0));

        let req = test::TestRequest::get()
            .uri(&format!("/rooms/{}/nearby", center.id))
            .to_request();
        let nearby: Vec<NearbyRoomSchema> = test::read_response_json(&mut app, req).await;
        assert_eq!(vec![boudha.id], nearby.iter().map(|n| n.room.id).collect::<Vec<_>>());

        let req = test::TestRequest::get()
            .uri(&format!("/rooms/{}/nearby?radius_km=20&limit=1", center.id))
            .to_request();
        let nearby: Vec<NearbyRoomSchema> = test::read_response_json(&mut app, req).await;
        assert_eq!(1, nearby.len());
        assert_eq!(boudha.id, nearby[0].room.id);

        let req = test::TestRequest::get()
            .uri(&format!("/rooms/{}/nearby", without.id))
            .to_request();
        assert_eq!(StatusCode::BAD_REQUEST, test::call_service(&mut app, req).await.status());
    }

    #[actix_rt::test]
    async fn should_render_internal_page() {
        let mut app = app!();
        create!(app, payload("Cozy Room", "Lalitpur", 10000.0));
        let req = test::TestRequest::get().uri("/internal").to_request();
        let resp = test::call_service(&mut app, req).await;
        assert_eq!(StatusCode::OK, resp.status());
        let body = test::read_body(resp).await;
        let html = String::from_utf8_lossy(&body);
        assert!(html.contains("Qty rooms: 1"));
        assert!(html.contains("/rooms/1/recommend"));
    }

    #[actix_rt::test]
    async fn should_answer_detail_for_malformed_json() {
        let mut app = app!();
        let req = test::TestRequest::post()
            .uri("/rooms")
            .header(header::CONTENT_TYPE, "application/json")
            .set_payload(r#"{"owner_email": "owner@example.com", "price": 100"#)
            .to_request();
        let resp = test::call_service(&mut app, req).await;
        assert_eq!(StatusCode::BAD_REQUEST, resp.status());
        let detail: Detail = test::read_body_json(resp).await;
        assert!(detail.detail.starts_with("Invalid body"));

        let room = create!(app, payload("Cozy Room", "Lalitpur", 10000.0));
        let req = test::TestRequest::post()
            .uri(&format!("/rooms/{}/reviews", room.id))
            .header(header::CONTENT_TYPE, "application/json")
            .set_payload(r#"{"user": "guest@example.com", "rating": 4.5, "comment": "ok"}"#)
            .to_request();
        let resp = test::call_service(&mut app, req).await;
        assert_eq!(StatusCode::BAD_REQUEST, resp.status());
        let detail: Detail = test::read_body_json(resp).await;
        assert!(detail.detail.starts_with("Invalid body"));
    }

    #[actix_rt::test]
    async fn should_answer_detail_for_bad_query() {
        let mut app = app!();
        let room = create!(app, located("Durbar Square flat", 27.7172, 85.3240));

        let req = test::TestRequest::delete()
            .uri(&format!("/rooms/{}", room.id))
            .to_request();
        let resp = test::call_service(&mut app, req).await;
        assert_eq!(StatusCode::BAD_REQUEST, resp.status());
        let detail: Detail = test::read_body_json(resp).await;
        assert!(detail.detail.starts_with("Invalid query"));

        let req = test::TestRequest::get()
            .uri(&format!("/rooms/{}/nearby?radius_km=far", room.id))
            .to_request();
        let resp = test::call_service(&mut app, req).await;
        assert_eq!(StatusCode::BAD_REQUEST, resp.status());
        let detail: Detail = test::read_body_json(resp).await;
        assert!(detail.detail.starts_with("Invalid query"));

        // The room survived the rejected delete.
        let req = test::TestRequest::get()
            .uri(&format!("/rooms/{}", room.id))
            .to_request();
        assert_eq!(StatusCode::OK, test::call_service(&mut app, req).await.status());
    }

    #[actix_rt::test]
    async fn should_show_profile_of_user() {
        let mut app = app!();
        let cozy = create!(app, payload("Cozy Room", "Lalitpur", 10000.0));
        let garage = create!(app, payload("Garage space", "Kalanki", 5000.0));
        let flat = create!(app, payload("Sunny flat", "Boudha", 20000.0));

        for room_id in &[cozy.id, garage.id, cozy.id] {
            let review = NewReviewSchema {
                user: "guest@example.com".to_string(),
                rating: 4,
                comment: "Nice".to_string(),
            };
            let req = test::TestRequest::post()
                .uri(&format!("/rooms/{}/reviews", room_id))
                .set_json(&review)
                .to_request();
            assert_eq!(StatusCode::CREATED, test::call_service(&mut app, req).await.status());
        }
        let req = test::TestRequest::post()
            .uri(&format!("/bookmarks/{}?user=guest@example.com", flat.id))
            .to_request();
        assert_eq!(StatusCode::OK, test::call_service(&mut app, req).await.status());

        let req = test::TestRequest::get()
            .uri("/profile?user=Guest@example.com")
            .to_request();
        let profile: ProfileSchema = test::read_response_json(&mut app, req).await;
        assert_eq!("Guest@example.com", profile.user);
        let mut reviewed: Vec<u64> = profile.reviewed_rooms.iter().map(|room| room.id).collect();
        reviewed.sort_unstable();
        assert_eq!(vec![cozy.id, garage.id], reviewed);
        assert_eq!(vec![flat], profile.bookmarked_rooms);

        let req = test::TestRequest::get()
            .uri("/profile?user=nobody@example.com")
            .to_request();
        let profile: ProfileSchema = test::read_response_json(&mut app, req).await;
        assert!(profile.reviewed_rooms.is_empty());
        assert!(profile.bookmarked_rooms.is_empty());

        let req = test::TestRequest::get().uri("/profile").to_request();
        assert_eq!(StatusCode::BAD_REQUEST, test::call_service(&mut app, req).await.status());
    }
}
