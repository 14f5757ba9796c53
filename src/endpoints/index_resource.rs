use actix_web::{get, web, HttpResponse};
use chrono::Utc;

use crate::catalog::{determine_catalog_statistics, CatalogStats, SharedHandlesAndConfig};
use crate::error::RoomError;
use crate::listings::{ListingRepository, RoomId};
use web::Data;

#[get("/internal")]
pub async fn internal(config: Data<SharedHandlesAndConfig>) -> Result<HttpResponse, RoomError> {
    let stats = determine_catalog_statistics(config.room_store.as_ref())?;

    let mut html = "<html>roomfinder: room listings with similar-room recommendations.<br />".to_string();
    push_catalog(&mut html, &stats);

    html.push_str("<h3>Recommender</h3>");
    html.push_str("Qty rooms to recommend: ");
    html.push_str(&config.num_rooms_to_recommend.to_string());
    html.push_str("<br />Similarity: TF-IDF (english stop words) + cosine, rebuilt per request");
    if let Some(newest) = newest_room_id(&config)? {
        html.push_str(&format!(
            "<br /><a href=\"/rooms/{}/recommend\">similar rooms for the newest listing</a>",
            newest
        ));
    }

    html.push_str("<h3>Search</h3>");
    html.push_str("Fuzzy ratio threshold: ");
    html.push_str(&config.fuzzy_matcher.ratio_threshold.to_string());
    html.push_str("<br />Max edit distance: ");
    html.push_str(&config.fuzzy_matcher.max_edit_distance.to_string());
    html.push_str("<br />Nearby radius (km): ");
    html.push_str(&config.nearby_radius_km.to_string());
    html.push_str("<br />Nearby limit: ");
    html.push_str(&config.nearby_limit.to_string());

    html.push_str("<h3>Machine instance</h3>");
    html.push_str("Qty CPU's detected: ");
    html.push_str(&sys_info::cpu_num().unwrap_or(0).to_string());
    html.push_str("<br />Qty actix workers set: ");
    html.push_str(&config.qty_workers.to_string());
    html.push_str("<br />CPU speed: ");
    html.push_str(&sys_info::cpu_speed().unwrap_or(0).to_string());
    html.push_str("MHz");
    html.push_str("<br />Active processes on instance: ");
    html.push_str(&sys_info::proc_total().unwrap_or(0).to_string());
    html.push_str("<h3>Room store</h3>");
    html.push_str("Path: ");
    html.push_str(&config.db_path);
    html.push_str("<h3>Metrics</h3>");
    html.push_str("<a href=\"/internal/prometheus\">prometheus</a>");
    html.push_str("</html>");

    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

fn push_catalog(html: &mut String, stats: &CatalogStats) {
    html.push_str("<h3>Catalogue</h3>");
    html.push_str("Qty rooms: ");
    html.push_str(&stats.qty_rooms.to_string());
    html.push_str("<br />Qty reviews: ");
    html.push_str(&stats.qty_reviews.to_string());
    html.push_str("<br />Qty unique locations: ");
    html.push_str(&stats.qty_unique_locations.to_string());
    html.push_str("<br />Qty rooms with coordinates: ");
    html.push_str(&stats.qty_rooms_with_coordinates.to_string());

    if let (Some(oldest), Some(newest)) = (stats.oldest_listing, stats.newest_listing) {
        html.push_str("<br />Oldest listing: ");
        html.push_str(&oldest.to_string());
        html.push_str("<br />Newest listing: ");
        html.push_str(&newest.to_string());
        html.push_str("<br />Age of newest listing (hours): ");
        html.push_str(&(Utc::now().naive_utc() - newest).num_hours().to_string());
    }

    html.push_str("<br />Price percentiles: ");
    let percentiles = [
        ("p5", stats.price_p05),
        ("p25", stats.price_p25),
        ("p50", stats.price_p50),
        ("p75", stats.price_p75),
        ("p90", stats.price_p90),
        ("p95", stats.price_p95),
        ("p100", stats.price_p100),
    ];
    for (label, price) in percentiles.iter() {
        html.push_str(&format!(" {}={:.2}", label, price));
    }
}

fn newest_room_id(config: &SharedHandlesAndConfig) -> Result<Option<RoomId>, RoomError> {
    Ok(config
        .room_store
        .list()?
        .iter()
        .max_by_key(|room| (room.created_at, room.id))
        .map(|room| room.id))
}
