use std::sync::Arc;

use chrono::NaiveDateTime;
use rayon::prelude::*;
use tdigest::TDigest;
use tracing::info;

use crate::error::RoomError;
use crate::listings::{ListingRepository, ReviewRepository, Room, RoomStore};
use crate::search::FuzzyMatcher;

/// Everything a request handler needs, shared across actix workers.
pub struct SharedHandlesAndConfig {
    pub room_store: Arc<dyn RoomStore>,
    pub num_rooms_to_recommend: usize,
    pub fuzzy_matcher: FuzzyMatcher,
    pub nearby_radius_km: f64,
    pub nearby_limit: usize,
    pub qty_workers: usize,
    pub db_path: String,
}

pub struct CatalogStats {
    pub qty_rooms: usize,
    pub qty_reviews: usize,
    pub qty_unique_locations: usize,
    pub qty_rooms_with_coordinates: usize,
    pub oldest_listing: Option<NaiveDateTime>,
    pub newest_listing: Option<NaiveDateTime>,
    pub price_p05: f64,
    pub price_p25: f64,
    pub price_p50: f64,
    pub price_p75: f64,
    pub price_p90: f64,
    pub price_p95: f64,
    pub price_p100: f64,
}

pub fn determine_catalog_statistics(store: &dyn RoomStore) -> Result<CatalogStats, RoomError> {
    let rooms = store.list()?;
    let qty_reviews = store.count_reviews()?;
    let stats = catalog_statistics(&rooms, qty_reviews);

    info!(
        "catalog: {} rooms, {} reviews, {} locations, median price {:.2}",
        stats.qty_rooms, stats.qty_reviews, stats.qty_unique_locations, stats.price_p50
    );
    Ok(stats)
}

fn catalog_statistics(rooms: &[Room], qty_reviews: usize) -> CatalogStats {
    let mut locations: Vec<String> = rooms
        .par_iter()
        .map(|room| room.location.trim().to_lowercase())
        .collect();
    locations.par_sort_unstable();
    locations.dedup();

    let qty_rooms_with_coordinates = rooms
        .par_iter()
        .filter(|room| room.coordinates.is_some())
        .count();

    let oldest_listing = rooms.par_iter().map(|room| room.created_at).min();
    let newest_listing = rooms.par_iter().map(|room| room.created_at).max();

    let prices: Vec<f64> = rooms.iter().map(|room| room.price.as_f64()).collect();
    let price_at = percentiles(prices);

    CatalogStats {
        qty_rooms: rooms.len(),
        qty_reviews,
        qty_unique_locations: locations.len(),
        qty_rooms_with_coordinates,
        oldest_listing,
        newest_listing,
        price_p05: price_at(0.05),
        price_p25: price_at(0.25),
        price_p50: price_at(0.5),
        price_p75: price_at(0.75),
        price_p90: price_at(0.9),
        price_p95: price_at(0.95),
        price_p100: price_at(1.0),
    }
}

/// Quantile estimator over `values`; every quantile is 0 when there are none.
fn percentiles(values: Vec<f64>) -> impl Fn(f64) -> f64 {
    let digest = if values.is_empty() {
        None
    } else {
        Some(TDigest::new_with_size(100).merge_unsorted(values))
    };
    move |q| digest.as_ref().map_or(0.0, |digest| digest.estimate_quantile(q))
}
