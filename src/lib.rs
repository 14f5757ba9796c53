//! Roomfinder: room rental listings with content-based recommendations.
//!
//! Listings, reviews and bookmarks live in a RocksDB store behind the
//! repository traits in [`listings`]. The HTTP surface in [`endpoints`] is an
//! actix-web service; "similar rooms" are ranked by [`recommend`] with a
//! TF-IDF space that is rebuilt for every request.

pub mod catalog;
pub mod config;
pub mod config_processors;
pub mod endpoints;
pub mod error;
pub mod geo;
pub mod io;
pub mod listings;
pub mod logging;
pub mod recommend;
pub mod search;
pub mod stopwatch;
pub mod synthetic;
