use std::sync::Arc;

use actix_web::http::{header, ContentEncoding};
use actix_web::{middleware, web, App, HttpRequest, HttpResponse, HttpServer};
use actix_web_prom::PrometheusMetrics;
use anyhow::Context;
use tracing::info;

use roomfinder::catalog::{determine_catalog_statistics, SharedHandlesAndConfig};
use roomfinder::config::AppConfig;
use roomfinder::endpoints;
use roomfinder::io::seed_store_if_empty;
use roomfinder::listings::{RocksDBRoomStore, RoomStore};
use roomfinder::logging::init_logging;
use roomfinder::search::FuzzyMatcher;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_default();
    let config = AppConfig::new(&config_path)?;
    init_logging(&config.log.level);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    let qty_workers = config.server.num_workers;
    let num_rooms_to_recommend = config.recommend.num_rooms_to_recommend;
    let fuzzy_matcher = FuzzyMatcher::new(
        config.search.fuzzy_ratio_threshold,
        config.search.max_edit_distance,
    );
    let nearby_radius_km = config.search.nearby_radius_km;
    let nearby_limit = config.search.nearby_limit;
    let db_path = config.data.db_path.clone();

    info!("opening room store at {}", &db_path);
    let store: Arc<dyn RoomStore> = Arc::new(
        RocksDBRoomStore::new(&db_path)
            .with_context(|| format!("Could not open room store at {}", &db_path))?,
    );

    if let Some(seed_path) = &config.data.seed_listings_path {
        seed_store_if_empty(store.as_ref(), seed_path)
            .with_context(|| format!("Could not seed listings from {}", seed_path))?;
    }
    determine_catalog_statistics(store.as_ref())?;

    let prometheus = PrometheusMetrics::new("api", Some("/internal/prometheus"), None);

    info!("start httpd at http://{}", &bind_address);
    HttpServer::new(move || {
        let handles_and_config = SharedHandlesAndConfig {
            room_store: store.clone(),
            num_rooms_to_recommend,
            fuzzy_matcher,
            nearby_radius_km,
            nearby_limit,
            qty_workers,
            db_path: db_path.clone(),
        };

        App::new()
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::new(ContentEncoding::Identity))
            .wrap(prometheus.clone())
            .wrap(
                middleware::DefaultHeaders::new()
                    .header("Cache-Control", "no-cache, no-store, must-revalidate")
                    .header("Pragma", "no-cache")
                    .header("Expires", "0"),
            )
            .data(handles_and_config)
            .configure(endpoints::configure)
            .service(web::resource("/").route(web::get().to(|_req: HttpRequest| {
                HttpResponse::Found()
                    .header(header::LOCATION, "/internal")
                    .finish()
            })))
    })
    .workers(qty_workers)
    .bind(&bind_address)
    .with_context(|| format!("Could not bind server to address {}", &bind_address))?
    .run()
    .await?;

    Ok(())
}
