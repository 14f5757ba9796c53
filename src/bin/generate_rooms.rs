use anyhow::Context;
use indicatif::ProgressBar;
use num_format::{Locale, ToFormattedString};
use tracing::info;

use roomfinder::config::AppConfig;
use roomfinder::io::{write_listings_csv, ListingRecord};
use roomfinder::listings::{ListingRepository, RocksDBRoomStore};
use roomfinder::logging::init_logging;
use roomfinder::synthetic::{generate_rooms, DEFAULT_OWNER_EMAIL, DEFAULT_QTY_ROOMS};

const SEED: u64 = 42;

// Usage: generate_rooms [qty_rooms] [output.csv]
// Without an output file the rooms replace every listing in the configured store.
fn main() -> anyhow::Result<()> {
    let config = AppConfig::new("")?;
    init_logging(&config.log.level);

    let qty_rooms = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse::<usize>()
            .with_context(|| format!("Not a number of rooms: {}", arg))?,
        None => DEFAULT_QTY_ROOMS,
    };
    let rooms = generate_rooms(qty_rooms, SEED, DEFAULT_OWNER_EMAIL);

    if let Some(csv_path) = std::env::args().nth(2) {
        let records: Vec<ListingRecord> = rooms.iter().map(ListingRecord::from_new_room).collect();
        write_listings_csv(&csv_path, &records)
            .with_context(|| format!("Could not write {}", csv_path))?;
        info!(
            "wrote {} rooms to {}",
            qty_rooms.to_formatted_string(&Locale::en),
            csv_path
        );
        return Ok(());
    }

    let store = RocksDBRoomStore::new(&config.data.db_path)
        .with_context(|| format!("Could not open room store at {}", config.data.db_path))?;

    let existing = store.list()?;
    for room in &existing {
        store.delete(room.id)?;
    }
    info!("removed {} existing rooms", existing.len());

    let pb = ProgressBar::new(qty_rooms as u64);
    for new_room in rooms {
        store.insert(new_room)?;
        pb.inc(1);
    }
    pb.finish();

    info!(
        "generated {} rooms in {}",
        qty_rooms.to_formatted_string(&Locale::en),
        config.data.db_path
    );
    Ok(())
}
