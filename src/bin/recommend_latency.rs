use bencher::black_box;
use indicatif::ProgressBar;
use num_format::{Locale, ToFormattedString};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_pcg::Pcg64;

use roomfinder::listings::{InMemoryRoomStore, ListingRepository};
use roomfinder::recommend::{recommend_for, DEFAULT_NUM_ROOMS_TO_RECOMMEND};
use roomfinder::stopwatch::Stopwatch;
use roomfinder::synthetic::{generate_rooms, DEFAULT_OWNER_EMAIL};

const NUM_REPETITIONS: usize = 200;

// Measures end-to-end latency of "similar rooms" for growing catalogues.
// Output: corpus_size,n,p50_(us),p90_(us),p99_(us)
fn main() -> anyhow::Result<()> {
    println!("corpus_size,n,p50_(us),p90_(us),p99_(us)");

    for corpus_size in &[100_usize, 500, 1_000, 5_000] {
        let store = InMemoryRoomStore::new();
        for new_room in generate_rooms(*corpus_size, *corpus_size as u64, DEFAULT_OWNER_EMAIL) {
            store.insert(new_room)?;
        }
        let room_ids: Vec<u64> = store.list()?.iter().map(|room| room.id).collect();

        let mut rng = Pcg64::seed_from_u64(*corpus_size as u64);
        let mut stopwatch = Stopwatch::new();
        let pb = ProgressBar::new(NUM_REPETITIONS as u64);
        for _ in 0..NUM_REPETITIONS {
            let target_id = match room_ids.choose(&mut rng) {
                Some(id) => *id,
                None => break,
            };
            stopwatch.start();
            black_box(recommend_for(&store, target_id, DEFAULT_NUM_ROOMS_TO_RECOMMEND)?);
            stopwatch.stop(*corpus_size);
            pb.inc(1);
        }
        pb.finish_and_clear();

        println!(
            "{},{},{},{},{}",
            corpus_size.to_formatted_string(&Locale::en),
            stopwatch.get_n(),
            stopwatch.get_percentile_in_micros(0.5).round() as u64,
            stopwatch.get_percentile_in_micros(0.9).round() as u64,
            stopwatch.get_percentile_in_micros(0.99).round() as u64,
        );
    }
    Ok(())
}
