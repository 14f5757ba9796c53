use std::time::Instant;

use tdigest::TDigest;

/// Collects recommendation latencies together with the corpus size they were measured at.
#[derive(Clone)]
pub struct Stopwatch {
    start_time: Instant,
    recommend_durations: Vec<CorpusSizeDurationMicros>,
}

pub type CorpusSizeDurationMicros = (usize, f64);

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    pub fn new() -> Stopwatch {
        Stopwatch {
            start_time: Instant::now(),
            recommend_durations: Vec::new(),
        }
    }

    pub fn start(&mut self) {
        self.start_time = Instant::now();
    }

    pub fn stop(&mut self, corpus_size: usize) {
        let duration_as_micros = self.start_time.elapsed().as_micros() as f64;
        self.recommend_durations.push((corpus_size, duration_as_micros));
    }

    pub fn get_n(&self) -> usize {
        self.recommend_durations.len()
    }

    /// Estimated latency quantile; 0 before anything was measured.
    pub fn get_percentile_in_micros(&self, q: f64) -> f64 {
        if self.recommend_durations.is_empty() {
            return 0.0;
        }
        let durations = self
            .recommend_durations
            .iter()
            .map(|(_, micros)| *micros)
            .collect();
        TDigest::new_with_size(100)
            .merge_unsorted(durations)
            .estimate_quantile(q)
    }

    pub fn get_raw_durations(&self) -> &[CorpusSizeDurationMicros] {
        &self.recommend_durations
    }
}
