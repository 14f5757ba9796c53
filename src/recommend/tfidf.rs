//! Sparse TF-IDF vectors over a small, per-request corpus.
//!
//! ```text
//! tfidf(t, d) = count(t, d) * idf(t)
//! idf(t)      = ln((1 + n) / (1 + df(t))) + 1
//! ```
//!
//! Each document vector is L2-normalised, so the cosine of two vectors is
//! their dot product. Tokens are lowercased runs of at least two word
//! characters (alphanumerics and `_`).

use hashbrown::HashMap;

use crate::recommend::stopwords::StopWords;

/// `(term index, weight)` pairs, sorted by term index.
pub type SparseVector = Vec<(usize, f64)>;

const MIN_TOKEN_CHARS: usize = 2;

pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
        .map(str::to_string)
        .collect()
}

pub struct TfidfVectorizer {
    stop_words: StopWords,
}

impl TfidfVectorizer {
    pub fn new(stop_words: StopWords) -> Self {
        TfidfVectorizer { stop_words }
    }

    pub fn english() -> Self {
        Self::new(StopWords::english())
    }

    /// Learns the vocabulary and idf weights from `documents` and returns one
    /// vector per document, in input order.
    pub fn fit_transform<S: AsRef<str>>(&self, documents: &[S]) -> Vec<SparseVector> {
        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let mut document_frequency: Vec<usize> = Vec::new();

        let term_counts: Vec<HashMap<usize, f64>> = documents
            .iter()
            .map(|document| {
                let mut counts: HashMap<usize, f64> = HashMap::new();
                for token in tokenize(document.as_ref()) {
                    if self.stop_words.contains(&token) {
                        continue;
                    }
                    let next_index = vocabulary.len();
                    let index = *vocabulary.entry(token).or_insert(next_index);
                    if index == document_frequency.len() {
                        document_frequency.push(0);
                    }
                    let count = counts.entry(index).or_insert(0.0);
                    if *count == 0.0 {
                        document_frequency[index] += 1;
                    }
                    *count += 1.0;
                }
                counts
            })
            .collect();

        let num_documents = documents.len() as f64;
        let idf: Vec<f64> = document_frequency
            .iter()
            .map(|df| ((1.0 + num_documents) / (1.0 + *df as f64)).ln() + 1.0)
            .collect();

        term_counts
            .into_iter()
            .map(|counts| {
                let mut vector: SparseVector = counts
                    .into_iter()
                    .map(|(index, count)| (index, count * idf[index]))
                    .collect();
                vector.sort_unstable_by_key(|(index, _)| *index);
                normalize(&mut vector);
                vector
            })
            .collect()
    }
}

fn normalize(vector: &mut SparseVector) {
    let norm = vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        for (_, weight) in vector.iter_mut() {
            *weight /= norm;
        }
    }
}

/// Cosine similarity of two sparse vectors; zero when either vector is empty.
pub fn cosine_similarity(a: &[(usize, f64)], b: &[(usize, f64)]) -> f64 {
    let mut dot = 0.0;
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                dot += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }

    let norm_a = a.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tfidf_test {
    use float_cmp::approx_eq;

    use super::*;

    #[test]
    fn should_tokenize_like_word_regex() {
        assert_eq!(
            vec!["cozy", "room", "10000", "00", "near_campus"],
            tokenize("Cozy room, a 10000.00 near_campus!")
        );
    }

    #[test]
    fn should_drop_stop_words() {
        let vectors = TfidfVectorizer::english().fit_transform(&["the room", "the garage"]);
        assert_eq!(1, vectors[0].len());
        assert_eq!(1, vectors[1].len());
        assert!(approx_eq!(f64, 0.0, cosine_similarity(&vectors[0], &vectors[1]), epsilon = 1e-12));
    }

    #[test]
    fn should_give_identical_documents_similarity_one() {
        let docs = ["cozy room near campus", "garage downtown", "cozy room near campus"];
        let vectors = TfidfVectorizer::english().fit_transform(&docs);
        assert!(approx_eq!(f64, 1.0, cosine_similarity(&vectors[0], &vectors[2]), epsilon = 1e-9));
    }

    #[test]
    fn should_weight_rare_terms_higher() {
        let docs = ["room lalitpur", "room kalanki", "room boudha"];
        let vectors = TfidfVectorizer::english().fit_transform(&docs);
        // "room" has index 0 and appears everywhere, "lalitpur" is unique to the first document.
        let first = &vectors[0];
        assert_eq!(0, first[0].0);
        assert!(first[1].1 > first[0].1);
        // idf values: 1.0 for "room", ln(4/2) + 1 for the rest.
        let expected_ratio = (2.0_f64).ln() + 1.0;
        assert!(approx_eq!(f64, expected_ratio, first[1].1 / first[0].1, epsilon = 1e-9));
    }

    #[test]
    fn should_handle_documents_without_terms() {
        let vectors = TfidfVectorizer::english().fit_transform(&["the a", "room"]);
        assert!(vectors[0].is_empty());
        assert!(approx_eq!(f64, 0.0, cosine_similarity(&vectors[0], &vectors[1]), epsilon = 1e-12));
    }
}
