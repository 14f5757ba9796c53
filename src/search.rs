//! Listing search: text, price ceiling and room type filters.
//!
//! Text matches when the query is a case-insensitive substring of the title,
//! description or location. Failing that, every query word must be close to
//! some word of those fields: within `max_edit_distance` edits and with a
//! fuzzy ratio of at least `ratio_threshold` (0-100).

use std::cmp;

use itertools::Itertools;

use crate::error::RoomError;
use crate::listings::{sort_newest_first, ListingRepository, Room};

pub const DEFAULT_FUZZY_RATIO_THRESHOLD: u32 = 60;
pub const DEFAULT_MAX_EDIT_DISTANCE: usize = 3;

/// Levenshtein distance over chars.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, a_char) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, b_char) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(a_char != b_char);
            current[j + 1] = cmp::min(substitution, cmp::min(previous[j + 1], current[j]) + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

/// `100 * (1 - distance / longest length)`, rounded; 100 for two empty strings.
pub fn fuzzy_ratio(a: &str, b: &str) -> u32 {
    let longest = cmp::max(a.chars().count(), b.chars().count());
    if longest == 0 {
        return 100;
    }
    let similarity = 1.0 - edit_distance(a, b) as f64 / longest as f64;
    (similarity * 100.0).round() as u32
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyMatcher {
    pub ratio_threshold: u32,
    pub max_edit_distance: usize,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        FuzzyMatcher {
            ratio_threshold: DEFAULT_FUZZY_RATIO_THRESHOLD,
            max_edit_distance: DEFAULT_MAX_EDIT_DISTANCE,
        }
    }
}

impl FuzzyMatcher {
    pub fn new(ratio_threshold: u32, max_edit_distance: usize) -> Self {
        FuzzyMatcher {
            ratio_threshold,
            max_edit_distance,
        }
    }

    fn word_matches(&self, term: &str, word: &str) -> bool {
        edit_distance(term, word) <= self.max_edit_distance
            && fuzzy_ratio(term, word) >= self.ratio_threshold
    }

    /// `query` must already be lowercased.
    pub fn matches(&self, query: &str, room: &Room) -> bool {
        let fields = [
            room.title.to_lowercase(),
            room.description.to_lowercase(),
            room.location.to_lowercase(),
        ];
        if fields.iter().any(|field| field.contains(query)) {
            return true;
        }

        let terms = words(query);
        let field_words = fields.iter().flat_map(|field| words(field)).collect_vec();
        !terms.is_empty()
            && terms
                .iter()
                .all(|term| field_words.iter().any(|word| self.word_matches(term, word)))
    }
}

fn words(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    pub text: Option<String>,
    pub max_price: Option<f64>,
    pub room_type: Option<String>,
}

impl SearchQuery {
    /// Builds a query from raw request parameters. Blank values are ignored,
    /// and so is a `max_price` that does not parse as a number.
    pub fn from_params(
        text: Option<&str>,
        max_price: Option<&str>,
        room_type: Option<&str>,
    ) -> Self {
        let non_blank = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        SearchQuery {
            text: non_blank(text).map(|text| text.to_lowercase()),
            max_price: non_blank(max_price)
                .and_then(|value| value.parse::<f64>().ok())
                .filter(|value| value.is_finite()),
            room_type: non_blank(room_type),
        }
    }

    pub fn matches(&self, room: &Room, matcher: &FuzzyMatcher) -> bool {
        if let Some(max_price) = self.max_price {
            if room.price.as_f64() > max_price {
                return false;
            }
        }
        if let Some(room_type) = &self.room_type {
            if !room.room_type.as_str().eq_ignore_ascii_case(room_type) {
                return false;
            }
        }
        match &self.text {
            Some(text) => matcher.matches(text, room),
            None => true,
        }
    }
}

/// Rooms matching `query`, newest first.
pub fn search_rooms<R: ListingRepository + ?Sized>(
    repository: &R,
    query: &SearchQuery,
    matcher: &FuzzyMatcher,
) -> Result<Vec<Room>, RoomError> {
    let mut rooms = repository.filter(&|room| query.matches(room, matcher))?;
    sort_newest_first(&mut rooms);
    Ok(rooms)
}
