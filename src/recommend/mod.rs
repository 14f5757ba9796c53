//! "Similar rooms" by text similarity.
//!
//! Every call projects the target and all candidates to one line of text,
//! fits a fresh TF-IDF space over them and ranks the candidates by cosine
//! similarity to the target. Nothing is cached between calls.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::iter;

use tracing::debug;

use crate::error::RoomError;
use crate::listings::{ListingRepository, Room, RoomId};
use crate::recommend::tfidf::{cosine_similarity, TfidfVectorizer};

pub mod stopwords;
pub mod tfidf;

pub const DEFAULT_NUM_ROOMS_TO_RECOMMEND: usize = 5;

/// A candidate's rank key: its position in the corpus and its similarity to the target.
#[derive(PartialEq, Debug)]
pub struct RoomScore {
    pub position: usize,
    pub score: f64,
}

impl RoomScore {
    fn new(position: usize, score: f64) -> Self {
        RoomScore { position, score }
    }
}

impl Eq for RoomScore {}

impl Ord for RoomScore {
    fn cmp(&self, other: &Self) -> Ordering {
        // Better ranks sort first: higher score, then earlier corpus position.
        match other.score.partial_cmp(&self.score) {
            Some(Ordering::Equal) | None => self.position.cmp(&other.position),
            Some(ordering) => ordering,
        }
    }
}

impl PartialOrd for RoomScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScoredRoom {
    pub room: Room,
    pub similarity: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Recommendation {
    /// There was nothing besides the target to compare against.
    NoCandidates,
    Ranked(Vec<ScoredRoom>),
}

impl Recommendation {
    pub fn len(&self) -> usize {
        match self {
            Recommendation::NoCandidates => 0,
            Recommendation::Ranked(ranked) => ranked.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_rooms(self) -> Vec<Room> {
        match self {
            Recommendation::NoCandidates => Vec::new(),
            Recommendation::Ranked(ranked) => ranked.into_iter().map(|scored| scored.room).collect(),
        }
    }
}

/// `"{title} {description} {location} {price}"`, the text a room is compared by.
pub fn project(room: &Room) -> String {
    format!(
        "{} {} {} {}",
        room.title, room.description, room.location, room.price
    )
}

/// Ranks `candidates` by similarity to `target` and keeps the best `how_many`.
///
/// Candidates with equal similarity keep their order in `candidates`. A
/// candidate carrying the target's id is never part of the corpus.
pub fn recommend(target: &Room, candidates: Vec<Room>, how_many: usize) -> Recommendation {
    let candidates: Vec<Room> = candidates
        .into_iter()
        .filter(|candidate| candidate.id != target.id)
        .collect();
    if candidates.is_empty() {
        return Recommendation::NoCandidates;
    }

    let documents: Vec<String> = iter::once(target)
        .chain(candidates.iter())
        .map(project)
        .collect();
    let vectors = TfidfVectorizer::english().fit_transform(&documents);
    let (target_vector, candidate_vectors) = match vectors.split_first() {
        Some(split) => split,
        None => return Recommendation::NoCandidates,
    };

    let mut top_rooms: BinaryHeap<RoomScore> =
        BinaryHeap::with_capacity(how_many.min(candidate_vectors.len()));
    for (position, vector) in candidate_vectors.iter().enumerate() {
        let scored = RoomScore::new(position, cosine_similarity(target_vector, vector));
        if top_rooms.len() < how_many {
            top_rooms.push(scored);
        } else if let Some(mut bottom) = top_rooms.peek_mut() {
            // The heap top is the worst kept rank.
            if scored < *bottom {
                *bottom = scored;
            }
        }
    }

    let mut slots: Vec<Option<Room>> = candidates.into_iter().map(Some).collect();
    let ranked = top_rooms
        .into_sorted_vec()
        .into_iter()
        .filter_map(|scored| {
            slots[scored.position].take().map(|room| ScoredRoom {
                room,
                similarity: scored.score,
            })
        })
        .collect();

    Recommendation::Ranked(ranked)
}

/// Looks up the target, loads every other room and ranks them.
pub fn recommend_for<R: ListingRepository + ?Sized>(
    repository: &R,
    target_id: RoomId,
    how_many: usize,
) -> Result<Recommendation, RoomError> {
    let target = repository
        .get(target_id)?
        .ok_or(RoomError::RoomNotFound(target_id))?;
    let corpus = repository.all_excluding(target_id)?;
    let corpus_size = corpus.len();

    let recommendation = recommend(&target, corpus, how_many);
    debug!(
        "recommended {} of {} rooms for room {}",
        recommendation.len(),
        corpus_size,
        target_id
    );
    Ok(recommendation)
}
