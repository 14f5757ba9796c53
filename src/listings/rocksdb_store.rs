use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rocksdb::{Direction, IteratorMode, Options, WriteBatch, DB};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::RoomError;
use crate::listings::{
    user_key, BookmarkRepository, ListingRepository, NewReview, NewRoom, Review,
    ReviewRepository, Room, RoomId,
};

// Key layout, all integers big-endian so that prefix scans come back in id order:
//   room:    <room_id>                 -> Room
//   review:  <room_id> <review_id>     -> Review
//   bookmark:<user_key> <room_id>      -> epoch seconds
//   seq:room / seq:review              -> last issued id
const ROOM_PREFIX: &[u8] = b"room:";
const REVIEW_PREFIX: &[u8] = b"review:";
const BOOKMARK_PREFIX: &[u8] = b"bookmark:";
const ROOM_SEQUENCE: &[u8] = b"seq:room";
const REVIEW_SEQUENCE: &[u8] = b"seq:review";

pub struct RocksDBRoomStore {
    rocks_db: DB,
    // Serialises every read-modify-write against the store.
    write_lock: Mutex<()>,
}

impl RocksDBRoomStore {
    pub fn new(database_file: &str) -> Result<Self, RoomError> {
        let mut options = Options::default();
        options.create_if_missing(true);
        options.set_allow_mmap_reads(true);

        let rocks_db = DB::open(&options, database_file)?;
        debug!("opened room store at {}", database_file);

        Ok(Self {
            rocks_db,
            write_lock: Mutex::new(()),
        })
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // Callers must hold the write lock.
    fn next_id(&self, sequence_key: &[u8]) -> Result<u64, RoomError> {
        let last = match self.rocks_db.get(sequence_key)? {
            Some(bytes) => decode_u64(&bytes),
            None => 0,
        };
        let next = last + 1;
        self.rocks_db.put(sequence_key, next.to_be_bytes())?;
        Ok(next)
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Box<[u8]>, Box<[u8]>)>, RoomError> {
        let mut entries = Vec::new();
        for item in self
            .rocks_db
            .iterator(IteratorMode::From(prefix, Direction::Forward))
        {
            let (key, value) = item?;
            if !key.starts_with(prefix) {
                break;
            }
            entries.push((key, value));
        }
        Ok(entries)
    }

    fn scan_values<T: DeserializeOwned>(&self, prefix: &[u8]) -> Result<Vec<T>, RoomError> {
        self.scan_prefix(prefix)?
            .into_iter()
            .map(|(_, value)| bincode::deserialize(&value).map_err(RoomError::from))
            .collect()
    }

    fn put_room(&self, room: &Room) -> Result<(), RoomError> {
        let bytes = bincode::serialize(room)?;
        self.rocks_db.put(room_key(room.id), bytes)?;
        Ok(())
    }

    fn require_room(&self, id: RoomId) -> Result<Room, RoomError> {
        self.get(id)?.ok_or(RoomError::RoomNotFound(id))
    }
}

impl ListingRepository for RocksDBRoomStore {
    fn get(&self, id: RoomId) -> Result<Option<Room>, RoomError> {
        match self.rocks_db.get(room_key(id))? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn list(&self) -> Result<Vec<Room>, RoomError> {
        self.scan_values(ROOM_PREFIX)
    }

    fn filter(&self, predicate: &dyn Fn(&Room) -> bool) -> Result<Vec<Room>, RoomError> {
        let mut rooms = Vec::new();
        for (_, value) in self.scan_prefix(ROOM_PREFIX)? {
            let room: Room = bincode::deserialize(&value)?;
            if predicate(&room) {
                rooms.push(room);
            }
        }
        Ok(rooms)
    }

    fn insert(&self, new_room: NewRoom) -> Result<Room, RoomError> {
        let _guard = self.lock_writes();
        let id = self.next_id(ROOM_SEQUENCE)?;
        let room = new_room.into_room(id, Utc::now().naive_utc());
        self.put_room(&room)?;
        Ok(room)
    }

    fn update(&self, id: RoomId, new_room: NewRoom) -> Result<Room, RoomError> {
        let _guard = self.lock_writes();
        let existing = self.require_room(id)?;
        let mut room = new_room.into_room(id, existing.created_at);
        room.owner_email = existing.owner_email;
        self.put_room(&room)?;
        Ok(room)
    }

    fn delete(&self, id: RoomId) -> Result<(), RoomError> {
        let _guard = self.lock_writes();
        self.require_room(id)?;

        let mut batch = WriteBatch::default();
        batch.delete(room_key(id));
        for (key, _) in self.scan_prefix(&review_room_prefix(id))? {
            batch.delete(key);
        }
        let room_suffix = id.to_be_bytes();
        for (key, _) in self.scan_prefix(BOOKMARK_PREFIX)? {
            if key.ends_with(&room_suffix) {
                batch.delete(key);
            }
        }
        self.rocks_db.write(batch)?;
        Ok(())
    }
}

impl ReviewRepository for RocksDBRoomStore {
    fn add_review(&self, room_id: RoomId, review: NewReview) -> Result<Review, RoomError> {
        let _guard = self.lock_writes();
        self.require_room(room_id)?;
        let id = self.next_id(REVIEW_SEQUENCE)?;
        let review = review.into_review(id, room_id, Utc::now().naive_utc());

        let mut key = review_room_prefix(room_id);
        key.extend_from_slice(&id.to_be_bytes());
        self.rocks_db.put(key, bincode::serialize(&review)?)?;
        Ok(review)
    }

    fn reviews_for_room(&self, room_id: RoomId) -> Result<Vec<Review>, RoomError> {
        self.require_room(room_id)?;
        self.scan_values(&review_room_prefix(room_id))
    }

    fn reviews_by_user(&self, user: &str) -> Result<Vec<Review>, RoomError> {
        let user = user.trim();
        let mut reviews: Vec<Review> = self.scan_values(REVIEW_PREFIX)?;
        reviews.retain(|review| review.user.eq_ignore_ascii_case(user));
        Ok(reviews)
    }

    fn count_reviews(&self) -> Result<usize, RoomError> {
        Ok(self.scan_prefix(REVIEW_PREFIX)?.len())
    }
}

impl BookmarkRepository for RocksDBRoomStore {
    fn toggle_bookmark(&self, user: &str, room_id: RoomId) -> Result<bool, RoomError> {
        let _guard = self.lock_writes();
        self.require_room(room_id)?;
        let key = bookmark_key(user, room_id);
        if self.rocks_db.get(&key)?.is_some() {
            self.rocks_db.delete(&key)?;
            Ok(false)
        } else {
            let epoch_secs = Utc::now().timestamp() as u64;
            self.rocks_db.put(&key, epoch_secs.to_be_bytes())?;
            Ok(true)
        }
    }

    fn bookmarked_rooms(&self, user: &str) -> Result<Vec<RoomId>, RoomError> {
        let prefix = bookmark_user_prefix(user);
        Ok(self
            .scan_prefix(&prefix)?
            .into_iter()
            .map(|(key, _)| decode_u64(&key[prefix.len()..]))
            .collect())
    }
}

fn room_key(id: RoomId) -> Vec<u8> {
    let mut key = ROOM_PREFIX.to_vec();
    key.extend_from_slice(&id.to_be_bytes());
    key
}

fn review_room_prefix(room_id: RoomId) -> Vec<u8> {
    let mut key = REVIEW_PREFIX.to_vec();
    key.extend_from_slice(&room_id.to_be_bytes());
    key
}

fn bookmark_user_prefix(user: &str) -> Vec<u8> {
    let mut key = BOOKMARK_PREFIX.to_vec();
    key.extend_from_slice(&user_key(user).to_be_bytes());
    key
}

fn bookmark_key(user: &str, room_id: RoomId) -> Vec<u8> {
    let mut key = bookmark_user_prefix(user);
    key.extend_from_slice(&room_id.to_be_bytes());
    key
}

fn decode_u64(bytes: &[u8]) -> u64 {
    let mut buffer = [0_u8; 8];
    let len = bytes.len().min(8);
    buffer[8 - len..].copy_from_slice(&bytes[bytes.len() - len..]);
    u64::from_be_bytes(buffer)
}
