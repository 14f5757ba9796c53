use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use hashbrown::{HashMap, HashSet};

use crate::error::RoomError;
use crate::listings::{
    user_key, BookmarkRepository, ListingRepository, NewReview, NewRoom, Review, ReviewId,
    ReviewRepository, Room, RoomId, UserKey,
};

/// Non-persistent store with the same semantics as the RocksDB one.
#[derive(Default)]
pub struct InMemoryRoomStore {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    rooms: HashMap<RoomId, Room>,
    reviews: Vec<Review>,
    bookmarks: HashSet<(UserKey, RoomId)>,
    last_room_id: RoomId,
    last_review_id: ReviewId,
}

impl InMemoryRoomStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ListingRepository for InMemoryRoomStore {
    fn get(&self, id: RoomId) -> Result<Option<Room>, RoomError> {
        Ok(self.read().rooms.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<Room>, RoomError> {
        let mut rooms: Vec<Room> = self.read().rooms.values().cloned().collect();
        rooms.sort_by_key(|room| room.id);
        Ok(rooms)
    }

    fn insert(&self, new_room: NewRoom) -> Result<Room, RoomError> {
        let mut tables = self.write();
        tables.last_room_id += 1;
        let room = new_room.into_room(tables.last_room_id, Utc::now().naive_utc());
        tables.rooms.insert(room.id, room.clone());
        Ok(room)
    }

    fn update(&self, id: RoomId, new_room: NewRoom) -> Result<Room, RoomError> {
        let mut tables = self.write();
        let existing = tables.rooms.get_mut(&id).ok_or(RoomError::RoomNotFound(id))?;
        let mut room = new_room.into_room(id, existing.created_at);
        room.owner_email = existing.owner_email.clone();
        *existing = room.clone();
        Ok(room)
    }

    fn delete(&self, id: RoomId) -> Result<(), RoomError> {
        let mut tables = self.write();
        tables.rooms.remove(&id).ok_or(RoomError::RoomNotFound(id))?;
        tables.reviews.retain(|review| review.room_id != id);
        tables.bookmarks.retain(|(_, room_id)| *room_id != id);
        Ok(())
    }
}

impl ReviewRepository for InMemoryRoomStore {
    fn add_review(&self, room_id: RoomId, review: NewReview) -> Result<Review, RoomError> {
        let mut tables = self.write();
        if !tables.rooms.contains_key(&room_id) {
            return Err(RoomError::RoomNotFound(room_id));
        }
        tables.last_review_id += 1;
        let review = review.into_review(tables.last_review_id, room_id, Utc::now().naive_utc());
        tables.reviews.push(review.clone());
        Ok(review)
    }

    fn reviews_for_room(&self, room_id: RoomId) -> Result<Vec<Review>, RoomError> {
        let tables = self.read();
        if !tables.rooms.contains_key(&room_id) {
            return Err(RoomError::RoomNotFound(room_id));
        }
        Ok(tables
            .reviews
            .iter()
            .filter(|review| review.room_id == room_id)
            .cloned()
            .collect())
    }

    fn reviews_by_user(&self, user: &str) -> Result<Vec<Review>, RoomError> {
        let user = user.trim();
        Ok(self
            .read()
            .reviews
            .iter()
            .filter(|review| review.user.eq_ignore_ascii_case(user))
            .cloned()
            .collect())
    }

    fn count_reviews(&self) -> Result<usize, RoomError> {
        Ok(self.read().reviews.len())
    }
}

impl BookmarkRepository for InMemoryRoomStore {
    fn toggle_bookmark(&self, user: &str, room_id: RoomId) -> Result<bool, RoomError> {
        let mut tables = self.write();
        if !tables.rooms.contains_key(&room_id) {
            return Err(RoomError::RoomNotFound(room_id));
        }
        let entry = (user_key(user), room_id);
        if tables.bookmarks.remove(&entry) {
            Ok(false)
        } else {
            tables.bookmarks.insert(entry);
            Ok(true)
        }
    }

    fn bookmarked_rooms(&self, user: &str) -> Result<Vec<RoomId>, RoomError> {
        let key = user_key(user);
        let mut room_ids: Vec<RoomId> = self
            .read()
            .bookmarks
            .iter()
            .filter(|(user, _)| *user == key)
            .map(|(_, room_id)| *room_id)
            .collect();
        room_ids.sort_unstable();
        Ok(room_ids)
    }
}
