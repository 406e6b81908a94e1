use std::collections::{BTreeMap, BTreeSet};

use serde::{de::DeserializeOwned, Serialize};
use tracing::info;

use crate::{models::WorkId, store::KeyValueStore};

pub const BOOKMARKS_KEY: &str = "bookmarks";
pub const RATINGS_KEY: &str = "ratings";

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Bookmarks and ratings of the local profile. Bookmarks and ratings live
/// under separate keys and every mutation is a single key write.
pub struct PreferenceStore<S> {
    store: S,
}

impl<S: KeyValueStore> PreferenceStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn read<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, crate::Error> {
        match self.store.get(key).await? {
            Some(text) => Ok(serde_json::from_str(&text)?),
            None => Ok(T::default()),
        }
    }

    async fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<(), crate::Error> {
        self.store.set(key, &serde_json::to_string(value)?).await
    }

    pub async fn bookmarks(&self) -> Result<BTreeSet<WorkId>, crate::Error> {
        self.read(BOOKMARKS_KEY).await
    }

    pub async fn is_bookmarked(&self, work_id: WorkId) -> Result<bool, crate::Error> {
        Ok(self.bookmarks().await?.contains(&work_id))
    }

    /// Returns whether the bookmark was newly added.
    pub async fn add_bookmark(&self, work_id: WorkId) -> Result<bool, crate::Error> {
        let mut bookmarks = self.bookmarks().await?;

        if !bookmarks.insert(work_id) {
            return Ok(false);
        }

        self.write(BOOKMARKS_KEY, &bookmarks).await?;

        info!("Bookmarked work {work_id}");

        Ok(true)
    }

    /// Returns whether a bookmark was removed.
    pub async fn remove_bookmark(&self, work_id: WorkId) -> Result<bool, crate::Error> {
        let mut bookmarks = self.bookmarks().await?;

        if !bookmarks.remove(&work_id) {
            return Ok(false);
        }

        self.write(BOOKMARKS_KEY, &bookmarks).await?;

        info!("Removed bookmark for work {work_id}");

        Ok(true)
    }

    pub async fn set_bookmarked(&self, work_id: WorkId, bookmarked: bool) -> Result<(), crate::Error> {
        if bookmarked {
            self.add_bookmark(work_id).await?;
        } else {
            self.remove_bookmark(work_id).await?;
        }

        Ok(())
    }

    /// Flips the bookmark and returns the new state.
    pub async fn toggle_bookmark(&self, work_id: WorkId) -> Result<bool, crate::Error> {
        if self.remove_bookmark(work_id).await? {
            Ok(false)
        } else {
            self.add_bookmark(work_id).await
        }
    }

    pub async fn clear_bookmarks(&self) -> Result<(), crate::Error> {
        self.store.remove(BOOKMARKS_KEY).await?;

        info!("Cleared bookmarks");

        Ok(())
    }

    pub async fn ratings(&self) -> Result<BTreeMap<WorkId, u8>, crate::Error> {
        self.read(RATINGS_KEY).await
    }

    /// The score given to `work_id`, or `0` if it was never rated.
    pub async fn rating(&self, work_id: WorkId) -> Result<u8, crate::Error> {
        Ok(self
            .ratings()
            .await?
            .get(&work_id)
            .copied()
            .unwrap_or_default())
    }

    /// Records `score` for `work_id`, replacing any earlier score.
    pub async fn rate(&self, work_id: WorkId, score: u8) -> Result<(), crate::Error> {
        if !(MIN_RATING..=MAX_RATING).contains(&score) {
            return Err(crate::Error::InvalidRating(score));
        }

        let mut ratings = self.ratings().await?;
        ratings.insert(work_id, score);

        self.write(RATINGS_KEY, &ratings).await?;

        info!("Rated work {work_id} with {score} stars");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use crate::{
        models::WorkId,
        store::{KeyValueStore, MemoryStore},
    };

    use super::{PreferenceStore, BOOKMARKS_KEY, RATINGS_KEY};

    fn preferences() -> PreferenceStore<MemoryStore> {
        PreferenceStore::new(MemoryStore::new())
    }

    #[tokio::test]
    async fn test_bookmark_round_trip() -> Result<(), crate::Error> {
        let preferences = preferences();
        preferences.add_bookmark(WorkId(7)).await?;

        let before = preferences.bookmarks().await?;

        assert!(preferences.add_bookmark(WorkId(3)).await?);
        assert!(preferences.is_bookmarked(WorkId(3)).await?);
        assert!(preferences.remove_bookmark(WorkId(3)).await?);

        assert_eq!(preferences.bookmarks().await?, before);

        Ok(())
    }

    #[tokio::test]
    async fn test_bookmark_idempotence() -> Result<(), crate::Error> {
        let preferences = preferences();

        assert!(preferences.add_bookmark(WorkId(1)).await?);
        assert!(!preferences.add_bookmark(WorkId(1)).await?);
        assert!(!preferences.remove_bookmark(WorkId(2)).await?);
        assert_eq!(preferences.bookmarks().await?, BTreeSet::from([WorkId(1)]));

        assert!(!preferences.toggle_bookmark(WorkId(1)).await?);
        assert!(preferences.toggle_bookmark(WorkId(1)).await?);

        preferences.set_bookmarked(WorkId(1), false).await?;
        assert!(preferences.bookmarks().await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_bookmarks_are_stored_as_json_array() -> Result<(), crate::Error> {
        let preferences = preferences();
        preferences.add_bookmark(WorkId(2)).await?;
        preferences.add_bookmark(WorkId(1)).await?;

        assert_eq!(
            preferences.store().get(BOOKMARKS_KEY).await?.as_deref(),
            Some("[1,2]")
        );

        preferences.clear_bookmarks().await?;
        assert_eq!(preferences.store().get(BOOKMARKS_KEY).await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_last_rating_wins() -> Result<(), crate::Error> {
        let preferences = preferences();

        assert_eq!(preferences.rating(WorkId(4)).await?, 0);

        preferences.rate(WorkId(4), 2).await?;
        preferences.rate(WorkId(4), 5).await?;

        assert_eq!(preferences.rating(WorkId(4)).await?, 5);
        assert_eq!(preferences.ratings().await?.len(), 1);
        assert_eq!(
            preferences.store().get(RATINGS_KEY).await?.as_deref(),
            Some(r#"{"4":5}"#)
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_rating() -> Result<(), crate::Error> {
        let preferences = preferences();

        assert!(matches!(
            preferences.rate(WorkId(1), 0).await,
            Err(crate::Error::InvalidRating(0))
        ));
        assert!(matches!(
            preferences.rate(WorkId(1), 6).await,
            Err(crate::Error::InvalidRating(6))
        ));
        assert!(preferences.ratings().await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_corrupt_value() -> Result<(), crate::Error> {
        let preferences = preferences();
        preferences.store().set(RATINGS_KEY, "not json").await?;

        assert!(matches!(
            preferences.rating(WorkId(1)).await,
            Err(crate::Error::Json(_))
        ));

        Ok(())
    }
}
