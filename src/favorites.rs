//! Favorite movies, persisted as full snapshots under `favorite-movies`.

use std::sync::Arc;

use crate::api::Movie;
use crate::storage::{self, FAVORITES_KEY, Storage, StorageError};

pub struct Favorites {
    storage: Arc<dyn Storage>,
    movies: Vec<Movie>,
}

impl Favorites {
    /// Load the stored set. Unreadable or malformed data starts an empty set.
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let movies = match storage::load_json::<Vec<Movie>>(storage.as_ref(), FAVORITES_KEY) {
            Ok(movies) => movies.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable favorites");
                Vec::new()
            }
        };
        Self { storage, movies }
    }

    #[must_use]
    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    #[must_use]
    pub fn is_favorite(&self, movie_id: u64) -> bool {
        self.movies.iter().any(|m| m.id == movie_id)
    }

    /// Add `movie` if absent, remove it if present, then persist.
    ///
    /// Returns whether the movie is a favorite afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated set cannot be persisted. The in-memory
    /// set keeps the toggle either way.
    pub fn toggle(&mut self, movie: &Movie) -> Result<bool, StorageError> {
        let now_favorite = match self.movies.iter().position(|m| m.id == movie.id) {
            Some(index) => {
                self.movies.remove(index);
                false
            }
            None => {
                self.movies.push(movie.clone());
                true
            }
        };
        storage::save_json(self.storage.as_ref(), FAVORITES_KEY, &self.movies)?;
        Ok(now_favorite)
    }
}

#[cfg(test)]
#[path = "favorites_test.rs"]
mod tests;
