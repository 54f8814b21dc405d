use async_trait::async_trait;
use showcase_core::DateKey;

use crate::movie::Movie;

#[derive(Debug, thiserror::Error)]
#[error("could not mirror poster of movie {id}: {reason}")]
pub struct MirrorError {
    pub id: u64,
    pub reason: String,
}

/// Copies poster images into durable storage.
#[async_trait]
pub trait PosterMirror: Send + Sync {
    /// Returns `true` if the movie's poster already points at durable storage.
    fn is_mirrored(&self, movie: &Movie) -> bool;

    /// Stores the poster of `movie` and returns its durable URL, or `None`
    /// if there was nothing to store.
    async fn mirror(&self, date: &DateKey, movie: &Movie) -> Result<Option<String>, MirrorError>;
}

/// Leaves posters where they are.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughMirror;

#[async_trait]
impl PosterMirror for PassthroughMirror {
    fn is_mirrored(&self, _movie: &Movie) -> bool {
        true
    }

    async fn mirror(&self, _date: &DateKey, _movie: &Movie) -> Result<Option<String>, MirrorError> {
        Ok(None)
    }
}
