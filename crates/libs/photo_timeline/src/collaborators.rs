//! Interfaces to the outside world the assembler depends on.
use async_trait::async_trait;
use color_eyre::Result;
use common_types::{EmbeddingVector, PhotoId, RawPhoto, Timeline};

/// Durable storage of photo records and assembled timelines.
#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Lists the photos that belong to a timeline.
    async fn list_photo_ids(&self, timeline_id: &str) -> Result<Vec<PhotoId>>;

    /// Loads one photo record with its raw metadata blob.
    async fn load_photo(&self, photo_id: &str) -> Result<RawPhoto>;

    /// Persists the assembled events and clusters.
    async fn store_timeline(&self, timeline_id: &str, timeline: &Timeline) -> Result<()>;
}

/// Face recognition model wrapper.
#[async_trait]
pub trait EmbeddingExtractor: Send + Sync {
    /// Returns the descriptor of the first detected face, or `None` when the photo has no face.
    async fn extract(&self, photo: &RawPhoto) -> Result<Option<EmbeddingVector>>;
}
