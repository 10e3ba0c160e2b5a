use color_eyre::eyre;
use common_types::PhotoId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("embedding for photo '{photo_id}' has {actual} dimensions, expected {expected}")]
    DimensionMismatch {
        photo_id: PhotoId,
        expected: usize,
        actual: usize,
    },

    #[error("clustering threshold must be a non-negative number, got {0}")]
    InvalidThreshold(f32),

    #[error("embedding dimension must be positive")]
    InvalidDimension,

    #[error("batch size must be positive")]
    InvalidBatchSize,
}

#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("face clustering failed: {0}")]
    Clustering(#[from] ClusterError),

    #[error("could not list photos of timeline '{timeline_id}': {report}")]
    Source {
        timeline_id: String,
        report: eyre::Report,
    },

    #[error("could not store timeline '{timeline_id}': {report}")]
    Sink {
        timeline_id: String,
        report: eyre::Report,
    },
}
