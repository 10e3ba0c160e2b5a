//! Composes normalization, sorting, grouping and optional face clustering into one run.
use crate::clock::Clock;
use crate::clustering::FaceClusterer;
use crate::collaborators::{EmbeddingExtractor, PhotoStore};
use crate::grouping::{group_by_day, group_by_year};
use crate::normalizer::MetadataNormalizer;
use crate::sorting::sort_chronologically;
use crate::{ClusterError, TimelineError};
use app_state::AppSettings;
use bon::Builder;
use color_eyre::Report;
use common_types::{
    FaceCluster, FaceEmbedding, FailureStage, PhotoFailure, PhotoId, RawPhoto, Timeline,
};
use futures_util::{StreamExt, stream};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_EXTRACTION_CONCURRENCY: usize = 4;

/// Runs the timeline pipeline.
///
/// The pure part ([`Self::assemble`]) holds no state between calls, every run owns its
/// own cluster list. Callers embedding this in a concurrent service must still make sure
/// only one run per timeline is in flight, otherwise the last `store_timeline` wins.
#[derive(Debug, Clone, Builder)]
pub struct TimelineAssembler {
    normalizer: MetadataNormalizer,
    #[builder(default)]
    clusterer: FaceClusterer,
    /// Switches clustering to the batched-merge mode.
    batch_size: Option<NonZeroUsize>,
    #[builder(default = DEFAULT_EXTRACTION_CONCURRENCY)]
    extraction_concurrency: usize,
}

impl TimelineAssembler {
    pub fn from_settings(settings: &AppSettings, clock: Arc<dyn Clock>) -> Result<Self, ClusterError> {
        let clusterer = FaceClusterer::try_from(&settings.clustering)?;
        let batch_size = settings
            .clustering
            .batch_size
            .map(|size| NonZeroUsize::new(size).ok_or(ClusterError::InvalidBatchSize))
            .transpose()?;
        Ok(Self::builder()
            .normalizer(MetadataNormalizer::new(clock, settings.timezone))
            .clusterer(clusterer)
            .maybe_batch_size(batch_size)
            .extraction_concurrency(settings.assembler.extraction_concurrency.max(1))
            .build())
    }

    #[must_use]
    pub fn normalizer(&self) -> &MetadataNormalizer {
        &self.normalizer
    }

    #[must_use]
    pub fn clusterer(&self) -> &FaceClusterer {
        &self.clusterer
    }

    /// Normalizes, sorts and groups `raw_photos`, and clusters `faces` when given.
    ///
    /// Without faces the timeline has `clusters: None`. Clustering is independent of the
    /// chronological order; faces are processed in the order they are passed.
    pub fn assemble(
        &self,
        raw_photos: &[RawPhoto],
        faces: Option<&[FaceEmbedding]>,
    ) -> Result<Timeline, ClusterError> {
        let photos = sort_chronologically(self.normalizer.normalize_all(raw_photos));
        let events = group_by_day(&photos);
        let years = group_by_year(&photos);
        let clusters = faces.map(|faces| self.cluster(faces)).transpose()?;

        Ok(Timeline {
            photos,
            events,
            years,
            clusters,
            failures: Vec::new(),
        })
    }

    fn cluster(&self, faces: &[FaceEmbedding]) -> Result<Vec<FaceCluster>, ClusterError> {
        match self.batch_size {
            Some(batch_size) => self.clusterer.cluster_batched(faces, batch_size),
            None => self.clusterer.cluster(faces),
        }
    }

    /// Loads a timeline's photos from `store`, extracts faces when an `extractor` is
    /// given, assembles and stores the result.
    ///
    /// A photo that fails to load or to embed, or whose embedding has the wrong length, is
    /// recorded in `Timeline::failures` and the run continues with the rest. Only listing and storing the timeline abort the run.
    pub async fn run(
        &self,
        timeline_id: &str,
        store: &dyn PhotoStore,
        extractor: Option<&dyn EmbeddingExtractor>,
    ) -> Result<Timeline, TimelineError> {
        let photo_ids = store
            .list_photo_ids(timeline_id)
            .await
            .map_err(|report| TimelineError::Source {
                timeline_id: timeline_id.to_string(),
                report,
            })?;
        debug!("Timeline {} has {} photos", timeline_id, photo_ids.len());

        let mut failures = Vec::new();
        let raw_photos = self.load_photos(store, photo_ids, &mut failures).await;
        let faces = match extractor {
            Some(extractor) => Some(self.extract_faces(extractor, &raw_photos, &mut failures).await),
            None => None,
        };

        let mut timeline = self.assemble(&raw_photos, faces.as_deref())?;
        timeline.failures = failures;

        store
            .store_timeline(timeline_id, &timeline)
            .await
            .map_err(|report| TimelineError::Sink {
                timeline_id: timeline_id.to_string(),
                report,
            })?;

        info!(
            "Assembled timeline {}: {} photos, {} events, {} clusters, {} failures",
            timeline_id,
            timeline.photos.len(),
            timeline.events.len(),
            timeline.clusters.as_ref().map_or(0, Vec::len),
            timeline.failures.len()
        );
        Ok(timeline)
    }

    async fn load_photos(
        &self,
        store: &dyn PhotoStore,
        photo_ids: Vec<PhotoId>,
        failures: &mut Vec<PhotoFailure>,
    ) -> Vec<RawPhoto> {
        let loaded: Vec<(PhotoId, color_eyre::Result<RawPhoto>)> = stream::iter(photo_ids)
            .map(|photo_id| async move {
                let result = store.load_photo(&photo_id).await;
                (photo_id, result)
            })
            .buffered(self.extraction_concurrency.max(1))
            .collect()
            .await;

        let mut raw_photos = Vec::with_capacity(loaded.len());
        for (photo_id, result) in loaded {
            match result {
                Ok(photo) => raw_photos.push(photo),
                Err(report) => failures.push(photo_failure(photo_id, FailureStage::Load, &report)),
            }
        }
        raw_photos
    }

    async fn extract_faces(
        &self,
        extractor: &dyn EmbeddingExtractor,
        raw_photos: &[RawPhoto],
        failures: &mut Vec<PhotoFailure>,
    ) -> Vec<FaceEmbedding> {
        // `buffered` keeps input order, which clustering depends on.
        let results: Vec<color_eyre::Result<_>> = stream::iter(raw_photos)
            .map(|photo| extractor.extract(photo))
            .buffered(self.extraction_concurrency.max(1))
            .collect()
            .await;

        let expected = self.clusterer.dimension();
        let mut faces = Vec::new();
        for (photo, result) in raw_photos.iter().zip(results) {
            match result {
                Ok(Some(embedding)) if embedding.len() != expected => {
                    let mismatch = ClusterError::DimensionMismatch {
                        photo_id: photo.photo_id.clone(),
                        expected,
                        actual: embedding.len(),
                    };
                    failures.push(photo_failure(
                        photo.photo_id.clone(),
                        FailureStage::Embed,
                        &Report::new(mismatch),
                    ));
                }
                Ok(Some(embedding)) => faces.push(FaceEmbedding {
                    photo_id: photo.photo_id.clone(),
                    embedding,
                }),
                Ok(None) => debug!("No face found in photo {}", photo.photo_id),
                Err(report) => failures.push(photo_failure(
                    photo.photo_id.clone(),
                    FailureStage::Embed,
                    &report,
                )),
            }
        }
        faces
    }
}

fn photo_failure(photo_id: PhotoId, stage: FailureStage, report: &Report) -> PhotoFailure {
    let message = report
        .chain()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ");
    warn!("Failed to {} photo {}: {}", stage, photo_id, message);
    PhotoFailure {
        photo_id,
        stage,
        message,
    }
}
