use crate::{Event, FaceCluster, PhotoId, PhotoMetadata, YearGroup};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline step during which a collaborator failed for one photo.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Load,
    Embed,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load => f.write_str("load"),
            Self::Embed => f.write_str("embed"),
        }
    }
}

/// A collaborator failure that was isolated to one photo.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PhotoFailure {
    pub photo_id: PhotoId,
    pub stage: FailureStage,
    pub message: String,
}

/// Where a photo ended up in an assembled timeline.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PhotoPlacement {
    pub day: NaiveDate,
    pub event_index: usize,
    pub cluster_id: Option<String>,
}

/// Result of one assembler run.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Timeline {
    /// Normalized metadata in chronological order.
    pub photos: Vec<PhotoMetadata>,
    pub events: Vec<Event>,
    pub years: Vec<YearGroup>,
    /// `None` when no embeddings were supplied.
    pub clusters: Option<Vec<FaceCluster>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<PhotoFailure>,
}

impl Timeline {
    /// Correlates a photo across the event and cluster views.
    #[must_use]
    pub fn placement(&self, photo_id: &str) -> Option<PhotoPlacement> {
        let (event_index, event) = self
            .events
            .iter()
            .enumerate()
            .find(|(_, e)| e.photo_ids.iter().any(|id| id == photo_id))?;
        let cluster_id = self
            .clusters
            .iter()
            .flatten()
            .find(|c| c.contains(photo_id))
            .map(|c| c.cluster_id.clone());
        Some(PhotoPlacement {
            day: event.day,
            event_index,
            cluster_id,
        })
    }

    /// Clusters with at least one member photographed on `day`.
    #[must_use]
    pub fn clusters_on(&self, day: NaiveDate) -> Vec<&FaceCluster> {
        let Some(event) = self.events.iter().find(|e| e.day == day) else {
            return Vec::new();
        };
        self.clusters
            .iter()
            .flatten()
            .filter(|c| c.photo_ids().any(|id| event.photo_ids.iter().any(|e| e == id)))
            .collect()
    }

    #[must_use]
    pub fn estimated_count(&self) -> usize {
        self.photos
            .iter()
            .filter(|p| p.captured_at_is_estimated)
            .count()
    }
}
