//! Greedy, order-dependent face clustering over fixed-length embeddings.
//!
//! Each face joins the nearest existing cluster whose centroid is closer than the
//! threshold, or starts a new cluster. Clusters are never split or merged afterwards,
//! so the result depends on input order. This is not a globally optimal clustering.
use crate::ClusterError;
use app_state::ClusteringSettings;
use common_types::{EMBEDDING_DIMENSION, EmbeddingVector, FaceCluster, FaceEmbedding};
use rayon::prelude::*;
use std::num::NonZeroUsize;
use tracing::{debug, info};

pub const DEFAULT_THRESHOLD: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceClusterer {
    threshold: f32,
    dimension: usize,
}

impl Default for FaceClusterer {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            dimension: EMBEDDING_DIMENSION,
        }
    }
}

impl TryFrom<&ClusteringSettings> for FaceClusterer {
    type Error = ClusterError;

    fn try_from(settings: &ClusteringSettings) -> Result<Self, Self::Error> {
        Self::new(settings.threshold, settings.dimension)
    }
}

impl FaceClusterer {
    pub fn new(threshold: f32, dimension: usize) -> Result<Self, ClusterError> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(ClusterError::InvalidThreshold(threshold));
        }
        if dimension == 0 {
            return Err(ClusterError::InvalidDimension);
        }
        Ok(Self {
            threshold,
            dimension,
        })
    }

    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Clusters `faces` in a single sequential pass, in input order.
    ///
    /// Fails without producing any cluster when an embedding has the wrong length.
    pub fn cluster(&self, faces: &[FaceEmbedding]) -> Result<Vec<FaceCluster>, ClusterError> {
        self.validate(faces)?;
        let clusters = self.cluster_sequential(faces);
        info!(
            "Clustered {} faces into {} clusters",
            faces.len(),
            clusters.len()
        );
        Ok(clusters)
    }

    /// Clusters fixed-size batches in parallel, then merges the batch clusters in batch
    /// order with the same threshold rule applied to their centroids.
    ///
    /// This is a distinct mode: results differ from [`Self::cluster`], and a member is no
    /// longer guaranteed to have been within the threshold of its final cluster's centroid
    /// at insertion time.
    pub fn cluster_batched(
        &self,
        faces: &[FaceEmbedding],
        batch_size: NonZeroUsize,
    ) -> Result<Vec<FaceCluster>, ClusterError> {
        self.validate(faces)?;

        let batches: Vec<Vec<FaceCluster>> = faces
            .par_chunks(batch_size.get())
            .map(|batch| self.cluster_sequential(batch))
            .collect();
        debug!("Clustered {} batches, merging", batches.len());

        let mut merged: Vec<FaceCluster> = Vec::new();
        for cluster in batches.into_iter().flatten() {
            match self.nearest(&merged, &cluster.centroid) {
                Some(index) => merged[index].absorb(cluster),
                None => merged.push(cluster),
            }
        }
        for (index, cluster) in merged.iter_mut().enumerate() {
            cluster.cluster_id = cluster_id(index);
        }

        info!(
            "Clustered {} faces into {} clusters in batches of {}",
            faces.len(),
            merged.len(),
            batch_size
        );
        Ok(merged)
    }

    fn validate(&self, faces: &[FaceEmbedding]) -> Result<(), ClusterError> {
        match faces.iter().find(|f| f.embedding.len() != self.dimension) {
            Some(face) => Err(ClusterError::DimensionMismatch {
                photo_id: face.photo_id.clone(),
                expected: self.dimension,
                actual: face.embedding.len(),
            }),
            None => Ok(()),
        }
    }

    fn cluster_sequential(&self, faces: &[FaceEmbedding]) -> Vec<FaceCluster> {
        let mut clusters: Vec<FaceCluster> = Vec::new();
        for face in faces {
            match self.nearest(&clusters, &face.embedding) {
                Some(index) => clusters[index].insert(face.clone()),
                None => {
                    let id = cluster_id(clusters.len());
                    clusters.push(FaceCluster::new(id, face.clone()));
                }
            }
        }
        clusters
    }

    /// Index of the cluster with the smallest centroid distance below the threshold.
    /// Ties go to the earlier cluster.
    fn nearest(&self, clusters: &[FaceCluster], embedding: &EmbeddingVector) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (index, cluster) in clusters.iter().enumerate() {
            let distance = cluster.centroid.distance(embedding);
            if distance >= self.threshold || distance.is_nan() {
                continue;
            }
            if best.is_none_or(|(_, best_distance)| distance < best_distance) {
                best = Some((index, distance));
            }
        }
        best.map(|(index, _)| index)
    }
}

fn cluster_id(index: usize) -> String {
    format!("cluster_{index}")
}
