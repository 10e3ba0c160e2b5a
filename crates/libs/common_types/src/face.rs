use crate::PhotoId;
use serde::{Deserialize, Serialize};

/// Length of the face descriptors produced by the recognition model.
pub const EMBEDDING_DIMENSION: usize = 128;

/// Fixed-length numeric summary of one detected face.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(transparent)]
pub struct EmbeddingVector(Vec<f32>);

impl EmbeddingVector {
    #[must_use]
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Euclidean distance to `other`. Both vectors must have the same length.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f32 {
        debug_assert_eq!(self.len(), other.len());
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f32>()
            .sqrt()
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }
}

impl From<Vec<f32>> for EmbeddingVector {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

/// One face descriptor, tied to the photo it was detected in.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FaceEmbedding {
    pub photo_id: PhotoId,
    pub embedding: EmbeddingVector,
}

impl FaceEmbedding {
    pub fn new(photo_id: impl Into<PhotoId>, embedding: impl Into<EmbeddingVector>) -> Self {
        Self {
            photo_id: photo_id.into(),
            embedding: embedding.into(),
        }
    }
}

/// A hypothesized distinct person.
///
/// The centroid is the per-dimension mean of all member embeddings. It is maintained
/// from a running `f64` sum so an insertion costs O(dimension) instead of O(members).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FaceCluster {
    pub cluster_id: String,
    pub centroid: EmbeddingVector,
    pub members: Vec<FaceEmbedding>,
    #[serde(skip)]
    sum: Vec<f64>,
}

impl FaceCluster {
    /// Creates a singleton cluster whose centroid is the face's own embedding.
    #[must_use]
    pub fn new(cluster_id: String, face: FaceEmbedding) -> Self {
        let sum = face.embedding.as_slice().iter().map(|&v| f64::from(v)).collect();
        Self {
            cluster_id,
            centroid: face.embedding.clone(),
            members: vec![face],
            sum,
        }
    }

    pub fn insert(&mut self, face: FaceEmbedding) {
        self.ensure_sum();
        for (acc, &v) in self.sum.iter_mut().zip(face.embedding.as_slice()) {
            *acc += f64::from(v);
        }
        self.members.push(face);
        self.refresh_centroid();
    }

    /// Moves every member of `other` into this cluster.
    pub fn absorb(&mut self, mut other: Self) {
        self.ensure_sum();
        other.ensure_sum();
        for (acc, v) in self.sum.iter_mut().zip(other.sum) {
            *acc += v;
        }
        self.members.append(&mut other.members);
        self.refresh_centroid();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn photo_ids(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.photo_id.as_str())
    }

    #[must_use]
    pub fn contains(&self, photo_id: &str) -> bool {
        self.photo_ids().any(|id| id == photo_id)
    }

    // Deserialized clusters arrive without the running sum.
    fn ensure_sum(&mut self) {
        if self.sum.len() == self.centroid.len() {
            return;
        }
        let mut sum = vec![0.0; self.centroid.len()];
        for member in &self.members {
            for (acc, &v) in sum.iter_mut().zip(member.embedding.as_slice()) {
                *acc += f64::from(v);
            }
        }
        self.sum = sum;
    }

    fn refresh_centroid(&mut self) {
        let count = self.members.len() as f64;
        self.centroid = self
            .sum
            .iter()
            .map(|&total| (total / count) as f32)
            .collect::<Vec<_>>()
            .into();
    }
}

/// Per-dimension arithmetic mean of `vectors`, recomputed from scratch.
#[must_use]
pub fn mean_vector(vectors: &[&EmbeddingVector]) -> EmbeddingVector {
    let Some(first) = vectors.first() else {
        return EmbeddingVector::default();
    };
    let count = vectors.len() as f64;
    (0..first.len())
        .map(|i| {
            let total: f64 = vectors.iter().map(|v| f64::from(v.as_slice()[i])).sum();
            (total / count) as f32
        })
        .collect::<Vec<_>>()
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face(id: &str, values: &[f32]) -> FaceEmbedding {
        FaceEmbedding::new(id, values.to_vec())
    }

    #[test]
    fn distance_is_euclidean() {
        let a = EmbeddingVector::new(vec![0.0, 0.0]);
        let b = EmbeddingVector::new(vec![3.0, 4.0]);
        assert!((a.distance(&b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn insert_updates_centroid_to_mean() {
        let mut cluster = FaceCluster::new("cluster_0".into(), face("a", &[0.0, 2.0]));
        cluster.insert(face("b", &[2.0, 4.0]));
        assert_eq!(cluster.centroid.as_slice(), &[1.0, 3.0]);
        assert_eq!(cluster.photo_ids().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn deserialized_cluster_recovers_running_sum() -> color_eyre::Result<()> {
        let mut cluster = FaceCluster::new("cluster_0".into(), face("a", &[0.0, 2.0]));
        cluster.insert(face("b", &[2.0, 4.0]));
        let json = serde_json::to_string(&cluster)?;
        let mut restored: FaceCluster = serde_json::from_str(&json)?;

        restored.insert(face("c", &[4.0, 0.0]));

        assert_eq!(restored.centroid.as_slice(), &[2.0, 2.0]);
        assert_eq!(restored.len(), 3);
        Ok(())
    }

    #[test]
    fn absorb_merges_members() {
        let mut left = FaceCluster::new("cluster_0".into(), face("a", &[0.0]));
        let right = FaceCluster::new("cluster_1".into(), face("b", &[4.0]));
        left.absorb(right);
        assert_eq!(left.centroid.as_slice(), &[2.0]);
        assert!(left.contains("b"));
    }
}
