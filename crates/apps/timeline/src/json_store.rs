use async_trait::async_trait;
use color_eyre::Result;
use color_eyre::eyre::{Context, bail, eyre};
use common_types::{EmbeddingVector, PhotoId, RawPhoto, Timeline};
use photo_timeline::collaborators::{EmbeddingExtractor, PhotoStore};
use serde::Deserialize;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize)]
struct InputFile {
    photos: Vec<InputPhoto>,
}

#[derive(Debug, Deserialize)]
struct InputPhoto {
    #[serde(flatten)]
    photo: RawPhoto,
    /// Precomputed face descriptor; `null` means no face was detected.
    #[serde(default)]
    embedding: Option<EmbeddingVector>,
}

/// File-backed photo store that also serves precomputed embeddings.
#[derive(Debug)]
pub struct JsonPhotoStore {
    order: Vec<PhotoId>,
    photos: HashMap<PhotoId, RawPhoto>,
    embeddings: HashMap<PhotoId, EmbeddingVector>,
    output: Option<PathBuf>,
}

impl JsonPhotoStore {
    pub async fn open(input: &Path, output: Option<PathBuf>) -> Result<Self> {
        let bytes = tokio::fs::read(input)
            .await
            .wrap_err_with(|| format!("Cannot read {}", input.display()))?;
        let store = Self::from_slice(&bytes, output)?;
        debug!("Read {} photos from {}", store.order.len(), input.display());
        Ok(store)
    }

    pub fn from_slice(bytes: &[u8], output: Option<PathBuf>) -> Result<Self> {
        let file: InputFile = serde_json::from_slice(bytes).wrap_err("Invalid photo export")?;
        let mut order = Vec::with_capacity(file.photos.len());
        let mut photos = HashMap::new();
        let mut embeddings = HashMap::new();
        for InputPhoto { photo, embedding } in file.photos {
            let photo_id = photo.photo_id.clone();
            match photos.entry(photo_id.clone()) {
                Entry::Occupied(_) => bail!("Photo {photo_id} appears more than once in the export"),
                Entry::Vacant(slot) => {
                    slot.insert(photo);
                }
            }
            if let Some(embedding) = embedding {
                embeddings.insert(photo_id.clone(), embedding);
            }
            order.push(photo_id);
        }
        Ok(Self {
            order,
            photos,
            embeddings,
            output,
        })
    }

    #[must_use]
    pub fn has_embeddings(&self) -> bool {
        !self.embeddings.is_empty()
    }
}

#[async_trait]
impl PhotoStore for JsonPhotoStore {
    async fn list_photo_ids(&self, _timeline_id: &str) -> Result<Vec<PhotoId>> {
        Ok(self.order.clone())
    }

    async fn load_photo(&self, photo_id: &str) -> Result<RawPhoto> {
        self.photos
            .get(photo_id)
            .cloned()
            .ok_or_else(|| eyre!("Photo {photo_id} not found"))
    }

    async fn store_timeline(&self, _timeline_id: &str, timeline: &Timeline) -> Result<()> {
        let json = serde_json::to_string_pretty(timeline)?;
        match &self.output {
            Some(path) => tokio::fs::write(path, json)
                .await
                .wrap_err_with(|| format!("Cannot write {}", path.display()))?,
            None => println!("{json}"),
        }
        Ok(())
    }
}

#[async_trait]
impl EmbeddingExtractor for JsonPhotoStore {
    async fn extract(&self, photo: &RawPhoto) -> Result<Option<EmbeddingVector>> {
        Ok(self.embeddings.get(&photo.photo_id).cloned())
    }
}
