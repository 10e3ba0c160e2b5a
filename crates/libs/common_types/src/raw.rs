use crate::{PhotoId, PhotoMetadata};
use bon::Builder;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Format used when rendering a canonical timestamp back into raw form.
pub const EXIF_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S%.f";

/// A photo record as handed over by storage, before normalization.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RawPhoto {
    pub photo_id: PhotoId,
    #[serde(default)]
    pub metadata: RawMetadata,
}

impl RawPhoto {
    pub fn new(photo_id: impl Into<PhotoId>, metadata: RawMetadata) -> Self {
        Self {
            photo_id: photo_id.into(),
            metadata,
        }
    }
}

/// Capture metadata exactly as an external EXIF decoder produced it.
///
/// Values are kept loosely typed because decoders disagree on shapes: timestamps can be
/// EXIF strings, ISO-8601 strings or epoch seconds, GPS coordinates can be decimals or
/// degree/minute/second triples.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Builder)]
#[serde(default)]
pub struct RawMetadata {
    pub date_time_original: Option<Value>,
    pub date_time: Option<Value>,
    pub date_time_digitized: Option<Value>,
    /// Carried by records that already went through normalization once.
    pub captured_at_is_estimated: Option<bool>,
    pub gps_latitude: Option<Value>,
    #[builder(into)]
    pub gps_latitude_ref: Option<String>,
    pub gps_longitude: Option<Value>,
    #[builder(into)]
    pub gps_longitude_ref: Option<String>,
    #[builder(into)]
    pub make: Option<String>,
    #[builder(into)]
    pub model: Option<String>,
    pub iso: Option<Value>,
    pub f_number: Option<Value>,
    pub exposure_time: Option<Value>,
    pub focal_length: Option<Value>,
    pub width: Option<Value>,
    pub height: Option<Value>,
    pub orientation: Option<Value>,
}

impl RawMetadata {
    /// Timestamp candidates in order of preference.
    pub fn timestamp_candidates(&self) -> impl Iterator<Item = &Value> {
        [
            &self.date_time_original,
            &self.date_time,
            &self.date_time_digitized,
        ]
        .into_iter()
        .flatten()
    }
}

fn float_value(value: f64) -> Option<Value> {
    serde_json::Number::from_f64(value).map(Value::Number)
}

/// Renders a canonical record back into raw form, so it can be normalized again.
impl From<PhotoMetadata> for RawMetadata {
    fn from(meta: PhotoMetadata) -> Self {
        let settings = meta.camera_settings;
        Self {
            date_time_original: Some(Value::String(
                meta.captured_at.format(EXIF_DATE_FORMAT).to_string(),
            )),
            date_time: None,
            date_time_digitized: None,
            captured_at_is_estimated: Some(meta.captured_at_is_estimated),
            gps_latitude: meta.location.and_then(|l| float_value(l.latitude)),
            gps_latitude_ref: None,
            gps_longitude: meta.location.and_then(|l| float_value(l.longitude)),
            gps_longitude_ref: None,
            make: meta.camera_make,
            model: meta.camera_model,
            iso: settings.iso.map(Value::from),
            f_number: settings.f_number.and_then(float_value),
            exposure_time: settings.exposure_time.and_then(float_value),
            focal_length: settings.focal_length.and_then(float_value),
            width: meta.width.map(Value::from),
            height: meta.height.map(Value::from),
            orientation: meta.orientation.map(Value::from),
        }
    }
}

impl From<PhotoMetadata> for RawPhoto {
    fn from(meta: PhotoMetadata) -> Self {
        Self {
            photo_id: meta.photo_id.clone(),
            metadata: meta.into(),
        }
    }
}
