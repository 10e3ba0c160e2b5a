use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Caller-supplied identifier of a photo, stable across pipeline runs.
pub type PhotoId = String;

/// A decimal-degree coordinate pair. Both halves are always present.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Returns `None` when either half is not finite or falls outside the valid range.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        valid.then_some(Self {
            latitude,
            longitude,
        })
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Exposure facts taken from the capture metadata. Every field is optional.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct CameraSettings {
    pub iso: Option<u32>,
    pub f_number: Option<f64>,
    /// Exposure time in seconds.
    pub exposure_time: Option<f64>,
    /// Focal length in millimetres.
    pub focal_length: Option<f64>,
}

impl CameraSettings {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Formats the aperture like `f/1.8`.
    #[must_use]
    pub fn aperture_label(&self) -> Option<String> {
        self.f_number.map(|f| format!("f/{f}"))
    }

    /// Formats the shutter speed like `1/250s`, or `2s` for long exposures.
    #[must_use]
    pub fn shutter_label(&self) -> Option<String> {
        let seconds = self.exposure_time.filter(|s| *s > 0.0)?;
        if seconds >= 1.0 {
            return Some(format!("{seconds}s"));
        }
        Some(format!("1/{}s", (1.0 / seconds).round()))
    }

    /// Formats the focal length like `35mm`.
    #[must_use]
    pub fn focal_length_label(&self) -> Option<String> {
        self.focal_length.map(|mm| format!("{mm}mm"))
    }
}

/// Canonical provenance facts for one photograph.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PhotoMetadata {
    pub photo_id: PhotoId,
    /// Local wall-clock capture time.
    pub captured_at: NaiveDateTime,
    /// Set when no usable source timestamp existed and the processing time was used instead.
    pub captured_at_is_estimated: bool,
    pub location: Option<GeoPoint>,
    pub camera_make: Option<String>,
    pub camera_model: Option<String>,
    #[serde(default, skip_serializing_if = "CameraSettings::is_empty")]
    pub camera_settings: CameraSettings,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub orientation: Option<u16>,
}

impl PhotoMetadata {
    /// The local calendar day this photo was captured on.
    #[must_use]
    pub fn capture_day(&self) -> NaiveDate {
        self.captured_at.date()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geo_point_rejects_out_of_range() {
        assert!(GeoPoint::new(91.0, 0.0).is_none());
        assert!(GeoPoint::new(0.0, -180.5).is_none());
        assert!(GeoPoint::new(f64::NAN, 0.0).is_none());
        assert_eq!(
            GeoPoint::new(40.5, -79.25).map(|p| p.to_string()),
            Some("40.5,-79.25".to_string())
        );
    }

    #[test]
    fn camera_labels() {
        let settings = CameraSettings {
            iso: Some(200),
            f_number: Some(1.8),
            exposure_time: Some(0.004),
            focal_length: Some(35.0),
        };
        assert_eq!(settings.aperture_label().as_deref(), Some("f/1.8"));
        assert_eq!(settings.shutter_label().as_deref(), Some("1/250s"));
        assert_eq!(settings.focal_length_label().as_deref(), Some("35mm"));

        let long = CameraSettings {
            exposure_time: Some(2.0),
            ..CameraSettings::default()
        };
        assert_eq!(long.shutter_label().as_deref(), Some("2s"));
        assert!(CameraSettings::default().is_empty());
    }
}
