//! Turns raw, inconsistently shaped capture metadata into canonical [`PhotoMetadata`].
mod camera;
mod gps;
mod timestamp;

pub use gps::{parse_coordinate, parse_location};
pub use timestamp::{parse_exif, parse_timestamp};

use crate::clock::Clock;
use chrono::NaiveDateTime;
use chrono_tz::Tz;
use common_types::{PhotoMetadata, RawPhoto};
use rayon::prelude::*;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Normalizes raw photo records. Never fails: unreadable timestamps fall back to the
/// processing time and unreadable GPS data leaves the location absent.
#[derive(Clone)]
pub struct MetadataNormalizer {
    clock: Arc<dyn Clock>,
    timezone: Tz,
}

impl fmt::Debug for MetadataNormalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataNormalizer")
            .field("timezone", &self.timezone)
            .finish_non_exhaustive()
    }
}

impl MetadataNormalizer {
    pub fn new(clock: Arc<dyn Clock>, timezone: Tz) -> Self {
        Self { clock, timezone }
    }

    #[must_use]
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// The clock's current instant as local wall-clock time.
    #[must_use]
    pub fn processing_time(&self) -> NaiveDateTime {
        self.clock.now().with_timezone(&self.timezone).naive_local()
    }

    #[must_use]
    pub fn normalize(&self, raw: &RawPhoto) -> PhotoMetadata {
        self.normalize_at(raw, self.processing_time())
    }

    /// Normalizes a batch in parallel. The clock is read once, so every estimated
    /// photo of the batch gets the same timestamp. Output order matches input order.
    #[must_use]
    pub fn normalize_all(&self, raws: &[RawPhoto]) -> Vec<PhotoMetadata> {
        let now = self.processing_time();
        let photos: Vec<PhotoMetadata> = raws
            .par_iter()
            .map(|raw| self.normalize_at(raw, now))
            .collect();

        let estimated = photos.iter().filter(|p| p.captured_at_is_estimated).count();
        debug!(
            "Normalized {} photos, {} with estimated capture time",
            photos.len(),
            estimated
        );
        photos
    }

    fn normalize_at(&self, raw: &RawPhoto, now: NaiveDateTime) -> PhotoMetadata {
        let meta = &raw.metadata;
        let parsed = meta
            .timestamp_candidates()
            .find_map(|value| parse_timestamp(value, self.timezone));

        let (captured_at, captured_at_is_estimated) = match parsed {
            Some(captured_at) => (captured_at, meta.captured_at_is_estimated.unwrap_or(false)),
            None => {
                trace!("No usable capture time for photo {}", raw.photo_id);
                (now, true)
            }
        };

        PhotoMetadata {
            photo_id: raw.photo_id.clone(),
            captured_at,
            captured_at_is_estimated,
            location: parse_location(meta),
            camera_make: camera::parse_text(meta.make.as_ref()),
            camera_model: camera::parse_text(meta.model.as_ref()),
            camera_settings: camera::parse_camera_settings(meta),
            width: camera::parse_u32(meta.width.as_ref()),
            height: camera::parse_u32(meta.height.as_ref()),
            orientation: camera::parse_u16(meta.orientation.as_ref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use common_types::{CameraSettings, GeoPoint, RawMetadata};
    use serde_json::json;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0)
            .single()
            .unwrap_or_default()
    }

    fn normalizer() -> MetadataNormalizer {
        MetadataNormalizer::new(Arc::new(FixedClock(fixed_now())), Tz::UTC)
    }

    #[test]
    fn parses_exif_timestamp() {
        let raw = RawPhoto::new(
            "p1",
            RawMetadata::builder()
                .date_time_original(json!("2023:12:25 14:30:00"))
                .build(),
        );

        let meta = normalizer().normalize(&raw);

        let expected = NaiveDate::from_ymd_opt(2023, 12, 25).and_then(|d| d.and_hms_opt(14, 30, 0));
        assert_eq!(Some(meta.captured_at), expected);
        assert!(!meta.captured_at_is_estimated);
    }

    #[test]
    fn out_of_range_time_keeps_the_date() {
        for (text, expected) in [
            ("2023:12:25 24:00:00", NaiveDate::from_ymd_opt(2023, 12, 26).and_then(|d| d.and_hms_opt(0, 0, 0))),
            ("2023:12:25 14:30:60", NaiveDate::from_ymd_opt(2023, 12, 25).and_then(|d| d.and_hms_nano_opt(14, 30, 59, 1_000_000_000))),
        ] {
            let raw = RawPhoto::new("p1", RawMetadata::builder().date_time_original(json!(text)).build());
            let meta = normalizer().normalize(&raw);
            assert_eq!(Some(meta.captured_at), expected, "{text}");
            assert!(!meta.captured_at_is_estimated);
        }
    }

    #[test]
    fn missing_timestamp_uses_clock() {
        let raw = RawPhoto::new("p1", RawMetadata::default());

        let meta = normalizer().normalize(&raw);

        assert!(meta.captured_at_is_estimated);
        assert_eq!(meta.captured_at, fixed_now().naive_utc());
    }

    #[test]
    fn estimated_time_is_local_to_timezone() {
        let normalizer = MetadataNormalizer::new(
            Arc::new(FixedClock(fixed_now())),
            Tz::America__New_York,
        );
        let meta = normalizer.normalize(&RawPhoto::new("p1", RawMetadata::default()));
        let expected = NaiveDate::from_ymd_opt(2024, 3, 10).and_then(|d| d.and_hms_opt(8, 0, 0));
        assert_eq!(Some(meta.captured_at), expected);
    }

    #[test]
    fn falls_through_timestamp_sources() {
        let raw = RawPhoto::new(
            "p1",
            RawMetadata::builder()
                .date_time_original(json!("not a date"))
                .date_time(json!("2021:01:02 03:04:05"))
                .date_time_digitized(json!("2022:01:01 00:00:00"))
                .build(),
        );
        let meta = normalizer().normalize(&raw);
        assert_eq!(meta.captured_at.date(), NaiveDate::from_ymd_opt(2021, 1, 2).unwrap_or_default());
    }

    #[test]
    fn malformed_gps_triple_leaves_location_absent() {
        let raw = RawPhoto::new(
            "p1",
            RawMetadata::builder()
                .gps_latitude(json!([40, 26, "bad"]))
                .gps_longitude(json!([79, 58, 56]))
                .build(),
        );
        assert_eq!(normalizer().normalize(&raw).location, None);
    }

    #[test]
    fn blank_camera_strings_are_absent() {
        let raw = RawPhoto::new("p1", RawMetadata::builder().make("").model("Pixel 7").build());
        let meta = normalizer().normalize(&raw);
        assert_eq!(meta.camera_make, None);
        assert_eq!(meta.camera_model.as_deref(), Some("Pixel 7"));
    }

    #[test]
    fn normalizing_canonical_metadata_is_identity() {
        let canonical = PhotoMetadata {
            photo_id: "p1".into(),
            captured_at: NaiveDate::from_ymd_opt(2023, 6, 1)
                .and_then(|d| d.and_hms_milli_opt(10, 0, 0, 125))
                .unwrap_or_default(),
            captured_at_is_estimated: false,
            location: GeoPoint::new(-33.8688, 151.2093),
            camera_make: Some("Canon".into()),
            camera_model: Some("EOS R5".into()),
            camera_settings: CameraSettings {
                iso: Some(100),
                f_number: Some(4.0),
                exposure_time: Some(0.002),
                focal_length: Some(24.0),
            },
            width: Some(8192),
            height: Some(5464),
            orientation: Some(1),
        };
        let estimated = PhotoMetadata {
            photo_id: "p2".into(),
            captured_at_is_estimated: true,
            location: None,
            camera_settings: CameraSettings::default(),
            ..canonical.clone()
        };

        let leap_second = PhotoMetadata {
            photo_id: "p3".into(),
            captured_at: NaiveDate::from_ymd_opt(2016, 12, 31)
                .and_then(|d| d.and_hms_nano_opt(23, 59, 59, 1_000_000_000))
                .unwrap_or_default(),
            ..canonical.clone()
        };

        for meta in [canonical, estimated, leap_second] {
            let again = normalizer().normalize(&RawPhoto::from(meta.clone()));
            assert_eq!(again, meta);
        }
    }

    #[test]
    fn normalize_all_keeps_order_and_shares_clock_reading() {
        let raws: Vec<RawPhoto> = (0..50)
            .map(|i| RawPhoto::new(format!("p{i}"), RawMetadata::default()))
            .collect();

        let photos = normalizer().normalize_all(&raws);

        let ids: Vec<&str> = photos.iter().map(|p| p.photo_id.as_str()).collect();
        let expected: Vec<String> = (0..50).map(|i| format!("p{i}")).collect();
        assert_eq!(ids, expected);
        assert!(photos.iter().all(|p| p.captured_at == fixed_now().naive_utc()));
    }
}
