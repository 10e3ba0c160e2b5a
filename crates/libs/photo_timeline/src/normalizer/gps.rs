use common_types::{GeoPoint, RawMetadata};
use serde_json::Value;

/// Builds a location from the raw GPS fields. Both coordinates must be readable,
/// otherwise no location is produced at all.
pub fn parse_location(raw: &RawMetadata) -> Option<GeoPoint> {
    let latitude = parse_coordinate(raw.gps_latitude.as_ref()?)?;
    let longitude = parse_coordinate(raw.gps_longitude.as_ref()?)?;
    GeoPoint::new(
        apply_hemisphere(latitude, raw.gps_latitude_ref.as_deref(), "S"),
        apply_hemisphere(longitude, raw.gps_longitude_ref.as_deref(), "W"),
    )
}

/// A decimal number, or a `[degrees, minutes, seconds]` triple of numbers.
pub fn parse_coordinate(value: &Value) -> Option<f64> {
    let decimal = match value {
        Value::Number(number) => number.as_f64()?,
        Value::Array(parts) => dms_to_decimal(parts)?,
        _ => return None,
    };
    decimal.is_finite().then_some(decimal)
}

fn dms_to_decimal(parts: &[Value]) -> Option<f64> {
    let [degrees, minutes, seconds] = parts else {
        return None;
    };
    Some(degrees.as_f64()? + minutes.as_f64()? / 60.0 + seconds.as_f64()? / 3600.0)
}

fn apply_hemisphere(value: f64, reference: Option<&str>, negative: &str) -> f64 {
    match reference {
        Some(r) if r.trim().eq_ignore_ascii_case(negative) => -value.abs(),
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(lat: Value, lng: Value) -> RawMetadata {
        RawMetadata::builder().gps_latitude(lat).gps_longitude(lng).build()
    }

    #[test]
    fn converts_dms_triples() {
        let location = parse_location(&raw(json!([40, 26, 46]), json!([79, 58, 56])));
        let Some(location) = location else {
            panic!("expected a location");
        };
        assert!((location.latitude - (40.0 + 26.0 / 60.0 + 46.0 / 3600.0)).abs() < 1e-9);
        assert!((location.longitude - (79.0 + 58.0 / 60.0 + 56.0 / 3600.0)).abs() < 1e-9);
    }

    #[test]
    fn malformed_triple_leaves_location_absent() {
        assert_eq!(parse_location(&raw(json!([40, 26, "bad"]), json!(-79.9))), None);
        assert_eq!(parse_location(&raw(json!([40, 26]), json!(-79.9))), None);
        assert_eq!(parse_location(&raw(json!("40.1"), json!(-79.9))), None);
    }

    #[test]
    fn requires_both_halves() {
        let only_latitude = RawMetadata::builder().gps_latitude(json!(40.0)).build();
        assert_eq!(parse_location(&only_latitude), None);
    }

    #[test]
    fn hemisphere_refs_negate() {
        let mut metadata = raw(json!([33, 52, 0]), json!([151, 12, 36]));
        metadata.gps_latitude_ref = Some("S".into());
        metadata.gps_longitude_ref = Some("E".into());
        let location = parse_location(&metadata);
        assert!(location.is_some_and(|l| l.latitude < 0.0 && l.longitude > 0.0));
    }

    #[test]
    fn out_of_range_is_rejected() {
        assert_eq!(parse_location(&raw(json!(95.0), json!(10.0))), None);
    }
}
