use common_types::{CameraSettings, RawMetadata};
use serde_json::Value;

pub fn parse_camera_settings(raw: &RawMetadata) -> CameraSettings {
    CameraSettings {
        iso: raw.iso.as_ref().and_then(parse_number).and_then(to_u32),
        f_number: raw.f_number.as_ref().and_then(parse_positive),
        exposure_time: raw.exposure_time.as_ref().and_then(parse_positive),
        focal_length: raw.focal_length.as_ref().and_then(parse_positive),
    }
}

/// Trimmed text, or `None` when blank.
pub fn parse_text(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

pub fn parse_u32(value: Option<&Value>) -> Option<u32> {
    value.and_then(parse_number).and_then(to_u32)
}

pub fn parse_u16(value: Option<&Value>) -> Option<u16> {
    parse_u32(value).and_then(|v| u16::try_from(v).ok())
}

/// Numbers, numeric strings and rationals such as `"1/250"`.
fn parse_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => parse_numeric_text(text.trim())?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

fn parse_numeric_text(text: &str) -> Option<f64> {
    if let Some((numerator, denominator)) = text.split_once('/') {
        let denominator: f64 = denominator.trim().parse().ok()?;
        if denominator == 0.0 {
            return None;
        }
        return Some(numerator.trim().parse::<f64>().ok()? / denominator);
    }
    text.parse().ok()
}

fn parse_positive(value: &Value) -> Option<f64> {
    parse_number(value).filter(|v| *v > 0.0)
}

fn to_u32(value: f64) -> Option<u32> {
    (0.0..=f64::from(u32::MAX))
        .contains(&value)
        .then(|| value.round() as u32)
}
