//! Partitions a chronologically sorted photo sequence into day events and year groups.
use chrono::Datelike;
use common_types::{Event, PhotoMetadata, YearGroup};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Splits `sorted` into events, starting a new event whenever the capture day changes.
///
/// The input must already be sorted chronologically. Unsorted input is not re-sorted;
/// it produces more, smaller events than intended.
#[must_use]
pub fn group_by_day(sorted: &[PhotoMetadata]) -> Vec<Event> {
    let mut events: Vec<Event> = Vec::new();
    let mut warned = false;

    for photo in sorted {
        let day = photo.capture_day();
        match events.last_mut() {
            Some(current) if current.day == day => {
                current.photo_ids.push(photo.photo_id.clone());
                continue;
            }
            Some(current) if current.day > day && !warned => {
                warn!("Grouping photos that are not in chronological order");
                warned = true;
            }
            _ => {}
        }
        let mut event = Event::new(day);
        event.photo_ids.push(photo.photo_id.clone());
        events.push(event);
    }

    debug!("Grouped {} photos into {} events", sorted.len(), events.len());
    events
}

/// Groups photos by capture year, newest year first and oldest photo first within a year.
#[must_use]
pub fn group_by_year(photos: &[PhotoMetadata]) -> Vec<YearGroup> {
    let mut years: BTreeMap<i32, Vec<&PhotoMetadata>> = BTreeMap::new();
    for photo in photos {
        years.entry(photo.captured_at.year()).or_default().push(photo);
    }

    years
        .into_iter()
        .rev()
        .map(|(year, mut members)| {
            members.sort_by_key(|p| p.captured_at);
            YearGroup {
                year,
                photo_ids: members.into_iter().map(|p| p.photo_id.clone()).collect(),
            }
        })
        .collect()
}
