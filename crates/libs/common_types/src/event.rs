use crate::PhotoId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A maximal run of photos captured on the same local calendar day.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Event {
    pub day: NaiveDate,
    /// Chronological order within the day.
    pub photo_ids: Vec<PhotoId>,
}

impl Event {
    #[must_use]
    pub fn new(day: NaiveDate) -> Self {
        Self {
            day,
            photo_ids: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.photo_ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.photo_ids.is_empty()
    }
}

/// All photos of one calendar year, oldest first.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct YearGroup {
    pub year: i32,
    pub photo_ids: Vec<PhotoId>,
}

impl YearGroup {
    /// Label of the decade this year belongs to, e.g. `"1990s"`.
    #[must_use]
    pub fn decade_label(&self) -> String {
        format!("{}s", self.year.div_euclid(10) * 10)
    }
}
