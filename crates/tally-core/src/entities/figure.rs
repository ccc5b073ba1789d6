//! Figure aggregates and the per-star demographic breakdown

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::document::FieldPath;
use crate::value_objects::{AttitudeCategory, EmotionCategory, Rating, VoteCategory};

/// Public figure document (`figures/{figureId}`)
///
/// Counter maps are keyed by category name; missing keys read as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Figure {
    pub name: String,
    pub attitude_counts: BTreeMap<String, i64>,
    pub emotion_counts: BTreeMap<String, i64>,
    pub rating_count: i64,
    pub rating_sum: i64,
    pub rating_histogram: BTreeMap<String, i64>,
    pub comment_count: i64,
}

impl Figure {
    /// New figure with every counter present and zeroed
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attitude_counts: zeroed(AttitudeCategory::ALL.iter().map(|c| c.as_str())),
            emotion_counts: zeroed(EmotionCategory::ALL.iter().map(|c| c.as_str())),
            rating_histogram: (0..=Rating::MAX_STARS).map(|s| (s.to_string(), 0)).collect(),
            ..Self::default()
        }
    }

    pub fn attitude(&self, category: AttitudeCategory) -> i64 {
        self.attitude_counts
            .get(category.as_str())
            .copied()
            .unwrap_or(0)
    }

    pub fn emotion(&self, category: EmotionCategory) -> i64 {
        self.emotion_counts
            .get(category.as_str())
            .copied()
            .unwrap_or(0)
    }

    /// Number of live comments rated `star`
    pub fn histogram(&self, star: u8) -> i64 {
        self.rating_histogram
            .get(&star.to_string())
            .copied()
            .unwrap_or(0)
    }

    /// Mean rating, `None` when nobody rated
    pub fn average_rating(&self) -> Option<f64> {
        (self.rating_count > 0).then(|| self.rating_sum as f64 / self.rating_count as f64)
    }

    /// Histogram buckets sum to the rating count
    pub fn is_histogram_consistent(&self) -> bool {
        self.rating_histogram.values().sum::<i64>() == self.rating_count
    }

    pub fn histogram_field(star: u8) -> FieldPath {
        FieldPath::new("ratingHistogram").child(star.to_string())
    }
}

fn zeroed<'a>(keys: impl Iterator<Item = &'a str>) -> BTreeMap<String, i64> {
    keys.map(|k| (k.to_string(), 0)).collect()
}

/// Per-country tally inside a [`RatingBreakdown`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CountryStat {
    pub total: i64,
    pub by_gender: BTreeMap<String, i64>,
}

/// Breakdown of raters for one star value (`figures/{f}/ratingStats/{star}`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingBreakdown {
    pub countries: BTreeMap<String, CountryStat>,
}

impl RatingBreakdown {
    pub fn total(&self, country: &str) -> i64 {
        self.countries.get(country).map_or(0, |c| c.total)
    }

    pub fn gender(&self, country: &str, gender: &str) -> i64 {
        self.countries
            .get(country)
            .and_then(|c| c.by_gender.get(gender))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_field(country: &str) -> FieldPath {
        FieldPath::new("countries").child(country).child("total")
    }

    pub fn gender_field(country: &str, gender: &str) -> FieldPath {
        FieldPath::new("countries")
            .child(country)
            .child("byGender")
            .child(gender)
    }
}
