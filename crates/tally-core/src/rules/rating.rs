//! Rating aggregate contribution of a single comment

use crate::document::FieldPath;
use crate::entities::{Demographics, Figure, RatingBreakdown};
use crate::value_objects::Rating;

/// Delta that lowers `current` by up to `amount` without going below zero
#[inline]
pub fn clamped_decrement(current: i64, amount: i64) -> i64 {
    -(amount.min(current.max(0)))
}

/// The exact units a rated comment adds to its figure's aggregates.
///
/// Unrated comments (`rating == -1`) contribute nothing, so there is no
/// contribution value for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingContribution {
    pub star: u8,
    pub demographics: Demographics,
}

impl RatingContribution {
    pub fn of(rating: Rating, demographics: Demographics) -> Option<Self> {
        rating.stars().map(|star| Self { star, demographics })
    }

    #[inline]
    pub fn sum_delta(&self) -> i64 {
        i64::from(self.star)
    }

    /// Counter fields on the figure document with their positive deltas
    pub fn figure_fields(&self) -> [(FieldPath, i64); 3] {
        [
            (FieldPath::new("ratingCount"), 1),
            (FieldPath::new("ratingSum"), self.sum_delta()),
            (Figure::histogram_field(self.star), 1),
        ]
    }

    /// Counter fields on the per-star breakdown document
    pub fn breakdown_fields(&self) -> [FieldPath; 2] {
        let Demographics { country, gender } = &self.demographics;
        [
            RatingBreakdown::total_field(country),
            RatingBreakdown::gender_field(country, gender),
        ]
    }

    pub fn add_to(&self, figure: &mut Figure) {
        figure.rating_count += 1;
        figure.rating_sum += self.sum_delta();
        *figure
            .rating_histogram
            .entry(self.star.to_string())
            .or_insert(0) += 1;
    }

    /// Inverse of [`Self::add_to`], clamped at zero per counter
    pub fn remove_from(&self, figure: &mut Figure) {
        figure.rating_count += clamped_decrement(figure.rating_count, 1);
        figure.rating_sum += clamped_decrement(figure.rating_sum, self.sum_delta());
        let bucket = figure
            .rating_histogram
            .entry(self.star.to_string())
            .or_insert(0);
        *bucket += clamped_decrement(*bucket, 1);
    }

    pub fn add_to_breakdown(&self, stats: &mut RatingBreakdown) {
        let entry = stats
            .countries
            .entry(self.demographics.country.clone())
            .or_default();
        entry.total += 1;
        *entry
            .by_gender
            .entry(self.demographics.gender.clone())
            .or_insert(0) += 1;
    }

    pub fn remove_from_breakdown(&self, stats: &mut RatingBreakdown) {
        let Some(entry) = stats.countries.get_mut(&self.demographics.country) else {
            return;
        };
        entry.total += clamped_decrement(entry.total, 1);
        if let Some(count) = entry.by_gender.get_mut(&self.demographics.gender) {
            *count += clamped_decrement(*count, 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contribution(star: i32) -> Option<RatingContribution> {
        RatingContribution::of(
            Rating::new(star).unwrap(),
            Demographics::new(Some("PE"), Some("female")),
        )
    }

    #[test]
    fn test_clamped_decrement() {
        assert_eq!(clamped_decrement(5, 1), -1);
        assert_eq!(clamped_decrement(0, 1), 0);
        assert_eq!(clamped_decrement(3, 4), -3);
        assert_eq!(clamped_decrement(-2, 1), 0);
    }

    #[test]
    fn test_unrated_contributes_nothing() {
        assert_eq!(contribution(-1), None);
        assert!(contribution(0).is_some());
    }

    #[test]
    fn test_add_then_remove_restores_figure() {
        let c = contribution(4).unwrap();
        let mut figure = Figure::new("Ada");
        c.add_to(&mut figure);
        assert_eq!(figure.rating_count, 1);
        assert_eq!(figure.rating_sum, 4);
        assert_eq!(figure.histogram(4), 1);
        assert!(figure.is_histogram_consistent());

        c.remove_from(&mut figure);
        assert_eq!(figure, Figure::new("Ada"));
    }

    #[test]
    fn test_breakdown_never_negative() {
        let c = contribution(4).unwrap();
        let mut stats = RatingBreakdown::default();
        c.add_to_breakdown(&mut stats);
        assert_eq!(stats.total("PE"), 1);
        c.remove_from_breakdown(&mut stats);
        c.remove_from_breakdown(&mut stats);
        assert_eq!(stats.total("PE"), 0);
        assert_eq!(stats.gender("PE", "female"), 0);
    }

    #[test]
    fn test_field_names() {
        let c = contribution(3).unwrap();
        let [count, sum, bucket] = c.figure_fields();
        assert_eq!(count.0.to_string(), "ratingCount");
        assert_eq!(sum, (FieldPath::new("ratingSum"), 3));
        assert_eq!(bucket.0.to_string(), "ratingHistogram.3");
        let [total, gender] = c.breakdown_fields();
        assert_eq!(total.to_string(), "countries.PE.total");
        assert_eq!(gender.to_string(), "countries.PE.byGender.female");
    }
}
