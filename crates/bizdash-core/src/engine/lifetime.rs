//! All-time review statistics for the selected locations.

use serde::Serialize;

use super::kpi::average_rating;
use crate::types::ReviewRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifetimeStats {
    pub total_reviews: usize,
    pub average_rating: f64,
    /// Review counts for 1 through 5 stars.
    pub rating_histogram: [usize; 5],
}

/// Reduces the full, date-unbounded review set of the current scope.
#[must_use]
pub fn lifetime_stats(reviews: &[ReviewRecord]) -> LifetimeStats {
    let mut rating_histogram = [0usize; 5];
    for review in reviews {
        let slot = usize::from(review.rating.value()) - 1;
        rating_histogram[slot] += 1;
    }

    LifetimeStats {
        total_reviews: reviews.len(),
        average_rating: average_rating(reviews),
        rating_histogram,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::types::{Sentiment, StarRating};

    fn review(id: &str, rating: u8, year: i32) -> ReviewRecord {
        ReviewRecord {
            id: id.to_string(),
            location_id: "loc1".to_string(),
            author: "A".to_string(),
            rating: StarRating::new(rating).unwrap(),
            text: String::new(),
            date: NaiveDate::from_ymd_opt(year, 6, 1).unwrap(),
            sentiment: Sentiment::Unanalyzed,
        }
    }

    #[test]
    fn empty_scope_has_zero_average() {
        let stats = lifetime_stats(&[]);
        assert_eq!(stats.total_reviews, 0);
        assert_eq!(stats.average_rating, 0.0);
        assert_eq!(stats.rating_histogram, [0; 5]);
    }

    #[test]
    fn counts_every_review_regardless_of_date() {
        let reviews = vec![
            review("r1", 5, 2019),
            review("r2", 4, 2022),
            review("r3", 1, 2024),
            review("r4", 5, 2024),
        ];
        let stats = lifetime_stats(&reviews);
        assert_eq!(stats.total_reviews, 4);
        assert!((stats.average_rating - 3.75).abs() < f64::EPSILON);
        assert_eq!(stats.rating_histogram, [1, 0, 0, 1, 2]);
    }
}
