//! Derived KPIs: rating averages and period-over-period change.
//!
//! Zero denominators never produce errors or NaN. An average over no
//! reviews is 0. A change against a zero baseline is 100 when the current
//! value is positive and 0 otherwise.

use serde::Serialize;

use crate::types::{MetricCounters, MetricKind, ReviewRecord};

/// Arithmetic mean of the ratings, or 0 for an empty collection.
#[must_use]
pub fn average_rating(reviews: &[ReviewRecord]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let sum: u64 = reviews
        .iter()
        .map(|review| u64::from(review.rating.value()))
        .sum();
    #[allow(clippy::cast_precision_loss)]
    let (sum, count) = (sum as f64, reviews.len() as f64);
    sum / count
}

/// Percentage change from `previous` to `current`.
#[must_use]
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return if current > 0.0 { 100.0 } else { 0.0 };
    }
    (current - previous) / previous * 100.0
}

#[allow(clippy::cast_precision_loss)]
fn count_change(current: u64, previous: u64) -> f64 {
    percent_change(current as f64, previous as f64)
}

/// Review count and average rating for one period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReviewStats {
    pub count: usize,
    pub average_rating: f64,
}

impl ReviewStats {
    #[must_use]
    pub fn from_reviews(reviews: &[ReviewRecord]) -> Self {
        Self {
            count: reviews.len(),
            average_rating: average_rating(reviews),
        }
    }
}

/// Percentage change of every KPI between the primary and comparison periods.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KpiChanges {
    pub searches: f64,
    pub map_views: f64,
    pub website_clicks: f64,
    pub calls: f64,
    pub direction_requests: f64,
    pub order_clicks: f64,
    pub reviews: f64,
    pub average_rating: f64,
}

impl KpiChanges {
    #[must_use]
    pub fn metric(&self, kind: MetricKind) -> f64 {
        match kind {
            MetricKind::Searches => self.searches,
            MetricKind::MapViews => self.map_views,
            MetricKind::WebsiteClicks => self.website_clicks,
            MetricKind::Calls => self.calls,
            MetricKind::DirectionRequests => self.direction_requests,
            MetricKind::OrderClicks => self.order_clicks,
        }
    }
}

#[must_use]
pub fn kpi_changes(
    current: &MetricCounters,
    previous: &MetricCounters,
    current_reviews: &ReviewStats,
    previous_reviews: &ReviewStats,
) -> KpiChanges {
    let metric = |kind| count_change(current.get(kind), previous.get(kind));
    KpiChanges {
        searches: metric(MetricKind::Searches),
        map_views: metric(MetricKind::MapViews),
        website_clicks: metric(MetricKind::WebsiteClicks),
        calls: metric(MetricKind::Calls),
        direction_requests: metric(MetricKind::DirectionRequests),
        order_clicks: metric(MetricKind::OrderClicks),
        reviews: count_change(current_reviews.count as u64, previous_reviews.count as u64),
        average_rating: percent_change(
            current_reviews.average_rating,
            previous_reviews.average_rating,
        ),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::types::{Sentiment, StarRating};

    fn review(rating: u8) -> ReviewRecord {
        ReviewRecord {
            id: format!("r{rating}"),
            location_id: "loc1".to_string(),
            author: "A".to_string(),
            rating: StarRating::new(rating).unwrap(),
            text: String::new(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            sentiment: Sentiment::Unanalyzed,
        }
    }

    #[test]
    fn percent_change_zero_baseline_policy() {
        assert_eq!(percent_change(10.0, 0.0), 100.0);
        assert_eq!(percent_change(0.0, 0.0), 0.0);
    }

    #[test]
    fn percent_change_regular_cases() {
        assert_eq!(percent_change(50.0, 100.0), -50.0);
        assert_eq!(percent_change(150.0, 100.0), 50.0);
        assert_eq!(percent_change(100.0, 100.0), 0.0);
    }

    #[test]
    fn average_rating_of_nothing_is_zero() {
        assert_eq!(average_rating(&[]), 0.0);
        assert!(!average_rating(&[]).is_nan());
    }

    #[test]
    fn average_rating_is_arithmetic_mean() {
        let reviews = vec![review(5), review(3), review(1)];
        assert!((average_rating(&reviews) - 3.0).abs() < f64::EPSILON);
        let reviews = vec![review(5), review(4)];
        assert!((average_rating(&reviews) - 4.5).abs() < f64::EPSILON);
    }

    #[test]
    fn changes_apply_same_policy_to_every_kpi() {
        let current = MetricCounters {
            searches: 150,
            map_views: 50,
            website_clicks: 10,
            calls: 0,
            direction_requests: 0,
            order_clicks: 3,
        };
        let previous = MetricCounters {
            searches: 100,
            map_views: 100,
            website_clicks: 0,
            calls: 0,
            direction_requests: 4,
            order_clicks: 3,
        };
        let current_reviews = ReviewStats {
            count: 2,
            average_rating: 4.5,
        };
        let previous_reviews = ReviewStats {
            count: 0,
            average_rating: 0.0,
        };

        let changes = kpi_changes(&current, &previous, &current_reviews, &previous_reviews);
        assert_eq!(changes.searches, 50.0);
        assert_eq!(changes.map_views, -50.0);
        assert_eq!(changes.website_clicks, 100.0);
        assert_eq!(changes.calls, 0.0);
        assert_eq!(changes.direction_requests, -100.0);
        assert_eq!(changes.order_clicks, 0.0);
        assert_eq!(changes.reviews, 100.0);
        assert_eq!(changes.average_rating, 100.0);
        assert_eq!(changes.metric(MetricKind::Searches), 50.0);
    }
}
