//! Conversion of Business Profile wire types into domain records.
//!
//! This is the single place where upstream strings (metric names, star
//! words, timestamps, decimal counts) become typed values. A malformed date
//! or rating drops that record with a warning; the batch carries on.

use std::collections::BTreeMap;

use bizdash_core::{
    parse_calendar_date, Location, MetricCounters, MetricKind, MetricRecord, ReviewRecord,
    Sentiment, StarRating,
};
use chrono::NaiveDate;

use crate::types::{FetchMultiDailyMetricsResponse, GbpLocation, GbpReview, WireDate};

/// Daily metrics requested from the performance API.
pub const DAILY_METRICS: [&str; 8] = [
    "BUSINESS_IMPRESSIONS_DESKTOP_SEARCH",
    "BUSINESS_IMPRESSIONS_MOBILE_SEARCH",
    "BUSINESS_IMPRESSIONS_DESKTOP_MAPS",
    "BUSINESS_IMPRESSIONS_MOBILE_MAPS",
    "WEBSITE_CLICKS",
    "CALL_CLICKS",
    "BUSINESS_DIRECTION_REQUESTS",
    "BUSINESS_FOOD_ORDERS",
];

/// Which dashboard counter an upstream daily metric feeds.
///
/// Desktop and mobile impressions both land in the same counter.
#[must_use]
pub fn metric_kind(daily_metric: &str) -> Option<MetricKind> {
    match daily_metric {
        "BUSINESS_IMPRESSIONS_DESKTOP_SEARCH" | "BUSINESS_IMPRESSIONS_MOBILE_SEARCH" => {
            Some(MetricKind::Searches)
        }
        "BUSINESS_IMPRESSIONS_DESKTOP_MAPS" | "BUSINESS_IMPRESSIONS_MOBILE_MAPS" => {
            Some(MetricKind::MapViews)
        }
        "WEBSITE_CLICKS" => Some(MetricKind::WebsiteClicks),
        "CALL_CLICKS" => Some(MetricKind::Calls),
        "BUSINESS_DIRECTION_REQUESTS" => Some(MetricKind::DirectionRequests),
        "BUSINESS_FOOD_ORDERS" => Some(MetricKind::OrderClicks),
        _ => None,
    }
}

fn wire_date(date: WireDate) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(date.year, date.month, date.day)
}

/// Folds the per-metric time series into one record per date.
///
/// Records come back sorted by date.
#[must_use]
pub fn normalize_metrics(
    location_id: &str,
    response: &FetchMultiDailyMetricsResponse,
) -> Vec<MetricRecord> {
    let mut by_date: BTreeMap<NaiveDate, MetricCounters> = BTreeMap::new();

    let series = response
        .multi_daily_metric_time_series
        .iter()
        .flat_map(|multi| &multi.daily_metric_time_series);

    for daily in series {
        let Some(kind) = metric_kind(&daily.daily_metric) else {
            tracing::debug!(
                location = location_id,
                metric = %daily.daily_metric,
                "ignoring unrequested daily metric"
            );
            continue;
        };

        for dated in &daily.time_series.dated_values {
            let Some(date) = wire_date(dated.date) else {
                tracing::warn!(
                    location = location_id,
                    metric = %daily.daily_metric,
                    year = dated.date.year,
                    month = dated.date.month,
                    day = dated.date.day,
                    "skipping metric value with malformed date"
                );
                continue;
            };

            let value = match dated.value.as_deref() {
                None => 0,
                Some(raw) => raw.trim().parse::<u64>().unwrap_or_else(|_| {
                    tracing::warn!(
                        location = location_id,
                        metric = %daily.daily_metric,
                        %date,
                        value = raw,
                        "unparseable metric value, counting as zero"
                    );
                    0
                }),
            };

            by_date.entry(date).or_default().add(kind, value);
        }
    }

    by_date
        .into_iter()
        .map(|(date, counters)| MetricRecord {
            location_id: location_id.to_string(),
            date,
            counters,
        })
        .collect()
}

/// Maps one wire review, or `None` if its rating or timestamp is unusable.
#[must_use]
pub fn normalize_review(location_id: &str, review: &GbpReview) -> Option<ReviewRecord> {
    let Some(rating) = StarRating::parse(&review.star_rating) else {
        tracing::warn!(
            location = location_id,
            review = %review.review_id,
            star_rating = %review.star_rating,
            "skipping review with unknown star rating"
        );
        return None;
    };
    let Some(date) = parse_calendar_date(&review.create_time) else {
        tracing::warn!(
            location = location_id,
            review = %review.review_id,
            create_time = %review.create_time,
            "skipping review with malformed create time"
        );
        return None;
    };

    let author = if review.reviewer.is_anonymous || review.reviewer.display_name.is_empty() {
        "Anonymous".to_string()
    } else {
        review.reviewer.display_name.clone()
    };

    Some(ReviewRecord {
        id: review.review_id.clone(),
        location_id: location_id.to_string(),
        author,
        rating,
        text: review.comment.clone(),
        date,
        sentiment: Sentiment::Unanalyzed,
    })
}

#[must_use]
pub fn normalize_reviews(location_id: &str, reviews: &[GbpReview]) -> Vec<ReviewRecord> {
    reviews
        .iter()
        .filter_map(|review| normalize_review(location_id, review))
        .collect()
}

/// Location titles double as the brand grouping key, so every branch of a
/// chain groups together. The display name adds the first address line.
#[must_use]
pub fn normalize_location(location: &GbpLocation) -> Location {
    let title = location.title.trim();
    let first_line = location
        .storefront_address
        .as_ref()
        .and_then(|addr| addr.address_lines.first())
        .map(|line| line.trim())
        .filter(|line| !line.is_empty());

    let name = match (title.is_empty(), first_line) {
        (true, _) => location.name.clone(),
        (false, Some(line)) => format!("{title} - {line}"),
        (false, None) => title.to_string(),
    };

    Location {
        id: location.name.clone(),
        name,
        brand: (!title.is_empty()).then(|| title.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PostalAddress, Reviewer};

    fn metrics_response(json: serde_json::Value) -> FetchMultiDailyMetricsResponse {
        serde_json::from_value(json).expect("valid metrics response")
    }

    fn review(star: &str, create_time: &str) -> GbpReview {
        GbpReview {
            review_id: "rev-1".to_string(),
            reviewer: Reviewer {
                display_name: "Jane D.".to_string(),
                is_anonymous: false,
            },
            star_rating: star.to_string(),
            comment: "Lovely".to_string(),
            create_time: create_time.to_string(),
        }
    }

    #[test]
    fn desktop_and_mobile_impressions_are_summed() {
        let response = metrics_response(serde_json::json!({
            "multiDailyMetricTimeSeries": [{
                "dailyMetricTimeSeries": [
                    {
                        "dailyMetric": "BUSINESS_IMPRESSIONS_DESKTOP_SEARCH",
                        "timeSeries": { "datedValues": [
                            { "date": { "year": 2024, "month": 1, "day": 1 }, "value": "10" }
                        ]}
                    },
                    {
                        "dailyMetric": "BUSINESS_IMPRESSIONS_MOBILE_SEARCH",
                        "timeSeries": { "datedValues": [
                            { "date": { "year": 2024, "month": 1, "day": 1 }, "value": "5" }
                        ]}
                    },
                    {
                        "dailyMetric": "CALL_CLICKS",
                        "timeSeries": { "datedValues": [
                            { "date": { "year": 2024, "month": 1, "day": 2 }, "value": "3" }
                        ]}
                    }
                ]
            }]
        }));

        let records = normalize_metrics("locations/1", &response);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(records[0].counters.searches, 15);
        assert_eq!(records[1].counters.calls, 3);
        assert_eq!(records[1].counters.searches, 0);
    }

    #[test]
    fn missing_and_garbage_values_count_as_zero() {
        let response = metrics_response(serde_json::json!({
            "multiDailyMetricTimeSeries": [{
                "dailyMetricTimeSeries": [{
                    "dailyMetric": "WEBSITE_CLICKS",
                    "timeSeries": { "datedValues": [
                        { "date": { "year": 2024, "month": 1, "day": 1 } },
                        { "date": { "year": 2024, "month": 1, "day": 2 }, "value": "lots" }
                    ]}
                }]
            }]
        }));
        let records = normalize_metrics("locations/1", &response);
        assert_eq!(records.len(), 2);
        assert!(records
            .iter()
            .all(|r| r.counters == MetricCounters::default()));
    }

    #[test]
    fn malformed_wire_date_is_excluded() {
        let response = metrics_response(serde_json::json!({
            "multiDailyMetricTimeSeries": [{
                "dailyMetricTimeSeries": [{
                    "dailyMetric": "BUSINESS_FOOD_ORDERS",
                    "timeSeries": { "datedValues": [
                        { "date": { "year": 2024, "month": 2, "day": 30 }, "value": "9" },
                        { "date": { "year": 2024, "month": 2, "day": 28 }, "value": "2" }
                    ]}
                }]
            }]
        }));
        let records = normalize_metrics("locations/1", &response);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].counters.order_clicks, 2);
    }

    #[test]
    fn empty_response_gives_no_records() {
        let records = normalize_metrics("locations/1", &FetchMultiDailyMetricsResponse::default());
        assert!(records.is_empty());
    }

    #[test]
    fn every_requested_metric_maps_to_a_kind() {
        for name in DAILY_METRICS {
            assert!(metric_kind(name).is_some(), "{name} unmapped");
        }
        assert!(metric_kind("BUSINESS_CONVERSATIONS").is_none());
    }

    #[test]
    fn review_star_word_and_timestamp_are_mapped() {
        let record = normalize_review("locations/1", &review("FOUR", "2024-01-05T18:30:00Z"))
            .expect("valid review");
        assert_eq!(record.rating.value(), 4);
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(record.author, "Jane D.");
        assert_eq!(record.sentiment, Sentiment::Unanalyzed);
    }

    #[test]
    fn review_with_unspecified_rating_or_bad_time_is_dropped() {
        let unspecified = review("STAR_RATING_UNSPECIFIED", "2024-01-05T18:30:00Z");
        assert!(normalize_review("l", &unspecified).is_none());
        assert!(normalize_review("l", &review("FIVE", "last tuesday")).is_none());

        let batch = vec![
            review("FIVE", "2024-01-05T18:30:00Z"),
            review("NONE", "2024-01-05T18:30:00Z"),
        ];
        assert_eq!(normalize_reviews("l", &batch).len(), 1);
    }

    #[test]
    fn anonymous_reviewer_gets_placeholder_name() {
        let mut wire = review("THREE", "2024-01-05T18:30:00Z");
        wire.reviewer.is_anonymous = true;
        let record = normalize_review("l", &wire).unwrap();
        assert_eq!(record.author, "Anonymous");
    }

    #[test]
    fn location_title_becomes_brand() {
        let location = GbpLocation {
            name: "locations/42".to_string(),
            title: "Harbor Coffee".to_string(),
            storefront_address: Some(PostalAddress {
                address_lines: vec!["12 Pier Rd".to_string()],
                locality: Some("Portland".to_string()),
            }),
        };
        let normalized = normalize_location(&location);
        assert_eq!(normalized.id, "locations/42");
        assert_eq!(normalized.name, "Harbor Coffee - 12 Pier Rd");
        assert_eq!(normalized.brand.as_deref(), Some("Harbor Coffee"));
    }

    #[test]
    fn untitled_location_falls_back_to_resource_name() {
        let location = GbpLocation {
            name: "locations/7".to_string(),
            title: String::new(),
            storefront_address: None,
        };
        let normalized = normalize_location(&location);
        assert_eq!(normalized.name, "locations/7");
        assert!(normalized.brand.is_none());
    }
}
