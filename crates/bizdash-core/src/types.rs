//! Domain records shared by every crate in the workspace.
//!
//! Loosely typed upstream values (star-rating words, sentiment labels,
//! date strings) are mapped into these types exactly once, at the boundary
//! where a record enters the system. Nothing downstream re-validates them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A business location tracked by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    /// Grouping key used by brand-scoped filters.
    #[serde(default)]
    pub brand: Option<String>,
}

/// The six daily counters reported for every location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Searches,
    MapViews,
    WebsiteClicks,
    Calls,
    DirectionRequests,
    OrderClicks,
}

impl MetricKind {
    pub const ALL: [MetricKind; 6] = [
        MetricKind::Searches,
        MetricKind::MapViews,
        MetricKind::WebsiteClicks,
        MetricKind::Calls,
        MetricKind::DirectionRequests,
        MetricKind::OrderClicks,
    ];

    /// Human-readable column title.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            MetricKind::Searches => "Searches",
            MetricKind::MapViews => "Map Views",
            MetricKind::WebsiteClicks => "Website Clicks",
            MetricKind::Calls => "Calls",
            MetricKind::DirectionRequests => "Direction Requests",
            MetricKind::OrderClicks => "Order Clicks",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// Per-day counters. All values are non-negative by construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetricCounters {
    pub searches: u64,
    pub map_views: u64,
    pub website_clicks: u64,
    pub calls: u64,
    pub direction_requests: u64,
    pub order_clicks: u64,
}

impl MetricCounters {
    #[must_use]
    pub fn get(&self, kind: MetricKind) -> u64 {
        match kind {
            MetricKind::Searches => self.searches,
            MetricKind::MapViews => self.map_views,
            MetricKind::WebsiteClicks => self.website_clicks,
            MetricKind::Calls => self.calls,
            MetricKind::DirectionRequests => self.direction_requests,
            MetricKind::OrderClicks => self.order_clicks,
        }
    }

    fn slot(&mut self, kind: MetricKind) -> &mut u64 {
        match kind {
            MetricKind::Searches => &mut self.searches,
            MetricKind::MapViews => &mut self.map_views,
            MetricKind::WebsiteClicks => &mut self.website_clicks,
            MetricKind::Calls => &mut self.calls,
            MetricKind::DirectionRequests => &mut self.direction_requests,
            MetricKind::OrderClicks => &mut self.order_clicks,
        }
    }

    /// Adds `value` to one counter, saturating at `u64::MAX`.
    pub fn add(&mut self, kind: MetricKind, value: u64) {
        let slot = self.slot(kind);
        *slot = slot.saturating_add(value);
    }

    /// Adds every counter of `other` into `self`.
    pub fn accumulate(&mut self, other: &MetricCounters) {
        for kind in MetricKind::ALL {
            self.add(kind, other.get(kind));
        }
    }
}

/// One location's counters for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub location_id: String,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub counters: MetricCounters,
}

/// Sentiment label attached to a review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
    #[default]
    Unanalyzed,
}

impl Sentiment {
    /// Maps a free-text label to a sentiment, case-insensitively.
    ///
    /// Anything other than positive/neutral/negative maps to `Unanalyzed`.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "positive" => Sentiment::Positive,
            "neutral" => Sentiment::Neutral,
            "negative" => Sentiment::Negative,
            _ => Sentiment::Unanalyzed,
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "Positive"),
            Sentiment::Neutral => write!(f, "Neutral"),
            Sentiment::Negative => write!(f, "Negative"),
            Sentiment::Unanalyzed => write!(f, "Unanalyzed"),
        }
    }
}

/// A 1–5 star rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct StarRating(u8);

impl StarRating {
    /// Builds a rating from an integer in `1..=5`.
    #[must_use]
    pub fn new(value: u8) -> Option<Self> {
        (1..=5).contains(&value).then_some(Self(value))
    }

    /// Parses the upstream enumerated word (`ONE` .. `FIVE`) or a digit.
    ///
    /// `STAR_RATING_UNSPECIFIED` and anything unrecognised yield `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let value = match raw.trim().to_ascii_uppercase().as_str() {
            "ONE" | "1" => 1,
            "TWO" | "2" => 2,
            "THREE" | "3" => 3,
            "FOUR" | "4" => 4,
            "FIVE" | "5" => 5,
            _ => return None,
        };
        Some(Self(value))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for StarRating {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("star rating {value} outside 1..=5"))
    }
}

impl From<StarRating> for u8 {
    fn from(rating: StarRating) -> Self {
        rating.0
    }
}

/// One customer review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub id: String,
    pub location_id: String,
    pub author: String,
    pub rating: StarRating,
    pub text: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub sentiment: Sentiment,
}

/// Parses a calendar date from `YYYY-MM-DD` or an RFC 3339 timestamp.
///
/// Timestamps are reduced to their UTC calendar date. Returns `None` for
/// anything else; callers exclude such records and log them.
#[must_use]
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc).date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_rating_parses_words_and_digits() {
        assert_eq!(StarRating::parse("FIVE").map(StarRating::value), Some(5));
        assert_eq!(StarRating::parse("one").map(StarRating::value), Some(1));
        assert_eq!(StarRating::parse("3").map(StarRating::value), Some(3));
        assert!(StarRating::parse("STAR_RATING_UNSPECIFIED").is_none());
        assert!(StarRating::parse("SIX").is_none());
    }

    #[test]
    fn star_rating_rejects_out_of_range_integers() {
        assert!(StarRating::new(0).is_none());
        assert!(StarRating::new(6).is_none());
        assert_eq!(StarRating::new(4).map(StarRating::value), Some(4));
    }

    #[test]
    fn sentiment_from_label_is_case_insensitive() {
        assert_eq!(Sentiment::from_label("POSITIVE"), Sentiment::Positive);
        assert_eq!(Sentiment::from_label("neutral"), Sentiment::Neutral);
        assert_eq!(Sentiment::from_label(" Negative "), Sentiment::Negative);
        assert_eq!(Sentiment::from_label("mixed"), Sentiment::Unanalyzed);
        assert_eq!(Sentiment::from_label(""), Sentiment::Unanalyzed);
    }

    #[test]
    fn parse_calendar_date_accepts_plain_dates_and_timestamps() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(parse_calendar_date("2024-01-05"), Some(expected));
        assert_eq!(
            parse_calendar_date("2024-01-05T23:10:00.123Z"),
            Some(expected)
        );
        assert_eq!(
            parse_calendar_date("2024-01-06T01:00:00+02:00"),
            Some(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap())
        );
    }

    #[test]
    fn parse_calendar_date_rejects_garbage() {
        assert!(parse_calendar_date("yesterday").is_none());
        assert!(parse_calendar_date("2024-13-01").is_none());
        assert!(parse_calendar_date("").is_none());
    }

    #[test]
    fn counters_add_saturates() {
        let mut counters = MetricCounters {
            calls: u64::MAX - 1,
            ..MetricCounters::default()
        };
        counters.add(MetricKind::Calls, 5);
        assert_eq!(counters.calls, u64::MAX);
    }

    #[test]
    fn review_rating_deserializes_from_integer() {
        let json = serde_json::json!({
            "id": "r1",
            "location_id": "loc1",
            "author": "Jane D.",
            "rating": 5,
            "text": "Great",
            "date": "2024-01-01"
        });
        let review: ReviewRecord = serde_json::from_value(json).expect("review");
        assert_eq!(review.rating.value(), 5);
        assert_eq!(review.sentiment, Sentiment::Unanalyzed);
    }

    #[test]
    fn review_rating_rejects_out_of_range_integer() {
        let json = serde_json::json!({
            "id": "r1",
            "location_id": "loc1",
            "author": "Jane D.",
            "rating": 9,
            "text": "Great",
            "date": "2024-01-01"
        });
        assert!(serde_json::from_value::<ReviewRecord>(json).is_err());
    }
}
