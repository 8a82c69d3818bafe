//! Static data snapshot stored as YAML.
//!
//! The file mirrors what the remote source returns: locations with their
//! daily counters and reviews, dates as strings. Loading validates the
//! structure and applies the same boundary rules as the remote path, so a
//! malformed date or rating drops that one record and logs it.

use std::collections::HashSet;
use std::path::Path;

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::filter::{DateRange, Directory};
use crate::types::{
    parse_calendar_date, Location, MetricCounters, MetricRecord, ReviewRecord, Sentiment,
    StarRating,
};
use crate::ConfigError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotFile {
    pub locations: Vec<SnapshotLocation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotLocation {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default)]
    pub metrics: Vec<SnapshotMetric>,
    #[serde(default)]
    pub reviews: Vec<SnapshotReview>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMetric {
    pub date: String,
    #[serde(default)]
    pub searches: u64,
    #[serde(default)]
    pub map_views: u64,
    #[serde(default)]
    pub website_clicks: u64,
    #[serde(default)]
    pub calls: u64,
    #[serde(default)]
    pub direction_requests: u64,
    #[serde(default)]
    pub order_clicks: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotReview {
    pub id: String,
    pub author: String,
    pub rating: i64,
    #[serde(default)]
    pub text: String,
    pub date: String,
}

/// Normalized, in-memory form of a snapshot file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub locations: Vec<Location>,
    pub metrics: Vec<MetricRecord>,
    pub reviews: Vec<ReviewRecord>,
}

impl Snapshot {
    /// Validates `file` and converts its records into domain types.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for empty names, duplicate
    /// location ids, duplicate review ids, or two metric rows for the same
    /// location and date.
    pub fn from_file(file: SnapshotFile) -> Result<Self, ConfigError> {
        validate_snapshot(&file)?;

        let mut snapshot = Snapshot::default();
        for raw in file.locations {
            for metric in &raw.metrics {
                if let Some(record) = normalize_metric(&raw.id, metric) {
                    snapshot.metrics.push(record);
                }
            }
            for review in &raw.reviews {
                if let Some(record) = normalize_review(&raw.id, review) {
                    snapshot.reviews.push(record);
                }
            }
            snapshot.locations.push(Location {
                id: raw.id,
                name: raw.name,
                brand: raw.brand,
            });
        }
        Ok(snapshot)
    }

    #[must_use]
    pub fn directory(&self) -> Directory {
        Directory::new(self.locations.clone())
    }

    /// Metric records of the given locations inside `range`.
    #[must_use]
    pub fn metrics_for(&self, location_ids: &[String], range: &DateRange) -> Vec<MetricRecord> {
        let ids: HashSet<&str> = location_ids.iter().map(String::as_str).collect();
        self.metrics
            .iter()
            .filter(|m| ids.contains(m.location_id.as_str()) && range.contains(m.date))
            .cloned()
            .collect()
    }

    /// Every review of the given locations, regardless of date.
    #[must_use]
    pub fn reviews_for(&self, location_ids: &[String]) -> Vec<ReviewRecord> {
        let ids: HashSet<&str> = location_ids.iter().map(String::as_str).collect();
        self.reviews
            .iter()
            .filter(|r| ids.contains(r.location_id.as_str()))
            .cloned()
            .collect()
    }
}

/// Load, validate and normalize a snapshot from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_snapshot(path: &Path) -> Result<Snapshot, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SnapshotFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: SnapshotFile = serde_yaml::from_str(&content)?;
    let snapshot = Snapshot::from_file(file)?;

    tracing::info!(
        path = %path.display(),
        locations = snapshot.locations.len(),
        metric_records = snapshot.metrics.len(),
        reviews = snapshot.reviews.len(),
        "snapshot loaded"
    );
    Ok(snapshot)
}

/// Write a snapshot file as YAML.
///
/// # Errors
///
/// Returns `ConfigError` if serialization or the write fails.
pub fn save_snapshot(file: &SnapshotFile, path: &Path) -> Result<(), ConfigError> {
    let yaml = serde_yaml::to_string(file)?;
    std::fs::write(path, yaml).map_err(|e| ConfigError::SnapshotFileIo {
        path: path.display().to_string(),
        source: e,
    })
}

fn validate_snapshot(file: &SnapshotFile) -> Result<(), ConfigError> {
    let mut seen_locations = HashSet::new();
    let mut seen_reviews = HashSet::new();

    for location in &file.locations {
        if location.id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "location id must be non-empty".to_string(),
            ));
        }
        if location.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "location '{}' must have a non-empty name",
                location.id
            )));
        }
        if !seen_locations.insert(location.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate location id: '{}'",
                location.id
            )));
        }

        // Keyed on the parsed date; unparseable rows are dropped at normalization.
        let mut seen_dates = HashSet::new();
        for metric in &location.metrics {
            let Some(date) = parse_calendar_date(&metric.date) else {
                continue;
            };
            if !seen_dates.insert(date) {
                return Err(ConfigError::Validation(format!(
                    "location '{}' has more than one metric row for {}",
                    location.id, metric.date
                )));
            }
        }

        for review in &location.reviews {
            if !seen_reviews.insert(review.id.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate review id: '{}'",
                    review.id
                )));
            }
        }
    }

    Ok(())
}

fn normalize_metric(location_id: &str, raw: &SnapshotMetric) -> Option<MetricRecord> {
    let Some(date) = parse_calendar_date(&raw.date) else {
        tracing::warn!(
            location = location_id,
            date = %raw.date,
            "skipping metric row with malformed date"
        );
        return None;
    };
    Some(MetricRecord {
        location_id: location_id.to_string(),
        date,
        counters: MetricCounters {
            searches: raw.searches,
            map_views: raw.map_views,
            website_clicks: raw.website_clicks,
            calls: raw.calls,
            direction_requests: raw.direction_requests,
            order_clicks: raw.order_clicks,
        },
    })
}

fn normalize_review(location_id: &str, raw: &SnapshotReview) -> Option<ReviewRecord> {
    let Some(date) = parse_calendar_date(&raw.date) else {
        tracing::warn!(
            location = location_id,
            review = %raw.id,
            date = %raw.date,
            "skipping review with malformed date"
        );
        return None;
    };
    let Some(rating) = u8::try_from(raw.rating).ok().and_then(StarRating::new) else {
        tracing::warn!(
            location = location_id,
            review = %raw.id,
            rating = raw.rating,
            "skipping review with rating outside 1..=5"
        );
        return None;
    };
    Some(ReviewRecord {
        id: raw.id.clone(),
        location_id: location_id.to_string(),
        author: raw.author.clone(),
        rating,
        text: raw.text.clone(),
        date,
        sentiment: Sentiment::Unanalyzed,
    })
}

const DEMO_LOCATIONS: [(&str, &str, &str); 4] = [
    ("locations/1001", "Harbor Coffee - Downtown", "Harbor Coffee"),
    ("locations/1002", "Harbor Coffee - Riverside", "Harbor Coffee"),
    ("locations/2001", "Cedar Bakery - Main St", "Cedar Bakery"),
    ("locations/2002", "Cedar Bakery - Airport", "Cedar Bakery"),
];

const DEMO_AUTHORS: [&str; 6] = [
    "Alex M.",
    "Sam K.",
    "Jordan P.",
    "Riley T.",
    "Casey L.",
    "Morgan B.",
];

const DEMO_TEXTS: [(u8, &str); 5] = [
    (1, "Waited forever and the order was wrong."),
    (2, "Staff were friendly but it was not clean."),
    (3, "Fine. Nothing special."),
    (4, "Good coffee, a bit crowded at lunch."),
    (5, "Best pastries in town, lovely staff!"),
];

/// Builds a synthetic snapshot covering `days` days ending on `end`.
///
/// The same seed always yields the same file.
#[must_use]
pub fn generate_snapshot(end: NaiveDate, days: u32, seed: u64) -> SnapshotFile {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut review_seq = 0u32;

    let locations = DEMO_LOCATIONS
        .iter()
        .map(|&(id, name, brand)| {
            let scale = rng.random_range(0.6..=1.4);
            let mut metrics = Vec::with_capacity(days as usize);
            let mut reviews = Vec::new();

            for back in (0..days).rev() {
                let Some(date) = end.checked_sub_signed(Duration::days(i64::from(back))) else {
                    continue;
                };
                metrics.push(demo_metric(&mut rng, date, scale));

                if rng.random_bool(0.3) {
                    review_seq += 1;
                    let (rating, text) = DEMO_TEXTS[rng.random_range(0..DEMO_TEXTS.len())];
                    let author = DEMO_AUTHORS[rng.random_range(0..DEMO_AUTHORS.len())];
                    let hour: u32 = rng.random_range(7..22);
                    let minute: u32 = rng.random_range(0..60);
                    reviews.push(SnapshotReview {
                        id: format!("review-{review_seq:05}"),
                        author: author.to_string(),
                        rating: i64::from(rating),
                        text: text.to_string(),
                        date: format!("{date}T{hour:02}:{minute:02}:00Z"),
                    });
                }
            }

            SnapshotLocation {
                id: id.to_string(),
                name: name.to_string(),
                brand: Some(brand.to_string()),
                metrics,
                reviews,
            }
        })
        .collect();

    SnapshotFile { locations }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn demo_metric(rng: &mut StdRng, date: NaiveDate, scale: f64) -> SnapshotMetric {
    let mut draw = |low: u64, high: u64| -> u64 {
        let base = rng.random_range(low..=high) as f64;
        (base * scale).round() as u64
    };
    SnapshotMetric {
        date: date.to_string(),
        searches: draw(80, 240),
        map_views: draw(40, 160),
        website_clicks: draw(5, 30),
        calls: draw(0, 12),
        direction_requests: draw(3, 25),
        order_clicks: draw(0, 10),
    }
}

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod tests;
