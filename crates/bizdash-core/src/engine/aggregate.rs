//! Totals and per-day merges across locations.
//!
//! Locations are summed, never averaged: the KPIs are aggregate business
//! totals.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::filter::DateRange;
use crate::types::{MetricCounters, MetricRecord, ReviewRecord};

/// Per-counter sum over every record.
#[must_use]
pub fn totals(records: &[MetricRecord]) -> MetricCounters {
    records
        .iter()
        .fold(MetricCounters::default(), |mut acc, record| {
            acc.accumulate(&record.counters);
            acc
        })
}

/// Sums all records sharing a calendar date, across locations.
#[must_use]
pub fn merge_by_date(records: &[MetricRecord]) -> BTreeMap<NaiveDate, MetricCounters> {
    let mut merged: BTreeMap<NaiveDate, MetricCounters> = BTreeMap::new();
    for record in records {
        merged.entry(record.date).or_default().accumulate(&record.counters);
    }
    merged
}

/// Number of reviews created on each calendar date.
#[must_use]
pub fn reviews_by_date(reviews: &[ReviewRecord]) -> BTreeMap<NaiveDate, u32> {
    let mut counts: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    for review in reviews {
        let count = counts.entry(review.date).or_default();
        *count = count.saturating_add(1);
    }
    counts
}

/// Everything the comparator and KPI calculator need about one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodAggregate {
    pub range: DateRange,
    pub totals: MetricCounters,
    pub metrics_by_date: BTreeMap<NaiveDate, MetricCounters>,
    pub reviews_by_date: BTreeMap<NaiveDate, u32>,
}

/// Aggregates records that have already been filtered to `range`.
#[must_use]
pub fn aggregate_period(
    range: DateRange,
    metrics: &[MetricRecord],
    reviews: &[ReviewRecord],
) -> PeriodAggregate {
    PeriodAggregate {
        range,
        totals: totals(metrics),
        metrics_by_date: merge_by_date(metrics),
        reviews_by_date: reviews_by_date(reviews),
    }
}
