//! Offset-aligned chart series.
//!
//! Day `i` of the primary period is always paired with day `i` of the
//! comparison period, whatever their calendar dates. The series length is
//! governed by the primary period alone; comparison offsets past the end of
//! a shorter comparison period are zero-filled.

use chrono::NaiveDate;
use serde::Serialize;

use super::aggregate::PeriodAggregate;
use crate::types::MetricCounters;

/// One chart row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartDataPoint {
    pub offset: u32,
    pub label: String,
    pub date: NaiveDate,
    pub compare_date: Option<NaiveDate>,
    pub metrics: MetricCounters,
    /// All zero when no comparison period is active or `compare_date` is `None`.
    pub compare: MetricCounters,
    pub reviews: u32,
    pub compare_reviews: u32,
}

/// Short axis label, e.g. `Jan 5`.
#[must_use]
pub fn day_label(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// Builds the series for `primary`, pairing it with `comparison` by offset.
#[must_use]
pub fn build_series(
    primary: &PeriodAggregate,
    comparison: Option<&PeriodAggregate>,
) -> Vec<ChartDataPoint> {
    (0..primary.range.len_days())
        .map_while(|offset| {
            let date = primary.range.offset(offset)?;
            let metrics = primary
                .metrics_by_date
                .get(&date)
                .copied()
                .unwrap_or_default();
            let reviews = primary.reviews_by_date.get(&date).copied().unwrap_or(0);

            let compare_date = comparison.and_then(|cmp| cmp.range.offset(offset));
            let (compare, compare_reviews) = match (comparison, compare_date) {
                (Some(cmp), Some(day)) => (
                    cmp.metrics_by_date.get(&day).copied().unwrap_or_default(),
                    cmp.reviews_by_date.get(&day).copied().unwrap_or(0),
                ),
                _ => (MetricCounters::default(), 0),
            };

            Some(ChartDataPoint {
                offset,
                label: day_label(date),
                date,
                compare_date,
                metrics,
                compare,
                reviews,
                compare_reviews,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::filter::DateRange;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn period(from: NaiveDate, to: NaiveDate, days: &[(NaiveDate, u64, u32)]) -> PeriodAggregate {
        let mut metrics_by_date = BTreeMap::new();
        let mut reviews_by_date = BTreeMap::new();
        let mut totals = MetricCounters::default();
        for &(day, searches, reviews) in days {
            let counters = MetricCounters {
                searches,
                ..MetricCounters::default()
            };
            totals.accumulate(&counters);
            metrics_by_date.insert(day, counters);
            reviews_by_date.insert(day, reviews);
        }
        PeriodAggregate {
            range: DateRange::new(from, to).unwrap(),
            totals,
            metrics_by_date,
            reviews_by_date,
        }
    }

    #[test]
    fn pairs_days_by_offset_across_months() {
        let primary = period(
            date(2024, 1, 1),
            date(2024, 1, 3),
            &[(date(2024, 1, 1), 10, 1), (date(2024, 1, 3), 30, 0)],
        );
        let comparison = period(
            date(2023, 12, 1),
            date(2023, 12, 3),
            &[(date(2023, 12, 1), 7, 2), (date(2023, 12, 3), 9, 0)],
        );

        let series = build_series(&primary, Some(&comparison));
        assert_eq!(series.len(), 3);

        assert_eq!(series[0].date, date(2024, 1, 1));
        assert_eq!(series[0].compare_date, Some(date(2023, 12, 1)));
        assert_eq!(series[0].metrics.searches, 10);
        assert_eq!(series[0].compare.searches, 7);
        assert_eq!(series[0].reviews, 1);
        assert_eq!(series[0].compare_reviews, 2);

        assert_eq!(series[1].metrics, MetricCounters::default());
        assert_eq!(series[1].compare, MetricCounters::default());

        assert_eq!(series[2].date, date(2024, 1, 3));
        assert_eq!(series[2].compare_date, Some(date(2023, 12, 3)));
        assert_eq!(series[2].compare.searches, 9);
    }

    #[test]
    fn no_comparison_leaves_compare_side_zero() {
        let primary = period(
            date(2024, 1, 1),
            date(2024, 1, 5),
            &[(date(2024, 1, 2), 4, 3)],
        );
        let series = build_series(&primary, None);
        assert_eq!(series.len(), 5);
        for point in &series {
            assert_eq!(point.compare, MetricCounters::default());
            assert_eq!(point.compare_reviews, 0);
            assert!(point.compare_date.is_none());
        }
        assert_eq!(series[1].metrics.searches, 4);
        assert_eq!(series[1].reviews, 3);
    }

    #[test]
    fn length_follows_primary_when_comparison_is_shorter() {
        let primary = period(date(2024, 1, 1), date(2024, 1, 5), &[]);
        let comparison = period(
            date(2023, 1, 1),
            date(2023, 1, 2),
            &[(date(2023, 1, 2), 8, 0), (date(2023, 1, 3), 99, 5)],
        );
        let series = build_series(&primary, Some(&comparison));
        assert_eq!(series.len(), 5);
        assert_eq!(series[1].compare.searches, 8);
        // 2023-01-03 is outside the comparison range even though data exists for it.
        assert!(series[2].compare_date.is_none());
        assert_eq!(series[2].compare.searches, 0);
        assert_eq!(series[2].compare_reviews, 0);
    }

    #[test]
    fn length_follows_primary_when_comparison_is_longer() {
        let primary = period(date(2024, 1, 1), date(2024, 1, 2), &[]);
        let comparison = period(date(2023, 1, 1), date(2023, 1, 31), &[]);
        assert_eq!(build_series(&primary, Some(&comparison)).len(), 2);
    }

    #[test]
    fn labels_use_month_abbreviation_and_day() {
        assert_eq!(day_label(date(2024, 1, 5)), "Jan 5");
        assert_eq!(day_label(date(2024, 12, 25)), "Dec 25");
    }

    #[test]
    fn rebuilding_is_identical() {
        let primary = period(
            date(2024, 2, 1),
            date(2024, 2, 29),
            &[(date(2024, 2, 10), 5, 1)],
        );
        let comparison = period(date(2024, 1, 3), date(2024, 1, 31), &[]);
        assert_eq!(
            build_series(&primary, Some(&comparison)),
            build_series(&primary, Some(&comparison))
        );
    }
}
