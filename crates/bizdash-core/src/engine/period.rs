//! Closed-interval date filtering.

use chrono::NaiveDate;

use crate::filter::DateRange;
use crate::types::{MetricRecord, ReviewRecord};

/// A record that belongs to one calendar day.
///
/// Dates are already normalized to calendar days when records are built,
/// so comparison here never sees a time-of-day component.
pub trait Dated {
    fn date(&self) -> NaiveDate;
}

impl Dated for MetricRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for ReviewRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Returns the records dated within `range`, both endpoints included.
#[must_use]
pub fn filter_by_period<T: Dated + Clone>(records: &[T], range: &DateRange) -> Vec<T> {
    records
        .iter()
        .filter(|record| range.contains(record.date()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MetricCounters;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn metric(day: u32) -> MetricRecord {
        MetricRecord {
            location_id: "loc1".to_string(),
            date: date(2024, 1, day),
            counters: MetricCounters {
                searches: u64::from(day),
                ..MetricCounters::default()
            },
        }
    }

    #[test]
    fn keeps_both_endpoints() {
        let records: Vec<MetricRecord> = (1..=10).map(metric).collect();
        let range = DateRange::new(date(2024, 1, 3), date(2024, 1, 5)).unwrap();
        let kept = filter_by_period(&records, &range);
        let days: Vec<u64> = kept.iter().map(|r| r.counters.searches).collect();
        assert_eq!(days, vec![3, 4, 5]);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let range = DateRange::new(date(2024, 1, 3), date(2024, 1, 5)).unwrap();
        assert!(filter_by_period::<MetricRecord>(&[], &range).is_empty());
    }

    #[test]
    fn single_day_range_selects_exactly_that_day() {
        let records: Vec<MetricRecord> = (1..=3).map(metric).collect();
        let range = DateRange::new(date(2024, 1, 2), date(2024, 1, 2)).unwrap();
        let kept = filter_by_period(&records, &range);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].date, date(2024, 1, 2));
    }
}
