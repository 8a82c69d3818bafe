//! The aggregation and period-comparison engine.
//!
//! Every function here is pure: the same inputs always produce the same
//! outputs, and empty or zero-valued inputs are valid business answers
//! rather than errors.

pub mod aggregate;
pub mod compare;
pub mod kpi;
pub mod lifetime;
pub mod merge;
pub mod period;

pub use aggregate::{aggregate_period, merge_by_date, reviews_by_date, totals, PeriodAggregate};
pub use compare::{build_series, day_label, ChartDataPoint};
pub use kpi::{average_rating, kpi_changes, percent_change, KpiChanges, ReviewStats};
pub use lifetime::{lifetime_stats, LifetimeStats};
pub use merge::{apply_sentiments, SentimentAssignment};
pub use period::{filter_by_period, Dated};
