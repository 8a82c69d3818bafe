//! Full dashboard pipeline over one immutable data snapshot.
//!
//! Period filter, aggregation, comparison, KPI changes and lifetime
//! statistics, in that order. Running it twice on the same inputs yields
//! identical views.

use serde::Serialize;

use crate::engine::{
    aggregate_period, build_series, filter_by_period, kpi_changes, lifetime_stats, ChartDataPoint,
    KpiChanges, LifetimeStats, ReviewStats,
};
use crate::filter::Filter;
use crate::types::{Location, MetricCounters, MetricRecord, ReviewRecord};

/// Everything fetched for one filter.
///
/// Metrics outside the relevant range are tolerated; the pipeline
/// re-filters them. `reviews` is the complete, date-unbounded review set of
/// the in-scope locations.
#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    pub locations: Vec<Location>,
    pub metrics: Vec<MetricRecord>,
    pub comparison_metrics: Vec<MetricRecord>,
    pub reviews: Vec<ReviewRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub filter: Filter,
    pub locations: Vec<Location>,
    pub totals: MetricCounters,
    pub comparison_totals: Option<MetricCounters>,
    pub changes: Option<KpiChanges>,
    pub review_stats: ReviewStats,
    pub comparison_review_stats: Option<ReviewStats>,
    pub lifetime: LifetimeStats,
    pub series: Vec<ChartDataPoint>,
    /// Reviews created inside the primary range, newest first.
    pub reviews: Vec<ReviewRecord>,
}

#[must_use]
pub fn build_dashboard(filter: &Filter, data: &DashboardData) -> DashboardView {
    let metrics = filter_by_period(&data.metrics, &filter.range);
    let mut reviews = filter_by_period(&data.reviews, &filter.range);
    let primary = aggregate_period(filter.range, &metrics, &reviews);
    let review_stats = ReviewStats::from_reviews(&reviews);

    let comparison = filter.comparison.map(|range| {
        let metrics = filter_by_period(&data.comparison_metrics, &range);
        let reviews = filter_by_period(&data.reviews, &range);
        let stats = ReviewStats::from_reviews(&reviews);
        (aggregate_period(range, &metrics, &reviews), stats)
    });

    let series = build_series(&primary, comparison.as_ref().map(|(agg, _)| agg));
    let changes = comparison.as_ref().map(|(agg, stats)| {
        kpi_changes(&primary.totals, &agg.totals, &review_stats, stats)
    });

    // Stable sort keeps upstream order for same-day reviews.
    reviews.sort_by(|a, b| b.date.cmp(&a.date));

    tracing::debug!(
        range = %filter.range,
        metric_records = metrics.len(),
        reviews = reviews.len(),
        comparing = comparison.is_some(),
        "dashboard assembled"
    );

    DashboardView {
        filter: filter.clone(),
        locations: data.locations.clone(),
        totals: primary.totals,
        comparison_totals: comparison.as_ref().map(|(agg, _)| agg.totals),
        changes,
        review_stats,
        comparison_review_stats: comparison.map(|(_, stats)| stats),
        lifetime: lifetime_stats(&data.reviews),
        series,
        reviews,
    }
}
