//! The filter model: which locations and which days a dashboard covers.
//!
//! A [`Filter`] is immutable. Every user change produces a new value that
//! replaces the previous one wholesale.

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::types::Location;
use crate::CoreError;

/// Longest range a filter may cover, in days.
pub const MAX_RANGE_DAYS: u32 = 3660;

/// Closed calendar-date interval, inclusive of both endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

#[derive(Deserialize)]
struct RawDateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = CoreError;

    fn try_from(raw: RawDateRange) -> Result<Self, Self::Error> {
        DateRange::new(raw.from, raw.to)
    }
}

impl DateRange {
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidDateRange`] when `from` is after `to`,
    /// and [`CoreError::RangeTooLong`] past [`MAX_RANGE_DAYS`].
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, CoreError> {
        if from > to {
            return Err(CoreError::InvalidDateRange { from, to });
        }
        let days = (to - from).num_days() + 1;
        if days > i64::from(MAX_RANGE_DAYS) {
            return Err(CoreError::RangeTooLong {
                days,
                max: MAX_RANGE_DAYS,
            });
        }
        Ok(Self { from, to })
    }

    #[must_use]
    pub fn from(&self) -> NaiveDate {
        self.from
    }

    #[must_use]
    pub fn to(&self) -> NaiveDate {
        self.to
    }

    /// Number of calendar days covered, counting both endpoints.
    #[must_use]
    pub fn len_days(&self) -> u32 {
        let span = (self.to - self.from).num_days();
        u32::try_from(span).unwrap_or(u32::MAX).saturating_add(1)
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    /// The date `offset` days after `from`, or `None` past the end of the range.
    #[must_use]
    pub fn offset(&self, offset: u32) -> Option<NaiveDate> {
        let date = self
            .from
            .checked_add_signed(Duration::days(i64::from(offset)))?;
        self.contains(date).then_some(date)
    }

    /// The period of identical length that ends the day before `from`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoPrecedingPeriod`] when that period would start
    /// before the earliest representable date.
    pub fn preceding(&self) -> Result<Self, CoreError> {
        let len = Duration::days(i64::from(self.len_days()));
        let from = self
            .from
            .checked_sub_signed(len)
            .ok_or(CoreError::NoPrecedingPeriod(*self))?;
        let to = self
            .from
            .pred_opt()
            .ok_or(CoreError::NoPrecedingPeriod(*self))?;
        Ok(Self { from, to })
    }

    /// Whole calendar month containing `date`.
    #[must_use]
    pub fn month_of(date: NaiveDate) -> Self {
        let from = date.with_day(1).unwrap_or(date);
        let to = from
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(date);
        Self { from, to }
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.from, self.to)
    }
}

/// Which locations a filter covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum EntityScope {
    All,
    Brand(String),
    Locations(BTreeSet<String>),
}

impl EntityScope {
    /// Selects the in-scope locations from the directory.
    ///
    /// Explicit ids absent from the directory are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyScope`] when no location matches.
    pub fn resolve<'a>(&self, locations: &'a [Location]) -> Result<Vec<&'a Location>, CoreError> {
        let selected: Vec<&Location> = locations
            .iter()
            .filter(|location| match self {
                EntityScope::All => true,
                EntityScope::Brand(brand) => location.brand.as_deref() == Some(brand.as_str()),
                EntityScope::Locations(ids) => ids.contains(&location.id),
            })
            .collect();

        if selected.is_empty() {
            return Err(CoreError::EmptyScope(self.to_string()));
        }
        Ok(selected)
    }
}

impl std::fmt::Display for EntityScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityScope::All => write!(f, "all locations"),
            EntityScope::Brand(brand) => write!(f, "brand '{brand}'"),
            EntityScope::Locations(ids) => {
                let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
                write!(f, "locations [{}]", ids.join(", "))
            }
        }
    }
}

/// Immutable description of what a dashboard includes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub scope: EntityScope,
    pub range: DateRange,
    #[serde(default)]
    pub comparison: Option<DateRange>,
}

impl Filter {
    #[must_use]
    pub fn new(scope: EntityScope, range: DateRange) -> Self {
        Self {
            scope,
            range,
            comparison: None,
        }
    }

    /// The initial dashboard filter: all locations over the calendar month
    /// that contained the day thirty days before `today`.
    #[must_use]
    pub fn default_for(today: NaiveDate) -> Self {
        let anchor = today - Duration::days(30);
        Self::new(EntityScope::All, DateRange::month_of(anchor))
    }

    /// Enables comparison against the immediately preceding period.
    ///
    /// # Errors
    ///
    /// See [`DateRange::preceding`].
    pub fn with_default_comparison(self) -> Result<Self, CoreError> {
        let comparison = self.range.preceding()?;
        Ok(Self {
            comparison: Some(comparison),
            ..self
        })
    }

    /// Enables comparison against an explicit range.
    ///
    /// The range may differ in length from the primary range; the series
    /// zero-fills comparison values past its end.
    #[must_use]
    pub fn with_comparison(self, comparison: DateRange) -> Self {
        if comparison.len_days() != self.range.len_days() {
            tracing::debug!(
                primary_days = self.range.len_days(),
                comparison_days = comparison.len_days(),
                "comparison range length differs from primary range"
            );
        }
        Self {
            comparison: Some(comparison),
            ..self
        }
    }

    #[must_use]
    pub fn without_comparison(self) -> Self {
        Self {
            comparison: None,
            ..self
        }
    }
}

/// Read-only location directory supplied by the data provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directory {
    pub locations: Vec<Location>,
}

impl Directory {
    #[must_use]
    pub fn new(locations: Vec<Location>) -> Self {
        Self { locations }
    }

    /// Distinct grouping keys present in the directory, sorted.
    #[must_use]
    pub fn brands(&self) -> Vec<String> {
        self.locations
            .iter()
            .filter_map(|location| location.brand.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Locations available for selection under a brand, or all when `None`.
    #[must_use]
    pub fn available(&self, brand: Option<&str>) -> Vec<&Location> {
        self.locations
            .iter()
            .filter(|location| brand.is_none_or(|b| location.brand.as_deref() == Some(b)))
            .collect()
    }

    /// # Errors
    ///
    /// See [`EntityScope::resolve`].
    pub fn resolve(&self, scope: &EntityScope) -> Result<Vec<&Location>, CoreError> {
        scope.resolve(&self.locations)
    }
}
