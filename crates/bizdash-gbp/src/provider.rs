//! Data providers: where a dashboard's records come from.
//!
//! The static variant serves a snapshot file; the remote variant calls the
//! Business Profile APIs. Which one runs is decided once, from
//! configuration, and the engine never knows the difference.

use bizdash_core::{
    load_snapshot, AppConfig, DashboardData, DataSourceKind, DateRange, Directory, Filter,
    MetricRecord, ReviewRecord, Snapshot,
};
use futures::stream::{self, StreamExt, TryStreamExt};

use crate::client::GbpClient;
use crate::error::GbpError;
use crate::normalize::{normalize_location, normalize_metrics, normalize_reviews};

#[derive(Debug)]
pub enum DataProvider {
    Static(StaticProvider),
    Remote(RemoteProvider),
}

#[derive(Debug)]
pub struct StaticProvider {
    snapshot: Snapshot,
    directory: Directory,
}

impl StaticProvider {
    #[must_use]
    pub fn new(snapshot: Snapshot) -> Self {
        let directory = snapshot.directory();
        Self {
            snapshot,
            directory,
        }
    }
}

#[derive(Debug)]
pub struct RemoteProvider {
    client: GbpClient,
    account: String,
    directory: Directory,
    max_concurrent: usize,
}

impl RemoteProvider {
    /// Resolves the account and loads the location directory.
    ///
    /// When `account` is `None` the first account listed for the credential
    /// is used.
    ///
    /// # Errors
    ///
    /// [`GbpError::NoAccounts`] when the credential sees no account, or any
    /// client error from the listing calls.
    pub async fn connect(
        client: GbpClient,
        account: Option<String>,
        max_concurrent: usize,
    ) -> Result<Self, GbpError> {
        let account = match account {
            Some(account) => account,
            None => client
                .list_accounts()
                .await?
                .into_iter()
                .next()
                .map(|a| a.name)
                .ok_or(GbpError::NoAccounts)?,
        };

        let locations: Vec<_> = client
            .list_locations(&account)
            .await?
            .iter()
            .map(normalize_location)
            .collect();
        tracing::info!(account = %account, locations = locations.len(), "location directory loaded");

        Ok(Self {
            client,
            account,
            directory: Directory::new(locations),
            max_concurrent: max_concurrent.max(1),
        })
    }

    #[must_use]
    pub fn client(&self) -> &GbpClient {
        &self.client
    }

    #[must_use]
    pub fn account(&self) -> &str {
        &self.account
    }

    async fn metrics(
        &self,
        location_ids: &[String],
        range: &DateRange,
    ) -> Result<Vec<MetricRecord>, GbpError> {
        let per_location: Vec<Vec<MetricRecord>> = stream::iter(location_ids.to_vec())
            .map(|id| async move {
                let response = self.client.fetch_daily_metrics(&id, range).await?;
                Ok::<_, GbpError>(normalize_metrics(&id, &response))
            })
            .buffer_unordered(self.max_concurrent)
            .try_collect()
            .await?;
        Ok(per_location.into_iter().flatten().collect())
    }

    async fn reviews(&self, location_ids: &[String]) -> Result<Vec<ReviewRecord>, GbpError> {
        let per_location: Vec<Vec<ReviewRecord>> = stream::iter(location_ids.to_vec())
            .map(|id| async move {
                let wire = self.client.fetch_reviews(&self.account, &id).await?;
                Ok::<_, GbpError>(normalize_reviews(&id, &wire))
            })
            .buffer_unordered(self.max_concurrent)
            .try_collect()
            .await?;
        Ok(per_location.into_iter().flatten().collect())
    }
}

impl DataProvider {
    /// Builds the provider selected by `config.data_source`.
    ///
    /// # Errors
    ///
    /// [`GbpError::Config`] if the snapshot cannot be loaded, or any error
    /// from [`RemoteProvider::connect`].
    pub async fn from_config(config: &AppConfig) -> Result<Self, GbpError> {
        match config.data_source {
            DataSourceKind::Static => {
                let snapshot = load_snapshot(&config.snapshot_path)?;
                Ok(DataProvider::Static(StaticProvider::new(snapshot)))
            }
            DataSourceKind::Remote => {
                let token = config.gbp_access_token.as_deref().ok_or_else(|| {
                    GbpError::Config(bizdash_core::ConfigError::MissingEnvVar(
                        "BIZDASH_GBP_ACCESS_TOKEN".to_string(),
                    ))
                })?;
                let client = GbpClient::new(token, config.gbp_timeout_secs)?;
                let remote = RemoteProvider::connect(
                    client,
                    config.gbp_account.clone(),
                    config.gbp_max_concurrent_locations,
                )
                .await?;
                Ok(DataProvider::Remote(remote))
            }
        }
    }

    #[must_use]
    pub fn kind(&self) -> DataSourceKind {
        match self {
            DataProvider::Static(_) => DataSourceKind::Static,
            DataProvider::Remote(_) => DataSourceKind::Remote,
        }
    }

    #[must_use]
    pub fn directory(&self) -> &Directory {
        match self {
            DataProvider::Static(p) => &p.directory,
            DataProvider::Remote(p) => &p.directory,
        }
    }

    /// Daily metric records of the given locations inside `range`.
    ///
    /// # Errors
    ///
    /// Any client error from the remote variant; the static variant never fails.
    pub async fn metrics(
        &self,
        location_ids: &[String],
        range: &DateRange,
    ) -> Result<Vec<MetricRecord>, GbpError> {
        match self {
            DataProvider::Static(p) => Ok(p.snapshot.metrics_for(location_ids, range)),
            DataProvider::Remote(p) => p.metrics(location_ids, range).await,
        }
    }

    /// Every review of the given locations, regardless of date.
    ///
    /// # Errors
    ///
    /// Any client error from the remote variant; the static variant never fails.
    pub async fn reviews(&self, location_ids: &[String]) -> Result<Vec<ReviewRecord>, GbpError> {
        match self {
            DataProvider::Static(p) => Ok(p.snapshot.reviews_for(location_ids)),
            DataProvider::Remote(p) => p.reviews(location_ids).await,
        }
    }

    /// Fetches everything a dashboard for `filter` needs.
    ///
    /// Primary metrics, comparison metrics and reviews are fetched
    /// concurrently; the first failure aborts the whole load.
    ///
    /// # Errors
    ///
    /// [`GbpError::EmptyScope`] when the filter selects no location, or any
    /// fetch error.
    pub async fn load(&self, filter: &Filter) -> Result<DashboardData, GbpError> {
        let locations: Vec<_> = self
            .directory()
            .resolve(&filter.scope)?
            .into_iter()
            .cloned()
            .collect();
        let ids: Vec<String> = locations.iter().map(|l| l.id.clone()).collect();

        let comparison = async {
            match &filter.comparison {
                Some(range) => self.metrics(&ids, range).await,
                None => Ok(Vec::new()),
            }
        };

        let (metrics, comparison_metrics, reviews) = tokio::try_join!(
            self.metrics(&ids, &filter.range),
            comparison,
            self.reviews(&ids),
        )?;

        tracing::debug!(
            scope = %filter.scope,
            locations = ids.len(),
            metric_records = metrics.len(),
            comparison_records = comparison_metrics.len(),
            reviews = reviews.len(),
            "dashboard data loaded"
        );

        Ok(DashboardData {
            locations,
            metrics,
            comparison_metrics,
            reviews,
        })
    }
}

#[cfg(test)]
mod tests {
    use bizdash_core::{EntityScope, Location, MetricCounters, Sentiment, StarRating};
    use chrono::NaiveDate;

    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn static_provider() -> DataProvider {
        let location = |id: &str, brand: &str| Location {
            id: id.to_string(),
            name: id.to_uppercase(),
            brand: Some(brand.to_string()),
        };
        let metric = |id: &str, day: u32, searches: u64| MetricRecord {
            location_id: id.to_string(),
            date: date(day),
            counters: MetricCounters {
                searches,
                ..MetricCounters::default()
            },
        };
        let snapshot = Snapshot {
            locations: vec![location("a", "north"), location("b", "south")],
            metrics: vec![metric("a", 1, 10), metric("b", 1, 5), metric("a", 20, 7)],
            reviews: vec![ReviewRecord {
                id: "r1".to_string(),
                location_id: "b".to_string(),
                author: "Pat".to_string(),
                rating: StarRating::new(2).unwrap(),
                text: String::new(),
                date: date(2),
                sentiment: Sentiment::Unanalyzed,
            }],
        };
        DataProvider::Static(StaticProvider::new(snapshot))
    }

    fn first_week() -> DateRange {
        DateRange::new(date(1), date(7)).unwrap()
    }

    #[tokio::test]
    async fn static_load_resolves_brand_scope() {
        let provider = static_provider();
        let filter = Filter::new(EntityScope::Brand("north".to_string()), first_week());
        let data = provider.load(&filter).await.unwrap();

        assert_eq!(data.locations.len(), 1);
        assert_eq!(data.metrics.len(), 1);
        assert_eq!(data.metrics[0].counters.searches, 10);
        assert!(data.reviews.is_empty());
        assert!(data.comparison_metrics.is_empty());
    }

    #[tokio::test]
    async fn static_load_fetches_comparison_range() {
        let provider = static_provider();
        let comparison = DateRange::new(date(15), date(21)).unwrap();
        let filter = Filter::new(EntityScope::All, first_week()).with_comparison(comparison);
        let data = provider.load(&filter).await.unwrap();

        assert_eq!(data.metrics.len(), 2);
        assert_eq!(data.comparison_metrics.len(), 1);
        assert_eq!(data.comparison_metrics[0].date, date(20));
        assert_eq!(data.reviews.len(), 1);
    }

    #[tokio::test]
    async fn unknown_brand_is_empty_scope() {
        let provider = static_provider();
        let filter = Filter::new(EntityScope::Brand("west".to_string()), first_week());
        let err = provider.load(&filter).await.unwrap_err();
        assert!(matches!(err, GbpError::EmptyScope(_)));
        assert!(err.is_empty_result());
    }

    #[tokio::test]
    async fn load_runs_on_a_spawned_task() {
        let provider = std::sync::Arc::new(static_provider());
        let filter = Filter::new(EntityScope::All, first_week());
        let data = tokio::spawn(async move { provider.load(&filter).await })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(data.locations.len(), 2);
    }

    #[test]
    fn directory_and_kind() {
        let provider = static_provider();
        assert_eq!(provider.kind(), DataSourceKind::Static);
        assert_eq!(provider.directory().brands(), vec!["north", "south"]);
    }
}
