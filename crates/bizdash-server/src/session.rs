//! The dashboard session: one active filter per server process.
//!
//! Every filter replacement bumps a generation counter and drops analysed
//! sentiments. Handlers capture a [`Selection`] before fetching and check
//! it again when results arrive; results for an older generation are
//! discarded instead of being shown against the new filter.

use bizdash_core::Filter;
use bizdash_sentiment::SentimentAnalysis;
use tokio::sync::RwLock;

/// A filter together with the generation it was installed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub filter: Filter,
    pub generation: u64,
}

/// The session moved on while a request was in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaleSelection {
    pub requested: u64,
    pub current: u64,
}

#[derive(Debug)]
struct SessionState {
    filter: Filter,
    generation: u64,
    analysis: Option<SentimentAnalysis>,
}

#[derive(Debug)]
pub struct Session {
    state: RwLock<SessionState>,
}

impl Session {
    #[must_use]
    pub fn new(filter: Filter) -> Self {
        Self {
            state: RwLock::new(SessionState {
                filter,
                generation: 0,
                analysis: None,
            }),
        }
    }

    pub async fn selection(&self) -> Selection {
        let state = self.state.read().await;
        Selection {
            filter: state.filter.clone(),
            generation: state.generation,
        }
    }

    /// Installs `filter` wholesale and returns the new selection.
    pub async fn replace_filter(&self, filter: Filter) -> Selection {
        let mut state = self.state.write().await;
        state.filter = filter;
        state.generation = state.generation.wrapping_add(1);
        state.analysis = None;
        tracing::info!(
            generation = state.generation,
            scope = %state.filter.scope,
            range = %state.filter.range,
            comparing = state.filter.comparison.is_some(),
            "session filter replaced"
        );
        Selection {
            filter: state.filter.clone(),
            generation: state.generation,
        }
    }

    /// Analysed sentiments of `generation`, if it is still current.
    ///
    /// # Errors
    ///
    /// [`StaleSelection`] when the filter was replaced after `generation`.
    pub async fn analysis(
        &self,
        generation: u64,
    ) -> Result<Option<SentimentAnalysis>, StaleSelection> {
        let state = self.state.read().await;
        check(generation, state.generation)?;
        Ok(state.analysis.clone())
    }

    /// Stores classifier output computed for `generation`.
    ///
    /// # Errors
    ///
    /// [`StaleSelection`] when the filter was replaced after `generation`;
    /// the analysis is dropped.
    pub async fn store_analysis(
        &self,
        generation: u64,
        analysis: SentimentAnalysis,
    ) -> Result<(), StaleSelection> {
        let mut state = self.state.write().await;
        check(generation, state.generation)?;
        state.analysis = Some(analysis);
        Ok(())
    }
}

fn check(requested: u64, current: u64) -> Result<(), StaleSelection> {
    if requested == current {
        Ok(())
    } else {
        tracing::info!(requested, current, "discarding result for a stale selection");
        Err(StaleSelection { requested, current })
    }
}
