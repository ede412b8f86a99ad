use chrono::NaiveDate;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{info, instrument, warn};

use crate::client::ApodSource;
use crate::dates::{last_n_dates, today};
use crate::demo::demo_record;
use crate::metrics;
use crate::types::{ErrorKind, FetchOutcome, LoadError, LoadResult};

const JOIN_FAILURE_MESSAGE: &str = "Failed to fetch data from NASA API.";
const DEMO_FALLBACK_MESSAGE: &str = "Unable to fetch data from NASA API. Showing demo content.";

/// Loads a window of dates with an outage check on the newest date and a demo fallback.
///
/// The newest date is fetched alone first. If the upstream reports an outage
/// there, the rest of the window is skipped and the demo entry is returned, so
/// a dead upstream costs one round trip instead of `n` parallel timeouts.
/// The result always contains at least one entry. Dropping the `load` future
/// aborts any fetches still in flight.
#[derive(Clone)]
pub struct ApodLoader {
    source: Arc<dyn ApodSource>,
    today: fn() -> NaiveDate,
}

impl ApodLoader {
    pub fn new(source: Arc<dyn ApodSource>) -> Self {
        Self { source, today }
    }

    /// Override the clock used to date the demo entry.
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    #[instrument(skip(self))]
    pub async fn load(&self, n: usize, base: NaiveDate) -> LoadResult {
        let dates = last_n_dates(n, base);
        let Some((first, rest)) = dates.split_first() else {
            return self.finish(Vec::new());
        };

        let newest = self.source.fetch_one(first).await;
        if let Some(err) = newest.error().filter(|e| e.kind == ErrorKind::ServiceOutage) {
            info!(date = %first, "Outage on newest date, serving demo content");
            let result = LoadResult {
                apods: vec![demo_record((self.today)())],
                error: Some(err.clone()),
            };
            metrics::loader::batch(&result, true);
            return result;
        }

        let mut fetches = JoinSet::new();
        for (slot, date) in rest.iter().enumerate() {
            let source = Arc::clone(&self.source);
            let date = date.clone();
            fetches.spawn(async move { (slot, source.fetch_one(&date).await) });
        }

        let mut remaining: Vec<Option<FetchOutcome>> = vec![None; rest.len()];
        while let Some(joined) = fetches.join_next().await {
            match joined {
                Ok((slot, outcome)) => remaining[slot] = Some(outcome),
                Err(e) => warn!("APOD fetch task did not complete: {}", e),
            }
        }

        let mut outcomes = Vec::with_capacity(dates.len());
        outcomes.push(newest);
        outcomes.extend(remaining.into_iter().map(|outcome| {
            outcome.unwrap_or_else(|| {
                FetchOutcome::Failed(LoadError::new(ErrorKind::ApiError, JOIN_FAILURE_MESSAGE))
            })
        }));

        self.finish(outcomes)
    }

    fn finish(&self, outcomes: Vec<FetchOutcome>) -> LoadResult {
        let result = aggregate(outcomes, (self.today)());
        let demo_fallback = result.apods.len() == 1 && crate::demo::is_demo(&result.apods[0]);
        info!(
            items = result.apods.len(),
            error = result.error.as_ref().map(|e| e.kind.as_str()).unwrap_or("none"),
            "APOD batch loaded"
        );
        metrics::loader::batch(&result, demo_fallback);
        result
    }
}

/// Keep successes in date order, report the first failure by position, and
/// substitute the demo entry when nothing usable came back.
pub fn aggregate(outcomes: Vec<FetchOutcome>, today: NaiveDate) -> LoadResult {
    let mut apods = Vec::new();
    let mut error = None;
    for outcome in outcomes {
        match outcome {
            FetchOutcome::Ok(record) => apods.push(record),
            FetchOutcome::Failed(err) => {
                if error.is_none() {
                    error = Some(err);
                }
            }
            FetchOutcome::Absent => {}
        }
    }

    if apods.is_empty() {
        return LoadResult {
            apods: vec![demo_record(today)],
            error: Some(
                error.unwrap_or_else(|| LoadError::new(ErrorKind::ApiError, DEMO_FALLBACK_MESSAGE)),
            ),
        };
    }

    LoadResult { apods, error }
}
