use crate::diff::compute_diff;
use crate::episodes::{fetch_episodes, FetchProgress};
use crate::executor::MutationExecutor;
use crate::report::{ReconcileReport, RunMode};
use chrono::Utc;
use reconcile_sources::{MovieLibrary, ShowLibrary, SourceError, TrackingService};
use std::time::Instant;
use thiserror::Error;
use tracing::{error, info, instrument};

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Failed to fetch {dataset} from {service}: {source}")]
    Fetch {
        service: String,
        dataset: &'static str,
        #[source]
        source: SourceError,
    },
}

impl ReconcileError {
    fn fetch(service: &str, dataset: &'static str, source: SourceError) -> Self {
        ReconcileError::Fetch {
            service: service.to_string(),
            dataset,
            source,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReconcileOptions {
    pub mode: RunMode,
    pub episode_concurrency: usize,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            mode: RunMode::DryRun,
            episode_concurrency: 10,
        }
    }
}

/// One reconciliation run: fetch, diff, fan out for episodes, mutate
pub struct Reconciler {
    tracker: Box<dyn TrackingService>,
    movies: Box<dyn MovieLibrary>,
    shows: Box<dyn ShowLibrary>,
    options: ReconcileOptions,
}

impl Reconciler {
    pub fn new(
        tracker: Box<dyn TrackingService>,
        movies: Box<dyn MovieLibrary>,
        shows: Box<dyn ShowLibrary>,
        options: ReconcileOptions,
    ) -> Self {
        Self {
            tracker,
            movies,
            shows,
            options,
        }
    }

    /// Fails only when the Trakt collection or the movie library cannot be
    /// read. An unreadable series list is treated as empty.
    #[instrument(skip(self, progress), fields(mode = %self.options.mode))]
    pub async fn run(&self, progress: &dyn FetchProgress) -> Result<ReconcileReport, ReconcileError> {
        let started_at = Utc::now();
        let start = Instant::now();
        info!("Starting {} reconciliation", self.options.mode);

        let (tracked_movies, tracked_shows, local_movies, local_series) = futures::join!(
            self.tracker.collected_movies(),
            self.tracker.collected_shows(),
            self.movies.movies(),
            self.shows.series(),
        );

        let tracker_name = self.tracker.service_name();
        let tracked_movies = tracked_movies.map_err(|e| ReconcileError::fetch(tracker_name, "movie collection", e))?;
        let tracked_shows = tracked_shows.map_err(|e| ReconcileError::fetch(tracker_name, "show collection", e))?;
        let local_movies = local_movies.map_err(|e| ReconcileError::fetch(self.movies.service_name(), "movies", e))?;

        let (local_series, shows_degraded) = match local_series {
            Ok(series) => (series, false),
            Err(e) => {
                error!(
                    "Failed to fetch series from {}, continuing with an empty show list: {}",
                    self.shows.service_name(),
                    e
                );
                (Vec::new(), true)
            }
        };

        info!(
            tracked_movies = tracked_movies.len(),
            tracked_shows = tracked_shows.len(),
            local_movies = local_movies.len(),
            local_shows = local_series.len(),
            "Collections fetched"
        );

        let episodes = fetch_episodes(
            self.shows.as_ref(),
            local_series,
            self.options.episode_concurrency,
            progress,
        )
        .await;

        let mut diff = compute_diff(&tracked_movies, &tracked_shows, &local_movies, &episodes.shows);
        let mut skipped = episodes.skipped;
        skipped.append(&mut diff.skipped);
        diff.skipped = skipped;

        info!(
            orphaned_movies = diff.orphaned_movies.len(),
            orphaned_shows = diff.orphaned_shows.len(),
            missing_movies = diff.missing_movies.len(),
            missing_episodes = diff.missing_episodes.len(),
            skipped = diff.skipped.len(),
            "Diff computed"
        );

        let executor = MutationExecutor::new(self.tracker.as_ref(), self.options.mode);
        let (removal, addition) = executor.execute(&diff).await;

        let elapsed = start.elapsed();
        info!("Reconciliation finished in {:.1}s", elapsed.as_secs_f64());

        Ok(ReconcileReport {
            mode: self.options.mode,
            started_at,
            elapsed_secs: elapsed.as_secs_f64(),
            orphaned_movies: diff.orphaned_movies,
            orphaned_shows: diff.orphaned_shows,
            missing_movies: diff.missing_movies,
            missing_episodes: diff.missing_episodes,
            skipped: diff.skipped,
            episode_failures: episodes.failures,
            shows_degraded,
            removal,
            addition,
        })
    }
}
