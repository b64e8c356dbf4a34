use crate::report::EpisodeFetchFailure;
use futures::stream::{self, StreamExt};
use reconcile_models::{ShowRecord, SkipNotice, SkipReason};
use reconcile_sources::ShowLibrary;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Observer for the per-show episode fan-out
pub trait FetchProgress: Send + Sync {
    fn start(&self, total: usize);
    /// One show finished, successfully or not
    fn advance(&self, title: &str);
    fn finish(&self);
}

/// Progress reporting through log lines, for non-interactive runs.
/// Logs every `interval` completed shows and a summary at the end.
pub struct LogProgress {
    interval: usize,
    total: AtomicUsize,
    done: AtomicUsize,
    started: Mutex<Option<Instant>>,
}

impl LogProgress {
    pub fn new(interval: usize) -> Self {
        Self {
            interval: interval.max(1),
            total: AtomicUsize::new(0),
            done: AtomicUsize::new(0),
            started: Mutex::new(None),
        }
    }

    pub fn completed(&self) -> usize {
        self.done.load(Ordering::Relaxed)
    }

    fn elapsed_secs(&self) -> f64 {
        self.started
            .lock()
            .ok()
            .and_then(|started| (*started).map(|t| t.elapsed().as_secs_f64()))
            .unwrap_or(0.0)
    }
}

impl Default for LogProgress {
    fn default() -> Self {
        Self::new(25)
    }
}

impl FetchProgress for LogProgress {
    fn start(&self, total: usize) {
        self.total.store(total, Ordering::Relaxed);
        self.done.store(0, Ordering::Relaxed);
        if let Ok(mut started) = self.started.lock() {
            *started = Some(Instant::now());
        }
        info!(total, "Fetching Sonarr episodes for {} shows", total);
    }

    fn advance(&self, title: &str) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        let total = self.total.load(Ordering::Relaxed);
        debug!(done, total, "Episodes fetched for {}", title);
        if done % self.interval == 0 && done < total {
            let elapsed = self.elapsed_secs();
            let rate = if elapsed > 0.0 { done as f64 / elapsed } else { 0.0 };
            info!(done, total, "Progress: {}/{} ({:.1} shows/sec)", done, total, rate);
        }
    }

    fn finish(&self) {
        info!(
            done = self.completed(),
            total = self.total.load(Ordering::Relaxed),
            "Episode fetch completed in {:.1}s",
            self.elapsed_secs()
        );
    }
}

/// Local shows with their episode lists filled in
#[derive(Debug, Default)]
pub struct EpisodeFetchOutcome {
    /// Shows that were dispatched, in the order they were given
    pub shows: Vec<ShowRecord>,
    pub skipped: Vec<SkipNotice>,
    pub failures: Vec<EpisodeFetchFailure>,
}

/// Fetch the episode list of every show with at most `concurrency` requests in
/// flight. Shows without a TVDB ID are skipped without a request. A failed show
/// keeps an empty episode list and is recorded in `failures`.
pub async fn fetch_episodes(
    library: &dyn ShowLibrary,
    shows: Vec<ShowRecord>,
    concurrency: usize,
    progress: &dyn FetchProgress,
) -> EpisodeFetchOutcome {
    let mut outcome = EpisodeFetchOutcome::default();
    let mut eligible = Vec::with_capacity(shows.len());

    for show in shows {
        if show.tvdb_id.is_none() {
            outcome.skipped.push(SkipNotice::new(
                library.service_name(),
                show.display_title(),
                SkipReason::MissingTvdbId,
            ));
            continue;
        }
        if show.imdb_id.is_none() {
            debug!("{} has no IMDb ID; its episodes cannot be added", show.display_title());
        }
        eligible.push(show);
    }

    progress.start(eligible.len());

    let mut fetches = stream::iter(eligible.into_iter().enumerate())
        .map(|(index, show)| async move {
            let result = match show.series_id {
                Some(series_id) => library.episodes(series_id).await.map_err(|e| e.to_string()),
                None => Err("record has no series id".to_string()),
            };
            (index, show, result)
        })
        .buffer_unordered(concurrency.max(1));

    let mut fetched = Vec::new();
    while let Some((index, mut show, result)) = fetches.next().await {
        progress.advance(&show.title);
        match result {
            Ok(episodes) => show.episodes = episodes,
            Err(error) => {
                warn!(
                    series_id = show.series_id,
                    "Failed to fetch episodes for {}: {}",
                    show.display_title(),
                    error
                );
                outcome.failures.push(EpisodeFetchFailure {
                    title: show.display_title(),
                    series_id: show.series_id,
                    error,
                });
                show.episodes.clear();
            }
        }
        fetched.push((index, show));
    }

    progress.finish();

    fetched.sort_by_key(|(index, _)| *index);
    outcome.shows = fetched.into_iter().map(|(_, show)| show).collect();
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reconcile_models::{EpisodeRecord, ImdbId, TvdbId};
    use reconcile_sources::SourceError;
    use std::collections::HashSet;
    use std::time::Duration;

    struct FakeSonarr {
        failing: HashSet<u64>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        calls: Mutex<Vec<u64>>,
    }

    impl FakeSonarr {
        fn new(failing: &[u64]) -> Self {
            Self {
                failing: failing.iter().copied().collect(),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ShowLibrary for FakeSonarr {
        fn service_name(&self) -> &str {
            "sonarr"
        }

        async fn series(&self) -> Result<Vec<ShowRecord>, SourceError> {
            Ok(Vec::new())
        }

        async fn episodes(&self, series_id: u64) -> Result<Vec<EpisodeRecord>, SourceError> {
            self.calls.lock().unwrap().push(series_id);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            // Later shows finish first so completion order differs from input order
            tokio::time::sleep(Duration::from_millis(30 - (series_id % 30))).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.failing.contains(&series_id) {
                return Err(SourceError::Status {
                    service: "sonarr".to_string(),
                    url: format!("/episode?seriesId={}", series_id),
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            Ok(vec![EpisodeRecord {
                season: 1,
                number: series_id as u32,
                has_file: true,
            }])
        }
    }

    fn show(series_id: u64, tvdb: Option<u32>) -> ShowRecord {
        ShowRecord {
            series_id: Some(series_id),
            tvdb_id: TvdbId::from_raw(tvdb),
            imdb_id: ImdbId::parse(Some("tt1")),
            title: format!("Show {}", series_id),
            year: None,
            episodes: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let sonarr = FakeSonarr::new(&[]);
        let shows: Vec<_> = (1..=20).map(|id| show(id, Some(id as u32 + 1000))).collect();
        let progress = LogProgress::new(5);

        let outcome = fetch_episodes(&sonarr, shows, 3, &progress).await;

        assert_eq!(outcome.shows.len(), 20);
        assert_eq!(sonarr.calls.lock().unwrap().len(), 20);
        let max = sonarr.max_in_flight.load(Ordering::SeqCst);
        assert!(max <= 3, "max in flight was {}", max);
        assert!(max >= 2);
        assert_eq!(progress.completed(), 20);
    }

    #[tokio::test]
    async fn test_results_keep_input_order() {
        let sonarr = FakeSonarr::new(&[]);
        let shows: Vec<_> = (1..=6).map(|id| show(id, Some(id as u32))).collect();

        let outcome = fetch_episodes(&sonarr, shows, 6, &LogProgress::default()).await;

        let ids: Vec<_> = outcome.shows.iter().filter_map(|s| s.series_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
        assert!(outcome.shows.iter().all(|s| s.episodes.len() == 1));
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_the_batch() {
        let sonarr = FakeSonarr::new(&[2]);
        let shows = vec![show(1, Some(1)), show(2, Some(2)), show(3, Some(3))];

        let outcome = fetch_episodes(&sonarr, shows, 10, &LogProgress::default()).await;

        assert_eq!(outcome.shows.len(), 3);
        assert!(outcome.shows[1].episodes.is_empty());
        assert_eq!(outcome.shows[2].episodes.len(), 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].series_id, Some(2));
        assert!(outcome.failures[0].error.contains("500"));
    }

    #[tokio::test]
    async fn test_shows_without_tvdb_are_not_dispatched() {
        let sonarr = FakeSonarr::new(&[]);
        let shows = vec![show(1, None), show(2, Some(2))];

        let outcome = fetch_episodes(&sonarr, shows, 10, &LogProgress::default()).await;

        assert_eq!(*sonarr.calls.lock().unwrap(), vec![2]);
        assert_eq!(outcome.shows.len(), 1);
        assert_eq!(
            outcome.skipped,
            vec![SkipNotice::new("sonarr", "Show 1", SkipReason::MissingTvdbId)]
        );
    }
}
