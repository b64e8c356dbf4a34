use crate::diff::LibraryDiff;
use crate::report::{MutationOutcome, RunMode};
use reconcile_models::{AdditionPayload, EpisodeRef, MovieRef, RemovalPayload, ShowRef};
use reconcile_sources::{SourceError, SyncResponse, TrackingService};
use tracing::{error, info, warn};

/// Body for the removal call. Records without an ID never reach the diff output,
/// the `filter_map` only keeps the types honest.
pub fn removal_payload(diff: &LibraryDiff) -> RemovalPayload {
    RemovalPayload {
        movies: diff
            .orphaned_movies
            .iter()
            .filter_map(|movie| movie.tmdb_id.map(MovieRef::new))
            .collect(),
        shows: diff
            .orphaned_shows
            .iter()
            .filter_map(|show| show.tvdb_id.map(ShowRef::new))
            .collect(),
    }
}

pub fn addition_payload(diff: &LibraryDiff) -> AdditionPayload {
    AdditionPayload {
        movies: diff
            .missing_movies
            .iter()
            .filter_map(|movie| movie.tmdb_id.map(MovieRef::new))
            .collect(),
        episodes: diff.missing_episodes.iter().map(EpisodeRef::from).collect(),
    }
}

/// Applies a diff to the Trakt collection, or describes what it would do
pub struct MutationExecutor<'a> {
    tracker: &'a dyn TrackingService,
    mode: RunMode,
}

impl<'a> MutationExecutor<'a> {
    pub fn new(tracker: &'a dyn TrackingService, mode: RunMode) -> Self {
        Self { tracker, mode }
    }

    /// Returns the removal and addition outcomes. Failures are recorded, not returned.
    pub async fn execute(&self, diff: &LibraryDiff) -> (MutationOutcome, MutationOutcome) {
        let removal = removal_payload(diff);
        let addition = addition_payload(diff);

        if !self.mode.is_live() {
            info!(
                movies = removal.movies.len(),
                shows = removal.shows.len(),
                "[DRY RUN] Would remove {} movies and {} shows from the {} collection",
                removal.movies.len(),
                removal.shows.len(),
                self.tracker.service_name()
            );
            info!(
                movies = addition.movies.len(),
                episodes = addition.episodes.len(),
                "[DRY RUN] Would add {} movies and {} episodes to the {} collection",
                addition.movies.len(),
                addition.episodes.len(),
                self.tracker.service_name()
            );
            return (MutationOutcome::NotAttempted, MutationOutcome::NotAttempted);
        }

        let removal_outcome = if removal.is_empty() {
            info!("No orphaned movies or shows to remove");
            MutationOutcome::Skipped
        } else {
            info!(
                movies = removal.movies.len(),
                shows = removal.shows.len(),
                "Removing orphaned entries from {}",
                self.tracker.service_name()
            );
            outcome("removal", self.tracker.remove_from_collection(&removal).await)
        };

        // The addition call is always made in live mode, even with nothing to add
        info!(
            movies = addition.movies.len(),
            episodes = addition.episodes.len(),
            "Adding missing entries to {}",
            self.tracker.service_name()
        );
        let addition_outcome = outcome("addition", self.tracker.add_to_collection(&addition).await);

        (removal_outcome, addition_outcome)
    }
}

fn outcome(operation: &str, result: Result<SyncResponse, SourceError>) -> MutationOutcome {
    match result {
        Ok(response) => {
            info!(operation, "Collection {} succeeded", operation);
            if let Some(not_found) = response.not_found.as_ref() {
                if not_found_has_entries(not_found) {
                    warn!(operation, "Trakt did not recognise some entries: {}", not_found);
                }
            }
            MutationOutcome::Succeeded { response }
        }
        Err(e) => {
            error!(operation, status = e.status(), "Collection {} failed: {}", operation, e);
            MutationOutcome::Failed {
                http_status: e.status(),
                error: e.to_string(),
            }
        }
    }
}

fn not_found_has_entries(value: &serde_json::Value) -> bool {
    value
        .as_object()
        .map(|map| map.values().any(|v| v.as_array().is_some_and(|a| !a.is_empty())))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::compute_diff;
    use async_trait::async_trait;
    use reconcile_models::{
        EpisodeRecord, ImdbId, MissingEpisode, MovieRecord, ShowRecord, TmdbId, TvdbId,
    };
    use reconcile_sources::SyncCounts;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeTrakt {
        removals: Mutex<Vec<RemovalPayload>>,
        additions: Mutex<Vec<AdditionPayload>>,
        reject_additions: bool,
    }

    #[async_trait]
    impl TrackingService for FakeTrakt {
        fn service_name(&self) -> &str {
            "trakt"
        }

        async fn collected_movies(&self) -> Result<Vec<MovieRecord>, SourceError> {
            Ok(Vec::new())
        }

        async fn collected_shows(&self) -> Result<Vec<ShowRecord>, SourceError> {
            Ok(Vec::new())
        }

        async fn remove_from_collection(&self, payload: &RemovalPayload) -> Result<SyncResponse, SourceError> {
            self.removals.lock().unwrap().push(payload.clone());
            Ok(SyncResponse {
                deleted: Some(SyncCounts {
                    movies: payload.movies.len() as u32,
                    ..Default::default()
                }),
                ..Default::default()
            })
        }

        async fn add_to_collection(&self, payload: &AdditionPayload) -> Result<SyncResponse, SourceError> {
            self.additions.lock().unwrap().push(payload.clone());
            if self.reject_additions {
                return Err(SourceError::Status {
                    service: "trakt".to_string(),
                    url: "/sync/collection".to_string(),
                    status: 200,
                    body: "{}".to_string(),
                });
            }
            Ok(SyncResponse::default())
        }
    }

    fn movie(tmdb: u32, title: &str) -> MovieRecord {
        MovieRecord::new(Some(TmdbId(tmdb)), title, None)
    }

    fn diff_with_orphan_and_missing() -> LibraryDiff {
        let show = ShowRecord {
            series_id: Some(1),
            tvdb_id: Some(TvdbId(10)),
            imdb_id: ImdbId::parse(Some("tt1")),
            title: "Show".to_string(),
            year: None,
            episodes: vec![EpisodeRecord { season: 1, number: 1, has_file: true }],
        };
        compute_diff(&[movie(200, "B")], &[], &[movie(100, "A")], &[show])
    }

    #[test]
    fn test_payloads_from_diff() {
        let diff = diff_with_orphan_and_missing();

        assert_eq!(
            serde_json::to_value(removal_payload(&diff)).unwrap(),
            json!({"movies": [{"ids": {"tmdb": 200}}], "shows": []})
        );
        assert_eq!(
            serde_json::to_value(addition_payload(&diff)).unwrap(),
            json!({
                "movies": [{"ids": {"tmdb": 100}}],
                "episodes": [{"ids": {"imdb": "tt1"}, "season": 1, "number": 1}]
            })
        );
        assert_eq!(
            diff.missing_episodes,
            vec![MissingEpisode {
                imdb_id: ImdbId::parse(Some("tt1")).unwrap(),
                season: 1,
                episode: 1,
                title: "Show".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_dry_run_makes_no_calls() {
        let trakt = FakeTrakt::default();
        let executor = MutationExecutor::new(&trakt, RunMode::DryRun);

        let (removal, addition) = executor.execute(&diff_with_orphan_and_missing()).await;

        assert_eq!(removal, MutationOutcome::NotAttempted);
        assert_eq!(addition, MutationOutcome::NotAttempted);
        assert!(trakt.removals.lock().unwrap().is_empty());
        assert!(trakt.additions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_live_makes_one_call_each() {
        let trakt = FakeTrakt::default();
        let executor = MutationExecutor::new(&trakt, RunMode::Live);

        let (removal, addition) = executor.execute(&diff_with_orphan_and_missing()).await;

        assert!(matches!(removal, MutationOutcome::Succeeded { .. }));
        assert!(matches!(addition, MutationOutcome::Succeeded { .. }));
        assert_eq!(trakt.removals.lock().unwrap().len(), 1);
        assert_eq!(trakt.additions.lock().unwrap().len(), 1);
        assert_eq!(trakt.removals.lock().unwrap()[0].movies, vec![MovieRef::new(TmdbId(200))]);
    }

    #[tokio::test]
    async fn test_live_skips_empty_removal_but_still_adds() {
        let trakt = FakeTrakt::default();
        let executor = MutationExecutor::new(&trakt, RunMode::Live);

        let (removal, addition) = executor.execute(&LibraryDiff::default()).await;

        assert_eq!(removal, MutationOutcome::Skipped);
        assert!(matches!(addition, MutationOutcome::Succeeded { .. }));
        assert!(trakt.removals.lock().unwrap().is_empty());
        assert_eq!(trakt.additions.lock().unwrap().len(), 1);
        assert!(trakt.additions.lock().unwrap()[0].is_empty());
    }

    #[tokio::test]
    async fn test_failed_addition_is_recorded() {
        let trakt = FakeTrakt {
            reject_additions: true,
            ..Default::default()
        };
        let executor = MutationExecutor::new(&trakt, RunMode::Live);

        let (_, addition) = executor.execute(&diff_with_orphan_and_missing()).await;

        match addition {
            MutationOutcome::Failed { http_status, error } => {
                assert_eq!(http_status, Some(200));
                assert!(error.contains("/sync/collection"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(trakt.additions.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_not_found_detection() {
        assert!(!not_found_has_entries(&json!({"movies": [], "shows": []})));
        assert!(not_found_has_entries(&json!({"movies": [{"ids": {"tmdb": 1}}]})));
    }
}
