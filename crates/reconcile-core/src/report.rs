use chrono::{DateTime, Utc};
use reconcile_models::{MissingEpisode, MovieRecord, ShowRecord, SkipNotice};
use reconcile_sources::SyncResponse;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Compute and report only
    DryRun,
    /// Apply removals and additions to Trakt
    Live,
}

impl RunMode {
    pub fn from_live_flag(live: bool) -> Self {
        if live {
            RunMode::Live
        } else {
            RunMode::DryRun
        }
    }

    pub fn is_live(self) -> bool {
        self == RunMode::Live
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::DryRun => f.write_str("dry-run"),
            RunMode::Live => f.write_str("live"),
        }
    }
}

/// Result of one collection mutation call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MutationOutcome {
    /// Dry-run; the call would have been made
    NotAttempted,
    /// Nothing to send
    Skipped,
    Succeeded { response: SyncResponse },
    Failed { http_status: Option<u16>, error: String },
}

impl MutationOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, MutationOutcome::Failed { .. })
    }
}

/// A show whose episode list could not be retrieved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EpisodeFetchFailure {
    pub title: String,
    pub series_id: Option<u64>,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    pub mode: RunMode,
    pub started_at: DateTime<Utc>,
    pub elapsed_secs: f64,
    pub orphaned_movies: Vec<MovieRecord>,
    pub orphaned_shows: Vec<ShowRecord>,
    pub missing_movies: Vec<MovieRecord>,
    pub missing_episodes: Vec<MissingEpisode>,
    pub skipped: Vec<SkipNotice>,
    pub episode_failures: Vec<EpisodeFetchFailure>,
    /// The Sonarr series list could not be fetched and was treated as empty
    pub shows_degraded: bool,
    pub removal: MutationOutcome,
    pub addition: MutationOutcome,
}

impl ReconcileReport {
    pub fn is_in_sync(&self) -> bool {
        self.orphaned_movies.is_empty()
            && self.orphaned_shows.is_empty()
            && self.missing_movies.is_empty()
            && self.missing_episodes.is_empty()
    }

    pub fn has_mutation_failures(&self) -> bool {
        self.removal.is_failure() || self.addition.is_failure()
    }
}
