pub mod diff;
pub mod episodes;
pub mod executor;
pub mod reconcile;
pub mod report;

pub use diff::{
    compute_diff, missing_episodes, missing_movies, orphaned_movies, orphaned_shows, tracked_episode_keys,
    LibraryDiff,
};
pub use episodes::{fetch_episodes, EpisodeFetchOutcome, FetchProgress, LogProgress};
pub use executor::{addition_payload, removal_payload, MutationExecutor};
pub use reconcile::{ReconcileError, ReconcileOptions, Reconciler};
pub use report::{EpisodeFetchFailure, MutationOutcome, ReconcileReport, RunMode};
