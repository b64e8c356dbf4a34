// Set differences between the Trakt collection and the local libraries.
//
// Every function takes the dataset it iterates as the first argument and keeps
// that dataset's order. Records that lack the identifier a comparison needs are
// reported as skip notices for the side being iterated, so each skipped record
// is reported exactly once.

use reconcile_models::{
    EpisodeKey, MissingEpisode, MovieRecord, ShowRecord, SkipNotice, SkipReason, TmdbId, TvdbId,
};
use std::collections::HashSet;
use tracing::debug;

const TRAKT: &str = "trakt";
const RADARR: &str = "radarr";
const SONARR: &str = "sonarr";

/// Everything the mutation step needs, plus the records left out of matching
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LibraryDiff {
    pub orphaned_movies: Vec<MovieRecord>,
    pub orphaned_shows: Vec<ShowRecord>,
    pub missing_movies: Vec<MovieRecord>,
    pub missing_episodes: Vec<MissingEpisode>,
    pub skipped: Vec<SkipNotice>,
}

fn movie_ids(movies: &[MovieRecord]) -> HashSet<TmdbId> {
    movies.iter().filter_map(|movie| movie.tmdb_id).collect()
}

fn show_ids(shows: &[ShowRecord]) -> HashSet<TvdbId> {
    shows.iter().filter_map(|show| show.tvdb_id).collect()
}

/// Tracked movies whose TMDB ID is not held by the movie library
pub fn orphaned_movies(tracked: &[MovieRecord], local: &[MovieRecord], skipped: &mut Vec<SkipNotice>) -> Vec<MovieRecord> {
    let local_ids = movie_ids(local);
    let mut orphans = Vec::new();

    for movie in tracked {
        match movie.tmdb_id {
            None => skipped.push(SkipNotice::new(TRAKT, movie.display_title(), SkipReason::MissingTmdbId)),
            Some(id) if !local_ids.contains(&id) => orphans.push(movie.clone()),
            Some(_) => {}
        }
    }

    debug!(
        "orphaned_movies: tracked_count={}, local_unique_ids={}, result_count={}",
        tracked.len(),
        local_ids.len(),
        orphans.len()
    );
    orphans
}

/// Local movies whose TMDB ID is not in the Trakt collection
pub fn missing_movies(local: &[MovieRecord], tracked: &[MovieRecord], skipped: &mut Vec<SkipNotice>) -> Vec<MovieRecord> {
    let tracked_ids = movie_ids(tracked);
    let mut missing = Vec::new();

    for movie in local {
        match movie.tmdb_id {
            None => skipped.push(SkipNotice::new(RADARR, movie.display_title(), SkipReason::MissingTmdbId)),
            Some(id) if !tracked_ids.contains(&id) => missing.push(movie.clone()),
            Some(_) => {}
        }
    }

    debug!(
        "missing_movies: local_count={}, tracked_unique_ids={}, result_count={}",
        local.len(),
        tracked_ids.len(),
        missing.len()
    );
    missing
}

/// Tracked shows whose TVDB ID is not held by the show library
pub fn orphaned_shows(tracked: &[ShowRecord], local: &[ShowRecord], skipped: &mut Vec<SkipNotice>) -> Vec<ShowRecord> {
    let local_ids = show_ids(local);
    let mut orphans = Vec::new();

    for show in tracked {
        match show.tvdb_id {
            None => skipped.push(SkipNotice::new(TRAKT, show.display_title(), SkipReason::MissingTvdbId)),
            Some(id) if !local_ids.contains(&id) => orphans.push(show.clone()),
            Some(_) => {}
        }
    }

    debug!(
        "orphaned_shows: tracked_count={}, local_unique_ids={}, result_count={}",
        tracked.len(),
        local_ids.len(),
        orphans.len()
    );
    orphans
}

/// Flatten Trakt's show -> season -> episode nesting into lookup keys.
/// Shows without a TVDB ID contribute nothing.
pub fn tracked_episode_keys(tracked: &[ShowRecord]) -> HashSet<EpisodeKey> {
    tracked
        .iter()
        .filter_map(|show| show.tvdb_id.map(|tvdb| (tvdb, show)))
        .flat_map(|(tvdb, show)| {
            show.episodes
                .iter()
                .map(move |episode| EpisodeKey::new(tvdb, episode.season, episode.number))
        })
        .collect()
}

/// Held local episodes that are not in the Trakt collection.
///
/// Episodes are added to Trakt through the show's IMDb ID, so shows without one
/// are reported as skipped. Shows without a TVDB ID never had their episodes
/// fetched and were reported by the episode fetcher.
pub fn missing_episodes(
    local: &[ShowRecord],
    tracked_keys: &HashSet<EpisodeKey>,
    skipped: &mut Vec<SkipNotice>,
) -> Vec<MissingEpisode> {
    let mut missing = Vec::new();
    let mut held = 0usize;

    for show in local {
        let Some(tvdb) = show.tvdb_id else {
            continue;
        };

        let Some(imdb) = show.imdb_id.as_ref() else {
            skipped.push(SkipNotice::new(SONARR, show.display_title(), SkipReason::MissingImdbId));
            continue;
        };

        for episode in show.held_episodes() {
            held += 1;
            if !tracked_keys.contains(&EpisodeKey::new(tvdb, episode.season, episode.number)) {
                missing.push(MissingEpisode {
                    imdb_id: imdb.clone(),
                    season: episode.season,
                    episode: episode.number,
                    title: show.title.clone(),
                });
            }
        }
    }

    debug!(
        "missing_episodes: show_count={}, held_episodes={}, tracked_keys={}, result_count={}",
        local.len(),
        held,
        tracked_keys.len(),
        missing.len()
    );
    missing
}

/// Run every comparison. `local_shows` must already carry their episode lists.
pub fn compute_diff(
    tracked_movies: &[MovieRecord],
    tracked_shows: &[ShowRecord],
    local_movies: &[MovieRecord],
    local_shows: &[ShowRecord],
) -> LibraryDiff {
    let mut skipped = Vec::new();

    let orphaned_movies = orphaned_movies(tracked_movies, local_movies, &mut skipped);
    let missing_movies = missing_movies(local_movies, tracked_movies, &mut skipped);
    let orphaned_shows = orphaned_shows(tracked_shows, local_shows, &mut skipped);
    let tracked_keys = tracked_episode_keys(tracked_shows);
    let missing_episodes = missing_episodes(local_shows, &tracked_keys, &mut skipped);

    LibraryDiff {
        orphaned_movies,
        orphaned_shows,
        missing_movies,
        missing_episodes,
        skipped,
    }
}
