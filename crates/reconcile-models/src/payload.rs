// Request bodies for Trakt's collection endpoints.
//
// Movies are addressed by TMDB ID, shows by TVDB ID and episodes by the show's
// IMDb ID plus season/number.

use crate::{ImdbId, MissingEpisode, TmdbId, TvdbId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MovieRefIds {
    pub tmdb: TmdbId,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MovieRef {
    pub ids: MovieRefIds,
}

impl MovieRef {
    pub fn new(tmdb: TmdbId) -> Self {
        Self {
            ids: MovieRefIds { tmdb },
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShowRefIds {
    pub tvdb: TvdbId,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShowRef {
    pub ids: ShowRefIds,
}

impl ShowRef {
    pub fn new(tvdb: TvdbId) -> Self {
        Self {
            ids: ShowRefIds { tvdb },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EpisodeRefIds {
    pub imdb: ImdbId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EpisodeRef {
    pub ids: EpisodeRefIds,
    pub season: u32,
    pub number: u32,
}

impl From<&MissingEpisode> for EpisodeRef {
    fn from(episode: &MissingEpisode) -> Self {
        Self {
            ids: EpisodeRefIds {
                imdb: episode.imdb_id.clone(),
            },
            season: episode.season,
            number: episode.episode,
        }
    }
}

/// Body of `POST /sync/collection/remove`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemovalPayload {
    pub movies: Vec<MovieRef>,
    pub shows: Vec<ShowRef>,
}

impl RemovalPayload {
    pub fn is_empty(&self) -> bool {
        self.movies.is_empty() && self.shows.is_empty()
    }
}

/// Body of `POST /sync/collection`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdditionPayload {
    pub movies: Vec<MovieRef>,
    pub episodes: Vec<EpisodeRef>,
}

impl AdditionPayload {
    pub fn is_empty(&self) -> bool {
        self.movies.is_empty() && self.episodes.is_empty()
    }
}
