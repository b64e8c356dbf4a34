use reconcile_models::{EpisodeRecord, ImdbId, MovieRecord, ShowRecord, TmdbId, TvdbId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraktIds {
    pub trakt: Option<u64>,
    pub slug: Option<String>,
    pub imdb: Option<String>,
    pub tmdb: Option<u32>,
    pub tvdb: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TraktMovie {
    title: Option<String>,
    year: Option<u32>,
    #[serde(default)]
    ids: TraktIds,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TraktShow {
    title: Option<String>,
    year: Option<u32>,
    #[serde(default)]
    ids: TraktIds,
}

/// Entry of `GET /users/{user}/collection/movies`
#[derive(Debug, Deserialize)]
pub(crate) struct CollectedMovie {
    movie: TraktMovie,
}

/// Entry of `GET /users/{user}/collection/shows`
#[derive(Debug, Deserialize)]
pub(crate) struct CollectedShow {
    show: TraktShow,
    #[serde(default)]
    seasons: Vec<CollectedSeason>,
}

#[derive(Debug, Deserialize)]
struct CollectedSeason {
    number: u32,
    #[serde(default)]
    episodes: Vec<CollectedEpisode>,
}

#[derive(Debug, Deserialize)]
struct CollectedEpisode {
    number: u32,
}

fn title_or_unknown(title: Option<String>) -> String {
    title.filter(|t| !t.is_empty()).unwrap_or_else(|| "Unknown Title".to_string())
}

impl From<CollectedMovie> for MovieRecord {
    fn from(item: CollectedMovie) -> Self {
        MovieRecord {
            tmdb_id: TmdbId::from_raw(item.movie.ids.tmdb),
            title: title_or_unknown(item.movie.title),
            year: item.movie.year,
        }
    }
}

impl From<CollectedShow> for ShowRecord {
    fn from(item: CollectedShow) -> Self {
        // Collection entries are held by definition
        let episodes = item
            .seasons
            .iter()
            .flat_map(|season| {
                season.episodes.iter().map(move |episode| EpisodeRecord {
                    season: season.number,
                    number: episode.number,
                    has_file: true,
                })
            })
            .collect();

        ShowRecord {
            series_id: None,
            tvdb_id: TvdbId::from_raw(item.show.ids.tvdb),
            imdb_id: ImdbId::parse(item.show.ids.imdb.as_deref()),
            title: title_or_unknown(item.show.title),
            year: item.show.year,
            episodes,
        }
    }
}

/// Per-type counters in a `/sync/collection` response
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncCounts {
    #[serde(default)]
    pub movies: u32,
    #[serde(default)]
    pub shows: u32,
    #[serde(default)]
    pub seasons: u32,
    #[serde(default)]
    pub episodes: u32,
}

/// Body of a `/sync/collection` or `/sync/collection/remove` response
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SyncResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added: Option<SyncCounts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<SyncCounts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing: Option<SyncCounts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<SyncCounts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_found: Option<serde_json::Value>,
}
