use crate::{ImdbId, TvdbId};
use serde::{Deserialize, Serialize};

/// A single episode. For Sonarr records `has_file` reflects whether the episode
/// is on disk; Trakt collection entries are held by definition and always set it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct EpisodeRecord {
    pub season: u32,
    pub number: u32,
    pub has_file: bool,
}

/// A show as seen by either Trakt or Sonarr
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShowRecord {
    /// Sonarr's internal series id, needed to request the episode list.
    /// `None` for Trakt records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_id: Option<u64>,
    pub tvdb_id: Option<TvdbId>,
    pub imdb_id: Option<ImdbId>,
    pub title: String,
    pub year: Option<u32>,
    #[serde(default)]
    pub episodes: Vec<EpisodeRecord>,
}

impl ShowRecord {
    pub fn display_title(&self) -> String {
        match self.year {
            Some(year) => format!("{} ({})", self.title, year),
            None => self.title.clone(),
        }
    }

    /// Episodes eligible for sync (file present)
    pub fn held_episodes(&self) -> impl Iterator<Item = &EpisodeRecord> {
        self.episodes.iter().filter(|ep| ep.has_file)
    }
}

/// Composite key used to test whether an episode is already in the Trakt collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EpisodeKey {
    pub tvdb_id: TvdbId,
    pub season: u32,
    pub number: u32,
}

impl EpisodeKey {
    pub fn new(tvdb_id: TvdbId, season: u32, number: u32) -> Self {
        Self {
            tvdb_id,
            season,
            number,
        }
    }
}

/// A locally held episode that Trakt does not have in its collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MissingEpisode {
    pub imdb_id: ImdbId,
    pub season: u32,
    pub episode: u32,
    /// Show title, kept for reporting
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_held_episodes_filters_missing_files() {
        let show = ShowRecord {
            series_id: Some(1),
            tvdb_id: Some(TvdbId(10)),
            imdb_id: None,
            title: "Show".to_string(),
            year: None,
            episodes: vec![
                EpisodeRecord { season: 1, number: 1, has_file: true },
                EpisodeRecord { season: 1, number: 2, has_file: false },
            ],
        };

        let held: Vec<_> = show.held_episodes().collect();
        assert_eq!(held.len(), 1);
        assert_eq!(held[0].number, 1);
    }
}
