use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a record was left out of matching
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingTmdbId,
    MissingTvdbId,
    MissingImdbId,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::MissingTmdbId => "missing TMDB ID",
            SkipReason::MissingTvdbId => "missing TVDB ID",
            SkipReason::MissingImdbId => "missing IMDb ID",
        };
        f.write_str(text)
    }
}

/// A record excluded from reconciliation. Not an error; surfaced for visibility.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkipNotice {
    /// Which dataset the record came from ("trakt", "radarr", "sonarr")
    pub source: String,
    pub title: String,
    pub reason: SkipReason,
}

impl SkipNotice {
    pub fn new(source: &str, title: impl Into<String>, reason: SkipReason) -> Self {
        Self {
            source: source.to_string(),
            title: title.into(),
            reason,
        }
    }
}
