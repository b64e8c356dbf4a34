//! Canonical identifiers shared between Trakt and the local library managers.
//!
//! Radarr and Sonarr report `0` (or an empty string) when a record could not be
//! matched against the metadata providers. Those values are normalised to `None`
//! at the boundary so that "no identifier" is always an explicit `Option`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The Movie Database identifier. Movies are matched on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TmdbId(pub u32);

impl TmdbId {
    /// Normalise a raw wire value, treating `0` as absent
    pub fn from_raw(raw: Option<u32>) -> Option<Self> {
        raw.filter(|id| *id != 0).map(Self)
    }
}

impl fmt::Display for TmdbId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tmdb:{}", self.0)
    }
}

/// TheTVDB identifier. Shows and episode keys are matched on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TvdbId(pub u32);

impl TvdbId {
    /// Normalise a raw wire value, treating `0` as absent
    pub fn from_raw(raw: Option<u32>) -> Option<Self> {
        raw.filter(|id| *id != 0).map(Self)
    }
}

impl fmt::Display for TvdbId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tvdb:{}", self.0)
    }
}

/// IMDb identifier (`tt` prefixed). Only used to address episodes when adding
/// them to the Trakt collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImdbId(String);

impl ImdbId {
    /// Normalise a raw wire value. Trakt sometimes includes slashes in IMDb IDs;
    /// blank values are treated as absent.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let cleaned = raw?.trim().replace('/', "");
        if cleaned.is_empty() {
            None
        } else {
            Some(Self(cleaned))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImdbId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_ids_treat_zero_as_missing() {
        assert_eq!(TmdbId::from_raw(Some(0)), None);
        assert_eq!(TmdbId::from_raw(None), None);
        assert_eq!(TmdbId::from_raw(Some(603)), Some(TmdbId(603)));
        assert_eq!(TvdbId::from_raw(Some(0)), None);
        assert_eq!(TvdbId::from_raw(Some(81189)), Some(TvdbId(81189)));
    }

    #[test]
    fn test_imdb_id_parse() {
        assert_eq!(ImdbId::parse(Some("tt0903747")).unwrap().as_str(), "tt0903747");
        assert_eq!(ImdbId::parse(Some("/tt0903747/")).unwrap().as_str(), "tt0903747");
        assert_eq!(ImdbId::parse(Some("  ")), None);
        assert_eq!(ImdbId::parse(Some("")), None);
        assert_eq!(ImdbId::parse(None), None);
    }

    #[test]
    fn test_ids_serialize_as_plain_values() {
        assert_eq!(serde_json::to_string(&TmdbId(100)).unwrap(), "100");
        let imdb = ImdbId::parse(Some("tt1")).unwrap();
        assert_eq!(serde_json::to_string(&imdb).unwrap(), "\"tt1\"");
    }
}
