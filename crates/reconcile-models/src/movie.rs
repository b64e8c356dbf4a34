use crate::TmdbId;
use serde::{Deserialize, Serialize};

/// A movie as seen by either Trakt (collection entry) or Radarr (library entry)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MovieRecord {
    pub tmdb_id: Option<TmdbId>,
    pub title: String,
    pub year: Option<u32>,
}

impl MovieRecord {
    pub fn new(tmdb_id: Option<TmdbId>, title: impl Into<String>, year: Option<u32>) -> Self {
        Self {
            tmdb_id,
            title: title.into(),
            year,
        }
    }

    /// "Title (Year)" for log lines and reports
    pub fn display_title(&self) -> String {
        match self.year {
            Some(year) => format!("{} ({})", self.title, year),
            None => self.title.clone(),
        }
    }
}
