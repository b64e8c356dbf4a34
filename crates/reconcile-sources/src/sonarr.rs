use crate::http::join_url;
use crate::retry::{fetch_json_with_retry, RetryPolicy};
use crate::{ShowLibrary, SourceError};
use async_trait::async_trait;
use reconcile_models::{EpisodeRecord, ImdbId, ShowRecord, TvdbId};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tracing::{debug, info};

const SERVICE: &str = "sonarr";

/// Entry of Sonarr's `GET /series`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SonarrSeries {
    id: u64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    year: Option<u32>,
    #[serde(default)]
    tvdb_id: Option<u32>,
    #[serde(default)]
    imdb_id: Option<String>,
}

impl From<SonarrSeries> for ShowRecord {
    fn from(series: SonarrSeries) -> Self {
        ShowRecord {
            series_id: Some(series.id),
            tvdb_id: TvdbId::from_raw(series.tvdb_id),
            imdb_id: ImdbId::parse(series.imdb_id.as_deref()),
            title: series
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Unknown Title".to_string()),
            year: series.year.filter(|y| *y != 0),
            episodes: Vec::new(),
        }
    }
}

/// Entry of Sonarr's `GET /episode?seriesId=`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SonarrEpisode {
    season_number: u32,
    episode_number: u32,
    #[serde(default)]
    has_file: bool,
}

impl From<SonarrEpisode> for EpisodeRecord {
    fn from(episode: SonarrEpisode) -> Self {
        EpisodeRecord {
            season: episode.season_number,
            number: episode.episode_number,
            has_file: episode.has_file,
        }
    }
}

#[derive(Clone)]
pub struct SonarrClient {
    client: Client,
    base_url: String,
    api_key: String,
    retry: RetryPolicy,
}

impl SonarrClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            retry,
        }
    }

    fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url).header("X-Api-Key", &self.api_key)
    }
}

#[async_trait]
impl ShowLibrary for SonarrClient {
    fn service_name(&self) -> &str {
        SERVICE
    }

    async fn series(&self) -> Result<Vec<ShowRecord>, SourceError> {
        let url = join_url(&self.base_url, "series");
        let series: Vec<SonarrSeries> = fetch_json_with_retry(SERVICE, &url, &self.retry, || self.get(&url)).await?;
        info!(count = series.len(), "Fetched Sonarr series");
        Ok(series.into_iter().map(ShowRecord::from).collect())
    }

    async fn episodes(&self, series_id: u64) -> Result<Vec<EpisodeRecord>, SourceError> {
        let url = join_url(&self.base_url, &format!("episode?seriesId={}", series_id));
        let episodes: Vec<SonarrEpisode> = fetch_json_with_retry(SERVICE, &url, &self.retry, || self.get(&url)).await?;
        debug!(series_id, count = episodes.len(), "Fetched Sonarr episodes");
        Ok(episodes.into_iter().map(EpisodeRecord::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;

    fn client_for(server: &MockServer) -> SonarrClient {
        SonarrClient::new(Client::new(), server.base_url(), "sonarr-key", RetryPolicy::new(2, Duration::ZERO))
    }

    #[tokio::test]
    async fn test_series_conversion() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/series").header("x-api-key", "sonarr-key");
                then.status(200).json_body(json!([
                    {"id": 7, "title": "Breaking Bad", "year": 2008, "tvdbId": 81189, "imdbId": "tt0903747"},
                    {"id": 8, "title": "Obscure", "year": 2020, "tvdbId": 0, "imdbId": ""}
                ]));
            })
            .await;

        let series = client_for(&server).series().await.unwrap();

        mock.assert_async().await;
        assert_eq!(series[0].series_id, Some(7));
        assert_eq!(series[0].tvdb_id, Some(TvdbId(81189)));
        assert_eq!(series[0].imdb_id.as_ref().map(|id| id.as_str()), Some("tt0903747"));
        assert!(series[0].episodes.is_empty());
        assert_eq!(series[1].tvdb_id, None);
        assert_eq!(series[1].imdb_id, None);
    }

    #[tokio::test]
    async fn test_episodes_query_by_series_id() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/episode").query_param("seriesId", "7");
                then.status(200).json_body(json!([
                    {"id": 1, "seasonNumber": 1, "episodeNumber": 1, "hasFile": true},
                    {"id": 2, "seasonNumber": 1, "episodeNumber": 2, "hasFile": false},
                    {"id": 3, "seasonNumber": 0, "episodeNumber": 1}
                ]));
            })
            .await;

        let episodes = client_for(&server).episodes(7).await.unwrap();

        mock.assert_async().await;
        assert_eq!(
            episodes,
            vec![
                EpisodeRecord { season: 1, number: 1, has_file: true },
                EpisodeRecord { season: 1, number: 2, has_file: false },
                EpisodeRecord { season: 0, number: 1, has_file: false },
            ]
        );
    }

    #[tokio::test]
    async fn test_episodes_failure_after_retries() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/episode");
                then.status(404).body("series not found");
            })
            .await;

        let err = client_for(&server).episodes(99).await.unwrap_err();

        mock.assert_calls_async(2).await;
        assert_eq!(err.status(), Some(404));
    }
}
