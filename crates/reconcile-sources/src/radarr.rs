use crate::http::join_url;
use crate::retry::{fetch_json_with_retry, RetryPolicy};
use crate::{MovieLibrary, SourceError};
use async_trait::async_trait;
use reconcile_models::{MovieRecord, TmdbId};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tracing::info;

const SERVICE: &str = "radarr";

/// Entry of Radarr's `GET /movie`. Only the fields matching needs.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RadarrMovie {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    year: Option<u32>,
    #[serde(default)]
    tmdb_id: Option<u32>,
}

impl From<RadarrMovie> for MovieRecord {
    fn from(movie: RadarrMovie) -> Self {
        MovieRecord {
            tmdb_id: TmdbId::from_raw(movie.tmdb_id),
            title: movie
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Unknown Title".to_string()),
            // Radarr reports 0 for an unknown year
            year: movie.year.filter(|y| *y != 0),
        }
    }
}

#[derive(Clone)]
pub struct RadarrClient {
    client: Client,
    base_url: String,
    api_key: String,
    retry: RetryPolicy,
}

impl RadarrClient {
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
impl MovieLibrary for RadarrClient {
    fn service_name(&self) -> &str {
        SERVICE
    }

    async fn movies(&self) -> Result<Vec<MovieRecord>, SourceError> {
        let url = join_url(&self.base_url, "movie");
        let movies: Vec<RadarrMovie> = fetch_json_with_retry(SERVICE, &url, &self.retry, || self.get(&url)).await?;
        info!(count = movies.len(), "Fetched Radarr movies");
        Ok(movies.into_iter().map(MovieRecord::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test]
    async fn test_movies_uses_api_key_and_normalises_ids() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v3/movie").header("x-api-key", "radarr-key");
                then.status(200).json_body(json!([
                    {"id": 1, "title": "A", "year": 2000, "tmdbId": 100, "hasFile": true},
                    {"id": 2, "title": "Unmatched", "year": 0, "tmdbId": 0, "hasFile": false}
                ]));
            })
            .await;

        let radarr = RadarrClient::new(
            Client::new(),
            server.url("/api/v3"),
            "radarr-key",
            RetryPolicy::new(1, Duration::ZERO),
        );
        let movies = radarr.movies().await.unwrap();

        mock.assert_async().await;
        assert_eq!(movies[0], MovieRecord::new(Some(TmdbId(100)), "A", Some(2000)));
        assert_eq!(movies[1].tmdb_id, None);
        assert_eq!(movies[1].year, None);
    }

    #[tokio::test]
    async fn test_movies_server_error_is_retried() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/movie");
                then.status(500);
            })
            .await;

        let radarr = RadarrClient::new(Client::new(), server.base_url(), "k", RetryPolicy::new(3, Duration::ZERO));
        let err = radarr.movies().await.unwrap_err();

        mock.assert_calls_async(3).await;
        assert_eq!(err.status(), Some(500));
    }
}
