use crate::http::join_url;
use crate::retry::{fetch_json_with_retry, RetryPolicy};
use crate::trakt::api::{CollectedMovie, CollectedShow, SyncResponse};
use crate::{SourceError, TrackingService};
use async_trait::async_trait;
use reconcile_models::{AdditionPayload, MovieRecord, RemovalPayload, ShowRecord};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use tracing::{debug, info};

const SERVICE: &str = "trakt";

#[derive(Clone)]
pub struct TraktClient {
    client: Client,
    base_url: String,
    client_id: String,
    access_token: String,
    encoded_username: String,
    retry: RetryPolicy,
}

impl TraktClient {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        access_token: impl Into<String>,
        username: &str,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            client_id: client_id.into(),
            access_token: access_token.into(),
            encoded_username: urlencoding::encode(username).to_string(),
            retry,
        }
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .header("trakt-api-version", "2")
            .header("trakt-api-key", &self.client_id)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
    }

    fn collection_url(&self, kind: &str) -> String {
        join_url(
            &self.base_url,
            &format!("users/{}/collection/{}", self.encoded_username, kind),
        )
    }

    /// POST a sync payload once. `accept` decides which statuses count as success.
    async fn post_sync<P>(&self, path: &str, payload: &P, accept: fn(StatusCode) -> bool) -> Result<SyncResponse, SourceError>
    where
        P: Serialize + ?Sized,
    {
        let url = join_url(&self.base_url, path);
        let response = self
            .request(Method::POST, &url)
            .json(payload)
            .send()
            .await
            .map_err(|source| SourceError::Request {
                service: SERVICE.to_string(),
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !accept(status) {
            return Err(SourceError::Status {
                service: SERVICE.to_string(),
                url,
                status: status.as_u16(),
                body,
            });
        }

        // The call already succeeded; an odd body only costs us the counters
        let summary = serde_json::from_str(&body).unwrap_or_else(|e| {
            debug!("Trakt {} response body not understood: {}", path, e);
            SyncResponse::default()
        });
        Ok(summary)
    }
}

#[async_trait]
impl TrackingService for TraktClient {
    fn service_name(&self) -> &str {
        SERVICE
    }

    async fn collected_movies(&self) -> Result<Vec<MovieRecord>, SourceError> {
        let url = self.collection_url("movies");
        let items: Vec<CollectedMovie> =
            fetch_json_with_retry(SERVICE, &url, &self.retry, || self.request(Method::GET, &url)).await?;
        info!(count = items.len(), "Fetched Trakt movie collection");
        Ok(items.into_iter().map(MovieRecord::from).collect())
    }

    async fn collected_shows(&self) -> Result<Vec<ShowRecord>, SourceError> {
        let url = self.collection_url("shows");
        let items: Vec<CollectedShow> =
            fetch_json_with_retry(SERVICE, &url, &self.retry, || self.request(Method::GET, &url)).await?;
        info!(count = items.len(), "Fetched Trakt show collection");
        Ok(items.into_iter().map(ShowRecord::from).collect())
    }

    async fn remove_from_collection(&self, payload: &RemovalPayload) -> Result<SyncResponse, SourceError> {
        self.post_sync("sync/collection/remove", payload, |status| status.is_success())
            .await
    }

    async fn add_to_collection(&self, payload: &AdditionPayload) -> Result<SyncResponse, SourceError> {
        // Trakt answers 201 Created when the additions were accepted
        self.post_sync("sync/collection", payload, |status| status == StatusCode::CREATED)
            .await
    }
}
