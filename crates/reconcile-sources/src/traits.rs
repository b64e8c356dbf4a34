use crate::{SourceError, SyncResponse};
use async_trait::async_trait;
use reconcile_models::{AdditionPayload, EpisodeRecord, MovieRecord, RemovalPayload, ShowRecord};

/// The media-tracking service whose collection is being reconciled
#[async_trait]
pub trait TrackingService: Send + Sync {
    fn service_name(&self) -> &str;

    // Data retrieval
    async fn collected_movies(&self) -> Result<Vec<MovieRecord>, SourceError>;
    async fn collected_shows(&self) -> Result<Vec<ShowRecord>, SourceError>;

    // Data modification. Each call is a single request; no retry.
    async fn remove_from_collection(&self, payload: &RemovalPayload) -> Result<SyncResponse, SourceError>;
    async fn add_to_collection(&self, payload: &AdditionPayload) -> Result<SyncResponse, SourceError>;
}

/// Local movie library manager (ground truth for movies)
#[async_trait]
pub trait MovieLibrary: Send + Sync {
    fn service_name(&self) -> &str;

    async fn movies(&self) -> Result<Vec<MovieRecord>, SourceError>;
}

/// Local show library manager (ground truth for shows and episodes)
#[async_trait]
pub trait ShowLibrary: Send + Sync {
    fn service_name(&self) -> &str;

    /// Series list without episodes
    async fn series(&self) -> Result<Vec<ShowRecord>, SourceError>;

    /// Episode list for one series, addressed by the library's internal id
    async fn episodes(&self, series_id: u64) -> Result<Vec<EpisodeRecord>, SourceError>;
}
