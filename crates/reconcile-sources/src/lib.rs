pub mod error;
pub mod http;
pub mod radarr;
pub mod retry;
pub mod sonarr;
pub mod traits;
pub mod trakt;

pub use error::SourceError;
pub use http::build_http_client;
pub use radarr::RadarrClient;
pub use retry::RetryPolicy;
pub use sonarr::SonarrClient;
pub use traits::{MovieLibrary, ShowLibrary, TrackingService};
pub use trakt::{SyncCounts, SyncResponse, TraktClient};
