pub mod api;
pub mod auth;
pub mod client;

pub use api::{SyncCounts, SyncResponse};
pub use auth::{authorize_url, exchange_code, refresh_access_token, TokenInfo};
pub use client::TraktClient;
