use crate::SourceError;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

const USER_AGENT: &str = concat!("trakt-reconcile/", env!("CARGO_PKG_VERSION"));

/// Shared reqwest client for all three services. `timeout` of `None` leaves
/// requests unbounded.
pub fn build_http_client(timeout: Option<Duration>) -> Result<Client, SourceError> {
    let mut builder = Client::builder().user_agent(USER_AGENT);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(SourceError::Client)
}

/// Join a configured base URL and an endpoint path without doubling slashes
pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Send a request and decode a JSON body, mapping non-2xx statuses to errors
pub(crate) async fn send_json<T>(service: &str, url: &str, request: RequestBuilder) -> Result<T, SourceError>
where
    T: DeserializeOwned,
{
    let response = request.send().await.map_err(|source| SourceError::Request {
        service: service.to_string(),
        url: url.to_string(),
        source,
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(SourceError::Status {
            service: service.to_string(),
            url: url.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    let bytes = response.bytes().await.map_err(|source| SourceError::Request {
        service: service.to_string(),
        url: url.to_string(),
        source,
    })?;

    serde_json::from_slice(&bytes).map_err(|source| SourceError::Decode {
        service: service.to_string(),
        url: url.to_string(),
        source,
    })
}
