use crate::http::join_url;
use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

const REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";
const AUTHORIZE_URL: &str = "https://trakt.tv/oauth/authorize";

// Tokens are treated as expired two minutes early
const EXPIRY_MARGIN_SECS: i64 = 120;
// Upper bound on a server-supplied lifetime
const MAX_LIFETIME_DAYS: i64 = 365;

#[derive(Debug, Serialize, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: String,
    expires_in: u64,
}

#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl From<TokenResponse> for TokenInfo {
    fn from(token: TokenResponse) -> Self {
        let expires_at = expiry_from_lifetime(Utc::now(), token.expires_in);
        Self {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at,
        }
    }
}

fn expiry_from_lifetime(now: DateTime<Utc>, expires_in: u64) -> DateTime<Utc> {
    let max_lifetime = Duration::days(MAX_LIFETIME_DAYS);
    let lifetime = i64::try_from(expires_in)
        .ok()
        .and_then(|secs| Duration::try_seconds(secs.saturating_sub(EXPIRY_MARGIN_SECS)))
        .map_or(max_lifetime, |lifetime| lifetime.min(max_lifetime));
    now.checked_add_signed(lifetime).unwrap_or(now)
}

/// URL the user opens to obtain a one-time authorization code
pub fn authorize_url(client_id: &str) -> String {
    format!(
        "{}?response_type=code&client_id={}&redirect_uri={}",
        AUTHORIZE_URL,
        urlencoding::encode(client_id),
        urlencoding::encode(REDIRECT_URI)
    )
}

/// Exchange an authorization code for an access/refresh token pair
pub async fn exchange_code(
    client: &Client,
    api_url: &str,
    client_id: &str,
    client_secret: &str,
    code: &str,
) -> Result<TokenInfo> {
    let code = code.trim();
    if code.is_empty() {
        return Err(anyhow!("Authorization code cannot be empty"));
    }

    let payload = serde_json::json!({
        "code": code,
        "client_id": client_id,
        "client_secret": client_secret,
        "redirect_uri": REDIRECT_URI,
        "grant_type": "authorization_code"
    });

    request_token(client, api_url, &payload, "Failed to exchange authorization code").await
}

/// Trade a refresh token for a fresh access token
pub async fn refresh_access_token(
    client: &Client,
    api_url: &str,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<TokenInfo> {
    let payload = serde_json::json!({
        "refresh_token": refresh_token,
        "client_id": client_id,
        "client_secret": client_secret,
        "redirect_uri": REDIRECT_URI,
        "grant_type": "refresh_token"
    });

    request_token(client, api_url, &payload, "Token refresh failed").await
}

async fn request_token(
    client: &Client,
    api_url: &str,
    payload: &serde_json::Value,
    failure: &str,
) -> Result<TokenInfo> {
    let url = join_url(api_url, "oauth/token");
    debug!("Requesting Trakt token from {}", url);

    let response = client
        .post(&url)
        .json(payload)
        .header("Accept", "application/json")
        .header("Content-Type", "application/json")
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        return Err(anyhow!("{}: {} - {}", failure, status, error_text));
    }

    let token_response: TokenResponse = response.json().await?;
    Ok(token_response.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[test]
    fn test_authorize_url() {
        let url = authorize_url("abc123");
        assert!(url.starts_with("https://trakt.tv/oauth/authorize?response_type=code&client_id=abc123"));
        assert!(url.ends_with("redirect_uri=urn%3Aietf%3Awg%3Aoauth%3A2.0%3Aoob"));
    }

    #[test]
    fn test_expiry_applies_margin() {
        let now = Utc::now();
        assert_eq!(expiry_from_lifetime(now, 3600), now + Duration::seconds(3600 - EXPIRY_MARGIN_SECS));
        assert_eq!(expiry_from_lifetime(now, 0), now - Duration::seconds(EXPIRY_MARGIN_SECS));
    }

    #[test]
    fn test_oversized_lifetime_is_capped() {
        let now = Utc::now();
        let capped = now + Duration::days(MAX_LIFETIME_DAYS);
        assert_eq!(expiry_from_lifetime(now, u64::MAX / 2), capped);
        assert_eq!(expiry_from_lifetime(now, u64::MAX), capped);

        let token = TokenInfo::from(TokenResponse {
            access_token: "access".to_string(),
            refresh_token: String::new(),
            expires_in: u64::MAX / 2,
        });
        assert!(token.expires_at <= Utc::now() + Duration::days(MAX_LIFETIME_DAYS));
    }

    #[tokio::test]
    async fn test_exchange_code() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/oauth/token").json_body(json!({
                    "code": "the-code",
                    "client_id": "id",
                    "client_secret": "secret",
                    "redirect_uri": REDIRECT_URI,
                    "grant_type": "authorization_code"
                }));
                then.status(200).json_body(json!({
                    "access_token": "access",
                    "refresh_token": "refresh",
                    "expires_in": 7776000,
                    "token_type": "bearer"
                }));
            })
            .await;

        let before = Utc::now();
        let token = exchange_code(&Client::new(), &server.base_url(), "id", "secret", " the-code\n")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(token.access_token, "access");
        assert_eq!(token.refresh_token, "refresh");
        assert!(token.expires_at > before + Duration::days(89));
    }

    #[tokio::test]
    async fn test_exchange_rejects_empty_code() {
        let err = exchange_code(&Client::new(), "http://127.0.0.1:1", "id", "secret", "  ")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("cannot be empty"));
    }

    #[tokio::test]
    async fn test_refresh_failure_reports_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/oauth/token");
                then.status(401).body("invalid_grant");
            })
            .await;

        let err = refresh_access_token(&Client::new(), &server.base_url(), "id", "secret", "stale")
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Token refresh failed"));
        assert!(message.contains("invalid_grant"));
    }
}
