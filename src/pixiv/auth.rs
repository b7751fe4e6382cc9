//! OAuth access token lifecycle.
//!
//! pixiv access tokens live for an hour. The manager hands out the cached
//! token while it is younger than [`TOKEN_REFRESH_THRESHOLD_SECS`] and trades
//! the long-lived refresh token for a new one otherwise.

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::RwLock;

use super::api::TokenResponse;
use super::PixivError;
use crate::utils::HttpClient;

/// Base URL of the pixiv OAuth server
pub const OAUTH_BASE_URL: &str = "https://oauth.secure.pixiv.net";

/// Tokens older than this are refreshed before use (five minutes of slack)
pub const TOKEN_REFRESH_THRESHOLD_SECS: i64 = 3300;

/// Expired token the manager starts with
const PLACEHOLDER_TOKEN: &str = "s3O-uH_Zkj2wyXP7d8QD0_QR2-GxTmMKEpa_XOCUI9o";

// The token endpoint only accepts requests that look like the Android app.
const APP_OS: &str = "Android";
const APP_OS_VERSION: &str = "14.0";
const APP_VERSION: &str = "6.140.1";
const APP_USER_AGENT: &str = "PixivAndroidApp/6.140.1 (Android 14.0; Pixel 8)";

/// Client credentials and the long-lived refresh token
#[derive(Debug, Clone)]
pub struct PixivCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl PixivCredentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

/// The current access token and when it was issued
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub access_token: String,
    /// `None` until the first successful refresh
    pub issued_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// Expired placeholder used at startup
    pub fn expired() -> Self {
        Self {
            access_token: PLACEHOLDER_TOKEN.to_string(),
            issued_at: None,
        }
    }

    /// Whether the token may still be used at `now`
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        let threshold = TimeDelta::seconds(TOKEN_REFRESH_THRESHOLD_SECS);
        !self.access_token.is_empty()
            && self.issued_at.is_some_and(|issued| now - issued < threshold)
    }
}

/// Owns the process-wide access token.
///
/// Concurrent callers that all find the token stale each refresh on their
/// own; the lock only guards reading and replacing the stored credential.
#[derive(Debug)]
pub struct CredentialManager {
    http: HttpClient,
    oauth_base: String,
    credentials: PixivCredentials,
    state: RwLock<Credential>,
}

impl CredentialManager {
    /// Create a manager talking to the public OAuth server
    pub fn new(http: HttpClient, credentials: PixivCredentials) -> Self {
        Self::with_base_url(http, credentials, OAUTH_BASE_URL)
    }

    /// Create a manager talking to a custom OAuth server (for testing)
    pub fn with_base_url(
        http: HttpClient,
        credentials: PixivCredentials,
        oauth_base: impl Into<String>,
    ) -> Self {
        Self {
            http,
            oauth_base: oauth_base.into().trim_end_matches('/').to_string(),
            credentials,
            state: RwLock::new(Credential::expired()),
        }
    }

    /// Snapshot of the stored credential
    pub async fn current(&self) -> Credential {
        self.state.read().await.clone()
    }

    /// Return a usable access token, refreshing it first if needed
    pub async fn valid_token(&self) -> Result<String, PixivError> {
        self.valid_token_at(Utc::now()).await
    }

    /// Same as [`valid_token`](Self::valid_token) with an explicit clock
    pub async fn valid_token_at(&self, now: DateTime<Utc>) -> Result<String, PixivError> {
        {
            let state = self.state.read().await;
            if state.is_fresh_at(now) {
                return Ok(state.access_token.clone());
            }
        }

        self.refresh(now).await
    }

    async fn refresh(&self, now: DateTime<Utc>) -> Result<String, PixivError> {
        tracing::debug!("Refreshing pixiv access token");

        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("grant_type", "refresh_token"),
            ("refresh_token", self.credentials.refresh_token.as_str()),
        ];

        let response = self
            .http
            .client()
            .post(format!("{}/auth/token", self.oauth_base))
            .header("App-OS", APP_OS)
            .header("App-OS-Version", APP_OS_VERSION)
            .header("App-Version", APP_VERSION)
            .header(reqwest::header::USER_AGENT, APP_USER_AGENT)
            .form(&params)
            .send()
            .await
            .map_err(|e| PixivError::Network(format!("Failed to reach token endpoint: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PixivError::Network(format!("Failed to read token response: {}", e)))?;

        let access_token = serde_json::from_str::<TokenResponse>(&body)
            .ok()
            .and_then(TokenResponse::into_access_token)
            .ok_or_else(|| {
                PixivError::CredentialRefresh(format!("no access_token in response ({})", status))
            })?;

        *self.state.write().await = Credential {
            access_token: access_token.clone(),
            issued_at: Some(now),
        };

        tracing::info!("pixiv access token refreshed");
        Ok(access_token)
    }
}
