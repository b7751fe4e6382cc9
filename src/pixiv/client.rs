//! pixiv App API client for illustration details.

use async_trait::async_trait;
use std::sync::Arc;

use super::api::DetailResponse;
use super::{CredentialManager, IllustSource, PixivError};
use crate::models::IllustrationMetadata;
use crate::utils::HttpClient;

/// Base URL for the pixiv App API
pub const APP_API_BASE_URL: &str = "https://app-api.pixiv.net/v1";

/// Illustration source backed by the pixiv App API
#[derive(Debug, Clone)]
pub struct PixivClient {
    http: HttpClient,
    api_base: String,
    auth: Arc<CredentialManager>,
}

impl PixivClient {
    /// Create a client for the public App API
    pub fn new(http: HttpClient, auth: Arc<CredentialManager>) -> Self {
        Self::with_base_url(http, auth, APP_API_BASE_URL)
    }

    /// Create a client for a custom API base (for testing)
    pub fn with_base_url(
        http: HttpClient,
        auth: Arc<CredentialManager>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            auth,
        }
    }

    fn build_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.api_base, endpoint)
    }
}

#[async_trait]
impl IllustSource for PixivClient {
    fn id(&self) -> &str {
        "pixiv"
    }

    async fn fetch_illustration(
        &self,
        illust_id: &str,
    ) -> Result<IllustrationMetadata, PixivError> {
        let token = self.auth.valid_token().await?;

        let response = self
            .http
            .client()
            .get(self.build_url("/illust/detail"))
            .query(&[("illust_id", illust_id)])
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| PixivError::Network(format!("Failed to fetch illustration: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PixivError::Network(format!("Failed to read response: {}", e)))?;

        // Unknown and deleted ids come back as an error envelope, usually with a 4xx status.
        let data: DetailResponse = match serde_json::from_str(&body) {
            Ok(data) => data,
            Err(_) if !status.is_success() => {
                return Err(PixivError::Api(format!(
                    "pixiv API returned status: {}",
                    status
                )));
            }
            Err(e) => return Err(e.into()),
        };

        match data.illust {
            Some(illust) => Ok(illust.into_metadata()),
            None => {
                let reason = data
                    .error
                    .map(|e| e.describe())
                    .unwrap_or_else(|| "no illust object".to_string());
                tracing::debug!("Illustration {} not available: {}", illust_id, reason);
                Err(PixivError::IllustrationNotFound(illust_id.to_string()))
            }
        }
    }
}
