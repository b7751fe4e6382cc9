//! pixiv App API access.
//!
//! Only the illustration detail endpoint and the OAuth refresh flow that
//! keeps its bearer token alive are implemented.
//!
//! - [`CredentialManager`] owns the short-lived access token and refreshes it
//!   from the long-lived refresh token when it is about to expire.
//! - [`PixivClient`] implements [`IllustSource`] on top of it.
//! - [`MockSource`] returns canned illustrations for tests.
//!
//! # Example
//!
//! ```rust,no_run
//! use pixiv_inline::pixiv::{CredentialManager, IllustSource, PixivClient, PixivCredentials};
//! use pixiv_inline::utils::HttpClient;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let http = HttpClient::new()?;
//! let credentials = PixivCredentials::new("client-id", "client-secret", "refresh-token");
//! let auth = Arc::new(CredentialManager::new(http.clone(), credentials));
//! let client = PixivClient::new(http, auth);
//!
//! let illust = client.fetch_illustration("61198649").await?;
//! println!("{} by {}", illust.title, illust.author_name);
//! # Ok(())
//! # }
//! ```

mod api;
mod auth;
mod client;
pub mod mock;

pub use auth::{
    Credential, CredentialManager, PixivCredentials, OAUTH_BASE_URL, TOKEN_REFRESH_THRESHOLD_SECS,
};
pub use client::{PixivClient, APP_API_BASE_URL};
pub use mock::MockSource;

use crate::models::IllustrationMetadata;
use async_trait::async_trait;

/// A place illustrations can be fetched from by id.
#[async_trait]
pub trait IllustSource: Send + Sync + std::fmt::Debug {
    /// Short identifier used in logs
    fn id(&self) -> &str;

    /// Fetch the metadata of one illustration. A single attempt, no retry.
    async fn fetch_illustration(&self, illust_id: &str)
        -> Result<IllustrationMetadata, PixivError>;
}

/// Errors that can occur when talking to pixiv
#[derive(Debug, thiserror::Error)]
pub enum PixivError {
    /// The token endpoint did not yield an access token
    #[error("Failed to refresh access token: {0}")]
    CredentialRefresh(String),

    /// The id is well-formed but upstream has no public illustration for it
    #[error("Illustration not found: {0}")]
    IllustrationNotFound(String),

    /// Network or HTTP transport error
    #[error("Network error: {0}")]
    Network(String),

    /// Response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Unexpected status from the API
    #[error("API error: {0}")]
    Api(String),
}

impl From<reqwest::Error> for PixivError {
    fn from(err: reqwest::Error) -> Self {
        PixivError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for PixivError {
    fn from(err: serde_json::Error) -> Self {
        PixivError::Parse(format!("JSON: {}", err))
    }
}
