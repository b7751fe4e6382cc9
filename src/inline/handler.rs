//! Per-query orchestration.
//!
//! Every query gets a reply. Anything that goes wrong along the way is logged
//! and answered with an empty result list, since inline mode has no way to
//! show the user an error.

use std::fmt;
use std::sync::Arc;

use super::assembler::assemble;
use super::probe::HttpProbe;
use super::resolver::ImageResolver;
use crate::config::Config;
use crate::models::InlineResultItem;
use crate::pixiv::{CredentialManager, IllustSource, PixivClient, PixivCredentials};
use crate::utils::{extract_illust_id, HttpClient};

/// Why a query was answered with no results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// The query text holds no illustration id
    NoIllustId,
    /// Credential refresh, transport or lookup failed
    FetchFailed,
    /// The illustration has no page URLs
    NoImages,
    /// The pipeline panicked
    Panicked,
}

/// Where a query is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStage {
    Received,
    IdExtracted,
    MetadataFetched,
    ImagesResolved,
    Replied,
    RepliedEmpty(EmptyReason),
}

impl fmt::Display for QueryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryStage::Received => write!(f, "received"),
            QueryStage::IdExtracted => write!(f, "id_extracted"),
            QueryStage::MetadataFetched => write!(f, "metadata_fetched"),
            QueryStage::ImagesResolved => write!(f, "images_resolved"),
            QueryStage::Replied => write!(f, "replied"),
            QueryStage::RepliedEmpty(reason) => write!(f, "replied_empty({:?})", reason),
        }
    }
}

/// Final stage of a query and the results to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOutcome {
    pub stage: QueryStage,
    pub results: Vec<InlineResultItem>,
}

impl QueryOutcome {
    pub fn empty(reason: EmptyReason) -> Self {
        Self {
            stage: QueryStage::RepliedEmpty(reason),
            results: Vec::new(),
        }
    }

    fn replied(results: Vec<InlineResultItem>) -> Self {
        Self {
            stage: QueryStage::Replied,
            results,
        }
    }
}

/// Turns inline query text into inline results
#[derive(Debug, Clone)]
pub struct InlineHandler {
    source: Arc<dyn IllustSource>,
    resolver: ImageResolver,
}

impl InlineHandler {
    pub fn new(source: Arc<dyn IllustSource>, resolver: ImageResolver) -> Self {
        Self { source, resolver }
    }

    /// Wire the pixiv client, credential manager and image probe from `config`
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let http = HttpClient::with_timeout(config.http.timeout())?;

        let credentials = PixivCredentials::new(
            &config.pixiv.client_id,
            &config.pixiv.client_secret,
            &config.pixiv.refresh_token,
        );
        let auth = Arc::new(CredentialManager::with_base_url(
            http.clone(),
            credentials,
            &config.pixiv.oauth_base_url,
        ));
        let source = PixivClient::with_base_url(http.clone(), auth, &config.pixiv.api_base_url);

        let probe = HttpProbe::with_timeout(http, config.http.probe_timeout());
        let resolver = ImageResolver::new(Arc::new(probe), config.pixiv.reverse_proxy_url.clone());

        Ok(Self::new(Arc::new(source), resolver))
    }

    /// Answer one inline query
    pub async fn answer(&self, query: &str) -> QueryOutcome {
        let mut stage = QueryStage::Received;
        tracing::trace!(%stage, "Inline query: {:?}", query);

        let Some(illust_id) = extract_illust_id(query.trim()) else {
            tracing::debug!("No illustration id in query {:?}", query);
            return QueryOutcome::empty(EmptyReason::NoIllustId);
        };
        stage = QueryStage::IdExtracted;
        tracing::trace!(%stage, %illust_id);

        let meta = match self.source.fetch_illustration(&illust_id).await {
            Ok(meta) => meta,
            Err(e) => {
                tracing::warn!(
                    source = self.source.id(),
                    "Failed to fetch illustration {}: {}",
                    illust_id,
                    e
                );
                return QueryOutcome::empty(EmptyReason::FetchFailed);
            }
        };
        stage = QueryStage::MetadataFetched;
        tracing::trace!(%stage, pages = meta.page_count);

        let candidates = self.resolver.resolve(&meta).await;
        if candidates.is_empty() {
            tracing::warn!("Illustration {} has no image URLs", illust_id);
            return QueryOutcome::empty(EmptyReason::NoImages);
        }
        stage = QueryStage::ImagesResolved;
        tracing::trace!(%stage, candidates = candidates.len());

        let results = assemble(&meta, &candidates);
        tracing::info!(
            "Answering query for illustration {} with {} result(s)",
            illust_id,
            results.len()
        );
        QueryOutcome::replied(results)
    }
}
