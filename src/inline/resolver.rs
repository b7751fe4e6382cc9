//! Choosing which image URL to present for each page.
//!
//! Inline photo results must be JPEG, at most 5 MB, with accurate width and
//! height. Originals on pixiv are often PNG or larger than that, so every
//! original is probed first and swapped for the `large` rendition (always
//! JPEG) when it does not qualify or cannot be checked.

use futures_util::future::join_all;
use std::sync::Arc;

use super::probe::{ImageProbe, ProbeReport, JPEG_MIME};
use crate::models::{IllustrationMetadata, ImageCandidate, ImageUrlSet, PageUrls};
use crate::utils::rewrite_image_host;

/// Most pages answered for one illustration
pub const MAX_PAGES: usize = 8;

/// Telegram's display ceiling, used when a page's size is unknown
pub const SENTINEL_DIMENSION: u32 = 10_000;

/// Resolves illustration pages into displayable image candidates
#[derive(Debug, Clone)]
pub struct ImageResolver {
    probe: Arc<dyn ImageProbe>,
    proxy_base: Option<String>,
}

impl ImageResolver {
    pub fn new(probe: Arc<dyn ImageProbe>, proxy_base: Option<String>) -> Self {
        Self { probe, proxy_base }
    }

    fn rewrite(&self, url: &str) -> String {
        rewrite_image_host(url, self.proxy_base.as_deref())
    }

    /// Resolve at most [`MAX_PAGES`] candidates, in page order
    pub async fn resolve(&self, meta: &IllustrationMetadata) -> Vec<ImageCandidate> {
        match &meta.images {
            ImageUrlSet::Single(page) => vec![self.resolve_single(meta, page).await],
            ImageUrlSet::Multi(pages) => self.resolve_multi(meta, pages).await,
        }
    }

    async fn resolve_single(&self, meta: &IllustrationMetadata, page: &PageUrls) -> ImageCandidate {
        let (url, report) = self.select_url(&meta.id, 0, page, false).await;

        ImageCandidate {
            url,
            thumbnail_url: self.rewrite(&page.medium),
            width: meta.width,
            height: meta.height,
            mime_type: report.mime_type,
            byte_size: report.byte_size,
            page_index: 0,
        }
    }

    async fn resolve_multi(
        &self,
        meta: &IllustrationMetadata,
        pages: &[PageUrls],
    ) -> Vec<ImageCandidate> {
        // join_all yields results in input order, whatever order the probes finish in.
        join_all(
            pages
                .iter()
                .take(MAX_PAGES)
                .enumerate()
                .map(|(index, page)| self.resolve_page(meta, index, page)),
        )
        .await
    }

    async fn resolve_page(
        &self,
        meta: &IllustrationMetadata,
        index: usize,
        page: &PageUrls,
    ) -> ImageCandidate {
        let (url, report) = self.select_url(&meta.id, index, page, true).await;

        let (width, height) = match report.dimensions {
            Some(dimensions) => dimensions,
            None if index == 0 && meta.width > 0 && meta.height > 0 => (meta.width, meta.height),
            None => (SENTINEL_DIMENSION, SENTINEL_DIMENSION),
        };

        ImageCandidate {
            url,
            thumbnail_url: self.rewrite(&page.medium),
            width,
            height,
            mime_type: report.mime_type,
            byte_size: report.byte_size,
            page_index: index,
        }
    }

    /// Probe the original and pick it or the `large` fallback.
    ///
    /// The returned report describes the chosen image, except that dimensions
    /// read from a rejected original are kept since renditions share its
    /// aspect ratio.
    async fn select_url(
        &self,
        illust_id: &str,
        index: usize,
        page: &PageUrls,
        with_dimensions: bool,
    ) -> (String, ProbeReport) {
        let large = self.rewrite(&page.large);
        let fallback = |dimensions| ProbeReport {
            mime_type: Some(JPEG_MIME.to_string()),
            byte_size: None,
            dimensions,
        };

        let Some(original) = page.original.as_deref().map(|u| self.rewrite(u)) else {
            return (large, fallback(None));
        };

        match self.probe.probe(&original, with_dimensions).await {
            Ok(report) if report.is_photo_compatible() => (original, report),
            Ok(report) => {
                tracing::debug!(
                    "Original of {} page {} not usable as photo ({:?}, {:?} bytes), using large",
                    illust_id,
                    index,
                    report.mime_type,
                    report.byte_size
                );
                (large, fallback(report.dimensions))
            }
            Err(e) => {
                tracing::debug!(
                    "Probe of {} page {} failed, using large: {}",
                    illust_id,
                    index,
                    e
                );
                (large, fallback(None))
            }
        }
    }
}
