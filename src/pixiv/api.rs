//! Wire types of the pixiv App API.

use serde::Deserialize;

use crate::models::{IllustrationBuilder, IllustrationMetadata, ImageUrlSet, PageUrls};

// ===== OAuth =====

#[derive(Debug, Deserialize)]
pub(super) struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    /// Older deployments nest the token payload under `response`
    #[serde(default)]
    pub response: Option<TokenPayload>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TokenPayload {
    #[serde(default)]
    pub access_token: Option<String>,
}

impl TokenResponse {
    pub fn into_access_token(self) -> Option<String> {
        self.access_token
            .or_else(|| self.response.and_then(|r| r.access_token))
            .filter(|t| !t.is_empty())
    }
}

// ===== Illustration detail =====

#[derive(Debug, Deserialize)]
pub(super) struct DetailResponse {
    #[serde(default)]
    pub illust: Option<ApiIllust>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user_message: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl ApiErrorBody {
    pub fn describe(&self) -> String {
        [&self.user_message, &self.message, &self.reason]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .cloned()
            .unwrap_or_else(|| "no details".to_string())
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiIllust {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub caption: String,
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_page_count")]
    pub page_count: u32,
    pub user: ApiUser,
    pub image_urls: ApiImageUrls,
    #[serde(default)]
    pub meta_single_page: ApiMetaSinglePage,
    #[serde(default)]
    pub meta_pages: Vec<ApiMetaPage>,
}

fn default_page_count() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiUser {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiImageUrls {
    pub medium: String,
    pub large: String,
    #[serde(default)]
    pub original: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ApiMetaSinglePage {
    #[serde(default)]
    pub original_image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiMetaPage {
    pub image_urls: ApiImageUrls,
}

impl ApiIllust {
    pub fn into_metadata(self) -> IllustrationMetadata {
        let images = if self.meta_pages.is_empty() {
            ImageUrlSet::Single(PageUrls::new(
                self.image_urls.medium,
                self.image_urls.large,
                self.meta_single_page.original_image_url,
            ))
        } else {
            ImageUrlSet::Multi(
                self.meta_pages
                    .into_iter()
                    .map(|p| PageUrls::new(p.image_urls.medium, p.image_urls.large, p.image_urls.original))
                    .collect(),
            )
        };

        IllustrationBuilder::new(self.id.to_string(), self.title, images)
            .caption(self.caption)
            .dimensions(self.width, self.height)
            .page_count(self.page_count)
            .author(self.user.id.to_string(), self.user.name)
            .build()
    }
}
