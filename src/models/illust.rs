//! Illustration model representing a pixiv artwork entry.

use serde::{Deserialize, Serialize};

/// Canonical base for artwork pages
pub const ARTWORK_PAGE_BASE: &str = "https://www.pixiv.net/artworks";

/// Canonical base for author profile pages
pub const USER_PAGE_BASE: &str = "https://www.pixiv.net/users";

/// URLs of the renditions pixiv serves for one page of an illustration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageUrls {
    /// Pre-resized rendition, always JPEG (used for thumbnails)
    pub medium: String,

    /// Larger pre-resized rendition, always JPEG
    pub large: String,

    /// Original upload, may be PNG or exceed the photo size limit
    pub original: Option<String>,
}

impl PageUrls {
    /// Create a new URL set for one page
    pub fn new(
        medium: impl Into<String>,
        large: impl Into<String>,
        original: Option<String>,
    ) -> Self {
        Self {
            medium: medium.into(),
            large: large.into(),
            original,
        }
    }
}

/// Image URLs of an illustration, either one page or an ordered list of pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "pages", rename_all = "lowercase")]
pub enum ImageUrlSet {
    Single(PageUrls),
    Multi(Vec<PageUrls>),
}

impl ImageUrlSet {
    /// Number of pages that have URLs
    pub fn len(&self) -> usize {
        match self {
            ImageUrlSet::Single(_) => 1,
            ImageUrlSet::Multi(pages) => pages.len(),
        }
    }

    /// Whether no page URLs are present
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pages in display order
    pub fn pages(&self) -> &[PageUrls] {
        match self {
            ImageUrlSet::Single(page) => std::slice::from_ref(page),
            ImageUrlSet::Multi(pages) => pages,
        }
    }
}

/// A pixiv illustration, immutable once fetched
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IllustrationMetadata {
    /// Numeric illustration id, as a string
    pub id: String,

    pub title: String,

    /// Raw HTML-ish description as returned upstream
    pub caption: String,

    /// Width of the first page in pixels
    pub width: u32,

    /// Height of the first page in pixels
    pub height: u32,

    pub page_count: u32,

    pub author_id: String,

    pub author_name: String,

    pub images: ImageUrlSet,
}

impl IllustrationMetadata {
    /// Whether this illustration has more than one page
    pub fn is_multi_page(&self) -> bool {
        matches!(self.images, ImageUrlSet::Multi(_)) || self.page_count > 1
    }

    /// Canonical artwork page on pixiv
    pub fn page_url(&self) -> String {
        format!("{}/{}", ARTWORK_PAGE_BASE, self.id)
    }

    /// Author profile page on pixiv
    pub fn author_url(&self) -> String {
        format!("{}/{}", USER_PAGE_BASE, self.author_id)
    }
}

/// Builder for constructing IllustrationMetadata objects
#[derive(Debug, Clone)]
pub struct IllustrationBuilder {
    illust: IllustrationMetadata,
}

impl IllustrationBuilder {
    /// Create a new builder with required fields
    pub fn new(id: impl Into<String>, title: impl Into<String>, images: ImageUrlSet) -> Self {
        let page_count = images.len() as u32;
        Self {
            illust: IllustrationMetadata {
                id: id.into(),
                title: title.into(),
                caption: String::new(),
                width: 0,
                height: 0,
                page_count,
                author_id: String::new(),
                author_name: String::new(),
                images,
            },
        }
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.illust.caption = caption.into();
        self
    }

    /// Set first-page dimensions
    pub fn dimensions(mut self, width: u32, height: u32) -> Self {
        self.illust.width = width;
        self.illust.height = height;
        self
    }

    /// Override the page count reported upstream
    pub fn page_count(mut self, page_count: u32) -> Self {
        self.illust.page_count = page_count;
        self
    }

    pub fn author(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.illust.author_id = id.into();
        self.illust.author_name = name.into();
        self
    }

    /// Build the IllustrationMetadata
    pub fn build(self) -> IllustrationMetadata {
        self.illust
    }
}
