//! Mock illustration source for testing purposes.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::models::{IllustrationBuilder, IllustrationMetadata, ImageUrlSet, PageUrls};
use crate::pixiv::{IllustSource, PixivError};

/// A mock source that returns a predefined illustration.
#[derive(Debug, Default)]
pub struct MockSource {
    illust: Mutex<Option<IllustrationMetadata>>,
    calls: AtomicUsize,
}

impl MockSource {
    /// Create a new mock source that finds nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock source returning `illust` for every id.
    pub fn with_illust(illust: IllustrationMetadata) -> Self {
        let source = Self::new();
        source.set_illust(illust);
        source
    }

    /// Set the illustration to return.
    pub fn set_illust(&self, illust: IllustrationMetadata) {
        let mut guard = self.illust.lock().unwrap();
        *guard = Some(illust);
    }

    /// Number of fetches made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IllustSource for MockSource {
    fn id(&self) -> &str {
        "mock"
    }

    async fn fetch_illustration(
        &self,
        illust_id: &str,
    ) -> Result<IllustrationMetadata, PixivError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let guard = self.illust.lock().unwrap();
        match &*guard {
            Some(illust) => Ok(illust.clone()),
            None => Err(PixivError::IllustrationNotFound(illust_id.to_string())),
        }
    }
}

/// URLs of page `index` of illustration `id` on the canonical image host.
pub fn make_page(id: &str, index: usize, original_ext: &str) -> PageUrls {
    PageUrls::new(
        format!(
            "https://i.pximg.net/c/540x540_70/img-master/img/2017/02/08/00/00/07/{}_p{}_master1200.jpg",
            id, index
        ),
        format!(
            "https://i.pximg.net/c/600x1200_90/img-master/img/2017/02/08/00/00/07/{}_p{}_master1200.jpg",
            id, index
        ),
        Some(format!(
            "https://i.pximg.net/img-original/img/2017/02/08/00/00/07/{}_p{}.{}",
            id, index, original_ext
        )),
    )
}

/// Helper function to create a mock illustration with `pages` pages.
pub fn make_illust(id: &str, pages: usize) -> IllustrationMetadata {
    let images = if pages <= 1 {
        ImageUrlSet::Single(make_page(id, 0, "jpg"))
    } else {
        ImageUrlSet::Multi((0..pages).map(|i| make_page(id, i, "jpg")).collect())
    };

    IllustrationBuilder::new(id, "Test Illustration", images)
        .caption("First line<br />Second line")
        .dimensions(1200, 1600)
        .author("1234", "Test Artist")
        .build()
}
