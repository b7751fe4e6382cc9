//! Core data models for illustrations and inline results.

mod illust;
mod inline;

pub use illust::{
    IllustrationBuilder, IllustrationMetadata, ImageUrlSet, PageUrls, ARTWORK_PAGE_BASE,
    USER_PAGE_BASE,
};
pub use inline::{ImageCandidate, InlineResultItem};
