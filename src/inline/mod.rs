//! Inline query pipeline.
//!
//! A query flows through these stages:
//!
//! 1. [`extract_illust_id`](crate::utils::extract_illust_id) finds the illustration id
//! 2. an [`IllustSource`](crate::pixiv::IllustSource) fetches its metadata
//! 3. [`ImageResolver`] picks a photo URL per page, probing originals with an [`ImageProbe`]
//! 4. [`assemble`] builds captioned [`InlineResultItem`](crate::models::InlineResultItem)s
//!
//! [`InlineHandler`] runs the stages and [`handle_inline_query`] connects it
//! to teloxide.

mod assembler;
mod handler;
mod probe;
mod resolver;
mod telegram;

pub use assembler::{assemble, page_annotation, BaseCaption, CAPTION_LIMIT};
pub use handler::{EmptyReason, InlineHandler, QueryOutcome, QueryStage};
pub use probe::{
    decode_dimensions, HttpProbe, ImageProbe, ProbeError, ProbeReport, DEFAULT_PROBE_TIMEOUT,
    JPEG_MIME, MAX_PHOTO_BYTES,
};
pub use resolver::{ImageResolver, MAX_PAGES, SENTINEL_DIMENSION};
pub use telegram::{handle_inline_query, to_photo_result, AnswerSettings, DEFAULT_CACHE_TIME};
