//! Telegram side of inline mode.

use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{InlineQuery, InlineQueryResult, InlineQueryResultPhoto, ParseMode};
use url::Url;

use super::handler::{EmptyReason, InlineHandler, QueryOutcome};
use crate::models::InlineResultItem;

/// Default time Telegram may cache an answer, in seconds
pub const DEFAULT_CACHE_TIME: u32 = 300;

/// Options applied to every inline answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerSettings {
    pub cache_time: u32,
}

impl Default for AnswerSettings {
    fn default() -> Self {
        Self {
            cache_time: DEFAULT_CACHE_TIME,
        }
    }
}

/// Convert a result item into a Telegram photo result.
///
/// Items whose URLs do not parse are skipped.
pub fn to_photo_result(item: &InlineResultItem) -> Option<InlineQueryResult> {
    let photo_url = match Url::parse(&item.photo_url) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!("Invalid photo URL '{}': {}", item.photo_url, e);
            return None;
        }
    };

    let thumb_url = match Url::parse(&item.thumbnail_url) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!("Invalid thumbnail URL '{}': {}", item.thumbnail_url, e);
            return None;
        }
    };

    let mut result = InlineQueryResultPhoto::new(item.id.clone(), photo_url, thumb_url);
    result.photo_width = Some(item.width);
    result.photo_height = Some(item.height);
    result.caption = Some(item.caption_html.clone());
    result.parse_mode = Some(ParseMode::Html);

    Some(InlineQueryResult::Photo(result))
}

/// Handle inline queries (@bot query)
pub async fn handle_inline_query(
    bot: Bot,
    query: InlineQuery,
    handler: Arc<InlineHandler>,
    settings: AnswerSettings,
) -> ResponseResult<()> {
    tracing::debug!("Received inline query from user {}: {}", query.from.id, query.query);

    let outcome = AssertUnwindSafe(handler.answer(&query.query))
        .catch_unwind()
        .await
        .unwrap_or_else(|_| {
            tracing::error!("Inline pipeline panicked for query {:?}", query.query);
            QueryOutcome::empty(EmptyReason::Panicked)
        });

    tracing::debug!("Query finished at stage {}", outcome.stage);

    let results: Vec<InlineQueryResult> = outcome.results.iter().filter_map(to_photo_result).collect();

    let mut req = bot.answer_inline_query(query.id.clone(), results);
    req.cache_time = Some(settings.cache_time);

    // A failed answer is logged, never handed back to the dispatcher.
    if let Err(e) = req.await {
        tracing::error!("Failed to answer inline query {}: {}", query.id, e);
    }

    Ok(())
}
