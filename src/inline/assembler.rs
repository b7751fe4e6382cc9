//! Building inline result items from resolved candidates.

use super::resolver::MAX_PAGES;
use crate::models::{IllustrationMetadata, ImageCandidate, InlineResultItem};
use crate::utils::{escape_html, sanitize_caption, visible_length};

/// Telegram's caption length limit, in UTF-16 units of visible text
pub const CAPTION_LIMIT: usize = 1024;

/// Caption parts shared by every page of an illustration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseCaption {
    /// Title, linked author and artwork page URL
    pub header: String,
    /// Sanitized description, possibly empty
    pub description: String,
}

impl BaseCaption {
    pub fn from_metadata(meta: &IllustrationMetadata) -> Self {
        let header = format!(
            "{} by <a href=\"{}\">{}</a>\n{}",
            escape_html(&meta.title),
            meta.author_url(),
            escape_html(&meta.author_name),
            meta.page_url()
        );

        Self {
            header,
            description: sanitize_caption(&meta.caption).trim().to_string(),
        }
    }

    /// Full caption with `annotation` appended.
    ///
    /// The description is left out when the result would exceed
    /// [`CAPTION_LIMIT`].
    pub fn render(&self, annotation: &str) -> String {
        if !self.description.is_empty() {
            let full = format!("{}\n{}{}", self.header, self.description, annotation);
            if visible_length(&full) <= CAPTION_LIMIT {
                return full;
            }
        }

        format!("{}{}", self.header, annotation)
    }
}

/// Annotation appended to the caption of page `index` of `page_count`
pub fn page_annotation(index: usize, shown: usize, page_count: u32) -> String {
    let mut annotation = format!("\n\n[{}/{}]", index + 1, page_count);

    let capped = page_count as usize > MAX_PAGES;
    if capped && index + 1 == shown {
        annotation.push_str(&format!(
            "\n{} more pages are only available on pixiv.",
            page_count as usize - shown
        ));
    }

    annotation
}

/// Build one result per candidate, preserving page order
pub fn assemble(meta: &IllustrationMetadata, candidates: &[ImageCandidate]) -> Vec<InlineResultItem> {
    let base = BaseCaption::from_metadata(meta);
    let multi_page = meta.is_multi_page();

    candidates
        .iter()
        .map(|candidate| {
            let annotation = if multi_page {
                page_annotation(candidate.page_index, candidates.len(), meta.page_count)
            } else {
                String::new()
            };

            InlineResultItem {
                id: InlineResultItem::result_id(&meta.id, candidate.page_index),
                photo_url: candidate.url.clone(),
                thumbnail_url: candidate.thumbnail_url.clone(),
                width: candidate.width,
                height: candidate.height,
                caption_html: base.render(&annotation),
            }
        })
        .collect()
}
