//! Image candidates and the inline result records built from them.

use serde::{Deserialize, Serialize};

/// An image chosen for display, produced transiently during resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageCandidate {
    /// Photo URL, already rewritten to the reachable host
    pub url: String,

    /// Thumbnail URL (medium rendition)
    pub thumbnail_url: String,

    pub width: u32,

    pub height: u32,

    /// MIME type reported by the probe, if one succeeded
    pub mime_type: Option<String>,

    /// Content length reported by the probe, if one succeeded
    pub byte_size: Option<u64>,

    /// Zero-based page index within the illustration
    pub page_index: usize,
}

/// One selectable inline photo result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineResultItem {
    /// `{illust_id}_{page_index}`, unique within one reply
    pub id: String,

    pub photo_url: String,

    pub thumbnail_url: String,

    pub width: u32,

    pub height: u32,

    /// Caption in Telegram's HTML subset
    pub caption_html: String,
}

impl InlineResultItem {
    /// Compose the result id for a page of an illustration
    pub fn result_id(illust_id: &str, page_index: usize) -> String {
        format!("{}_{}", illust_id, page_index)
    }
}
