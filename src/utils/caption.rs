//! Caption rewriting for Telegram's HTML parse mode.
//!
//! pixiv descriptions use `<br />` for line breaks and decorate links with
//! `target` and `rel` attributes. Telegram supports neither, and one unknown
//! attribute makes it reject the whole message.

use regex::Regex;
use std::sync::LazyLock;

static LINE_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("line break pattern is valid"));

static LINK_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s*(?:target|rel)=['"][^'"]*['"]"#).expect("attribute pattern is valid")
});

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

/// Rewrite a raw pixiv caption into Telegram-safe markup.
///
/// Line-break tags become `\n`, then `target`/`rel` attributes are removed.
pub fn sanitize_caption(raw: &str) -> String {
    let output = LINE_BREAK_RE.replace_all(raw, "\n");
    LINK_ATTR_RE.replace_all(&output, "").into_owned()
}

/// Escape plain text (titles, user names) for inclusion in HTML captions
pub fn escape_html(text: &str) -> String {
    teloxide::utils::html::escape(text)
}

/// Length of the text Telegram displays for an HTML caption, in UTF-16 code
/// units, which is the unit of its caption limit
pub fn visible_length(html: &str) -> usize {
    let text = TAG_RE.replace_all(html, "");
    let text = text
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&");
    text.encode_utf16().count()
}
