//! Illustration id extraction from free-form query text.
//!
//! Recognized shapes:
//!
//! - `https://www.pixiv.net/en/artworks/61198649`
//! - `https://www.pixiv.net/artworks/61198649`
//! - `http://www.pixiv.net/member_illust.php?illust_id=61198649`
//! - `http://www.pixiv.net/member_illust.php?mode=medium&illust_id=61198649`
//! - `61198649`

use regex::Regex;
use std::sync::LazyLock;

/// Shortest digit run accepted as an illustration id
pub const MIN_ID_DIGITS: usize = 5;

static ILLUST_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?:illust_id=|artworks/)?(\d{{{},}})", MIN_ID_DIGITS))
        .expect("illust id pattern is valid")
});

/// Extract the numeric illustration id from a link or bare number.
///
/// Returns `None` when the text holds no run of at least five digits.
pub fn extract_illust_id(text: &str) -> Option<String> {
    ILLUST_ID_RE
        .captures(text)?
        .get(1)
        .map(|m| m.as_str().to_string())
}
