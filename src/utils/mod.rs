//! Utility modules supporting the inline pipeline.
//!
//! - [`extract_illust_id`]: Pull a numeric illustration id out of a link or bare number
//! - [`sanitize_caption`]: Rewrite pixiv caption HTML into Telegram's HTML subset
//! - [`escape_html`]: Escape plain text for HTML captions
//! - [`rewrite_image_host`]: Route pximg URLs through the configured reverse proxy
//! - [`HttpClient`]: Shared reqwest client with timeouts
//!
//! ```rust
//! use pixiv_inline::utils::{extract_illust_id, sanitize_caption};
//!
//! let id = extract_illust_id("https://www.pixiv.net/en/artworks/61198649");
//! assert_eq!(id.as_deref(), Some("61198649"));
//!
//! assert_eq!(sanitize_caption("line<br />break"), "line\nbreak");
//! ```

mod caption;
mod http;
mod illust_id;
mod proxy;

pub use caption::{escape_html, sanitize_caption, visible_length};
pub use http::{HttpClient, DEFAULT_TIMEOUT};
pub use illust_id::{extract_illust_id, MIN_ID_DIGITS};
pub use proxy::{rewrite_image_host, PXIMG_BASE};
