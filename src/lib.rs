//! # pixiv-inline
//!
//! A Telegram inline-mode bot that answers a pixiv link or illustration id
//! with the illustration's pages as photo results.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (IllustrationMetadata, InlineResultItem, etc.)
//! - [`pixiv`]: pixiv App API client and OAuth credential management
//! - [`inline`]: Image probing, caption assembly and the inline query handler
//! - [`utils`]: HTTP client, id extraction, caption and URL helpers
//! - [`config`]: Configuration management

pub mod config;
pub mod inline;
pub mod models;
pub mod pixiv;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use inline::{handle_inline_query, AnswerSettings, InlineHandler};
pub use models::IllustrationMetadata;
pub use pixiv::{IllustSource, PixivError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
