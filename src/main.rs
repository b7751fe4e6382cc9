use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use pixiv_inline::config::{
    default_config_path, find_config_file, load_config, load_from_env, write_default_config,
    Config,
};
use pixiv_inline::{handle_inline_query, AnswerSettings, InlineHandler};
use std::path::PathBuf;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// pixiv-inline - Share pixiv illustrations through Telegram inline mode
#[derive(Parser, Debug)]
#[command(name = "pixiv-inline")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Telegram inline bot that turns pixiv links into photo results", long_about = None)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(long, short)]
    quiet: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Telegram bot token (overrides config file)
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    bot_token: Option<String>,

    /// Reverse proxy base URL for i.pximg.net images (overrides config file)
    #[arg(long, env = "PIXIV_REVERSE_PROXY_URL")]
    proxy_url: Option<String>,

    /// API request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Image probe timeout in seconds
    #[arg(long)]
    probe_timeout: Option<u64>,

    /// Seconds Telegram may cache an answer
    #[arg(long)]
    cache_time: Option<u32>,

    /// Show all environment variables
    #[arg(long)]
    env: bool,

    /// Write a configuration template and exit
    #[arg(long, value_name = "PATH", num_args = 0..=1)]
    init_config: Option<Option<PathBuf>>,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per event
    Json,
}

/// Print all available environment variables
fn print_env_vars() {
    println!("pixiv-inline - Environment Variables");
    println!();
    println!("Credentials:");
    println!("  TELEGRAM_BOT_TOKEN          Telegram bot token");
    println!("  PIXIV_REFRESH_TOKEN         pixiv OAuth refresh token");
    println!("  PIXIV_CLIENT_ID             pixiv OAuth client id");
    println!("  PIXIV_CLIENT_SECRET         pixiv OAuth client secret");
    println!();
    println!("Images:");
    println!("  PIXIV_REVERSE_PROXY_URL     Base URL replacing https://i.pximg.net/");
    println!();
    println!("Structured overrides (any config key, sections separated by '__'):");
    println!("  PIXIV_INLINE_TELEGRAM__CACHE_TIME_SECS   Answer cache time (default: 300)");
    println!("  PIXIV_INLINE_HTTP__TIMEOUT_SECS          API request timeout (default: 30)");
    println!("  PIXIV_INLINE_HTTP__PROBE_TIMEOUT_SECS    Image probe timeout (default: 5)");
    println!("  PIXIV_INLINE_PIXIV__API_BASE_URL         pixiv App API base URL");
    println!();
    println!("Other Settings:");
    println!("  RUST_LOG                    Rust logging level (e.g., debug, info, warn, error)");
    println!();
    println!("Example:");
    println!("  export PIXIV_REVERSE_PROXY_URL=\"https://i.pixiv.re/\"");
}

fn init_tracing(cli: &Cli) {
    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let level = if cli.quiet { "error" } else { level };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("pixiv_inline={},teloxide=warn,warn", level).into());

    let registry = tracing_subscriber::registry().with(filter);
    match cli.log_format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
    }
}

fn load_settings(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(path) = &cli.config {
        load_config(path).with_context(|| format!("Failed to load {}", path.display()))?
    } else if let Some(path) = find_config_file() {
        tracing::info!("Using config file: {}", path.display());
        load_config(&path).with_context(|| format!("Failed to load {}", path.display()))?
    } else {
        load_from_env()?
    };

    if let Some(token) = &cli.bot_token {
        config.telegram.bot_token = token.clone();
    }
    if let Some(url) = &cli.proxy_url {
        config.pixiv.reverse_proxy_url = Some(url.clone()).filter(|u| !u.is_empty());
    }
    if let Some(timeout) = cli.timeout {
        config.http.timeout_secs = timeout;
    }
    if let Some(timeout) = cli.probe_timeout {
        config.http.probe_timeout_secs = timeout;
    }
    if let Some(cache_time) = cli.cache_time {
        config.telegram.cache_time_secs = cache_time;
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.env {
        print_env_vars();
        return Ok(());
    }

    if let Some(target) = &cli.init_config {
        let path = match target {
            Some(path) => path.clone(),
            None => default_config_path().context("No config directory on this platform")?,
        };
        write_default_config(&path)?;
        println!("Wrote configuration template to {}", path.display());
        return Ok(());
    }

    init_tracing(&cli);

    std::panic::set_hook(Box::new(|info| {
        tracing::error!("Panic: {}", info);
    }));

    let config = load_settings(&cli)?;

    tracing::info!("Starting pixiv-inline v{}", pixiv_inline::VERSION);
    match &config.pixiv.reverse_proxy_url {
        Some(url) => tracing::info!("Rewriting image URLs to {}", url),
        None => tracing::warn!("No reverse proxy configured, Telegram may fail to fetch i.pximg.net images"),
    }

    let handler = Arc::new(InlineHandler::from_config(&config)?);
    let settings = AnswerSettings {
        cache_time: config.telegram.cache_time_secs,
    };

    let bot = Bot::new(&config.telegram.bot_token);
    match bot.get_me().await {
        Ok(me) => tracing::info!("Bot authenticated as: @{}", me.username()),
        Err(e) => {
            tracing::error!("Failed to authenticate bot: {}", e);
            return Err(e.into());
        }
    }

    let inline_query_handler = Update::filter_inline_query().endpoint(handle_inline_query);

    Dispatcher::builder(bot, dptree::entry().branch(inline_query_handler))
        .dependencies(dptree::deps![handler, settings])
        .default_handler(|upd| async move {
            tracing::trace!("Ignoring update {:?}", upd.kind);
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "An error from the update listener",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    tracing::info!("pixiv-inline stopped");
    Ok(())
}
