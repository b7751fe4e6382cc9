//! Reverse-proxy rewriting for pximg image URLs.

/// Canonical image host prefix
pub const PXIMG_BASE: &str = "https://i.pximg.net/";

/// Replace the canonical image host with `proxy_base`.
///
/// URLs on other hosts, and every URL when no proxy is configured, are
/// returned unchanged. A missing trailing slash on the proxy base is added.
pub fn rewrite_image_host(url: &str, proxy_base: Option<&str>) -> String {
    let Some(base) = proxy_base.filter(|b| !b.is_empty()) else {
        return url.to_string();
    };

    match url.strip_prefix(PXIMG_BASE) {
        Some(path) if base.ends_with('/') => format!("{}{}", base, path),
        Some(path) => format!("{}/{}", base, path),
        None => url.to_string(),
    }
}
