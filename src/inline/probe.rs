//! Lightweight remote checks of image URLs.
//!
//! A probe asks for the content type and length with `HEAD`, and when pixel
//! dimensions are wanted, fetches only the first [`HEADER_FETCH_BYTES`] of the
//! image and decodes its header.

use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, RANGE, REFERER};
use std::io::Cursor;
use std::time::Duration;

use crate::utils::HttpClient;

/// MIME type Telegram accepts for inline photo results
pub const JPEG_MIME: &str = "image/jpeg";

/// Largest photo Telegram fetches for an inline photo result
pub const MAX_PHOTO_BYTES: u64 = 5_000_000;

/// Bytes requested when decoding image dimensions
pub const HEADER_FETCH_BYTES: usize = 64 * 1024;

/// Default probe timeout
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// pximg refuses requests without a pixiv referer
const PIXIV_REFERER: &str = "https://www.pixiv.net/";

/// What a probe learned about an image
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeReport {
    pub mime_type: Option<String>,
    pub byte_size: Option<u64>,
    /// `(width, height)` when the header could be decoded
    pub dimensions: Option<(u32, u32)>,
}

impl ProbeReport {
    /// Whether the image is a JPEG of known size within the photo limit
    pub fn is_photo_compatible(&self) -> bool {
        let is_jpeg = self
            .mime_type
            .as_deref()
            .and_then(|m| m.split(';').next())
            .is_some_and(|m| m.trim().eq_ignore_ascii_case(JPEG_MIME));

        is_jpeg && self.byte_size.is_some_and(|size| size <= MAX_PHOTO_BYTES)
    }
}

/// Errors that can occur while probing; callers fall back instead of failing
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected status: {0}")]
    Status(u16),

    #[error("Probe timed out")]
    Timeout,
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        ProbeError::Network(err.to_string())
    }
}

/// Remote metadata check of an image URL
#[async_trait]
pub trait ImageProbe: Send + Sync + std::fmt::Debug {
    async fn probe(&self, url: &str, with_dimensions: bool) -> Result<ProbeReport, ProbeError>;
}

/// Probe backed by HTTP `HEAD` and ranged `GET` requests
#[derive(Debug, Clone)]
pub struct HttpProbe {
    http: HttpClient,
    timeout: Duration,
}

impl HttpProbe {
    pub fn new(http: HttpClient) -> Self {
        Self::with_timeout(http, DEFAULT_PROBE_TIMEOUT)
    }

    pub fn with_timeout(http: HttpClient, timeout: Duration) -> Self {
        Self { http, timeout }
    }

    async fn head(&self, url: &str) -> Result<ProbeReport, ProbeError> {
        let response = self
            .http
            .client()
            .head(url)
            .header(REFERER, PIXIV_REFERER)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProbeError::Status(response.status().as_u16()));
        }

        let headers = response.headers();
        let mime_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        // Response::content_length() reports the (empty) body of a HEAD response.
        let byte_size = headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok());

        Ok(ProbeReport {
            mime_type,
            byte_size,
            dimensions: None,
        })
    }

    async fn fetch_dimensions(&self, url: &str) -> Result<Option<(u32, u32)>, ProbeError> {
        let mut response = self
            .http
            .client()
            .get(url)
            .header(REFERER, PIXIV_REFERER)
            .header(RANGE, format!("bytes=0-{}", HEADER_FETCH_BYTES - 1))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProbeError::Status(response.status().as_u16()));
        }

        // Servers that ignore Range send the whole file; stop reading early.
        let mut buf = Vec::with_capacity(HEADER_FETCH_BYTES);
        while let Some(chunk) = response.chunk().await? {
            buf.extend_from_slice(&chunk);
            if buf.len() >= HEADER_FETCH_BYTES {
                break;
            }
        }

        Ok(decode_dimensions(&buf))
    }

    async fn run(&self, url: &str, with_dimensions: bool) -> Result<ProbeReport, ProbeError> {
        let mut report = self.head(url).await?;

        if with_dimensions {
            match self.fetch_dimensions(url).await {
                Ok(dimensions) => report.dimensions = dimensions,
                Err(e) => tracing::debug!("Could not read dimensions of {}: {}", url, e),
            }
        }

        Ok(report)
    }
}

#[async_trait]
impl ImageProbe for HttpProbe {
    async fn probe(&self, url: &str, with_dimensions: bool) -> Result<ProbeReport, ProbeError> {
        tokio::time::timeout(self.timeout, self.run(url, with_dimensions))
            .await
            .map_err(|_| ProbeError::Timeout)?
    }
}

/// Decode `(width, height)` from the leading bytes of an image
pub fn decode_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};

    fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        RgbImage::new(width, height).write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    fn report(mime: &str, size: u64) -> ProbeReport {
        ProbeReport {
            mime_type: Some(mime.to_string()),
            byte_size: Some(size),
            dimensions: None,
        }
    }

    #[test]
    fn test_photo_compatibility() {
        assert!(report("image/jpeg", 1_000_000).is_photo_compatible());
        assert!(report("image/jpeg", MAX_PHOTO_BYTES).is_photo_compatible());
        assert!(report("IMAGE/JPEG; charset=binary", 10).is_photo_compatible());
        assert!(!report("image/jpeg", MAX_PHOTO_BYTES + 1).is_photo_compatible());
        assert!(!report("image/png", 10).is_photo_compatible());

        let unknown_size = ProbeReport {
            mime_type: Some("image/jpeg".to_string()),
            ..Default::default()
        };
        assert!(!unknown_size.is_photo_compatible());
    }

    #[test]
    fn test_decode_dimensions() {
        assert_eq!(decode_dimensions(&encode(40, 30, ImageFormat::Png)), Some((40, 30)));
        assert_eq!(decode_dimensions(&encode(17, 9, ImageFormat::Jpeg)), Some((17, 9)));
        assert_eq!(decode_dimensions(b"definitely not an image"), None);
    }

    #[tokio::test]
    async fn test_http_probe_reads_headers() {
        let mut server = mockito::Server::new_async().await;
        let _head = server
            .mock("HEAD", "/img-original/a.jpg")
            .match_header("referer", PIXIV_REFERER)
            .with_header("content-type", "image/jpeg")
            .with_header("content-length", "123456")
            .create_async()
            .await;

        let probe = HttpProbe::new(HttpClient::new().unwrap());
        let report = probe
            .probe(&format!("{}/img-original/a.jpg", server.url()), false)
            .await
            .unwrap();

        assert_eq!(report.mime_type.as_deref(), Some("image/jpeg"));
        assert_eq!(report.byte_size, Some(123456));
        assert!(report.is_photo_compatible());
    }

    #[tokio::test]
    async fn test_http_probe_dimensions() {
        let png = encode(64, 48, ImageFormat::Png);
        let mut server = mockito::Server::new_async().await;
        let _head = server
            .mock("HEAD", "/p1.png")
            .with_header("content-type", "image/png")
            .with_header("content-length", &png.len().to_string())
            .create_async()
            .await;
        let _get = server
            .mock("GET", "/p1.png")
            .match_header("range", "bytes=0-65535")
            .with_status(206)
            .with_body(png)
            .create_async()
            .await;

        let probe = HttpProbe::new(HttpClient::new().unwrap());
        let report = probe
            .probe(&format!("{}/p1.png", server.url()), true)
            .await
            .unwrap();

        assert_eq!(report.dimensions, Some((64, 48)));
        assert!(!report.is_photo_compatible());
    }

    #[tokio::test]
    async fn test_http_probe_status_error() {
        let mut server = mockito::Server::new_async().await;
        let _head = server
            .mock("HEAD", "/missing.jpg")
            .with_status(403)
            .create_async()
            .await;

        let probe = HttpProbe::new(HttpClient::new().unwrap());
        let result = probe
            .probe(&format!("{}/missing.jpg", server.url()), false)
            .await;

        assert!(matches!(result, Err(ProbeError::Status(403))));
    }

    /// Accepts connections and never writes a response.
    async fn silent_server() -> std::net::SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });
        addr
    }

    #[tokio::test]
    async fn test_http_probe_times_out() {
        let addr = silent_server().await;
        let probe = HttpProbe::with_timeout(HttpClient::new().unwrap(), Duration::from_millis(50));

        let started = std::time::Instant::now();
        let result = probe
            .probe(&format!("http://{}/img-original/slow.jpg", addr), true)
            .await;

        assert!(matches!(result, Err(ProbeError::Timeout)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
