//! Page ingestion: normalise a path or URL into a uniform page-image set.
//!
//! Three input shapes collapse into one representation:
//!
//! * **URL** — fetched in one request; the body is the single page and the
//!   encoding comes from the URL's file extension.
//! * **PDF** — every page rasterised via pdfium at the configured scale and
//!   PNG-encoded. Runs inside `spawn_blocking`: pdfium wraps a C++ library
//!   with thread-local state that must not run on async worker threads.
//! * **Anything else** — treated as a single raw image file, bytes read
//!   as-is.
//!
//! Downstream stages never branch on the input shape again; they see only
//! an ordered page list with one shared encoding.

use crate::config::ExtractConfig;
use crate::error::ExtractError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// An ordered sequence of page images sharing one encoding.
///
/// Created once per extraction request and immutable afterwards; the model
/// adapter consumes it and it is discarded with the request.
#[derive(Debug, Clone)]
pub struct PageSet {
    pages: Vec<Vec<u8>>,
    encoding: String,
}

impl PageSet {
    /// An empty page set with the default `"jpeg"` encoding.
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            encoding: "jpeg".to_string(),
        }
    }

    /// Append one page's image bytes.
    pub fn add_page(&mut self, bytes: Vec<u8>) {
        self.pages.push(bytes);
    }

    /// Set the shared encoding, normalising `"jpg"` to `"jpeg"`.
    pub fn set_encoding(&mut self, encoding: &str) {
        let e = encoding.to_ascii_lowercase();
        self.encoding = if e == "jpg" { "jpeg".to_string() } else { e };
    }

    /// The shared image encoding, e.g. `"jpeg"` or `"png"`.
    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    /// MIME type for the shared encoding, e.g. `"image/png"`.
    pub fn mime_type(&self) -> String {
        format!("image/{}", self.encoding)
    }

    /// Page image buffers, in document order.
    pub fn pages(&self) -> &[Vec<u8>] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl Default for PageSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    let lower = input.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Turn a file locator into a [`PageSet`].
pub async fn ingest(locator: &str, config: &ExtractConfig) -> Result<PageSet, ExtractError> {
    if is_url(locator) {
        fetch_remote(locator, config.download_timeout_secs).await
    } else if locator.to_ascii_lowercase().ends_with(".pdf") {
        render_pdf(Path::new(locator), config.render_scale).await
    } else {
        read_image(Path::new(locator)).await
    }
}

/// Fetch a remote document; the body becomes the single page.
async fn fetch_remote(url: &str, timeout_secs: u64) -> Result<PageSet, ExtractError> {
    info!("Fetching document from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ExtractError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ExtractError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    if !response.status().is_success() {
        return Err(ExtractError::Fetch {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response.bytes().await.map_err(|e| ExtractError::Fetch {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    let mut pages = PageSet::new();
    pages.add_page(bytes.to_vec());
    pages.set_encoding(&extension_of(url).unwrap_or_else(|| "jpeg".to_string()));
    debug!("Fetched {} bytes, encoding '{}'", pages.pages[0].len(), pages.encoding());
    Ok(pages)
}

/// Read a single raw image file as the sole page.
async fn read_image(path: &Path) -> Result<PageSet, ExtractError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| ExtractError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut pages = PageSet::new();
    pages.add_page(bytes);
    if let Some(ext) = extension_of(&path.to_string_lossy()) {
        pages.set_encoding(&ext);
    }
    Ok(pages)
}

/// Rasterise every PDF page to PNG at the given linear scale.
///
/// An empty PDF yields an empty page set; the adapter sends a text-only
/// request in that case.
async fn render_pdf(pdf_path: &Path, scale: f32) -> Result<PageSet, ExtractError> {
    // Readability is checked up front so a missing file stays an I/O
    // error; pdfium failures are reserved for corrupt or unsupported PDFs.
    tokio::fs::metadata(pdf_path)
        .await
        .map_err(|e| ExtractError::Io {
            path: pdf_path.to_path_buf(),
            source: e,
        })?;

    let path = pdf_path.to_path_buf();

    tokio::task::spawn_blocking(move || render_pdf_blocking(&path, scale))
        .await
        .map_err(|e| ExtractError::Internal(format!("Render task panicked: {}", e)))?
}

/// Blocking implementation of PDF rasterisation.
fn render_pdf_blocking(pdf_path: &Path, scale: f32) -> Result<PageSet, ExtractError> {
    let pdfium = Pdfium::default();

    let document = pdfium
        .load_pdf_from_file(pdf_path, None)
        .map_err(|e| ExtractError::Decode {
            path: pdf_path.to_path_buf(),
            detail: format!("{:?}", e),
        })?;

    let doc_pages = document.pages();
    let total = doc_pages.len() as usize;
    info!("PDF loaded: {} pages", total);

    let render_config = PdfRenderConfig::new().scale_page_by_factor(scale);

    let mut pages = PageSet::new();
    pages.set_encoding("png");

    for (idx, page) in doc_pages.iter().enumerate() {
        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| ExtractError::Decode {
                path: pdf_path.to_path_buf(),
                detail: format!("page {}: {:?}", idx + 1, e),
            })?;

        let image = bitmap.as_image();
        let bytes = encode_png(&image).map_err(|e| ExtractError::Decode {
            path: pdf_path.to_path_buf(),
            detail: format!("page {}: PNG encoding failed: {}", idx + 1, e),
        })?;

        debug!(
            "Rendered page {} → {}x{} px, {} bytes",
            idx + 1,
            image.width(),
            image.height(),
            bytes.len()
        );
        pages.add_page(bytes);
    }

    Ok(pages)
}

/// PNG-encode a rendered page. Lossless keeps rendered text crisp, which
/// matters far more to the vision model than file size.
fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    Ok(buf)
}

/// Extension of a path or URL, without the dot.
fn extension_of(locator: &str) -> Option<String> {
    // Drop query/fragment so "photo.png?sig=abc" resolves to "png".
    let trimmed = locator
        .split(['?', '#'])
        .next()
        .unwrap_or(locator);
    PathBuf::from(trimmed)
        .extension()
        .map(|e| e.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_detection() {
        assert!(is_url("https://example.com/receipt.png"));
        assert!(is_url("http://example.com/receipt.png"));
        assert!(is_url("HTTPS://example.com/receipt.png"));
        assert!(!is_url("/tmp/receipt.png"));
        assert!(!is_url("receipt.png"));
        assert!(!is_url(""));
    }

    #[test]
    fn jpg_normalises_to_jpeg() {
        let mut pages = PageSet::new();
        pages.set_encoding("JPG");
        assert_eq!(pages.encoding(), "jpeg");
        pages.set_encoding("png");
        assert_eq!(pages.encoding(), "png");
    }

    #[test]
    fn mime_type_uses_shared_encoding() {
        let mut pages = PageSet::new();
        assert_eq!(pages.mime_type(), "image/jpeg");
        pages.set_encoding("png");
        assert_eq!(pages.mime_type(), "image/png");
    }

    #[test]
    fn extension_ignores_query_and_fragment() {
        assert_eq!(
            extension_of("https://cdn.example.com/scan.jpg?sig=abc#top"),
            Some("jpg".to_string())
        );
        assert_eq!(extension_of("https://example.com/receipt"), None);
    }

    #[tokio::test]
    async fn single_image_file_yields_one_page_with_matching_encoding() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipt.jpg");
        std::fs::write(&path, b"not-actually-a-jpeg").unwrap();

        let config = ExtractConfig::default();
        let pages = ingest(path.to_str().unwrap(), &config).await.unwrap();

        assert_eq!(pages.len(), 1);
        assert_eq!(pages.encoding(), "jpeg"); // jpg → jpeg
        assert_eq!(pages.pages()[0], b"not-actually-a-jpeg");
    }

    #[tokio::test]
    async fn missing_image_file_is_io_error() {
        let config = ExtractConfig::default();
        let err = ingest("/definitely/not/here.png", &config).await.unwrap_err();
        assert!(matches!(err, ExtractError::Io { .. }));
    }

    #[tokio::test]
    async fn missing_pdf_is_io_error() {
        // A file that does not exist is an I/O problem, not a decode
        // problem; this fails before pdfium is ever loaded.
        let config = ExtractConfig::default();
        let err = ingest("/definitely/not/here.pdf", &config).await.unwrap_err();
        assert!(matches!(err, ExtractError::Io { .. }));
    }

    // PDF rasterisation needs a pdfium shared library; exercised by the
    // gated end-to-end tests in tests/e2e.rs.
}
