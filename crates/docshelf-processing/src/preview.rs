//! Preview generation pipeline.
//!
//! `preview(name, page)` resolves the active file, classifies it, and
//! dispatches: images pass through untouched, PDFs rasterize directly,
//! office documents convert to PDF first. Rendered pages are bounded to a
//! target box, encoded as PNG, and cached in the preview area keyed by
//! `(name, page, source modification marker)` - so a re-upload under the
//! same name can never serve a stale artifact.

use crate::classify::{classify, CLASSIFY_WINDOW};
use crate::error::PreviewError;
use crate::office::OfficeConverter;
use crate::pdf::{pdf_page_count, PdfRenderer};
use docshelf_core::models::{FileKind, StorageArea};
use docshelf_storage::FileStore;
use image::ImageFormat;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore};

#[derive(Clone, Debug)]
pub struct PreviewOptions {
    pub max_width: u32,
    pub max_height: u32,
    pub dpi: u32,
    pub timeout_secs: u64,
    pub max_concurrent_renders: usize,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            max_width: 800,
            max_height: 600,
            dpi: 150,
            timeout_secs: 30,
            max_concurrent_renders: 2,
        }
    }
}

/// A rendered (or passed-through) preview image.
#[derive(Debug, Clone)]
pub struct Preview {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

/// Generates and caches per-page preview images.
#[derive(Clone)]
pub struct PreviewGenerator {
    store: FileStore,
    renderer: Arc<dyn PdfRenderer>,
    converter: Arc<dyn OfficeConverter>,
    options: PreviewOptions,
    render_permits: Arc<Semaphore>,
    inflight: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl PreviewGenerator {
    pub fn new(
        store: FileStore,
        renderer: Arc<dyn PdfRenderer>,
        converter: Arc<dyn OfficeConverter>,
        options: PreviewOptions,
    ) -> Self {
        let permits = options.max_concurrent_renders.max(1);
        Self {
            store,
            renderer,
            converter,
            options,
            render_permits: Arc::new(Semaphore::new(permits)),
            inflight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Cache artifact name for one (file, generation, page) triple.
    fn artifact_name(name: &str, marker: u128, page: u32) -> String {
        format!("{}.{}.p{}.png", name, marker, page)
    }

    /// Produce the preview image for `page` (1-indexed) of the active file
    /// `name`, serving from cache when the artifact for the file's current
    /// generation already exists.
    pub async fn preview(&self, name: &str, page: u32) -> Result<Preview, PreviewError> {
        if page == 0 {
            return Err(PreviewError::InvalidPage(
                "page numbers are 1-indexed".to_string(),
            ));
        }

        let marker = self.store.modified_marker(name).await?;
        let key = Self::artifact_name(name, marker, page);

        if let Some(bytes) = self.store.get_preview(&key).await? {
            tracing::debug!(name = %name, page, "Preview cache hit");
            return Ok(Preview {
                bytes,
                content_type: "image/png",
            });
        }

        // Collapse concurrent requests for the same key into one render.
        let key_lock = {
            let mut inflight = self.inflight.lock().await;
            inflight.entry(key.clone()).or_default().clone()
        };
        let result = {
            let _guard = key_lock.lock().await;

            match self.store.get_preview(&key).await {
                Ok(Some(bytes)) => Ok(Preview {
                    bytes,
                    content_type: "image/png",
                }),
                Ok(None) => {
                    let timeout = Duration::from_secs(self.options.timeout_secs);
                    match tokio::time::timeout(timeout, self.generate(name, page, &key)).await {
                        Ok(result) => result,
                        Err(_) => Err(PreviewError::Timeout {
                            seconds: self.options.timeout_secs,
                        }),
                    }
                }
                Err(e) => Err(PreviewError::from(e)),
            }
        };

        self.inflight.lock().await.remove(&key);
        result
    }

    async fn generate(&self, name: &str, page: u32, key: &str) -> Result<Preview, PreviewError> {
        let prefix = self
            .store
            .read_prefix(name, StorageArea::Active, CLASSIFY_WINDOW)
            .await?;
        let kind = classify(&prefix);

        match kind {
            FileKind::Other => Err(PreviewError::Unsupported { kind }),
            FileKind::Image => {
                // Single-page by definition; the source bytes are the preview.
                if page != 1 {
                    return Err(PreviewError::PageOutOfRange {
                        page,
                        page_count: 1,
                    });
                }
                let bytes = self.store.get(name, StorageArea::Active).await?;
                let content_type = image_mime(&bytes);
                Ok(Preview {
                    bytes,
                    content_type,
                })
            }
            FileKind::Pdf => {
                let pdf = self.store.get(name, StorageArea::Active).await?;
                self.rasterize_and_cache(&pdf, page, key).await
            }
            FileKind::Word | FileKind::Excel | FileKind::Powerpoint => {
                let data = self.store.get(name, StorageArea::Active).await?;
                let pdf = self.converter.to_pdf(&data, kind).await?;
                self.rasterize_and_cache(&pdf, page, key).await
            }
        }
    }

    async fn rasterize_and_cache(
        &self,
        pdf: &[u8],
        page: u32,
        key: &str,
    ) -> Result<Preview, PreviewError> {
        if let Some(page_count) = pdf_page_count(pdf) {
            if page > page_count {
                return Err(PreviewError::PageOutOfRange { page, page_count });
            }
        }

        let _permit = self
            .render_permits
            .acquire()
            .await
            .map_err(|_| PreviewError::RenderFailed("render pool closed".to_string()))?;

        let rendered = self
            .renderer
            .render_page(pdf, page, self.options.dpi)
            .await?;
        let bounded = bound_to_box(&rendered, self.options.max_width, self.options.max_height)?;

        self.store.put_preview(key, &bounded).await?;

        Ok(Preview {
            bytes: bounded,
            content_type: "image/png",
        })
    }
}

/// Shrink a rendered page into the target box, preserving aspect ratio.
/// Images already inside the box are returned unchanged.
fn bound_to_box(png: &[u8], max_width: u32, max_height: u32) -> Result<Vec<u8>, PreviewError> {
    let img = image::load_from_memory(png).map_err(|e| PreviewError::Image(e.to_string()))?;

    if img.width() <= max_width && img.height() <= max_height {
        return Ok(png.to_vec());
    }

    let resized = img.resize(max_width, max_height, image::imageops::FilterType::Lanczos3);
    let mut buf = Cursor::new(Vec::new());
    resized
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| PreviewError::Image(e.to_string()))?;
    Ok(buf.into_inner())
}

fn image_mime(data: &[u8]) -> &'static str {
    match image::guess_format(data) {
        Ok(ImageFormat::Png) => "image/png",
        Ok(ImageFormat::Jpeg) => "image/jpeg",
        Ok(ImageFormat::Gif) => "image/gif",
        Ok(ImageFormat::WebP) => "image/webp",
        Ok(ImageFormat::Bmp) => "image/bmp",
        Ok(ImageFormat::Tiff) => "image/tiff",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    const MAX: u64 = 10 * 1024 * 1024;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    struct MockRenderer {
        calls: Arc<AtomicUsize>,
        delay: Duration,
        output: Vec<u8>,
    }

    impl MockRenderer {
        fn new(output: Vec<u8>) -> (Arc<Self>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Arc::new(Self {
                    calls: calls.clone(),
                    delay: Duration::ZERO,
                    output,
                }),
                calls,
            )
        }

        fn slow(output: Vec<u8>, delay: Duration) -> (Arc<Self>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Arc::new(Self {
                    calls: calls.clone(),
                    delay,
                    output,
                }),
                calls,
            )
        }
    }

    #[async_trait]
    impl PdfRenderer for MockRenderer {
        async fn render_page(
            &self,
            _pdf: &[u8],
            _page: u32,
            _dpi: u32,
        ) -> Result<Vec<u8>, PreviewError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            Ok(self.output.clone())
        }
    }

    struct MockConverter {
        calls: Arc<AtomicUsize>,
        pdf: Vec<u8>,
    }

    impl MockConverter {
        fn new(pdf: Vec<u8>) -> (Arc<Self>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Arc::new(Self {
                    calls: calls.clone(),
                    pdf,
                }),
                calls,
            )
        }
    }

    #[async_trait]
    impl OfficeConverter for MockConverter {
        async fn to_pdf(&self, _data: &[u8], _kind: FileKind) -> Result<Vec<u8>, PreviewError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.pdf.clone())
        }
    }

    async fn generator_with(
        dir: &std::path::Path,
        renderer: Arc<dyn PdfRenderer>,
        converter: Arc<dyn OfficeConverter>,
        options: PreviewOptions,
    ) -> (PreviewGenerator, FileStore) {
        let store = FileStore::new(dir, MAX).await.unwrap();
        let generator = PreviewGenerator::new(store.clone(), renderer, converter, options);
        (generator, store)
    }

    fn three_page_pdf() -> Vec<u8> {
        b"%PDF-1.4\n/Type /Pages /Count 3\n%%EOF".to_vec()
    }

    async fn put(store: &FileStore, name: &str, data: &[u8]) {
        store
            .put(name, std::io::Cursor::new(data.to_vec()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_page_zero_is_invalid() {
        let dir = tempdir().unwrap();
        let (renderer, _) = MockRenderer::new(png_bytes(4, 4));
        let (converter, _) = MockConverter::new(three_page_pdf());
        let (generator, store) =
            generator_with(dir.path(), renderer, converter, PreviewOptions::default()).await;

        put(&store, "doc.pdf", &three_page_pdf()).await;
        let result = generator.preview("doc.pdf", 0).await;
        assert!(matches!(result, Err(PreviewError::InvalidPage(_))));
    }

    #[tokio::test]
    async fn test_preview_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let (renderer, _) = MockRenderer::new(png_bytes(4, 4));
        let (converter, _) = MockConverter::new(three_page_pdf());
        let (generator, _store) =
            generator_with(dir.path(), renderer, converter, PreviewOptions::default()).await;

        let result = generator.preview("ghost.pdf", 1).await;
        assert!(matches!(
            result,
            Err(PreviewError::Storage(
                docshelf_storage::StorageError::NotFound(_)
            ))
        ));
    }

    #[tokio::test]
    async fn test_image_passthrough() {
        let dir = tempdir().unwrap();
        let (renderer, calls) = MockRenderer::new(png_bytes(4, 4));
        let (converter, _) = MockConverter::new(three_page_pdf());
        let (generator, store) =
            generator_with(dir.path(), renderer, converter, PreviewOptions::default()).await;

        let source = png_bytes(16, 16);
        put(&store, "photo.png", &source).await;

        let preview = generator.preview("photo.png", 1).await.unwrap();
        assert_eq!(preview.bytes, source);
        assert_eq!(preview.content_type, "image/png");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_image_page_beyond_one_is_out_of_range() {
        let dir = tempdir().unwrap();
        let (renderer, _) = MockRenderer::new(png_bytes(4, 4));
        let (converter, _) = MockConverter::new(three_page_pdf());
        let (generator, store) =
            generator_with(dir.path(), renderer, converter, PreviewOptions::default()).await;

        put(&store, "photo.png", &png_bytes(16, 16)).await;

        let result = generator.preview("photo.png", 2).await;
        assert!(matches!(
            result,
            Err(PreviewError::PageOutOfRange {
                page: 2,
                page_count: 1
            })
        ));
    }

    #[tokio::test]
    async fn test_pdf_preview_renders_and_caches() {
        let dir = tempdir().unwrap();
        let (renderer, calls) = MockRenderer::new(png_bytes(4, 4));
        let (converter, _) = MockConverter::new(three_page_pdf());
        let (generator, store) =
            generator_with(dir.path(), renderer, converter, PreviewOptions::default()).await;

        put(&store, "doc.pdf", &three_page_pdf()).await;

        let preview = generator.preview("doc.pdf", 2).await.unwrap();
        assert_eq!(preview.content_type, "image/png");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let marker = store.modified_marker("doc.pdf").await.unwrap();
        let key = PreviewGenerator::artifact_name("doc.pdf", marker, 2);
        assert!(store.get_preview(&key).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_pdf_page_out_of_range_skips_render() {
        let dir = tempdir().unwrap();
        let (renderer, calls) = MockRenderer::new(png_bytes(4, 4));
        let (converter, _) = MockConverter::new(three_page_pdf());
        let (generator, store) =
            generator_with(dir.path(), renderer, converter, PreviewOptions::default()).await;

        put(&store, "doc.pdf", &three_page_pdf()).await;

        let result = generator.preview("doc.pdf", 5).await;
        assert!(matches!(
            result,
            Err(PreviewError::PageOutOfRange {
                page: 5,
                page_count: 3
            })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_pdf_without_visible_count_still_renders() {
        let dir = tempdir().unwrap();
        let (renderer, calls) = MockRenderer::new(png_bytes(4, 4));
        let (converter, _) = MockConverter::new(three_page_pdf());
        let (generator, store) =
            generator_with(dir.path(), renderer, converter, PreviewOptions::default()).await;

        put(&store, "odd.pdf", b"%PDF-1.4\nno page tree in plain bytes").await;

        let preview = generator.preview("odd.pdf", 1).await.unwrap();
        assert_eq!(preview.content_type, "image/png");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_second_request_hits_cache() {
        let dir = tempdir().unwrap();
        let (renderer, calls) = MockRenderer::new(png_bytes(4, 4));
        let (converter, _) = MockConverter::new(three_page_pdf());
        let (generator, store) =
            generator_with(dir.path(), renderer, converter, PreviewOptions::default()).await;

        put(&store, "doc.pdf", &three_page_pdf()).await;

        generator.preview("doc.pdf", 1).await.unwrap();
        generator.preview("doc.pdf", 1).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reupload_invalidates_cache() {
        let dir = tempdir().unwrap();
        let (renderer, calls) = MockRenderer::new(png_bytes(4, 4));
        let (converter, _) = MockConverter::new(three_page_pdf());
        let (generator, store) =
            generator_with(dir.path(), renderer, converter, PreviewOptions::default()).await;

        put(&store, "doc.pdf", &three_page_pdf()).await;
        generator.preview("doc.pdf", 1).await.unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;
        put(&store, "doc.pdf", &three_page_pdf()).await;
        generator.preview("doc.pdf", 1).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_office_document_goes_through_conversion() {
        let dir = tempdir().unwrap();
        let (renderer, render_calls) = MockRenderer::new(png_bytes(4, 4));
        let (converter, convert_calls) = MockConverter::new(three_page_pdf());
        let (generator, store) =
            generator_with(dir.path(), renderer, converter, PreviewOptions::default()).await;

        let mut docx = b"PK\x03\x04....".to_vec();
        docx.extend_from_slice(b"word/document.xml");
        put(&store, "notes.docx", &docx).await;

        let preview = generator.preview("notes.docx", 1).await.unwrap();
        assert_eq!(preview.content_type, "image/png");
        assert_eq!(convert_calls.load(Ordering::SeqCst), 1);
        assert_eq!(render_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unclassified_content_is_unsupported() {
        let dir = tempdir().unwrap();
        let (renderer, _) = MockRenderer::new(png_bytes(4, 4));
        let (converter, _) = MockConverter::new(three_page_pdf());
        let (generator, store) =
            generator_with(dir.path(), renderer, converter, PreviewOptions::default()).await;

        put(&store, "notes.txt", b"just some text").await;

        let result = generator.preview("notes.txt", 1).await;
        assert!(matches!(result, Err(PreviewError::Unsupported { .. })));
    }

    #[tokio::test]
    async fn test_rendered_page_is_bounded_to_target_box() {
        let dir = tempdir().unwrap();
        let (renderer, _) = MockRenderer::new(png_bytes(1600, 1200));
        let (converter, _) = MockConverter::new(three_page_pdf());
        let (generator, store) =
            generator_with(dir.path(), renderer, converter, PreviewOptions::default()).await;

        put(&store, "doc.pdf", &three_page_pdf()).await;

        let preview = generator.preview("doc.pdf", 1).await.unwrap();
        let img = image::load_from_memory(&preview.bytes).unwrap();
        assert!(img.width() <= 800);
        assert!(img.height() <= 600);
    }

    #[tokio::test]
    async fn test_slow_render_times_out() {
        let dir = tempdir().unwrap();
        let (renderer, _) = MockRenderer::slow(png_bytes(4, 4), Duration::from_millis(1500));
        let (converter, _) = MockConverter::new(three_page_pdf());
        let options = PreviewOptions {
            timeout_secs: 1,
            ..Default::default()
        };
        let (generator, store) = generator_with(dir.path(), renderer, converter, options).await;

        put(&store, "doc.pdf", &three_page_pdf()).await;

        let result = generator.preview("doc.pdf", 1).await;
        assert!(matches!(result, Err(PreviewError::Timeout { seconds: 1 })));
    }

    #[tokio::test]
    async fn test_concurrent_requests_collapse_to_one_render() {
        let dir = tempdir().unwrap();
        let (renderer, calls) = MockRenderer::slow(png_bytes(4, 4), Duration::from_millis(200));
        let (converter, _) = MockConverter::new(three_page_pdf());
        let (generator, store) =
            generator_with(dir.path(), renderer, converter, PreviewOptions::default()).await;

        put(&store, "doc.pdf", &three_page_pdf()).await;

        let g1 = generator.clone();
        let g2 = generator.clone();
        let (a, b) = tokio::join!(
            tokio::spawn(async move { g1.preview("doc.pdf", 1).await }),
            tokio::spawn(async move { g2.preview("doc.pdf", 1).await }),
        );

        assert!(a.unwrap().is_ok());
        assert!(b.unwrap().is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
