//! PDF helpers: page counting from raw bytes and page rasterization.
//!
//! Rasterization shells out to `pdftoppm` behind the [`PdfRenderer`] trait so
//! the pipeline above the subprocess boundary can be tested with mocks.

use crate::error::PreviewError;
use async_trait::async_trait;
use tokio::process::Command;

/// Extract the page count from raw PDF bytes by scanning for the page tree's
/// `/Count` entry. Returns `None` when the count is not visible in plain
/// bytes (e.g. fully object-stream-compressed documents).
pub fn pdf_page_count(data: &[u8]) -> Option<u32> {
    let data_str = String::from_utf8_lossy(data);
    data_str.split("/Count").nth(1).and_then(|s| {
        let num_str = s
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect::<String>();
        num_str.parse::<u32>().ok()
    })
}

/// Renders one PDF page to PNG bytes.
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    /// Render `page` (1-indexed) of `pdf` at the given resolution.
    async fn render_page(&self, pdf: &[u8], page: u32, dpi: u32) -> Result<Vec<u8>, PreviewError>;
}

/// `pdftoppm`-backed renderer. The binary path is configured the same way
/// the conversion tooling is, so deployments can pin an exact executable.
pub struct PdftoppmRenderer {
    binary: String,
}

impl PdftoppmRenderer {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl PdfRenderer for PdftoppmRenderer {
    async fn render_page(&self, pdf: &[u8], page: u32, dpi: u32) -> Result<Vec<u8>, PreviewError> {
        let scratch = tempfile::tempdir()
            .map_err(|e| PreviewError::RenderFailed(format!("scratch dir: {}", e)))?;
        let input = scratch.path().join("input.pdf");
        let out_prefix = scratch.path().join("page");

        tokio::fs::write(&input, pdf)
            .await
            .map_err(|e| PreviewError::RenderFailed(format!("spooling input: {}", e)))?;

        let page_arg = page.to_string();
        let dpi_arg = dpi.to_string();
        let start = std::time::Instant::now();

        let output = Command::new(&self.binary)
            .arg("-png")
            .args(["-f", &page_arg, "-l", &page_arg])
            .args(["-r", &dpi_arg])
            .arg(&input)
            .arg(&out_prefix)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                PreviewError::RenderFailed(format!("failed to run {}: {}", self.binary, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PreviewError::RenderFailed(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                stderr.trim()
            )));
        }

        // pdftoppm zero-pads the page suffix based on the document's total
        // page count, so locate the produced file instead of guessing.
        let mut entries = tokio::fs::read_dir(scratch.path())
            .await
            .map_err(|e| PreviewError::RenderFailed(format!("reading scratch dir: {}", e)))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| PreviewError::RenderFailed(e.to_string()))?
        {
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();
            if name.starts_with("page") && name.ends_with(".png") {
                let bytes = tokio::fs::read(entry.path())
                    .await
                    .map_err(|e| PreviewError::RenderFailed(e.to_string()))?;
                tracing::debug!(
                    page,
                    dpi,
                    size_bytes = bytes.len(),
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "PDF page rasterized"
                );
                return Ok(bytes);
            }
        }

        Err(PreviewError::RenderFailed(format!(
            "{} produced no output for page {}",
            self.binary, page
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count_present() {
        let pdf = b"%PDF-1.4\n/Type /Pages /Count 3\n";
        assert_eq!(pdf_page_count(pdf), Some(3));
    }

    #[test]
    fn test_page_count_multi_digit() {
        let pdf = b"%PDF-1.4\n/Count 128 ...";
        assert_eq!(pdf_page_count(pdf), Some(128));
    }

    #[test]
    fn test_page_count_absent() {
        assert_eq!(pdf_page_count(b"%PDF-1.4\nno count here"), None);
        assert_eq!(pdf_page_count(b""), None);
    }

    #[test]
    fn test_page_count_takes_first_occurrence() {
        // The root page tree node appears before any nested subtree counts.
        let pdf = b"%PDF-1.4\n/Count 7\n/Count 2\n";
        assert_eq!(pdf_page_count(pdf), Some(7));
    }
}
