//! Office-to-PDF conversion behind a trait, backed by a headless
//! LibreOffice subprocess.
//!
//! The conversion produces an intermediate PDF inside a scratch directory
//! that dies with the job; the intermediate is never written to any storage
//! area, so a stale conversion can never be served.

use crate::error::PreviewError;
use async_trait::async_trait;
use docshelf_core::models::FileKind;
use tokio::process::Command;

/// Converts an office document to its PDF representation.
#[async_trait]
pub trait OfficeConverter: Send + Sync {
    async fn to_pdf(&self, data: &[u8], kind: FileKind) -> Result<Vec<u8>, PreviewError>;
}

/// `soffice --headless --convert-to pdf` fronting.
pub struct SofficeConverter {
    binary: String,
}

impl SofficeConverter {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Input extension hint for the converter; content detection does the
    /// real work, but LibreOffice picks its import filter faster with one.
    fn extension_for(kind: FileKind) -> Result<&'static str, PreviewError> {
        match kind {
            FileKind::Word => Ok("docx"),
            FileKind::Excel => Ok("xlsx"),
            FileKind::Powerpoint => Ok("pptx"),
            other => Err(PreviewError::ConversionFailed(format!(
                "no conversion path for {} files",
                other
            ))),
        }
    }
}

#[async_trait]
impl OfficeConverter for SofficeConverter {
    async fn to_pdf(&self, data: &[u8], kind: FileKind) -> Result<Vec<u8>, PreviewError> {
        let ext = Self::extension_for(kind)?;
        let scratch = tempfile::tempdir()
            .map_err(|e| PreviewError::ConversionFailed(format!("scratch dir: {}", e)))?;
        let input = scratch.path().join(format!("input.{}", ext));

        tokio::fs::write(&input, data)
            .await
            .map_err(|e| PreviewError::ConversionFailed(format!("spooling input: {}", e)))?;

        let start = std::time::Instant::now();
        let output = Command::new(&self.binary)
            .arg("--headless")
            .args(["--convert-to", "pdf"])
            .arg("--outdir")
            .arg(scratch.path())
            .arg(&input)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                PreviewError::ConversionFailed(format!("failed to run {}: {}", self.binary, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PreviewError::ConversionFailed(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                stderr.trim()
            )));
        }

        let converted = scratch.path().join("input.pdf");
        let pdf = tokio::fs::read(&converted).await.map_err(|e| {
            PreviewError::ConversionFailed(format!("{} produced no PDF: {}", self.binary, e))
        })?;

        tracing::debug!(
            kind = %kind,
            input_bytes = data.len(),
            pdf_bytes = pdf.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Office document converted to PDF"
        );

        Ok(pdf)
    }
}
