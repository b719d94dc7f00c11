//! OCR seam for embedded images.
//!
//! The extractor only depends on the [`OcrEngine`] trait, so tests and
//! OCR-less runs can substitute a stub without touching extraction.

use std::io::Write;
use std::process::Command;

use tempfile::NamedTempFile;
use thiserror::Error;

/// Errors from a single OCR attempt.
///
/// Always recovered locally by the extractor: a failed image simply
/// contributes no text to its slide.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Could not stage the image bytes to a temp file.
    #[error("failed to stage image for OCR: {0}")]
    Staging(#[from] std::io::Error),

    /// The OCR engine itself failed or could not be launched.
    #[error("OCR engine failed: {0}")]
    Engine(String),
}

/// Converts image bytes to recognized text.
pub trait OcrEngine {
    fn recognize(&self, image: &[u8]) -> Result<String, OcrError>;
}

/// OCR engine backed by the `tesseract` command-line binary.
///
/// The image is staged to a named temp file that is removed on drop,
/// whether recognition succeeds or fails.
#[derive(Debug, Default)]
pub struct TesseractOcr;

impl TesseractOcr {
    pub fn new() -> Self {
        Self
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, image: &[u8]) -> Result<String, OcrError> {
        let mut staged = NamedTempFile::with_suffix(".png")?;
        staged.write_all(image)?;
        staged.flush()?;

        let output = Command::new("tesseract")
            .arg(staged.path())
            .arg("stdout")
            .output()
            .map_err(|e| OcrError::Engine(format!("could not run tesseract: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Engine(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Engine that skips recognition entirely; image shapes contribute no text.
#[derive(Debug, Default)]
pub struct DisabledOcr;

impl DisabledOcr {
    pub fn new() -> Self {
        Self
    }
}

impl OcrEngine for DisabledOcr {
    fn recognize(&self, _image: &[u8]) -> Result<String, OcrError> {
        Ok(String::new())
    }
}
