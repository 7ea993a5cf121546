//! Tesseract OCR via the command-line binary.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use image::DynamicImage;
use tracing::debug;

use super::{OcrEngine, OcrHint};
use crate::error::OcrError;

/// OCR engine that shells out to `tesseract`.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    binary: PathBuf,
}

impl TesseractEngine {
    /// Create an engine using the given binary path or name.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn args(image_path: &Path, hint: &OcrHint) -> Vec<OsString> {
        vec![
            image_path.as_os_str().to_owned(),
            "stdout".into(),
            "-l".into(),
            hint.languages.as_str().into(),
            "--psm".into(),
            hint.layout.psm().to_string().into(),
        ]
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn recognize(&self, image: &DynamicImage, hint: &OcrHint) -> Result<String, OcrError> {
        let start = Instant::now();

        let temp_dir = tempfile::tempdir()?;
        let image_path = temp_dir.path().join("page.png");
        image
            .save_with_format(&image_path, image::ImageFormat::Png)
            .map_err(|e| OcrError::Recognition(format!("failed to write page image: {}", e)))?;

        let output = Command::new(&self.binary).args(Self::args(&image_path, hint)).output();

        let text = match output {
            Ok(output) if output.status.success() => String::from_utf8_lossy(&output.stdout).into_owned(),
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(OcrError::Recognition(format!("tesseract failed: {}", stderr.trim())));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(OcrError::BackendNotAvailable(format!(
                    "{} not found (install tesseract-ocr)",
                    self.binary.display()
                )));
            }
            Err(e) => return Err(OcrError::Io(e)),
        };

        debug!(
            "tesseract recognized {} chars in {}ms (lang={}, psm={})",
            text.len(),
            start.elapsed().as_millis(),
            hint.languages,
            hint.layout.psm()
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::LayoutMode;

    #[test]
    fn test_command_args() {
        let hint = OcrHint::new("eng+vie", LayoutMode::SingleBlock);
        let args = TesseractEngine::args(Path::new("/tmp/page.png"), &hint);
        let args: Vec<_> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args, ["/tmp/page.png", "stdout", "-l", "eng+vie", "--psm", "6"]);
    }

    #[test]
    fn test_missing_binary_is_reported() {
        let engine = TesseractEngine::new("/nonexistent/bin/tesseract-voxpdf");
        let image = DynamicImage::new_luma8(4, 4);
        let err = engine.recognize(&image, &OcrHint::default()).unwrap_err();
        assert!(matches!(err, OcrError::BackendNotAvailable(_)));
    }
}
