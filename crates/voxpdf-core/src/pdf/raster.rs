//! Full-page rendering through poppler's `pdftoppm`.

use std::path::Path;
use std::process::Command;

use image::DynamicImage;
use tracing::trace;

use super::Zoom;
use crate::error::PageError;

/// Render one page (zero-based `index`) to an image.
///
/// The PNG is written into a temporary directory that is removed when this
/// function returns.
pub(crate) fn render_with_pdftoppm(
    binary: &Path,
    pdf_path: &Path,
    index: usize,
    zoom: Zoom,
) -> Result<DynamicImage, PageError> {
    let temp_dir = tempfile::tempdir()
        .map_err(|e| PageError::Rasterize(format!("failed to create temp dir: {}", e)))?;
    let prefix = temp_dir.path().join("page");

    let page = (index + 1).to_string();
    let (dpi_x, dpi_y) = zoom.dpi();
    trace!("pdftoppm page {} at {}x{} dpi", page, dpi_x, dpi_y);

    let output = Command::new(binary)
        .args(["-png", "-singlefile"])
        .args(["-rx", &dpi_x.to_string(), "-ry", &dpi_y.to_string()])
        .args(["-f", &page, "-l", &page])
        .arg(pdf_path)
        .arg(&prefix)
        .output();

    match output {
        Ok(output) if output.status.success() => {}
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PageError::Rasterize(format!("pdftoppm failed: {}", stderr.trim())));
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(PageError::Rasterize(
                "pdftoppm not found (install poppler-utils)".to_string(),
            ));
        }
        Err(e) => return Err(PageError::Rasterize(e.to_string())),
    }

    let png = prefix.with_extension("png");
    image::open(&png).map_err(|e| PageError::Rasterize(format!("failed to read rendered page: {}", e)))
}
