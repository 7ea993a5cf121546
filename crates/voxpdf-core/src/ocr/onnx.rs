//! Pure Rust OCR engine wrapper using `pure-onnx-ocr`.

use std::path::Path;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use super::{OcrEngine, OcrHint};
use crate::error::OcrError;

/// OCR engine backed by `pure-onnx-ocr` (PaddleOCR models, no external runtime).
///
/// The recognizer is trained on Latin script; the language hint is logged
/// but does not change recognition.
pub struct OnnxOcrEngine {
    engine: pure_onnx_ocr::engine::OcrEngine,
    keep_unk: bool,
}

/// A recognized line with the top-left corner of its box.
struct Line {
    x: f32,
    y: f32,
    text: String,
}

impl OnnxOcrEngine {
    /// Create an engine from model files in a directory.
    ///
    /// Expects `det.onnx`, `latin_rec.onnx` and `latin_dict.txt`.
    pub fn from_dir(model_dir: &Path, keep_unk: bool) -> Result<Self, OcrError> {
        let det_path = model_dir.join("det.onnx");
        let rec_path = model_dir.join("latin_rec.onnx");
        let dict_path = model_dir.join("latin_dict.txt");

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!("missing model file {}", path.display())));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", model_dir.display());

        Ok(Self { engine, keep_unk })
    }
}

impl OcrEngine for OnnxOcrEngine {
    fn name(&self) -> &'static str {
        "onnx"
    }

    fn recognize(&self, image: &DynamicImage, hint: &OcrHint) -> Result<String, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();
        debug!("Running pure-onnx-ocr on {}x{} (hint {})", width, height, hint.languages);

        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        let mut lines: Vec<Line> = results
            .iter()
            .map(|r| {
                let (x, y) = top_left(&r.bounding_box);
                let text = if self.keep_unk {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                };
                Line { x, y, text }
            })
            .collect();

        sort_reading_order(&mut lines);

        let text = lines
            .iter()
            .map(|l| l.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        debug!(
            "pure-onnx-ocr: {} lines in {}ms",
            lines.len(),
            start.elapsed().as_millis()
        );
        Ok(text)
    }
}

/// Smallest x and y over the polygon's exterior.
fn top_left(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f32, f32) {
    polygon
        .exterior()
        .coords()
        .fold((f32::INFINITY, f32::INFINITY), |(x, y), c| {
            (x.min(c.x as f32), y.min(c.y as f32))
        })
}

/// Top-to-bottom in 20px bands, then left-to-right.
fn sort_reading_order(lines: &mut [Line]) {
    lines.sort_by(|a, b| {
        let row_a = (a.y / 20.0) as i32;
        let row_b = (b.y / 20.0) as i32;
        row_a
            .cmp(&row_b)
            .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(x: f32, y: f32, text: &str) -> Line {
        Line {
            x,
            y,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_reading_order() {
        let mut lines = vec![
            line(300.0, 105.0, "world"),
            line(10.0, 400.0, "second"),
            line(20.0, 100.0, "Hello"),
        ];
        sort_reading_order(&mut lines);
        let texts: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, ["Hello", "world", "second"]);
    }

    #[test]
    fn test_missing_models() {
        let dir = tempfile::tempdir().unwrap();
        let err = OnnxOcrEngine::from_dir(dir.path(), false).err().unwrap();
        assert!(matches!(err, OcrError::ModelLoad(_)));
    }
}
