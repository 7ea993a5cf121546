//! Image cleanup applied to rasterized pages before OCR.

use image::{DynamicImage, GrayImage, Luma};
use imageproc::contrast::otsu_level;
use imageproc::filter::gaussian_blur_f32;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::config::PreprocessConfig;

/// Binarization strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PreprocessMode {
    /// Smooth, then threshold against the local mean.
    Adaptive,
    /// Smooth, boost contrast, then threshold at one global level.
    Fixed,
    /// Grayscale only.
    None,
}

/// Image preprocessor for the OCR fallback.
///
/// Every operation keeps the image dimensions unchanged.
#[derive(Debug, Clone, Default)]
pub struct ImagePreprocessor {
    config: PreprocessConfig,
}

impl ImagePreprocessor {
    /// Create a preprocessor with the given settings.
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }

    /// Run the configured chain and return a single-channel image.
    pub fn prepare(&self, image: &DynamicImage) -> DynamicImage {
        let gray = self.to_grayscale(image);

        let processed = match self.config.mode {
            PreprocessMode::None => gray,
            PreprocessMode::Adaptive => {
                let smoothed = self.smooth(&gray);
                self.adaptive_threshold(&smoothed)
            }
            PreprocessMode::Fixed => {
                let smoothed = self.smooth(&gray);
                let boosted = self.boost_contrast(&smoothed, self.config.contrast);
                let level = self.config.fixed_level.unwrap_or_else(|| otsu_level(&boosted));
                self.binarize(&boosted, level)
            }
        };

        debug!(
            "Preprocessed {}x{} image with {:?}",
            processed.width(),
            processed.height(),
            self.config.mode
        );
        DynamicImage::ImageLuma8(processed)
    }

    /// Convert to 8-bit grayscale.
    pub fn to_grayscale(&self, image: &DynamicImage) -> GrayImage {
        image.to_luma8()
    }

    /// Gaussian smoothing to reduce scan noise. A sigma of zero is a no-op.
    pub fn smooth(&self, image: &GrayImage) -> GrayImage {
        if self.config.blur_sigma <= 0.0 {
            return image.clone();
        }
        gaussian_blur_f32(image, self.config.blur_sigma)
    }

    /// Stretch intensities away from the image mean by `factor`.
    pub fn boost_contrast(&self, image: &GrayImage, factor: f32) -> GrayImage {
        let count = (image.width() as u64 * image.height() as u64).max(1);
        let sum: u64 = image.pixels().map(|p| p[0] as u64).sum();
        let mean = sum as f32 / count as f32;

        let mut result = image.clone();
        for pixel in result.pixels_mut() {
            let value = (pixel[0] as f32 - mean) * factor + mean;
            pixel[0] = value.round().clamp(0.0, 255.0) as u8;
        }
        result
    }

    /// Two-level image: pixels above `level` become white, the rest black.
    pub fn binarize(&self, image: &GrayImage, level: u8) -> GrayImage {
        let mut result = image.clone();
        for pixel in result.pixels_mut() {
            pixel[0] = if pixel[0] > level { 255 } else { 0 };
        }
        result
    }

    /// Local-mean thresholding.
    ///
    /// A pixel becomes black when it is darker than the mean of its
    /// `block_radius` neighbourhood minus `offset`.
    pub fn adaptive_threshold(&self, image: &GrayImage) -> GrayImage {
        let (width, height) = image.dimensions();
        let radius = self.config.block_radius.max(1);
        let integral = IntegralImage::new(image);

        let mut result = GrayImage::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let mean = integral.mean(x, y, radius) as i32;
                let threshold = (mean - self.config.offset).clamp(0, 255);
                let value = image.get_pixel(x, y)[0] as i32;
                let output = if value < threshold { 0 } else { 255 };
                result.put_pixel(x, y, Luma([output]));
            }
        }

        result
    }
}

/// Summed-area table for constant-time window means.
struct IntegralImage {
    width: u32,
    height: u32,
    /// `(width + 1) * (height + 1)` running sums, zero first row and column.
    sums: Vec<u64>,
}

impl IntegralImage {
    fn new(image: &GrayImage) -> Self {
        let (width, height) = image.dimensions();
        let stride = width as usize + 1;
        let mut sums = vec![0u64; stride * (height as usize + 1)];

        for y in 0..height as usize {
            let mut row = 0u64;
            for x in 0..width as usize {
                row += image.get_pixel(x as u32, y as u32)[0] as u64;
                sums[(y + 1) * stride + x + 1] = sums[y * stride + x + 1] + row;
            }
        }

        Self { width, height, sums }
    }

    fn mean(&self, x: u32, y: u32, radius: u32) -> u64 {
        let stride = self.width as usize + 1;
        let x0 = x.saturating_sub(radius) as usize;
        let y0 = y.saturating_sub(radius) as usize;
        let x1 = x.saturating_add(radius).saturating_add(1).min(self.width) as usize;
        let y1 = y.saturating_add(radius).saturating_add(1).min(self.height) as usize;

        let total = self.sums[y1 * stride + x1] + self.sums[y0 * stride + x0]
            - self.sums[y0 * stride + x1]
            - self.sums[y1 * stride + x0];
        let count = ((x1 - x0) * (y1 - y0)) as u64;
        total / count.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn preprocessor(mode: PreprocessMode) -> ImagePreprocessor {
        ImagePreprocessor::new(PreprocessConfig {
            mode,
            ..PreprocessConfig::default()
        })
    }

    /// Light page with a dark 4x4 square in the middle.
    fn page_with_mark() -> GrayImage {
        GrayImage::from_fn(40, 30, |x, y| {
            if (18..22).contains(&x) && (13..17).contains(&y) {
                Luma([30])
            } else {
                Luma([200])
            }
        })
    }

    #[test]
    fn test_prepare_keeps_dimensions() {
        let rgb = DynamicImage::ImageRgb8(RgbImage::from_pixel(37, 23, Rgb([120, 130, 140])));
        for mode in [PreprocessMode::Adaptive, PreprocessMode::Fixed, PreprocessMode::None] {
            let out = preprocessor(mode).prepare(&rgb);
            assert_eq!((out.width(), out.height()), (37, 23));
            assert!(matches!(out, DynamicImage::ImageLuma8(_)));
        }
    }

    #[test]
    fn test_adaptive_threshold_huge_radius_covers_whole_image() {
        let pre = ImagePreprocessor::new(PreprocessConfig {
            block_radius: u32::MAX,
            ..PreprocessConfig::default()
        });
        let image = GrayImage::from_pixel(4, 4, Luma([180]));
        let out = pre.adaptive_threshold(&image);
        assert!(out.pixels().all(|p| p[0] == 255));
    }

    #[test]
    fn test_adaptive_threshold_marks_dark_region() {
        let out = preprocessor(PreprocessMode::Adaptive).adaptive_threshold(&page_with_mark());
        assert_eq!(out.get_pixel(20, 15)[0], 0);
        assert_eq!(out.get_pixel(2, 2)[0], 255);
    }

    #[test]
    fn test_adaptive_threshold_uniform_image_is_white() {
        let flat = GrayImage::from_pixel(10, 10, Luma([90]));
        let out = preprocessor(PreprocessMode::Adaptive).adaptive_threshold(&flat);
        assert!(out.pixels().all(|p| p[0] == 255));
    }

    #[test]
    fn test_binarize_is_two_level() {
        let gradient = GrayImage::from_fn(256, 1, |x, _| Luma([x as u8]));
        let out = preprocessor(PreprocessMode::Fixed).binarize(&gradient, 128);
        assert!(out.pixels().all(|p| p[0] == 0 || p[0] == 255));
        assert_eq!(out.get_pixel(128, 0)[0], 0);
        assert_eq!(out.get_pixel(129, 0)[0], 255);
    }

    #[test]
    fn test_boost_contrast_spreads_values() {
        let image = GrayImage::from_fn(2, 1, |x, _| Luma([if x == 0 { 100 } else { 150 }]));
        let out = preprocessor(PreprocessMode::Fixed).boost_contrast(&image, 2.0);
        assert_eq!(out.get_pixel(0, 0)[0], 75);
        assert_eq!(out.get_pixel(1, 0)[0], 175);
    }

    #[test]
    fn test_fixed_mode_separates_mark_from_background() {
        let image = DynamicImage::ImageLuma8(page_with_mark());
        let out = preprocessor(PreprocessMode::Fixed).prepare(&image).to_luma8();
        assert_eq!(out.get_pixel(20, 15)[0], 0);
        assert_eq!(out.get_pixel(0, 0)[0], 255);
    }

    #[test]
    fn test_zero_sigma_skips_smoothing() {
        let p = ImagePreprocessor::new(PreprocessConfig {
            blur_sigma: 0.0,
            ..PreprocessConfig::default()
        });
        let image = page_with_mark();
        assert_eq!(p.smooth(&image), image);
    }
}
