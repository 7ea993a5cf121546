//! PDF page access using lopdf.

use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, trace};

use super::raster::render_with_pdftoppm;
use super::{DocumentRenderer, PageSource, RasterBackend, Zoom};
use crate::error::{DocumentOpenError, PageError};
use crate::models::config::PdfConfig;

/// Opens PDF files with lopdf.
#[derive(Debug, Clone, Default)]
pub struct LopdfRenderer {
    config: PdfConfig,
}

impl LopdfRenderer {
    /// Create a renderer with the given PDF settings.
    pub fn new(config: PdfConfig) -> Self {
        Self { config }
    }

    /// Open a document and return the concrete handle.
    pub fn open_document(&self, path: &Path) -> Result<LopdfDocument, DocumentOpenError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => {
                return Err(DocumentOpenError::Parse {
                    path: path.to_path_buf(),
                    reason: "not a regular file".to_string(),
                });
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DocumentOpenError::NotFound(path.to_path_buf()));
            }
            Err(source) => {
                return Err(DocumentOpenError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }

        let mut document = Document::load(path).map_err(|e| DocumentOpenError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        if document.is_encrypted() {
            if !self.config.decrypt_empty_password || document.decrypt("").is_err() {
                return Err(DocumentOpenError::Encrypted(path.to_path_buf()));
            }
            debug!("Decrypted {} with empty password", path.display());
        }

        let pages: Vec<ObjectId> = document.get_pages().into_values().collect();
        debug!("Opened {} with {} pages", path.display(), pages.len());

        Ok(LopdfDocument {
            path: path.to_path_buf(),
            document,
            pages,
            backend: self.config.raster_backend,
            pdftoppm: self.config.pdftoppm_path.clone(),
        })
    }
}

impl DocumentRenderer for LopdfRenderer {
    fn open(&self, path: &Path) -> Result<Box<dyn PageSource>, DocumentOpenError> {
        Ok(Box::new(self.open_document(path)?))
    }
}

/// An opened PDF.
pub struct LopdfDocument {
    path: PathBuf,
    document: Document,
    /// Page object ids in page order.
    pages: Vec<ObjectId>,
    backend: RasterBackend,
    pdftoppm: PathBuf,
}

impl LopdfDocument {
    fn page_id(&self, index: usize) -> Result<ObjectId, PageError> {
        self.pages.get(index).copied().ok_or(PageError::InvalidPage(index))
    }

    /// Decode the largest image XObject on a page and scale it by `zoom`.
    fn render_embedded_image(&self, index: usize, zoom: Zoom) -> Result<DynamicImage, PageError> {
        let page_id = self.page_id(index)?;
        let image = self
            .page_images(page_id)
            .into_iter()
            .max_by_key(|img| u64::from(img.width()) * u64::from(img.height()))
            .ok_or_else(|| PageError::Rasterize(format!("no decodable image on page {}", index)))?;

        let width = ((image.width() as f32) * zoom.x).round().max(1.0) as u32;
        let height = ((image.height() as f32) * zoom.y).round().max(1.0) as u32;
        trace!(
            "Scaling page {} image {}x{} -> {}x{}",
            index,
            image.width(),
            image.height(),
            width,
            height
        );

        Ok(image.resize_exact(width, height, image::imageops::FilterType::Triangle))
    }

    fn page_images(&self, page_id: ObjectId) -> Vec<DynamicImage> {
        let doc = &self.document;
        let mut images = Vec::new();

        let Some(resources) = page_resources(doc, page_id) else {
            return images;
        };
        let Ok(xobjects) = resources.get(b"XObject") else {
            return images;
        };
        if let Ok((_, Object::Dictionary(xobj_dict))) = doc.dereference(xobjects) {
            for (_name, obj_ref) in xobj_dict.iter() {
                if let Ok((_, obj)) = doc.dereference(obj_ref) {
                    if let Some(img) = decode_image_object(doc, obj) {
                        images.push(img);
                    }
                }
            }
        }

        debug!("Decoded {} images on page object {:?}", images.len(), page_id);
        images
    }
}

impl PageSource for LopdfDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn embedded_text(&self, index: usize) -> Result<String, PageError> {
        if index >= self.pages.len() {
            return Err(PageError::InvalidPage(index));
        }
        // lopdf numbers pages from 1.
        self.document
            .extract_text(&[index as u32 + 1])
            .map_err(|e| PageError::TextExtraction(e.to_string()))
    }

    fn rasterize(&self, index: usize, zoom: Zoom) -> Result<DynamicImage, PageError> {
        self.page_id(index)?;
        match self.backend {
            RasterBackend::Pdftoppm => render_with_pdftoppm(&self.pdftoppm, &self.path, index, zoom),
            RasterBackend::EmbeddedImage => self.render_embedded_image(index, zoom),
        }
    }
}

/// Resources dictionary for a page, following `Parent` inheritance.
fn page_resources(doc: &Document, node_id: ObjectId) -> Option<Dictionary> {
    let Ok(Object::Dictionary(dict)) = doc.get_object(node_id) else {
        return None;
    };

    if let Ok(resources) = dict.get(b"Resources") {
        if let Ok((_, Object::Dictionary(res_dict))) = doc.dereference(resources) {
            return Some(res_dict.clone());
        }
    }

    match dict.get(b"Parent") {
        Ok(Object::Reference(parent_id)) => page_resources(doc, *parent_id),
        _ => None,
    }
}

fn decode_image_object(doc: &Document, obj: &Object) -> Option<DynamicImage> {
    let Object::Stream(stream) = obj else {
        return None;
    };
    let dict = &stream.dict;

    if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
        return None;
    }

    let width = dict.get(b"Width").ok()?.as_i64().ok()? as u32;
    let height = dict.get(b"Height").ok()?.as_i64().ok()? as u32;
    trace!("Found image object: {}x{}", width, height);

    if let Ok(filter) = dict.get(b"Filter") {
        let filter_name = match filter {
            Object::Name(name) => Some(name.as_slice()),
            Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
            _ => None,
        };

        match filter_name {
            Some(b"DCTDecode") => {
                return image::load_from_memory_with_format(&stream.content, image::ImageFormat::Jpeg)
                    .ok();
            }
            Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
                trace!("Unsupported image filter {:?}", filter_name.map(String::from_utf8_lossy));
                return None;
            }
            _ => {}
        }
    }

    let data = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());

    let color_space = dict
        .get(b"ColorSpace")
        .ok()
        .and_then(|o| match o {
            Object::Name(name) => Some(name.as_slice()),
            Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
            Object::Reference(r) => doc.get_object(*r).ok().and_then(|o| o.as_name().ok()),
            _ => None,
        })
        .unwrap_or(b"DeviceRGB");

    let bits = dict
        .get(b"BitsPerComponent")
        .ok()
        .and_then(|o| o.as_i64().ok())
        .unwrap_or(8);

    decode_raw(&data, width, height, color_space, bits)
}

fn decode_raw(
    data: &[u8],
    width: u32,
    height: u32,
    color_space: &[u8],
    bits_per_component: i64,
) -> Option<DynamicImage> {
    if bits_per_component != 8 {
        trace!("Unsupported bits per component: {}", bits_per_component);
        return None;
    }

    let pixels = (width as usize).checked_mul(height as usize)?;

    match color_space {
        b"DeviceRGB" | b"RGB" => {
            let len = pixels.checked_mul(3)?;
            let buf = data.get(..len)?.to_vec();
            RgbImage::from_raw(width, height, buf).map(DynamicImage::ImageRgb8)
        }
        b"DeviceGray" | b"G" => {
            let buf = data.get(..pixels)?.to_vec();
            GrayImage::from_raw(width, height, buf).map(DynamicImage::ImageLuma8)
        }
        other => {
            trace!("Unsupported color space: {}", String::from_utf8_lossy(other));
            None
        }
    }
}
