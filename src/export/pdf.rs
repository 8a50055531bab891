//! PDF export.
//!
//! The HTML report is handed to a [`DocumentRasterizer`], and the resulting
//! image becomes the single page of a document produced by a
//! [`DocumentBuilder`], sized to the image's pixel dimensions. Both are
//! capabilities supplied by the host; [`LopdfBuilder`] is the built-in
//! builder.

use std::io::Write;
use std::sync::Arc;

use anyhow::{ensure, Result};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use super::html::HtmlEncoder;
use super::{ReportEncoder, ReportFormat, ReportOptions};
use crate::compare::model::Report;
use crate::config::ExportConfig;
use crate::error::HashProofError;

/// An RGB8 raster, row-major, no padding
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RasterImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self { width, height, pixels }
    }

    /// Image filled with a single colour
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let pixels = rgb
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 3)
            .collect();
        Self { width, height, pixels }
    }

    fn check(&self) -> Result<()> {
        ensure!(self.width > 0 && self.height > 0, "rasterized image is empty");
        let expected = self.width as usize * self.height as usize * 3;
        ensure!(
            self.pixels.len() == expected,
            "pixel buffer holds {} bytes, expected {} for {}x{} RGB",
            self.pixels.len(),
            expected,
            self.width,
            self.height
        );
        Ok(())
    }
}

/// Page size in PDF user units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSize {
    pub width: u32,
    pub height: u32,
}

/// Renders an HTML document to a raster image
pub trait DocumentRasterizer: Send + Sync {
    fn rasterize(&self, document: &str, scale: f32, background: &str) -> Result<RasterImage>;
}

/// Embeds a raster image as a page of a document
pub trait DocumentBuilder: Send + Sync {
    fn build(&self, image: &RasterImage, page: PageSize) -> Result<Vec<u8>>;
}

pub struct PdfEncoder {
    rasterizer: Arc<dyn DocumentRasterizer>,
    builder: Arc<dyn DocumentBuilder>,
    config: ExportConfig,
}

impl PdfEncoder {
    pub fn new(
        rasterizer: impl DocumentRasterizer + 'static,
        builder: impl DocumentBuilder + 'static,
        config: ExportConfig,
    ) -> Self {
        Self {
            rasterizer: Arc::new(rasterizer),
            builder: Arc::new(builder),
            config,
        }
    }

    fn render(&self, report: &Report, options: &ReportOptions) -> Result<Vec<u8>> {
        let document = HtmlEncoder::render(report, options);
        let image = self.rasterizer.rasterize(
            &document,
            self.config.raster_scale,
            &self.config.raster_background,
        )?;
        image.check()?;

        let page = PageSize {
            width: image.width,
            height: image.height,
        };
        self.builder.build(&image, page)
    }
}

impl ReportEncoder for PdfEncoder {
    fn format(&self) -> ReportFormat {
        ReportFormat::Pdf
    }

    fn encode(&self, report: &Report, options: &ReportOptions) -> Result<Vec<u8>, HashProofError> {
        self.render(report, options)
            .map_err(|e| HashProofError::SerializationFailed {
                format: self.format().to_string(),
                reason: format!("{:#}", e),
            })
    }
}

/// One-page PDF holding the image as a Flate-compressed DeviceRGB XObject
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfBuilder;

impl DocumentBuilder for LopdfBuilder {
    fn build(&self, image: &RasterImage, page: PageSize) -> Result<Vec<u8>> {
        image.check()?;

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&image.pixels)?;
        let compressed = encoder.finish()?;

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => image.width as i64,
                "Height" => image.height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8_i64,
                "Filter" => "FlateDecode",
            },
            compressed,
        ));

        let width = Object::Integer(page.width as i64);
        let height = Object::Integer(page.height as i64);
        let zero = || Object::Integer(0);

        // Scale the unit image square up to the full page
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![width.clone(), zero(), zero(), height.clone(), zero(), zero()],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    "Im0" => image_id,
                },
            },
            "MediaBox" => vec![zero(), zero(), width, height],
        });

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1_i64,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)?;
        Ok(buffer)
    }
}
