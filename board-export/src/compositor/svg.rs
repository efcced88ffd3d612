//! Reference compositor: draws the surface as SVG, rasterizes it with resvg,
//! and encodes PNG, JPEG or a single-page PDF.

use std::fmt::Write;

use async_trait::async_trait;
use board_core::{TextAlign, TextBlock};

use super::{CompositeOptions, Compositor, ImageFormat, PageSize, RasterImage};
use crate::raster::{self, escape_xml, FontDatabase};
use crate::surface::{Frame, NodeBody, Surface, SurfaceNode};
use crate::{RenderError, RenderResult};

const CARD_FILL: &str = "#ffffff";
const CARD_STROKE: &str = "#e2e8f0";
const SELECTED_STROKE: &str = "#3b82f6";
const TEXT_COLOR: &str = "#1a202c";
const MUTED_COLOR: &str = "#718096";
const LINE_HEIGHT: f32 = 1.25;

/// Compositor that renders surfaces through an SVG intermediate.
#[derive(Clone)]
pub struct SvgCompositor {
    fonts: FontDatabase,
    jpeg_quality: u8,
    dpi: f32,
}

impl std::fmt::Debug for SvgCompositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SvgCompositor")
            .field("jpeg_quality", &self.jpeg_quality)
            .field("dpi", &self.dpi)
            .finish_non_exhaustive()
    }
}

impl SvgCompositor {
    /// Create a compositor with JPEG quality 95 and 96 DPI pages.
    #[must_use]
    pub fn new(fonts: FontDatabase) -> Self {
        Self {
            fonts,
            jpeg_quality: 95,
            dpi: 96.0,
        }
    }

    /// Set the JPEG quality (1-100).
    #[must_use]
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    /// Set the DPI used to size PDF pages.
    #[must_use]
    pub fn with_dpi(mut self, dpi: f32) -> Self {
        self.dpi = dpi.max(1.0);
        self
    }

    /// Draw the surface as an SVG document.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn render_svg(surface: &Surface, options: &CompositeOptions) -> String {
        let width = surface.width() as f32;
        let height = surface.height() as f32;
        let [r, g, b, a] = options.background;

        let mut svg = String::with_capacity(4096);
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {width} {height}\">",
            width * options.scale,
            height * options.scale,
        );
        let _ = write!(
            svg,
            "<rect width=\"{width}\" height=\"{height}\" fill=\"rgb({r},{g},{b})\" fill-opacity=\"{}\"/>",
            f32::from(a) / 255.0
        );

        for node in surface.nodes() {
            render_node(&mut svg, node, surface.config().card_padding as f32);
        }

        for image in surface.overlays() {
            let Frame {
                x,
                y,
                width,
                height,
            } = image.frame;
            let _ = write!(
                svg,
                "<image x=\"{x}\" y=\"{y}\" width=\"{width}\" height=\"{height}\" preserveAspectRatio=\"none\" xlink:href=\"{}\"/>",
                escape_xml(&image.src)
            );
        }

        svg.push_str("</svg>");
        svg
    }
}

fn render_node(svg: &mut String, node: &SurfaceNode, card_padding: f32) {
    let Frame {
        x,
        y,
        width,
        height,
    } = node.frame;
    let (stroke, stroke_width) = if node.selected {
        (SELECTED_STROKE, 2)
    } else {
        (CARD_STROKE, 1)
    };
    let _ = write!(
        svg,
        "<rect x=\"{x}\" y=\"{y}\" width=\"{width}\" height=\"{height}\" rx=\"8\" fill=\"{CARD_FILL}\" stroke=\"{stroke}\" stroke-width=\"{stroke_width}\"/>",
    );

    let content = node.frame.inset(card_padding, card_padding, card_padding, card_padding);
    match &node.body {
        NodeBody::Chart {
            chart,
            live,
            hidden,
            plot,
        } => {
            let _ = write!(
                svg,
                "<text x=\"{}\" y=\"{}\" font-size=\"16\" font-weight=\"600\" fill=\"{TEXT_COLOR}\">{}</text>",
                content.x,
                content.y + 16.0,
                escape_xml(&chart.title)
            );
            if live.is_none() {
                placeholder(svg, *plot, "Chart unavailable");
            } else if !hidden {
                // A live rendering cannot be read back; draw its outline.
                placeholder(svg, *plot, "(live)");
            }
        }
        NodeBody::Text(block) => render_text(svg, content, block, false),
        NodeBody::Title(block) => render_text(svg, content, block, true),
    }
}

fn placeholder(svg: &mut String, frame: Frame, label: &str) {
    if frame.is_empty() {
        return;
    }
    let Frame {
        x,
        y,
        width,
        height,
    } = frame;
    let _ = write!(
        svg,
        "<rect x=\"{x}\" y=\"{y}\" width=\"{width}\" height=\"{height}\" fill=\"none\" stroke=\"{CARD_STROKE}\" stroke-dasharray=\"4 4\"/>",
    );
    let _ = write!(
        svg,
        "<text x=\"{}\" y=\"{}\" font-size=\"12\" text-anchor=\"middle\" fill=\"{MUTED_COLOR}\">{}</text>",
        x + width / 2.0,
        y + height / 2.0,
        escape_xml(label)
    );
}

#[allow(clippy::cast_precision_loss)]
fn render_text(svg: &mut String, area: Frame, block: &TextBlock, bold: bool) {
    let size = block.font_size as f32;
    let (anchor, tx) = match block.align {
        TextAlign::Left => ("start", area.x),
        TextAlign::Center => ("middle", area.x + area.width / 2.0),
        TextAlign::Right => ("end", area.x + area.width),
    };
    let weight = if bold { "700" } else { "400" };

    let _ = write!(
        svg,
        "<text x=\"{tx}\" y=\"{}\" font-size=\"{size}\" font-weight=\"{weight}\" text-anchor=\"{anchor}\" fill=\"{TEXT_COLOR}\">",
        area.y + size
    );
    for (index, line) in block.content.lines().enumerate() {
        let dy = if index == 0 { 0.0 } else { size * LINE_HEIGHT };
        let _ = write!(
            svg,
            "<tspan x=\"{tx}\" dy=\"{dy}\">{}</tspan>",
            escape_xml(line)
        );
    }
    svg.push_str("</text>");
}

#[async_trait]
impl Compositor for SvgCompositor {
    async fn rasterize_subtree(
        &self,
        root: &Surface,
        options: &CompositeOptions,
    ) -> RenderResult<RasterImage> {
        let svg = Self::render_svg(root, options);
        let fonts = FontDatabase::clone(&self.fonts);
        tracing::debug!("Compositing {} byte SVG at scale {}", svg.len(), options.scale);

        tokio::task::spawn_blocking(move || {
            raster::rasterize_svg(&svg, &fonts).map(|pixmap| raster::pixmap_to_raster(&pixmap))
        })
        .await
        .map_err(|e| RenderError::Export(format!("Rasterization task failed: {e}")))?
    }

    fn encode_image(&self, image: &RasterImage, format: ImageFormat) -> RenderResult<Vec<u8>> {
        match format {
            ImageFormat::Png => raster::encode_png(image),
            ImageFormat::Jpeg => {
                raster::encode_jpeg(image, self.jpeg_quality, [255, 255, 255, 255])
            }
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn encode_document(&self, image: &RasterImage, page: PageSize) -> RenderResult<Vec<u8>> {
        let png_data = raster::encode_png(image)?;

        // Convert pixel dimensions to mm: pixels / dpi * 25.4
        let page_width_mm = page.width as f32 / self.dpi * 25.4;
        let page_height_mm = page.height as f32 / self.dpi * 25.4;

        let (doc, page1, layer1) = printpdf::PdfDocument::new(
            "Dashboard",
            printpdf::Mm(page_width_mm),
            printpdf::Mm(page_height_mm),
            "Dashboard",
        );
        let current_layer = doc.get_page(page1).get_layer(layer1);

        // Decode with printpdf's bundled image crate; PDF images carry no alpha.
        let decoded = printpdf::image_crate::load_from_memory(&png_data)
            .map_err(|e| RenderError::Export(format!("Failed to decode PNG for PDF: {e}")))?;
        let flattened = printpdf::image_crate::DynamicImage::ImageRgb8(decoded.to_rgb8());
        let pdf_image = printpdf::Image::from_dynamic_image(&flattened);

        let transform = printpdf::ImageTransform {
            translate_x: Some(printpdf::Mm(0.0)),
            translate_y: Some(printpdf::Mm(0.0)),
            dpi: Some(self.dpi),
            ..Default::default()
        };
        pdf_image.add_to_layer(current_layer, transform);

        tracing::debug!(
            "PDF page {page_width_mm:.1}x{page_height_mm:.1}mm ({:?})",
            page.orientation
        );
        doc.save_to_bytes()
            .map_err(|e| RenderError::Export(format!("PDF save failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::Orientation;

    fn image(width: u32, height: u32) -> RasterImage {
        RasterImage {
            width,
            height,
            rgba: [10, 20, 30, 255].repeat((width * height) as usize),
        }
    }

    #[test]
    fn test_jpeg_and_png_magic() {
        let compositor = SvgCompositor::new(raster::font_database(false));
        let png = compositor
            .encode_image(&image(4, 3), ImageFormat::Png)
            .expect("png");
        assert_eq!(&png[1..4], b"PNG");
        let jpeg = compositor
            .encode_image(&image(4, 3), ImageFormat::Jpeg)
            .expect("jpeg");
        assert_eq!(&jpeg[0..3], &[0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn test_pdf_document() {
        let compositor = SvgCompositor::new(raster::font_database(false));
        let raster = image(8, 4);
        let page = PageSize::fit(&raster);
        assert_eq!(page.orientation, Orientation::Landscape);
        let pdf = compositor.encode_document(&raster, page).expect("pdf");
        assert!(pdf.starts_with(b"%PDF"));
    }

    #[test]
    fn test_jpeg_quality_is_clamped() {
        let compositor = SvgCompositor::new(raster::font_database(false)).with_jpeg_quality(0);
        assert_eq!(compositor.jpeg_quality, 1);
    }
}
