//! SVG rasterization helpers shared by the reference engine and compositor.

use std::sync::Arc;

use image::ImageEncoder;

use crate::compositor::RasterImage;
use crate::error::{RenderError, RenderResult};

/// Font database handed to usvg.
pub type FontDatabase = Arc<usvg::fontdb::Database>;

/// Build a font database, optionally populated with the system fonts.
///
/// Without fonts, text elements are skipped by the rasterizer.
#[must_use]
pub fn font_database(load_system_fonts: bool) -> FontDatabase {
    let mut db = usvg::fontdb::Database::new();
    if load_system_fonts {
        db.load_system_fonts();
        tracing::debug!("Loaded {} font face(s)", db.len());
    }
    Arc::new(db)
}

/// Rasterize an SVG string to a tiny-skia Pixmap.
///
/// # Errors
///
/// Returns an error if the SVG cannot be parsed.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn rasterize_svg(svg: &str, fonts: &FontDatabase) -> RenderResult<tiny_skia::Pixmap> {
    let mut opt = usvg::Options::default();
    opt.fontdb = Arc::clone(fonts);
    let tree = usvg::Tree::from_str(svg, &opt)
        .map_err(|e| RenderError::Export(format!("SVG parsing failed: {e}")))?;

    let px_w = tree.size().width().ceil() as u32;
    let px_h = tree.size().height().ceil() as u32;

    let mut pixmap = tiny_skia::Pixmap::new(px_w.max(1), px_h.max(1))
        .ok_or_else(|| RenderError::Export("Failed to create pixmap".to_string()))?;

    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    Ok(pixmap)
}

/// Convert a premultiplied pixmap to a straight-alpha raster.
#[must_use]
pub fn pixmap_to_raster(pixmap: &tiny_skia::Pixmap) -> RasterImage {
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    RasterImage {
        width: pixmap.width(),
        height: pixmap.height(),
        rgba,
    }
}

/// Encode a raster as PNG.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn encode_png(image: &RasterImage) -> RenderResult<Vec<u8>> {
    let mut buf = std::io::Cursor::new(Vec::new());
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(
            &image.rgba,
            image.width,
            image.height,
            image::ColorType::Rgba8.into(),
        )
        .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))?;
    Ok(buf.into_inner())
}

/// Encode a raster as JPEG, flattening alpha onto `background`.
///
/// # Errors
///
/// Returns an error if encoding fails.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn encode_jpeg(image: &RasterImage, quality: u8, background: [u8; 4]) -> RenderResult<Vec<u8>> {
    let mut rgb = Vec::with_capacity(image.rgba.len() / 4 * 3);
    for pixel in image.rgba.chunks_exact(4) {
        let alpha = f32::from(pixel[3]) / 255.0;
        let inv = 1.0 - alpha;
        for channel in 0..3 {
            let value = f32::from(pixel[channel]).mul_add(alpha, f32::from(background[channel]) * inv);
            rgb.push(value.round() as u8);
        }
    }

    let mut buf = std::io::Cursor::new(Vec::new());
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality)
        .write_image(&rgb, image.width, image.height, image::ColorType::Rgb8.into())
        .map_err(|e| RenderError::Export(format!("JPEG encoding failed: {e}")))?;
    Ok(buf.into_inner())
}

/// Escape special XML characters.
#[must_use]
pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
