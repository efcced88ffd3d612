//! Compositing boundary: flatten a surface into a raster, then encode it.

#[cfg(feature = "svg")]
pub mod svg;

use async_trait::async_trait;

use crate::{RenderResult, Surface};

/// Options for rasterizing a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeOptions {
    /// Device scale factor (2.0 doubles the pixel dimensions).
    pub scale: f32,
    /// Background color as RGBA bytes.
    pub background: [u8; 4],
}

impl Default for CompositeOptions {
    fn default() -> Self {
        Self {
            scale: 2.0,
            background: [255, 255, 255, 255],
        }
    }
}

/// A composited raster with straight (non-premultiplied) RGBA pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major RGBA bytes, `width * height * 4` long.
    pub rgba: Vec<u8>,
}

/// Raster encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG image.
    Png,
    /// JPEG image.
    Jpeg,
}

impl ImageFormat {
    /// MIME type.
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

/// Page orientation of a document export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Taller than wide (or square).
    Portrait,
    /// Wider than tall.
    Landscape,
}

/// Page dimensions for a document export, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSize {
    /// Page width in pixels.
    pub width: u32,
    /// Page height in pixels.
    pub height: u32,
    /// Orientation implied by the dimensions.
    pub orientation: Orientation,
}

impl PageSize {
    /// A page exactly the size of the image.
    #[must_use]
    pub fn fit(image: &RasterImage) -> Self {
        let orientation = if image.width > image.height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        };
        Self {
            width: image.width,
            height: image.height,
            orientation,
        }
    }
}

/// Turns a rendered surface into a raster and encodes rasters.
#[async_trait]
pub trait Compositor: Send + Sync {
    /// Rasterize the surface exactly as it is currently displayed.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot be rasterized.
    async fn rasterize_subtree(
        &self,
        root: &Surface,
        options: &CompositeOptions,
    ) -> RenderResult<RasterImage>;

    /// Encode a raster as an image file.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    fn encode_image(&self, image: &RasterImage, format: ImageFormat) -> RenderResult<Vec<u8>>;

    /// Encode a raster as a single-page document.
    ///
    /// # Errors
    ///
    /// Returns an error if document generation fails.
    fn encode_document(&self, image: &RasterImage, page: PageSize) -> RenderResult<Vec<u8>>;

    /// Encode a raster as a `data:` URI.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    fn to_data_url(&self, image: &RasterImage, format: ImageFormat) -> RenderResult<String> {
        let bytes = self.encode_image(image, format)?;
        Ok(data_url(format.mime(), &bytes))
    }
}

/// Build a base64 `data:` URI.
#[must_use]
pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    use base64::Engine as _;
    format!(
        "data:{mime};base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_orientation() {
        let wide = RasterImage {
            width: 200,
            height: 100,
            rgba: vec![0; 200 * 100 * 4],
        };
        assert_eq!(PageSize::fit(&wide).orientation, Orientation::Landscape);

        let tall = RasterImage {
            width: 100,
            height: 200,
            rgba: vec![0; 100 * 200 * 4],
        };
        assert_eq!(PageSize::fit(&tall).orientation, Orientation::Portrait);
    }

    #[test]
    fn test_data_url() {
        assert_eq!(data_url("image/png", b"abc"), "data:image/png;base64,YWJj");
    }
}
