//! Chart rendering engine boundary.
//!
//! The engine owns live, interactive chart renderings. The board only asks it
//! to mount a chart and, during export, to rasterize a mounted chart at its
//! current size.

#[cfg(feature = "svg")]
pub mod svg;

use async_trait::async_trait;
use board_core::ChartRef;

use crate::RenderResult;

/// Handle to a live chart rendering owned by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LiveNode {
    /// Engine-assigned handle.
    pub handle: u64,
    /// Result the rendering displays.
    pub result_id: String,
}

/// Size of a requested raster, in CSS pixels plus a device scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterRequest {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Device pixel ratio for the output.
    pub scale: f32,
}

/// A rendering engine for chart widgets.
#[async_trait]
pub trait ChartEngine: Send + Sync {
    /// Mount a live rendering for a chart.
    ///
    /// # Errors
    ///
    /// Returns an error if the chart cannot be displayed (e.g. unknown result).
    fn mount(&self, chart: &ChartRef) -> RenderResult<LiveNode>;

    /// Rasterize a live rendering at the requested size.
    ///
    /// Returns the image as a `data:` URI.
    ///
    /// # Errors
    ///
    /// Returns an error if this node cannot be rasterized right now. Failures
    /// are independent per node.
    async fn rasterize(&self, node: &LiveNode, request: RasterRequest) -> RenderResult<String>;
}
