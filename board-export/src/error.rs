//! Renderer and export error types.

use thiserror::Error;

/// Result type for rendering-engine and compositor operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Errors raised by the rendering engine or the compositor.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    /// A chart references a result the engine does not know.
    #[error("Failed to load resource: {0}")]
    Resource(String),

    /// The engine cannot rasterize this node right now (zero size, not ready).
    #[error("Frame render failed: {0}")]
    Frame(String),

    /// The chart type has no renderer.
    #[error("Unsupported chart type: {0}")]
    UnsupportedChart(String),

    /// Encoding the composited output failed.
    #[error("Export failed: {0}")]
    Export(String),
}

/// Errors surfaced by the snapshot exporter.
///
/// Per-widget rasterization failures never appear here; they are reported in
/// the artifact's degraded list instead.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Another export holds the gate.
    #[error("An export is already in progress")]
    Busy,

    /// There is nothing on the board to export.
    #[error("Board is empty")]
    EmptyBoard,

    /// Compositing or encoding failed. The board was restored before this
    /// error was returned.
    #[error("Compositing failed: {0}")]
    Compositing(#[source] RenderError),
}
