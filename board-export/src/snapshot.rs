//! Snapshot/restore export protocol.
//!
//! Exporting freezes every live chart into a static image, composites the
//! surface, and puts every live chart back. The surface compares equal to its
//! pre-export state whenever [`SnapshotExporter::export`] returns, whatever
//! the outcome. This also holds when the export future is dropped mid-flight.
//!
//! ```text
//! acquire gate ──> rasterize charts (concurrently) ──> hide live + insert image
//!       │                                                       │
//!       │                                        settle delay ──┤
//!       │                                                       v
//!   release gate <── restore (always) <────────────────── composite
//! ```

use std::collections::HashMap;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use board_core::{ExportGate, WidgetId};

use crate::compositor::{data_url, CompositeOptions, Compositor, ImageFormat, PageSize};
use crate::engine::{ChartEngine, RasterRequest};
use crate::surface::{ImageHandle, NodeHandle, Surface};
use crate::{ExportError, ExportResult, RenderResult};

/// Output formats for a board export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// PNG image.
    Png,
    /// JPEG image.
    Jpeg,
    /// Single-page PDF document.
    Pdf,
}

impl ExportFormat {
    /// File extension.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Pdf => "pdf",
        }
    }

    /// MIME type.
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Pdf => "application/pdf",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "pdf" => Ok(Self::Pdf),
            _ => Err(format!("Unknown export format: {s}")),
        }
    }
}

/// Exporter configuration.
#[derive(Debug, Clone)]
pub struct ExporterConfig {
    /// Pause between freezing charts and compositing, so inserted images are
    /// laid out before the compositor reads the surface.
    pub settle_delay: Duration,
    /// Device scale for per-chart rasters.
    pub chart_scale: f32,
    /// Compositor options.
    pub composite: CompositeOptions,
    /// Base name of the produced file.
    pub file_stem: String,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(100),
            chart_scale: 2.0,
            composite: CompositeOptions::default(),
            file_stem: "dashboard".to_string(),
        }
    }
}

/// A finished export.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    /// Output format.
    pub format: ExportFormat,
    /// Suggested file name (`dashboard.png`, ...).
    pub file_name: String,
    /// Encoded file contents.
    pub bytes: Vec<u8>,
    /// Number of charts that were composited from a static image.
    pub frozen: usize,
    /// Charts that stayed live because rasterizing them failed.
    pub degraded: Vec<WidgetId>,
}

impl ExportArtifact {
    /// MIME type of the contents.
    #[must_use]
    pub fn mime(&self) -> &'static str {
        self.format.mime()
    }

    /// The contents as a `data:` URI.
    #[must_use]
    pub fn data_url(&self) -> String {
        data_url(self.mime(), &self.bytes)
    }

    /// Write the file into `dir` under its suggested name.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> std::io::Result<PathBuf> {
        let path = dir.as_ref().join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// Temporary state for one frozen chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SnapshotEntry {
    original: NodeHandle,
    temporary: ImageHandle,
}

/// Exclusive access to a surface while charts are frozen.
///
/// Every frozen chart is recorded in an arena keyed by widget id. The arena
/// is drained by [`SnapshotGuard::restore`], and again on drop, so an early
/// return, a panic, or a cancelled export still leaves the surface as it was.
pub struct SnapshotGuard<'a> {
    surface: &'a mut Surface,
    arena: HashMap<WidgetId, SnapshotEntry>,
}

impl<'a> SnapshotGuard<'a> {
    /// Take exclusive access to a surface.
    #[must_use]
    pub fn new(surface: &'a mut Surface) -> Self {
        Self {
            surface,
            arena: HashMap::new(),
        }
    }

    /// Hide a chart's live rendering and insert a static image in its place.
    ///
    /// Returns `false` if the node is not a chart or the widget is already
    /// frozen.
    pub fn freeze(&mut self, widget_id: WidgetId, node: NodeHandle, src: String) -> bool {
        if self.arena.contains_key(&widget_id) {
            return false;
        }
        if !self.surface.hide(node) {
            return false;
        }
        let Some(temporary) = self.surface.insert_image(node, src) else {
            self.surface.show(node);
            return false;
        };
        self.arena.insert(
            widget_id,
            SnapshotEntry {
                original: node,
                temporary,
            },
        );
        true
    }

    /// Number of charts currently frozen.
    #[must_use]
    pub fn frozen(&self) -> usize {
        self.arena.len()
    }

    /// Remove every inserted image and re-show every hidden live rendering.
    ///
    /// Returns how many charts were restored. Calling it again is a no-op.
    pub fn restore(&mut self) -> usize {
        let count = self.arena.len();
        for (widget_id, entry) in self.arena.drain() {
            let removed = self.surface.remove_image(entry.temporary);
            let shown = self.surface.show(entry.original);
            if !(removed && shown) {
                tracing::error!(
                    "Snapshot entry for widget {widget_id} was incomplete (image removed: {removed}, shown: {shown})"
                );
            }
        }
        count
    }
}

impl Deref for SnapshotGuard<'_> {
    type Target = Surface;

    fn deref(&self) -> &Surface {
        self.surface
    }
}

impl Drop for SnapshotGuard<'_> {
    fn drop(&mut self) {
        if !self.arena.is_empty() {
            tracing::warn!(
                "Export interrupted, restoring {} frozen chart(s)",
                self.arena.len()
            );
            self.restore();
        }
    }
}

/// Orchestrates the snapshot/restore export of a rendered board.
///
/// The exporter never rasterizes or encodes anything itself; it decides when
/// the chart engine and compositor run and what surface state they observe.
#[derive(Clone)]
pub struct SnapshotExporter {
    engine: Arc<dyn ChartEngine>,
    compositor: Arc<dyn Compositor>,
    gate: ExportGate,
    config: ExporterConfig,
}

impl std::fmt::Debug for SnapshotExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotExporter")
            .field("gate", &self.gate)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SnapshotExporter {
    /// Create an exporter.
    ///
    /// Pass the board's gate (`board.gate().clone()`) so that board edits
    /// are rejected while an export runs.
    #[must_use]
    pub fn new(
        engine: Arc<dyn ChartEngine>,
        compositor: Arc<dyn Compositor>,
        gate: ExportGate,
        config: ExporterConfig,
    ) -> Self {
        Self {
            engine,
            compositor,
            gate,
            config,
        }
    }

    /// Whether an export is running.
    #[must_use]
    pub fn is_exporting(&self) -> bool {
        self.gate.is_busy()
    }

    /// Exporter configuration.
    #[must_use]
    pub fn config(&self) -> &ExporterConfig {
        &self.config
    }

    /// Export a surface.
    ///
    /// # Errors
    ///
    /// - [`ExportError::Busy`] if another export is running. Nothing is
    ///   touched and the call returns immediately.
    /// - [`ExportError::EmptyBoard`] if the surface has no widgets.
    /// - [`ExportError::Compositing`] if compositing or encoding failed. The
    ///   surface has already been restored when this is returned.
    #[tracing::instrument(name = "export", skip(self, surface), fields(nodes = surface.nodes().len()))]
    pub async fn export(
        &self,
        surface: &mut Surface,
        format: ExportFormat,
    ) -> ExportResult<ExportArtifact> {
        // Declared first so it is released last, after the guard restores.
        let Some(_permit) = self.gate.try_acquire() else {
            tracing::warn!("Export rejected: another export is in progress");
            return Err(ExportError::Busy);
        };
        if surface.is_empty() {
            return Err(ExportError::EmptyBoard);
        }

        let mut guard = SnapshotGuard::new(surface);
        let degraded = self.freeze_charts(&mut guard).await;
        let frozen = guard.frozen();

        tokio::time::sleep(self.config.settle_delay).await;

        let composited = self.composite(&guard, format).await;
        let restored = guard.restore();
        drop(guard);
        tracing::debug!("Restored {restored} chart(s) after compositing");

        let bytes = composited.map_err(|e| {
            tracing::error!("Export failed: {e}");
            ExportError::Compositing(e)
        })?;

        tracing::info!(
            "Exported {} ({} bytes, {frozen} frozen, {} live)",
            format.extension(),
            bytes.len(),
            degraded.len()
        );
        Ok(ExportArtifact {
            format,
            file_name: format!("{}.{}", self.config.file_stem, format.extension()),
            bytes,
            frozen,
            degraded,
        })
    }

    /// Rasterize every live chart concurrently and freeze the successes.
    ///
    /// Returns the widgets whose rasterization failed.
    async fn freeze_charts(&self, guard: &mut SnapshotGuard<'_>) -> Vec<WidgetId> {
        let charts = guard.live_charts();
        let attempts = charts.iter().map(|chart| {
            let request = raster_request(chart.plot.width, chart.plot.height, self.config.chart_scale);
            self.engine.rasterize(&chart.live, request)
        });
        let results = futures::future::join_all(attempts).await;

        let mut degraded = Vec::new();
        for (chart, result) in charts.into_iter().zip(results) {
            match result {
                Ok(src) => {
                    if !guard.freeze(chart.widget_id, chart.node, src) {
                        degraded.push(chart.widget_id);
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        "Chart widget {} stays live in export: {}",
                        chart.widget_id,
                        e
                    );
                    degraded.push(chart.widget_id);
                }
            }
        }
        degraded
    }

    async fn composite(&self, surface: &Surface, format: ExportFormat) -> RenderResult<Vec<u8>> {
        let image = self
            .compositor
            .rasterize_subtree(surface, &self.config.composite)
            .await?;
        match format {
            ExportFormat::Png => self.compositor.encode_image(&image, ImageFormat::Png),
            ExportFormat::Jpeg => self.compositor.encode_image(&image, ImageFormat::Jpeg),
            ExportFormat::Pdf => self
                .compositor
                .encode_document(&image, PageSize::fit(&image)),
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn raster_request(width: f32, height: f32, scale: f32) -> RasterRequest {
    RasterRequest {
        width: width.max(0.0).round() as u32,
        height: height.max(0.0).round() as u32,
        scale,
    }
}
