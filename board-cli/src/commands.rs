//! Export and layout operations behind the CLI.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use board_core::{Board, BoardDocument};
use board_export::raster::font_database;
use board_export::{
    ChartEngine, CompositeOptions, Compositor, ExporterConfig, ResultCatalog, SnapshotExporter,
    Surface, SurfaceConfig, SvgChartEngine, SvgCompositor,
};

use crate::{ExportConfig, LayoutConfig};

fn load_board(path: &Path, viewport_width: Option<u32>) -> anyhow::Result<Board> {
    let document = BoardDocument::load(path)
        .with_context(|| format!("Failed to load board from {}", path.display()))?;
    let mut board = Board::from_document(document)?;
    if let Some(width) = viewport_width {
        board.set_viewport_width(width)?;
    }
    tracing::debug!(
        "Loaded {} widget(s) at {}px ({} columns)",
        board.len(),
        board.viewport_width(),
        board.columns()
    );
    Ok(board)
}

/// Render a board and export it, returning the written file.
///
/// # Errors
///
/// Returns an error if an input cannot be loaded, the export fails, or the
/// file cannot be written.
pub async fn run_export(config: &ExportConfig) -> anyhow::Result<PathBuf> {
    let board = load_board(&config.board, config.viewport_width)?;
    let catalog = ResultCatalog::load(&config.results)
        .with_context(|| format!("Failed to load results from {}", config.results.display()))?;
    tracing::info!("Loaded {} chart result(s)", catalog.len());

    let fonts = font_database(config.system_fonts);
    let engine = Arc::new(SvgChartEngine::new(catalog, Arc::clone(&fonts)));
    let compositor = Arc::new(SvgCompositor::new(fonts));

    let mut surface = Surface::render(
        &board,
        engine.as_ref(),
        SurfaceConfig::with_width(board.viewport_width()),
    );

    let exporter = SnapshotExporter::new(
        engine as Arc<dyn ChartEngine>,
        compositor as Arc<dyn Compositor>,
        board.gate().clone(),
        ExporterConfig {
            settle_delay: config.settle_delay,
            chart_scale: config.scale,
            composite: CompositeOptions {
                scale: config.scale,
                ..CompositeOptions::default()
            },
            ..ExporterConfig::default()
        },
    );

    let artifact = exporter.export(&mut surface, config.format).await?;
    for widget in &artifact.degraded {
        tracing::warn!("Chart widget {widget} was exported from its live rendering");
    }

    std::fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("Failed to create {}", config.out_dir.display()))?;
    let path = artifact
        .write_to(&config.out_dir)
        .with_context(|| format!("Failed to write {}", artifact.file_name))?;
    tracing::info!("Wrote {} ({} bytes)", path.display(), artifact.bytes.len());
    Ok(path)
}

/// Load a board, reproject it to the viewport width, and return its
/// document as pretty JSON.
///
/// # Errors
///
/// Returns an error if the board cannot be loaded or serialized.
pub fn run_layout(config: &LayoutConfig) -> anyhow::Result<String> {
    let board = load_board(&config.board, config.viewport_width)?;
    Ok(board.to_document().to_json()?)
}
