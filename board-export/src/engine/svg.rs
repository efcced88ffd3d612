//! Reference chart engine: draws results as SVG and rasterizes them with resvg.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use board_core::ChartRef;
use serde::{Deserialize, Serialize};

use super::{ChartEngine, LiveNode, RasterRequest};
use crate::chart::{render_chart_svg, ChartResult, ChartType};
use crate::compositor::data_url;
use crate::raster::{self, FontDatabase};
use crate::{RenderError, RenderResult};

/// Computed results by id, as loaded from a results file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultCatalog {
    results: HashMap<String, ChartResult>,
}

impl ResultCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a result.
    pub fn insert(&mut self, id: impl Into<String>, result: ChartResult) {
        self.results.insert(id.into(), result);
    }

    /// Look up a result.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ChartResult> {
        self.results.get(id)
    }

    /// Number of results.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Parse a catalog from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> RenderResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| RenderError::Resource(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
            .map_err(|e| RenderError::Resource(format!("{}: {e}", path.display())))
    }
}

/// Chart engine backed by a [`ResultCatalog`].
pub struct SvgChartEngine {
    catalog: ResultCatalog,
    fonts: FontDatabase,
    next_handle: AtomicU64,
}

impl std::fmt::Debug for SvgChartEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SvgChartEngine")
            .field("results", &self.catalog.len())
            .finish_non_exhaustive()
    }
}

impl SvgChartEngine {
    /// Create an engine over a catalog.
    #[must_use]
    pub fn new(catalog: ResultCatalog, fonts: FontDatabase) -> Self {
        Self {
            catalog,
            fonts,
            next_handle: AtomicU64::new(1),
        }
    }

    fn result(&self, result_id: &str) -> RenderResult<&ChartResult> {
        self.catalog
            .get(result_id)
            .ok_or_else(|| RenderError::Resource(format!("Unknown result: {result_id}")))
    }
}

#[async_trait]
impl ChartEngine for SvgChartEngine {
    fn mount(&self, chart: &ChartRef) -> RenderResult<LiveNode> {
        let result = self.result(&chart.result_id)?;
        result
            .chart_type
            .parse::<ChartType>()
            .map_err(RenderError::UnsupportedChart)?;

        let handle = self.next_handle.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("Mounted result {} as live node {handle}", chart.result_id);
        Ok(LiveNode {
            handle,
            result_id: chart.result_id.clone(),
        })
    }

    #[allow(clippy::cast_precision_loss)]
    async fn rasterize(&self, node: &LiveNode, request: RasterRequest) -> RenderResult<String> {
        if request.width == 0 || request.height == 0 {
            return Err(RenderError::Frame(format!(
                "Live node {} has no area ({}x{})",
                node.handle, request.width, request.height
            )));
        }
        let result = self
            .result(&node.result_id)
            .map_err(|e| RenderError::Frame(e.to_string()))?
            .clone();
        let fonts = FontDatabase::clone(&self.fonts);

        // resvg and PNG encoding are CPU-bound; keep them off the async workers
        // so concurrent rasterizations overlap.
        tokio::task::spawn_blocking(move || {
            let svg = render_chart_svg(
                &result,
                request.width as f32,
                request.height as f32,
                request.scale,
            )
            .map_err(RenderError::UnsupportedChart)?;
            let pixmap = raster::rasterize_svg(&svg, &fonts)?;
            let png = raster::encode_png(&raster::pixmap_to_raster(&pixmap))?;
            Ok(data_url("image/png", &png))
        })
        .await
        .map_err(|e| RenderError::Frame(format!("Rasterization task failed: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> SvgChartEngine {
        let catalog = ResultCatalog::from_json(
            r#"{
                "sales": { "chart_type": "bar", "data": { "labels": ["a", "b"], "values": [1, 2] } },
                "radar": { "chart_type": "radar", "data": {} }
            }"#,
        )
        .expect("catalog");
        SvgChartEngine::new(catalog, raster::font_database(false))
    }

    #[test]
    fn test_mount_known_result() {
        let engine = engine();
        let first = engine.mount(&ChartRef::new("sales", "Sales")).expect("mount");
        let second = engine.mount(&ChartRef::new("sales", "Sales")).expect("mount");
        assert_ne!(first.handle, second.handle);
        assert_eq!(first.result_id, "sales");
    }

    #[test]
    fn test_mount_rejects_unknown_and_unsupported() {
        let engine = engine();
        assert!(matches!(
            engine.mount(&ChartRef::new("missing", "x")),
            Err(RenderError::Resource(_))
        ));
        assert!(matches!(
            engine.mount(&ChartRef::new("radar", "x")),
            Err(RenderError::UnsupportedChart(_))
        ));
    }

    #[tokio::test]
    async fn test_rasterize_produces_png_data_url() {
        let engine = engine();
        let node = engine.mount(&ChartRef::new("sales", "Sales")).expect("mount");
        let src = engine
            .rasterize(
                &node,
                RasterRequest {
                    width: 40,
                    height: 20,
                    scale: 2.0,
                },
            )
            .await
            .expect("rasterize");
        assert!(src.starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn test_concurrent_rasterizations_all_complete() {
        let engine = engine();
        let nodes: Vec<LiveNode> = (0..4)
            .map(|_| engine.mount(&ChartRef::new("sales", "Sales")).expect("mount"))
            .collect();
        let request = RasterRequest {
            width: 60,
            height: 30,
            scale: 1.0,
        };
        let results =
            futures::future::join_all(nodes.iter().map(|n| engine.rasterize(n, request))).await;
        assert_eq!(results.len(), 4);
        assert!(results
            .iter()
            .all(|r| r.as_ref().is_ok_and(|src| src.starts_with("data:image/png"))));
    }

    #[tokio::test]
    async fn test_rasterize_zero_area_fails() {
        let engine = engine();
        let node = engine.mount(&ChartRef::new("sales", "Sales")).expect("mount");
        let result = engine
            .rasterize(
                &node,
                RasterRequest {
                    width: 0,
                    height: 20,
                    scale: 1.0,
                },
            )
            .await;
        assert!(matches!(result, Err(RenderError::Frame(_))));
    }
}
