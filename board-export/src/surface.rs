//! The rendered board: pixel frames and live chart mounts.
//!
//! A [`Surface`] is what the user sees. The snapshot exporter is the only
//! code that rewrites it, and only for the duration of one export; equality
//! on `Surface` is the before/after comparison the exporter must preserve.

use board_core::{Board, ChartRef, TextBlock, WidgetContent, WidgetId};

use crate::engine::{ChartEngine, LiveNode};

/// Pixel geometry for a rendered board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceConfig {
    /// Container width in pixels.
    pub width: u32,
    /// Height of one grid row in pixels.
    pub row_height: u32,
    /// Gap between grid cells in pixels.
    pub margin: u32,
    /// Padding around the grid in pixels.
    pub padding: u32,
    /// Inner padding of a widget card in pixels.
    pub card_padding: u32,
    /// Height reserved for a chart caption in pixels.
    pub caption_height: u32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: board_core::board::DEFAULT_VIEWPORT_WIDTH,
            row_height: 80,
            margin: 10,
            padding: 10,
            card_padding: 16,
            caption_height: 28,
        }
    }
}

impl SurfaceConfig {
    /// Default geometry at the given container width.
    #[must_use]
    pub fn with_width(width: u32) -> Self {
        Self {
            width,
            ..Self::default()
        }
    }
}

/// Axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Frame {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Frame {
    /// Shrink the frame on every side, never below zero size.
    #[must_use]
    pub fn inset(&self, left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            x: self.x + left,
            y: self.y + top,
            width: (self.width - left - right).max(0.0),
            height: (self.height - top - bottom).max(0.0),
        }
    }

    /// Whether the frame covers no area.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Index of a node within its surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(usize);

/// Identifier of an inserted static image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHandle(u64);

/// Content of a rendered widget.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeBody {
    /// A chart card.
    Chart {
        /// The chart reference.
        chart: ChartRef,
        /// Live rendering, or `None` if the engine could not mount it.
        live: Option<LiveNode>,
        /// Whether the live rendering is hidden.
        hidden: bool,
        /// Area the live rendering occupies.
        plot: Frame,
    },
    /// A text box.
    Text(TextBlock),
    /// A title.
    Title(TextBlock),
}

/// One rendered widget.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceNode {
    /// Widget this node renders.
    pub widget_id: WidgetId,
    /// Card frame.
    pub frame: Frame,
    /// Whether the widget is selected.
    pub selected: bool,
    /// Rendered content.
    pub body: NodeBody,
}

/// A static image inserted over a hidden live rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageNode {
    /// Image identifier.
    pub handle: ImageHandle,
    /// Node whose live rendering this image stands in for.
    pub anchor: NodeHandle,
    /// Frame, identical to the anchor's plot area.
    pub frame: Frame,
    /// Image data as a `data:` URI.
    pub src: String,
}

/// A live chart eligible for freezing.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveChart {
    /// Node holding the chart.
    pub node: NodeHandle,
    /// Widget the chart belongs to.
    pub widget_id: WidgetId,
    /// Engine handle.
    pub live: LiveNode,
    /// Plot area.
    pub plot: Frame,
}

/// Rendered projection of a board.
#[derive(Debug, Clone)]
pub struct Surface {
    config: SurfaceConfig,
    columns: u32,
    rows: u32,
    nodes: Vec<SurfaceNode>,
    overlays: Vec<ImageNode>,
    next_image: u64,
}

impl PartialEq for Surface {
    /// Compares what is displayed; the image-handle counter is not part of it.
    fn eq(&self, other: &Self) -> bool {
        self.config == other.config
            && self.columns == other.columns
            && self.rows == other.rows
            && self.nodes == other.nodes
            && self.overlays == other.overlays
    }
}

impl Surface {
    /// Render a board, mounting a live rendering for every chart.
    ///
    /// Charts the engine cannot mount are kept as cards without a live node.
    #[must_use]
    pub fn render(board: &Board, engine: &dyn ChartEngine, config: SurfaceConfig) -> Self {
        let columns = board.columns();
        let selected = board.selection().id();
        let mut surface = Self {
            config,
            columns,
            rows: board_core::layout::bottom(board.layout()),
            nodes: Vec::with_capacity(board.len()),
            overlays: Vec::new(),
            next_image: 0,
        };

        for (widget, entry) in board.placed() {
            let frame = surface.cell_frame(entry.x, entry.y, entry.w, entry.h);
            let body = match &widget.content {
                WidgetContent::Chart(chart) => {
                    let live = match engine.mount(chart) {
                        Ok(node) => Some(node),
                        Err(e) => {
                            tracing::warn!("Failed to mount chart widget {}: {}", widget.id, e);
                            None
                        }
                    };
                    NodeBody::Chart {
                        chart: chart.clone(),
                        live,
                        hidden: false,
                        plot: surface.plot_frame(frame),
                    }
                }
                WidgetContent::Text(block) => NodeBody::Text(block.clone()),
                WidgetContent::Title(block) => NodeBody::Title(block.clone()),
            };
            surface.nodes.push(SurfaceNode {
                widget_id: widget.id,
                frame,
                selected: selected == Some(widget.id),
                body,
            });
        }

        tracing::debug!(
            "Rendered surface: {} node(s), {}x{}px",
            surface.nodes.len(),
            surface.width(),
            surface.height()
        );
        surface
    }

    /// Pixel frame of a grid cell span.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn cell_frame(&self, x: u32, y: u32, w: u32, h: u32) -> Frame {
        let margin = self.config.margin as f32;
        let padding = self.config.padding as f32;
        let row_height = self.config.row_height as f32;
        let col_width = self.column_width();

        Frame {
            x: ((col_width + margin) * x as f32 + padding).round(),
            y: ((row_height + margin) * y as f32 + padding).round(),
            width: (col_width * w as f32 + w.saturating_sub(1) as f32 * margin).round(),
            height: (row_height * h as f32 + h.saturating_sub(1) as f32 * margin).round(),
        }
    }

    /// Width of one grid column in pixels.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn column_width(&self) -> f32 {
        let columns = self.columns.max(1);
        let gutters = self.config.margin as f32 * (columns - 1) as f32;
        let usable = self.config.width as f32 - gutters - self.config.padding as f32 * 2.0;
        (usable / columns as f32).max(0.0)
    }

    #[allow(clippy::cast_precision_loss)]
    fn plot_frame(&self, card: Frame) -> Frame {
        let pad = self.config.card_padding as f32;
        card.inset(pad, pad + self.config.caption_height as f32, pad, pad)
    }

    /// Surface configuration.
    #[must_use]
    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    /// Container width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.config.width
    }

    /// Content height in pixels, including padding.
    #[must_use]
    pub fn height(&self) -> u32 {
        let rows = self.rows;
        let content = self
            .config
            .row_height
            .saturating_mul(rows)
            .saturating_add(self.config.margin.saturating_mul(rows.saturating_sub(1)));
        content.saturating_add(self.config.padding.saturating_mul(2))
    }

    /// Rendered nodes in layout order.
    #[must_use]
    pub fn nodes(&self) -> &[SurfaceNode] {
        &self.nodes
    }

    /// A node by handle.
    #[must_use]
    pub fn node(&self, handle: NodeHandle) -> Option<&SurfaceNode> {
        self.nodes.get(handle.0)
    }

    /// The node rendering a widget.
    #[must_use]
    pub fn node_for(&self, widget_id: WidgetId) -> Option<NodeHandle> {
        self.nodes
            .iter()
            .position(|n| n.widget_id == widget_id)
            .map(NodeHandle)
    }

    /// Inserted static images.
    #[must_use]
    pub fn overlays(&self) -> &[ImageNode] {
        &self.overlays
    }

    /// Whether nothing is rendered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Charts with a visible live rendering.
    #[must_use]
    pub fn live_charts(&self) -> Vec<LiveChart> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| match &node.body {
                NodeBody::Chart {
                    live: Some(live),
                    hidden: false,
                    plot,
                    ..
                } => Some(LiveChart {
                    node: NodeHandle(index),
                    widget_id: node.widget_id,
                    live: live.clone(),
                    plot: *plot,
                }),
                _ => None,
            })
            .collect()
    }

    /// Hide a chart's live rendering without unmounting it.
    ///
    /// Returns `false` if the node is not a chart.
    pub fn hide(&mut self, handle: NodeHandle) -> bool {
        self.set_hidden(handle, true)
    }

    /// Re-show a chart's live rendering.
    ///
    /// Returns `false` if the node is not a chart.
    pub fn show(&mut self, handle: NodeHandle) -> bool {
        self.set_hidden(handle, false)
    }

    fn set_hidden(&mut self, handle: NodeHandle, value: bool) -> bool {
        match self.nodes.get_mut(handle.0).map(|n| &mut n.body) {
            Some(NodeBody::Chart { hidden, .. }) => {
                *hidden = value;
                true
            }
            _ => false,
        }
    }

    /// Insert a static image over a chart's plot area.
    ///
    /// Returns `None` if the node is not a chart.
    pub fn insert_image(&mut self, anchor: NodeHandle, src: String) -> Option<ImageHandle> {
        let frame = match self.node(anchor).map(|n| &n.body) {
            Some(NodeBody::Chart { plot, .. }) => *plot,
            _ => return None,
        };
        let handle = ImageHandle(self.next_image);
        self.next_image += 1;
        self.overlays.push(ImageNode {
            handle,
            anchor,
            frame,
            src,
        });
        Some(handle)
    }

    /// Remove an inserted image. Returns whether it existed.
    pub fn remove_image(&mut self, handle: ImageHandle) -> bool {
        let before = self.overlays.len();
        self.overlays.retain(|image| image.handle != handle);
        self.overlays.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RenderResult;
    use async_trait::async_trait;
    use crate::engine::RasterRequest;

    struct NullEngine;

    #[async_trait]
    impl ChartEngine for NullEngine {
        fn mount(&self, chart: &ChartRef) -> RenderResult<LiveNode> {
            Ok(LiveNode {
                handle: 7,
                result_id: chart.result_id.clone(),
            })
        }

        async fn rasterize(&self, _node: &LiveNode, _request: RasterRequest) -> RenderResult<String> {
            Ok("data:image/png;base64,".to_string())
        }
    }

    fn board() -> Board {
        let mut board = Board::new(1280);
        board
            .add_widget(WidgetContent::chart("r1", "Sales"))
            .expect("chart");
        board.add_widget(WidgetContent::text()).expect("text");
        board
    }

    #[test]
    fn test_cell_geometry_matches_grid() {
        let board = board();
        let surface = Surface::render(&board, &NullEngine, SurfaceConfig::with_width(1280));
        // (1280 - 11 * 10 - 20) / 12 = 95.83...
        let col = surface.column_width();
        assert!((col - 95.833).abs() < 0.01);

        let frame = surface.cell_frame(0, 0, 6, 4);
        assert!((frame.x - 10.0).abs() < f32::EPSILON);
        assert!((frame.width - 625.0).abs() < f32::EPSILON);
        assert!((frame.height - 350.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_render_mounts_charts_only() {
        let board = board();
        let surface = Surface::render(&board, &NullEngine, SurfaceConfig::default());
        assert_eq!(surface.nodes().len(), 2);
        assert_eq!(surface.live_charts().len(), 1);
        assert!(surface.nodes()[1].selected);
    }

    #[test]
    fn test_hide_insert_restore_is_equal() {
        let board = board();
        let mut surface = Surface::render(&board, &NullEngine, SurfaceConfig::default());
        let original = surface.clone();

        let chart = surface.live_charts()[0].node;
        assert!(surface.hide(chart));
        let image = surface.insert_image(chart, "data:x".into()).expect("image");
        assert_ne!(surface, original);
        assert!(surface.live_charts().is_empty());

        assert!(surface.remove_image(image));
        assert!(surface.show(chart));
        assert_eq!(surface, original);
        assert!(!surface.remove_image(image));
    }

    #[test]
    fn test_height_saturates_on_huge_rows() {
        let mut surface = Surface::render(&board(), &NullEngine, SurfaceConfig::default());
        assert_eq!(surface.height(), 7 * 80 + 6 * 10 + 20);
        surface.rows = u32::MAX;
        assert_eq!(surface.height(), u32::MAX);
    }

    #[test]
    fn test_text_nodes_reject_chart_operations() {
        let board = board();
        let mut surface = Surface::render(&board, &NullEngine, SurfaceConfig::default());
        let text = surface
            .node_for(board.widgets()[1].id)
            .expect("text node");
        assert!(!surface.hide(text));
        assert!(surface.insert_image(text, "data:x".into()).is_none());
    }
}
