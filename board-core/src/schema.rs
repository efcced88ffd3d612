//! Serialized form of a board handed to and from durable storage.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::layout::LayoutEntry;
use crate::{Board, BoardResult, BreakpointTable, WidgetContent, WidgetId};

/// Document-friendly widget description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetDocument {
    /// Widget identifier.
    pub id: String,
    /// Widget content.
    pub content: WidgetContent,
}

/// Document-friendly geometry description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutDocument {
    /// Column origin.
    pub x: u32,
    /// Row origin.
    pub y: u32,
    /// Width in columns.
    pub w: u32,
    /// Height in rows.
    pub h: u32,
    /// Minimum width.
    #[serde(default = "LayoutDocument::default_min")]
    pub min_w: u32,
    /// Minimum height.
    #[serde(default = "LayoutDocument::default_min")]
    pub min_h: u32,
}

impl LayoutDocument {
    const fn default_min() -> u32 {
        1
    }
}

/// One widget with its geometry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedDocument {
    /// The widget.
    #[serde(flatten)]
    pub widget: WidgetDocument,
    /// Its geometry. Missing geometry makes the widget an orphan.
    pub layout: Option<LayoutDocument>,
}

/// Canonical board document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardDocument {
    /// Viewport width the layout was last arranged for.
    pub viewport_width: u32,
    /// Widgets in layout order.
    pub widgets: Vec<PlacedDocument>,
}

impl BoardDocument {
    /// Build a document from a board.
    #[must_use]
    pub fn from_board(board: &Board) -> Self {
        let widgets = board
            .widgets()
            .iter()
            .map(|widget| PlacedDocument {
                widget: WidgetDocument {
                    id: widget.id.to_string(),
                    content: widget.content.clone(),
                },
                layout: board.layout_of(widget.id).map(|e| LayoutDocument {
                    x: e.x,
                    y: e.y,
                    w: e.w,
                    h: e.h,
                    min_w: e.min_w,
                    min_h: e.min_h,
                }),
            })
            .collect();
        Self {
            viewport_width: board.viewport_width(),
            widgets,
        }
    }

    /// Materialize a board from this document.
    ///
    /// Widgets without geometry are dropped. Geometry is normalized (minimums,
    /// `h >= min_h`, row limit) and reprojected onto the column count the
    /// table resolves for the stored viewport width.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BoardError::InvalidId`] if any widget id is malformed.
    pub fn into_board(self, breakpoints: BreakpointTable) -> BoardResult<Board> {
        let mut board = Board::with_breakpoints(breakpoints, self.viewport_width);
        let mut widgets = Vec::with_capacity(self.widgets.len());
        let mut layout = Vec::with_capacity(self.widgets.len());

        for placed in self.widgets {
            let id = WidgetId::parse(&placed.widget.id)?;
            widgets.push(crate::Widget {
                id,
                content: placed.widget.content,
            });
            if let Some(geometry) = placed.layout {
                layout.push(LayoutEntry {
                    id,
                    x: geometry.x,
                    y: geometry.y,
                    w: geometry.w,
                    h: geometry.h,
                    min_w: geometry.min_w,
                    min_h: geometry.min_h,
                });
            }
        }

        board.load(widgets, layout);
        let dropped = board.repair_orphans();
        if dropped > 0 {
            tracing::warn!("Board document contained {dropped} orphaned record(s)");
        }
        board.check_integrity();
        Ok(board)
    }

    /// Serialize to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> BoardResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a board.
    pub fn from_json(json: &str) -> BoardResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a document from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> BoardResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write the document to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: impl AsRef<Path>) -> BoardResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

impl Board {
    /// Serialize this board to a document.
    #[must_use]
    pub fn to_document(&self) -> BoardDocument {
        BoardDocument::from_board(self)
    }

    /// Build a board from a document with the default breakpoint table.
    ///
    /// # Errors
    ///
    /// Returns an error if any widget id is malformed.
    pub fn from_document(document: BoardDocument) -> BoardResult<Self> {
        document.into_board(BreakpointTable::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GeometryPatch, StylePatch, TextAlign};

    #[test]
    fn test_roundtrip_is_lossless() {
        let mut board = Board::new(1280);
        let chart = board
            .add_widget(WidgetContent::chart("q-42", "Revenue"))
            .expect("chart");
        let text = board.add_widget(WidgetContent::text()).expect("text");
        board.update_content(text, "Notes").expect("content");
        board
            .update_style(text, StylePatch { font_size: Some(18), align: Some(TextAlign::Center) })
            .expect("style");
        board
            .resize(chart, GeometryPatch { h: Some(6), ..GeometryPatch::default() })
            .expect("resize");

        let json = board.to_document().to_json().expect("json");
        let restored = Board::from_document(BoardDocument::from_json(&json).expect("parse"))
            .expect("board");

        assert_eq!(restored.widgets(), board.widgets());
        assert_eq!(restored.layout(), board.layout());
        assert_eq!(restored.columns(), 12);
    }

    #[test]
    fn test_orphan_widgets_are_dropped() {
        let doc = BoardDocument {
            viewport_width: 1280,
            widgets: vec![
                PlacedDocument {
                    widget: WidgetDocument {
                        id: WidgetId::new().to_string(),
                        content: WidgetContent::text(),
                    },
                    layout: None,
                },
                PlacedDocument {
                    widget: WidgetDocument {
                        id: WidgetId::new().to_string(),
                        content: WidgetContent::title(),
                    },
                    layout: Some(LayoutDocument { x: 0, y: 0, w: 12, h: 1, min_w: 2, min_h: 1 }),
                },
            ],
        };
        let board = Board::from_document(doc).expect("board");
        assert_eq!(board.len(), 1);
        assert_eq!(board.layout().len(), 1);
    }

    #[test]
    fn test_invalid_id_is_rejected() {
        let doc = BoardDocument {
            viewport_width: 800,
            widgets: vec![PlacedDocument {
                widget: WidgetDocument {
                    id: "nope".into(),
                    content: WidgetContent::text(),
                },
                layout: Some(LayoutDocument { x: 0, y: 0, w: 2, h: 2, min_w: 2, min_h: 2 }),
            }],
        };
        assert!(Board::from_document(doc).is_err());
    }

    #[test]
    fn test_stored_layout_is_reprojected() {
        let doc = BoardDocument {
            viewport_width: 500,
            widgets: vec![PlacedDocument {
                widget: WidgetDocument {
                    id: WidgetId::new().to_string(),
                    content: WidgetContent::chart("r", "Chart"),
                },
                layout: Some(LayoutDocument { x: 6, y: 0, w: 6, h: 4, min_w: 3, min_h: 3 }),
            }],
        };
        let board = Board::from_document(doc).expect("board");
        assert_eq!(board.columns(), 4);
        assert!(board.layout().iter().all(|e| e.fits(4)));
    }

    #[test]
    fn test_out_of_range_geometry_is_normalized() {
        let json = format!(
            r#"{{
                "viewport_width": 1280,
                "widgets": [
                    {{ "id": "{}", "content": {{ "type": "text", "data": {{ "content": "", "font_size": 14 }} }},
                       "layout": {{ "x": 0, "y": 0, "w": 4, "h": 0, "min_h": 2 }} }},
                    {{ "id": "{}", "content": {{ "type": "text", "data": {{ "content": "", "font_size": 14 }} }},
                       "layout": {{ "x": 4294967295, "y": 4294967295, "w": 4294967295, "h": 4294967295 }} }}
                ]
            }}"#,
            WidgetId::new(),
            WidgetId::new()
        );
        let mut board = Board::from_document(BoardDocument::from_json(&json).expect("parse"))
            .expect("board");

        assert_eq!(board.len(), 2);
        assert!(board.layout().iter().all(|e| e.fits(12)));
        assert_eq!((board.layout()[0].h, board.layout()[0].min_h), (2, 2));
        assert!(board.layout()[1].bottom() <= crate::layout::MAX_ROWS);

        board.add_widget(WidgetContent::text()).expect("add after load");
        assert_eq!(board.check_integrity(), 0);
    }
}
