//! Board widgets - the items a user places on the grid.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{BoardError, BoardResult};

/// Default font size for text widgets, in pixels.
pub const TEXT_FONT_SIZE: u32 = 14;

/// Default font size for title widgets, in pixels.
pub const TITLE_FONT_SIZE: u32 = 32;

/// Smallest font size the style controls accept.
pub const MIN_FONT_SIZE: u32 = 8;

/// Largest font size the style controls accept.
pub const MAX_FONT_SIZE: u32 = 72;

/// Unique identifier for a widget, stable for the widget's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WidgetId(Uuid);

impl WidgetId {
    /// Create a new unique widget ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse a widget ID from its string form.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidId`] if the string is not a UUID.
    pub fn parse(s: &str) -> BoardResult<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| BoardError::InvalidId(format!("{s}: {e}")))
    }
}

impl Default for WidgetId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for WidgetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The closed set of widget kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetKind {
    /// A data chart backed by a computed visualization result.
    Chart,
    /// A free text box.
    Text,
    /// A full-width heading.
    Title,
}

impl std::fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Chart => "chart",
            Self::Text => "text",
            Self::Title => "title",
        };
        f.write_str(name)
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Flush left.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Flush right.
    Right,
}

/// Reference to a previously computed visualization result.
///
/// The board never looks inside the result; it only carries the id to the
/// rendering engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChartRef {
    /// Identifier of the computed result.
    pub result_id: String,
    /// Caption shown above the chart.
    pub title: String,
}

impl ChartRef {
    /// Create a chart reference.
    #[must_use]
    pub fn new(result_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            result_id: result_id.into(),
            title: title.into(),
        }
    }
}

/// Editable text payload shared by text and title widgets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextBlock {
    /// Text content.
    pub content: String,
    /// Font size in pixels.
    pub font_size: u32,
    /// Horizontal alignment.
    #[serde(default)]
    pub align: TextAlign,
}

impl TextBlock {
    /// An empty block with the given font size.
    #[must_use]
    pub fn empty(font_size: u32) -> Self {
        Self {
            content: String::new(),
            font_size,
            align: TextAlign::Left,
        }
    }

    /// Set the content.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }
}

/// Partial style update for text and title widgets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StylePatch {
    /// New font size; clamped to `[MIN_FONT_SIZE, MAX_FONT_SIZE]`.
    pub font_size: Option<u32>,
    /// New alignment.
    pub align: Option<TextAlign>,
}

/// Kind-specific widget payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum WidgetContent {
    /// A chart.
    Chart(ChartRef),
    /// A text box.
    Text(TextBlock),
    /// A title.
    Title(TextBlock),
}

impl WidgetContent {
    /// An empty text box with default styling.
    #[must_use]
    pub fn text() -> Self {
        Self::Text(TextBlock::empty(TEXT_FONT_SIZE))
    }

    /// An empty title with default styling.
    #[must_use]
    pub fn title() -> Self {
        Self::Title(TextBlock::empty(TITLE_FONT_SIZE))
    }

    /// A chart referencing the given result.
    #[must_use]
    pub fn chart(result_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self::Chart(ChartRef::new(result_id, title))
    }

    /// The kind of this payload.
    #[must_use]
    pub const fn kind(&self) -> WidgetKind {
        match self {
            Self::Chart(_) => WidgetKind::Chart,
            Self::Text(_) => WidgetKind::Text,
            Self::Title(_) => WidgetKind::Title,
        }
    }

    /// The text block, for text and title widgets.
    #[must_use]
    pub fn text_block(&self) -> Option<&TextBlock> {
        match self {
            Self::Text(block) | Self::Title(block) => Some(block),
            Self::Chart(_) => None,
        }
    }

    fn text_block_mut(&mut self) -> Option<&mut TextBlock> {
        match self {
            Self::Text(block) | Self::Title(block) => Some(block),
            Self::Chart(_) => None,
        }
    }
}

/// One entry on the board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Widget {
    /// Unique identifier.
    pub id: WidgetId,
    /// Kind-specific payload.
    pub content: WidgetContent,
}

impl Widget {
    /// Create a widget with a fresh id.
    #[must_use]
    pub fn new(content: WidgetContent) -> Self {
        Self {
            id: WidgetId::new(),
            content,
        }
    }

    /// The widget's kind.
    #[must_use]
    pub const fn kind(&self) -> WidgetKind {
        self.content.kind()
    }

    /// Copy of this widget with its text replaced.
    ///
    /// Returns `None` for charts, whose content is not user-editable text.
    #[must_use]
    pub fn with_text(&self, content: &str) -> Option<Self> {
        let mut next = self.clone();
        next.content.text_block_mut()?.content = content.to_string();
        Some(next)
    }

    /// Copy of this widget with a style patch applied.
    ///
    /// Returns `None` for charts.
    #[must_use]
    pub fn with_style(&self, patch: StylePatch) -> Option<Self> {
        let mut next = self.clone();
        let block = next.content.text_block_mut()?;
        if let Some(size) = patch.font_size {
            block.font_size = size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        }
        if let Some(align) = patch.align {
            block.align = align;
        }
        Some(next)
    }
}
