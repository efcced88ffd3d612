//! # Chartboard Core
//!
//! Widget and layout model for a responsive chart board.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 board-core                  │
//! ├─────────────────────────────────────────────┤
//! │  Widget Model    │  Layout Model            │
//! │  - Charts        │  - Grid geometry         │
//! │  - Text / Title  │  - Breakpoint reproject  │
//! ├─────────────────────────────────────────────┤
//! │  Board Controller│  Placement Allocator     │
//! │  - Selection     │  - Kind default sizes    │
//! │  - Export gate   │  - Diagonal stagger      │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! The widget and layout collections are kept in one-to-one correspondence
//! by [`Board`]; rendering and export live in `board-export`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod board;
pub mod breakpoint;
pub mod error;
pub mod gate;
pub mod layout;
pub mod placement;
pub mod schema;
pub mod selection;
pub mod widget;

pub use board::Board;
pub use breakpoint::{Breakpoint, BreakpointTable};
pub use error::{BoardError, BoardResult};
pub use gate::{ExportGate, ExportPermit};
pub use layout::{GeometryPatch, LayoutEntry};
pub use placement::KindDefaults;
pub use schema::BoardDocument;
pub use selection::Selection;
pub use widget::{
    ChartRef, StylePatch, TextAlign, TextBlock, Widget, WidgetContent, WidgetId, WidgetKind,
};

/// Board core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
