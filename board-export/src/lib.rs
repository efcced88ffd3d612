//! # Chartboard Export
//!
//! Rendered board surface and the snapshot/restore export protocol.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │             SnapshotExporter                │
//! │   gate · freeze charts · settle · restore   │
//! ├──────────────┬──────────────┬───────────────┤
//! │ Surface      │ ChartEngine  │ Compositor    │
//! │ (rendered    │ (live chart  │ (raster,      │
//! │  board)      │  renderings) │  PNG/JPEG/PDF)│
//! ├──────────────┴──────────────┴───────────────┤
//! │      svg feature: resvg reference impls     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! The engine and compositor are traits; the `svg` feature (on by default)
//! provides [`SvgChartEngine`] and [`SvgCompositor`] built on resvg,
//! `tiny-skia`, `image` and `printpdf`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod chart;
pub mod compositor;
pub mod engine;
pub mod error;
#[cfg(feature = "svg")]
pub mod raster;
pub mod snapshot;
pub mod surface;

pub use chart::{ChartResult, ChartType};
pub use compositor::{
    CompositeOptions, Compositor, ImageFormat, Orientation, PageSize, RasterImage,
};
pub use engine::{ChartEngine, LiveNode, RasterRequest};
pub use error::{ExportError, ExportResult, RenderError, RenderResult};
pub use snapshot::{ExportArtifact, ExportFormat, ExporterConfig, SnapshotExporter, SnapshotGuard};
pub use surface::{Frame, ImageNode, LiveChart, NodeBody, NodeHandle, Surface, SurfaceConfig};

#[cfg(feature = "svg")]
pub use compositor::svg::SvgCompositor;
#[cfg(feature = "svg")]
pub use engine::svg::{ResultCatalog, SvgChartEngine};

/// Export crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
