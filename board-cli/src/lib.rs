//! # Chartboard CLI
//!
//! Command-line host for Chartboard: loads a board document and a set of
//! computed chart results, renders the board at a viewport width, and
//! exports it.
//!
//! ## Usage
//!
//! ```bash
//! chartboard export --board board.json --results results.json --format pdf --out ./out
//! ```
//!
//! ```bash
//! chartboard layout --board board.json --viewport-width 800
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `ExportConfig` / `LayoutConfig` - Plain configuration built from the arguments
//! - `commands` - The export and layout operations

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

mod commands;

pub use commands::{run_export, run_layout};

use std::path::PathBuf;
use std::time::Duration;

use board_export::ExportFormat;
use clap::{Parser, Subcommand};

/// Command-line arguments for chartboard.
#[derive(Debug, Clone, Parser)]
#[command(name = "chartboard")]
#[command(about = "Responsive chart board layout and export")]
#[command(version)]
pub struct CliArgs {
    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Chartboard operations.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Render a board and export it as PNG, JPEG or PDF.
    Export(ExportArgs),
    /// Print the board layout reprojected to a viewport width.
    Layout(LayoutArgs),
}

/// Arguments for `chartboard export`.
#[derive(Debug, Clone, clap::Args)]
pub struct ExportArgs {
    /// Board document (JSON)
    #[arg(long, env = "CHARTBOARD_BOARD")]
    pub board: PathBuf,

    /// Chart results keyed by result id (JSON)
    #[arg(long, env = "CHARTBOARD_RESULTS")]
    pub results: PathBuf,

    /// Output format: png, jpeg or pdf
    #[arg(long, default_value = "png", value_parser = parse_format)]
    pub format: ExportFormat,

    /// Viewport width in pixels (defaults to the document's width)
    #[arg(long, env = "CHARTBOARD_VIEWPORT_WIDTH")]
    pub viewport_width: Option<u32>,

    /// Device scale factor for the output
    #[arg(long, default_value = "2")]
    pub scale: f32,

    /// Directory to write the export into
    #[arg(long, env = "CHARTBOARD_OUT", default_value = ".")]
    pub out: PathBuf,

    /// Milliseconds to wait between freezing charts and compositing
    #[arg(long, default_value = "100")]
    pub settle_ms: u64,

    /// Load system fonts so text is rasterized
    #[arg(long, env = "CHARTBOARD_SYSTEM_FONTS")]
    pub system_fonts: bool,
}

/// Arguments for `chartboard layout`.
#[derive(Debug, Clone, clap::Args)]
pub struct LayoutArgs {
    /// Board document (JSON)
    #[arg(long, env = "CHARTBOARD_BOARD")]
    pub board: PathBuf,

    /// Viewport width in pixels (defaults to the document's width)
    #[arg(long, env = "CHARTBOARD_VIEWPORT_WIDTH")]
    pub viewport_width: Option<u32>,
}

fn parse_format(s: &str) -> Result<ExportFormat, String> {
    s.parse()
}

/// Export configuration.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Board document path.
    pub board: PathBuf,
    /// Chart results path.
    pub results: PathBuf,
    /// Output format.
    pub format: ExportFormat,
    /// Viewport width override.
    pub viewport_width: Option<u32>,
    /// Device scale factor.
    pub scale: f32,
    /// Output directory.
    pub out_dir: PathBuf,
    /// Settle delay before compositing.
    pub settle_delay: Duration,
    /// Whether to load system fonts.
    pub system_fonts: bool,
}

impl From<ExportArgs> for ExportConfig {
    fn from(args: ExportArgs) -> Self {
        Self {
            board: args.board,
            results: args.results,
            format: args.format,
            viewport_width: args.viewport_width,
            scale: args.scale.max(0.1),
            out_dir: args.out,
            settle_delay: Duration::from_millis(args.settle_ms),
            system_fonts: args.system_fonts,
        }
    }
}

/// Layout configuration.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Board document path.
    pub board: PathBuf,
    /// Viewport width override.
    pub viewport_width: Option<u32>,
}

impl From<LayoutArgs> for LayoutConfig {
    fn from(args: LayoutArgs) -> Self {
        Self {
            board: args.board,
            viewport_width: args.viewport_width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_args() {
        let args = CliArgs::try_parse_from([
            "chartboard",
            "export",
            "--board",
            "b.json",
            "--results",
            "r.json",
            "--format",
            "jpg",
            "--scale",
            "1",
        ])
        .expect("parse");
        let Command::Export(export) = args.command else {
            panic!("expected export");
        };
        let config = ExportConfig::from(export);
        assert_eq!(config.format, ExportFormat::Jpeg);
        assert_eq!(config.out_dir, PathBuf::from("."));
        assert_eq!(config.settle_delay, Duration::from_millis(100));
        assert!((config.scale - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_rejects_unknown_format() {
        let parsed = CliArgs::try_parse_from([
            "chartboard",
            "export",
            "--board",
            "b.json",
            "--results",
            "r.json",
            "--format",
            "gif",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_layout_args() {
        let args = CliArgs::try_parse_from([
            "chartboard",
            "layout",
            "--board",
            "b.json",
            "--viewport-width",
            "800",
        ])
        .expect("parse");
        let Command::Layout(layout) = args.command else {
            panic!("expected layout");
        };
        assert_eq!(LayoutConfig::from(layout).viewport_width, Some(800));
    }
}
