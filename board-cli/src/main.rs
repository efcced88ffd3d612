//! # Chartboard
//!
//! Command-line entry point.

use board_cli::{run_export, run_layout, CliArgs, Command, ExportConfig, LayoutConfig};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,board_core=debug,board_export=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr);

    // Use JSON format in production (RUST_LOG_FORMAT=json)
    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    tracing::debug!("Parsed arguments: {:?}", args);

    match args.command {
        Command::Export(export) => {
            let config = ExportConfig::from(export);
            tracing::info!(
                "Exporting {} as {}",
                config.board.display(),
                config.format.extension()
            );
            let path = run_export(&config).await?;
            println!("{}", path.display());
        }
        Command::Layout(layout) => {
            let json = run_layout(&LayoutConfig::from(layout))?;
            println!("{json}");
        }
    }

    Ok(())
}
