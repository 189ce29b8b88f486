mod app;
mod color;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::Context;
use app::DashboardApp;
use bibliostat::config::Settings;
use clap::Parser;
use eframe::egui;

/// Dashboard over the library statistics stores.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Settings file (TOML); the default folder layout is used without one.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let settings = Settings::load_or_default(args.config.as_deref())
        .with_context(|| format!("reading settings {:?}", args.config))?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Bibliostat – Bibliotheksstatistik",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(settings)))),
    )
    .map_err(|e| anyhow::anyhow!("dashboard window failed: {e}"))
}
