use anyhow::Context;
use circle_measure::{MeasureApp, Options};
use clap::Parser;
use eframe::egui;
use std::path::PathBuf;

/// Measure circle radii on a micrograph: set the scale with two right clicks,
/// then pick three points on each circle with the left button.
#[derive(Parser)]
#[command(name = "circle-measure")]
#[command(version)]
struct Cli {
    /// Image to measure (png, jpg, tiff, ...).
    image: PathBuf,

    /// Options file (TOML). Defaults to circle_measure.toml next to the binary.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    log::info!("circle-measure v{}", env!("CARGO_PKG_VERSION"));

    let config_path = cli.config.unwrap_or_else(Options::default_path);
    let options = Options::load_from_file(&config_path);

    let image = image::open(&cli.image)
        .with_context(|| format!("failed to open image {}", cli.image.display()))?
        .to_rgba8();
    log::info!(
        "loaded {} ({}x{})",
        cli.image.display(),
        image.width(),
        image.height()
    );

    let title = format!(
        "circle-measure — {}",
        cli.image
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
    );

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(options.window_size)
            .with_title(&title),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        native_options,
        Box::new(move |_cc| Ok(Box::new(MeasureApp::new(image, options)))),
    )
    .map_err(|e| anyhow::anyhow!("failed to run eframe: {e}"))
}
