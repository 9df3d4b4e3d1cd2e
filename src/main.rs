use clap::Parser;
use eframe::NativeOptions;
use eframe::egui::ViewportBuilder;
use env_logger::Env;
use shape_garden::app::ShapeGardenApp;
use shape_garden::config::SceneConfig;
use std::error::Error;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "shape-garden",
    version = env!("CARGO_PKG_VERSION"),
    about = "A spinning grid of shapes you can recolor by clicking"
)]
struct Cli {
    /// JSON scene config; defaults are used for anything it leaves out
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for the recolor RNG
    #[arg(long)]
    seed: Option<u64>,

    /// OBJ model to load at startup instead of the configured one
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Start without loading any model
    #[arg(long, conflicts_with = "model")]
    no_model: bool,
}

fn load_config(cli: &Cli) -> Result<SceneConfig, Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if let Some(model) = &cli.model {
        config.model.enabled = true;
        config.model.obj = model.clone();
        config.model.mtl = None;
    }
    if cli.no_model {
        config.model.enabled = false;
    }
    Ok(config)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli).inspect_err(|e| log::error!("{e}"))?;
    log::debug!("Configuration loaded: {config:?}");

    let app = ShapeGardenApp::new(&config).inspect_err(|e| log::error!("{e}"))?;
    let native_options = NativeOptions {
        viewport: ViewportBuilder::default().with_inner_size([
            config.viewport.width as f32 + 320.0,
            config.viewport.height as f32,
        ]),
        ..Default::default()
    };
    eframe::run_native(
        "Shape Garden",
        native_options,
        Box::new(|_cc| Ok(Box::new(app))),
    )?;
    Ok(())
}
