//! Car Listings Dashboard - opens the GUI, or exports every chart headlessly.

use anyhow::{anyhow, bail, Context, Result};
use car_dashboard::charts::StaticChartRenderer;
use car_dashboard::config::DashboardConfig;
use car_dashboard::dashboard::{Dashboard, DashboardState};
use car_dashboard::data::ListingTable;
use car_dashboard::gui::DashboardApp;
use clap::Parser;
use eframe::egui;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "car_dashboard",
    version,
    about = "Used-car listings dashboard: median-filled CSV, grouped counts and charts"
)]
struct Args {
    /// Listings CSV (overrides the config file)
    #[arg(long)]
    csv: Option<PathBuf>,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is not set
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Render every chart as PNG into this directory and exit
    #[arg(long)]
    export: Option<PathBuf>,

    /// Keep manufacturers below the listing threshold
    #[arg(long)]
    include_small_mfrs: bool,

    /// Show the price comparison in percent
    #[arg(long)]
    normalize: bool,

    /// Two manufacturers to compare, e.g. `ford,chevrolet`
    #[arg(long, value_delimiter = ',')]
    manufacturers: Option<Vec<String>>,
}

fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_config(args: &Args) -> Result<DashboardConfig> {
    let mut config = match &args.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };
    if let Some(csv) = &args.csv {
        config.csv_path = csv.clone();
    }
    Ok(config)
}

fn initial_state(args: &Args, dashboard: &Dashboard) -> Result<DashboardState> {
    let mut state = DashboardState {
        include_small_mfrs: args.include_small_mfrs,
        normalize: args.normalize,
        ..DashboardState::default()
    };

    let (manufacturer_a, manufacturer_b) = match args.manufacturers.as_deref() {
        Some([a, b]) => (Some(a.to_lowercase()), Some(b.to_lowercase())),
        Some(other) => bail!("--manufacturers takes exactly two names, got {}", other.len()),
        None => dashboard.default_selection(&state)?,
    };
    state.manufacturer_a = manufacturer_a;
    state.manufacturer_b = manufacturer_b;
    Ok(state)
}

/// Headless mode: every chart plus the visible rows as JSON.
fn export(dashboard: &Dashboard, mut state: DashboardState, dir: &Path, config: &DashboardConfig) -> Result<()> {
    state.show_histogram = true;
    state.show_scatter = true;

    let charts = dashboard.build_charts(&state)?;
    let written = StaticChartRenderer::export_all(&charts, dir, config.export_width, config.export_height)?;

    let visible = dashboard.visible_listings(&state)?;
    let rows = ListingTable::rows(&visible, usize::MAX)?;
    let json_path = dir.join("listings.json");
    fs::write(&json_path, ListingTable::to_json(&rows)?)
        .with_context(|| format!("Failed to write {}", json_path.display()))?;

    info!(
        "Exported {} charts and {} listings to {}",
        written.len(),
        rows.len(),
        dir.display()
    );
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let config = load_config(&args).context("Failed to load configuration")?;

    // Any load or parse error aborts startup
    let dashboard = Dashboard::open(&config)
        .with_context(|| format!("Failed to load listings from {}", config.csv_path.display()))?;
    let state = initial_state(&args, &dashboard)?;

    if let Some(dir) = &args.export {
        return export(&dashboard, state, dir, &config);
    }

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1000.0, 700.0])
            .with_title("Car Listings Dashboard"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Car Listings Dashboard",
        options,
        Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, dashboard, config, state)))),
    )
    .map_err(|e| anyhow!("GUI failed: {}", e))
}
