//! cord-eda - exploratory analysis of CORD-19 literature metadata
//!
//! Loads the metadata CSV, prints a profile, cleans it, renders four PNG
//! figures and opens them in an interactive viewer.

mod app;
mod color;
mod config;
mod data;
mod error;
mod pipeline;
mod render;
mod state;
mod text;
mod ui;

use std::path::PathBuf;

use anyhow::Result;
use app::CordExplorerApp;
use clap::Parser;
use config::PipelineConfig;
use eframe::egui;

#[derive(Parser, Debug)]
#[command(name = "cord-eda")]
#[command(about = "Exploratory analysis and charts for CORD-19 literature metadata")]
#[command(version)]
struct Cli {
    /// Metadata file (.csv, .csv.zip, .csv.gz, .parquet, .json)
    #[arg(default_value = "metadata.csv.zip")]
    input: PathBuf,

    /// Local stopword list, one word per line (built-in set when absent)
    #[arg(long, default_value = "english_stopwords.txt")]
    stopwords: PathBuf,

    /// Directory for the PNG figures and eda_summary.json
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Drop columns missing more than this fraction of values
    #[arg(long, default_value_t = 0.5)]
    missing_threshold: f64,

    /// Number of journals in the top-journals chart
    #[arg(long, default_value_t = 15)]
    top_journals: usize,

    /// Rows shown in the head preview
    #[arg(long, default_value_t = 5)]
    head_rows: usize,

    /// Resolution of the saved figures
    #[arg(long, default_value_t = 150)]
    dpi: u32,

    /// TrueType font for chart text (default: search system fonts)
    #[arg(long)]
    font: Option<PathBuf>,

    /// Write the figures without opening the viewer
    #[arg(long)]
    no_show: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

impl Cli {
    fn to_config(&self) -> PipelineConfig {
        PipelineConfig {
            input: self.input.clone(),
            stopwords: self.stopwords.clone(),
            output_dir: self.output_dir.clone(),
            missing_threshold: self.missing_threshold,
            top_journals: self.top_journals,
            head_rows: self.head_rows,
            dpi: self.dpi,
            font: self.font.clone(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let report = pipeline::run(&cli.to_config())?;

    if cli.no_show {
        return Ok(());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "CORD-19 Explorer",
        options,
        Box::new(|_cc| Ok(Box::new(CordExplorerApp::new(report)))),
    )
    .map_err(|e| anyhow::anyhow!("viewer failed: {e}"))
}
