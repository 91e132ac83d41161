use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use eframe::egui::{self, ColorImage, TextureHandle, TextureOptions};

use crate::pipeline::Report;

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    PapersPerYear,
    TopJournals,
    WordCloud,
    Sources,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::PapersPerYear, Tab::TopJournals, Tab::WordCloud, Tab::Sources];

    pub fn label(self) -> &'static str {
        match self {
            Tab::PapersPerYear => "Papers per year",
            Tab::TopJournals => "Top journals",
            Tab::WordCloud => "Word cloud",
            Tab::Sources => "Sources",
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full viewer state, independent of rendering.
pub struct AppState {
    /// Result of the analysis run being shown.
    pub report: Report,

    /// Selected figure.
    pub tab: Tab,

    /// Show the saved PNG instead of the interactive plot.
    pub show_png: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Loaded PNG textures, keyed by file path.
    textures: HashMap<PathBuf, TextureHandle>,
}

impl AppState {
    pub fn new(report: Report) -> Self {
        Self {
            report,
            tab: Tab::PapersPerYear,
            show_png: false,
            status_message: None,
            textures: HashMap::new(),
        }
    }

    /// PNG written for a tab, if that figure was rendered.
    pub fn figure_path(&self, tab: Tab) -> Option<&Path> {
        let figures = &self.report.figures;
        match tab {
            Tab::PapersPerYear => figures.papers_per_year.as_deref(),
            Tab::TopJournals => figures.top_journals.as_deref(),
            Tab::WordCloud => figures.wordcloud.as_deref(),
            Tab::Sources => figures.sources.as_deref(),
        }
    }

    /// Switch tab and clear any stale status message.
    pub fn select_tab(&mut self, tab: Tab) {
        if self.tab != tab {
            self.tab = tab;
            self.status_message = None;
        }
    }

    /// Texture of the current tab's PNG, loaded on first use.
    pub fn current_texture(&mut self, ctx: &egui::Context) -> Option<TextureHandle> {
        let path = self.figure_path(self.tab)?.to_path_buf();
        if let Some(texture) = self.textures.get(&path) {
            return Some(texture.clone());
        }
        match load_png(&path) {
            Ok(image) => {
                let texture = ctx.load_texture(path.display().to_string(), image, TextureOptions::LINEAR);
                self.textures.insert(path, texture.clone());
                Some(texture)
            }
            Err(e) => {
                log::error!("Failed to load image: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
                None
            }
        }
    }
}

/// Decode a PNG into an egui image.
pub fn load_png(path: &Path) -> Result<ColorImage> {
    let image = image::ImageReader::open(path)
        .with_context(|| format!("opening {}", path.display()))?
        .decode()
        .with_context(|| format!("decoding {}", path.display()))?
        .to_rgba8();
    let size = [image.width() as usize, image.height() as usize];
    Ok(ColorImage::from_rgba_unmultiplied(size, image.as_raw()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{Analysis, Figures};
    use crate::text::stopwords::StopwordSource;
    use tempfile::TempDir;

    fn report(figures: Figures) -> Report {
        Report {
            input: PathBuf::from("metadata.csv"),
            output_dir: PathBuf::from("."),
            loaded_shape: (0, 0),
            dtypes: vec![],
            null_counts: vec![],
            describe: vec![],
            stopwords: StopwordSource::Default,
            analysis: Analysis::default(),
            figures,
        }
    }

    #[test]
    fn test_figure_paths_per_tab() {
        let state = AppState::new(report(Figures {
            wordcloud: Some(PathBuf::from("title_wordcloud.png")),
            ..Default::default()
        }));
        assert_eq!(state.figure_path(Tab::WordCloud), Some(Path::new("title_wordcloud.png")));
        assert_eq!(state.figure_path(Tab::Sources), None);
    }

    #[test]
    fn test_select_tab_clears_status() {
        let mut state = AppState::new(report(Figures::default()));
        state.status_message = Some("Error".into());
        state.select_tab(Tab::TopJournals);
        assert_eq!(state.tab, Tab::TopJournals);
        assert!(state.status_message.is_none());
    }

    #[test]
    fn test_load_png() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chart.png");
        image::RgbaImage::from_pixel(3, 2, image::Rgba([255, 0, 0, 255]))
            .save(&path)
            .unwrap();

        let image = load_png(&path).unwrap();
        assert_eq!(image.size, [3, 2]);
        assert_eq!(image.pixels[0], egui::Color32::from_rgb(255, 0, 0));
    }

    #[test]
    fn test_load_png_missing_file() {
        assert!(load_png(Path::new("/nonexistent/chart.png")).is_err());
    }
}
