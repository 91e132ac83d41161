//! Word-cloud layout and rendering.
//!
//! Words are placed largest first. Each word's font size follows the
//! previous word's size scaled by the frequency ratio (`relative_scaling`),
//! then a spiral walk from the canvas centre looks for a spot where its
//! bounding box is inside the canvas and clear of every placed box. A word
//! that does not fit is retried at smaller sizes; once a word cannot be
//! placed even at `min_font_size`, layout stops.

use std::path::Path;

use plotters::prelude::*;
use serde::Serialize;

use super::fonts::FONT_FAMILY;
use crate::color::{to_rgb, viridis_at};
use crate::error::RenderError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WordCloudOptions {
    pub width: u32,
    pub height: u32,
    pub max_words: usize,
    /// Size of the most frequent word; defaults to the canvas height.
    pub max_font_size: Option<u32>,
    pub min_font_size: u32,
    pub font_step: u32,
    pub relative_scaling: f64,
    /// Clear pixels kept around every word.
    pub margin: u32,
}

impl Default for WordCloudOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
            max_words: 200,
            max_font_size: None,
            min_font_size: 4,
            font_step: 1,
            relative_scaling: 0.5,
            margin: 2,
        }
    }
}

impl WordCloudOptions {
    /// Scale canvas, font limits and margin by `factor` (e.g. dpi / 100).
    pub fn scaled(mut self, factor: f64) -> Self {
        let s = |v: u32| ((v as f64 * factor).round() as u32).max(1);
        self.width = s(self.width);
        self.height = s(self.height);
        self.max_font_size = self.max_font_size.map(s);
        self.min_font_size = s(self.min_font_size);
        self.margin = s(self.margin);
        self
    }
}

/// A word with its final font size and top-left box position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedWord {
    pub word: String,
    pub count: usize,
    pub font_size: u32,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl PlacedWord {
    fn overlaps(&self, x: i32, y: i32, w: u32, h: u32, margin: i32) -> bool {
        x < self.x + self.width as i32 + margin
            && self.x < x + w as i32 + margin
            && y < self.y + self.height as i32 + margin
            && self.y < y + h as i32 + margin
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Place up to `max_words` words. `measure(word, font_size)` returns the
/// rendered `(width, height)` of a word in pixels.
pub fn layout<M>(
    frequencies: &[(String, usize)],
    options: &WordCloudOptions,
    mut measure: M,
) -> Vec<PlacedWord>
where
    M: FnMut(&str, u32) -> (u32, u32),
{
    let mut placed: Vec<PlacedWord> = Vec::new();
    let mut font_size = options.max_font_size.unwrap_or(options.height);
    let mut last_count: Option<usize> = None;

    for (word, count) in frequencies.iter().take(options.max_words) {
        if *count == 0 {
            continue;
        }
        if let Some(prev) = last_count {
            let rs = options.relative_scaling;
            let scaled = (rs * (*count as f64 / prev as f64) + (1.0 - rs)) * font_size as f64;
            font_size = scaled.round() as u32;
        }

        let mut spot = None;
        while font_size >= options.min_font_size {
            let (w, h) = measure(word, font_size);
            if w > options.width || h > options.height {
                // Jump straight to a size that can fit the canvas.
                let ratio = (options.width as f64 / w as f64).min(options.height as f64 / h as f64);
                let shrunk = (font_size as f64 * ratio).floor() as u32;
                font_size = shrunk.min(font_size.saturating_sub(options.font_step.max(1)));
                continue;
            }
            if let Some((x, y)) = find_spot(&placed, w, h, options) {
                spot = Some((x, y, w, h));
                break;
            }
            let step = options.font_step.max(font_size / 10).max(1);
            font_size = font_size.saturating_sub(step);
        }

        let Some((x, y, width, height)) = spot else {
            break;
        };
        placed.push(PlacedWord {
            word: word.clone(),
            count: *count,
            font_size,
            x,
            y,
            width,
            height,
        });
        last_count = Some(*count);
    }
    placed
}

/// Archimedean spiral walk from the canvas centre with roughly constant
/// arc-length steps. Returns the first free top-left corner.
fn find_spot(placed: &[PlacedWord], w: u32, h: u32, options: &WordCloudOptions) -> Option<(i32, i32)> {
    let (cw, ch) = (options.width as f64, options.height as f64);
    let (cx, cy) = (cw / 2.0, ch / 2.0);
    let aspect = ch / cw;
    let max_radius = cw.max(ch);
    let growth = 2.0_f64.max(cw / 400.0);
    let step = 3.0_f64.max(cw / 300.0);
    let margin = options.margin as i32;

    let mut theta = 0.0_f64;
    loop {
        let radius = growth * theta;
        if radius > max_radius {
            return None;
        }
        let x = (cx + radius * theta.cos() - w as f64 / 2.0).round() as i32;
        let y = (cy + radius * theta.sin() * aspect - h as f64 / 2.0).round() as i32;

        let inside = x >= 0
            && y >= 0
            && x + w as i32 <= options.width as i32
            && y + h as i32 <= options.height as i32;
        if inside && !placed.iter().any(|p| p.overlaps(x, y, w, h, margin)) {
            return Some((x, y));
        }
        theta += step / radius.max(step);
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Lay out with the registered font's metrics and draw on a white canvas.
/// Returns the placed words.
pub fn render(
    path: &Path,
    frequencies: &[(String, usize)],
    options: &WordCloudOptions,
) -> Result<Vec<PlacedWord>, RenderError> {
    let root = BitMapBackend::new(path, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| RenderError::drawing(path, e))?;

    let words = layout(frequencies, options, |word, size| {
        let style = TextStyle::from((FONT_FAMILY, size).into_font());
        root.estimate_text_size(word, &style)
            .unwrap_or_else(|_| approximate_extent(word, size))
    });

    let n = words.len().max(1) as f32;
    for (rank, placed) in words.iter().enumerate() {
        // Most frequent words get the dark end of the gradient.
        let color = to_rgb(viridis_at(0.9 * rank as f32 / n));
        let style = (FONT_FAMILY, placed.font_size).into_font().color(&color);
        root.draw(&Text::new(placed.word.as_str(), (placed.x, placed.y), style))
            .map_err(|e| RenderError::drawing(path, e))?;
    }

    root.present()
        .map_err(|e| RenderError::drawing(path, e))?;
    Ok(words)
}

/// Rough text box when no font metrics are available.
pub fn approximate_extent(word: &str, font_size: u32) -> (u32, u32) {
    let chars = word.chars().count() as u32;
    ((chars * font_size * 3 / 5).max(1), font_size.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn freqs(pairs: &[(&str, usize)]) -> Vec<(String, usize)> {
        pairs.iter().map(|(w, c)| (w.to_string(), *c)).collect()
    }

    fn sample_words(n: usize) -> Vec<(String, usize)> {
        (0..n).map(|i| (format!("word{i}"), 1000 / (i + 1))).collect()
    }

    #[test]
    fn test_empty_input() {
        let placed = layout(&[], &WordCloudOptions::default(), approximate_extent);
        assert!(placed.is_empty());
    }

    #[test]
    fn test_boxes_inside_canvas_and_disjoint() {
        let options = WordCloudOptions::default();
        let placed = layout(&sample_words(120), &options, approximate_extent);
        assert!(placed.len() > 10);

        for (i, a) in placed.iter().enumerate() {
            assert!(a.x >= 0 && a.y >= 0);
            assert!(a.x + a.width as i32 <= options.width as i32);
            assert!(a.y + a.height as i32 <= options.height as i32);
            for b in &placed[i + 1..] {
                assert!(!a.overlaps(b.x, b.y, b.width, b.height, 0), "{} overlaps {}", a.word, b.word);
            }
        }
    }

    #[test]
    fn test_font_sizes_follow_frequency() {
        let placed = layout(&sample_words(30), &WordCloudOptions::default(), approximate_extent);
        for pair in placed.windows(2) {
            assert!(pair[0].font_size >= pair[1].font_size);
        }
        assert!(placed[0].font_size >= WordCloudOptions::default().min_font_size);
    }

    #[test]
    fn test_equal_counts_keep_size() {
        let options = WordCloudOptions {
            max_font_size: Some(40),
            ..Default::default()
        };
        let placed = layout(&freqs(&[("covid", 5), ("virus", 5)]), &options, approximate_extent);
        assert_eq!(placed.len(), 2);
        assert_eq!(placed[0].font_size, 40);
        assert_eq!(placed[1].font_size, 40);
    }

    #[test]
    fn test_max_words_cap() {
        let options = WordCloudOptions {
            max_words: 5,
            ..Default::default()
        };
        let placed = layout(&sample_words(50), &options, approximate_extent);
        assert!(placed.len() <= 5);
    }

    #[test]
    fn test_oversized_word_is_shrunk() {
        let options = WordCloudOptions::default();
        let long = "a".repeat(60);
        let placed = layout(&freqs(&[(&long, 3)]), &options, approximate_extent);
        assert_eq!(placed.len(), 1);
        assert!(placed[0].width <= options.width);
    }

    #[test]
    fn test_scaled_options() {
        let options = WordCloudOptions::default().scaled(1.5);
        assert_eq!((options.width, options.height), (1200, 600));
        assert_eq!(options.min_font_size, 6);
    }
}
