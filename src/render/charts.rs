use std::fmt::Display;
use std::path::Path;

use palette::Srgb;
use plotters::prelude::*;

use super::fonts::FONT_FAMILY;
use crate::color::to_rgb;
use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Figure geometry
// ---------------------------------------------------------------------------

/// A figure size in inches, turned into pixels with a dpi.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigureSize {
    pub width_in: f64,
    pub height_in: f64,
    pub dpi: u32,
}

impl FigureSize {
    pub fn new(width_in: f64, height_in: f64, dpi: u32) -> Self {
        Self {
            width_in,
            height_in,
            dpi,
        }
    }

    pub fn pixels(&self) -> (u32, u32) {
        (
            (self.width_in * self.dpi as f64).round().max(1.0) as u32,
            (self.height_in * self.dpi as f64).round().max(1.0) as u32,
        )
    }

    /// Pixel size of a font given in points.
    pub fn font_px(&self, points: f64) -> u32 {
        (points * self.dpi as f64 / 72.0).round().max(1.0) as u32
    }
}

/// Title and axis captions of a chart.
#[derive(Debug, Clone, Copy)]
pub struct ChartLabels<'a> {
    pub title: &'a str,
    pub x: &'a str,
    pub y: &'a str,
}

const TITLE_PT: f64 = 14.0;
const AXIS_PT: f64 = 11.0;
const TICK_PT: f64 = 9.0;

fn draw_err<E: Display>(path: &Path) -> impl Fn(E) -> RenderError + '_ {
    move |e| RenderError::drawing(path, e)
}

/// Upper axis bound leaving some headroom above the largest value.
fn headroom(max: f64) -> f64 {
    if max <= 0.0 {
        1.0
    } else {
        max * 1.08
    }
}

/// Horizontal extent `[min - 0.5, max + 0.5]` of the year axis.
pub fn year_range(points: &[(i64, usize)]) -> (f64, f64) {
    let min = points.iter().map(|(y, _)| *y).min().unwrap_or(0) as f64;
    let max = points.iter().map(|(y, _)| *y).max().unwrap_or(0) as f64;
    (min - 0.5, max + 0.5)
}

// ---------------------------------------------------------------------------
// Line chart: papers per year
// ---------------------------------------------------------------------------

/// Line with circle markers over a grid, one point per year.
pub fn line_chart(
    path: &Path,
    points: &[(i64, usize)],
    labels: ChartLabels<'_>,
    size: FigureSize,
) -> Result<(), RenderError> {
    let root = BitMapBackend::new(path, size.pixels()).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err(path))?;

    let (x_min, x_max) = year_range(points);
    let y_max = headroom(points.iter().map(|(_, c)| *c).max().unwrap_or(0) as f64);
    let tick_px = size.font_px(TICK_PT);

    let mut chart = ChartBuilder::on(&root)
        .caption(labels.title, (FONT_FAMILY, size.font_px(TITLE_PT)))
        .margin(size.font_px(12.0))
        .x_label_area_size(size.font_px(36.0))
        .y_label_area_size(size.font_px(52.0))
        .build_cartesian_2d(x_min..x_max, 0f64..y_max)
        .map_err(draw_err(path))?;

    chart
        .configure_mesh()
        .x_desc(labels.x)
        .y_desc(labels.y)
        .x_label_formatter(&|x| format!("{x:.0}"))
        .y_label_formatter(&|y| format!("{y:.0}"))
        .label_style((FONT_FAMILY, tick_px))
        .axis_desc_style((FONT_FAMILY, size.font_px(AXIS_PT)))
        .light_line_style(RGBColor(235, 235, 235))
        .draw()
        .map_err(draw_err(path))?;

    let color = RGBColor(0x1f, 0x77, 0xb4);
    let data: Vec<(f64, f64)> = points.iter().map(|&(x, y)| (x as f64, y as f64)).collect();
    let stroke = (size.dpi / 60).max(1);

    chart
        .draw_series(LineSeries::new(data.iter().copied(), color.stroke_width(stroke)))
        .map_err(draw_err(path))?;
    chart
        .draw_series(
            data.iter()
                .map(|&p| Circle::new(p, (stroke * 3) as i32, color.filled())),
        )
        .map_err(draw_err(path))?;

    root.present().map_err(draw_err(path))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Horizontal bar chart: journals, sources
// ---------------------------------------------------------------------------

/// One bar per `(label, count)`, first entry on top. Colours are taken from
/// `palette` in the same order.
pub fn horizontal_bar_chart(
    path: &Path,
    counts: &[(String, usize)],
    palette: &[Srgb<u8>],
    labels: ChartLabels<'_>,
    size: FigureSize,
) -> Result<(), RenderError> {
    let root = BitMapBackend::new(path, size.pixels()).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err(path))?;

    let n = counts.len() as i32;
    let x_max = headroom(counts.iter().map(|(_, c)| *c).max().unwrap_or(0) as f64);
    let tick_px = size.font_px(TICK_PT);
    let longest = counts.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0) as u32;
    let y_area = (longest * tick_px * 3 / 5 + tick_px).min(size.pixels().0 / 2);

    let mut chart = ChartBuilder::on(&root)
        .caption(labels.title, (FONT_FAMILY, size.font_px(TITLE_PT)))
        .margin(size.font_px(12.0))
        .x_label_area_size(size.font_px(36.0))
        .y_label_area_size(y_area + size.font_px(AXIS_PT) * 2)
        .build_cartesian_2d(0f64..x_max, (0..n).into_segmented())
        .map_err(draw_err(path))?;

    // Segment i from the bottom holds entry n-1-i, so entry 0 is on top.
    let label_for = |v: &SegmentValue<i32>| match v {
        SegmentValue::CenterOf(i) if (0..n).contains(i) => counts[(n - 1 - i) as usize].0.clone(),
        _ => String::new(),
    };

    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_desc(labels.x)
        .y_desc(labels.y)
        .y_labels(counts.len().max(1))
        .y_label_formatter(&label_for)
        .x_label_formatter(&|x| format!("{x:.0}"))
        .label_style((FONT_FAMILY, tick_px))
        .axis_desc_style((FONT_FAMILY, size.font_px(AXIS_PT)))
        .light_line_style(RGBColor(235, 235, 235))
        .draw()
        .map_err(draw_err(path))?;

    let band_margin = (size.pixels().1 / (counts.len().max(1) as u32 * 10)).max(1);
    chart
        .draw_series(counts.iter().enumerate().map(|(rank, (_, count))| {
            let slot = n - 1 - rank as i32;
            let color = palette
                .get(rank)
                .copied()
                .map(to_rgb)
                .unwrap_or(RGBColor(0x1f, 0x77, 0xb4));
            let mut bar = Rectangle::new(
                [
                    (0.0, SegmentValue::Exact(slot)),
                    (*count as f64, SegmentValue::Exact(slot + 1)),
                ],
                color.filled(),
            );
            bar.set_margin(band_margin, band_margin, 0, 0);
            bar
        }))
        .map_err(draw_err(path))?;

    root.present().map_err(draw_err(path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_figure_pixels() {
        let size = FigureSize::new(10.0, 6.0, 150);
        assert_eq!(size.pixels(), (1500, 900));
        assert_eq!(size.font_px(72.0), 150);
        assert_eq!(FigureSize::new(0.0, 0.0, 100).pixels(), (1, 1));
    }

    #[test]
    fn test_year_range_pads_single_year() {
        assert_eq!(year_range(&[(2020, 4)]), (2019.5, 2020.5));
        assert_eq!(year_range(&[(2001, 1), (2020, 3)]), (2000.5, 2020.5));
    }

    #[test]
    fn test_headroom() {
        assert_eq!(headroom(0.0), 1.0);
        assert!(headroom(100.0) > 100.0);
    }
}
