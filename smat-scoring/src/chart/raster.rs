//! Software rasterizer for radar charts

use super::glyphs::{self, glyph, is_set};
use super::{ChartError, ChartImage, ChartRenderer, RadarChart, RadarSeries, AXIS_MAX, GRID_LABELS};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::f64::consts::PI;
use std::io::Cursor;
use tracing::debug;

type Color = [u8; 3];
type Point = (f64, f64);

const GRID: Color = [225, 225, 225];
const TICK_TEXT: Color = [130, 130, 130];
const AXIS_TEXT: Color = [60, 60, 60];
const TITLE_TEXT: Color = [0x4C, 0xAF, 0x50];

const DASH_ON: f64 = 16.0;
const DASH_OFF: f64 = 10.0;
const LABEL_WRAP: usize = 18;
const LABEL_SCALE: u32 = 2;
const GRID_SEGMENTS: usize = 120;

/// Draws [`RadarChart`]s into an RGBA buffer and encodes them as PNG
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterChartRenderer;

impl RasterChartRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl ChartRenderer for RasterChartRenderer {
    fn render(&self, chart: &RadarChart) -> Result<ChartImage, ChartError> {
        chart.validate()?;

        let mut canvas = Canvas::new(chart.width, chart.height);
        let layout = Layout::new(chart);

        draw_title(&mut canvas, chart);
        draw_grid(&mut canvas, &layout);
        draw_axis_labels(&mut canvas, &layout, &chart.axes);
        for series in &chart.series {
            draw_series(&mut canvas, &layout, series);
        }
        draw_legend(&mut canvas, chart);

        let png = canvas.into_png()?;
        debug!(
            axes = chart.axes.len(),
            series = chart.series.len(),
            bytes = png.len(),
            "Radar chart rendered"
        );
        Ok(ChartImage { png })
    }
}

/// Polar geometry shared by all drawing steps
struct Layout {
    center: Point,
    radius: f64,
    axes: usize,
}

impl Layout {
    fn new(chart: &RadarChart) -> Self {
        let (w, h) = (f64::from(chart.width), f64::from(chart.height));
        Self {
            center: (w / 2.0, h * 0.48),
            radius: w.min(h) * 0.3,
            axes: chart.axes.len(),
        }
    }

    /// Axis 0 points straight up; later axes run clockwise
    fn angle(&self, axis: usize) -> f64 {
        -PI / 2.0 + axis as f64 * 2.0 * PI / self.axes as f64
    }

    fn polar(&self, angle: f64, r: f64) -> Point {
        (self.center.0 + r * angle.cos(), self.center.1 + r * angle.sin())
    }

    fn value_point(&self, axis: usize, value: f64) -> Point {
        let value = if value.is_finite() { value.clamp(0.0, AXIS_MAX) } else { 0.0 };
        self.polar(self.angle(axis), value / AXIS_MAX * self.radius)
    }
}

struct Canvas {
    img: RgbaImage,
}

impl Canvas {
    fn new(width: u32, height: u32) -> Self {
        Self {
            img: RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255])),
        }
    }

    fn blend(&mut self, x: i64, y: i64, color: Color, alpha: f32) {
        if x < 0 || y < 0 || x >= i64::from(self.img.width()) || y >= i64::from(self.img.height()) {
            return;
        }
        let px = self.img.get_pixel_mut(x as u32, y as u32);
        for (channel, value) in px.0.iter_mut().zip(color) {
            *channel = (f32::from(*channel) * (1.0 - alpha) + f32::from(value) * alpha).round() as u8;
        }
    }

    fn fill_rect(&mut self, x: i64, y: i64, w: u32, h: u32, color: Color) {
        for dy in 0..i64::from(h) {
            for dx in 0..i64::from(w) {
                self.blend(x + dx, y + dy, color, 1.0);
            }
        }
    }

    fn fill_disc(&mut self, (cx, cy): Point, r: f64, color: Color) {
        let r2 = r * r;
        for y in (cy - r).floor() as i64..=(cy + r).ceil() as i64 {
            for x in (cx - r).floor() as i64..=(cx + r).ceil() as i64 {
                let (px, py) = (x as f64 + 0.5, y as f64 + 0.5);
                if (px - cx).powi(2) + (py - cy).powi(2) <= r2 {
                    self.blend(x, y, color, 1.0);
                }
            }
        }
    }

    /// Thick line drawn by stamping discs along its length
    fn line(&mut self, from: Point, to: Point, width: f64, color: Color) {
        let length = ((to.0 - from.0).powi(2) + (to.1 - from.1).powi(2)).sqrt();
        let steps = length.ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let p = (from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t);
            self.fill_disc(p, width / 2.0, color);
        }
    }

    fn polyline(&mut self, points: &[Point], width: f64, color: Color) {
        for pair in points.windows(2) {
            self.line(pair[0], pair[1], width, color);
        }
    }

    /// Dash pattern continues across vertices
    fn dashed_polyline(&mut self, points: &[Point], width: f64, color: Color) {
        let period = DASH_ON + DASH_OFF;
        let mut travelled = 0.0;
        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let length = ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt();
            if length <= f64::EPSILON {
                continue;
            }
            let dir = ((b.0 - a.0) / length, (b.1 - a.1) / length);
            let at = |s: f64| (a.0 + dir.0 * s, a.1 + dir.1 * s);

            let mut s = 0.0;
            while s < length {
                let phase = (travelled + s) % period;
                if phase < DASH_ON {
                    let run = (DASH_ON - phase).min(length - s);
                    self.line(at(s), at(s + run), width, color);
                    s += run;
                } else {
                    s += (period - phase).min(length - s);
                }
            }
            travelled += length;
        }
    }

    /// Even-odd scanline fill sampled at pixel centers
    fn fill_polygon(&mut self, points: &[Point], color: Color, alpha: f32) {
        if points.len() < 3 || alpha <= 0.0 {
            return;
        }
        let min_y = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
        let max_y = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);

        let mut crossings: Vec<f64> = Vec::with_capacity(points.len());
        for y in min_y.floor() as i64..=max_y.ceil() as i64 {
            let sy = y as f64 + 0.5;
            crossings.clear();
            for i in 0..points.len() {
                let a = points[i];
                let b = points[(i + 1) % points.len()];
                if (a.1 <= sy && b.1 > sy) || (b.1 <= sy && a.1 > sy) {
                    crossings.push(a.0 + (sy - a.1) / (b.1 - a.1) * (b.0 - a.0));
                }
            }
            crossings.sort_by(f64::total_cmp);
            for span in crossings.chunks_exact(2) {
                let start = (span[0] - 0.5).ceil() as i64;
                let end = (span[1] - 0.5).floor() as i64;
                for x in start..=end {
                    self.blend(x, y, color, alpha);
                }
            }
        }
    }

    /// Draw text with its top-left corner at (`x`, `y`)
    fn text(&mut self, x: f64, y: f64, text: &str, scale: u32, color: Color) {
        let (x, y) = (x.round() as i64, y.round() as i64);
        let step = i64::from(glyphs::ADVANCE * scale);
        for (i, c) in text.chars().enumerate() {
            let g = glyph(c);
            let ox = x + i as i64 * step;
            for row in 0..glyphs::GLYPH_HEIGHT {
                for col in 0..glyphs::GLYPH_WIDTH {
                    if is_set(&g, col, row) {
                        self.fill_rect(
                            ox + i64::from(col * scale),
                            y + i64::from(row * scale),
                            scale,
                            scale,
                            color,
                        );
                    }
                }
            }
        }
    }

    fn text_centered(&mut self, cx: f64, y: f64, text: &str, scale: u32, color: Color) {
        let width = f64::from(glyphs::text_width(text, scale));
        self.text(cx - width / 2.0, y, text, scale, color);
    }

    fn into_png(self) -> Result<Vec<u8>, ChartError> {
        let mut buffer = Vec::new();
        DynamicImage::ImageRgba8(self.img)
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|e| ChartError::Encode(e.to_string()))?;
        Ok(buffer)
    }
}

fn draw_title(canvas: &mut Canvas, chart: &RadarChart) {
    let available = chart.width.saturating_sub(80);
    let scale = [3, 2, 1]
        .into_iter()
        .find(|s| glyphs::text_width(&chart.title, *s) <= available)
        .unwrap_or(1);
    canvas.text_centered(f64::from(chart.width) / 2.0, 40.0, &chart.title, scale, TITLE_TEXT);
}

fn draw_grid(canvas: &mut Canvas, layout: &Layout) {
    for level in 1..=GRID_LABELS.len() {
        let r = level as f64 / AXIS_MAX * layout.radius;
        let ring: Vec<Point> = (0..=GRID_SEGMENTS)
            .map(|i| layout.polar(2.0 * PI * i as f64 / GRID_SEGMENTS as f64, r))
            .collect();
        canvas.polyline(&ring, 2.0, GRID);
    }

    for axis in 0..layout.axes {
        let end = layout.polar(layout.angle(axis), layout.radius);
        canvas.line(layout.center, end, 2.0, GRID);
    }

    // Level names just right of the top spoke
    for (i, label) in GRID_LABELS.iter().enumerate() {
        let r = (i + 1) as f64 / AXIS_MAX * layout.radius;
        canvas.text(
            layout.center.0 + 8.0,
            layout.center.1 - r - 16.0,
            label,
            LABEL_SCALE,
            TICK_TEXT,
        );
    }
}

fn draw_axis_labels(canvas: &mut Canvas, layout: &Layout, axes: &[String]) {
    let line_height = f64::from((glyphs::GLYPH_HEIGHT + 3) * LABEL_SCALE);
    for (axis, label) in axes.iter().enumerate() {
        let angle = layout.angle(axis);
        let (ax, ay) = layout.polar(angle, layout.radius + 28.0);
        let lines = glyphs::wrap(label, LABEL_WRAP);
        let block = lines.len() as f64 * line_height - f64::from(3 * LABEL_SCALE);

        let top = if angle.sin() < -0.5 {
            ay - block
        } else if angle.sin() > 0.5 {
            ay
        } else {
            ay - block / 2.0
        };

        for (i, line) in lines.iter().enumerate() {
            let width = f64::from(glyphs::text_width(line, LABEL_SCALE));
            let x = if angle.cos() > 0.25 {
                ax
            } else if angle.cos() < -0.25 {
                ax - width
            } else {
                ax - width / 2.0
            };
            canvas.text(x, top + i as f64 * line_height, line, LABEL_SCALE, AXIS_TEXT);
        }
    }
}

fn draw_series(canvas: &mut Canvas, layout: &Layout, series: &RadarSeries) {
    let style = series.style;
    let points: Vec<Point> = series
        .values
        .iter()
        .enumerate()
        .map(|(axis, value)| layout.value_point(axis, *value))
        .collect();

    canvas.fill_polygon(&points, style.color, style.fill_alpha);

    if points.len() > 1 {
        let mut outline = points.clone();
        outline.push(points[0]);
        let width = f64::from(style.line_width);
        if style.dashed {
            canvas.dashed_polyline(&outline, width, style.color);
        } else {
            canvas.polyline(&outline, width, style.color);
        }
    }

    for point in &points {
        canvas.fill_disc(*point, f64::from(style.marker_radius), style.color);
    }
}

fn draw_legend(canvas: &mut Canvas, chart: &RadarChart) {
    const SWATCH: f64 = 48.0;
    const GAP: f64 = 12.0;
    const SPACING: f64 = 48.0;

    let widths: Vec<f64> = chart
        .series
        .iter()
        .map(|s| SWATCH + GAP + f64::from(glyphs::text_width(&s.name, LABEL_SCALE)))
        .collect();
    let total = widths.iter().sum::<f64>() + SPACING * widths.len().saturating_sub(1) as f64;

    let mid_y = f64::from(chart.height) - 70.0;
    let mut x = (f64::from(chart.width) - total) / 2.0;
    for (series, width) in chart.series.iter().zip(&widths) {
        let style = series.style;
        let from = (x, mid_y);
        let to = (x + SWATCH, mid_y);
        let line_width = f64::from(style.line_width);
        if style.dashed {
            canvas.dashed_polyline(&[from, to], line_width, style.color);
        } else {
            canvas.line(from, to, line_width, style.color);
        }
        canvas.fill_disc((x + SWATCH / 2.0, mid_y), f64::from(style.marker_radius), style.color);
        canvas.text(
            x + SWATCH + GAP,
            mid_y - f64::from(glyphs::text_height(LABEL_SCALE)) / 2.0,
            &series.name,
            LABEL_SCALE,
            AXIS_TEXT,
        );
        x += width + SPACING;
    }
}
