use anyhow::{Context, Result};
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::f64::consts::PI;
use std::ops::Range;

use crate::data::Value;
use crate::palette::{parse_color, series_color};
use crate::project::ChartDataset;
use crate::RenderOptions;

/// The chart shapes a derived series can be rendered as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
    Doughnut,
    Radar,
    Bubble,
    Scatter,
}

impl ChartKind {
    /// Map a chart-kind tag to a kind. Total: unrecognized tags render as
    /// bars rather than failing.
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "line" => ChartKind::Line,
            "pie" => ChartKind::Pie,
            "doughnut" => ChartKind::Doughnut,
            "radar" => ChartKind::Radar,
            "bubble" => ChartKind::Bubble,
            "scatter" => ChartKind::Scatter,
            _ => ChartKind::Bar,
        }
    }
}

/// Render a derived series as PNG bytes.
///
/// Rows whose value is non-numeric keep their axis slot but draw nothing, so
/// holes in the data stay visible instead of shifting later rows.
pub fn render_chart(
    chart: &ChartDataset,
    kind: ChartKind,
    options: &RenderOptions,
) -> Result<Vec<u8>> {
    if chart.values.is_empty() {
        anyhow::bail!("cannot render an empty series");
    }
    let mut canvas = Canvas::new(options.width, options.height, options.title.clone())?;
    match kind {
        ChartKind::Bar => canvas.draw_bars(chart)?,
        ChartKind::Line => canvas.draw_line(chart)?,
        ChartKind::Scatter => canvas.draw_points(chart, PointSizing::Fixed)?,
        ChartKind::Bubble => canvas.draw_points(chart, PointSizing::ByValue)?,
        ChartKind::Pie => canvas.draw_sectors(chart, 0.0)?,
        ChartKind::Doughnut => canvas.draw_sectors(chart, 0.55)?,
        ChartKind::Radar => canvas.draw_radar(chart)?,
    }
    canvas.render()
}

enum PointSizing {
    Fixed,
    ByValue,
}

/// Canvas owning the RGB pixel buffer a chart is painted into.
struct Canvas {
    buffer: Vec<u8>,
    width: u32,
    height: u32,
    title: Option<String>,
}

impl Canvas {
    fn new(width: u32, height: u32, title: Option<String>) -> Result<Self> {
        if width == 0 || height == 0 {
            anyhow::bail!("canvas dimensions must be non-zero ({}x{})", width, height);
        }
        let buffer = vec![0u8; (width * height * 3) as usize];
        Ok(Self {
            buffer,
            width,
            height,
            title,
        })
    }

    /// Bar chart: one slot per row, bars only where the value is numeric.
    fn draw_bars(&mut self, chart: &ChartDataset) -> Result<()> {
        let n = chart.values.len();
        let points = numeric_points(&chart.values);
        let labels = axis_labels(chart);
        let y_range = value_range(&points, true);
        let (color, alpha) = parse_color(&chart.color);
        let fill = color.mix(alpha.max(0.2));

        let root = BitMapBackend::with_buffer(&mut self.buffer, (self.width, self.height))
            .into_drawing_area();
        root.fill(&WHITE).context("Failed to fill background")?;

        let mut ctx = ChartBuilder::on(&root)
            .margin(10)
            .caption(self.title.as_deref().unwrap_or(""), ("sans-serif", 20))
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(0.0..(n as f64), y_range)
            .context("Failed to build chart")?;

        ctx.configure_mesh()
            .x_labels(n)
            .x_label_formatter(&|x| tick_label(&labels, *x))
            .draw()
            .context("Failed to draw mesh")?;

        let bar_width = 0.8;
        for (idx, value) in &points {
            let x_center = *idx as f64 + 0.5;
            ctx.draw_series(std::iter::once(Rectangle::new(
                [
                    (x_center - bar_width / 2.0, 0.0),
                    (x_center + bar_width / 2.0, *value),
                ],
                fill.filled(),
            )))
            .context("Failed to draw bar")?;
        }

        root.present().context("Failed to present drawing")?;
        Ok(())
    }

    /// Line chart over row order; gaps from non-numeric rows are bridged.
    fn draw_line(&mut self, chart: &ChartDataset) -> Result<()> {
        let n = chart.values.len();
        let points = numeric_points(&chart.values);
        let labels = axis_labels(chart);
        let y_range = value_range(&points, false);
        let (color, _alpha) = parse_color(&chart.color);

        let root = BitMapBackend::with_buffer(&mut self.buffer, (self.width, self.height))
            .into_drawing_area();
        root.fill(&WHITE).context("Failed to fill background")?;

        let mut ctx = ChartBuilder::on(&root)
            .margin(10)
            .caption(self.title.as_deref().unwrap_or(""), ("sans-serif", 20))
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(0.0..(n as f64), y_range)
            .context("Failed to build chart")?;

        ctx.configure_mesh()
            .x_labels(n)
            .x_label_formatter(&|x| tick_label(&labels, *x))
            .draw()
            .context("Failed to draw mesh")?;

        let series: Vec<(f64, f64)> = points
            .iter()
            .map(|(idx, v)| (*idx as f64 + 0.5, *v))
            .collect();
        ctx.draw_series(LineSeries::new(series, color.stroke_width(2)))
            .context("Failed to draw line series")?;

        root.present().context("Failed to present drawing")?;
        Ok(())
    }

    /// Scatter/bubble chart over row order.
    fn draw_points(&mut self, chart: &ChartDataset, sizing: PointSizing) -> Result<()> {
        let n = chart.values.len();
        let points = numeric_points(&chart.values);
        let labels = axis_labels(chart);
        let y_range = value_range(&points, false);
        let (color, alpha) = parse_color(&chart.color);
        let fill = color.mix(alpha.max(0.4));

        let (v_min, v_max) = match (
            points.iter().map(|(_, v)| *v).reduce(f64::min),
            points.iter().map(|(_, v)| *v).reduce(f64::max),
        ) {
            (Some(min), Some(max)) => (min, max),
            _ => (0.0, 1.0),
        };

        let root = BitMapBackend::with_buffer(&mut self.buffer, (self.width, self.height))
            .into_drawing_area();
        root.fill(&WHITE).context("Failed to fill background")?;

        let mut ctx = ChartBuilder::on(&root)
            .margin(10)
            .caption(self.title.as_deref().unwrap_or(""), ("sans-serif", 20))
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(0.0..(n as f64), y_range)
            .context("Failed to build chart")?;

        ctx.configure_mesh()
            .x_labels(n)
            .x_label_formatter(&|x| tick_label(&labels, *x))
            .draw()
            .context("Failed to draw mesh")?;

        ctx.draw_series(points.iter().map(|(idx, value)| {
            let radius = match sizing {
                PointSizing::Fixed => 4,
                PointSizing::ByValue => {
                    let span = (v_max - v_min).abs();
                    let scaled = if span == 0.0 {
                        0.5
                    } else {
                        (value - v_min) / span
                    };
                    (4.0 + scaled * 12.0) as i32
                }
            };
            Circle::new((*idx as f64 + 0.5, *value), radius, fill.filled())
        }))
        .context("Failed to draw point series")?;

        root.present().context("Failed to present drawing")?;
        Ok(())
    }

    /// Pie/doughnut: one sector per numeric row, proportional to |value|.
    /// `hole` is the inner-radius fraction (0 for a full pie).
    fn draw_sectors(&mut self, chart: &ChartDataset, hole: f64) -> Result<()> {
        let labels = axis_labels(chart);
        let points = numeric_points(&chart.values);
        let total: f64 = points.iter().map(|(_, v)| v.abs()).sum();

        let width = self.width;
        let height = self.height;
        let root = BitMapBackend::with_buffer(&mut self.buffer, (width, height))
            .into_drawing_area();
        root.fill(&WHITE).context("Failed to fill background")?;
        draw_title(&root, self.title.as_deref(), width)?;

        // Nothing numeric to chart: leave the canvas blank rather than fail.
        if total == 0.0 {
            root.present().context("Failed to present drawing")?;
            return Ok(());
        }

        let cx = width as f64 / 2.0;
        let cy = height as f64 / 2.0 + 10.0;
        let radius = (width.min(height) as f64) * 0.35;
        let inner = radius * hole;

        let mut start = -PI / 2.0;
        for (slice, (idx, value)) in points.iter().enumerate() {
            let sweep = value.abs() / total * 2.0 * PI;
            if sweep == 0.0 {
                continue;
            }
            let end = start + sweep;

            let outline = sector_outline(cx, cy, inner, radius, start, end);
            root.draw(&Polygon::new(outline, series_color(slice).filled()))
                .context("Failed to draw sector")?;

            let mid = (start + end) / 2.0;
            let lx = cx + mid.cos() * radius * 1.12;
            let ly = cy + mid.sin() * radius * 1.12;
            root.draw(&Text::new(
                labels[*idx].clone(),
                (lx as i32, ly as i32),
                ("sans-serif", 14),
            ))
            .context("Failed to draw sector label")?;

            start = end;
        }

        root.present().context("Failed to present drawing")?;
        Ok(())
    }

    /// Radar chart: one spoke per row, value polygon scaled to the maximum.
    fn draw_radar(&mut self, chart: &ChartDataset) -> Result<()> {
        let n = chart.values.len();
        let labels = axis_labels(chart);
        let points = numeric_points(&chart.values);
        let max = points
            .iter()
            .map(|(_, v)| v.abs())
            .fold(0.0_f64, f64::max);
        let (color, alpha) = parse_color(&chart.color);

        let width = self.width;
        let height = self.height;
        let root = BitMapBackend::with_buffer(&mut self.buffer, (width, height))
            .into_drawing_area();
        root.fill(&WHITE).context("Failed to fill background")?;
        draw_title(&root, self.title.as_deref(), width)?;

        if n == 0 {
            root.present().context("Failed to present drawing")?;
            return Ok(());
        }

        let cx = width as f64 / 2.0;
        let cy = height as f64 / 2.0 + 10.0;
        let radius = (width.min(height) as f64) * 0.35;
        let spoke_angle = |i: usize| -PI / 2.0 + (i as f64) * 2.0 * PI / (n as f64);

        // Grid rings and spokes.
        for ring in 1..=4 {
            let r = radius * (ring as f64) / 4.0;
            let mut outline: Vec<(i32, i32)> = (0..=n)
                .map(|i| {
                    let a = spoke_angle(i % n);
                    ((cx + a.cos() * r) as i32, (cy + a.sin() * r) as i32)
                })
                .collect();
            outline.dedup();
            root.draw(&PathElement::new(
                outline,
                RGBColor(200, 200, 200).stroke_width(1),
            ))
            .context("Failed to draw radar grid")?;
        }
        for i in 0..n {
            let a = spoke_angle(i);
            root.draw(&PathElement::new(
                vec![
                    (cx as i32, cy as i32),
                    ((cx + a.cos() * radius) as i32, (cy + a.sin() * radius) as i32),
                ],
                RGBColor(200, 200, 200).stroke_width(1),
            ))
            .context("Failed to draw radar spoke")?;
            let lx = cx + a.cos() * radius * 1.12;
            let ly = cy + a.sin() * radius * 1.12;
            root.draw(&Text::new(
                labels[i].clone(),
                (lx as i32, ly as i32),
                ("sans-serif", 14),
            ))
            .context("Failed to draw radar label")?;
        }

        // Value polygon; non-numeric rows collapse to the center.
        if max > 0.0 {
            let mut values = vec![0.0; n];
            for (idx, v) in &points {
                values[*idx] = v.abs() / max;
            }
            let vertices: Vec<(i32, i32)> = (0..n)
                .map(|i| {
                    let a = spoke_angle(i);
                    let r = radius * values[i];
                    ((cx + a.cos() * r) as i32, (cy + a.sin() * r) as i32)
                })
                .collect();
            let mut closed = vertices.clone();
            closed.push(vertices[0]);
            root.draw(&Polygon::new(
                vertices,
                color.mix(alpha.max(0.2)).filled(),
            ))
            .context("Failed to draw radar area")?;
            root.draw(&PathElement::new(closed, color.stroke_width(2)))
                .context("Failed to draw radar outline")?;
        }

        root.present().context("Failed to present drawing")?;
        Ok(())
    }

    /// Finalize and encode the canvas as PNG.
    fn render(self) -> Result<Vec<u8>> {
        let mut png_bytes = Vec::new();
        {
            let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
            encoder
                .write_image(
                    &self.buffer,
                    self.width,
                    self.height,
                    image::ColorType::Rgb8,
                )
                .context("Failed to encode PNG")?;
        }
        Ok(png_bytes)
    }
}

fn draw_title(
    root: &DrawingArea<BitMapBackend, Shift>,
    title: Option<&str>,
    width: u32,
) -> Result<()> {
    if let Some(title) = title {
        let x = (width as i32 / 2) - (title.len() as i32 * 5);
        root.draw(&Text::new(
            title.to_string(),
            (x.max(0), 10),
            ("sans-serif", 20),
        ))
        .context("Failed to draw title")?;
    }
    Ok(())
}

/// (row index, numeric value) for every row whose value is numeric.
fn numeric_points(values: &[Value]) -> Vec<(usize, f64)> {
    values
        .iter()
        .enumerate()
        .filter_map(|(idx, v)| v.as_number().map(|n| (idx, n)))
        .collect()
}

/// Display label per row: the label value if present, else the row number.
fn axis_labels(chart: &ChartDataset) -> Vec<String> {
    chart
        .labels
        .iter()
        .enumerate()
        .map(|(idx, label)| {
            if label.is_missing() {
                idx.to_string()
            } else {
                label.to_string()
            }
        })
        .collect()
}

fn tick_label(labels: &[String], x: f64) -> String {
    let idx = x as usize;
    labels.get(idx).cloned().unwrap_or_default()
}

/// Padded value range over the numeric points: 5% padding, widened by one
/// unit for degenerate ranges, fallback 0..1 when empty.
fn value_range(points: &[(usize, f64)], include_zero: bool) -> Range<f64> {
    if points.is_empty() {
        return 0.0..1.0;
    }
    let mut min = points.iter().map(|(_, v)| *v).fold(f64::INFINITY, f64::min);
    let mut max = points
        .iter()
        .map(|(_, v)| *v)
        .fold(f64::NEG_INFINITY, f64::max);
    if include_zero {
        min = min.min(0.0);
        max = max.max(0.0);
    }
    if min == max {
        (min - 1.0)..(max + 1.0)
    } else {
        let padding = (max - min) * 0.05;
        (min - padding)..(max + padding)
    }
}

fn sector_outline(cx: f64, cy: f64, inner: f64, outer: f64, start: f64, end: f64) -> Vec<(i32, i32)> {
    // 2-degree arc steps keep the outline smooth at typical sizes.
    let steps = (((end - start) / PI * 90.0).ceil() as usize).max(1);
    let arc = |r: f64, t: f64| {
        let a = start + (end - start) * t;
        ((cx + a.cos() * r) as i32, (cy + a.sin() * r) as i32)
    };

    let mut outline = Vec::with_capacity(2 * steps + 3);
    if inner == 0.0 {
        outline.push((cx as i32, cy as i32));
    } else {
        for i in (0..=steps).rev() {
            outline.push(arc(inner, i as f64 / steps as f64));
        }
    }
    for i in 0..=steps {
        outline.push(arc(outer, i as f64 / steps as f64));
    }
    outline
}
