//! PNG output through the plotters bitmap backend.

use crate::config::Rgb;
use crate::error::{QaError, QaResult};
use crate::hist::Histogram1D;
use crate::model::Figure;
use crate::model::figure::{Annotation, Legend, NdcBox, StatsBox};
use crate::render::Canvas;
use crate::render::text::markup_to_unicode;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::fs;
use std::path::Path;

const MARGIN: u32 = 16;
const CAPTION_SIZE: u32 = 22;
const AXIS_TITLE_SIZE: u32 = 16;
const X_LABEL_AREA: u32 = 50;
/// Y label area at title offset 1.0.
const BASE_Y_LABEL_AREA: f64 = 60.0;

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;
type DrawResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Debug, Default)]
pub struct PngCanvas;

impl Canvas for PngCanvas {
    fn save(&mut self, figure: &Figure, path: &Path) -> QaResult<()> {
        let failed = |reason: String| QaError::WriteFailed {
            path: path.to_path_buf(),
            reason,
        };
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .map_err(|e| failed(format!("create {}: {}", dir.display(), e)))?;
        }
        draw_figure(figure, path).map_err(|e| failed(e.to_string()))
    }
}

fn color(c: Rgb) -> RGBColor {
    RGBColor(c.r, c.g, c.b)
}

fn draw_figure(fig: &Figure, path: &Path) -> DrawResult {
    let (width, height) = fig.size;
    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let (x0, x1) = fig.x_range;
    let (y0, y1) = fig.y_range;
    let axis_title = ("sans-serif", AXIS_TITLE_SIZE)
        .into_font()
        .style(FontStyle::Bold);

    let mut chart = ChartBuilder::on(&root)
        .margin(MARGIN)
        .caption(markup_to_unicode(&fig.title), ("sans-serif", CAPTION_SIZE))
        .x_label_area_size(X_LABEL_AREA)
        .y_label_area_size((BASE_Y_LABEL_AREA * fig.y_title_offset).round() as u32)
        .build_cartesian_2d(x0..x1, (y0..y1).log_scale())?;

    {
        let y_ticks = |v: &f64| tick_label(*v);
        let mut mesh = chart.configure_mesh();
        mesh.x_desc(markup_to_unicode(&fig.x_label))
            .y_desc(markup_to_unicode(&fig.y_label))
            .y_label_formatter(&y_ticks)
            .axis_desc_style(axis_title);
        if !fig.grid {
            mesh.disable_mesh();
        }
        mesh.draw()?;
    }

    for h in &fig.hists {
        let c = color(h.style.color);
        let steps = step_points(h, fig.x_range, fig.y_range);
        if !steps.is_empty() {
            chart.draw_series(std::iter::once(PathElement::new(
                steps,
                c.stroke_width(h.style.line_width),
            )))?;
        }

        if let Some(radius) = h.style.marker_size {
            chart.draw_series(
                marker_points(h, fig.x_range, fig.y_range)
                    .into_iter()
                    .map(|pt| Circle::new(pt, radius, c.filled())),
            )?;
        }
    }

    if let Some(legend) = &fig.legend {
        draw_legend(&root, legend, fig.size)?;
    }
    if let Some(stats) = &fig.stats {
        draw_stats(&root, stats, fig.size)?;
    }
    for a in &fig.annotations {
        draw_annotation(&root, a, fig.size)?;
    }

    root.present()?;
    Ok(())
}

/// Step outline of `h` trimmed to the x axis. Contents outside the y axis
/// (including zeroed bins on a log axis) are pinned to its edges.
fn step_points(h: &Histogram1D, (x0, x1): (f64, f64), (y0, y1): (f64, f64)) -> Vec<(f64, f64)> {
    h.bins()
        .filter_map(|(lo, hi, content)| {
            let (lo, hi) = (lo.max(x0), hi.min(x1));
            (lo < hi).then(|| {
                let y = content.clamp(y0, y1);
                [(lo, y), (hi, y)]
            })
        })
        .flatten()
        .collect()
}

/// Bin centers and contents that fall inside both axes.
fn marker_points(h: &Histogram1D, (x0, x1): (f64, f64), (y0, y1): (f64, f64)) -> Vec<(f64, f64)> {
    (0..h.n_bins())
        .map(|i| (h.center(i), h.contents()[i]))
        .filter(|&(x, y)| (x0..=x1).contains(&x) && (y0..=y1).contains(&y))
        .collect()
}

/// Compact tick text: at most three significant digits, scientific outside
/// 1e-3..1e5.
fn tick_label(v: f64) -> String {
    if v == 0.0 || !v.is_finite() {
        return v.to_string();
    }
    let exp = v.abs().log10().floor() as i32;
    if (-3..=4).contains(&exp) {
        let decimals = (2 - exp).max(0) as usize;
        trim_zeros(&format!("{:.*}", decimals, v))
    } else {
        let s = format!("{:.2e}", v);
        match s.split_once('e') {
            Some((mantissa, e)) => format!("{}e{}", trim_zeros(mantissa), e),
            None => s,
        }
    }
}

fn trim_zeros(s: &str) -> String {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s.to_string()
    }
}

fn ndc_to_px(x: f64, y: f64, (w, h): (u32, u32)) -> (i32, i32) {
    (
        (x * w as f64).round() as i32,
        ((1.0 - y) * h as f64).round() as i32,
    )
}

/// Top-left and bottom-right pixel corners.
fn box_px(b: &NdcBox, size: (u32, u32)) -> ((i32, i32), (i32, i32)) {
    (ndc_to_px(b.x1, b.y2, size), ndc_to_px(b.x2, b.y1, size))
}

fn text_px(fraction: f64, (_, h): (u32, u32)) -> f64 {
    (fraction * h as f64).max(1.0)
}

fn draw_legend(root: &Area<'_>, legend: &Legend, size: (u32, u32)) -> DrawResult {
    if legend.entries.is_empty() {
        return Ok(());
    }
    let ((left, top), (right, bottom)) = box_px(&legend.area, size);
    root.draw(&Rectangle::new(
        [(left, top), (right, bottom)],
        WHITE.mix(legend.fill_alpha).filled(),
    ))?;
    if legend.border > 0 {
        root.draw(&Rectangle::new(
            [(left, top), (right, bottom)],
            BLACK.stroke_width(legend.border),
        ))?;
    }

    let columns = legend.columns.max(1);
    let rows = legend.entries.len().div_ceil(columns);
    let cell_w = (right - left) / columns as i32;
    let cell_h = (bottom - top) / rows as i32;
    let swatch = ((cell_w as f64) * legend.margin).round() as i32;
    let style = TextStyle::from(("sans-serif", text_px(legend.text_size, size)).into_font())
        .pos(Pos::new(HPos::Left, VPos::Center));

    // Filled row by row, left to right.
    for (i, entry) in legend.entries.iter().enumerate() {
        let x = left + (i % columns) as i32 * cell_w;
        let y = top + (i / columns) as i32 * cell_h + cell_h / 2;
        root.draw(&PathElement::new(
            vec![(x + 3, y), (x + swatch, y)],
            color(entry.color).stroke_width(2),
        ))?;
        root.draw(&Text::new(entry.label.clone(), (x + swatch + 4, y), style.clone()))?;
    }
    Ok(())
}

fn draw_stats(root: &Area<'_>, stats: &StatsBox, size: (u32, u32)) -> DrawResult {
    let ((left, top), (right, bottom)) = box_px(&stats.area, size);
    root.draw(&Rectangle::new([(left, top), (right, bottom)], WHITE.filled()))?;
    root.draw(&Rectangle::new([(left, top), (right, bottom)], BLACK.stroke_width(1)))?;

    let font = ("sans-serif", 13.0).into_font();
    let lines = [
        ("Entries", stats.entries.to_string()),
        ("Mean", format!("{:.4}", stats.mean)),
        ("Std Dev", format!("{:.4}", stats.std_dev)),
    ];
    let row_h = (bottom - top) / (lines.len() as i32 + 1);

    let name_style = TextStyle::from(font.clone()).pos(Pos::new(HPos::Center, VPos::Center));
    root.draw(&Text::new(
        stats.name.clone(),
        ((left + right) / 2, top + row_h / 2),
        name_style,
    ))?;

    let key_style = TextStyle::from(font.clone()).pos(Pos::new(HPos::Left, VPos::Center));
    let value_style = TextStyle::from(font).pos(Pos::new(HPos::Right, VPos::Center));
    for (i, (key, value)) in lines.iter().enumerate() {
        let y = top + row_h * (i as i32 + 1) + row_h / 2;
        root.draw(&Text::new(*key, (left + 6, y), key_style.clone()))?;
        root.draw(&Text::new(value.clone(), (right - 6, y), value_style.clone()))?;
    }
    Ok(())
}

fn draw_annotation(root: &Area<'_>, a: &Annotation, size: (u32, u32)) -> DrawResult {
    let style = TextStyle::from(("sans-serif", text_px(a.text_size, size)).into_font())
        .pos(Pos::new(HPos::Left, VPos::Bottom));
    root.draw(&Text::new(
        markup_to_unicode(&a.text),
        ndc_to_px(a.x, a.y, size),
        style,
    ))?;
    Ok(())
}
