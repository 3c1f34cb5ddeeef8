//! Backend-independent description of one canvas.
//!
//! The plotting modes build a [`Figure`]; a [`crate::render::Canvas`] turns
//! it into an image. Positions of legend, labels and the statistics box are
//! in normalized canvas coordinates (0..1, origin bottom-left).

use crate::config::{PlotRequest, Rgb};
use crate::hist::Histogram1D;

pub const CANVAS_SIZE: (u32, u32) = (800, 600);
pub const Y_TITLE_OFFSET: f64 = 1.4;

/// Rectangle in normalized canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NdcBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub entries: Vec<LegendEntry>,
    pub columns: usize,
    pub area: NdcBox,
    /// Opacity of the white fill.
    pub fill_alpha: f64,
    pub border: u32,
    /// Fraction of each cell reserved for the line swatch.
    pub margin: f64,
    /// Text height as a fraction of canvas height.
    pub text_size: f64,
}

impl Legend {
    pub fn overlay() -> Self {
        Self {
            entries: Vec::new(),
            columns: 2,
            area: NdcBox {
                x1: 0.6,
                y1: 0.6,
                x2: 0.9,
                y2: 0.9,
            },
            fill_alpha: 0.2,
            border: 1,
            margin: 0.15,
            text_size: 0.025,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub text_size: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatsBox {
    pub name: String,
    pub entries: u64,
    pub mean: f64,
    pub std_dev: f64,
    pub area: NdcBox,
}

impl StatsBox {
    pub fn of(h: &Histogram1D) -> Self {
        Self {
            name: h.name.clone(),
            entries: h.entries,
            mean: h.mean(),
            std_dev: h.std_dev(),
            area: NdcBox {
                x1: 0.78,
                y1: 0.775,
                x2: 0.98,
                y2: 0.935,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub size: (u32, u32),
    pub x_label: String,
    pub y_label: String,
    pub y_title_offset: f64,
    pub grid: bool,
    pub x_range: (f64, f64),
    /// Log-scale y range; both bounds strictly positive.
    pub y_range: (f64, f64),
    /// Drawn in order; the first one is underneath.
    pub hists: Vec<Histogram1D>,
    pub legend: Option<Legend>,
    pub annotations: Vec<Annotation>,
    pub stats: Option<StatsBox>,
}

impl Figure {
    /// Shared style: log-y, grid, bold axis titles, enlarged y-title offset,
    /// 800x600, no legend or stats box.
    pub fn new(title: impl Into<String>, req: &PlotRequest, x_range: (f64, f64), y_range: (f64, f64)) -> Self {
        Self {
            title: title.into(),
            size: CANVAS_SIZE,
            x_label: req.x_label.clone(),
            y_label: req.y_label.clone(),
            y_title_offset: Y_TITLE_OFFSET,
            grid: true,
            x_range,
            y_range,
            hists: Vec::new(),
            legend: None,
            annotations: Vec::new(),
            stats: None,
        }
    }
}

/// Log-y axis bounds covering the positive contents of `hists`, padded by a
/// factor of two either side. Falls back to one decade when nothing is
/// positive.
pub fn log_y_range<'a>(hists: impl IntoIterator<Item = &'a Histogram1D>) -> (f64, f64) {
    let span = hists
        .into_iter()
        .filter_map(Histogram1D::positive_content_range)
        .reduce(|(lo, hi), (l, h)| (lo.min(l), hi.max(h)));
    match span {
        Some((lo, hi)) => (lo * 0.5, hi * 2.0),
        None => (0.1, 1.0),
    }
}

/// Union of the x extents of `hists`.
pub fn x_range<'a>(hists: impl IntoIterator<Item = &'a Histogram1D>) -> Option<(f64, f64)> {
    hists
        .into_iter()
        .map(Histogram1D::x_range)
        .reduce(|(lo, hi), (l, h)| (lo.min(l), hi.max(h)))
}
