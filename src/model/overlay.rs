//! Overlay mode: one histogram name, every run, one canvas.

use crate::config::{OverlayRange, PlotRequest};
use crate::error::{QaError, QaResult};
use crate::hist::HistStyle;
use crate::model::figure::{self, Annotation, Figure, Legend, LegendEntry};
use crate::model::{PlotContext, RequestReport};
use crate::render::Canvas;
use crate::source::{HistogramSource, load_run};

const LINE_WIDTH: u32 = 1;
const MARKER_SIZE: u32 = 3;
const ANNOTATION_X: f64 = 0.67;
const ANNOTATION_Y: f64 = 0.575;
const ANNOTATION_SIZE: f64 = 0.03;

/// Draw `req.hist_name` from every run in registry order onto one log-y
/// canvas and save it as `Overlayed_<histName>.png`.
///
/// Runs that fail to load are skipped. With no surviving run nothing is
/// written and the report carries `EmptyOverlay`. `Err` is reserved for
/// configuration faults.
pub fn overlay<S: HistogramSource, C: Canvas>(
    ctx: &PlotContext<'_, S>,
    canvas: &mut C,
    req: &PlotRequest,
) -> QaResult<RequestReport> {
    let path = ctx.layout.overlay_path(&req.hist_name)?;
    let mut report = RequestReport::new(&req.hist_name);
    let mut legend = Legend::overlay();
    let mut hists = Vec::new();

    for run in ctx.registry.runs() {
        let meta = ctx.registry.meta(run)?;
        tracing::info!(run = %run, hist = %req.hist_name, "overlaying run");

        let loaded = match load_run(ctx.source, run, &req.hist_name) {
            Ok(loaded) => loaded,
            Err(e) if e.is_run_skip() => {
                report.skip(run, &e);
                continue;
            }
            Err(e) => return Err(e),
        };

        let mut h = ctx.normalized(run, loaded, meta);
        h.title = req.display_title.clone();
        h.x_label = req.x_label.clone();
        h.y_label = req.y_label.clone();
        h.style = HistStyle {
            color: meta.color,
            line_width: LINE_WIDTH,
            marker_size: Some(MARKER_SIZE),
        };

        legend.entries.push(LegendEntry {
            label: format!("Run: {}", run),
            color: meta.color,
        });
        hists.push(h);
        report.drawn.push(run.clone());
    }

    let Some(first) = hists.first() else {
        report.fail(QaError::EmptyOverlay(req.hist_name.clone()));
        return Ok(report);
    };

    let (x_range, y_range) = match ctx.overlay_range {
        OverlayRange::First => (first.x_range(), figure::log_y_range([first])),
        OverlayRange::Union => (
            figure::x_range(&hists).unwrap_or(first.x_range()),
            figure::log_y_range(&hists),
        ),
    };

    let mut fig = Figure::new(req.display_title.clone(), req, x_range, y_range);
    fig.hists = hists;
    fig.legend = Some(legend);
    fig.annotations.push(Annotation {
        text: ctx.annotation.to_string(),
        x: ANNOTATION_X,
        y: ANNOTATION_Y,
        text_size: ANNOTATION_SIZE,
    });

    match canvas.save(&fig, &path) {
        Ok(()) => {
            tracing::info!(path = %path.display(), runs = report.drawn.len(), "saved overlay");
            report.written.push(path);
        }
        Err(e) => report.fail(e),
    }
    Ok(report)
}
