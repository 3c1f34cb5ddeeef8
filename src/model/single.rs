//! Single mode: one image per (histogram, run).

use crate::config::PlotRequest;
use crate::error::QaResult;
use crate::hist::{self, HistStyle};
use crate::model::figure::{self, Figure, StatsBox};
use crate::model::{PlotContext, RequestReport};
use crate::render::Canvas;
use crate::source::{HistogramSource, load_run};

const LINE_WIDTH: u32 = 2;

/// Draw `req.hist_name` for each run on its own canvas and save
/// `<histName>_Run_<runId>.png` into the histogram's directory.
///
/// Normalization (if enabled) comes first; the low cut follows when the cut
/// is enabled and lists this histogram. A write failure ends the request.
pub fn single<S: HistogramSource, C: Canvas>(
    ctx: &PlotContext<'_, S>,
    canvas: &mut C,
    req: &PlotRequest,
) -> QaResult<RequestReport> {
    ctx.layout.single_dir(&req.hist_name)?;
    let mut report = RequestReport::new(&req.hist_name);
    let apply_cut = ctx.cut.applies(&req.hist_name);

    for run in ctx.registry.runs() {
        let meta = ctx.registry.meta(run)?;
        tracing::info!(run = %run, hist = %req.hist_name, seb_count = meta.seb_count, "plotting run");

        let loaded = match load_run(ctx.source, run, &req.hist_name) {
            Ok(loaded) => loaded,
            Err(e) if e.is_run_skip() => {
                report.skip(run, &e);
                continue;
            }
            Err(e) => return Err(e),
        };

        let mut h = ctx.normalized(run, loaded, meta);
        if apply_cut {
            tracing::info!(run = %run, threshold = ctx.cut.threshold, "applying low cut");
            h = hist::low_cut(h, ctx.cut.threshold);
        }

        let title = format!("{} (Run: {})", req.display_title, run);
        h.title = title.clone();
        h.x_label = req.x_label.clone();
        h.y_label = req.y_label.clone();
        h.style = HistStyle {
            color: meta.color,
            line_width: LINE_WIDTH,
            marker_size: None,
        };

        let mut fig = Figure::new(title, req, h.x_range(), figure::log_y_range([&h]));
        fig.stats = Some(StatsBox::of(&h));
        fig.hists.push(h);

        let path = ctx.layout.single_path(&req.hist_name, run)?;
        if let Err(e) = canvas.save(&fig, &path) {
            report.fail(e);
            break;
        }
        tracing::info!(run = %run, path = %path.display(), "saved plot");
        report.drawn.push(run.clone());
        report.written.push(path);
    }

    Ok(report)
}
