//! Batch orchestration: run every plot request in one mode and tally results.

use crate::config::Config;
use crate::error::{QaError, QaResult};
use crate::model::{self, PlotContext, RequestReport};
use crate::render::Canvas;
use crate::source::HistogramSource;
use std::fmt;
use std::process::ExitCode;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_NO_OUTPUT: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Overlay,
    Single,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub requests: usize,
    pub runs_drawn: usize,
    pub runs_skipped: usize,
    pub images_written: usize,
    pub failed_requests: usize,
}

impl Summary {
    fn add(&mut self, report: &RequestReport) {
        self.requests += 1;
        self.runs_drawn += report.drawn.len();
        self.runs_skipped += report.skipped.len();
        self.images_written += report.written.len();
        if report.failure.is_some() {
            self.failed_requests += 1;
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.images_written == 0 {
            ExitCode::from(EXIT_NO_OUTPUT)
        } else {
            ExitCode::SUCCESS
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "requests processed: {}, runs drawn: {}, runs skipped: {}, images written: {}",
            self.requests, self.runs_drawn, self.runs_skipped, self.images_written
        )?;
        if self.failed_requests > 0 {
            write!(f, ", failed requests: {}", self.failed_requests)?;
        }
        Ok(())
    }
}

/// Exit code for a batch that ended in `Err`. Configuration faults (and
/// anything that is not a `QaError`, such as an unreadable config file) map
/// to `EXIT_CONFIG`; any other fault means nothing was produced.
pub fn failure_exit_code(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<QaError>() {
        Some(e) if !e.is_config() => ExitCode::from(EXIT_NO_OUTPUT),
        _ => ExitCode::from(EXIT_CONFIG),
    }
}

/// Check that every destination the mode needs is configured, before any
/// container is opened.
fn check_layout(cfg: &Config, mode: Mode) -> QaResult<()> {
    match mode {
        Mode::Overlay => cfg.layout.overlay_dir().map(|_| ()),
        Mode::Single => cfg
            .requests
            .iter()
            .try_for_each(|r| cfg.layout.single_dir(&r.hist_name).map(|_| ())),
    }
}

/// Run all requests of `cfg` in `mode`. `Err` only for configuration faults;
/// per-run and per-request problems are counted in the summary.
pub fn run_batch<S: HistogramSource, C: Canvas>(
    cfg: &Config,
    source: &S,
    canvas: &mut C,
    mode: Mode,
) -> QaResult<Summary> {
    check_layout(cfg, mode)?;
    if cfg.cut.enabled && mode == Mode::Single {
        let names: Vec<&str> = cfg.cut.applies_to.iter().map(String::as_str).collect();
        tracing::info!(threshold = cfg.cut.threshold, hists = ?names, "low cut enabled");
        if names.is_empty() {
            tracing::warn!("low cut enabled but no histogram is listed for it");
        }
    }

    let ctx = PlotContext::new(cfg, source);
    let mut summary = Summary::default();

    for req in &cfg.requests {
        tracing::info!(hist = %req.hist_name, mode = ?mode, "start request");
        let report = match mode {
            Mode::Overlay => model::overlay(&ctx, canvas, req)?,
            Mode::Single => model::single(&ctx, canvas, req)?,
        };
        tracing::info!(
            hist = %req.hist_name,
            drawn = report.drawn.len(),
            skipped = report.skipped.len(),
            written = report.written.len(),
            "request complete"
        );
        summary.add(&report);
    }

    Ok(summary)
}
