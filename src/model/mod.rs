//! Plotting modes: combine run registry, histogram source and transforms into
//! figures, one request at a time.

pub mod figure;
pub mod overlay;
pub mod single;

pub use figure::Figure;
pub use overlay::overlay;
pub use single::single;

use crate::config::{
    Config, CutSpec, NormalizationCount, OutputLayout, OverlayRange, RunId, RunMeta, RunRegistry,
};
use crate::diagnostics;
use crate::error::QaError;
use crate::hist::{self, Histogram1D};
use crate::source::RunHistograms;
use std::path::PathBuf;

/// Everything a plotting mode reads; borrowed for the duration of a batch.
pub struct PlotContext<'a, S> {
    pub source: &'a S,
    pub registry: &'a RunRegistry,
    pub layout: &'a OutputLayout,
    /// `None` disables normalization.
    pub normalize: Option<NormalizationCount>,
    pub cut: &'a CutSpec,
    pub overlay_range: OverlayRange,
    pub annotation: &'a str,
}

impl<'a, S> PlotContext<'a, S> {
    pub fn new(cfg: &'a Config, source: &'a S) -> Self {
        Self {
            source,
            registry: &cfg.registry,
            layout: &cfg.layout,
            normalize: cfg.normalize_enabled.then_some(cfg.normalization_count),
            cut: &cfg.cut,
            overlay_range: cfg.overlay_range,
            annotation: &cfg.annotation,
        }
    }

    /// Apply normalization (if enabled) using the run's SEB count and the
    /// normalization histogram's event count.
    fn normalized(&self, run: &RunId, loaded: RunHistograms, meta: RunMeta) -> Histogram1D {
        let Some(count) = self.normalize else {
            tracing::info!(run = %run, "no normalization applied");
            return loaded.target;
        };
        let n_events = match count {
            NormalizationCount::Entries => loaded.normalization.entries as f64,
            NormalizationCount::Integral => loaded.normalization.integral(),
        };
        tracing::info!(run = %run, n_events, seb_count = meta.seb_count, "normalizing");
        hist::normalize(loaded.target, n_events, meta.seb_count)
    }
}

/// Outcome of one plot request.
#[derive(Debug, Default)]
pub struct RequestReport {
    pub hist_name: String,
    /// Runs whose histogram reached a figure.
    pub drawn: Vec<RunId>,
    pub skipped: Vec<RunId>,
    pub written: Vec<PathBuf>,
    /// Request-level failure (empty overlay, write failure).
    pub failure: Option<QaError>,
}

impl RequestReport {
    pub fn new(hist_name: &str) -> Self {
        Self {
            hist_name: hist_name.to_string(),
            ..Self::default()
        }
    }

    fn skip(&mut self, run: &RunId, err: &QaError) {
        diagnostics::skip(&self.hist_name, run, err);
        self.skipped.push(run.clone());
    }

    fn fail(&mut self, err: QaError) {
        diagnostics::request_failed(&self.hist_name, &err);
        self.failure = Some(err);
    }
}
