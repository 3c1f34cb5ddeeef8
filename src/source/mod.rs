//! Histogram source: per-run containers addressed by run id and object name.
//!
//! A handle owns whatever the open container holds and releases it when
//! dropped, so the handle's scope is the acquisition scope. Callers keep the
//! scope to a single run.

pub mod container;
#[cfg(test)]
pub mod memory;

pub use container::JsonContainerSource;

use crate::config::RunId;
use crate::error::QaResult;
use crate::hist::Histogram1D;

pub trait HistogramSource {
    type Handle: RunHandle;

    /// Open the container for `run`.
    ///
    /// Fails with `SourceMissing` when it cannot be located or read and with
    /// `SourceCorrupt` when it is not a valid container.
    fn open(&self, run: &RunId) -> QaResult<Self::Handle>;
}

pub trait RunHandle {
    /// Fetch a 1-D histogram by name; `HistogramMissing` if absent or not 1-D.
    fn get(&self, name: &str) -> QaResult<Histogram1D>;

    /// The designated normalization histogram of this container.
    fn normalization(&self) -> QaResult<Histogram1D>;

    /// Release the container. Dropping the handle has the same effect.
    fn close(self)
    where
        Self: Sized,
    {
        drop(self)
    }
}

/// A run's target histogram together with its normalization histogram.
#[derive(Debug, Clone)]
pub struct RunHistograms {
    pub target: Histogram1D,
    pub normalization: Histogram1D,
}

/// Open `run`, read `hist_name` and the normalization histogram, and release
/// the container before returning, whether or not the reads succeeded.
pub fn load_run<S: HistogramSource>(
    source: &S,
    run: &RunId,
    hist_name: &str,
) -> QaResult<RunHistograms> {
    let handle = source.open(run)?;
    let loaded = handle.get(hist_name).and_then(|target| {
        let normalization = handle.normalization()?;
        Ok(RunHistograms {
            target,
            normalization,
        })
    });
    handle.close();
    loaded
}
