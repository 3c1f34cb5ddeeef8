//! Typed failures reported by the leaves of the pipeline.
//!
//! Per-run faults (missing/corrupt containers, missing histograms) are
//! downgraded to skips by the plotting modes; configuration faults abort the
//! invocation before anything is drawn.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QaError {
    #[error("unknown run: {0}")]
    UnknownRun(String),

    #[error("duplicate run in registry: {0}")]
    DuplicateRun(String),

    #[error("bad config: {0}")]
    BadConfig(String),

    #[error("container for run {run} not found at {}: {reason}", .path.display())]
    SourceMissing {
        run: String,
        path: PathBuf,
        reason: String,
    },

    #[error("container for run {run} at {} is corrupt: {reason}", .path.display())]
    SourceCorrupt {
        run: String,
        path: PathBuf,
        reason: String,
    },

    #[error("histogram {name} unavailable for run {run}: {reason}")]
    HistogramMissing {
        run: String,
        name: String,
        reason: String,
    },

    #[error("no run produced a histogram for {0}; overlay not written")]
    EmptyOverlay(String),

    #[error("failed to write {}: {reason}", .path.display())]
    WriteFailed { path: PathBuf, reason: String },
}

impl QaError {
    /// Configuration faults are fatal for the whole invocation.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            QaError::UnknownRun(_) | QaError::DuplicateRun(_) | QaError::BadConfig(_)
        )
    }

    /// Per-run faults that the plotting modes recover from by skipping the run.
    pub fn is_run_skip(&self) -> bool {
        matches!(
            self,
            QaError::SourceMissing { .. }
                | QaError::SourceCorrupt { .. }
                | QaError::HistogramMissing { .. }
        )
    }

    pub fn bad_config(msg: impl Into<String>) -> Self {
        QaError::BadConfig(msg.into())
    }
}

pub type QaResult<T> = std::result::Result<T, QaError>;
