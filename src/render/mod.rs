//! Rendering backends. A canvas turns a [`Figure`] into an image file.

pub mod png;
pub mod text;

pub use png::PngCanvas;

use crate::error::QaResult;
use crate::model::Figure;
use std::path::Path;

pub trait Canvas {
    /// Render `figure` to `path`. Failures are `WriteFailed`.
    fn save(&mut self, figure: &Figure, path: &Path) -> QaResult<()>;
}

/// Keeps every figure instead of drawing it.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub saved: Vec<(std::path::PathBuf, Figure)>,
    pub attempts: usize,
    fail: bool,
}

#[cfg(test)]
impl RecordingCanvas {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[cfg(test)]
impl Canvas for RecordingCanvas {
    fn save(&mut self, figure: &Figure, path: &Path) -> QaResult<()> {
        self.attempts += 1;
        if self.fail {
            return Err(crate::error::QaError::WriteFailed {
                path: path.to_path_buf(),
                reason: "read-only file system".into(),
            });
        }
        self.saved.push((path.to_path_buf(), figure.clone()));
        Ok(())
    }
}
