//! In-memory source used by the plotting-mode tests.

use crate::config::RunId;
use crate::error::{QaError, QaResult};
use crate::hist::Histogram1D;
use crate::source::{HistogramSource, RunHandle};
use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::rc::Rc;

pub enum Stored {
    Corrupt,
    Objects(BTreeMap<String, Histogram1D>),
}

pub struct MemorySource {
    runs: HashMap<RunId, Stored>,
    normalization_name: String,
    open_handles: Rc<Cell<usize>>,
}

impl MemorySource {
    pub fn new(normalization_name: &str) -> Self {
        Self {
            runs: HashMap::new(),
            normalization_name: normalization_name.to_string(),
            open_handles: Rc::new(Cell::new(0)),
        }
    }

    pub fn with_run(mut self, run: &str, hists: Vec<Histogram1D>) -> Self {
        let objects = hists.into_iter().map(|h| (h.name.clone(), h)).collect();
        self.runs.insert(RunId::new(run), Stored::Objects(objects));
        self
    }

    pub fn with_corrupt(mut self, run: &str) -> Self {
        self.runs.insert(RunId::new(run), Stored::Corrupt);
        self
    }

    /// Handles opened and not yet released.
    pub fn open_handles(&self) -> usize {
        self.open_handles.get()
    }
}

pub struct MemoryHandle {
    run: RunId,
    objects: BTreeMap<String, Histogram1D>,
    normalization_name: String,
    open_handles: Rc<Cell<usize>>,
}

impl HistogramSource for MemorySource {
    type Handle = MemoryHandle;

    fn open(&self, run: &RunId) -> QaResult<MemoryHandle> {
        let path = PathBuf::from(format!("mem://{}", run));
        match self.runs.get(run) {
            None => Err(QaError::SourceMissing {
                run: run.to_string(),
                path,
                reason: "no such run".into(),
            }),
            Some(Stored::Corrupt) => Err(QaError::SourceCorrupt {
                run: run.to_string(),
                path,
                reason: "not a container".into(),
            }),
            Some(Stored::Objects(objects)) => {
                self.open_handles.set(self.open_handles.get() + 1);
                Ok(MemoryHandle {
                    run: run.clone(),
                    objects: objects.clone(),
                    normalization_name: self.normalization_name.clone(),
                    open_handles: Rc::clone(&self.open_handles),
                })
            }
        }
    }
}

impl RunHandle for MemoryHandle {
    fn get(&self, name: &str) -> QaResult<Histogram1D> {
        self.objects
            .get(name)
            .cloned()
            .ok_or_else(|| QaError::HistogramMissing {
                run: self.run.to_string(),
                name: name.to_string(),
                reason: "not found in container".into(),
            })
    }

    fn normalization(&self) -> QaResult<Histogram1D> {
        self.get(&self.normalization_name)
    }
}

impl Drop for MemoryHandle {
    fn drop(&mut self) {
        self.open_handles.set(self.open_handles.get() - 1);
    }
}
