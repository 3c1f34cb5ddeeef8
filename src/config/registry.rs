//! Ordered run table shared by both plotting modes.

use crate::config::Rgb;
use crate::error::{QaError, QaResult};
use std::collections::HashMap;
use std::fmt;

/// Opaque run identifier (e.g. "21813").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunId(pub String);

impl RunId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunMeta {
    pub color: Rgb,
    pub seb_count: u32,
}

/// Runs in insertion order. Overlays iterate this order, so it is the
/// legend order too.
#[derive(Debug, Clone, Default)]
pub struct RunRegistry {
    order: Vec<RunId>,
    meta: HashMap<RunId, RunMeta>,
}

impl RunRegistry {
    pub fn new(entries: impl IntoIterator<Item = (RunId, RunMeta)>) -> QaResult<Self> {
        let mut reg = RunRegistry::default();
        for (run, meta) in entries {
            if meta.seb_count == 0 {
                return Err(QaError::bad_config(format!(
                    "run {} has non-positive sebCount",
                    run
                )));
            }
            if reg.meta.contains_key(&run) {
                return Err(QaError::DuplicateRun(run.0));
            }
            reg.meta.insert(run.clone(), meta);
            reg.order.push(run);
        }
        Ok(reg)
    }

    pub fn runs(&self) -> &[RunId] {
        &self.order
    }

    pub fn meta(&self, run: &RunId) -> QaResult<RunMeta> {
        self.meta
            .get(run)
            .copied()
            .ok_or_else(|| QaError::UnknownRun(run.0.clone()))
    }
}
