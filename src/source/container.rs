//! JSON named-object containers, one per run.
//!
//! Location: `<baseInputDir>/<RunId>/<containerFileName>`.
//!
//! Shape:
//! {
//!   "objects": {
//!     "hClusterPt": {
//!       "type": "TH1F",
//!       "title": "...", "xLabel": "...", "yLabel": "...",
//!       "edges": [0.0, 1.0, 2.0],           // or nBins / xMin / xMax
//!       "contents": [10.0, 4.0],
//!       "underflow": 0.0, "overflow": 1.0,   // optional
//!       "entries": 15                        // optional, defaults to sum
//!     },
//!     "hTowerEtaPhi": { "type": "TH2F", ... }
//!   }
//! }
//!
//! Objects are decoded lazily on `get`, so one malformed object does not
//! poison the rest of the container.

use crate::config::{Config, RunId};
use crate::error::{QaError, QaResult};
use crate::hist::Histogram1D;
use crate::source::{HistogramSource, RunHandle};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct JsonContainerSource {
    base_dir: PathBuf,
    file_name: String,
    normalization_name: String,
}

impl JsonContainerSource {
    pub fn new(
        base_dir: impl Into<PathBuf>,
        file_name: impl Into<String>,
        normalization_name: impl Into<String>,
    ) -> Self {
        Self {
            base_dir: base_dir.into(),
            file_name: file_name.into(),
            normalization_name: normalization_name.into(),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(
            cfg.base_input_dir.clone(),
            cfg.container_file_name.clone(),
            cfg.normalization_hist_name.clone(),
        )
    }

    fn path_for(&self, run: &RunId) -> PathBuf {
        self.base_dir.join(run.as_str()).join(&self.file_name)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ContainerDoc {
    objects: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredHist1D {
    #[serde(default)]
    title: String,
    #[serde(default)]
    x_label: String,
    #[serde(default)]
    y_label: String,
    #[serde(default)]
    edges: Option<Vec<f64>>,
    #[serde(default)]
    n_bins: Option<usize>,
    #[serde(default)]
    x_min: Option<f64>,
    #[serde(default)]
    x_max: Option<f64>,
    contents: Vec<f64>,
    #[serde(default)]
    underflow: f64,
    #[serde(default)]
    overflow: f64,
    #[serde(default)]
    entries: Option<u64>,
}

impl StoredHist1D {
    fn into_histogram(self, name: &str) -> Result<Histogram1D, String> {
        let mut h = match (self.edges, self.n_bins, self.x_min, self.x_max) {
            (Some(edges), None, None, None) => Histogram1D::from_edges(name, edges, self.contents)?,
            (None, Some(n), Some(lo), Some(hi)) => Histogram1D::uniform(name, n, lo, hi, self.contents)?,
            _ => {
                return Err(
                    "binning must be either `edges` or all of `nBins`, `xMin`, `xMax`".to_string(),
                );
            }
        };
        if h.contents().iter().any(|c| !c.is_finite()) {
            return Err("bin contents must be finite".to_string());
        }
        h.title = self.title;
        h.x_label = self.x_label;
        h.y_label = self.y_label;
        h.underflow = self.underflow;
        h.overflow = self.overflow;
        if let Some(entries) = self.entries {
            h.entries = entries;
        }
        Ok(h)
    }
}

impl HistogramSource for JsonContainerSource {
    type Handle = JsonRunHandle;

    fn open(&self, run: &RunId) -> QaResult<JsonRunHandle> {
        let path = self.path_for(run);
        let bytes = fs::read(&path).map_err(|e| QaError::SourceMissing {
            run: run.to_string(),
            path: path.clone(),
            reason: e.to_string(),
        })?;
        let doc: ContainerDoc =
            serde_json::from_slice(&bytes).map_err(|e| QaError::SourceCorrupt {
                run: run.to_string(),
                path: path.clone(),
                reason: e.to_string(),
            })?;
        tracing::debug!(run = %run, path = %path.display(), objects = doc.objects.len(), "opened container");
        Ok(JsonRunHandle {
            run: run.clone(),
            objects: doc.objects,
            normalization_name: self.normalization_name.clone(),
        })
    }
}

/// An open container. Its objects are dropped together with the handle.
#[derive(Debug)]
pub struct JsonRunHandle {
    run: RunId,
    objects: BTreeMap<String, Value>,
    normalization_name: String,
}

impl JsonRunHandle {
    fn missing(&self, name: &str, reason: impl Into<String>) -> QaError {
        QaError::HistogramMissing {
            run: self.run.to_string(),
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

impl RunHandle for JsonRunHandle {
    fn get(&self, name: &str) -> QaResult<Histogram1D> {
        let obj = self
            .objects
            .get(name)
            .ok_or_else(|| self.missing(name, "not found in container"))?;

        let kind = obj.get("type").and_then(Value::as_str).unwrap_or("<untyped>");
        if !kind.starts_with("TH1") {
            return Err(self.missing(name, format!("object is a {}, not a 1-D histogram", kind)));
        }

        let stored: StoredHist1D = serde_json::from_value(obj.clone())
            .map_err(|e| self.missing(name, format!("malformed {}: {}", kind, e)))?;
        stored
            .into_histogram(name)
            .map_err(|e| self.missing(name, format!("malformed {}: {}", kind, e)))
    }

    fn normalization(&self) -> QaResult<Histogram1D> {
        self.get(&self.normalization_name)
    }
}

impl Drop for JsonRunHandle {
    fn drop(&mut self) {
        tracing::debug!(run = %self.run, "released container");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::load_run;
    use pretty_assertions::assert_eq;
    use std::path::Path;
    use tempfile::TempDir;

    const CONTAINER: &str = r#"{
        "objects": {
            "hClusterPt": {
                "type": "TH1F",
                "title": "Cluster pT",
                "xLabel": "pT (GeV)",
                "edges": [0.0, 1.0, 2.0, 4.0],
                "contents": [10.0, 4.0, 1.0],
                "overflow": 2.0,
                "entries": 17
            },
            "hTotalMBD": {
                "type": "TH1D",
                "nBins": 4, "xMin": 0.0, "xMax": 2.0,
                "contents": [1.0, 2.0, 3.0, 4.0]
            },
            "hNClusters": {
                "type": "TH1I",
                "nBins": 2, "xMin": 0.0, "xMax": 10.0,
                "contents": [30.0, 20.0],
                "entries": 50
            },
            "hTowerEtaPhi": { "type": "TH2F", "contents": [] },
            "hBroken": { "type": "TH1F", "edges": [0.0, 1.0], "contents": [1.0, 2.0] }
        }
    }"#;

    fn write_run(base: &Path, run: &str, body: &str) {
        let dir = base.join(run);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("qa.json"), body).unwrap();
    }

    fn source(base: &Path) -> JsonContainerSource {
        JsonContainerSource::new(base, "qa.json", "hNClusters")
    }

    #[test]
    fn reads_explicit_and_uniform_binning() {
        let tmp = TempDir::new().unwrap();
        write_run(tmp.path(), "21813", CONTAINER);
        let handle = source(tmp.path()).open(&RunId::new("21813")).unwrap();

        let pt = handle.get("hClusterPt").unwrap();
        assert_eq!(pt.edges(), &[0.0, 1.0, 2.0, 4.0]);
        assert_eq!(pt.entries, 17);
        assert_eq!(pt.overflow, 2.0);
        assert_eq!(pt.x_label, "pT (GeV)");

        let mbd = handle.get("hTotalMBD").unwrap();
        assert_eq!(mbd.n_bins(), 4);
        assert_eq!(mbd.center(0), 0.25);
        assert_eq!(mbd.entries, 10);

        assert_eq!(handle.normalization().unwrap().entries, 50);
    }

    #[test]
    fn missing_container_is_source_missing() {
        let tmp = TempDir::new().unwrap();
        let err = source(tmp.path()).open(&RunId::new("21813")).unwrap_err();
        assert!(matches!(err, QaError::SourceMissing { ref run, .. } if run == "21813"));
    }

    #[test]
    fn garbage_container_is_source_corrupt() {
        let tmp = TempDir::new().unwrap();
        write_run(tmp.path(), "21813", "root\0\0zombie");
        write_run(tmp.path(), "21796", r#"{"histograms": {}}"#);
        let src = source(tmp.path());
        for run in ["21813", "21796"] {
            let err = src.open(&RunId::new(run)).unwrap_err();
            assert!(matches!(err, QaError::SourceCorrupt { .. }), "{run}: {err}");
        }
    }

    #[test]
    fn absent_wrong_kind_and_malformed_objects_are_missing() {
        let tmp = TempDir::new().unwrap();
        write_run(tmp.path(), "21813", CONTAINER);
        let handle = source(tmp.path()).open(&RunId::new("21813")).unwrap();

        for name in ["hClusterChi", "hTowerEtaPhi", "hBroken"] {
            let err = handle.get(name).unwrap_err();
            assert!(
                matches!(err, QaError::HistogramMissing { name: ref n, .. } if n == name),
                "{name}: {err}"
            );
        }
        let err = handle.get("hTowerEtaPhi").unwrap_err().to_string();
        assert!(err.contains("TH2F"), "{err}");
    }

    #[test]
    fn load_run_requires_normalization_histogram() {
        let tmp = TempDir::new().unwrap();
        write_run(
            tmp.path(),
            "22950",
            r#"{"objects": {"hTotalMBD": {"type": "TH1F", "edges": [0, 1], "contents": [3]}}}"#,
        );
        let err = load_run(&source(tmp.path()), &RunId::new("22950"), "hTotalMBD").unwrap_err();
        assert!(matches!(err, QaError::HistogramMissing { ref name, .. } if name == "hNClusters"));
    }
}
