//! Config file (qa-config.json) as it appears on disk.
//!
//! JSON shape:
//! {
//!   "baseInputDir": "/data/qa/rootOutput",
//!   "containerFileName": "qa.json",          // optional
//!   "overlayOutputDir": "/data/qa/overlay",
//!   "singleOutputDirByHist": { "hClusterPt": "/data/qa/single/Cluster_pt" },
//!   "normalizationHistName": "hNClusters",
//!   "normalizationCount": "entries",          // or "integral"
//!   "normalizeEnabled": true,
//!   "overlayRange": "first",                  // or "union"
//!   "annotation": "sPHENIX EMCal QA",
//!   "runRegistry": [ { "runId": "21813", "color": "kBlue", "sebCount": 7 } ],
//!   "plotRequests": [
//!     { "histName": "hClusterPt", "displayTitle": "Cluster p_{T}",
//!       "xLabel": "Cluster p_{T} (GeV)", "yLabel": "Counts" }
//!   ],
//!   "cutSpec": { "threshold": 1.0, "appliesTo": ["hClusterPt"] }
//! }
//!
//! Validation turns this into a [`Config`]: colors parsed, registry built,
//! ranges checked.

use crate::config::color::parse_color;
use crate::config::registry::{RunId, RunMeta, RunRegistry};
use crate::config::{Config, CutSpec, OutputLayout, PlotRequest};
use crate::error::{QaError, QaResult};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

pub const DEFAULT_CONTAINER_FILE: &str = "qa.json";
pub const DEFAULT_ANNOTATION: &str = "sPHENIX EMCal QA";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigSpec {
    #[serde(default)]
    pub base_input_dir: Option<String>,

    #[serde(default)]
    pub container_file_name: Option<String>,

    #[serde(default)]
    pub overlay_output_dir: Option<String>,

    #[serde(default)]
    pub single_output_dir_by_hist: BTreeMap<String, String>,

    #[serde(default)]
    pub normalization_hist_name: Option<String>,

    #[serde(default)]
    pub normalization_count: NormalizationCount,

    #[serde(default = "default_true")]
    pub normalize_enabled: bool,

    #[serde(default)]
    pub overlay_range: OverlayRange,

    #[serde(default)]
    pub annotation: Option<String>,

    #[serde(default)]
    pub run_registry: Vec<RawRun>,

    #[serde(default)]
    pub plot_requests: Vec<RawRequest>,

    #[serde(default)]
    pub cut_spec: Option<RawCut>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawRun {
    pub run_id: String,
    pub color: String,
    /// Signed so that zero/negative values surface as a range error.
    pub seb_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawRequest {
    pub hist_name: String,
    pub display_title: String,
    #[serde(default)]
    pub x_label: String,
    #[serde(default)]
    pub y_label: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawCut {
    pub threshold: f64,
    #[serde(default)]
    pub applies_to: Vec<String>,
}

/// Which quantity of the normalization histogram counts as "events".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizationCount {
    #[default]
    Entries,
    Integral,
}

/// How overlay axes are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayRange {
    /// The first drawn run fixes the axes; later runs may clip.
    #[default]
    First,
    /// Axes cover every drawn run.
    Union,
}

fn non_empty(field: &str, value: Option<String>) -> QaResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(QaError::bad_config(format!("{} is not set", field))),
    }
}

impl ConfigSpec {
    /// Validate the raw config and build the in-memory form:
    /// - required locations present (output dirs are checked per mode later)
    /// - registry: unique run ids, parsable colors, positive SEB counts
    /// - at least one plot request, unique hist names
    /// - cut threshold finite
    pub fn validate_and_build(self) -> QaResult<Config> {
        let base_input_dir = PathBuf::from(non_empty("baseInputDir", self.base_input_dir)?);
        let normalization_hist_name =
            non_empty("normalizationHistName", self.normalization_hist_name)?;

        let container_file_name = self
            .container_file_name
            .unwrap_or_else(|| DEFAULT_CONTAINER_FILE.to_string());
        if container_file_name.trim().is_empty() || container_file_name.contains('/') {
            return Err(QaError::bad_config(format!(
                "containerFileName must be a plain file name, got {:?}",
                container_file_name
            )));
        }

        if self.run_registry.is_empty() {
            return Err(QaError::bad_config("runRegistry is empty"));
        }
        let mut runs = Vec::with_capacity(self.run_registry.len());
        for raw in self.run_registry {
            if raw.run_id.trim().is_empty() {
                return Err(QaError::bad_config("runRegistry contains an empty runId"));
            }
            if raw.seb_count <= 0 || raw.seb_count > u32::MAX as i64 {
                return Err(QaError::bad_config(format!(
                    "run {} has out-of-range sebCount {}",
                    raw.run_id, raw.seb_count
                )));
            }
            let color = parse_color(&raw.color).map_err(|e| {
                QaError::bad_config(format!("run {}: {}", raw.run_id, e))
            })?;
            runs.push((
                RunId::new(raw.run_id),
                RunMeta {
                    color,
                    seb_count: raw.seb_count as u32,
                },
            ));
        }
        let registry = RunRegistry::new(runs)?;

        if self.plot_requests.is_empty() {
            return Err(QaError::bad_config("plotRequests is empty"));
        }
        let mut seen = BTreeSet::new();
        let mut requests = Vec::with_capacity(self.plot_requests.len());
        for raw in self.plot_requests {
            if raw.hist_name.trim().is_empty() {
                return Err(QaError::bad_config("plotRequests contains an empty histName"));
            }
            if !seen.insert(raw.hist_name.clone()) {
                return Err(QaError::bad_config(format!(
                    "duplicate plot request for {}",
                    raw.hist_name
                )));
            }
            requests.push(PlotRequest {
                hist_name: raw.hist_name,
                display_title: raw.display_title,
                x_label: raw.x_label,
                y_label: raw.y_label,
            });
        }

        let cut = match self.cut_spec {
            Some(raw) => {
                if !raw.threshold.is_finite() {
                    return Err(QaError::bad_config("cutSpec.threshold must be finite"));
                }
                CutSpec {
                    enabled: true,
                    threshold: raw.threshold,
                    applies_to: raw.applies_to.into_iter().collect(),
                }
            }
            None => CutSpec::disabled(),
        };

        let overlay_dir = self
            .overlay_output_dir
            .filter(|d| !d.trim().is_empty())
            .map(PathBuf::from);
        let mut single_dirs = BTreeMap::new();
        for (hist, dir) in self.single_output_dir_by_hist {
            if dir.trim().is_empty() {
                return Err(QaError::bad_config(format!(
                    "singleOutputDirByHist.{} is empty",
                    hist
                )));
            }
            single_dirs.insert(hist, PathBuf::from(dir));
        }

        Ok(Config {
            base_input_dir,
            container_file_name,
            layout: OutputLayout {
                overlay_dir,
                single_dirs,
            },
            registry,
            normalization_hist_name,
            normalization_count: self.normalization_count,
            normalize_enabled: self.normalize_enabled,
            overlay_range: self.overlay_range,
            annotation: self
                .annotation
                .unwrap_or_else(|| DEFAULT_ANNOTATION.to_string()),
            requests,
            cut,
        })
    }
}
