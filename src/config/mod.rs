//! Config layer: JSON schema + validated in-memory structures.
//!
//! Owns the run registry, plot requests, cut specification and output
//! layout. Nothing here touches histogram containers or images.

pub mod color;
pub mod raw;
pub mod registry;

pub use color::Rgb;
pub use raw::{ConfigSpec, NormalizationCount, OverlayRange};
pub use registry::{RunId, RunMeta, RunRegistry};

use crate::error::{QaError, QaResult};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

/// One histogram to plot, with its display strings.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotRequest {
    pub hist_name: String,
    pub display_title: String,
    pub x_label: String,
    pub y_label: String,
}

/// Low-end bin cut and the histograms it applies to.
#[derive(Debug, Clone, PartialEq)]
pub struct CutSpec {
    pub enabled: bool,
    pub threshold: f64,
    pub applies_to: BTreeSet<String>,
}

impl CutSpec {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            threshold: 0.0,
            applies_to: BTreeSet::new(),
        }
    }

    pub fn applies(&self, hist_name: &str) -> bool {
        self.enabled && self.applies_to.contains(hist_name)
    }
}

/// Where images go. Missing entries are only an error for the mode that
/// needs them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputLayout {
    pub overlay_dir: Option<PathBuf>,
    pub single_dirs: BTreeMap<String, PathBuf>,
}

impl OutputLayout {
    pub fn overlay_dir(&self) -> QaResult<&Path> {
        self.overlay_dir
            .as_deref()
            .ok_or_else(|| QaError::bad_config("overlayOutputDir is not set"))
    }

    pub fn single_dir(&self, hist_name: &str) -> QaResult<&Path> {
        self.single_dirs.get(hist_name).map(PathBuf::as_path).ok_or_else(|| {
            QaError::bad_config(format!(
                "singleOutputDirByHist has no directory for {}",
                hist_name
            ))
        })
    }

    pub fn overlay_path(&self, hist_name: &str) -> QaResult<PathBuf> {
        Ok(self
            .overlay_dir()?
            .join(format!("Overlayed_{}.png", hist_name)))
    }

    pub fn single_path(&self, hist_name: &str, run: &RunId) -> QaResult<PathBuf> {
        Ok(self
            .single_dir(hist_name)?
            .join(format!("{}_Run_{}.png", hist_name, run)))
    }
}

/// Validated configuration for one invocation.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_input_dir: PathBuf,
    pub container_file_name: String,
    pub layout: OutputLayout,
    pub registry: RunRegistry,
    pub normalization_hist_name: String,
    pub normalization_count: NormalizationCount,
    pub normalize_enabled: bool,
    pub overlay_range: OverlayRange,
    pub annotation: String,
    pub requests: Vec<PlotRequest>,
    pub cut: CutSpec,
}

/// Command-line adjustments layered on top of the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub no_normalize: bool,
    pub cut: Option<f64>,
    pub cut_hists: Vec<String>,
    pub only_hists: Vec<String>,
}

impl Config {
    pub fn from_json(text: &str) -> QaResult<Self> {
        let spec: ConfigSpec = serde_json::from_str(text)
            .map_err(|e| QaError::bad_config(format!("invalid config JSON: {}", e)))?;
        spec.validate_and_build()
    }

    pub fn load(path: &Path) -> QaResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            QaError::bad_config(format!("read config file {}: {}", path.display(), e))
        })?;
        Self::from_json(&text)
    }

    pub fn apply(&mut self, o: &Overrides) -> QaResult<()> {
        if o.no_normalize {
            self.normalize_enabled = false;
        }

        if let Some(threshold) = o.cut {
            if !threshold.is_finite() {
                return Err(QaError::bad_config("--cut must be a finite number"));
            }
            self.cut.enabled = true;
            self.cut.threshold = threshold;
        }
        if !o.cut_hists.is_empty() {
            if !self.cut.enabled {
                return Err(QaError::bad_config(
                    "--cut-hist given but no cut threshold (use --cut or cutSpec)",
                ));
            }
            self.cut.applies_to = o.cut_hists.iter().cloned().collect();
        }

        if !o.only_hists.is_empty() {
            for name in &o.only_hists {
                if !self.requests.iter().any(|r| &r.hist_name == name) {
                    return Err(QaError::bad_config(format!(
                        "--hist {} does not match any plot request",
                        name
                    )));
                }
            }
            self.requests.retain(|r| o.only_hists.contains(&r.hist_name));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"{
        "baseInputDir": "/data/qa/rootOutput",
        "overlayOutputDir": "/data/qa/overlay",
        "singleOutputDirByHist": { "hClusterPt": "/data/qa/single/Cluster_pt" },
        "normalizationHistName": "hNClusters",
        "runRegistry": [
            { "runId": "21813", "color": "kBlue", "sebCount": 7 },
            { "runId": "21796", "color": "kOrange+7", "sebCount": 8 }
        ],
        "plotRequests": [
            { "histName": "hClusterPt", "displayTitle": "Cluster p_{T}",
              "xLabel": "Cluster p_{T} (GeV)", "yLabel": "Counts" },
            { "histName": "hTotalMBD", "displayTitle": "MBD Charge Distribution",
              "xLabel": "MBD Charge", "yLabel": "Counts" }
        ]
    }"#;

    fn sample() -> Config {
        Config::from_json(SAMPLE).unwrap()
    }

    #[test]
    fn parses_sample_with_defaults() {
        let cfg = sample();
        assert_eq!(cfg.container_file_name, "qa.json");
        assert_eq!(cfg.annotation, "sPHENIX EMCal QA");
        assert!(cfg.normalize_enabled);
        assert_eq!(cfg.normalization_count, NormalizationCount::Entries);
        assert_eq!(cfg.overlay_range, OverlayRange::First);
        assert!(!cfg.cut.enabled);
        assert_eq!(cfg.base_input_dir, PathBuf::from("/data/qa/rootOutput"));
        let runs: Vec<&str> = cfg.registry.runs().iter().map(RunId::as_str).collect();
        assert_eq!(runs, vec!["21813", "21796"]);
    }

    #[test]
    fn output_paths_follow_naming() {
        let cfg = sample();
        assert_eq!(
            cfg.layout.overlay_path("hClusterPt").unwrap(),
            PathBuf::from("/data/qa/overlay/Overlayed_hClusterPt.png")
        );
        assert_eq!(
            cfg.layout
                .single_path("hClusterPt", &RunId::new("21813"))
                .unwrap(),
            PathBuf::from("/data/qa/single/Cluster_pt/hClusterPt_Run_21813.png")
        );
        assert!(cfg.layout.single_dir("hTotalMBD").unwrap_err().is_config());
    }

    #[test]
    fn rejects_bad_values() {
        let cases = [
            SAMPLE.replace(r#""sebCount": 7"#, r#""sebCount": 0"#),
            SAMPLE.replace(r#""sebCount": 8"#, r#""sebCount": -2"#),
            SAMPLE.replace(r#""kOrange+7""#, r#""chartreuse""#),
            SAMPLE.replace(r#""baseInputDir": "/data/qa/rootOutput","#, ""),
            SAMPLE.replace(r#""normalizationHistName": "hNClusters","#, ""),
            SAMPLE.replace(r#""hTotalMBD""#, r#""hClusterPt""#),
            SAMPLE.replace("baseInputDir", "baseInputDirectory"),
            "{ not json".to_string(),
        ];
        for case in cases {
            let err = Config::from_json(&case).unwrap_err();
            assert!(err.is_config(), "expected config error, got {err}");
        }
    }

    #[test]
    fn duplicate_run_is_reported_as_such() {
        let text = SAMPLE.replace(r#""runId": "21796""#, r#""runId": "21813""#);
        assert!(matches!(
            Config::from_json(&text),
            Err(QaError::DuplicateRun(id)) if id == "21813"
        ));
    }

    #[test]
    fn empty_request_list_is_bad_config() {
        let start = SAMPLE.find(r#""plotRequests""#).unwrap();
        let text = format!("{}\"plotRequests\": [] }}", &SAMPLE[..start]);
        assert!(matches!(Config::from_json(&text), Err(QaError::BadConfig(_))));
    }

    #[test]
    fn overrides_enable_cut_and_filter_requests() {
        let mut cfg = sample();
        cfg.apply(&Overrides {
            no_normalize: true,
            cut: Some(1.5),
            cut_hists: vec!["hClusterPt".into()],
            only_hists: vec!["hTotalMBD".into()],
        })
        .unwrap();
        assert!(!cfg.normalize_enabled);
        assert!(cfg.cut.applies("hClusterPt"));
        assert!(!cfg.cut.applies("hTotalMBD"));
        assert_eq!(cfg.cut.threshold, 1.5);
        assert_eq!(cfg.requests.len(), 1);
        assert_eq!(cfg.requests[0].hist_name, "hTotalMBD");
    }

    #[test]
    fn cut_hist_without_threshold_is_rejected() {
        let mut cfg = sample();
        let err = cfg
            .apply(&Overrides {
                cut_hists: vec!["hClusterPt".into()],
                ..Overrides::default()
            })
            .unwrap_err();
        assert!(err.is_config());

        let mut cfg = sample();
        let err = cfg
            .apply(&Overrides {
                only_hists: vec!["hMissing".into()],
                ..Overrides::default()
            })
            .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn cut_spec_from_file() {
        let text = SAMPLE.replace(
            r#""plotRequests""#,
            r#""cutSpec": { "threshold": 0.5, "appliesTo": ["hClusterPt"] }, "plotRequests""#,
        );
        let cfg = Config::from_json(&text).unwrap();
        assert!(cfg.cut.enabled);
        assert!(cfg.cut.applies("hClusterPt"));
        assert!(!cfg.cut.applies("hTotalMBD"));
    }
}
