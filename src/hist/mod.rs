//! One-dimensional binned histogram plus the transforms applied before drawing.

pub mod transform;

pub use transform::{low_cut, normalize};

use crate::config::Rgb;

/// Line and marker styling carried with a histogram to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct HistStyle {
    pub color: Rgb,
    pub line_width: u32,
    /// Filled-circle marker radius in pixels, drawn at bin centers.
    pub marker_size: Option<u32>,
}

impl Default for HistStyle {
    fn default() -> Self {
        Self {
            color: Rgb::BLACK,
            line_width: 1,
            marker_size: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram1D {
    pub name: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Bin edges (length = n_bins + 1), strictly increasing.
    edges: Vec<f64>,
    /// Bin contents (length = n_bins), excluding under/overflow.
    contents: Vec<f64>,
    pub underflow: f64,
    pub overflow: f64,
    pub entries: u64,
    pub style: HistStyle,
}

impl Histogram1D {
    /// Build a histogram from explicit edges. Returns an error message when the
    /// binning is inconsistent; callers wrap it in their own error type.
    pub fn from_edges(
        name: impl Into<String>,
        edges: Vec<f64>,
        contents: Vec<f64>,
    ) -> Result<Self, String> {
        if edges.len() < 2 {
            return Err(format!("need at least 2 bin edges, got {}", edges.len()));
        }
        if contents.len() + 1 != edges.len() {
            return Err(format!(
                "{} contents do not match {} bin edges",
                contents.len(),
                edges.len()
            ));
        }
        if edges.iter().any(|e| !e.is_finite()) || edges.windows(2).any(|w| w[1] <= w[0]) {
            return Err("bin edges must be finite and strictly increasing".to_string());
        }
        let entries = contents.iter().sum::<f64>().round().max(0.0) as u64;
        Ok(Self {
            name: name.into(),
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
            edges,
            contents,
            underflow: 0.0,
            overflow: 0.0,
            entries,
            style: HistStyle::default(),
        })
    }

    /// Uniform binning over [x_min, x_max).
    pub fn uniform(
        name: impl Into<String>,
        n_bins: usize,
        x_min: f64,
        x_max: f64,
        contents: Vec<f64>,
    ) -> Result<Self, String> {
        if n_bins == 0 {
            return Err("nBins must be positive".to_string());
        }
        if !(x_min < x_max) {
            return Err(format!("xMin {} must be below xMax {}", x_min, x_max));
        }
        let width = (x_max - x_min) / n_bins as f64;
        let mut edges: Vec<f64> = (0..n_bins).map(|i| x_min + width * i as f64).collect();
        edges.push(x_max);
        Self::from_edges(name, edges, contents)
    }

    pub fn n_bins(&self) -> usize {
        self.contents.len()
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn contents(&self) -> &[f64] {
        &self.contents
    }

    pub(crate) fn contents_mut(&mut self) -> &mut [f64] {
        &mut self.contents
    }

    pub fn center(&self, bin: usize) -> f64 {
        0.5 * (self.edges[bin] + self.edges[bin + 1])
    }

    /// (low edge, high edge, content) for every in-range bin.
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.edges
            .windows(2)
            .zip(&self.contents)
            .map(|(w, &c)| (w[0], w[1], c))
    }

    /// Sum of in-range bin contents.
    pub fn integral(&self) -> f64 {
        self.contents.iter().sum()
    }

    pub fn x_range(&self) -> (f64, f64) {
        let edges = self.edges();
        (edges[0], edges[edges.len() - 1])
    }

    /// Smallest strictly positive and largest content, if any bin is positive.
    pub fn positive_content_range(&self) -> Option<(f64, f64)> {
        self.contents
            .iter()
            .copied()
            .filter(|c| *c > 0.0)
            .fold(None, |acc, c| match acc {
                None => Some((c, c)),
                Some((lo, hi)) => Some((lo.min(c), hi.max(c))),
            })
    }

    /// Content-weighted mean of bin centers.
    pub fn mean(&self) -> f64 {
        let sw = self.integral();
        if sw == 0.0 {
            return 0.0;
        }
        (0..self.n_bins())
            .map(|i| self.center(i) * self.contents[i])
            .sum::<f64>()
            / sw
    }

    /// Content-weighted standard deviation of bin centers.
    pub fn std_dev(&self) -> f64 {
        let sw = self.integral();
        if sw == 0.0 {
            return 0.0;
        }
        let mean = self.mean();
        let var = (0..self.n_bins())
            .map(|i| {
                let d = self.center(i) - mean;
                d * d * self.contents[i]
            })
            .sum::<f64>()
            / sw;
        var.max(0.0).sqrt()
    }
}

#[cfg(test)]
pub(crate) fn test_hist(width: f64, contents: &[f64]) -> Histogram1D {
    let edges: Vec<f64> = (0..=contents.len())
        .map(|i| i as f64 * width)
        .collect();
    Histogram1D::from_edges("h", edges, contents.to_vec()).expect("valid test binning")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn uniform_binning_places_centers_mid_bin() {
        let h = Histogram1D::uniform("hClusterPt", 4, 0.0, 4.0, vec![4.0; 4]).unwrap();
        let centers: Vec<f64> = (0..h.n_bins()).map(|i| h.center(i)).collect();
        assert_eq!(centers, vec![0.5, 1.5, 2.5, 3.5]);
        assert_eq!(h.x_range(), (0.0, 4.0));
        assert_eq!(h.entries, 16);
    }

    #[test]
    fn rejects_inconsistent_binning() {
        assert!(Histogram1D::from_edges("h", vec![0.0, 1.0], vec![1.0, 2.0]).is_err());
        assert!(Histogram1D::from_edges("h", vec![0.0, 2.0, 1.0], vec![1.0, 2.0]).is_err());
        assert!(Histogram1D::from_edges("h", vec![0.0], vec![]).is_err());
        assert!(Histogram1D::uniform("h", 0, 0.0, 1.0, vec![]).is_err());
        assert!(Histogram1D::uniform("h", 2, 1.0, 1.0, vec![0.0, 0.0]).is_err());
    }

    #[test]
    fn summary_statistics_weight_by_content() {
        let h = test_hist(1.0, &[0.0, 2.0, 2.0, 0.0]);
        assert_eq!(h.mean(), 2.0);
        assert!((h.std_dev() - 0.5).abs() < 1e-12);
        assert_eq!(h.positive_content_range(), Some((2.0, 2.0)));

        let empty = test_hist(1.0, &[0.0, 0.0]);
        assert_eq!(empty.mean(), 0.0);
        assert_eq!(empty.positive_content_range(), None);
    }
}
