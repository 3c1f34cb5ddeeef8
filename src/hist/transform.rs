//! Transforms applied to a histogram between loading and drawing.
//!
//! Both take the histogram by value and hand it back, so a histogram is
//! transformed at most once on its way to the renderer. Neither touches the
//! binning.

use crate::hist::Histogram1D;

/// Scale every bin by `1 / (n_events * n_sebs)` (per-event, per-buffer rate).
///
/// Underflow and overflow are scaled too. No-op unless both factors are
/// strictly positive.
pub fn normalize(mut h: Histogram1D, n_events: f64, n_sebs: u32) -> Histogram1D {
    if n_events > 0.0 && n_sebs > 0 {
        let scale = 1.0 / (n_events * n_sebs as f64);
        for c in h.contents_mut() {
            *c *= scale;
        }
        h.underflow *= scale;
        h.overflow *= scale;
    }
    h
}

/// Zero every bin whose center lies strictly below `threshold`.
///
/// A bin centered exactly on the threshold is kept. Underflow and overflow
/// are left alone.
pub fn low_cut(mut h: Histogram1D, threshold: f64) -> Histogram1D {
    let below: Vec<bool> = (0..h.n_bins()).map(|i| h.center(i) < threshold).collect();
    for (c, cut) in h.contents_mut().iter_mut().zip(below) {
        if cut {
            *c = 0.0;
        }
    }
    h
}
