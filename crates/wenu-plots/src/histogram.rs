//! Fixed-binning 1D histogram with under/overflow and sum of weights squared.

use serde::{Deserialize, Serialize};
use wenu_core::{Error, Result};

/// A uniformly binned 1D histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram1D {
    /// Histogram name.
    pub name: String,
    /// Histogram title.
    pub title: String,
    /// Number of bins (excluding under/overflow).
    pub n_bins: usize,
    /// Lower edge of first bin.
    pub x_min: f64,
    /// Upper edge of last bin.
    pub x_max: f64,
    /// Bin contents (sum of weights per bin).
    pub bin_content: Vec<f64>,
    /// Sum of weights squared per bin.
    pub sumw2: Vec<f64>,
    /// Underflow sum of weights.
    pub underflow: f64,
    /// Overflow sum of weights.
    pub overflow: f64,
    /// Fill calls, including under/overflow and NaN.
    pub entries: u64,
}

impl Histogram1D {
    /// Book an empty histogram.
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        n_bins: usize,
        x_min: f64,
        x_max: f64,
    ) -> Result<Self> {
        let name = name.into();
        if n_bins == 0 || !(x_min < x_max) || !x_min.is_finite() || !x_max.is_finite() {
            return Err(Error::Config(format!(
                "invalid binning for '{name}': {n_bins} bins in [{x_min}, {x_max})"
            )));
        }
        Ok(Self {
            name,
            title: title.into(),
            n_bins,
            x_min,
            x_max,
            bin_content: vec![0.0; n_bins],
            sumw2: vec![0.0; n_bins],
            underflow: 0.0,
            overflow: 0.0,
            entries: 0,
        })
    }

    /// Bin width.
    pub fn bin_width(&self) -> f64 {
        (self.x_max - self.x_min) / self.n_bins as f64
    }

    /// Bin edges (length `n_bins + 1`).
    pub fn bin_edges(&self) -> Vec<f64> {
        let w = self.bin_width();
        (0..=self.n_bins).map(|i| self.x_min + w * i as f64).collect()
    }

    /// Bin index of `x`; `None` outside `[x_min, x_max)` or NaN.
    pub fn find_bin(&self, x: f64) -> Option<usize> {
        if !(x >= self.x_min && x < self.x_max) {
            return None;
        }
        let i = ((x - self.x_min) / self.bin_width()) as usize;
        // Rounding can put values just below x_max into bin n_bins.
        Some(i.min(self.n_bins - 1))
    }

    /// Fill with unit weight.
    pub fn fill(&mut self, x: f64) {
        self.fill_weighted(x, 1.0);
    }

    /// Fill with weight `w`.
    ///
    /// NaN values count as entries but land in no bin.
    pub fn fill_weighted(&mut self, x: f64, w: f64) {
        self.entries += 1;
        if x.is_nan() {
            return;
        }
        match self.find_bin(x) {
            Some(b) => {
                self.bin_content[b] += w;
                self.sumw2[b] += w * w;
            }
            None if x < self.x_min => self.underflow += w,
            None => self.overflow += w,
        }
    }

    /// Sum of in-range bin contents.
    pub fn integral(&self) -> f64 {
        self.bin_content.iter().sum()
    }

    /// Add another histogram with identical binning.
    pub fn add(&mut self, other: &Histogram1D) -> Result<()> {
        if self.n_bins != other.n_bins || self.x_min != other.x_min || self.x_max != other.x_max {
            return Err(Error::Validation(format!(
                "cannot add '{}' to '{}': binning differs",
                other.name, self.name
            )));
        }
        for (a, b) in self.bin_content.iter_mut().zip(&other.bin_content) {
            *a += b;
        }
        for (a, b) in self.sumw2.iter_mut().zip(&other.sumw2) {
            *a += b;
        }
        self.underflow += other.underflow;
        self.overflow += other.overflow;
        self.entries += other.entries;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn fill_simple() {
        let mut h = Histogram1D::new("h", "h", 3, 0.0, 3.0).unwrap();
        for x in [0.5, 1.5, 2.5, 0.5, -1.0, 3.5, 3.0] {
            h.fill(x);
        }
        assert_eq!(h.bin_content, vec![2.0, 1.0, 1.0]);
        assert_eq!(h.underflow, 1.0);
        assert_eq!(h.overflow, 2.0);
        assert_eq!(h.entries, 7);
        assert_eq!(h.integral(), 4.0);
    }

    #[test]
    fn edges_are_lower_inclusive() {
        let h = Histogram1D::new("h", "", 200, 0.0, 200.0).unwrap();
        assert_eq!(h.find_bin(0.0), Some(0));
        assert_eq!(h.find_bin(1.0), Some(1));
        assert_eq!(h.find_bin(199.999), Some(199));
        assert_eq!(h.find_bin(200.0), None);
        assert_eq!(h.find_bin(f64::NAN), None);
    }

    #[test]
    fn negative_ranges() {
        let h = Histogram1D::new("h_dphi", "", 200, -0.03, 0.03).unwrap();
        assert_eq!(h.find_bin(-0.03), Some(0));
        assert_eq!(h.find_bin(0.00015), Some(100));
        assert_relative_eq!(h.bin_width(), 0.0003, epsilon = 1e-15);
        let edges = h.bin_edges();
        assert_eq!(edges.len(), 201);
        assert_relative_eq!(edges[200], 0.03, epsilon = 1e-12);
    }

    #[test]
    fn weights_accumulate_sumw2() {
        let mut h = Histogram1D::new("h", "", 2, 0.0, 2.0).unwrap();
        h.fill_weighted(0.5, 2.0);
        h.fill_weighted(0.5, 3.0);
        assert_eq!(h.bin_content[0], 5.0);
        assert_eq!(h.sumw2[0], 13.0);
    }

    #[test]
    fn nan_is_counted_but_not_binned() {
        let mut h = Histogram1D::new("h", "", 2, 0.0, 2.0).unwrap();
        h.fill(f64::NAN);
        assert_eq!(h.entries, 1);
        assert_eq!(h.integral() + h.underflow + h.overflow, 0.0);
    }

    #[test]
    fn invalid_binning() {
        assert!(Histogram1D::new("h", "", 0, 0.0, 1.0).is_err());
        assert!(Histogram1D::new("h", "", 10, 1.0, 1.0).is_err());
        assert!(Histogram1D::new("h", "", 10, f64::NAN, 1.0).is_err());
    }

    #[test]
    fn add_requires_same_binning() {
        let mut a = Histogram1D::new("a", "", 2, 0.0, 2.0).unwrap();
        let mut b = Histogram1D::new("b", "", 2, 0.0, 2.0).unwrap();
        a.fill(0.5);
        b.fill(1.5);
        a.add(&b).unwrap();
        assert_eq!(a.bin_content, vec![1.0, 1.0]);
        assert_eq!(a.entries, 2);

        let c = Histogram1D::new("c", "", 3, 0.0, 2.0).unwrap();
        assert!(matches!(a.add(&c), Err(Error::Validation(_))));
    }
}
