//! The fixed set of booked histograms.

use serde::{Deserialize, Serialize};
use wenu_core::{Error, Result};

use crate::cuts::Region;
use crate::histogram::Histogram1D;

/// Missing transverse energy, selected events.
pub const H_MET: &str = "h_met";
/// Missing transverse energy, inverted control selection.
pub const H_MET_INVERSE: &str = "h_met_inverse";
/// Transverse mass, selected events.
pub const H_MT: &str = "h_mt";
/// Transverse mass, inverted control selection.
pub const H_MT_INVERSE: &str = "h_mt_inverse";
/// Supercluster ET.
pub const H_SC_ET: &str = "h_scEt";
/// Supercluster η.
pub const H_SC_ETA: &str = "h_scEta";
/// Supercluster φ.
pub const H_SC_PHI: &str = "h_scPhi";
/// Track isolation N-1, barrel.
pub const H_TRACK_ISO_EB_NMONE: &str = "h_trackIso_eb_NmOne";
/// Track isolation N-1, endcap.
pub const H_TRACK_ISO_EE_NMONE: &str = "h_trackIso_ee_NmOne";

/// Suffixes of the seven per-region discriminating-variable histograms.
pub const REGION_VARIABLES: [&str; 7] =
    ["trkiso", "ecaliso", "hcaliso", "sIetaIeta", "dphi", "deta", "HoE"];

/// `h_met_EB`-style region variant of a combined histogram.
pub fn region_name(base: &str, region: Region) -> String {
    format!("{base}_{}", region.tag())
}

/// `h_EB_trkiso`-style name of a per-region variable histogram.
pub fn variable_name(region: Region, suffix: &str) -> String {
    format!("h_{}_{suffix}", region.tag())
}

/// N-1 track-isolation histogram of `region`.
pub fn n_minus_one_name(region: Region) -> &'static str {
    match region {
        Region::Central => H_TRACK_ISO_EB_NMONE,
        Region::Forward => H_TRACK_ISO_EE_NMONE,
    }
}

/// Named histograms in booking order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBook {
    histograms: Vec<Histogram1D>,
}

impl HistogramBook {
    /// Empty book.
    pub fn empty() -> Self {
        Self { histograms: Vec::new() }
    }

    /// Book the standard W -> e nu set.
    pub fn standard() -> Result<Self> {
        let mut book = Self::empty();
        for base in [H_MET, H_MET_INVERSE, H_MT, H_MT_INVERSE] {
            book.book(base, 200, 0.0, 200.0)?;
            for region in [Region::Central, Region::Forward] {
                book.book(&region_name(base, region), 200, 0.0, 200.0)?;
            }
        }
        book.book(H_SC_ET, 200, 0.0, 100.0)?;
        book.book(H_SC_ETA, 200, -3.0, 3.0)?;
        book.book(H_SC_PHI, 200, -4.0, 4.0)?;

        for region in [Region::Central, Region::Forward] {
            let sihih_max = match region {
                Region::Central => 0.02,
                Region::Forward => 0.1,
            };
            let ranges = [
                (0.0, 9.0),
                (0.0, 9.0),
                (0.0, 9.0),
                (0.0, sihih_max),
                (-0.03, 0.03),
                (-0.01, 0.01),
                (0.0, 0.2),
            ];
            for (suffix, (lo, hi)) in REGION_VARIABLES.iter().zip(ranges) {
                book.book(&variable_name(region, suffix), 200, lo, hi)?;
            }
        }

        book.push(Histogram1D::new(H_TRACK_ISO_EB_NMONE, "trackIso EB N-1 plot", 80, 0.0, 8.0)?)?;
        book.push(Histogram1D::new(H_TRACK_ISO_EE_NMONE, "trackIso EE N-1 plot", 80, 0.0, 8.0)?)?;
        Ok(book)
    }

    /// Book a histogram titled after its name.
    pub fn book(&mut self, name: &str, n_bins: usize, x_min: f64, x_max: f64) -> Result<()> {
        self.push(Histogram1D::new(name, name, n_bins, x_min, x_max)?)
    }

    fn push(&mut self, h: Histogram1D) -> Result<()> {
        if self.get(&h.name).is_some() {
            return Err(Error::Config(format!("histogram '{}' booked twice", h.name)));
        }
        self.histograms.push(h);
        Ok(())
    }

    /// Histogram named `name`.
    pub fn get(&self, name: &str) -> Option<&Histogram1D> {
        self.histograms.iter().find(|h| h.name == name)
    }

    /// Fill `name` with `x`; returns `false` if no such histogram is booked.
    pub fn fill(&mut self, name: &str, x: f64) -> bool {
        match self.histograms.iter_mut().find(|h| h.name == name) {
            Some(h) => {
                h.fill(x);
                true
            }
            None => {
                log::error!("fill of unbooked histogram '{name}'");
                false
            }
        }
    }

    /// Fill the combined histogram and its region variant.
    pub fn fill_split(&mut self, base: &str, region: Region, x: f64) {
        self.fill(base, x);
        self.fill(&region_name(base, region), x);
    }

    /// All histograms in booking order.
    pub fn histograms(&self) -> &[Histogram1D] {
        &self.histograms
    }

    /// Number of booked histograms.
    pub fn len(&self) -> usize {
        self.histograms.len()
    }

    /// Whether nothing is booked.
    pub fn is_empty(&self) -> bool {
        self.histograms.is_empty()
    }

    /// Add every histogram of `other` into the matching one here.
    pub fn merge(&mut self, other: &HistogramBook) -> Result<()> {
        for h in &other.histograms {
            match self.histograms.iter_mut().find(|mine| mine.name == h.name) {
                Some(mine) => mine.add(h)?,
                None => self.histograms.push(h.clone()),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_set() {
        let book = HistogramBook::standard().unwrap();
        // 4 x 3 MET/MT, 3 supercluster, 2 x 7 per-region, 2 N-1.
        assert_eq!(book.len(), 12 + 3 + 14 + 2);

        let met = book.get("h_met_inverse_EE").unwrap();
        assert_eq!((met.n_bins, met.x_min, met.x_max), (200, 0.0, 200.0));
        let sc_et = book.get(H_SC_ET).unwrap();
        assert_eq!(sc_et.x_max, 100.0);
        assert_eq!(book.get("h_EB_sIetaIeta").unwrap().x_max, 0.02);
        assert_eq!(book.get("h_EE_sIetaIeta").unwrap().x_max, 0.1);
        assert_eq!(book.get("h_EE_deta").unwrap().x_min, -0.01);
        let nm1 = book.get(H_TRACK_ISO_EB_NMONE).unwrap();
        assert_eq!((nm1.n_bins, nm1.x_max), (80, 8.0));
        assert_eq!(nm1.title, "trackIso EB N-1 plot");
    }

    #[test]
    fn split_fill() {
        let mut book = HistogramBook::standard().unwrap();
        book.fill_split(H_MT, Region::Forward, 75.0);
        assert_eq!(book.get(H_MT).unwrap().entries, 1);
        assert_eq!(book.get("h_mt_EE").unwrap().entries, 1);
        assert_eq!(book.get("h_mt_EB").unwrap().entries, 0);
    }

    #[test]
    fn unknown_and_duplicate_names() {
        let mut book = HistogramBook::empty();
        assert!(!book.fill("h_nope", 1.0));
        book.book("h_x", 10, 0.0, 1.0).unwrap();
        assert!(matches!(book.book("h_x", 10, 0.0, 1.0), Err(Error::Config(_))));
    }

    #[test]
    fn merge_books() {
        let mut a = HistogramBook::standard().unwrap();
        let mut b = HistogramBook::standard().unwrap();
        a.fill(H_SC_ETA, 0.1);
        b.fill(H_SC_ETA, 0.1);
        a.merge(&b).unwrap();
        assert_eq!(a.get(H_SC_ETA).unwrap().entries, 2);
    }
}
