//! Jet cross-cleaning against the selected electron.

use std::cmp::Ordering;

use wenu_core::Jet;
use wenu_core::kinematics::delta_r;

/// Jets kept per flavour.
pub const JET_SLOTS: usize = 5;

/// Value of an unfilled jet slot.
pub const EMPTY_JET_SLOT: f32 = -999_999.0;

/// Five leading cleaned jets of one flavour, column-wise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JetSlots {
    /// Transverse energy
    pub et: [f32; JET_SLOTS],
    /// Pseudorapidity
    pub eta: [f32; JET_SLOTS],
    /// Azimuth
    pub phi: [f32; JET_SLOTS],
}

impl Default for JetSlots {
    fn default() -> Self {
        Self {
            et: [EMPTY_JET_SLOT; JET_SLOTS],
            eta: [EMPTY_JET_SLOT; JET_SLOTS],
            phi: [EMPTY_JET_SLOT; JET_SLOTS],
        }
    }
}

impl JetSlots {
    /// Number of filled slots.
    pub fn filled(&self) -> usize {
        self.et.iter().take_while(|&&et| et != EMPTY_JET_SLOT).count()
    }
}

/// Drop jets within `min_dr` of `(eta, phi)` and keep the five highest-ET ones.
///
/// Jets are compared with `ΔR > min_dr`; equal ET keeps input order.
pub fn clean_and_rank(jets: &[Jet], eta: f64, phi: f64, min_dr: f64) -> JetSlots {
    let mut kept: Vec<&Jet> =
        jets.iter().filter(|j| delta_r(j.eta, j.phi, eta, phi) > min_dr).collect();
    kept.sort_by(|a, b| b.et.partial_cmp(&a.et).unwrap_or(Ordering::Equal));

    let mut slots = JetSlots::default();
    for (i, j) in kept.iter().take(JET_SLOTS).enumerate() {
        slots.et[i] = j.et as f32;
        slots.eta[i] = j.eta as f32;
        slots.phi[i] = j.phi as f32;
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jet(et: f64, eta: f64, phi: f64) -> Jet {
        Jet { et, eta, phi }
    }

    #[test]
    fn overlapping_jet_is_removed() {
        let jets = [jet(50.0, 0.5, 1.0), jet(30.0, -1.0, -2.0)];
        let slots = clean_and_rank(&jets, 0.52, 1.01, 0.3);
        assert_eq!(slots.filled(), 1);
        assert_eq!(slots.et[0], 30.0);
        assert_eq!(slots.et[1], EMPTY_JET_SLOT);
    }

    #[test]
    fn keeps_five_leading() {
        let jets: Vec<Jet> = (0..8).map(|i| jet(10.0 + i as f64, 2.0, 0.1 * i as f64)).collect();
        let slots = clean_and_rank(&jets, -2.0, 0.0, 0.3);
        assert_eq!(slots.filled(), 5);
        assert_eq!(slots.et, [17.0, 16.0, 15.0, 14.0, 13.0]);
        assert_eq!(slots.eta, [2.0; 5]);
    }

    #[test]
    fn empty_collection_leaves_sentinels() {
        assert_eq!(clean_and_rank(&[], 0.0, 0.0, 0.3), JetSlots::default());
    }
}
