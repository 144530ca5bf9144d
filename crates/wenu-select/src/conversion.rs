//! Geometric photon-conversion partner search.
//!
//! An electron from γ → e⁺e⁻ has an opposite-charge partner track whose
//! helix touches its own at the conversion point, with nearly parallel
//! polar angles. For each partner candidate we compute
//!
//! * `dist`: distance between the two helix centres in the transverse plane
//!   minus the sum of their radii (≈ 0 for tangent circles);
//! * `dcot`: cot θ(electron) − cot θ(partner), with cot θ = sinh η.
//!
//! The electron is tagged when some partner has both |dist| and |dcot|
//! below the configured thresholds.

use wenu_core::kinematics::delta_r;
use wenu_core::{ConversionClassifier, ConversionCuts, ConversionInfo, Electron, GsfTrack, Track};

/// c in GeV / (T · m), used to turn pT and B into a curvature.
const GEV_PER_TESLA_METRE: f64 = 0.3;

/// Partner search around the electron track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HelixPartnerFinder {
    /// Only tracks within this ΔR of the electron track are examined
    pub max_partner_dr: f64,
}

impl Default for HelixPartnerFinder {
    fn default() -> Self {
        Self { max_partner_dr: 0.5 }
    }
}

/// Circle of a charged track projected on the transverse plane (cm).
#[derive(Debug, Clone, Copy, PartialEq)]
struct Helix {
    xc: f64,
    yc: f64,
    radius: f64,
    cot_theta: f64,
}

impl Helix {
    fn new(pt: f64, eta: f64, phi: f64, charge: i32, d0: f64, bfield: f64) -> Option<Self> {
        if pt <= 0.0 || charge == 0 {
            return None;
        }
        // Signed curvature in 1/cm.
        let curvature = -GEV_PER_TESLA_METRE * bfield * (charge as f64 / pt) / 100.0;
        if curvature == 0.0 || !curvature.is_finite() {
            return None;
        }
        let r_signed = 1.0 / curvature;
        Some(Self {
            xc: -(r_signed - d0) * phi.sin(),
            yc: (r_signed - d0) * phi.cos(),
            radius: r_signed.abs(),
            cot_theta: eta.sinh(),
        })
    }

    fn from_gsf(t: &GsfTrack, bfield: f64) -> Option<Self> {
        Self::new(t.pt, t.eta, t.phi, t.charge, t.d0, bfield)
    }

    fn from_track(t: &Track, bfield: f64) -> Option<Self> {
        Self::new(t.pt, t.eta, t.phi, t.charge, t.d0, bfield)
    }

    /// `(dist, dcot)` of `self` relative to `other`.
    fn separation(&self, other: &Helix) -> (f64, f64) {
        let d = (self.xc - other.xc).hypot(self.yc - other.yc);
        (d - (self.radius + other.radius), self.cot_theta - other.cot_theta)
    }
}

/// `(dist, dcot)` between the electron's GSF track and `partner`.
///
/// Returns `None` when either helix is undefined (zero pT, zero charge or
/// vanishing field).
pub fn helix_separation(electron: &GsfTrack, partner: &Track, bfield: f64) -> Option<(f64, f64)> {
    let el = Helix::from_gsf(electron, bfield)?;
    let tk = Helix::from_track(partner, bfield)?;
    Some(el.separation(&tk))
}

impl ConversionClassifier for HelixPartnerFinder {
    fn classify(
        &self,
        electron: &Electron,
        tracks: &[Track],
        bfield_tesla: f64,
        cuts: ConversionCuts,
    ) -> ConversionInfo {
        let el = &electron.gsf_track;
        let mut info = ConversionInfo::default();
        let mut best = f64::INFINITY;

        for tk in tracks {
            if tk.charge + el.charge != 0 {
                continue;
            }
            if delta_r(el.eta, el.phi, tk.eta, tk.phi) > self.max_partner_dr {
                continue;
            }
            let Some((dist, dcot)) = helix_separation(el, tk, bfield_tesla) else {
                continue;
            };
            if dist.abs() < cuts.max_dist && dcot.abs() < cuts.max_dcot {
                info.is_conversion = true;
            }
            let score = dist.hypot(dcot);
            if score < best {
                best = score;
                info.dist = Some(dist);
                info.dcot = Some(dcot);
            }
        }
        info
    }

    fn name(&self) -> &str {
        "HelixPartnerFinder"
    }
}
