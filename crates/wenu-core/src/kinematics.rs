//! Angular and transverse-mass helpers.
//!
//! Angles follow the usual collider conventions: `eta` is pseudorapidity,
//! `phi` the azimuth in radians. ΔR is the plain Euclidean distance in the
//! (η, φ) plane with Δφ folded into (−π, π].

use std::f64::consts::PI;

/// Pseudorapidity boundary between the central (barrel) and forward
/// (endcap) calorimeter regions used for cut accounting.
pub const BARREL_ENDCAP_BOUNDARY: f64 = 1.479;

/// Transverse energy from a calorimeter energy and its pseudorapidity.
#[inline]
pub fn transverse_energy(energy: f64, eta: f64) -> f64 {
    energy / eta.cosh()
}

/// Azimuthal difference folded into (−π, π].
pub fn delta_phi(phi1: f64, phi2: f64) -> f64 {
    let mut d = phi1 - phi2;
    while d > PI {
        d -= 2.0 * PI;
    }
    while d <= -PI {
        d += 2.0 * PI;
    }
    d
}

/// ΔR = sqrt(Δη² + Δφ²).
pub fn delta_r(eta1: f64, phi1: f64, eta2: f64, phi2: f64) -> f64 {
    let deta = eta1 - eta2;
    let dphi = delta_phi(phi1, phi2);
    (deta * deta + dphi * dphi).sqrt()
}

/// Transverse mass of a lepton + missing-energy system:
/// `sqrt(2 · ET · MET · (1 − cos Δφ))`.
///
/// The bracket is clamped at zero so rounding in `cos` never produces a NaN.
pub fn transverse_mass(et: f64, phi: f64, met: f64, met_phi: f64) -> f64 {
    let bracket = (1.0 - (phi - met_phi).cos()).max(0.0);
    (2.0 * et * met * bracket).sqrt()
}
