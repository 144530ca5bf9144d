//! Seams for the pieces of reconstruction the selection treats as opaque.
//!
//! The selector never needs to know how a photon conversion is recognised;
//! it only hands over the electron, the ambient field and the track
//! collection and receives a verdict. Implementations live in
//! `wenu-select` (geometric partner search) or in user code.

use crate::types::{Electron, Track};

/// Tunable thresholds for a conversion partner search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionCuts {
    /// Maximum |dist| between the two helices in the transverse plane (cm)
    pub max_dist: f64,
    /// Maximum |Δcot θ| between the two tracks
    pub max_dcot: f64,
}

/// Outcome of a conversion search for one electron.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConversionInfo {
    /// The electron is tagged as coming from a photon conversion
    pub is_conversion: bool,
    /// Signed dist to the closest partner candidate, if any was examined
    pub dist: Option<f64>,
    /// Δcot θ to the closest partner candidate, if any was examined
    pub dcot: Option<f64>,
}

/// Conversion classifier - decides whether an electron stems from γ → e⁺e⁻.
pub trait ConversionClassifier: Send + Sync {
    /// Classify `electron` given the general tracks and the field (Tesla).
    fn classify(
        &self,
        electron: &Electron,
        tracks: &[Track],
        bfield_tesla: f64,
        cuts: ConversionCuts,
    ) -> ConversionInfo;

    /// Classifier name, for log output.
    fn name(&self) -> &str;
}
