//! The 13 discriminating variables and the two-region cut table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use wenu_core::kinematics::BARREL_ENDCAP_BOUNDARY;
use wenu_core::{Electron, Error, Result};

/// Threshold used when a variable is left unconfigured (effectively no cut).
pub const OPEN_THRESHOLD: f64 = 1000.0;

/// ECAL pedestal subtracted from the barrel combined isolation (GeV).
const BARREL_ECAL_PEDESTAL: f64 = 1.0;

/// Detector region used for cut thresholds and histogram routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    /// Barrel, `|sc η| < 1.479`
    Central,
    /// Endcap, everything else
    Forward,
}

impl Region {
    /// Region of a supercluster pseudorapidity.
    pub fn of_eta(sc_eta: f64) -> Self {
        if sc_eta.abs() < BARREL_ENDCAP_BOUNDARY { Region::Central } else { Region::Forward }
    }

    /// Region of an electron's supercluster.
    pub fn of(electron: &Electron) -> Self {
        Self::of_eta(electron.super_cluster.eta)
    }

    /// Short tag used in histogram names.
    pub fn tag(self) -> &'static str {
        match self {
            Region::Central => "EB",
            Region::Forward => "EE",
        }
    }
}

/// Index into the cut table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CutVariable {
    /// Track isolation over pT
    TrackIso,
    /// ECAL isolation over pT
    EcalIso,
    /// HCAL (depth 1 + 2) isolation over pT
    HcalIso,
    /// σ_iηiη
    SigmaIetaIeta,
    /// Δφ between supercluster and track
    DeltaPhi,
    /// Δη between supercluster and track
    DeltaEta,
    /// H/E
    HadronicOverEm,
    /// Combined relative isolation
    CombinedIso,
    /// |transverse impact parameter| w.r.t. the beam spot
    TipBeamSpot,
    /// E_sc / p
    EOverP,
    /// User track isolation
    UserTrackIso,
    /// User ECAL isolation
    UserEcalIso,
    /// User HCAL isolation
    UserHcalIso,
}

impl CutVariable {
    /// Number of variables.
    pub const COUNT: usize = 13;

    /// All variables in table order.
    pub const ALL: [CutVariable; Self::COUNT] = [
        CutVariable::TrackIso,
        CutVariable::EcalIso,
        CutVariable::HcalIso,
        CutVariable::SigmaIetaIeta,
        CutVariable::DeltaPhi,
        CutVariable::DeltaEta,
        CutVariable::HadronicOverEm,
        CutVariable::CombinedIso,
        CutVariable::TipBeamSpot,
        CutVariable::EOverP,
        CutVariable::UserTrackIso,
        CutVariable::UserEcalIso,
        CutVariable::UserHcalIso,
    ];

    /// Position in the table.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Variable at table position `i`.
    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    /// Config / log name.
    pub fn name(self) -> &'static str {
        match self {
            CutVariable::TrackIso => "track_iso",
            CutVariable::EcalIso => "ecal_iso",
            CutVariable::HcalIso => "hcal_iso",
            CutVariable::SigmaIetaIeta => "sigma_ieta_ieta",
            CutVariable::DeltaPhi => "delta_phi",
            CutVariable::DeltaEta => "delta_eta",
            CutVariable::HadronicOverEm => "hadronic_over_em",
            CutVariable::CombinedIso => "combined_iso",
            CutVariable::TipBeamSpot => "tip_beam_spot",
            CutVariable::EOverP => "e_over_p",
            CutVariable::UserTrackIso => "user_track_iso",
            CutVariable::UserEcalIso => "user_ecal_iso",
            CutVariable::UserHcalIso => "user_hcal_iso",
        }
    }

    /// Value of this variable for `electron`.
    ///
    /// Signed where the underlying quantity is signed; cuts compare `|value|`.
    pub fn value(self, electron: &Electron) -> f64 {
        let iso = &electron.isolation;
        let pt = electron.pt;
        match self {
            CutVariable::TrackIso => iso.track_sum_pt / pt,
            CutVariable::EcalIso => iso.ecal_rec_hit_sum_et / pt,
            CutVariable::HcalIso => iso.hcal_tower_sum_et() / pt,
            CutVariable::SigmaIetaIeta => electron.sigma_ieta_ieta,
            CutVariable::DeltaPhi => electron.delta_phi_sc_track,
            CutVariable::DeltaEta => electron.delta_eta_sc_track,
            CutVariable::HadronicOverEm => electron.hadronic_over_em,
            CutVariable::CombinedIso => {
                let ecal = if electron.is_barrel() {
                    (iso.ecal_rec_hit_sum_et - BARREL_ECAL_PEDESTAL).max(0.0)
                } else {
                    iso.ecal_rec_hit_sum_et
                };
                (iso.track_sum_pt + ecal + iso.hcal_tower_sum_et()) / pt
            }
            CutVariable::TipBeamSpot => electron.dxy_beam_spot.abs(),
            CutVariable::EOverP => electron.e_sc_over_p,
            CutVariable::UserTrackIso => electron.user_isolation.track,
            CutVariable::UserEcalIso => electron.user_isolation.ecal,
            CutVariable::UserHcalIso => electron.user_isolation.hcal,
        }
    }
}

impl fmt::Display for CutVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CutVariable {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.name() == s)
            .ok_or_else(|| Error::Config(format!("unknown cut variable '{s}'")))
    }
}

/// Thresholds and invert flags of one variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CutThresholds {
    /// Barrel threshold
    #[serde(default = "open_threshold")]
    pub central: f64,
    /// Endcap threshold
    #[serde(default = "open_threshold")]
    pub forward: f64,
    /// Invert the barrel check in the control selection
    #[serde(default)]
    pub invert_central: bool,
    /// Invert the endcap check in the control selection
    #[serde(default)]
    pub invert_forward: bool,
}

fn open_threshold() -> f64 {
    OPEN_THRESHOLD
}

impl Default for CutThresholds {
    fn default() -> Self {
        Self {
            central: OPEN_THRESHOLD,
            forward: OPEN_THRESHOLD,
            invert_central: false,
            invert_forward: false,
        }
    }
}

/// One row of the cut table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutEntry {
    /// Variable this row applies to
    pub variable: CutVariable,
    /// Barrel threshold
    pub central: f64,
    /// Endcap threshold
    pub forward: f64,
    /// Invert the barrel check in the control selection
    pub invert_central: bool,
    /// Invert the endcap check in the control selection
    pub invert_forward: bool,
}

impl CutEntry {
    fn new(variable: CutVariable, t: CutThresholds) -> Self {
        Self {
            variable,
            central: t.central,
            forward: t.forward,
            invert_central: t.invert_central,
            invert_forward: t.invert_forward,
        }
    }

    /// Threshold in `region`.
    pub fn threshold(&self, region: Region) -> f64 {
        match region {
            Region::Central => self.central,
            Region::Forward => self.forward,
        }
    }

    /// Whether the control selection inverts this variable in `region`.
    pub fn inverted(&self, region: Region) -> bool {
        match region {
            Region::Central => self.invert_central,
            Region::Forward => self.invert_forward,
        }
    }

    /// Normal check: `|value| < threshold`.
    pub fn passes(&self, value: f64, region: Region) -> bool {
        value.abs() < self.threshold(region)
    }

    /// Control-selection check: `|value| > threshold` when inverted, else the normal check.
    pub fn passes_inverted(&self, value: f64, region: Region) -> bool {
        if self.inverted(region) {
            value.abs() > self.threshold(region)
        } else {
            self.passes(value, region)
        }
    }
}

/// Immutable table of the 13 cuts, indexed by [`CutVariable`].
#[derive(Debug, Clone, PartialEq)]
pub struct CutTable {
    entries: [CutEntry; CutVariable::COUNT],
}

impl Default for CutTable {
    fn default() -> Self {
        Self::from_fn(|_| CutThresholds::default())
    }
}

impl CutTable {
    fn from_fn(mut f: impl FnMut(CutVariable) -> CutThresholds) -> Self {
        Self { entries: CutVariable::ALL.map(|v| CutEntry::new(v, f(v))) }
    }

    /// Build from per-variable thresholds; unlisted variables stay open.
    pub fn from_thresholds<'a>(
        thresholds: impl IntoIterator<Item = (&'a CutVariable, &'a CutThresholds)>,
    ) -> Result<Self> {
        let mut table = Self::default();
        for (&var, t) in thresholds {
            for (label, v) in [("central", t.central), ("forward", t.forward)] {
                if v.is_nan() {
                    return Err(Error::Config(format!("{var}.{label} threshold is NaN")));
                }
            }
            table.entries[var.index()] = CutEntry::new(var, *t);
        }
        Ok(table)
    }

    /// Build from parallel columns in table order.
    ///
    /// All four columns must have exactly [`CutVariable::COUNT`] entries.
    pub fn from_columns(
        central: &[f64],
        forward: &[f64],
        invert_central: &[bool],
        invert_forward: &[bool],
    ) -> Result<Self> {
        let n = CutVariable::COUNT;
        let lens = [central.len(), forward.len(), invert_central.len(), invert_forward.len()];
        if lens.iter().any(|&l| l != n) {
            return Err(Error::Config(format!(
                "cut table columns must all have {n} entries, got \
                 central={}, forward={}, invert_central={}, invert_forward={}",
                lens[0], lens[1], lens[2], lens[3]
            )));
        }
        Ok(Self::from_fn(|v| {
            let i = v.index();
            CutThresholds {
                central: central[i],
                forward: forward[i],
                invert_central: invert_central[i],
                invert_forward: invert_forward[i],
            }
        }))
    }

    /// Row of `variable`.
    pub fn entry(&self, variable: CutVariable) -> &CutEntry {
        &self.entries[variable.index()]
    }

    /// Rows in table order.
    pub fn entries(&self) -> &[CutEntry] {
        &self.entries
    }

    /// Whether any row inverts any region.
    pub fn has_inversions(&self) -> bool {
        self.entries.iter().any(|e| e.invert_central || e.invert_forward)
    }
}
