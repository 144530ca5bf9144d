//! Per-event records consumed and produced by the selection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::kinematics::{BARREL_ENDCAP_BOUNDARY, transverse_energy};

/// Run / luminosity-block / event identifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId {
    /// Run number
    pub run: i32,
    /// Luminosity block
    pub lumi: i32,
    /// Event number within the run
    pub event: i64,
}

/// Energy deposit clustered in the electromagnetic calorimeter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SuperCluster {
    /// Raw cluster energy (GeV)
    pub energy: f64,
    /// Cluster pseudorapidity
    pub eta: f64,
    /// Cluster azimuth
    pub phi: f64,
}

/// Track reconstructed with the Gaussian-sum filter and attached to the electron.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GsfTrack {
    /// Transverse momentum (GeV)
    pub pt: f64,
    /// Pseudorapidity at the vertex
    pub eta: f64,
    /// Azimuth at the vertex
    pub phi: f64,
    /// Electric charge (±1)
    pub charge: i32,
    /// Signed transverse impact parameter w.r.t. the origin (cm)
    #[serde(default)]
    pub d0: f64,
    /// Whether the hit pattern has a valid hit in the first pixel barrel layer
    #[serde(default = "default_true")]
    pub valid_first_pixel_hit: bool,
    /// Hits expected on the inner tracker layers but not found
    #[serde(default)]
    pub expected_inner_missing_hits: u32,
}

fn default_true() -> bool {
    true
}

impl Default for GsfTrack {
    fn default() -> Self {
        Self {
            pt: 0.0,
            eta: 0.0,
            phi: 0.0,
            charge: -1,
            d0: 0.0,
            valid_first_pixel_hit: true,
            expected_inner_missing_hits: 0,
        }
    }
}

/// Isolation sums in a ΔR = 0.3 cone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Isolation {
    /// Scalar sum of track pT
    pub track_sum_pt: f64,
    /// Sum of ECAL rec-hit ET
    pub ecal_rec_hit_sum_et: f64,
    /// Sum of HCAL depth-1 tower ET
    pub hcal_depth1_tower_sum_et: f64,
    /// Sum of HCAL depth-2 tower ET
    #[serde(default)]
    pub hcal_depth2_tower_sum_et: f64,
}

impl Isolation {
    /// Total HCAL tower sum over both depths.
    pub fn hcal_tower_sum_et(&self) -> f64 {
        self.hcal_depth1_tower_sum_et + self.hcal_depth2_tower_sum_et
    }
}

/// User-defined isolation values computed upstream with custom cones/vetoes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UserIsolation {
    /// Track isolation
    pub track: f64,
    /// ECAL isolation
    pub ecal: f64,
    /// HCAL isolation
    pub hcal: f64,
}

/// A point in the detector frame (cm).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    /// x
    pub x: f64,
    /// y
    pub y: f64,
    /// z
    pub z: f64,
}

/// Derived quality information attached to the selected electron.
///
/// `None` means the quantity was not computed for this electron; consumers
/// decide how to treat that (the plotter passes with a warning).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Annotations {
    /// Valid hit in the first pixel barrel layer
    pub pass_valid_first_pixel_hit: Option<bool>,
    /// Expected-but-missing inner hits
    pub expected_missing_hits: Option<u32>,
    /// Not tagged as a photon conversion
    pub pass_conversion_rejection: Option<bool>,
    /// Signed transverse distance to the nearest conversion partner (cm)
    pub conversion_dist: Option<f64>,
    /// Δcot θ to the nearest conversion partner
    pub conversion_dcot: Option<f64>,
}

impl Annotations {
    /// True when nothing has been computed.
    pub fn is_empty(&self) -> bool {
        *self == Annotations::default()
    }
}

/// Reconstructed electron candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Electron {
    /// Calorimeter energy (GeV)
    pub calo_energy: f64,
    /// Pseudorapidity of the calorimeter position
    pub calo_eta: f64,
    /// Candidate transverse momentum (GeV)
    pub pt: f64,
    /// Candidate pseudorapidity
    pub eta: f64,
    /// Candidate azimuth
    pub phi: f64,
    /// Supercluster
    pub super_cluster: SuperCluster,
    /// GSF track
    pub gsf_track: GsfTrack,
    /// Charge of the closest general track, if one is associated
    #[serde(default)]
    pub ctf_charge: Option<i32>,
    /// Charge from the supercluster–pixel-seed direction
    #[serde(default)]
    pub sc_pix_charge: i32,
    /// σ_iηiη shower shape
    pub sigma_ieta_ieta: f64,
    /// Δη between supercluster and track at the vertex
    pub delta_eta_sc_track: f64,
    /// Δφ between supercluster and track at the vertex
    pub delta_phi_sc_track: f64,
    /// Hadronic over electromagnetic energy
    pub hadronic_over_em: f64,
    /// Supercluster energy over track momentum
    #[serde(default)]
    pub e_sc_over_p: f64,
    /// Signed transverse impact parameter w.r.t. the beam spot (cm)
    #[serde(default)]
    pub dxy_beam_spot: f64,
    /// Transverse impact parameter w.r.t. the primary vertex (cm)
    #[serde(default)]
    pub dxy_primary_vertex: Option<f64>,
    /// ΔR = 0.3 isolation sums
    #[serde(default)]
    pub isolation: Isolation,
    /// User isolation values
    #[serde(default)]
    pub user_isolation: UserIsolation,
    /// Electron vertex
    #[serde(default)]
    pub vertex: Point3,
    /// Event primary vertex
    #[serde(default)]
    pub primary_vertex: Option<Point3>,
    /// Precalculated identification scores keyed by producer name
    #[serde(default)]
    pub electron_ids: BTreeMap<String, f64>,
    /// Derived annotations
    #[serde(default, skip_serializing_if = "Annotations::is_empty")]
    pub annotations: Annotations,
}

impl Electron {
    /// Calorimeter transverse energy, `calo_energy / cosh(calo_eta)`.
    pub fn calo_et(&self) -> f64 {
        transverse_energy(self.calo_energy, self.calo_eta)
    }

    /// Supercluster transverse energy, `sc.energy / cosh(sc.eta)`.
    pub fn sc_et(&self) -> f64 {
        transverse_energy(self.super_cluster.energy, self.super_cluster.eta)
    }

    /// Supercluster energy projected with the track direction.
    pub fn sc_gsf_et(&self) -> f64 {
        transverse_energy(self.super_cluster.energy, self.gsf_track.eta)
    }

    /// Whether the supercluster lies in the barrel.
    pub fn is_barrel(&self) -> bool {
        self.super_cluster.eta.abs() < BARREL_ENDCAP_BOUNDARY
    }
}

/// Missing transverse energy of one reconstruction flavour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetFlavor {
    /// Magnitude (GeV)
    pub et: f64,
    /// Direction
    pub phi: f64,
}

/// Missing transverse energy record for one event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MissingEnergy {
    /// Calorimeter-based MET; the primary flavour used by the selection.
    pub calo: MetFlavor,
    /// Particle-flow MET
    #[serde(default)]
    pub pf: Option<MetFlavor>,
    /// Track-corrected MET
    #[serde(default)]
    pub tc: Option<MetFlavor>,
}

/// Object that fired a trigger filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TriggerObject {
    /// Pseudorapidity
    pub eta: f64,
    /// Azimuth
    pub phi: f64,
    /// Trigger object type identifier
    #[serde(default)]
    pub type_id: i32,
}

/// General charged track, used only for conversion partner searches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Transverse momentum (GeV)
    pub pt: f64,
    /// Pseudorapidity
    pub eta: f64,
    /// Azimuth
    pub phi: f64,
    /// Electric charge (±1)
    pub charge: i32,
    /// Signed transverse impact parameter (cm)
    #[serde(default)]
    pub d0: f64,
}

/// Reconstructed jet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Jet {
    /// Transverse energy (GeV)
    pub et: f64,
    /// Pseudorapidity
    pub eta: f64,
    /// Azimuth
    pub phi: f64,
}

/// Everything the selector may look at for one event.
///
/// Optional collections model products that may be missing from the event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Identifiers
    pub id: EventId,
    /// Trigger path decisions
    #[serde(default)]
    pub trigger_results: Option<BTreeMap<String, bool>>,
    /// Trigger objects keyed by filter label
    #[serde(default)]
    pub trigger_objects: Option<BTreeMap<String, Vec<TriggerObject>>>,
    /// Electron candidates
    #[serde(default)]
    pub electrons: Option<Vec<Electron>>,
    /// Missing transverse energy
    #[serde(default)]
    pub met: Option<MissingEnergy>,
    /// General tracks
    #[serde(default)]
    pub general_tracks: Option<Vec<Track>>,
    /// Monitored solenoid current (A)
    #[serde(default)]
    pub magnet_current: Option<f64>,
    /// Calorimeter jets
    #[serde(default)]
    pub calo_jets: Option<Vec<Jet>>,
    /// Particle-flow jets
    #[serde(default)]
    pub pf_jets: Option<Vec<Jet>>,
}

/// Jets travelling with a candidate for ntuple cross-cleaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventJets {
    /// Calorimeter jets
    #[serde(default)]
    pub calo: Option<Vec<Jet>>,
    /// Particle-flow jets
    #[serde(default)]
    pub pf: Option<Vec<Jet>>,
}

impl EventRecord {
    /// Jet collections of this event.
    pub fn jets(&self) -> EventJets {
        EventJets { calo: self.calo_jets.clone(), pf: self.pf_jets.clone() }
    }
}

/// The W -> e nu candidate: the selected electron and the event's MET.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WCandidate {
    /// Leading fiducial electron, carrying any annotations
    pub electron: Electron,
    /// Missing transverse energy record
    pub met: MissingEnergy,
}

/// A candidate together with its event context, as exchanged between
/// `wenu select` and `wenu plot`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    /// Identifiers
    pub id: EventId,
    /// Candidate
    pub candidate: WCandidate,
    /// Jets of the event
    #[serde(default)]
    pub jets: EventJets,
}
