//! Flat per-candidate output rows.

use wenu_core::kinematics::transverse_mass;
use wenu_core::{EventId, MetFlavor, WCandidate};

use crate::jets::JetSlots;

/// One flat row describing a candidate.
///
/// Floating-point columns are stored in single precision. `None` marks a
/// quantity the input did not provide.
#[derive(Debug, Clone, PartialEq)]
pub struct NtupleRow {
    /// Run number
    pub run: i32,
    /// Luminosity block
    pub lumi: i32,
    /// Event number
    pub event: i64,

    /// Supercluster energy over cosh(track η)
    pub ele_sc_gsf_et: f32,
    /// Supercluster energy
    pub ele_sc_energy: f32,
    /// Supercluster η
    pub ele_sc_eta: f32,
    /// Supercluster φ
    pub ele_sc_phi: f32,
    /// Candidate ET, stored as the candidate pT.
    ///
    /// Records carry no candidate energy; for an electron the mass term
    /// changes ET by less than 1e-9 relative at analysis momenta.
    pub ele_cand_et: f32,
    /// Candidate η
    pub ele_cand_eta: f32,
    /// Candidate φ
    pub ele_cand_phi: f32,

    /// Track isolation over candidate pT
    pub ele_iso_track: f32,
    /// ECAL isolation over candidate pT
    pub ele_iso_ecal: f32,
    /// HCAL (depth 1 + 2) isolation over candidate pT
    pub ele_iso_hcal: f32,

    /// σ_iηiη
    pub ele_id_sihih: f32,
    /// Δη supercluster-track
    pub ele_id_deta: f32,
    /// Δφ supercluster-track
    pub ele_id_dphi: f32,
    /// H/E
    pub ele_id_hoe: f32,

    /// Expected missing inner hits of the GSF track
    pub ele_cr_mhitsinner: i32,
    /// Δcot θ to the nearest conversion partner
    pub ele_cr_dcot: Option<f32>,
    /// Transverse distance to the nearest conversion partner
    pub ele_cr_dist: Option<f32>,

    /// Electron vertex x
    pub ele_vx: f32,
    /// Electron vertex y
    pub ele_vy: f32,
    /// Electron vertex z
    pub ele_vz: f32,
    /// Primary vertex x
    pub pv_x: Option<f32>,
    /// Primary vertex y
    pub pv_y: Option<f32>,
    /// Primary vertex z
    pub pv_z: Option<f32>,

    /// GSF track charge
    pub ele_gsf_charge: i32,
    /// Closest general-track charge
    pub ele_ctf_charge: Option<i32>,
    /// Supercluster-pixel charge
    pub ele_sc_pix_charge: i32,

    /// E_sc / p
    pub ele_eop: f32,
    /// Transverse impact parameter w.r.t. the beam spot, sign flipped
    pub ele_tip_bs: f32,
    /// Transverse impact parameter w.r.t. the primary vertex
    pub ele_tip_pv: Option<f32>,

    /// Calo MET
    pub event_calo_met: f32,
    /// Calo MET φ
    pub event_calo_met_phi: f32,
    /// Transverse mass with calo MET
    pub event_calo_mt: f32,
    /// PF MET
    pub event_pf_met: Option<f32>,
    /// PF MET φ
    pub event_pf_met_phi: Option<f32>,
    /// Transverse mass with PF MET
    pub event_pf_mt: Option<f32>,
    /// Track-corrected MET
    pub event_tc_met: Option<f32>,
    /// Track-corrected MET φ
    pub event_tc_met_phi: Option<f32>,
    /// Transverse mass with track-corrected MET
    pub event_tc_mt: Option<f32>,

    /// Dataset tag from the configuration
    pub event_dataset_tag: i32,

    /// Leading cleaned calo jets
    pub calo_jets: Option<JetSlots>,
    /// Leading cleaned PF jets
    pub pf_jets: Option<JetSlots>,
}

impl NtupleRow {
    /// Build the row of `candidate`; jet columns are left empty.
    pub fn new(id: &EventId, candidate: &WCandidate, dataset_tag: i32) -> Self {
        let e = &candidate.electron;
        let sc = &e.super_cluster;
        let cand_et = e.pt;
        let sc_gsf_et = e.sc_gsf_et();
        let mt = |m: &MetFlavor| transverse_mass(sc_gsf_et, sc.phi, m.et, m.phi) as f32;
        let met = &candidate.met;

        Self {
            run: id.run,
            lumi: id.lumi,
            event: id.event,

            ele_sc_gsf_et: sc_gsf_et as f32,
            ele_sc_energy: sc.energy as f32,
            ele_sc_eta: sc.eta as f32,
            ele_sc_phi: sc.phi as f32,
            ele_cand_et: cand_et as f32,
            ele_cand_eta: e.eta as f32,
            ele_cand_phi: e.phi as f32,

            ele_iso_track: (e.isolation.track_sum_pt / cand_et) as f32,
            ele_iso_ecal: (e.isolation.ecal_rec_hit_sum_et / cand_et) as f32,
            ele_iso_hcal: (e.isolation.hcal_tower_sum_et() / cand_et) as f32,

            ele_id_sihih: e.sigma_ieta_ieta as f32,
            ele_id_deta: e.delta_eta_sc_track as f32,
            ele_id_dphi: e.delta_phi_sc_track as f32,
            ele_id_hoe: e.hadronic_over_em as f32,

            ele_cr_mhitsinner: i32::try_from(e.gsf_track.expected_inner_missing_hits)
                .unwrap_or(i32::MAX),
            ele_cr_dcot: e.annotations.conversion_dcot.map(|v| v as f32),
            ele_cr_dist: e.annotations.conversion_dist.map(|v| v as f32),

            ele_vx: e.vertex.x as f32,
            ele_vy: e.vertex.y as f32,
            ele_vz: e.vertex.z as f32,
            pv_x: e.primary_vertex.map(|p| p.x as f32),
            pv_y: e.primary_vertex.map(|p| p.y as f32),
            pv_z: e.primary_vertex.map(|p| p.z as f32),

            ele_gsf_charge: e.gsf_track.charge,
            ele_ctf_charge: e.ctf_charge,
            ele_sc_pix_charge: e.sc_pix_charge,

            ele_eop: e.e_sc_over_p as f32,
            ele_tip_bs: -e.dxy_beam_spot as f32,
            ele_tip_pv: e.dxy_primary_vertex.map(|v| v as f32),

            event_calo_met: met.calo.et as f32,
            event_calo_met_phi: met.calo.phi as f32,
            event_calo_mt: mt(&met.calo),
            event_pf_met: met.pf.map(|m| m.et as f32),
            event_pf_met_phi: met.pf.map(|m| m.phi as f32),
            event_pf_mt: met.pf.as_ref().map(mt),
            event_tc_met: met.tc.map(|m| m.et as f32),
            event_tc_met_phi: met.tc.map(|m| m.phi as f32),
            event_tc_mt: met.tc.as_ref().map(mt),

            event_dataset_tag: dataset_tag,

            calo_jets: None,
            pf_jets: None,
        }
    }
}

/// Rows of one output table.
#[derive(Debug, Clone, PartialEq)]
pub struct NtupleTable {
    /// Table name, used as the output file stem
    pub name: String,
    /// Whether the jet columns are part of the schema
    pub include_jets: bool,
    /// Rows in fill order
    pub rows: Vec<NtupleRow>,
}

impl NtupleTable {
    /// Empty table.
    pub fn new(name: impl Into<String>, include_jets: bool) -> Self {
        Self { name: name.into(), include_jets, rows: Vec::new() }
    }

    /// Append a row.
    pub fn push(&mut self, row: NtupleRow) {
        self.rows.push(row);
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
