//! Per-candidate aggregation into histograms and ntuples.

use wenu_core::kinematics::{transverse_energy, transverse_mass};
use wenu_core::{Electron, EventId, EventJets, Result, WCandidate};

use crate::book::{
    H_MET, H_MET_INVERSE, H_MT, H_MT_INVERSE, H_SC_ET, H_SC_ETA, H_SC_PHI, HistogramBook,
    REGION_VARIABLES, n_minus_one_name, variable_name,
};
use crate::config::PlotsConfig;
use crate::cuts::{CutVariable, Region};
use crate::evaluator::CutEvaluator;
use crate::jets::clean_and_rank;
use crate::ntuple::{NtupleRow, NtupleTable};
use crate::preselection;

/// Name of the table receiving every candidate.
pub const PRESELECTION_TABLE: &str = "preselection";
/// Name of the table receiving fully selected candidates.
pub const SELECTION_TABLE: &str = "selection";

/// What happened to one candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlotOutcome {
    /// Region of the supercluster
    pub region: Option<Region>,
    /// Row appended to the selection table
    pub selected: bool,
    /// Stopped by the annotation preselection before any histogram
    pub preselection_failed: bool,
    /// Passed the inverted control selection
    pub inverted: bool,
    /// Filled the N-1 track-isolation histogram
    pub n_minus_one: bool,
}

/// Accumulators filled at job end.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotResults {
    /// Booked histograms
    pub histograms: HistogramBook,
    /// Every analysed candidate
    pub preselection: NtupleTable,
    /// Candidates passing the full selection
    pub selection: NtupleTable,
}

/// Evaluates candidates and fills the accumulators.
#[derive(Debug)]
pub struct Plotter {
    config: PlotsConfig,
    evaluator: CutEvaluator,
    results: PlotResults,
}

impl Plotter {
    /// Validate `config`, build the cut table and book the histograms.
    pub fn new(config: PlotsConfig) -> Result<Self> {
        config.validate()?;
        let evaluator = match &config.precalc_id {
            Some(req) => {
                log::info!("wenu plots: using precalculated ID {req}");
                CutEvaluator::PrecalculatedId(req.clone())
            }
            None => {
                let table = config.cut_table()?;
                for e in table.entries() {
                    log::debug!(
                        "wenu plots: cut {:<16} EB {} (inv {}) EE {} (inv {})",
                        e.variable.name(),
                        e.central,
                        e.invert_central,
                        e.forward,
                        e.invert_forward
                    );
                }
                CutEvaluator::Table(table)
            }
        };
        if config.preselection_active() {
            let p = &config.preselection;
            if p.use_valid_first_pixel_hit {
                log::warn!("wenu plots: a valid 1st layer pixel hit is demanded");
            }
            if p.use_conversion_rejection {
                log::warn!("wenu plots: conversion rejection is demanded");
            }
            if p.use_expected_missing_hits {
                log::warn!(
                    "wenu plots: at most {} expected missing inner hits are demanded",
                    p.max_expected_missing_hits
                );
            }
        }
        let include_jets = config.jets.include;
        let results = PlotResults {
            histograms: HistogramBook::standard()?,
            preselection: NtupleTable::new(PRESELECTION_TABLE, include_jets),
            selection: NtupleTable::new(SELECTION_TABLE, include_jets),
        };
        Ok(Self { config, evaluator, results })
    }

    /// Active configuration.
    pub fn config(&self) -> &PlotsConfig {
        &self.config
    }

    /// Accumulated results so far.
    pub fn results(&self) -> &PlotResults {
        &self.results
    }

    /// Consume the plotter and hand over the accumulators.
    pub fn finish(self) -> PlotResults {
        self.results
    }

    /// Aggregate one candidate.
    pub fn analyze(
        &mut self,
        id: &EventId,
        candidate: &WCandidate,
        jets: Option<&EventJets>,
    ) -> PlotOutcome {
        let electron = &candidate.electron;
        let mut outcome = PlotOutcome::default();

        let mut row = NtupleRow::new(id, candidate, self.config.dataset_tag);
        if self.config.jets.include {
            self.attach_jets(&mut row, candidate, jets);
        }
        let selected = self.evaluator.passes(electron);
        if selected {
            self.results.selection.push(row.clone());
        }
        self.results.preselection.push(row);
        outcome.selected = selected;

        if self.config.preselection_active()
            && !preselection::passes(&self.config.preselection, electron)
        {
            outcome.preselection_failed = true;
            return outcome;
        }

        let sc = &electron.super_cluster;
        let region = Region::of_eta(sc.eta);
        outcome.region = Some(region);
        let sc_et = transverse_energy(sc.energy, sc.eta);
        let met = candidate.met.calo;
        let mt = transverse_mass(sc_et, sc.phi, met.et, met.phi);
        let book = &mut self.results.histograms;

        if self.evaluator.passes_inverted(electron) == Some(true) {
            outcome.inverted = true;
            book.fill_split(H_MET_INVERSE, region, met.et);
            book.fill_split(H_MT_INVERSE, region, mt);
        }
        if self.evaluator.passes_n_minus_one(electron, CutVariable::TrackIso) == Some(true) {
            outcome.n_minus_one = true;
            book.fill(n_minus_one_name(region), plotted_value(CutVariable::TrackIso, electron));
        }

        if !selected {
            return outcome;
        }

        book.fill_split(H_MET, region, met.et);
        book.fill_split(H_MT, region, mt);
        for (suffix, var) in REGION_VARIABLES.iter().zip(CutVariable::ALL) {
            book.fill(&variable_name(region, suffix), plotted_value(var, electron));
        }
        book.fill(H_SC_ET, sc_et);
        book.fill(H_SC_ETA, sc.eta);
        book.fill(H_SC_PHI, sc.phi);
        outcome
    }

    fn attach_jets(&self, row: &mut NtupleRow, candidate: &WCandidate, jets: Option<&EventJets>) {
        let e = &candidate.electron;
        let (eta, phi) = (e.gsf_track.eta, e.super_cluster.phi);
        let dr = self.config.jets.dr_jet_from_electron.unwrap_or(0.0);

        match jets.and_then(|j| j.calo.as_deref()) {
            Some(calo) => row.calo_jets = Some(clean_and_rank(calo, eta, phi, dr)),
            None => {
                log::warn!(
                    "wenu plots: could not get calo jet collection {}",
                    self.config.jets.calo_label
                );
                row.calo_jets = Some(Default::default());
            }
        }
        match jets.and_then(|j| j.pf.as_deref()) {
            Some(pf) => row.pf_jets = Some(clean_and_rank(pf, eta, phi, dr)),
            None => {
                log::warn!(
                    "wenu plots: could not get pf jet collection {}",
                    self.config.jets.pf_label
                );
                row.pf_jets = Some(Default::default());
            }
        }
    }
}

/// Value histogrammed for `var`.
///
/// Isolation plots show the absolute user isolation (GeV); the cut table
/// keeps using the relative sums.
fn plotted_value(var: CutVariable, electron: &Electron) -> f64 {
    let user = &electron.user_isolation;
    match var {
        CutVariable::TrackIso => user.track,
        CutVariable::EcalIso => user.ecal,
        CutVariable::HcalIso => user.hcal,
        other => other.value(electron),
    }
}
