//! The W -> e nu candidate filter.
//!
//! [`CandidateSelector::select`] walks a fixed sequence of gates. The first
//! gate that fails decides the [`Rejection`]; an event passing all of them
//! yields exactly one [`WCandidate`] built from the highest-ET fiducial
//! electron.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;
use wenu_core::kinematics::delta_r;
use wenu_core::{
    ConversionClassifier, ConversionCuts, Electron, EventRecord, IdDecision, Result, WCandidate,
};

use crate::config::SelectorConfig;
use crate::conversion::HelixPartnerFinder;

/// Why an event produced no candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// Trigger results are not available
    TriggerResultsMissing,
    /// The configured path is unknown or did not fire
    TriggerNotFired,
    /// The configured filter produced no trigger objects
    TriggerFilterMissing,
    /// No electron collection, or an empty one
    NoElectrons,
    /// No missing-energy record
    MetMissing,
    /// No electron inside the fiducial windows
    NoFiducialElectrons,
    /// Leading electron below the ET threshold
    LeadingEtBelowCut,
    /// A second electron above threshold (and passing the veto ID)
    SecondElectron,
    /// No valid hit in the first pixel layer
    NoValidFirstPixelHit,
    /// Too many expected missing inner hits
    TooManyMissingHits,
    /// Tagged as a photon conversion
    Conversion,
    /// No trigger object close to the electron
    NotMatchedToTrigger,
    /// Missing energy below threshold
    MetBelowCut,
}

impl Rejection {
    /// Every rejection reason, in gate order.
    pub const ALL: [Rejection; 13] = [
        Rejection::TriggerResultsMissing,
        Rejection::TriggerNotFired,
        Rejection::TriggerFilterMissing,
        Rejection::NoElectrons,
        Rejection::MetMissing,
        Rejection::NoFiducialElectrons,
        Rejection::LeadingEtBelowCut,
        Rejection::SecondElectron,
        Rejection::NoValidFirstPixelHit,
        Rejection::TooManyMissingHits,
        Rejection::Conversion,
        Rejection::NotMatchedToTrigger,
        Rejection::MetBelowCut,
    ];

    /// Stable snake_case label.
    pub fn as_str(self) -> &'static str {
        match self {
            Rejection::TriggerResultsMissing => "trigger_results_missing",
            Rejection::TriggerNotFired => "trigger_not_fired",
            Rejection::TriggerFilterMissing => "trigger_filter_missing",
            Rejection::NoElectrons => "no_electrons",
            Rejection::MetMissing => "met_missing",
            Rejection::NoFiducialElectrons => "no_fiducial_electrons",
            Rejection::LeadingEtBelowCut => "leading_et_below_cut",
            Rejection::SecondElectron => "second_electron",
            Rejection::NoValidFirstPixelHit => "no_valid_first_pixel_hit",
            Rejection::TooManyMissingHits => "too_many_missing_hits",
            Rejection::Conversion => "conversion",
            Rejection::NotMatchedToTrigger => "not_matched_to_trigger",
            Rejection::MetBelowCut => "met_below_cut",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of selecting one event.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// The event holds a W candidate
    Accepted(WCandidate),
    /// The event was vetoed
    Rejected(Rejection),
}

impl Selection {
    /// Whether a candidate was produced.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Selection::Accepted(_))
    }

    /// The candidate, if any.
    pub fn candidate(self) -> Option<WCandidate> {
        match self {
            Selection::Accepted(c) => Some(c),
            Selection::Rejected(_) => None,
        }
    }

    /// The rejection reason, if any.
    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Selection::Accepted(_) => None,
            Selection::Rejected(r) => Some(*r),
        }
    }
}

/// Rank electrons by transverse energy, highest first.
///
/// Returns `(index, ET)` pairs. The sort is stable, so electrons with equal
/// ET keep their input order.
pub fn rank_by_et(electrons: &[&Electron]) -> Vec<(usize, f64)> {
    let mut ranked: Vec<(usize, f64)> =
        electrons.iter().enumerate().map(|(i, e)| (i, e.calo_et())).collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    ranked
}

/// Per-event W -> e nu candidate filter.
pub struct CandidateSelector {
    config: SelectorConfig,
    classifier: Box<dyn ConversionClassifier>,
}

impl fmt::Debug for CandidateSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CandidateSelector")
            .field("config", &self.config)
            .field("classifier", &self.classifier.name())
            .finish()
    }
}

impl CandidateSelector {
    /// Selector using the geometric [`HelixPartnerFinder`] for conversions.
    pub fn new(config: SelectorConfig) -> Result<Self> {
        Self::with_classifier(config, Box::new(HelixPartnerFinder::default()))
    }

    /// Selector with a caller-provided conversion classifier.
    pub fn with_classifier(
        config: SelectorConfig,
        classifier: Box<dyn ConversionClassifier>,
    ) -> Result<Self> {
        config.validate()?;
        let selector = Self { config, classifier };
        selector.log_summary();
        Ok(selector)
    }

    /// Active configuration.
    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    fn log_summary(&self) {
        let c = &self.config;
        if c.trigger.use_trigger_info {
            log::info!("wenu filter: HLT path {}", c.trigger.hlt_path);
            log::info!("wenu filter: HLT filter {}", c.trigger.hlt_filter);
        } else {
            log::info!("wenu filter: trigger info will not be used");
        }
        log::info!("wenu filter: ET > {}, MET > {}", c.et_cut, c.met_cut);
        if c.veto_second_electron_events {
            log::info!("wenu filter: veto 2nd electron with ET > {}", c.et_cut_2nd_ele);
            if let Some(id) = &c.veto_second_electron_id {
                log::info!("wenu filter: veto 2nd electron ID {id}");
            }
        }
        if c.trigger.electron_matched_to_hlt && c.trigger.use_trigger_info {
            log::info!(
                "wenu filter: candidate must match an HLT object with dR < {}",
                c.trigger.electron_matched_to_hlt_dr
            );
        }
        let p = &c.preselection;
        if p.use_valid_first_pixel_hit {
            log::info!("wenu filter: valid hit in 1st pixel layer required");
        }
        if p.use_expected_missing_hits {
            log::info!(
                "wenu filter: at most {} expected missing inner hits",
                p.max_expected_missing_hits
            );
        }
        if p.use_conversion_rejection {
            log::info!(
                "wenu filter: conversion rejection ({}) dist < {}, dcot < {}",
                self.classifier.name(),
                p.conversion_rejection_dist,
                p.conversion_rejection_dcot
            );
        }
        log::info!(
            "wenu filter: fiducial |eta| < {} or {} < |eta| < {}",
            c.fiducial.barrel_max_eta,
            c.fiducial.endcap_min_eta,
            c.fiducial.endcap_max_eta
        );
    }

    /// Whether a pseudorapidity lies in the fiducial windows.
    pub fn is_fiducial(&self, eta: f64) -> bool {
        self.config.fiducial.contains(eta)
    }

    /// Run the selection on one event.
    pub fn select(&self, event: &EventRecord) -> Selection {
        match self.try_select(event) {
            Ok(candidate) => Selection::Accepted(candidate),
            Err(reason) => Selection::Rejected(reason),
        }
    }

    fn try_select(&self, event: &EventRecord) -> std::result::Result<WCandidate, Rejection> {
        let cfg = &self.config;
        let trig = &cfg.trigger;

        if trig.use_trigger_info {
            let results =
                event.trigger_results.as_ref().ok_or(Rejection::TriggerResultsMissing)?;
            if !results.get(&trig.hlt_path).copied().unwrap_or(false) {
                return Err(Rejection::TriggerNotFired);
            }
        }
        let hlt_objects = event
            .trigger_objects
            .as_ref()
            .and_then(|m| m.get(&trig.hlt_filter))
            .filter(|objs| !objs.is_empty());
        if trig.use_trigger_info && hlt_objects.is_none() {
            return Err(Rejection::TriggerFilterMissing);
        }

        let electrons = match event.electrons.as_deref() {
            Some(e) if !e.is_empty() => e,
            _ => return Err(Rejection::NoElectrons),
        };
        let met = event.met.ok_or(Rejection::MetMissing)?;

        let fiducial: Vec<&Electron> =
            electrons.iter().filter(|e| self.is_fiducial(e.calo_eta)).collect();
        if fiducial.is_empty() {
            return Err(Rejection::NoFiducialElectrons);
        }

        let ranked = rank_by_et(&fiducial);
        let (lead_idx, lead_et) = ranked[0];
        if lead_et < cfg.et_cut {
            return Err(Rejection::LeadingEtBelowCut);
        }

        if cfg.veto_second_electron_events
            && let Some(&(second_idx, second_et)) = ranked.get(1)
            && second_et > cfg.et_cut_2nd_ele
            && self.second_electron_passes_id(fiducial[second_idx])
        {
            return Err(Rejection::SecondElectron);
        }

        let mut leading = fiducial[lead_idx].clone();
        self.apply_preselection(&mut leading, event)?;

        if trig.electron_matched_to_hlt && trig.use_trigger_info {
            let matched = hlt_objects.is_some_and(|objs| {
                objs.iter().any(|o| {
                    delta_r(leading.eta, leading.phi, o.eta, o.phi)
                        < trig.electron_matched_to_hlt_dr
                })
            });
            if !matched {
                return Err(Rejection::NotMatchedToTrigger);
            }
        }

        if met.calo.et < cfg.met_cut {
            return Err(Rejection::MetBelowCut);
        }

        Ok(WCandidate { electron: leading, met })
    }

    /// Whether the second electron satisfies the veto identification.
    ///
    /// A missing score cannot clear the electron, so the veto still applies.
    fn second_electron_passes_id(&self, electron: &Electron) -> bool {
        let Some(req) = &self.config.veto_second_electron_id else {
            return true;
        };
        match req.decide(electron) {
            IdDecision::Pass => true,
            IdDecision::Fail => false,
            IdDecision::Unavailable => {
                log::warn!(
                    "wenu filter: request ignored: 2nd electron ID type '{}' not found in electron",
                    req.name
                );
                true
            }
        }
    }

    fn apply_preselection(
        &self,
        electron: &mut Electron,
        event: &EventRecord,
    ) -> std::result::Result<(), Rejection> {
        let p = &self.config.preselection;

        if p.use_valid_first_pixel_hit || p.calculate_valid_first_pixel_hit {
            let valid = electron.gsf_track.valid_first_pixel_hit;
            if p.use_valid_first_pixel_hit && !valid {
                return Err(Rejection::NoValidFirstPixelHit);
            }
            if p.calculate_valid_first_pixel_hit {
                electron.annotations.pass_valid_first_pixel_hit = Some(valid);
            }
        }

        if p.use_expected_missing_hits || p.calculate_expected_missing_hits {
            let missing = electron.gsf_track.expected_inner_missing_hits;
            if p.use_expected_missing_hits && missing > p.max_expected_missing_hits {
                return Err(Rejection::TooManyMissingHits);
            }
            if p.calculate_expected_missing_hits {
                electron.annotations.expected_missing_hits = Some(missing);
            }
        }

        if p.conversion_active() {
            let Some(tracks) = event.general_tracks.as_deref() else {
                log::warn!(
                    "wenu filter: general track collection not found in run {} event {}; \
                     conversion rejection is not applied",
                    event.id.run,
                    event.id.event
                );
                return Ok(());
            };
            let Some(bfield) = p.field.field_tesla(event) else {
                log::warn!(
                    "wenu filter: no magnet current reading in run {} event {}; \
                     conversion rejection is not applied",
                    event.id.run,
                    event.id.event
                );
                return Ok(());
            };
            let cuts = ConversionCuts {
                max_dist: p.conversion_rejection_dist,
                max_dcot: p.conversion_rejection_dcot,
            };
            let info = self.classifier.classify(electron, tracks, bfield, cuts);
            if info.is_conversion && p.use_conversion_rejection {
                return Err(Rejection::Conversion);
            }
            if p.calculate_conversion_rejection {
                electron.annotations.pass_conversion_rejection = Some(!info.is_conversion);
                electron.annotations.conversion_dist = info.dist;
                electron.annotations.conversion_dcot = info.dcot;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::config::FieldStrategy;
    use wenu_core::{
        ConversionInfo, GsfTrack, IdComparator, IdRequirement, MetFlavor, MissingEnergy, Track,
        TriggerObject,
    };

    const PATH: &str = "HLT_Ele15_LW_L1R";
    const FILTER: &str = "hltL1NonIsoHLTNonIsoSingleElectronLWEt15TrackIsolFilter";

    fn electron(energy: f64, eta: f64) -> Electron {
        Electron {
            calo_energy: energy,
            calo_eta: eta,
            pt: energy / eta.cosh(),
            eta,
            phi: 0.3,
            gsf_track: GsfTrack { pt: energy / eta.cosh(), eta, phi: 0.3, ..Default::default() },
            ..Default::default()
        }
    }

    fn event(electrons: Vec<Electron>) -> EventRecord {
        let mut paths = BTreeMap::new();
        paths.insert(PATH.to_string(), true);
        let mut objects = BTreeMap::new();
        objects.insert(FILTER.to_string(), vec![TriggerObject { eta: 0.0, phi: 0.3, type_id: 82 }]);
        EventRecord {
            trigger_results: Some(paths),
            trigger_objects: Some(objects),
            electrons: Some(electrons),
            met: Some(MissingEnergy {
                calo: MetFlavor { et: 35.0, phi: -2.8 },
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn no_trigger() -> SelectorConfig {
        let mut cfg = SelectorConfig::default();
        cfg.trigger.use_trigger_info = false;
        cfg
    }

    fn selector(cfg: SelectorConfig) -> CandidateSelector {
        CandidateSelector::new(cfg).unwrap()
    }

    #[test]
    fn no_fiducial_electrons_no_candidate() {
        let sel = selector(no_trigger());
        let ev = event(vec![electron(80.0, 1.5), electron(60.0, 2.7)]);
        assert_eq!(sel.select(&ev), Selection::Rejected(Rejection::NoFiducialElectrons));
    }

    #[test]
    fn single_electron_above_threshold_is_accepted() {
        let sel = selector(no_trigger());
        let ele = electron(45.0, 0.5);
        let ev = event(vec![ele.clone()]);
        let cand = sel.select(&ev).candidate().expect("candidate");
        assert_eq!(cand.electron, ele);
        assert_eq!(cand.met, ev.met.unwrap());
    }

    #[test]
    fn ranking_is_descending_and_stable() {
        let a = electron(40.0, 0.0);
        let b = electron(60.0, 0.0);
        let c = electron(50.0, 0.0);
        let ranked = rank_by_et(&[&a, &b, &c]);
        let order: Vec<f64> = ranked.iter().map(|r| r.1).collect();
        assert_eq!(order, vec![60.0, 50.0, 40.0]);
        assert_eq!(ranked[0].0, 1);

        let tie1 = electron(50.0, 0.0);
        let mut tie2 = electron(50.0, 0.0);
        tie2.phi = -1.0;
        let ranked = rank_by_et(&[&tie1, &tie2]);
        assert_eq!(ranked.iter().map(|r| r.0).collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn leading_et_is_compared_to_threshold() {
        let mut cfg = no_trigger();
        cfg.et_cut = 55.0;
        let sel = selector(cfg.clone());
        let ev = event(vec![electron(40.0, 0.0), electron(60.0, 0.0), electron(50.0, 0.0)]);
        let cand = sel.select(&ev).candidate().unwrap();
        assert_eq!(cand.electron.calo_energy, 60.0);

        cfg.et_cut = 65.0;
        let sel = selector(cfg);
        assert_eq!(sel.select(&ev), Selection::Rejected(Rejection::LeadingEtBelowCut));
    }

    #[test]
    fn second_electron_veto() {
        let mut cfg = no_trigger();
        cfg.veto_second_electron_events = true;
        cfg.et_cut_2nd_ele = 20.0;
        let sel = selector(cfg);
        let ev = event(vec![electron(50.0, 0.2), electron(25.0, -0.4)]);
        assert_eq!(sel.select(&ev), Selection::Rejected(Rejection::SecondElectron));

        let ev = event(vec![electron(50.0, 0.2), electron(15.0, -0.4)]);
        assert!(sel.select(&ev).is_accepted());
    }

    #[test]
    fn second_electron_veto_respects_id_gate() {
        let mut cfg = no_trigger();
        cfg.veto_second_electron_events = true;
        cfg.veto_second_electron_id =
            Some(IdRequirement::new("simpleEleId95relIso", IdComparator::Approx, 7.0).unwrap());
        let sel = selector(cfg);

        let mut second = electron(25.0, -0.4);
        second.electron_ids.insert("simpleEleId95relIso".into(), 0.0);
        let ev = event(vec![electron(50.0, 0.2), second.clone()]);
        assert!(sel.select(&ev).is_accepted());

        second.electron_ids.insert("simpleEleId95relIso".into(), 7.0);
        let ev = event(vec![electron(50.0, 0.2), second.clone()]);
        assert_eq!(sel.select(&ev), Selection::Rejected(Rejection::SecondElectron));

        // A missing score cannot clear the second electron.
        second.electron_ids.clear();
        let ev = event(vec![electron(50.0, 0.2), second]);
        assert_eq!(sel.select(&ev), Selection::Rejected(Rejection::SecondElectron));
    }

    #[test]
    fn fiducial_boundaries_are_excluded() {
        let mut cfg = no_trigger();
        cfg.et_cut = 0.0;
        cfg.fiducial.endcap_min_eta = 1.56;
        let sel = selector(cfg);
        assert!(!sel.is_fiducial(1.4442));
        assert!(!sel.is_fiducial(1.56));
        assert_eq!(
            sel.select(&event(vec![electron(50.0, 1.4442)])),
            Selection::Rejected(Rejection::NoFiducialElectrons)
        );
        assert_eq!(
            sel.select(&event(vec![electron(50.0, -1.56)])),
            Selection::Rejected(Rejection::NoFiducialElectrons)
        );
        assert!(sel.select(&event(vec![electron(50.0, 1.4441)])).is_accepted());
        assert!(sel.select(&event(vec![electron(200.0, 1.5601)])).is_accepted());
    }

    #[test]
    fn trigger_gates() {
        let sel = selector(SelectorConfig::default());
        let good = event(vec![electron(50.0, 0.0)]);
        assert!(sel.select(&good).is_accepted());

        let mut ev = good.clone();
        ev.trigger_results = None;
        assert_eq!(sel.select(&ev), Selection::Rejected(Rejection::TriggerResultsMissing));

        let mut ev = good.clone();
        ev.trigger_results.as_mut().unwrap().insert(PATH.into(), false);
        assert_eq!(sel.select(&ev), Selection::Rejected(Rejection::TriggerNotFired));

        let mut ev = good.clone();
        ev.trigger_results = Some(BTreeMap::new());
        assert_eq!(sel.select(&ev), Selection::Rejected(Rejection::TriggerNotFired));

        let mut ev = good.clone();
        ev.trigger_objects.as_mut().unwrap().insert(FILTER.into(), vec![]);
        assert_eq!(sel.select(&ev), Selection::Rejected(Rejection::TriggerFilterMissing));

        // Ignored entirely when trigger use is off.
        let sel = selector(no_trigger());
        let mut ev = good;
        ev.trigger_results = None;
        ev.trigger_objects = None;
        assert!(sel.select(&ev).is_accepted());
    }

    #[test]
    fn missing_collections_reject() {
        let sel = selector(no_trigger());
        let mut ev = event(vec![]);
        assert_eq!(sel.select(&ev), Selection::Rejected(Rejection::NoElectrons));
        ev.electrons = None;
        assert_eq!(sel.select(&ev), Selection::Rejected(Rejection::NoElectrons));

        let mut ev = event(vec![electron(50.0, 0.0)]);
        ev.met = None;
        assert_eq!(sel.select(&ev), Selection::Rejected(Rejection::MetMissing));
    }

    #[test]
    fn hlt_matching() {
        let mut cfg = SelectorConfig::default();
        cfg.trigger.electron_matched_to_hlt = true;
        cfg.trigger.electron_matched_to_hlt_dr = 0.1;
        let sel = selector(cfg);

        let ev = event(vec![electron(50.0, 0.05)]);
        assert!(sel.select(&ev).is_accepted());

        let mut ev = event(vec![electron(50.0, 0.05)]);
        ev.trigger_objects.as_mut().unwrap().insert(
            FILTER.into(),
            vec![TriggerObject { eta: 0.5, phi: 0.3, type_id: 82 }],
        );
        assert_eq!(sel.select(&ev), Selection::Rejected(Rejection::NotMatchedToTrigger));
    }

    #[test]
    fn hlt_matching_wraps_phi() {
        let mut cfg = SelectorConfig::default();
        cfg.trigger.electron_matched_to_hlt = true;
        let sel = selector(cfg);
        let mut ele = electron(50.0, 0.0);
        ele.phi = 3.12;
        let mut ev = event(vec![ele]);
        ev.trigger_objects.as_mut().unwrap().insert(
            FILTER.into(),
            vec![TriggerObject { eta: 0.0, phi: -3.12, type_id: 82 }],
        );
        assert!(sel.select(&ev).is_accepted());
    }

    #[test]
    fn met_threshold() {
        let mut cfg = no_trigger();
        cfg.met_cut = 40.0;
        let sel = selector(cfg);
        let ev = event(vec![electron(50.0, 0.0)]);
        assert_eq!(sel.select(&ev), Selection::Rejected(Rejection::MetBelowCut));
    }

    #[test]
    fn hit_pattern_enforce_and_annotate() {
        let mut cfg = no_trigger();
        cfg.preselection.calculate_valid_first_pixel_hit = true;
        cfg.preselection.calculate_expected_missing_hits = true;
        let sel = selector(cfg.clone());

        let mut ele = electron(50.0, 0.0);
        ele.gsf_track.valid_first_pixel_hit = false;
        ele.gsf_track.expected_inner_missing_hits = 2;
        let ev = event(vec![ele]);
        let cand = sel.select(&ev).candidate().unwrap();
        assert_eq!(cand.electron.annotations.pass_valid_first_pixel_hit, Some(false));
        assert_eq!(cand.electron.annotations.expected_missing_hits, Some(2));
        assert_eq!(cand.electron.annotations.pass_conversion_rejection, None);

        cfg.preselection.use_expected_missing_hits = true;
        let sel = selector(cfg.clone());
        assert_eq!(sel.select(&ev), Selection::Rejected(Rejection::TooManyMissingHits));

        cfg.preselection.use_valid_first_pixel_hit = true;
        let sel = selector(cfg);
        assert_eq!(sel.select(&ev), Selection::Rejected(Rejection::NoValidFirstPixelHit));
    }

    #[test]
    fn input_electron_is_not_modified() {
        let mut cfg = no_trigger();
        cfg.preselection.calculate_expected_missing_hits = true;
        let sel = selector(cfg);
        let ev = event(vec![electron(50.0, 0.0)]);
        let cand = sel.select(&ev).candidate().unwrap();
        assert_eq!(cand.electron.annotations.expected_missing_hits, Some(0));
        assert!(ev.electrons.as_ref().unwrap()[0].annotations.is_empty());
    }

    struct Fixed(bool);

    impl ConversionClassifier for Fixed {
        fn classify(
            &self,
            _electron: &Electron,
            _tracks: &[Track],
            _bfield_tesla: f64,
            _cuts: ConversionCuts,
        ) -> ConversionInfo {
            ConversionInfo { is_conversion: self.0, dist: Some(0.01), dcot: Some(-0.005) }
        }

        fn name(&self) -> &str {
            "Fixed"
        }
    }

    #[test]
    fn conversion_rejection() {
        let mut cfg = no_trigger();
        cfg.preselection.use_conversion_rejection = true;
        cfg.preselection.calculate_conversion_rejection = true;

        let mut ev = event(vec![electron(50.0, 0.0)]);
        ev.general_tracks = Some(vec![]);

        let sel = CandidateSelector::with_classifier(cfg.clone(), Box::new(Fixed(true))).unwrap();
        assert_eq!(sel.select(&ev), Selection::Rejected(Rejection::Conversion));

        let sel = CandidateSelector::with_classifier(cfg.clone(), Box::new(Fixed(false))).unwrap();
        let cand = sel.select(&ev).candidate().unwrap();
        assert_eq!(cand.electron.annotations.pass_conversion_rejection, Some(true));
        assert_eq!(cand.electron.annotations.conversion_dist, Some(0.01));
        assert_eq!(cand.electron.annotations.conversion_dcot, Some(-0.005));
    }

    #[test]
    fn conversion_rejection_skipped_without_tracks() {
        let mut cfg = no_trigger();
        cfg.preselection.use_conversion_rejection = true;
        cfg.preselection.calculate_conversion_rejection = true;
        let sel = CandidateSelector::with_classifier(cfg, Box::new(Fixed(true))).unwrap();

        let ev = event(vec![electron(50.0, 0.0)]);
        let cand = sel.select(&ev).candidate().expect("fail open without tracks");
        assert_eq!(cand.electron.annotations.pass_conversion_rejection, None);
    }

    #[test]
    fn conversion_rejection_skipped_without_current() {
        let mut cfg = no_trigger();
        cfg.preselection.use_conversion_rejection = true;
        cfg.preselection.field = FieldStrategy::MonitoredCurrent { scale: 2.0e-4 };
        let sel = CandidateSelector::with_classifier(cfg, Box::new(Fixed(true))).unwrap();

        let mut ev = event(vec![electron(50.0, 0.0)]);
        ev.general_tracks = Some(vec![]);
        assert!(sel.select(&ev).is_accepted());

        ev.magnet_current = Some(18000.0);
        assert_eq!(sel.select(&ev), Selection::Rejected(Rejection::Conversion));
    }

    #[test]
    fn invalid_config_is_fatal() {
        let mut cfg = SelectorConfig::default();
        cfg.fiducial.barrel_max_eta = -1.0;
        assert!(CandidateSelector::new(cfg).is_err());
    }
}
