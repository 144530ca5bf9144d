//! Set membership of one electron: full, inverted and N-minus-one passes.

use wenu_core::{Electron, IdDecision, IdRequirement};

use crate::cuts::{CutTable, CutVariable, Region};

/// How the full selection is decided.
#[derive(Debug, Clone, PartialEq)]
pub enum CutEvaluator {
    /// One named identification score compared to a value
    PrecalculatedId(IdRequirement),
    /// The 13-variable, two-region cut table
    Table(CutTable),
}

impl CutEvaluator {
    /// Whether this evaluator uses the cut table.
    pub fn is_table(&self) -> bool {
        matches!(self, CutEvaluator::Table(_))
    }

    /// Full selection.
    ///
    /// In precalculated mode an unknown score name is reported and passes.
    pub fn passes(&self, electron: &Electron) -> bool {
        match self {
            CutEvaluator::PrecalculatedId(req) => match req.decide(electron) {
                IdDecision::Pass => true,
                IdDecision::Fail => false,
                IdDecision::Unavailable => {
                    log::error!(
                        "no identification score named '{}' on the electron; treating as pass",
                        req.name
                    );
                    true
                }
            },
            CutEvaluator::Table(table) => {
                let region = Region::of(electron);
                table.entries().iter().all(|e| e.passes(e.variable.value(electron), region))
            }
        }
    }

    /// Control selection with the configured variables inverted.
    ///
    /// `None` in precalculated mode.
    pub fn passes_inverted(&self, electron: &Electron) -> Option<bool> {
        let CutEvaluator::Table(table) = self else {
            return None;
        };
        let region = Region::of(electron);
        Some(
            table
                .entries()
                .iter()
                .all(|e| e.passes_inverted(e.variable.value(electron), region)),
        )
    }

    /// All normal checks except the one on `skip`.
    ///
    /// `None` in precalculated mode.
    pub fn passes_n_minus_one(&self, electron: &Electron, skip: CutVariable) -> Option<bool> {
        let CutEvaluator::Table(table) = self else {
            return None;
        };
        let region = Region::of(electron);
        Some(
            table
                .entries()
                .iter()
                .filter(|e| e.variable != skip)
                .all(|e| e.passes(e.variable.value(electron), region)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cuts::CutThresholds;
    use std::collections::BTreeMap;
    use wenu_core::{IdComparator, Isolation, SuperCluster};

    fn electron(sc_eta: f64, track_iso: f64, sihih: f64) -> Electron {
        Electron {
            pt: 40.0,
            super_cluster: SuperCluster { energy: 80.0, eta: sc_eta, phi: 0.0 },
            isolation: Isolation { track_sum_pt: track_iso * 40.0, ..Default::default() },
            sigma_ieta_ieta: sihih,
            ..Default::default()
        }
    }

    fn table(invert_central: bool, invert_forward: bool) -> CutEvaluator {
        let mut m = BTreeMap::new();
        m.insert(
            CutVariable::TrackIso,
            CutThresholds { central: 0.1, forward: 0.05, invert_central, invert_forward },
        );
        m.insert(
            CutVariable::SigmaIetaIeta,
            CutThresholds { central: 0.01, forward: 0.03, ..Default::default() },
        );
        CutEvaluator::Table(CutTable::from_thresholds(&m).unwrap())
    }

    #[test]
    fn full_pass_uses_region_thresholds() {
        let ev = table(false, false);
        assert!(ev.passes(&electron(0.5, 0.07, 0.009)));
        assert!(!ev.passes(&electron(2.0, 0.07, 0.009)));
        assert!(!ev.passes(&electron(0.5, 0.07, 0.02)));
        assert!(ev.passes(&electron(2.0, 0.01, 0.02)));
    }

    #[test]
    fn region_switch_at_boundary() {
        let ev = table(false, false);
        // 0.07 passes the barrel threshold but not the endcap one.
        assert!(ev.passes(&electron(1.478999, 0.07, 0.009)));
        assert!(!ev.passes(&electron(1.479001, 0.07, 0.009)));
    }

    #[test]
    fn inverted_and_normal_are_exclusive() {
        let ev = table(true, true);
        for (eta, iso) in [(0.5, 0.05), (0.5, 0.15), (2.0, 0.02), (2.0, 0.08)] {
            let e = electron(eta, iso, 0.005);
            let normal = ev.passes(&e);
            let inverted = ev.passes_inverted(&e).unwrap();
            assert_ne!(normal, inverted, "eta={eta} iso={iso}");
        }
    }

    #[test]
    fn inversion_only_in_flagged_region() {
        // Endcap inverted, barrel not: a barrel electron behaves normally.
        let ev = table(false, true);
        let eb = electron(0.5, 0.05, 0.005);
        assert!(ev.passes(&eb));
        assert_eq!(ev.passes_inverted(&eb), Some(true));
        let ee = electron(2.0, 0.08, 0.005);
        assert!(!ev.passes(&ee));
        assert_eq!(ev.passes_inverted(&ee), Some(true));
    }

    #[test]
    fn n_minus_one_is_a_superset() {
        let ev = table(false, false);
        let mut sample = Vec::new();
        for eta in [0.3, 1.2, 1.7, 2.3] {
            for iso in [0.01, 0.06, 0.2] {
                for sihih in [0.005, 0.02, 0.05] {
                    sample.push(electron(eta, iso, sihih));
                }
            }
        }
        for k in CutVariable::ALL {
            for e in &sample {
                if ev.passes(e) {
                    assert_eq!(ev.passes_n_minus_one(e, k), Some(true));
                }
            }
        }
        // Dropping the failing variable recovers the electron.
        let e = electron(0.5, 0.2, 0.005);
        assert!(!ev.passes(&e));
        assert_eq!(ev.passes_n_minus_one(&e, CutVariable::TrackIso), Some(true));
        assert_eq!(ev.passes_n_minus_one(&e, CutVariable::SigmaIetaIeta), Some(false));
    }

    #[test]
    fn precalculated_id() {
        let ev = CutEvaluator::PrecalculatedId(
            IdRequirement::new("simpleEleId80relIso", IdComparator::Approx, 7.0).unwrap(),
        );
        let mut e = electron(0.5, 0.5, 0.5);
        e.electron_ids.insert("simpleEleId80relIso".into(), 7.0);
        assert!(ev.passes(&e));
        e.electron_ids.insert("simpleEleId80relIso".into(), 5.0);
        assert!(!ev.passes(&e));
        assert_eq!(ev.passes_inverted(&e), None);
        assert_eq!(ev.passes_n_minus_one(&e, CutVariable::TrackIso), None);

        // Unknown name fails open.
        e.electron_ids.clear();
        assert!(ev.passes(&e));
    }
}
